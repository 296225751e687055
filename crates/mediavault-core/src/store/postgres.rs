//! Postgres-backed [`FileStore`].

use super::{check_publish_guard, FileStore, SEARCH_LIMIT};
use crate::error::{ArchiveError, ArchiveResult};
use crate::record::{FileFields, FileRecord, NewFileRecord};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{QueryBuilder, Row};
use tracing::info;

/// Schema ensured at startup; safe to run repeatedly.
const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS files (
    id BIGSERIAL PRIMARY KEY,
    chat_id BIGINT NOT NULL,
    message_id BIGINT NOT NULL,
    caption TEXT NOT NULL,
    real_filename TEXT,
    file_type TEXT NOT NULL,
    file_extension TEXT,
    file_id TEXT NOT NULL,
    edited BOOLEAN NOT NULL DEFAULT FALSE,
    published BOOLEAN NOT NULL DEFAULT FALSE,
    visible BOOLEAN NOT NULL DEFAULT TRUE,
    uploaded_by BIGINT,
    category TEXT,
    upload_date DATE,
    publish_date TIMESTAMP,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (chat_id, message_id, file_id)
)";

/// Postgres implementation of the record store.
#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

fn row_to_record(row: &PgRow) -> Result<FileRecord, sqlx::Error> {
    let file_type: String = row.try_get("file_type")?;
    let category: Option<String> = row.try_get("category")?;
    Ok(FileRecord {
        id: row.try_get("id")?,
        chat_id: row.try_get("chat_id")?,
        message_id: row.try_get("message_id")?,
        caption: row.try_get("caption")?,
        real_filename: row.try_get("real_filename")?,
        file_type: file_type
            .parse()
            .map_err(|e: ArchiveError| sqlx::Error::Decode(Box::new(e)))?,
        file_extension: row.try_get("file_extension")?,
        handle: row.try_get("file_id")?,
        edited: row.try_get("edited")?,
        published: row.try_get("published")?,
        visible: row.try_get("visible")?,
        uploaded_by: row.try_get("uploaded_by")?,
        category: category
            .map(|c| c.parse())
            .transpose()
            .map_err(|e: ArchiveError| sqlx::Error::Decode(Box::new(e)))?,
        upload_date: row.try_get("upload_date")?,
        publish_date: row.try_get("publish_date")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_create_error(e: sqlx::Error) -> ArchiveError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ArchiveError::Conflict,
        _ => ArchiveError::Persistence(e),
    }
}

impl PgFileStore {
    /// Connect to the database and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Persistence`] when the connection or the
    /// schema statement fails; callers treat this as fatal at startup.
    pub async fn connect(database_url: &str) -> ArchiveResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("Database schema ensured.");
        Ok(Self { pool })
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn create(&self, draft: NewFileRecord) -> ArchiveResult<FileRecord> {
        let row = sqlx::query(
            "INSERT INTO files \
             (chat_id, message_id, caption, real_filename, file_type, file_extension, file_id, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(draft.chat_id)
        .bind(draft.message_id)
        .bind(&draft.caption)
        .bind(&draft.real_filename)
        .bind(draft.file_type.as_str())
        .bind(&draft.file_extension)
        .bind(&draft.handle)
        .bind(draft.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_create_error)?;
        row_to_record(&row).map_err(ArchiveError::Persistence)
    }

    async fn update(&self, id: i64, fields: FileFields) -> ArchiveResult<FileRecord> {
        let current = self.get(id).await?.ok_or(ArchiveError::NotFound(id))?;
        if fields.is_empty() {
            return Ok(current);
        }
        check_publish_guard(&current, &fields)?;

        let mut builder = QueryBuilder::new("UPDATE files SET ");
        let mut set = builder.separated(", ");
        if let Some(v) = fields.caption {
            set.push("caption = ").push_bind_unseparated(v);
        }
        if let Some(v) = fields.real_filename {
            set.push("real_filename = ").push_bind_unseparated(v);
        }
        if let Some(v) = fields.edited {
            set.push("edited = ").push_bind_unseparated(v);
        }
        if let Some(v) = fields.published {
            set.push("published = ").push_bind_unseparated(v);
        }
        if let Some(v) = fields.visible {
            set.push("visible = ").push_bind_unseparated(v);
        }
        if let Some(v) = fields.category {
            set.push("category = ").push_bind_unseparated(v.as_str());
        }
        if let Some(v) = fields.upload_date {
            set.push("upload_date = ").push_bind_unseparated(v);
        }
        if let Some(v) = fields.publish_date {
            set.push("publish_date = ").push_bind_unseparated(v);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");

        let row = builder.build().fetch_one(&self.pool).await?;
        row_to_record(&row).map_err(ArchiveError::Persistence)
    }

    async fn get(&self, id: i64) -> ArchiveResult<Option<FileRecord>> {
        let row = sqlx::query("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(row_to_record)
            .transpose()
            .map_err(ArchiveError::Persistence)
    }

    async fn delete(&self, id: i64) -> ArchiveResult<()> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_origin(
        &self,
        chat_id: i64,
        message_id: i64,
        handle: &str,
    ) -> ArchiveResult<Option<FileRecord>> {
        let row = sqlx::query(
            "SELECT * FROM files WHERE chat_id = $1 AND message_id = $2 AND file_id = $3 LIMIT 1",
        )
        .bind(chat_id)
        .bind(message_id)
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref()
            .map(row_to_record)
            .transpose()
            .map_err(ArchiveError::Persistence)
    }

    async fn search(
        &self,
        substring: &str,
        include_hidden: bool,
    ) -> ArchiveResult<Vec<FileRecord>> {
        let pattern = format!("%{}%", substring.to_lowercase());
        let sql = if include_hidden {
            "SELECT * FROM files WHERE LOWER(caption) LIKE $1 \
             ORDER BY created_at DESC LIMIT $2"
        } else {
            "SELECT * FROM files WHERE visible = TRUE AND LOWER(caption) LIKE $1 \
             ORDER BY created_at DESC LIMIT $2"
        };
        let limit = i64::try_from(SEARCH_LIMIT).unwrap_or(50);
        let rows = sqlx::query(sql)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ArchiveError::Persistence)
    }
}
