//! The classification dialogue: ingest, caption collection, category and
//! edited selection, the day/month/year upload date sequence, publishing and
//! the admin maintenance actions.
//!
//! Every method that answers a button press returns the short acknowledgement
//! text shown as the callback toast; longer feedback goes to the chat through
//! the [`MediaGateway`].

use crate::callback::AdminOp;
use crate::error::{ArchiveError, ArchiveResult};
use crate::gateway::{MediaGateway, MediaRef};
use crate::keyboards;
use crate::prompts::{PartialDate, PendingPrompt, PromptTracker};
use crate::record::{Category, FileFields, FileRecord, MediaUpload};
use crate::router::DistributionRouter;
use crate::store::FileStore;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::info;

/// Orchestrates the upload and classification workflow over the store and
/// gateway seams.
pub struct ClassificationFlow {
    store: Arc<dyn FileStore>,
    gateway: Arc<dyn MediaGateway>,
    prompts: Arc<PromptTracker>,
    router: DistributionRouter,
    storage_channel: i64,
}

/// Parse an admin-supplied publish date, with or without seconds.
fn parse_publish_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

impl ClassificationFlow {
    /// Wire the flow to its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn FileStore>,
        gateway: Arc<dyn MediaGateway>,
        prompts: Arc<PromptTracker>,
        router: DistributionRouter,
        storage_channel: i64,
    ) -> Self {
        Self {
            store,
            gateway,
            prompts,
            router,
            storage_channel,
        }
    }

    async fn fetch(&self, file_id: i64) -> ArchiveResult<FileRecord> {
        self.store
            .get(file_id)
            .await?
            .ok_or(ArchiveError::NotFound(file_id))
    }

    async fn send_admin_menu(&self, chat_id: i64, record: &FileRecord) -> ArchiveResult<()> {
        self.gateway
            .send_keyboard(chat_id, &record.summary(), keyboards::admin_menu(record))
            .await
    }

    async fn send_day_keyboard(&self, chat_id: i64, file_id: i64) -> ArchiveResult<()> {
        self.gateway
            .send_keyboard(
                chat_id,
                "Select upload DAY (1-31):",
                keyboards::day_keyboard(file_id),
            )
            .await
    }

    /// Record an upload with a known caption: insert, copy to the storage
    /// channel and open the category question. A duplicate upload is answered
    /// with a notice and nothing else happens.
    async fn save_upload(&self, upload: MediaUpload, caption: String) -> ArchiveResult<()> {
        let chat_id = upload.chat_id;
        let media = MediaRef {
            file_type: upload.media.file_type,
            handle: upload.media.handle.clone(),
        };
        let record = match self.store.create(upload.into_draft(caption.clone())).await {
            Ok(record) => record,
            Err(ArchiveError::Conflict) => {
                self.gateway
                    .send_text(chat_id, "This file is already recorded.")
                    .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.gateway
            .send_media(self.storage_channel, &media, &caption)
            .await?;
        self.gateway
            .send_text(chat_id, &format!("✅ \"{caption}\" saved ✔️"))
            .await?;
        self.gateway
            .send_keyboard(
                chat_id,
                &format!("Which category is \"{caption}\"?", caption = record.caption),
                keyboards::category_keyboard(record.id),
            )
            .await?;
        info!(file_id = record.id, "Upload indexed.");
        Ok(())
    }

    /// Entry point for an inbound media message from an admin. Captioned
    /// uploads are saved immediately; captionless ones open a caption prompt.
    ///
    /// # Errors
    ///
    /// Propagates store and delivery failures.
    pub async fn ingest(&self, upload: MediaUpload) -> ArchiveResult<()> {
        match upload.caption.clone() {
            Some(caption) => self.save_upload(upload, caption).await,
            None => {
                let prompt_id = self
                    .gateway
                    .send_prompt(
                        upload.chat_id,
                        "📌 Please send a caption for this file so it can be saved. \
                         Reply to this message with the caption.",
                    )
                    .await?;
                self.prompts.register(prompt_id, PendingPrompt::Caption(upload));
                Ok(())
            }
        }
    }

    /// Handle a text reply to a prompt message. Returns `false` when the
    /// replied-to message is not a pending prompt, so the caller can fall
    /// through to other handling.
    ///
    /// # Errors
    ///
    /// Propagates store and delivery failures.
    pub async fn handle_prompt_reply(
        &self,
        prompt_id: i64,
        chat_id: i64,
        text: &str,
    ) -> ArchiveResult<bool> {
        let Some(pending) = self.prompts.consume(prompt_id) else {
            return Ok(false);
        };
        let input = text.trim();
        match pending {
            PendingPrompt::Caption(upload) => {
                self.reply_caption(prompt_id, chat_id, upload, input).await?;
            }
            PendingPrompt::Rename { file_id } => {
                self.reply_rename(prompt_id, chat_id, file_id, input).await?;
            }
            PendingPrompt::SchedulePublish { file_id } => {
                self.reply_schedule(prompt_id, chat_id, file_id, input).await?;
            }
        }
        Ok(true)
    }

    async fn reply_caption(
        &self,
        prompt_id: i64,
        chat_id: i64,
        upload: MediaUpload,
        input: &str,
    ) -> ArchiveResult<()> {
        if input.is_empty() {
            self.prompts.register(prompt_id, PendingPrompt::Caption(upload));
            return self
                .gateway
                .send_text(
                    chat_id,
                    "❌ Caption cannot be empty. Please send a valid caption.",
                )
                .await;
        }
        self.save_upload(upload, input.to_string()).await
    }

    async fn reply_rename(
        &self,
        prompt_id: i64,
        chat_id: i64,
        file_id: i64,
        input: &str,
    ) -> ArchiveResult<()> {
        if input.is_empty() {
            self.prompts.register(prompt_id, PendingPrompt::Rename { file_id });
            return self
                .gateway
                .send_text(chat_id, "❌ Filename cannot be empty.")
                .await;
        }
        let updated = self
            .store
            .update(
                file_id,
                FileFields {
                    caption: Some(input.to_string()),
                    real_filename: Some(input.to_string()),
                    ..FileFields::default()
                },
            )
            .await?;
        self.gateway
            .send_text(chat_id, &format!("✅ Filename updated: \"{input}\""))
            .await?;
        self.send_admin_menu(chat_id, &updated).await
    }

    async fn reply_schedule(
        &self,
        prompt_id: i64,
        chat_id: i64,
        file_id: i64,
        input: &str,
    ) -> ArchiveResult<()> {
        let Some(date) = parse_publish_date(input) else {
            self.prompts
                .register(prompt_id, PendingPrompt::SchedulePublish { file_id });
            return self
                .gateway
                .send_text(
                    chat_id,
                    "❌ Invalid date format. Use YYYY-MM-DD HH:MM (24h). \
                     Example: 2025-12-25 14:30",
                )
                .await;
        };
        let updated = self
            .store
            .update(
                file_id,
                FileFields {
                    publish_date: Some(date),
                    published: Some(false),
                    ..FileFields::default()
                },
            )
            .await?;
        self.gateway
            .send_text(chat_id, &format!("✅ Publish date set: {date}"))
            .await?;
        self.send_admin_menu(chat_id, &updated).await
    }

    /// Store the category and ask the edited/unedited question next.
    ///
    /// # Errors
    ///
    /// Propagates store and delivery failures.
    pub async fn set_category(
        &self,
        chat_id: i64,
        file_id: i64,
        category: Category,
    ) -> ArchiveResult<String> {
        let updated = self
            .store
            .update(
                file_id,
                FileFields {
                    category: Some(category),
                    ..FileFields::default()
                },
            )
            .await?;
        self.gateway
            .send_text(
                chat_id,
                &format!(
                    "✅ \"{}\" category set to *{category}*.",
                    updated.caption
                ),
            )
            .await?;
        self.gateway
            .send_keyboard(
                chat_id,
                &format!("Is \"{}\" edited or unedited?", updated.caption),
                keyboards::edited_keyboard(updated.id),
            )
            .await?;
        Ok(format!("Category set to {category}"))
    }

    /// Store the edited flag and start the day/month/year date sequence.
    ///
    /// # Errors
    ///
    /// Propagates store and delivery failures.
    pub async fn set_edited(
        &self,
        chat_id: i64,
        file_id: i64,
        edited: bool,
    ) -> ArchiveResult<String> {
        let word = if edited { "edited" } else { "unedited" };
        let updated = self
            .store
            .update(
                file_id,
                FileFields {
                    edited: Some(edited),
                    ..FileFields::default()
                },
            )
            .await?;
        self.gateway
            .send_text(
                chat_id,
                &format!("✅ File \"{}\" marked as *{word}*.", updated.caption),
            )
            .await?;
        self.prompts.set_partial(file_id, PartialDate::default());
        self.send_day_keyboard(chat_id, file_id).await?;
        Ok(format!("Marked as {word}"))
    }

    /// Record the day selection; any earlier month selection is discarded.
    ///
    /// # Errors
    ///
    /// Propagates delivery failures.
    pub async fn set_day(&self, chat_id: i64, file_id: i64, day: u32) -> ArchiveResult<String> {
        self.prompts.set_partial(
            file_id,
            PartialDate {
                day: Some(day),
                month: None,
            },
        );
        self.gateway
            .send_keyboard(
                chat_id,
                "Select upload MONTH:",
                keyboards::month_keyboard(file_id),
            )
            .await?;
        Ok(format!("Day selected: {day}"))
    }

    /// Record the month selection on top of the pending day.
    ///
    /// # Errors
    ///
    /// Propagates delivery failures.
    pub async fn set_month(&self, chat_id: i64, file_id: i64, month: u32) -> ArchiveResult<String> {
        let mut partial = self.prompts.peek_partial(file_id);
        partial.month = Some(month);
        self.prompts.set_partial(file_id, partial);
        self.gateway
            .send_keyboard(
                chat_id,
                "Select upload YEAR:",
                keyboards::year_keyboard(file_id),
            )
            .await?;
        Ok("Month selected".to_string())
    }

    /// Complete the date sequence: persist the upload date and forward the
    /// file to its distribution group. Out-of-order or impossible selections
    /// restart at the day question.
    ///
    /// # Errors
    ///
    /// Propagates store and delivery failures.
    pub async fn set_year(&self, chat_id: i64, file_id: i64, year: i32) -> ArchiveResult<String> {
        let partial = self.prompts.peek_partial(file_id);
        let (Some(day), Some(month)) = (partial.day, partial.month) else {
            self.prompts.set_partial(file_id, PartialDate::default());
            self.send_day_keyboard(chat_id, file_id).await?;
            return Ok("Please select day and month first.".to_string());
        };
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            // e.g. Feb 31: no silent rollover, restart at the day question
            self.prompts.set_partial(file_id, PartialDate::default());
            self.send_day_keyboard(chat_id, file_id).await?;
            return Ok("That date does not exist. Please select the day again.".to_string());
        };
        let updated = self
            .store
            .update(
                file_id,
                FileFields {
                    upload_date: Some(date),
                    ..FileFields::default()
                },
            )
            .await?;
        self.prompts.clear_partial(file_id);
        self.gateway
            .send_text(
                chat_id,
                &format!(
                    "✅ \"{}\" upload date set to {year}-{month}-{day}.",
                    updated.caption
                ),
            )
            .await?;
        if let Some(group) = self.router.route(&updated) {
            self.gateway
                .send_media(group, &MediaRef::of(&updated), &updated.caption)
                .await?;
            info!(file_id, group, "Forwarded file to distribution group.");
        }
        Ok(format!("Upload date set: {year}-{month}-{day}"))
    }

    /// Publish an edited record immediately.
    ///
    /// # Errors
    ///
    /// Fails with [`ArchiveError::Validation`] when the record is not marked
    /// edited; propagates store and delivery failures.
    pub async fn publish_now(&self, chat_id: i64, file_id: i64) -> ArchiveResult<String> {
        let record = self.fetch(file_id).await?;
        if !record.edited {
            return Err(ArchiveError::Validation(
                "File not marked edited. Mark as edited first.".to_string(),
            ));
        }
        let updated = self
            .store
            .update(
                file_id,
                FileFields {
                    published: Some(true),
                    ..FileFields::default()
                },
            )
            .await?;
        self.gateway
            .send_text(
                chat_id,
                &format!("✅ \"{}\" marked as published.", updated.caption),
            )
            .await?;
        Ok("Published now.".to_string())
    }

    /// Open the reply prompt for a scheduled publish date.
    ///
    /// # Errors
    ///
    /// Fails with [`ArchiveError::NotFound`] when the record is absent;
    /// propagates delivery failures.
    pub async fn publish_schedule(&self, chat_id: i64, file_id: i64) -> ArchiveResult<String> {
        self.fetch(file_id).await?;
        let prompt_id = self
            .gateway
            .send_prompt(
                chat_id,
                "📆 Reply to this message with the publish date/time (YYYY-MM-DD HH:MM).",
            )
            .await?;
        self.prompts
            .register(prompt_id, PendingPrompt::SchedulePublish { file_id });
        Ok("Send publish date by replying to the prompt.".to_string())
    }

    /// Re-send a stored file to the requester.
    ///
    /// # Errors
    ///
    /// Fails with [`ArchiveError::NotFound`] when the record is absent;
    /// propagates delivery failures.
    pub async fn send_file(&self, chat_id: i64, file_id: i64) -> ArchiveResult<String> {
        let record = self.fetch(file_id).await?;
        self.gateway
            .send_media(chat_id, &MediaRef::of(&record), &record.caption)
            .await?;
        Ok(String::new())
    }

    /// Run a privileged maintenance action. The caller has already checked
    /// admin rights.
    ///
    /// # Errors
    ///
    /// Fails with [`ArchiveError::NotFound`] when the record is absent and
    /// with [`ArchiveError::Validation`] for publish toggles on unedited
    /// records; propagates store and delivery failures.
    pub async fn admin_action(
        &self,
        chat_id: i64,
        file_id: i64,
        op: AdminOp,
    ) -> ArchiveResult<String> {
        let record = self.fetch(file_id).await?;
        match op {
            AdminOp::OpenEdit => {
                self.send_admin_menu(chat_id, &record).await?;
                Ok(String::new())
            }
            AdminOp::EditName => self.open_rename_prompt(chat_id, &record).await,
            AdminOp::TogglePublished => self.toggle_published(chat_id, &record).await,
            AdminOp::ToggleVisible => self.toggle_visible(chat_id, &record).await,
            AdminOp::SetPublishDate => {
                self.gateway
                    .send_keyboard(
                        chat_id,
                        &format!("When should \"{}\" be published?", record.caption),
                        keyboards::publish_keyboard(file_id),
                    )
                    .await?;
                Ok(String::new())
            }
            AdminOp::SetUploadDate => {
                self.prompts.set_partial(file_id, PartialDate::default());
                self.send_day_keyboard(chat_id, file_id).await?;
                Ok(String::new())
            }
            AdminOp::Delete => {
                self.store.delete(file_id).await?;
                self.gateway
                    .send_text(
                        chat_id,
                        &format!("🗑️ File \"{}\" deleted from database.", record.caption),
                    )
                    .await?;
                Ok("File deleted from DB".to_string())
            }
        }
    }

    async fn open_rename_prompt(
        &self,
        chat_id: i64,
        record: &FileRecord,
    ) -> ArchiveResult<String> {
        let prompt_id = self
            .gateway
            .send_prompt(
                chat_id,
                &format!(
                    "✏️ Reply to this message with the new caption/filename for \"{}\":",
                    record.caption
                ),
            )
            .await?;
        self.prompts
            .register(prompt_id, PendingPrompt::Rename { file_id: record.id });
        Ok("Reply with new filename.".to_string())
    }

    async fn toggle_published(&self, chat_id: i64, record: &FileRecord) -> ArchiveResult<String> {
        if !record.edited {
            return Err(ArchiveError::Validation(
                "File not marked edited. Mark as edited first.".to_string(),
            ));
        }
        let updated = self
            .store
            .update(
                record.id,
                FileFields {
                    published: Some(!record.published),
                    ..FileFields::default()
                },
            )
            .await?;
        self.send_admin_menu(chat_id, &updated).await?;
        Ok(format!("Published set to {}", updated.published))
    }

    async fn toggle_visible(&self, chat_id: i64, record: &FileRecord) -> ArchiveResult<String> {
        let updated = self
            .store
            .update(
                record.id,
                FileFields {
                    visible: Some(!record.visible),
                    ..FileFields::default()
                },
            )
            .await?;
        self.send_admin_menu(chat_id, &updated).await?;
        Ok(format!("Visible set to {}", updated.visible))
    }

    /// Admin replied to a stored media message: show the matching record with
    /// its edit entry point. Returns `false` when the message is not on file.
    ///
    /// # Errors
    ///
    /// Propagates store and delivery failures.
    pub async fn show_record_for_origin(
        &self,
        chat_id: i64,
        origin_chat: i64,
        origin_message: i64,
        handle: &str,
    ) -> ArchiveResult<bool> {
        let Some(record) = self
            .store
            .find_by_origin(origin_chat, origin_message, handle)
            .await?
        else {
            return Ok(false);
        };
        self.gateway
            .send_keyboard(
                chat_id,
                &record.summary_with("File found in DB:"),
                keyboards::open_edit_keyboard(record.id),
            )
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::parse_publish_date;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn publish_date_accepts_minutes_and_seconds() {
        let parsed = parse_publish_date("2025-12-25 14:30").expect("minutes");
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2025, 12, 25).expect("date"));
        assert_eq!((parsed.hour(), parsed.minute()), (14, 30));

        let parsed = parse_publish_date("2025-12-25 14:30:59").expect("seconds");
        assert_eq!(parsed.second(), 59);
    }

    #[test]
    fn publish_date_rejects_other_shapes() {
        assert!(parse_publish_date("25/12/2025 14:30").is_none());
        assert!(parse_publish_date("2025-12-25").is_none());
        assert!(parse_publish_date("tomorrow").is_none());
        assert!(parse_publish_date("").is_none());
    }
}
