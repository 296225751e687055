//! Configuration management.

use crate::router::RoutingTable;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Build the layered configuration source: optional config files plus the
/// process environment.
///
/// # Errors
///
/// Returns a `ConfigError` if a source fails to load.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::default())
        .build()
}

/// Core archive settings: record store, storage channel, distribution groups
/// and the admin list.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ArchiveSettings {
    /// Postgres connection string.
    pub database_url: String,
    /// Channel that always receives a copy of every saved file.
    pub storage_channel_id: i64,
    /// Group receiving edited sermon videos.
    pub edited_sermon_video_group: i64,
    /// Group receiving unedited sermon videos.
    pub unedited_sermon_video_group: i64,
    /// Group receiving edited prophecy videos.
    pub edited_prophecy_video_group: i64,
    /// Group receiving unedited prophecy videos.
    pub unedited_prophecy_video_group: i64,
    /// Group receiving all audio files.
    pub sermon_audio_group: i64,
    /// Comma-separated list of admin user ids.
    #[serde(rename = "admin_users")]
    pub admin_users_str: Option<String>,
}

impl ArchiveSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Identities allowed to upload files and run admin actions.
    #[must_use]
    pub fn admin_users(&self) -> HashSet<i64> {
        self.admin_users_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .filter_map(|id| id.parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The distribution routing table.
    #[must_use]
    pub const fn routing_table(&self) -> RoutingTable {
        RoutingTable {
            edited_sermon_video: self.edited_sermon_video_group,
            unedited_sermon_video: self.unedited_sermon_video_group,
            edited_prophecy_video: self.edited_prophecy_video_group,
            unedited_prophecy_video: self.unedited_prophecy_video_group,
            sermon_audio: self.sermon_audio_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArchiveSettings;

    fn settings(admins: Option<&str>) -> ArchiveSettings {
        ArchiveSettings {
            database_url: "postgres://localhost/test".to_string(),
            storage_channel_id: -1,
            edited_sermon_video_group: -2,
            unedited_sermon_video_group: -3,
            edited_prophecy_video_group: -4,
            unedited_prophecy_video_group: -5,
            sermon_audio_group: -6,
            admin_users_str: admins.map(ToString::to_string),
        }
    }

    #[test]
    fn test_admin_list_parsing() {
        let parsed = settings(Some("123,456")).admin_users();
        assert!(parsed.contains(&123));
        assert!(parsed.contains(&456));
        assert_eq!(parsed.len(), 2);

        let parsed = settings(Some("111 222")).admin_users();
        assert_eq!(parsed.len(), 2);

        let parsed = settings(Some("333; 444, 555")).admin_users();
        assert!(parsed.contains(&555));
        assert_eq!(parsed.len(), 3);

        let parsed = settings(Some("abc, 777")).admin_users();
        assert!(parsed.contains(&777));
        assert_eq!(parsed.len(), 1);

        assert!(settings(None).admin_users().is_empty());
    }

    #[test]
    fn routing_table_maps_groups() {
        let table = settings(None).routing_table();
        assert_eq!(table.edited_sermon_video, -2);
        assert_eq!(table.sermon_audio, -6);
    }
}
