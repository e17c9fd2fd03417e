//! Application settings for agentkeys.
//!
//! Settings are persisted to the SQLite database as JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::db::Database;

/// Settings key in the `settings` table.
const SETTINGS_KEY: &str = "settings";

/// Default log level when neither the settings nor `RUST_LOG` say otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default timeout for model listing requests.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Application Settings
// =============================================================================

/// Application settings - persisted to database as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL used for providers that don't configure their own.
    #[serde(default)]
    pub default_base_url: Option<String>,

    /// Timeout for model listing requests, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level for the `agentkeys` targets (e.g. "info", "debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from database, using defaults for missing values.
    ///
    /// If settings don't exist or can't be parsed, returns defaults.
    pub fn load(db: &Database) -> Self {
        let mut settings = Self::default();

        match db.get_setting(SETTINGS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(loaded) => settings = loaded,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to parse settings, using defaults");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read settings, using defaults");
            }
        }

        settings.validate();
        settings
    }

    /// Save settings to database.
    pub fn save(&self, db: &Database) -> anyhow::Result<()> {
        let json = serde_json::to_string(self)?;
        db.set_setting(SETTINGS_KEY, &json)?;
        Ok(())
    }

    /// Validate and clamp settings to valid ranges.
    pub fn validate(&mut self) {
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 300);

        if self.log_level.trim().is_empty() {
            self.log_level = DEFAULT_LOG_LEVEL.to_string();
        }

        if self
            .default_base_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            self.default_base_url = None;
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open_at(db_path).unwrap();
        db.migrate().unwrap();
        (temp_dir, db)
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.log_level, "info");
        assert!(settings.default_base_url.is_none());
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_settings_save_and_load_roundtrip() {
        let (_temp, db) = setup_test_db();

        let original = Settings {
            default_base_url: Some("https://api.example.com/v1".to_string()),
            request_timeout_secs: 10,
            log_level: "debug".to_string(),
        };
        original.save(&db).unwrap();

        assert_eq!(Settings::load(&db), original);
    }

    #[test]
    fn test_settings_load_returns_defaults_when_missing() {
        let (_temp, db) = setup_test_db();
        assert_eq!(Settings::load(&db), Settings::default());
    }

    #[test]
    fn test_settings_load_returns_defaults_on_invalid_json() {
        let (_temp, db) = setup_test_db();
        db.set_setting("settings", "not valid json {{").unwrap();

        assert_eq!(Settings::load(&db), Settings::default());
    }

    #[test]
    fn test_settings_load_fills_missing_fields() {
        let (_temp, db) = setup_test_db();
        db.set_setting("settings", r#"{"log_level":"warn"}"#).unwrap();

        let settings = Settings::load(&db);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_settings_validate_clamps_timeout() {
        let mut settings = Settings::default();

        settings.request_timeout_secs = 0;
        settings.validate();
        assert_eq!(settings.request_timeout_secs, 1);

        settings.request_timeout_secs = 10_000;
        settings.validate();
        assert_eq!(settings.request_timeout_secs, 300);
    }

    #[test]
    fn test_settings_validate_normalizes_blank_values() {
        let mut settings = Settings {
            default_base_url: Some("   ".to_string()),
            request_timeout_secs: 30,
            log_level: String::new(),
        };
        settings.validate();

        assert!(settings.default_base_url.is_none());
        assert_eq!(settings.log_level, DEFAULT_LOG_LEVEL);
    }
}
