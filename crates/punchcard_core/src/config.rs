//! Environment-driven runtime configuration.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Path defaults live under the process temp directory.
//! - The admin token is never printed by `Debug`.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "PUNCHCARD_DB_PATH";
pub const DRAFT_PATH_ENV: &str = "PUNCHCARD_DRAFT_PATH";
pub const LOG_DIR_ENV: &str = "PUNCHCARD_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "PUNCHCARD_LOG_LEVEL";
pub const ADMIN_TOKEN_ENV: &str = "PUNCHCARD_ADMIN_TOKEN";

const DEFAULT_DB_FILE: &str = "punchcard.sqlite3";
const DEFAULT_DRAFT_FILE: &str = "punchcard_draft.json";
const DEFAULT_LOG_DIR: &str = "punchcard-logs";

/// Resolved runtime settings.
#[derive(Clone, PartialEq, Eq)]
pub struct JournalConfig {
    /// SQLite file holding the published record set.
    pub db_path: PathBuf,
    /// Local entry set snapshot file.
    pub draft_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    /// Accepted admin secret; `None` disables publishing.
    pub admin_token: Option<String>,
}

impl JournalConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let temp = std::env::temp_dir();

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| temp.join(DEFAULT_DB_FILE)),
            draft_path: read(DRAFT_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| temp.join(DEFAULT_DRAFT_FILE)),
            log_dir: read(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| temp.join(DEFAULT_LOG_DIR)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            admin_token: read(ADMIN_TOKEN_ENV),
        }
    }
}

impl std::fmt::Debug for JournalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalConfig")
            .field("db_path", &self.db_path)
            .field("draft_path", &self.draft_path)
            .field("log_dir", &self.log_dir)
            .field("log_level", &self.log_level)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "***"))
            .finish()
    }
}
