//! Runtime configuration.
//!
//! The task file is resolved from, in order: the `--db` flag, the
//! `WORKHAND_DB` environment variable, then `$HOME/.workhand/<storage key>`.

use std::path::{Path, PathBuf};

use crate::logging::LoggingConfig;
use crate::store::STORAGE_KEY;
use crate::timeline::DAY_WIDTH;

pub const DB_ENV_VAR: &str = "WORKHAND_DB";
pub const DATA_DIR_NAME: &str = ".workhand";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Column width in pixels used to translate pointer drags into days.
    pub day_width: f64,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn resolve(db_flag: Option<PathBuf>, day_width: Option<f64>, logging: LoggingConfig) -> Self {
        let env_db = std::env::var_os(DB_ENV_VAR).map(PathBuf::from);
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Config {
            db_path: resolve_db_path(db_flag, env_db, home.as_deref()),
            day_width: day_width.filter(|w| *w > 0.0).unwrap_or(DAY_WIDTH),
            logging,
        }
    }
}

/// Pick the task file path from the available sources.
pub fn resolve_db_path(flag: Option<PathBuf>, env: Option<PathBuf>, home: Option<&Path>) -> PathBuf {
    flag.or(env).unwrap_or_else(|| {
        home.unwrap_or_else(|| Path::new("."))
            .join(DATA_DIR_NAME)
            .join(STORAGE_KEY)
    })
}
