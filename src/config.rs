//! Centralized configuration for QuiverSnip.
//!
//! - SnipConfig::from_env() читает переменные окружения QS_*.
//! - Fluent `with_*` setters поверх Default / from_env.
//!
//! Env:
//! - QS_SNIPPETS_DIR — имя папки по умолчанию рядом с файлом базы (default ".snippets")
//! - QS_INDEX_NAME   — имя узла индекса в хранилище (default "$ scriptsnippets")
//! - QS_DATA_FSYNC   — fsync файла базы на flush (default true; "0|false|off|no" => false)
//! - QS_DB_PATH      — путь к базе, если backend его не знает (MemStore)

use std::fmt;
use std::path::PathBuf;

use crate::consts::{DEFAULT_INDEX_NAME, DEFAULT_SNIPPETS_DIR};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnipConfig {
    /// Имя папки сниппетов по умолчанию (создаётся рядом с файлом базы).
    pub snippets_dir_name: String,

    /// Имя узла, в котором живёт индекс slot -> node.
    pub index_name: String,

    /// fsync файла и каталога при flush().
    pub data_fsync: bool,

    /// Явный путь к файлу базы для вывода папки по умолчанию.
    /// Если None — берётся NodeStore::database_path().
    pub db_path: Option<PathBuf>,
}

impl Default for SnipConfig {
    fn default() -> Self {
        Self {
            snippets_dir_name: DEFAULT_SNIPPETS_DIR.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            data_fsync: true,
            db_path: None,
        }
    }
}

impl SnipConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("QS_SNIPPETS_DIR") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.snippets_dir_name = s.to_string();
            }
        }

        if let Ok(v) = std::env::var("QS_INDEX_NAME") {
            if !v.trim().is_empty() {
                cfg.index_name = v;
            }
        }

        if let Ok(v) = std::env::var("QS_DATA_FSYNC") {
            cfg.data_fsync = parse_bool(&v).unwrap_or(cfg.data_fsync);
        }

        if let Ok(v) = std::env::var("QS_DB_PATH") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.db_path = Some(PathBuf::from(s));
            }
        }

        cfg
    }

    pub fn with_snippets_dir_name<S: Into<String>>(mut self, name: S) -> Self {
        self.snippets_dir_name = name.into();
        self
    }

    pub fn with_index_name<S: Into<String>>(mut self, name: S) -> Self {
        self.index_name = name.into();
        self
    }

    pub fn with_data_fsync(mut self, on: bool) -> Self {
        self.data_fsync = on;
        self
    }

    pub fn with_db_path<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.db_path = path.map(Into::into);
        self
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl fmt::Display for SnipConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SnipConfig {{ snippets_dir_name: {}, index_name: {:?}, data_fsync: {}, db_path: {} }}",
            self.snippets_dir_name,
            self.index_name,
            self.data_fsync,
            self.db_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "default(store)".to_string()),
        )
    }
}
