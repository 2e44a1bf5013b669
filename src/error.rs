//! Typed failures of the snippet layer.
//!
//! Всё остальное пробрасывается как anyhow::Error с контекстом; эти варианты
//! заворачиваются в anyhow и достаются через `downcast_ref::<SnipError>()`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SnipError {
    /// Индекс ссылается на узел, которого нет в хранилище.
    #[error("node {0} does not resolve (dangling handle)")]
    UnknownNode(u64),

    /// Тег языка не входит в таблицу языков — расширение файла неизвестно.
    #[error("unknown language tag '{0}'")]
    UnknownLanguage(String),

    /// Имя сниппета не годится в имя файла внутри папки экспорта.
    #[error("snippet name '{0}' is not a plain file name")]
    UnsafeFileName(String),

    #[error("folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// Нельзя вывести папку по умолчанию: путь к базе неизвестен.
    #[error("database path is unknown; pass an explicit folder or set QS_DB_PATH")]
    NoDatabasePath,

    #[error("bad store file {}: {reason}", .path.display())]
    BadStoreFile { path: PathBuf, reason: String },

    #[error("invalid language table: {0}")]
    InvalidLanguageTable(String),
}
