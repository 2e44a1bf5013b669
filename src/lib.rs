// Базовые модули
pub mod consts;
pub mod config;
pub mod error;
pub mod lock;
pub mod metrics;

// Хранилище узлов: трейт + MemStore/FileStore
pub mod node; // src/node/{mod,mem,codec,file}.rs

// Слой сниппетов
pub mod lang;
pub mod index;
pub mod snippet;
pub mod manager;

// Поверхность для хоста (save/load/delete/man)
pub mod ext;

// Удобные реэкспорты
pub use config::SnipConfig;
pub use consts::{NO_NODE, NO_SLOT};
pub use error::SnipError;
pub use ext::SnippetsExt;
pub use index::SlotIndex;
pub use lang::{validate_language_table, Language, LANGUAGES};
pub use manager::SnippetManager;
pub use node::{FileStore, MemStore, NodeStore};
pub use snippet::Snippet;
