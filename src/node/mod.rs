//! node — хранилище узлов (blob/record store) под индексом сниппетов.
//!
//! Разделение по подмодулям:
//! - mem.rs   — MemStore: таблица узлов в памяти (поля, блобы, разреженный индекс)
//! - codec.rs — бинарный формат файла хранилища (LE, CRC32)
//! - file.rs  — FileStore: MemStore + файл на диске (tmp+rename) + lock-файл
//!
//! Узел адресуется непрозрачным u64-хэндлом; NO_NODE зарезервирован под "нет узла".
//! У каждого узла есть:
//! - необязательное имя (create-or-attach по имени, см. named_node),
//! - строковые поля по целочисленному индексу,
//! - блобы переменной длины под однобайтовым тегом,
//! - упорядоченный разреженный индекс u64 -> u64 (first/next по возрастанию ключа).

use anyhow::Result;
use std::path::Path;

pub mod codec;
pub mod file;
pub mod mem;

pub use file::FileStore;
pub use mem::MemStore;

/// Контракт хранилища, нужный слою сниппетов.
///
/// Операции над несуществующим узлом возвращают `SnipError::UnknownNode`.
/// Блобы читаются так, как их хранит backend: допускается добивка нулями
/// до размера куска, снимать её — забота вызывающего.
pub trait NodeStore {
    /// Выделить новый безымянный узел.
    fn create_node(&mut self) -> Result<u64>;

    /// Найти узел по имени или создать его (идемпотентно).
    fn named_node(&mut self, name: &str) -> Result<u64>;

    fn find_named(&self, name: &str) -> Option<u64>;

    fn contains(&self, node: u64) -> bool;

    /// Уничтожить узел вместе со всеми полями, блобами и индексом.
    fn destroy_node(&mut self, node: u64) -> Result<()>;

    fn set_field(&mut self, node: u64, idx: u32, value: &str) -> Result<()>;
    fn field(&self, node: u64, idx: u32) -> Result<Option<String>>;

    fn set_blob(&mut self, node: u64, tag: u8, data: &[u8]) -> Result<()>;
    fn blob(&self, node: u64, tag: u8) -> Result<Option<Vec<u8>>>;

    fn index_set(&mut self, node: u64, key: u64, value: u64) -> Result<()>;
    fn index_get(&self, node: u64, key: u64) -> Result<Option<u64>>;
    /// Удалить запись индекса. Ok(false), если записи не было.
    fn index_del(&mut self, node: u64, key: u64) -> Result<bool>;
    fn index_first(&self, node: u64) -> Result<Option<u64>>;
    /// Следующий ключ строго больше `key`.
    fn index_next(&self, node: u64, key: u64) -> Result<Option<u64>>;
    fn index_clear(&mut self, node: u64) -> Result<()>;

    /// Число живых узлов (включая именованные служебные).
    fn node_count(&self) -> usize;

    /// Сделать изменения долговечными. Для in-memory backend — no-op.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Путь к файлу базы, если backend его знает (нужен для папки по умолчанию).
    fn database_path(&self) -> Option<&Path> {
        None
    }
}
