//! Общие константы: формат файла хранилища, поля узлов, сентинелы.

// -------- Sentinels --------
/// "Нет узла": запись ещё не сохранена в хранилище.
pub const NO_NODE: u64 = u64::MAX;
/// "Слот не назначен": запись ещё не зарегистрирована в индексе.
pub const NO_SLOT: u64 = u64::MAX;

// -------- Store file --------
// Формат header (32 байта):
// [magic8="QSNODES1"][ver u32=1][node_count u32][next_node u64][crc32 u32][reserved u32]
// Далее payload: последовательность узлов (см. node/codec.rs).
pub const NODES_MAGIC: &[u8; 8] = b"QSNODES1";
pub const NODES_VERSION: u32 = 1;
pub const NODES_HDR_SIZE: usize = 32;

/// Суффикс lock-файла рядом с файлом хранилища.
pub const LOCK_SUFFIX: &str = "lock";

/// Блобы хранятся кусками фиксированного размера; последний кусок добивается нулями.
pub const BLOB_CHUNK: usize = 1024;

/// Первый выдаваемый идентификатор узла.
pub const FIRST_NODE: u64 = 1;

// -------- Snippet nodes --------
/// Поле с именем сниппета.
pub const FIELD_NAME: u32 = 0;
/// Поле с тегом языка.
pub const FIELD_LANG: u32 = 1;
/// Тег блоб-канала с телом сниппета.
pub const BODY_TAG: u8 = b'X';

// -------- Defaults --------
pub const DEFAULT_INDEX_NAME: &str = "$ scriptsnippets";
pub const DEFAULT_SNIPPETS_DIR: &str = ".snippets";
