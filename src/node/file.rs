//! node/file — FileStore: таблица узлов в одном файле на диске.
//!
//! - Весь файл читается в MemStore при открытии (magic/version/CRC проверяются).
//! - Изменения копятся в памяти; flush() переписывает файл атомарно: tmp+rename,
//!   затем fsync родительского каталога (best-effort, только Unix).
//! - На время жизни держится lock-файл <db>.lock: Exclusive для писателя,
//!   Shared для open_ro.
//! - Drop делает best-effort flush для писателя.

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::SnipConfig;
use crate::error::SnipError;
use crate::lock::{try_acquire_lock, LockGuard, LockMode};
use crate::metrics::record_store_flush;

use super::codec::{decode, encode};
use super::mem::MemStore;
use super::NodeStore;

pub struct FileStore {
    path: PathBuf,
    mem: MemStore,
    dirty: bool,
    readonly: bool,
    data_fsync: bool,
    _lock: LockGuard, // держим lock до Drop
}

impl FileStore {
    /// Создать новый пустой файл базы. Ошибка, если файл уже существует.
    pub fn create(path: &Path) -> Result<Self> {
        Self::create_with_config(path, &SnipConfig::from_env())
    }

    pub fn create_with_config(path: &Path, cfg: &SnipConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create parent dir {}", parent.display()))?;
            }
        }
        if path.exists() {
            return Err(anyhow!("database already exists at {}", path.display()));
        }
        let lock = try_acquire_lock(path, LockMode::Exclusive)?;
        let mut store = Self {
            path: path.to_path_buf(),
            mem: MemStore::new(),
            dirty: true,
            readonly: false,
            data_fsync: cfg.data_fsync,
            _lock: lock,
        };
        store.flush()?;
        debug!("created store {}", store.path.display());
        Ok(store)
    }

    /// Открыть существующую базу на запись.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_config(path, &SnipConfig::from_env())
    }

    pub fn open_with_config(path: &Path, cfg: &SnipConfig) -> Result<Self> {
        Self::open_mode(path, cfg, LockMode::Exclusive)
    }

    /// Открыть на чтение (shared lock). Мутации возвращают ошибку.
    pub fn open_ro(path: &Path) -> Result<Self> {
        Self::open_ro_with_config(path, &SnipConfig::from_env())
    }

    pub fn open_ro_with_config(path: &Path, cfg: &SnipConfig) -> Result<Self> {
        Self::open_mode(path, cfg, LockMode::Shared)
    }

    /// Открыть, а при отсутствии файла — создать.
    pub fn open_or_create(path: &Path) -> Result<Self> {
        Self::open_or_create_with_config(path, &SnipConfig::from_env())
    }

    pub fn open_or_create_with_config(path: &Path, cfg: &SnipConfig) -> Result<Self> {
        if path.exists() {
            Self::open_with_config(path, cfg)
        } else {
            Self::create_with_config(path, cfg)
        }
    }

    fn open_mode(path: &Path, cfg: &SnipConfig, mode: LockMode) -> Result<Self> {
        if !path.is_file() {
            return Err(anyhow!("database not found at {}", path.display()));
        }
        let lock = try_acquire_lock(path, mode)?;
        let bytes = fs::read(path).with_context(|| format!("read store {}", path.display()))?;
        let mem = decode(&bytes).map_err(|reason| SnipError::BadStoreFile {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!(
            "opened store {} ({} node(s), mode={:?})",
            path.display(),
            mem.node_count(),
            mode
        );
        Ok(Self {
            path: path.to_path_buf(),
            mem,
            dirty: false,
            readonly: mode == LockMode::Shared,
            data_fsync: cfg.data_fsync,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Прямой доступ к таблице (для status/диагностики).
    pub fn mem(&self) -> &MemStore {
        &self.mem
    }

    #[inline]
    fn writable(&mut self) -> Result<&mut MemStore> {
        if self.readonly {
            return Err(anyhow!("store {} is opened read-only", self.path.display()));
        }
        self.dirty = true;
        Ok(&mut self.mem)
    }
}

impl NodeStore for FileStore {
    fn create_node(&mut self) -> Result<u64> {
        self.writable()?.create_node()
    }

    fn named_node(&mut self, name: &str) -> Result<u64> {
        // attach к существующему узлу разрешён и в read-only режиме
        if let Some(id) = self.mem.find_named(name) {
            return Ok(id);
        }
        self.writable()?.named_node(name)
    }

    fn find_named(&self, name: &str) -> Option<u64> {
        self.mem.find_named(name)
    }

    fn contains(&self, node: u64) -> bool {
        self.mem.contains(node)
    }

    fn destroy_node(&mut self, node: u64) -> Result<()> {
        self.writable()?.destroy_node(node)
    }

    fn set_field(&mut self, node: u64, idx: u32, value: &str) -> Result<()> {
        self.writable()?.set_field(node, idx, value)
    }

    fn field(&self, node: u64, idx: u32) -> Result<Option<String>> {
        self.mem.field(node, idx)
    }

    fn set_blob(&mut self, node: u64, tag: u8, data: &[u8]) -> Result<()> {
        self.writable()?.set_blob(node, tag, data)
    }

    fn blob(&self, node: u64, tag: u8) -> Result<Option<Vec<u8>>> {
        self.mem.blob(node, tag)
    }

    fn index_set(&mut self, node: u64, key: u64, value: u64) -> Result<()> {
        self.writable()?.index_set(node, key, value)
    }

    fn index_get(&self, node: u64, key: u64) -> Result<Option<u64>> {
        self.mem.index_get(node, key)
    }

    fn index_del(&mut self, node: u64, key: u64) -> Result<bool> {
        self.writable()?.index_del(node, key)
    }

    fn index_first(&self, node: u64) -> Result<Option<u64>> {
        self.mem.index_first(node)
    }

    fn index_next(&self, node: u64, key: u64) -> Result<Option<u64>> {
        self.mem.index_next(node, key)
    }

    fn index_clear(&mut self, node: u64) -> Result<()> {
        self.writable()?.index_clear(node)
    }

    fn node_count(&self) -> usize {
        self.mem.node_count()
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if self.readonly {
            return Err(anyhow!("store {} is opened read-only", self.path.display()));
        }
        let bytes = encode(&self.mem)?;
        write_atomic(&self.path, &bytes, self.data_fsync)?;
        self.dirty = false;
        record_store_flush();
        debug!("flushed store {} ({} B)", self.path.display(), bytes.len());
        Ok(())
    }

    fn database_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if self.readonly || !self.dirty {
            return;
        }
        if let Err(e) = self.flush() {
            warn!("store {}: flush on close failed: {:#}", self.path.display(), e);
        }
    }
}

/// tmp+rename (+ fsync каталога best-effort).
fn write_atomic(path: &Path, bytes: &[u8], fsync: bool) -> Result<()> {
    let mut tmp_name = path.file_name().map(|s| s.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    let _ = fs::remove_file(&tmp); // best-effort

    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)
        .with_context(|| format!("open store tmp {}", tmp.display()))?;
    f.write_all(bytes)
        .with_context(|| format!("write store tmp {}", tmp.display()))?;
    if fsync {
        f.sync_all()?;
    }
    drop(f);

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;

    if fsync {
        let _ = fsync_parent_dir(path);
    }
    Ok(())
}

// Best-effort fsync parent directory after rename (Unix only).
#[cfg(unix)]
fn fsync_parent_dir(p: &Path) -> std::io::Result<()> {
    use std::fs::File;
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_parent_dir(_p: &Path) -> std::io::Result<()> {
    Ok(())
}
