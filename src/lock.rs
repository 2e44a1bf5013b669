//! File-based locking for single-writer safety.
//!
//! Cross-platform (fs2) advisory locks рядом с файлом базы:
//! - Exclusive: один писатель; второй FileStore на тот же файл не откроется.
//! - Shared: для read-only просмотра (list/status), несколько читателей одновременно.
//!
//! Lock file path: <db>.lock
//! Lock is released on Drop.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::consts::LOCK_SUFFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Debug)]
pub struct LockGuard {
    file: std::fs::File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

/// `<db>.lock` рядом с файлом базы.
pub fn lock_file_path(db: &Path) -> PathBuf {
    let mut name = db
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(LOCK_SUFFIX);
    db.with_file_name(name)
}

fn open_lock_file(db: &Path) -> Result<std::fs::File> {
    let path = lock_file_path(db);
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("open lock file {}", path.display()))?;
    Ok(f)
}

/// Try to acquire a lock in the requested mode. Returns Err if already locked.
pub fn try_acquire_lock(db: &Path, mode: LockMode) -> Result<LockGuard> {
    let file = open_lock_file(db)?;
    let path = lock_file_path(db);
    match mode {
        LockMode::Shared => file
            .try_lock_shared()
            .with_context(|| format!("database is locked by a writer: {}", path.display()))?,
        LockMode::Exclusive => file
            .try_lock_exclusive()
            .with_context(|| format!("database is already open: {}", path.display()))?,
    }
    Ok(LockGuard { file })
}
