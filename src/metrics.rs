//! Lightweight global metrics for QuiverSnip.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Node store (узлы, flush)
//! - Import / export папок
//! - Разрешение хэндлов индекса

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Node store -----
static NODES_CREATED: AtomicU64 = AtomicU64::new(0);
static NODES_DESTROYED: AtomicU64 = AtomicU64::new(0);
static STORE_FLUSHES: AtomicU64 = AtomicU64::new(0);

// ----- Folder sync -----
static SNIPPETS_IMPORTED: AtomicU64 = AtomicU64::new(0);
static FILES_SKIPPED: AtomicU64 = AtomicU64::new(0);
static SNIPPETS_EXPORTED: AtomicU64 = AtomicU64::new(0);

// ----- Index -----
static RESOLVE_FAILURES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub nodes_created: u64,
    pub nodes_destroyed: u64,
    pub store_flushes: u64,

    pub snippets_imported: u64,
    pub files_skipped: u64,
    pub snippets_exported: u64,

    pub resolve_failures: u64,
}

pub fn record_node_created() {
    NODES_CREATED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_node_destroyed() {
    NODES_DESTROYED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_store_flush() {
    STORE_FLUSHES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snippet_imported() {
    SNIPPETS_IMPORTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_file_skipped() {
    FILES_SKIPPED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snippets_exported(n: usize) {
    SNIPPETS_EXPORTED.fetch_add(n as u64, Ordering::Relaxed);
}

pub fn record_resolve_failure() {
    RESOLVE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        nodes_created: NODES_CREATED.load(Ordering::Relaxed),
        nodes_destroyed: NODES_DESTROYED.load(Ordering::Relaxed),
        store_flushes: STORE_FLUSHES.load(Ordering::Relaxed),
        snippets_imported: SNIPPETS_IMPORTED.load(Ordering::Relaxed),
        files_skipped: FILES_SKIPPED.load(Ordering::Relaxed),
        snippets_exported: SNIPPETS_EXPORTED.load(Ordering::Relaxed),
        resolve_failures: RESOLVE_FAILURES.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    for c in [
        &NODES_CREATED,
        &NODES_DESTROYED,
        &STORE_FLUSHES,
        &SNIPPETS_IMPORTED,
        &FILES_SKIPPED,
        &SNIPPETS_EXPORTED,
        &RESOLVE_FAILURES,
    ] {
        c.store(0, Ordering::Relaxed);
    }
}
