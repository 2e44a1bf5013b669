//! manager — SnippetManager: индекс сниппетов поверх NodeStore и синхронизация с папкой.
//!
//! Операции:
//! - retrieve_all(fast)   — все сниппеты по возрастанию slot
//! - delete(&mut snippet) — убрать запись индекса, уничтожить узел, сбросить хэндл
//! - delete_all()         — delete() для каждого + полная очистка индекса
//! - import_folder(dir)   — заменить коллекцию содержимым папки (не merge)
//! - export_folder(dir)   — записать по файлу на сниппет
//!
//! Менеджер рассчитан на одного вызывающего: мутации берут &mut self, а FileStore
//! держит эксклюзивный lock на файл базы.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SnipConfig;
use crate::consts::NO_NODE;
use crate::error::SnipError;
use crate::index::SlotIndex;
use crate::lang::validate_language_table;
use crate::metrics::{
    record_file_skipped, record_resolve_failure, record_snippet_imported, record_snippets_exported,
};
use crate::node::NodeStore;
use crate::snippet::Snippet;

pub struct SnippetManager<S: NodeStore> {
    store: S,
    index: SlotIndex,
    cfg: SnipConfig,
}

impl<S: NodeStore> SnippetManager<S> {
    pub fn new(store: S) -> Result<Self> {
        Self::with_config(store, SnipConfig::from_env())
    }

    /// Проверяет таблицу языков и подключается к узлу индекса (create-or-attach).
    pub fn with_config(mut store: S, cfg: SnipConfig) -> Result<Self> {
        validate_language_table()?;
        let index = SlotIndex::open(&mut store, &cfg.index_name)?;
        // новый узел индекса сразу на диск, чтобы read-only открытия могли к нему подключиться
        store.flush()?;
        Ok(Self { store, index, cfg })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn index(&self) -> &SlotIndex {
        &self.index
    }

    pub fn config(&self) -> &SnipConfig {
        &self.cfg
    }

    /// Все сниппеты по возрастанию slot. Хэндл, который не разрешается, — ошибка
    /// (SnipError::UnknownNode), а не молчаливый пропуск.
    pub fn retrieve_all(&self, fast: bool) -> Result<Vec<Snippet>> {
        let mut out = Vec::new();
        let mut cur = self.index.first(&self.store)?;
        while let Some(slot) = cur {
            if let Some(node) = self.index.get(&self.store, slot)? {
                let snip = Snippet::from_node(&self.store, node, slot, fast).map_err(|e| {
                    record_resolve_failure();
                    e.context(format!("resolve index slot {} -> node {}", slot, node))
                })?;
                out.push(snip);
            }
            cur = self.index.next(&self.store, slot)?;
        }
        Ok(out)
    }

    /// Число записей индекса.
    pub fn count(&self) -> Result<usize> {
        self.index.len(&self.store)
    }

    /// Удалить один сниппет. Ok(false), если он не был сохранён.
    ///
    /// Порядок: запись индекса -> уничтожение ИСХОДНОГО узла -> сброс хэндла.
    pub fn delete(&mut self, snippet: &mut Snippet) -> Result<bool> {
        let deleted = self.delete_inner(snippet)?;
        if deleted {
            self.store.flush()?;
        }
        Ok(deleted)
    }

    fn delete_inner(&mut self, snippet: &mut Snippet) -> Result<bool> {
        if snippet.node == NO_NODE {
            return Ok(false);
        }
        let node = snippet.node;
        self.index.del(&mut self.store, snippet.slot)?;
        if self.store.contains(node) {
            self.store
                .destroy_node(node)
                .with_context(|| format!("destroy node {} of '{}'", node, snippet.name))?;
        } else {
            warn!("delete '{}': node {} already gone", snippet.name, node);
        }
        snippet.node = NO_NODE;
        debug!("deleted snippet '{}' (slot {}, node {})", snippet.name, snippet.slot, node);
        Ok(true)
    }

    /// Удалить все сниппеты и очистить индекс целиком.
    ///
    /// Записи индекса с неразрешимыми хэндлами логируются и снимаются финальной
    /// очисткой индекса.
    pub fn delete_all(&mut self) -> Result<()> {
        let removed = self.delete_all_inner()?;
        self.store.flush()?;
        info!("deleted {} snippet(s)", removed);
        Ok(())
    }

    fn delete_all_inner(&mut self) -> Result<usize> {
        let mut removed = 0usize;
        for (slot, node) in self.index.entries(&self.store)? {
            match Snippet::from_node(&self.store, node, slot, true) {
                Ok(mut snip) => {
                    if self.delete_inner(&mut snip)? {
                        removed += 1;
                    }
                }
                Err(e) => {
                    record_resolve_failure();
                    warn!("delete_all: slot {} -> node {} does not resolve: {:#}", slot, node, e);
                }
            }
        }
        self.index.clear(&mut self.store)?;
        Ok(removed)
    }

    /// Папка по умолчанию: `<каталог файла базы>/<snippets_dir_name>`.
    pub fn default_folder(&self) -> Result<PathBuf> {
        let db = self
            .cfg
            .db_path
            .as_deref()
            .or_else(|| self.store.database_path())
            .ok_or(SnipError::NoDatabasePath)?;
        let parent = match db.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(parent.join(&self.cfg.snippets_dir_name))
    }

    /// None или пустой путь -> папка по умолчанию (создаётся при отсутствии).
    fn resolve_folder(&self, folder: Option<&Path>) -> Result<(PathBuf, bool)> {
        match folder {
            Some(p) if !p.as_os_str().is_empty() => Ok((p.to_path_buf(), false)),
            _ => {
                let dir = self.default_folder()?;
                if !dir.exists() {
                    fs::create_dir_all(&dir)
                        .with_context(|| format!("create snippets folder {}", dir.display()))?;
                }
                Ok((dir, true))
            }
        }
    }

    /// Импорт: заменить все сниппеты содержимым папки (без рекурсии).
    ///
    /// Ok(false) — явно указанная папка не существует; база при этом не меняется.
    /// Пустая папка — успешный импорт нуля сниппетов.
    pub fn import_folder(&mut self, folder: Option<&Path>) -> Result<bool> {
        let (dir, is_default) = self.resolve_folder(folder)?;
        if !dir.is_dir() {
            info!("import: folder {} not found", dir.display());
            return Ok(false);
        }

        // Файлы читаются до очистки: ошибка чтения не должна снести старую коллекцию.
        let mut snippets = read_folder(&dir)?;

        self.delete_all_inner()?;

        // sort_by стабильный: одинаковые имена сохраняют порядок листинга
        snippets.sort_by(|a, b| a.name.cmp(&b.name));

        for (slot, snip) in snippets.iter_mut().enumerate() {
            let slot = slot as u64;
            snip.save(&mut self.store, slot)?;
            self.index.set(&mut self.store, slot, snip.node)?;
            record_snippet_imported();
        }
        self.store.flush()?;

        info!(
            "imported {} snippet(s) from {}{}",
            snippets.len(),
            dir.display(),
            if is_default { " (default folder)" } else { "" }
        );
        Ok(true)
    }

    /// Экспорт: по файлу `<name>.<ext>` на сниппет, существующие файлы перезаписываются.
    ///
    /// Возвращает (успех, сообщение для пользователя).
    pub fn export_folder(&self, folder: Option<&Path>) -> (bool, String) {
        match self.try_export_folder(folder) {
            Ok((n, dir)) => (true, format!("Saved {} snippets to {}", n, dir.display())),
            Err(e) => {
                warn!("export failed: {:#}", e);
                (false, format!("Failed to save: {:#}", e))
            }
        }
    }

    /// То же, что export_folder, но с ошибкой как Result.
    pub fn try_export_folder(&self, folder: Option<&Path>) -> Result<(usize, PathBuf)> {
        let (dir, _) = self.resolve_folder(folder)?;
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("create export folder {}", dir.display()))?;
        }

        let snippets = self.retrieve_all(false)?;
        // имена проверяются до первой записи: плохое имя не оставляет частичный экспорт
        let paths = snippets
            .iter()
            .map(|s| -> Result<PathBuf> { Ok(dir.join(s.file_name()?)) })
            .collect::<Result<Vec<_>>>()?;
        for (snip, path) in snippets.iter().zip(&paths) {
            fs::write(path, snip.body.as_bytes())
                .with_context(|| format!("write {}", path.display()))?;
            debug!("exported '{}' -> {}", snip.name, path.display());
        }
        record_snippets_exported(snippets.len());
        info!("exported {} snippet(s) to {}", snippets.len(), dir.display());
        Ok((snippets.len(), dir))
    }
}

/// Все распознанные сниппеты папки в порядке листинга.
fn read_folder(dir: &Path) -> Result<Vec<Snippet>> {
    let mut out = Vec::new();
    let entries = fs::read_dir(dir).with_context(|| format!("list folder {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list folder {}", dir.display()))?;
        let path = entry.path();
        match Snippet::from_file(&path)? {
            Some(snip) => out.push(snip),
            None => {
                record_file_skipped();
                debug!("import: skip {}", path.display());
            }
        }
    }
    Ok(out)
}
