//! ext — внешняя поверхность для хоста: save / load / delete / man.
//!
//! Тонкие делегации в SnippetManager без собственной логики. Пустая строка
//! папки означает папку по умолчанию. Ошибки загрузки логируются и
//! превращаются в `false`.

use log::error;
use std::path::Path;

use crate::manager::SnippetManager;
use crate::node::NodeStore;

pub struct SnippetsExt<S: NodeStore> {
    man: SnippetManager<S>,
}

impl<S: NodeStore> SnippetsExt<S> {
    pub fn new(man: SnippetManager<S>) -> Self {
        Self { man }
    }

    /// Экспорт в папку; (успех, сообщение).
    pub fn save(&self, folder: &str) -> (bool, String) {
        self.man.export_folder(folder_arg(folder))
    }

    /// Импорт из папки с заменой текущих сниппетов.
    pub fn load(&mut self, folder: &str) -> bool {
        match self.man.import_folder(folder_arg(folder)) {
            Ok(ok) => ok,
            Err(e) => {
                error!("load snippets failed: {:#}", e);
                false
            }
        }
    }

    /// Удалить все сниппеты.
    pub fn delete(&mut self) {
        if let Err(e) = self.man.delete_all() {
            error!("delete snippets failed: {:#}", e);
        }
    }

    pub fn man(&mut self) -> &mut SnippetManager<S> {
        &mut self.man
    }
}

fn folder_arg(folder: &str) -> Option<&Path> {
    if folder.is_empty() {
        None
    } else {
        Some(Path::new(folder))
    }
}
