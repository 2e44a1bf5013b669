//! snippet — одна запись: язык, имя, тело + хэндл узла и позиция в индексе.
//!
//! Раскладка узла сниппета:
//! - поле FIELD_NAME (0) — имя
//! - поле FIELD_LANG (1) — тег языка ("Python", "IDC", ...)
//! - блоб BODY_TAG ('X') — тело в UTF-8 (backend может добить нулями)

use anyhow::{Context, Result};
use log::debug;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path};

use crate::consts::{BODY_TAG, FIELD_LANG, FIELD_NAME, NO_NODE, NO_SLOT};
use crate::error::SnipError;
use crate::lang::Language;
use crate::node::NodeStore;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Snippet {
    /// Тег языка в том виде, в каком он хранится в узле.
    pub lang: String,
    pub name: String,
    pub body: String,
    /// Хэндл узла; NO_NODE — ещё не сохранён.
    pub node: u64,
    /// Позиция в индексе; NO_SLOT — не назначена.
    pub slot: u64,
}

impl Snippet {
    pub fn new(lang: Language, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            lang: lang.tag().to_string(),
            name: name.into(),
            body: body.into(),
            node: NO_NODE,
            slot: NO_SLOT,
        }
    }

    /// Язык по таблице; None для тегов, которых в таблице нет.
    pub fn language(&self) -> Option<Language> {
        Language::from_tag(&self.lang)
    }

    pub fn is_saved(&self) -> bool {
        self.node != NO_NODE
    }

    /// Имя файла при экспорте: `<name>.<ext>`.
    ///
    /// Имя из хранилища должно быть ровно одним компонентом пути: без
    /// разделителей, `..` и абсолютных путей, иначе SnipError::UnsafeFileName.
    pub fn file_name(&self) -> Result<String> {
        let lang = self
            .language()
            .ok_or_else(|| SnipError::UnknownLanguage(self.lang.clone()))?;
        if !is_plain_file_name(&self.name) {
            return Err(SnipError::UnsafeFileName(self.name.clone()).into());
        }
        Ok(format!("{}.{}", self.name, lang.ext()))
    }

    /// Прочитать сниппет из файла.
    ///
    /// Ok(None): файла нет (или исчез между листингом и чтением), это не обычный
    /// файл, либо расширение не из таблицы языков. Узел и слот не назначены —
    /// их выдаст save().
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let lang = match path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_ext)
        {
            Some(l) => l,
            None => return Ok(None),
        };
        let name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s.to_string(),
            None => return Ok(None),
        };

        let body = match fs::read_to_string(path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read snippet file {}", path.display()))
            }
        };

        Ok(Some(Self::new(lang, name, body)))
    }

    /// Прочитать сниппет из узла. `fast` — не читать тело (только метаданные).
    ///
    /// Несуществующий узел — SnipError::UnknownNode.
    pub fn from_node<S: NodeStore + ?Sized>(
        store: &S,
        node: u64,
        slot: u64,
        fast: bool,
    ) -> Result<Self> {
        if !store.contains(node) {
            return Err(SnipError::UnknownNode(node).into());
        }
        let name = store.field(node, FIELD_NAME)?.unwrap_or_default();
        let lang = store.field(node, FIELD_LANG)?.unwrap_or_default();

        let body = if fast {
            String::new()
        } else {
            match store.blob(node, BODY_TAG)? {
                Some(bytes) => {
                    let text = String::from_utf8(bytes)
                        .with_context(|| format!("node {}: body is not valid UTF-8", node))?;
                    text.trim_end_matches('\0').to_string()
                }
                None => String::new(),
            }
        };

        Ok(Self {
            lang,
            name,
            body,
            node,
            slot,
        })
    }

    /// Сохранить в новый узел и запомнить slot/node.
    ///
    /// Каждый вызов выделяет НОВЫЙ узел; прежний (если был) остаётся сиротой —
    /// удаляйте его до повторного save().
    pub fn save<S: NodeStore + ?Sized>(&mut self, store: &mut S, slot: u64) -> Result<()> {
        let node = store.create_node()?;
        store.set_field(node, FIELD_NAME, &self.name)?;
        store.set_field(node, FIELD_LANG, &self.lang)?;
        store
            .set_blob(node, BODY_TAG, self.body.as_bytes())
            .with_context(|| format!("write body of '{}' into node {}", self.name, node))?;

        self.slot = slot;
        self.node = node;
        debug!("saved snippet '{}' -> node {} slot {}", self.name, node, slot);
        Ok(())
    }
}

impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lang: {}; title: {}; index: {}",
            self.lang,
            self.name,
            if self.slot == NO_SLOT {
                "-".to_string()
            } else {
                self.slot.to_string()
            }
        )
    }
}

fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut comps = Path::new(name).components();
    matches!(
        (comps.next(), comps.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MemStore;

    #[test]
    fn save_then_from_node_roundtrips() {
        let mut s = MemStore::new();
        let mut snip = Snippet::new(Language::Idc, "dump", "auto x = 1;\nMessage(\"%d\", x);\n");
        assert!(!snip.is_saved());
        snip.save(&mut s, 4).unwrap();
        assert!(snip.is_saved());
        assert_eq!(snip.slot, 4);

        let back = Snippet::from_node(&s, snip.node, 4, false).unwrap();
        assert_eq!(back, snip);
    }

    #[test]
    fn fast_load_skips_body() {
        let mut s = MemStore::new();
        let mut snip = Snippet::new(Language::Python, "hello", "print(1)");
        snip.save(&mut s, 0).unwrap();

        let fast = Snippet::from_node(&s, snip.node, 0, true).unwrap();
        assert_eq!(fast.name, "hello");
        assert_eq!(fast.language(), Some(Language::Python));
        assert!(fast.body.is_empty());
    }

    #[test]
    fn unknown_node_is_resolution_error() {
        let s = MemStore::new();
        let err = Snippet::from_node(&s, 999, 0, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnipError>(),
            Some(SnipError::UnknownNode(999))
        ));
    }

    #[test]
    fn unknown_tag_has_no_file_name() {
        let mut snip = Snippet::new(Language::Python, "a", "");
        snip.lang = "Lua".to_string();
        assert_eq!(snip.language(), None);
        let err = snip.file_name().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnipError>(),
            Some(SnipError::UnknownLanguage(t)) if t == "Lua"
        ));
    }

    #[test]
    fn display_matches_listing_format() {
        let mut snip = Snippet::new(Language::Python, "hello", "x");
        assert_eq!(snip.to_string(), "lang: Python; title: hello; index: -");
        snip.slot = 2;
        assert_eq!(snip.to_string(), "lang: Python; title: hello; index: 2");
    }

    #[test]
    fn path_like_names_have_no_file_name() {
        for bad in ["../x", "/etc/passwd", "a/b", "a\\b", "..", ".", ""] {
            let snip = Snippet::new(Language::Python, bad, "");
            let err = snip.file_name().unwrap_err();
            assert!(
                matches!(err.downcast_ref::<SnipError>(), Some(SnipError::UnsafeFileName(n)) if n == bad),
                "name {bad:?}: {err:#}"
            );
        }
        let ok = Snippet::new(Language::Idc, "0010 List..funcs", "");
        assert_eq!(ok.file_name().unwrap(), "0010 List..funcs.idc");
    }
}
