//! lang — статическая таблица языков: Language <-> тег в хранилище <-> расширение файла.
//!
//! Новый язык = новая строка в LANGUAGES (и вариант enum). Таблица проверяется
//! на биективность при старте менеджера (validate_language_table).

use anyhow::Result;
use std::collections::HashSet;
use std::fmt;

use crate::error::SnipError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Idc,
}

/// (язык, тег в хранилище, расширение файла без точки, в нижнем регистре)
pub const LANGUAGES: &[(Language, &str, &str)] = &[
    (Language::Python, "Python", "py"),
    (Language::Idc, "IDC", "idc"),
];

impl Language {
    /// Тег, под которым язык пишется в поле узла.
    pub fn tag(self) -> &'static str {
        LANGUAGES
            .iter()
            .find(|(l, _, _)| *l == self)
            .map(|(_, tag, _)| *tag)
            .unwrap_or("")
    }

    pub fn ext(self) -> &'static str {
        LANGUAGES
            .iter()
            .find(|(l, _, _)| *l == self)
            .map(|(_, _, ext)| *ext)
            .unwrap_or("")
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        LANGUAGES
            .iter()
            .find(|(_, t, _)| *t == tag)
            .map(|(l, _, _)| *l)
    }

    /// Расширение сравнивается без учёта регистра ("PY" == "py").
    pub fn from_ext(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        LANGUAGES
            .iter()
            .find(|(_, _, e)| *e == ext)
            .map(|(l, _, _)| *l)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Проверить таблицу: теги и расширения уникальны, непусты, каждый вариант описан ровно раз.
pub fn validate_language_table() -> Result<()> {
    validate_table(LANGUAGES)
}

fn validate_table(table: &[(Language, &str, &str)]) -> Result<()> {
    let mut langs = HashSet::new();
    let mut tags = HashSet::new();
    let mut exts = HashSet::new();
    for (lang, tag, ext) in table {
        if tag.is_empty() || ext.is_empty() {
            return Err(SnipError::InvalidLanguageTable(format!("empty tag/ext for {:?}", lang)).into());
        }
        if *ext != ext.to_ascii_lowercase() || ext.starts_with('.') {
            return Err(SnipError::InvalidLanguageTable(format!(
                "extension '{}' must be lowercase without a dot",
                ext
            ))
            .into());
        }
        if !langs.insert(*lang) {
            return Err(SnipError::InvalidLanguageTable(format!("duplicate language {:?}", lang)).into());
        }
        if !tags.insert(*tag) {
            return Err(SnipError::InvalidLanguageTable(format!("duplicate tag '{}'", tag)).into());
        }
        if !exts.insert(*ext) {
            return Err(SnipError::InvalidLanguageTable(format!("duplicate extension '{}'", ext)).into());
        }
    }
    for lang in [Language::Python, Language::Idc] {
        if !langs.contains(&lang) {
            return Err(SnipError::InvalidLanguageTable(format!("{:?} has no entry", lang)).into());
        }
    }
    Ok(())
}
