use anyhow::Result;
use std::path::PathBuf;

use quiversnip::{FileStore, SnipError, SnippetManager};

pub fn exec(path: PathBuf, folder: Option<PathBuf>) -> Result<()> {
    let mut man = SnippetManager::new(FileStore::open(&path)?)?;
    if !man.import_folder(folder.as_deref())? {
        // false бывает только для явно указанной папки
        return Err(SnipError::FolderNotFound(folder.unwrap_or_default()).into());
    }
    println!("OK load: {} snippet(s)", man.count()?);
    Ok(())
}
