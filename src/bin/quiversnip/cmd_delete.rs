use anyhow::Result;
use std::path::PathBuf;

use quiversnip::{FileStore, SnippetManager};

pub fn exec(path: PathBuf) -> Result<()> {
    let mut man = SnippetManager::new(FileStore::open(&path)?)?;
    let before = man.count()?;
    man.delete_all()?;
    println!("OK delete: removed {} snippet(s)", before);
    Ok(())
}
