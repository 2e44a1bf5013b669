use anyhow::{anyhow, Result};
use std::path::PathBuf;

use quiversnip::{FileStore, SnippetManager};

pub fn exec(path: PathBuf, folder: Option<PathBuf>) -> Result<()> {
    let man = SnippetManager::new(FileStore::open_ro(&path)?)?;
    let (ok, msg) = man.export_folder(folder.as_deref());
    if !ok {
        return Err(anyhow!(msg));
    }
    println!("{}", msg);
    Ok(())
}
