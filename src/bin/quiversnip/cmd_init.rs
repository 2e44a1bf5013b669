use anyhow::Result;
use std::path::PathBuf;

use quiversnip::{FileStore, SnippetManager};

pub fn exec(path: PathBuf) -> Result<()> {
    let existed = path.exists();
    // существующий файл проверяется открытием: наш формат и индекс подключается
    let man = SnippetManager::new(FileStore::open_or_create(&path)?)?;
    if existed {
        println!(
            "Database already initialized at {} ({} snippet(s))",
            path.display(),
            man.count()?
        );
    } else {
        println!("Initialized database at {}", path.display());
    }
    Ok(())
}
