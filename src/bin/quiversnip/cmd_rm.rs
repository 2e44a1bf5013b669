use anyhow::{anyhow, Result};
use std::path::PathBuf;

use quiversnip::{FileStore, Snippet, SnippetManager};

pub fn exec(path: PathBuf, slot: u64) -> Result<()> {
    let mut man = SnippetManager::new(FileStore::open(&path)?)?;
    let node = man
        .index()
        .get(man.store(), slot)?
        .ok_or_else(|| anyhow!("slot {} is empty", slot))?;
    let mut snip = Snippet::from_node(man.store(), node, slot, true)?;
    let name = snip.name.clone();
    man.delete(&mut snip)?;
    println!("OK rm: slot {} ('{}')", slot, name);
    Ok(())
}
