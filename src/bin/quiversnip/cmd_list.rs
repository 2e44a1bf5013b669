use anyhow::{Context, Result};
use std::path::PathBuf;

use quiversnip::{FileStore, SnippetManager};

pub fn exec(path: PathBuf, body: bool, json: bool) -> Result<()> {
    let man = SnippetManager::new(FileStore::open_ro(&path)?)?;
    let snippets = man.retrieve_all(!(body || json))?;

    if json {
        let s = serde_json::to_string_pretty(&snippets).context("serialize snippets")?;
        println!("{}", s);
        return Ok(());
    }

    if snippets.is_empty() {
        println!("(no snippets)");
        return Ok(());
    }
    for (i, snip) in snippets.iter().enumerate() {
        println!("#{:03} {}", i, snip);
        if body {
            println!("<body>\n{}", snip.body);
            println!("</body>\n------");
        }
    }
    Ok(())
}
