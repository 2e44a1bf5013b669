use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use quiversnip::metrics;
use quiversnip::{FileStore, NodeStore, SnippetManager};

#[derive(Serialize)]
struct Status {
    path: String,
    nodes: usize,
    next_node: u64,
    index_name: String,
    index_node: u64,
    snippets: usize,
    /// Пропуски в нумерации слотов (после точечных удалений).
    slot_gaps: u64,
    /// Узлы, не достижимые из индекса (кроме самого индекса).
    orphan_nodes: usize,
    default_folder: Option<String>,
    metrics: metrics::MetricsSnapshot,
}

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let man = SnippetManager::new(FileStore::open_ro(&path)?)?;
    let store = man.store();
    let entries = man.index().entries(store)?;

    let slot_gaps = man.index().slot_gaps(store)?;
    let reachable: std::collections::HashSet<u64> = entries.iter().map(|(_, n)| *n).collect();
    let orphan_nodes = store
        .mem()
        .nodes()
        .filter(|(id, _)| *id != man.index().node() && !reachable.contains(id))
        .count();

    let st = Status {
        path: path.display().to_string(),
        nodes: store.node_count(),
        next_node: store.mem().next_node(),
        index_name: man.index().name().to_string(),
        index_node: man.index().node(),
        snippets: entries.len(),
        slot_gaps,
        orphan_nodes,
        default_folder: man.default_folder().ok().map(|p| p.display().to_string()),
        metrics: metrics::snapshot(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&st).context("serialize status")?);
        return Ok(());
    }

    println!("QuiverSnip status:");
    println!("  path:           {}", st.path);
    println!("  nodes:          {} (next_node={})", st.nodes, st.next_node);
    println!("  index:          '{}' (node {})", st.index_name, st.index_node);
    println!("  snippets:       {}", st.snippets);
    println!("  slot gaps:      {}", st.slot_gaps);
    println!("  orphan nodes:   {}", st.orphan_nodes);
    println!(
        "  default folder: {}",
        st.default_folder.as_deref().unwrap_or("(unknown)")
    );
    println!(
        "  metrics:        created={} destroyed={} flushes={}",
        st.metrics.nodes_created, st.metrics.nodes_destroyed, st.metrics.store_flushes
    );
    Ok(())
}
