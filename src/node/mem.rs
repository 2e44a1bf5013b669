//! node/mem — таблица узлов в памяти.
//!
//! MemStore используется напрямую (тесты, встраивание) и как рабочее
//! состояние FileStore между flush().

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use crate::consts::{BLOB_CHUNK, FIRST_NODE, NO_NODE};
use crate::error::SnipError;
use crate::metrics::{record_node_created, record_node_destroyed};

use super::NodeStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: Option<String>,
    pub fields: BTreeMap<u32, String>,
    /// Длина каждого блоба кратна BLOB_CHUNK (хвост добит нулями).
    pub blobs: BTreeMap<u8, Vec<u8>>,
    pub index: BTreeMap<u64, u64>,
}

#[derive(Debug, Clone)]
pub struct MemStore {
    pub(crate) nodes: BTreeMap<u64, Node>,
    pub(crate) names: HashMap<String, u64>,
    pub(crate) next_node: u64,
}

impl Default for MemStore {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            names: HashMap::new(),
            next_node: FIRST_NODE,
        }
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Собрать таблицу из уже разобранных узлов (используется codec::decode).
    pub(crate) fn from_parts(nodes: BTreeMap<u64, Node>, next_node: u64) -> Self {
        let names = nodes
            .iter()
            .filter_map(|(id, n)| n.name.as_ref().map(|s| (s.clone(), *id)))
            .collect();
        Self {
            nodes,
            names,
            next_node,
        }
    }

    pub fn next_node(&self) -> u64 {
        self.next_node
    }

    pub fn nodes(&self) -> impl Iterator<Item = (u64, &Node)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    fn alloc(&mut self, name: Option<String>) -> Result<u64> {
        let id = self.next_node;
        if id == NO_NODE {
            return Err(anyhow::anyhow!("node id space exhausted"));
        }
        self.next_node += 1;
        self.nodes.insert(
            id,
            Node {
                name,
                ..Node::default()
            },
        );
        record_node_created();
        Ok(id)
    }

    fn node(&self, node: u64) -> Result<&Node> {
        self.nodes
            .get(&node)
            .ok_or_else(|| SnipError::UnknownNode(node).into())
    }

    fn node_mut(&mut self, node: u64) -> Result<&mut Node> {
        self.nodes
            .get_mut(&node)
            .ok_or_else(|| SnipError::UnknownNode(node).into())
    }
}

/// Добить данные нулями до кратного BLOB_CHUNK.
pub(crate) fn pad_to_chunks(data: &[u8]) -> Vec<u8> {
    let chunks = (data.len() + BLOB_CHUNK - 1) / BLOB_CHUNK;
    let mut out = Vec::with_capacity(chunks * BLOB_CHUNK);
    out.extend_from_slice(data);
    out.resize(chunks * BLOB_CHUNK, 0);
    out
}

impl NodeStore for MemStore {
    fn create_node(&mut self) -> Result<u64> {
        self.alloc(None)
    }

    fn named_node(&mut self, name: &str) -> Result<u64> {
        if let Some(id) = self.names.get(name) {
            return Ok(*id);
        }
        let id = self.alloc(Some(name.to_string()))?;
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    fn find_named(&self, name: &str) -> Option<u64> {
        self.names.get(name).copied()
    }

    fn contains(&self, node: u64) -> bool {
        self.nodes.contains_key(&node)
    }

    fn destroy_node(&mut self, node: u64) -> Result<()> {
        let n = self
            .nodes
            .remove(&node)
            .ok_or(SnipError::UnknownNode(node))?;
        if let Some(name) = n.name {
            self.names.remove(&name);
        }
        record_node_destroyed();
        Ok(())
    }

    fn set_field(&mut self, node: u64, idx: u32, value: &str) -> Result<()> {
        self.node_mut(node)?.fields.insert(idx, value.to_string());
        Ok(())
    }

    fn field(&self, node: u64, idx: u32) -> Result<Option<String>> {
        Ok(self.node(node)?.fields.get(&idx).cloned())
    }

    fn set_blob(&mut self, node: u64, tag: u8, data: &[u8]) -> Result<()> {
        let padded = pad_to_chunks(data);
        self.node_mut(node)?.blobs.insert(tag, padded);
        Ok(())
    }

    fn blob(&self, node: u64, tag: u8) -> Result<Option<Vec<u8>>> {
        Ok(self.node(node)?.blobs.get(&tag).cloned())
    }

    fn index_set(&mut self, node: u64, key: u64, value: u64) -> Result<()> {
        self.node_mut(node)?.index.insert(key, value);
        Ok(())
    }

    fn index_get(&self, node: u64, key: u64) -> Result<Option<u64>> {
        Ok(self.node(node)?.index.get(&key).copied())
    }

    fn index_del(&mut self, node: u64, key: u64) -> Result<bool> {
        Ok(self.node_mut(node)?.index.remove(&key).is_some())
    }

    fn index_first(&self, node: u64) -> Result<Option<u64>> {
        Ok(self.node(node)?.index.keys().next().copied())
    }

    fn index_next(&self, node: u64, key: u64) -> Result<Option<u64>> {
        Ok(self
            .node(node)?
            .index
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(k, _)| *k))
    }

    fn index_clear(&mut self, node: u64) -> Result<()> {
        self.node_mut(node)?.index.clear();
        Ok(())
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
