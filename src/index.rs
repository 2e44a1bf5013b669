//! index — упорядоченный разреженный индекс slot -> node внутри именованного узла.
//!
//! SlotIndex хранит только хэндл узла индекса; все операции идут через NodeStore,
//! так что индекс живёт там же, где и сниппеты (и переживает переоткрытие базы).

use anyhow::{Context, Result};

use crate::node::NodeStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotIndex {
    node: u64,
    name: String,
}

impl SlotIndex {
    /// Create-or-attach: повторное открытие подключается к существующему узлу.
    pub fn open<S: NodeStore + ?Sized>(store: &mut S, name: &str) -> Result<Self> {
        let node = store
            .named_node(name)
            .with_context(|| format!("open index node '{}'", name))?;
        Ok(Self {
            node,
            name: name.to_string(),
        })
    }

    pub fn node(&self) -> u64 {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set<S: NodeStore + ?Sized>(&self, store: &mut S, slot: u64, node: u64) -> Result<()> {
        store.index_set(self.node, slot, node)
    }

    pub fn get<S: NodeStore + ?Sized>(&self, store: &S, slot: u64) -> Result<Option<u64>> {
        store.index_get(self.node, slot)
    }

    pub fn del<S: NodeStore + ?Sized>(&self, store: &mut S, slot: u64) -> Result<bool> {
        store.index_del(self.node, slot)
    }

    pub fn first<S: NodeStore + ?Sized>(&self, store: &S) -> Result<Option<u64>> {
        store.index_first(self.node)
    }

    pub fn next<S: NodeStore + ?Sized>(&self, store: &S, slot: u64) -> Result<Option<u64>> {
        store.index_next(self.node, slot)
    }

    pub fn clear<S: NodeStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.index_clear(self.node)
    }

    /// Все пары (slot, node) по возрастанию slot — обход first/next.
    pub fn entries<S: NodeStore + ?Sized>(&self, store: &S) -> Result<Vec<(u64, u64)>> {
        let mut out = Vec::new();
        let mut cur = self.first(store)?;
        while let Some(slot) = cur {
            // запись могла исчезнуть только при гонке; здесь писатель один
            if let Some(node) = self.get(store, slot)? {
                out.push((slot, node));
            }
            cur = self.next(store, slot)?;
        }
        Ok(out)
    }

    pub fn len<S: NodeStore + ?Sized>(&self, store: &S) -> Result<usize> {
        Ok(self.entries(store)?.len())
    }

    pub fn is_empty<S: NodeStore + ?Sized>(&self, store: &S) -> Result<bool> {
        Ok(self.first(store)?.is_none())
    }

    /// Число пустых слотов в диапазоне 0..=последний занятый.
    pub fn slot_gaps<S: NodeStore + ?Sized>(&self, store: &S) -> Result<u64> {
        let entries = self.entries(store)?;
        Ok(match entries.last() {
            // слот u64::MAX возможен только в повреждённом индексе; считаем без переполнения
            Some((last, _)) => last.saturating_add(1).saturating_sub(entries.len() as u64),
            None => 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MemStore;

    #[test]
    fn reopen_attaches_to_same_node() {
        let mut s = MemStore::new();
        let a = SlotIndex::open(&mut s, "$ scriptsnippets").unwrap();
        a.set(&mut s, 3, 42).unwrap();

        let b = SlotIndex::open(&mut s, "$ scriptsnippets").unwrap();
        assert_eq!(a, b);
        assert_eq!(b.get(&s, 3).unwrap(), Some(42));
    }

    #[test]
    fn entries_in_ascending_slot_order_with_gaps() {
        let mut s = MemStore::new();
        let idx = SlotIndex::open(&mut s, "i").unwrap();
        idx.set(&mut s, 2, 20).unwrap();
        idx.set(&mut s, 0, 10).unwrap();
        idx.set(&mut s, 7, 70).unwrap();
        assert_eq!(idx.entries(&s).unwrap(), vec![(0, 10), (2, 20), (7, 70)]);
        assert_eq!(idx.len(&s).unwrap(), 3);

        assert_eq!(idx.slot_gaps(&s).unwrap(), 5);

        idx.clear(&mut s).unwrap();
        assert_eq!(idx.slot_gaps(&s).unwrap(), 0);
        assert!(idx.is_empty(&s).unwrap());
        assert_eq!(idx.first(&s).unwrap(), None);
    }

    #[test]
    fn slot_gaps_with_max_slot_does_not_overflow() {
        let mut s = MemStore::new();
        let idx = SlotIndex::open(&mut s, "i").unwrap();
        idx.set(&mut s, u64::MAX, 1).unwrap();
        assert_eq!(idx.slot_gaps(&s).unwrap(), u64::MAX - 1);
        idx.set(&mut s, 0, 2).unwrap();
        assert_eq!(idx.slot_gaps(&s).unwrap(), u64::MAX - 2);
    }
}
