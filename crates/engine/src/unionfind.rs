// crates/engine/src/unionfind.rs

use std::collections::HashMap;

use crate::InodeId;

/// Disjoint sets over inode ids, with path compression and union by rank.
/// Insertion order is remembered so [`groups`](UnionFind::groups) comes out
/// deterministic.
#[derive(Debug, Default)]
pub(crate) struct UnionFind {
    index: HashMap<InodeId, usize>,
    parent: Vec<usize>,
    rank: Vec<u8>,
    items: Vec<InodeId>,
}

impl UnionFind {
    pub fn insert(&mut self, id: InodeId) -> usize {
        if let Some(&i) = self.index.get(&id) {
            return i;
        }
        let i = self.items.len();
        self.index.insert(id, i);
        self.items.push(id);
        self.parent.push(i);
        self.rank.push(0);
        i
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    pub fn union(&mut self, a: InodeId, b: InodeId) {
        let ia = self.insert(a);
        let ib = self.insert(b);
        let ra = self.find(ia);
        let rb = self.find(ib);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    /// Every set, members in insertion order, sets ordered by their first
    /// member's insertion.
    pub fn groups(&mut self) -> Vec<Vec<InodeId>> {
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<InodeId>> = Vec::new();
        for i in 0..self.items.len() {
            let root = self.find(i);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(self.items[i]);
        }
        groups
    }
}
