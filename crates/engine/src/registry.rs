// crates/engine/src/registry.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use meta::{StatSnapshot, XattrFingerprint};

use crate::MatchOptions;

/// Inode identity: unique per `(device, inode number)` pair. Two pathnames
/// with the same id are already hard links of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InodeId {
    pub dev: u64,
    pub ino: u64,
}

impl InodeId {
    pub fn of(stat: &StatSnapshot) -> Self {
        InodeId {
            dev: stat.dev,
            ino: stat.ino,
        }
    }
}

/// Everything known about one inode: the stat capture, its discovered
/// pathnames in discovery order, and the simulated state the planner
/// advances as links are scheduled.
#[derive(Debug, Clone)]
pub struct InodeRecord {
    pub id: InodeId,
    pub observed: StatSnapshot,
    /// Tracks the stat as if the planned links had been applied so far;
    /// starts equal to `observed`.
    pub sim: StatSnapshot,
    pub xattr: XattrFingerprint,
    pub paths: Vec<PathBuf>,
}

/// Outcome of admitting one pathname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A record was created for a newly seen inode.
    First(InodeId),
    /// The pathname was appended to an existing record.
    AdditionalPath,
    NotRegular,
    TooSmall,
    TooLarge,
}

/// The canonical pathname-to-inode mapping for one scan.
#[derive(Debug, Default)]
pub struct InodeRegistry {
    records: HashMap<InodeId, InodeRecord>,
    /// Maximum link count per device, discovered on first contact.
    link_max: HashMap<u64, u64>,
    link_max_override: Option<u64>,
}

impl InodeRegistry {
    pub fn new(link_max_override: Option<u64>) -> Self {
        InodeRegistry {
            link_max_override,
            ..Default::default()
        }
    }

    /// Record one discovered pathname, creating or extending the inode
    /// record, or rejecting the file with a verdict the caller counts.
    pub fn admit(
        &mut self,
        path: PathBuf,
        stat: StatSnapshot,
        xattr: XattrFingerprint,
        opts: &MatchOptions,
    ) -> Admission {
        if !stat.is_regular {
            return Admission::NotRegular;
        }
        if stat.size < opts.min_size {
            return Admission::TooSmall;
        }
        if opts.max_size.is_some_and(|max| stat.size > max) {
            return Admission::TooLarge;
        }

        if !self.link_max.contains_key(&stat.dev) {
            let max = self.link_max_override.unwrap_or_else(|| meta::link_max(&path));
            self.link_max.insert(stat.dev, max);
        }

        let id = InodeId::of(&stat);
        match self.records.get_mut(&id) {
            Some(rec) => {
                // Overlapping roots can hand us the same pathname twice.
                if !rec.paths.contains(&path) {
                    rec.paths.push(path);
                }
                Admission::AdditionalPath
            }
            None => {
                self.records.insert(
                    id,
                    InodeRecord {
                        id,
                        observed: stat,
                        sim: stat,
                        xattr,
                        paths: vec![path],
                    },
                );
                Admission::First(id)
            }
        }
    }

    pub fn contains(&self, id: InodeId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: InodeId) -> &InodeRecord {
        &self.records[&id]
    }

    pub fn get_mut(&mut self, id: InodeId) -> &mut InodeRecord {
        self.records.get_mut(&id).expect("live inode record")
    }

    /// Detach `path` from its record. Returns true when that emptied the
    /// record's path set and removed the record.
    pub fn remove_path(&mut self, id: InodeId, path: &Path) -> bool {
        let rec = self.get_mut(id);
        if let Some(pos) = rec.paths.iter().position(|p| p == path) {
            rec.paths.remove(pos);
        }
        if rec.paths.is_empty() {
            self.records.remove(&id);
            true
        } else {
            false
        }
    }

    /// Attach a migrated pathname to `id`'s record.
    pub fn add_path(&mut self, id: InodeId, path: PathBuf) {
        self.get_mut(id).paths.push(path);
    }

    pub fn link_max(&self, dev: u64) -> u64 {
        self.link_max
            .get(&dev)
            .copied()
            .unwrap_or(meta::DEFAULT_LINK_MAX)
    }

    pub fn records(&self) -> impl Iterator<Item = &InodeRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
