// crates/engine/src/index.rs

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

use meta::StatSnapshot;

use crate::{InodeId, MatchOptions};

/// Bucket key for candidate inodes. Two inodes can be linkable only if
/// their keys are identical; the reverse is proven by the equality oracle.
///
/// The key carries the device (cross-device links are impossible), the size,
/// the whole-second mtime when times must match, and the basename under
/// `--same-name`. Mode, ownership and xattrs stay out of the key so that
/// near-miss pairs are still compared and show up in the mismatch counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquivalenceKey {
    dev: u64,
    size: u64,
    mtime_secs: Option<i64>,
    name: Option<OsString>,
}

impl EquivalenceKey {
    pub fn new(stat: &StatSnapshot, basename: Option<&OsStr>, opts: &MatchOptions) -> Self {
        let mtime_secs = if opts.ignore_time || opts.content_only {
            None
        } else {
            Some(stat.mtime.unix_seconds())
        };
        let name = if opts.same_name {
            basename.map(|n| n.to_os_string())
        } else {
            None
        };
        EquivalenceKey {
            dev: stat.dev,
            size: stat.size,
            mtime_secs,
            name,
        }
    }
}

/// Candidate inodes bucketed by equivalence key, preserving first-insertion
/// order of both buckets and members so plans are deterministic.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    by_key: HashMap<EquivalenceKey, usize>,
    buckets: Vec<Vec<InodeId>>,
}

impl CandidateIndex {
    pub fn insert(&mut self, key: EquivalenceKey, id: InodeId) {
        let slot = match self.by_key.get(&key) {
            Some(&i) => i,
            None => {
                self.buckets.push(Vec::new());
                self.by_key.insert(key, self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        self.buckets[slot].push(id);
    }

    /// Buckets with at least two members, in insertion order.
    pub fn buckets(&self) -> impl Iterator<Item = &[InodeId]> {
        self.buckets
            .iter()
            .filter(|b| b.len() >= 2)
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;

    fn snap(dev: u64, size: u64, mtime: i64) -> StatSnapshot {
        StatSnapshot {
            dev,
            ino: 1,
            size,
            mtime: FileTime::from_unix_time(mtime, 500),
            atime: FileTime::from_unix_time(mtime, 0),
            mode: 0o100644,
            uid: 0,
            gid: 0,
            nlink: 1,
            is_regular: true,
        }
    }

    fn id(ino: u64) -> InodeId {
        InodeId { dev: 1, ino }
    }

    #[test]
    fn key_separates_sizes_and_devices() {
        let opts = MatchOptions::default();
        let a = EquivalenceKey::new(&snap(1, 10, 0), None, &opts);
        let b = EquivalenceKey::new(&snap(1, 11, 0), None, &opts);
        let c = EquivalenceKey::new(&snap(2, 10, 0), None, &opts);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn mtime_leaves_key_when_ignored() {
        let strict = MatchOptions::default();
        let loose = MatchOptions {
            ignore_time: true,
            ..Default::default()
        };
        let early = snap(1, 10, 100);
        let late = snap(1, 10, 200);
        assert_ne!(
            EquivalenceKey::new(&early, None, &strict),
            EquivalenceKey::new(&late, None, &strict)
        );
        assert_eq!(
            EquivalenceKey::new(&early, None, &loose),
            EquivalenceKey::new(&late, None, &loose)
        );
    }

    #[test]
    fn key_truncates_mtime_to_seconds() {
        let opts = MatchOptions::default();
        let mut a = snap(1, 10, 100);
        let mut b = snap(1, 10, 100);
        a.mtime = FileTime::from_unix_time(100, 1);
        b.mtime = FileTime::from_unix_time(100, 999_999_999);
        assert_eq!(
            EquivalenceKey::new(&a, None, &opts),
            EquivalenceKey::new(&b, None, &opts)
        );
    }

    #[test]
    fn basename_enters_key_under_same_name() {
        let opts = MatchOptions {
            same_name: true,
            ..Default::default()
        };
        let st = snap(1, 10, 0);
        let x = EquivalenceKey::new(&st, Some(OsStr::new("x")), &opts);
        let x2 = EquivalenceKey::new(&st, Some(OsStr::new("x")), &opts);
        let y = EquivalenceKey::new(&st, Some(OsStr::new("y")), &opts);
        assert_eq!(x, x2);
        assert_ne!(x, y);
    }

    #[test]
    fn buckets_keep_insertion_order_and_need_two_members() {
        let opts = MatchOptions::default();
        let mut index = CandidateIndex::default();
        let big = snap(1, 100, 0);
        let small = snap(1, 10, 0);
        index.insert(EquivalenceKey::new(&big, None, &opts), id(1));
        index.insert(EquivalenceKey::new(&small, None, &opts), id(2));
        index.insert(EquivalenceKey::new(&big, None, &opts), id(3));
        index.insert(EquivalenceKey::new(&small, None, &opts), id(4));
        index.insert(EquivalenceKey::new(&big, None, &opts), id(5));

        let buckets: Vec<_> = index.buckets().collect();
        assert_eq!(buckets, vec![&[id(1), id(3), id(5)][..], &[id(2), id(4)][..]]);
    }

    #[test]
    fn singleton_buckets_are_skipped() {
        let opts = MatchOptions::default();
        let mut index = CandidateIndex::default();
        index.insert(EquivalenceKey::new(&snap(1, 10, 0), None, &opts), id(1));
        assert_eq!(index.buckets().count(), 0);
    }
}
