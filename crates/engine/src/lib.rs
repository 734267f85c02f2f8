// crates/engine/src/lib.rs

//! The link planning core.
//!
//! A [`Scan`] consumes stat records from the walker, deduplicates them into
//! inode records, buckets candidates by equivalence key, proves equality by
//! content comparison (with a lazy first-block digest cache cutting the
//! pairwise work), groups equal inodes with a disjoint-set union, and orders
//! link operations per group so that the fewest `link(2)` calls consolidate
//! the most pathnames. Planning only simulates; [`execute_plan`] applies a
//! plan to the filesystem.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use std::path::PathBuf;

use thiserror::Error;

mod compare;
mod digest;
mod execute;
mod index;
mod planner;
mod registry;
mod stats;
mod unionfind;

pub use digest::DigestCache;
pub use execute::{execute_plan, ExecSummary};
pub use index::{CandidateIndex, EquivalenceKey};
pub use planner::{LinkOp, LinkPlan};
pub use registry::{Admission, InodeId, InodeRecord, InodeRegistry};
pub use stats::LinkingStats;

use meta::{StatSnapshot, XattrFingerprint};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Which attributes two files must share before their contents are even
/// compared. `content_only` supersedes the time/perms/xattr/ownership
/// requirements; `same_name` additionally requires equal basenames.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub same_name: bool,
    pub ignore_perms: bool,
    pub ignore_time: bool,
    pub ignore_xattr: bool,
    pub content_only: bool,
    pub min_size: u64,
    pub max_size: Option<u64>,
    /// Overrides per-device `pathconf` discovery of the link limit.
    pub link_max: Option<u64>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            same_name: false,
            ignore_perms: false,
            ignore_time: false,
            ignore_xattr: false,
            content_only: false,
            min_size: 1,
            max_size: None,
            link_max: None,
        }
    }
}

impl MatchOptions {
    /// Whether xattr fingerprints participate in matching at all.
    pub fn wants_xattr(&self) -> bool {
        cfg!(feature = "xattr") && !self.ignore_xattr && !self.content_only
    }
}

/// Cooperative cancellation flag, checked between phases and at bucket
/// boundaries.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One scan's worth of state. Owns every inode record, the candidate index,
/// the digest cache and the counters for the lifetime of a run.
pub struct Scan {
    opts: MatchOptions,
    registry: InodeRegistry,
    index: CandidateIndex,
    digests: DigestCache,
    stats: LinkingStats,
    cancel: CancelToken,
}

impl Scan {
    pub fn new(opts: MatchOptions) -> Self {
        let registry = InodeRegistry::new(opts.link_max);
        Scan {
            opts,
            registry,
            index: CandidateIndex::default(),
            digests: DigestCache::default(),
            stats: LinkingStats::default(),
            cancel: CancelToken::default(),
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn stats(&self) -> &LinkingStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut LinkingStats {
        &mut self.stats
    }

    pub fn registry(&self) -> &InodeRegistry {
        &self.registry
    }

    /// Feed one walker record into the scan.
    pub fn observe(&mut self, path: PathBuf, stat: StatSnapshot, xattr: XattrFingerprint) {
        let key = EquivalenceKey::new(&stat, path.file_name(), &self.opts);
        match self.registry.admit(path, stat, xattr, &self.opts) {
            Admission::First(id) => {
                self.stats.files += 1;
                self.stats.inodes += 1;
                self.index.insert(key, id);
            }
            Admission::AdditionalPath => {
                self.stats.files += 1;
                self.stats.existing_links += 1;
                self.stats.bytes_saved_previously += stat.size;
            }
            Admission::TooSmall => self.stats.too_small += 1,
            Admission::TooLarge => self.stats.too_large += 1,
            Admission::NotRegular => {}
        }
    }

    /// Pathname clusters that already share an inode, sorted for reporting.
    /// Only meaningful before [`plan`](Self::plan) migrates paths around.
    pub fn existing_clusters(&self) -> Vec<(PathBuf, u64, Vec<PathBuf>)> {
        let mut clusters: Vec<_> = self
            .registry
            .records()
            .filter(|r| r.paths.len() > 1)
            .map(|r| (r.paths[0].clone(), r.observed.size, r.paths[1..].to_vec()))
            .collect();
        clusters.sort();
        clusters
    }

    /// Compare candidates, group equal inodes and order the link operations.
    ///
    /// The registry's simulated state is updated alongside the plan so the
    /// projected statistics are exact without touching the filesystem. Fails
    /// only on cancellation.
    pub fn plan(&mut self) -> Result<LinkPlan> {
        let mut uf = unionfind::UnionFind::default();
        for bucket in self.index.buckets() {
            if self.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            // One representative per group already formed in this bucket; a
            // newcomer is compared against those before founding its own.
            let mut reps: Vec<InodeId> = Vec::new();
            for &ino in bucket {
                uf.insert(ino);
                let mut joined = false;
                for &rep in &reps {
                    let equal = compare::files_equal(
                        self.registry.get(rep),
                        self.registry.get(ino),
                        &mut self.digests,
                        &mut self.stats,
                        &self.opts,
                    );
                    if equal {
                        uf.union(rep, ino);
                        joined = true;
                        break;
                    }
                }
                if !joined {
                    reps.push(ino);
                }
            }
        }

        let mut plan = LinkPlan::default();
        for group in uf.groups() {
            if group.len() < 2 {
                continue;
            }
            if self.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            planner::plan_group(
                &mut self.registry,
                &mut self.stats,
                &group,
                self.opts.same_name,
                &mut plan,
            );
        }
        Ok(plan)
    }
}
