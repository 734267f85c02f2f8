// crates/engine/src/stats.rs

/// Running counters for one scan, advanced by the walker loop, the equality
/// oracle, the planner and the executor. All projections are exact: the
/// simulated registry state backs every byte figure even in dry-run.
#[derive(Debug, Clone, Default)]
pub struct LinkingStats {
    /// Directories visited by the walker.
    pub directories: u64,
    /// Regular files admitted within the size bounds.
    pub files: u64,
    /// Distinct inodes admitted.
    pub inodes: u64,
    /// Directories pruned by an exclude pattern.
    pub excluded_dirs: u64,
    /// Files dropped by an exclude pattern.
    pub excluded_files: u64,
    /// Files dropped for not matching any `--match` pattern.
    pub unmatched_files: u64,
    /// Paths that could not be statted or read during the walk.
    pub inaccessible: u64,
    pub too_small: u64,
    pub too_large: u64,
    /// Pathnames that were already hard links of an earlier-seen inode.
    pub existing_links: u64,
    /// Bytes already being saved by pre-existing hard links.
    pub bytes_saved_previously: u64,
    pub mismatched_times: u64,
    pub mismatched_modes: u64,
    pub mismatched_ownership: u64,
    pub mismatched_xattrs: u64,
    pub mismatched_names: u64,
    /// Content comparisons that actually read file data.
    pub comparisons: u64,
    pub equal_comparisons: u64,
    pub content_mismatches: u64,
    /// Pairs left undecided by an I/O error mid-comparison.
    pub comparison_errors: u64,
    /// First-block digests computed.
    pub hashes_computed: u64,
    /// Comparisons answered from the digest cache without touching disk.
    pub digest_prefilter_hits: u64,
    /// Link operations scheduled (and, with linking enabled, attempted).
    pub new_links: u64,
    /// Link operations that failed during execution.
    pub failed_links: u64,
    /// Inodes whose last discovered link the plan removes.
    pub inodes_consolidated: u64,
    /// Bytes the plan frees once executed.
    pub bytes_saveable: u64,
    /// Pathnames unschedulable because the device link limit was reached.
    pub unlinkable_paths: u64,
}

impl LinkingStats {
    pub fn total_bytes_saveable(&self) -> u64 {
        self.bytes_saved_previously + self.bytes_saveable
    }

    pub fn remaining_inodes(&self) -> u64 {
        self.inodes - self.inodes_consolidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_combine_existing_and_planned_savings() {
        let stats = LinkingStats {
            bytes_saved_previously: 300,
            bytes_saveable: 200,
            inodes: 10,
            inodes_consolidated: 4,
            ..Default::default()
        };
        assert_eq!(stats.total_bytes_saveable(), 500);
        assert_eq!(stats.remaining_inodes(), 6);
    }
}
