// crates/cli/src/report.rs

use std::path::PathBuf;

use engine::{LinkPlan, LinkingStats};
use logging::human_bytes;
use serde_json::json;

/// Everything the report needs, collected after planning (and execution,
/// when enabled).
pub(crate) struct Report<'a> {
    pub verbose: u8,
    pub no_stats: bool,
    pub linking_enabled: bool,
    pub stats: &'a LinkingStats,
    pub plan: &'a LinkPlan,
    /// Pre-existing link clusters, only gathered at verbosity >= 2.
    pub clusters: &'a [(PathBuf, u64, Vec<PathBuf>)],
}

impl Report<'_> {
    pub fn print_text(&self) {
        if self.verbose >= 2 && !self.clusters.is_empty() {
            println!("Currently hardlinked files");
            println!("-----------------------");
            for (first, size, rest) in self.clusters {
                println!("Currently hardlinked: {}", first.display());
                for path in rest {
                    println!("                    : {}", path.display());
                }
                println!(
                    "Size per file: {}  Total saved: {}",
                    human_bytes(*size),
                    human_bytes(size * rest.len() as u64)
                );
            }
            println!();
        }

        if self.verbose >= 1 && !self.plan.ops.is_empty() {
            if self.linking_enabled {
                println!("Files that were hardlinked this run");
            } else {
                println!("Files that are hardlinkable");
            }
            println!("-----------------------");
            for op in &self.plan.ops {
                println!("from: {}", op.from_path.display());
                println!("  to: {}", op.to_path.display());
            }
            println!();
        }

        if self.no_stats {
            return;
        }
        let stats = self.stats;
        println!("Hard linking statistics");
        println!("-----------------------");
        if !self.linking_enabled {
            println!("Statistics reflect what would result if actual linking were enabled");
        }
        println!("Directories                : {}", stats.directories);
        println!("Files                      : {}", stats.files);
        println!("Comparisons                : {}", stats.comparisons);
        println!("Inodes found               : {}", stats.inodes);
        if self.linking_enabled {
            println!("Consolidated inodes        : {}", stats.inodes_consolidated);
        } else {
            println!("Consolidatable inodes found: {}", stats.inodes_consolidated);
        }
        println!("Current hardlinks          : {}", stats.existing_links);
        if self.linking_enabled {
            println!("Hardlinked this run        : {}", stats.new_links);
        } else {
            println!("Hardlinkable files found   : {}", stats.new_links);
        }
        println!(
            "Total old and new hardlinks: {}",
            stats.existing_links + stats.new_links
        );
        println!(
            "Current bytes saved        : {} ({})",
            stats.bytes_saved_previously,
            human_bytes(stats.bytes_saved_previously)
        );
        if self.linking_enabled {
            println!(
                "Additional bytes saved     : {} ({})",
                stats.bytes_saveable,
                human_bytes(stats.bytes_saveable)
            );
            println!(
                "Total bytes saved          : {} ({})",
                stats.total_bytes_saveable(),
                human_bytes(stats.total_bytes_saveable())
            );
        } else {
            println!(
                "Additional bytes saveable  : {} ({})",
                stats.bytes_saveable,
                human_bytes(stats.bytes_saveable)
            );
            println!(
                "Total bytes saveable       : {} ({})",
                stats.total_bytes_saveable(),
                human_bytes(stats.total_bytes_saveable())
            );
        }
        if stats.failed_links > 0 {
            println!("Failed link operations     : {}", stats.failed_links);
        }

        if self.verbose > 0 {
            if stats.excluded_dirs > 0 {
                println!("Total excluded dirs        : {}", stats.excluded_dirs);
            }
            if stats.excluded_files > 0 {
                println!("Total excluded files       : {}", stats.excluded_files);
            }
            if stats.unmatched_files > 0 {
                println!("Total unmatched files      : {}", stats.unmatched_files);
            }
            if stats.inaccessible > 0 {
                println!("Total inaccessible files   : {}", stats.inaccessible);
            }
            if stats.too_large > 0 {
                println!("Total too large files      : {}", stats.too_large);
            }
            if stats.too_small > 0 {
                println!("Total too small files      : {}", stats.too_small);
            }
            if stats.mismatched_times > 0 {
                println!("Total unequal file times   : {}", stats.mismatched_times);
            }
            if stats.mismatched_modes > 0 {
                println!("Total unequal file modes   : {}", stats.mismatched_modes);
            }
            if stats.mismatched_ownership > 0 {
                println!("Total unequal file uid/gid : {}", stats.mismatched_ownership);
            }
            if stats.mismatched_xattrs > 0 {
                println!("Total unequal file xattrs  : {}", stats.mismatched_xattrs);
            }
            if stats.mismatched_names > 0 {
                println!("Total unequal file names   : {}", stats.mismatched_names);
            }
            if stats.unlinkable_paths > 0 {
                println!("Total unlinkable paths     : {}", stats.unlinkable_paths);
            }
            println!("Total remaining inodes     : {}", stats.remaining_inodes());
        }
        if self.verbose > 1 {
            println!("Total hashes computed      : {}", stats.hashes_computed);
            println!("Total digest prefilters    : {}", stats.digest_prefilter_hits);
            println!("Total equal comparisons    : {}", stats.equal_comparisons);
            println!("Total comparison errors    : {}", stats.comparison_errors);
        }
    }

    pub fn json(&self) -> serde_json::Value {
        let stats = self.stats;
        let mut value = json!({
            "directories": stats.directories,
            "files": stats.files,
            "inodes": stats.inodes,
            "excluded_dirs": stats.excluded_dirs,
            "excluded_files": stats.excluded_files,
            "unmatched_files": stats.unmatched_files,
            "inaccessible": stats.inaccessible,
            "too_small": stats.too_small,
            "too_large": stats.too_large,
            "existing_links": stats.existing_links,
            "current_bytes_saved": stats.bytes_saved_previously,
            "unequal_times": stats.mismatched_times,
            "unequal_modes": stats.mismatched_modes,
            "unequal_ownership": stats.mismatched_ownership,
            "unequal_xattrs": stats.mismatched_xattrs,
            "unequal_names": stats.mismatched_names,
            "comparisons": stats.comparisons,
            "equal_comparisons": stats.equal_comparisons,
            "content_mismatches": stats.content_mismatches,
            "comparison_errors": stats.comparison_errors,
            "hashes_computed": stats.hashes_computed,
            "digest_prefilter_hits": stats.digest_prefilter_hits,
            "new_links": stats.new_links,
            "failed_links": stats.failed_links,
            "inodes_consolidated": stats.inodes_consolidated,
            "remaining_inodes": stats.remaining_inodes(),
            "additional_bytes_saveable": stats.bytes_saveable,
            "total_bytes_saveable": stats.total_bytes_saveable(),
            "unlinkable_paths": stats.unlinkable_paths,
            "linking_enabled": self.linking_enabled,
        });
        if self.verbose >= 1 {
            let pairs: Vec<_> = self
                .plan
                .ops
                .iter()
                .map(|op| {
                    json!({
                        "from": op.from_path.display().to_string(),
                        "to": op.to_path.display().to_string(),
                    })
                })
                .collect();
            value["linkable_pairs"] = serde_json::Value::Array(pairs);
        }
        value
    }

    pub fn print_json(&self) {
        // to_string_pretty only fails on non-string map keys; ours are fixed.
        println!(
            "{}",
            serde_json::to_string_pretty(&self.json()).unwrap_or_default()
        );
    }
}
