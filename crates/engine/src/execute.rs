// crates/engine/src/execute.rs

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tracing::{debug, error, warn};

use crate::planner::{LinkOp, LinkPlan};
use crate::registry::InodeId;
use crate::stats::LinkingStats;

/// Per-op outcome totals of one plan execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecSummary {
    pub completed: u64,
    pub failed: u64,
}

/// Apply a plan to the filesystem, op by op, in plan order.
///
/// Each step is individually atomic: the new link is created under a
/// temporary name next to the destination and renamed over it. A failed op
/// is reported and skipped; earlier ops are never rolled back.
pub fn execute_plan(plan: &LinkPlan, stats: &mut LinkingStats) -> ExecSummary {
    let mut executor = Executor::default();
    let mut summary = ExecSummary::default();
    for op in &plan.ops {
        match executor.apply(op) {
            Ok(()) => {
                debug!(
                    "linked {} => {}",
                    op.from_path.display(),
                    op.to_path.display()
                );
                summary.completed += 1;
            }
            Err(err) => {
                error!(
                    "failed to link {} => {}: {}",
                    op.from_path.display(),
                    op.to_path.display(),
                    err
                );
                stats.failed_links += 1;
                summary.failed += 1;
            }
        }
    }
    summary
}

#[derive(Default)]
struct Executor {
    /// Times this run has itself written to source inodes, so the
    /// modification re-check does not trip over our own updates.
    times_set: HashMap<InodeId, (FileTime, FileTime)>,
}

impl Executor {
    fn apply(&mut self, op: &LinkOp) -> io::Result<()> {
        if self.changed(&op.from_path, op.from_inode, &op.from_stat)
            || self.changed(&op.to_path, op.to_inode, &op.to_stat)
        {
            return Err(io::Error::other("file changed since it was scanned"));
        }

        let tmp = tmp_name(&op.to_path);
        match fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        fs::hard_link(&op.from_path, &tmp)?;
        if let Err(err) = fs::rename(&tmp, &op.to_path) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }

        self.propagate_times(op);
        Ok(())
    }

    /// Keep the newest content timestamp on the surviving inode, as the
    /// replaced file's data was last touched then.
    fn propagate_times(&mut self, op: &LinkOp) {
        let (_, src_mtime) = self
            .times_set
            .get(&op.from_inode)
            .copied()
            .unwrap_or((op.from_stat.atime, op.from_stat.mtime));
        if op.to_stat.mtime > src_mtime {
            match filetime::set_file_times(&op.from_path, op.to_stat.atime, op.to_stat.mtime) {
                Ok(()) => {
                    self.times_set
                        .insert(op.from_inode, (op.to_stat.atime, op.to_stat.mtime));
                }
                Err(err) => warn!(
                    "failed to update times of {}: {}",
                    op.from_path.display(),
                    err
                ),
            }
        }
    }

    fn changed(&self, path: &Path, id: InodeId, snap: &meta::StatSnapshot) -> bool {
        let mut expected = *snap;
        if let Some(&(atime, mtime)) = self.times_set.get(&id) {
            expected.atime = atime;
            expected.mtime = mtime;
        }
        meta::file_has_changed(path, &expected)
    }
}

fn tmp_name(to_path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(to_path.file_name().unwrap_or_default());
    name.push(".hardlinkable-tmp");
    to_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_names_stay_adjacent() {
        assert_eq!(
            tmp_name(Path::new("/srv/data/file.bin")),
            PathBuf::from("/srv/data/.file.bin.hardlinkable-tmp")
        );
    }
}
