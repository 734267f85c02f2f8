// crates/engine/src/planner.rs

use std::cmp::Reverse;
use std::ffi::OsString;
use std::path::PathBuf;

use meta::StatSnapshot;

use crate::registry::{InodeId, InodeRegistry};
use crate::stats::LinkingStats;

/// One scheduled `link(2)`: after execution `to_path` names `from_inode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOp {
    pub from_path: PathBuf,
    pub to_path: PathBuf,
    pub from_inode: InodeId,
    pub to_inode: InodeId,
    /// Stat captures used to detect concurrent modification at execution
    /// time.
    pub(crate) from_stat: StatSnapshot,
    pub(crate) to_stat: StatSnapshot,
}

/// The ordered link schedule for a whole scan. Order within a group is
/// significant: the statistics bookkeeping depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    pub ops: Vec<LinkOp>,
    /// Pathnames that could not be scheduled because every group member hit
    /// the device's link limit.
    pub unlinkable: Vec<PathBuf>,
}

impl LinkPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Schedule one equivalence group.
///
/// The member with the highest simulated link count becomes the source, so
/// re-running over an already-consolidated tree schedules nothing, and every
/// other member's pathnames are migrated onto it one `link(2)` at a time.
/// When the source reaches the device's link limit the member with the most
/// remaining capacity takes over. The registry's simulated state is advanced
/// with every operation so the projected statistics stay exact.
pub(crate) fn plan_group(
    registry: &mut InodeRegistry,
    stats: &mut LinkingStats,
    group: &[InodeId],
    same_name: bool,
    plan: &mut LinkPlan,
) {
    let mut members: Vec<InodeId> = group
        .iter()
        .copied()
        .filter(|&id| registry.contains(id))
        .collect();
    if members.len() < 2 {
        return;
    }
    members.sort_by(|&a, &b| {
        let na = registry.get(a).sim.nlink;
        let nb = registry.get(b).sim.nlink;
        nb.cmp(&na).then_with(|| a.cmp(&b))
    });
    let link_max = registry.link_max(members[0].dev);
    // Under --same-name the whole bucket shares one basename; only paths
    // carrying it may migrate.
    let group_name: Option<OsString> = if same_name {
        registry.get(members[0]).paths[0]
            .file_name()
            .map(|n| n.to_os_string())
    } else {
        None
    };

    let mut source = members[0];
    for ti in 1..members.len() {
        let target = members[ti];
        if target == source || !registry.contains(target) {
            continue;
        }

        let rec = registry.get(target);
        let migratable: Vec<PathBuf> = match &group_name {
            Some(name) => rec
                .paths
                .iter()
                .filter(|p| p.file_name() == Some(name.as_os_str()))
                .cloned()
                .collect(),
            None => rec.paths.clone(),
        };
        if migratable.is_empty() {
            continue;
        }
        let to_stat = rec.observed;
        // The inode disappears with the plan only when every one of its
        // links was discovered and every one of them migrates; only then
        // does its size become saveable.
        let eliminable =
            migratable.len() == rec.paths.len() && rec.paths.len() as u64 == rec.sim.nlink;
        let mut counted = false;

        for (pi, path) in migratable.iter().enumerate() {
            if registry.get(source).sim.nlink >= link_max {
                match next_source(registry, &members, target, link_max) {
                    Some(next) => source = next,
                    None => {
                        if counted {
                            // The target survives after all; take its size
                            // back out of the projection.
                            stats.bytes_saveable -= to_stat.size;
                        }
                        exhaust(registry, stats, plan, &members[ti..], source, &migratable[pi..], &group_name);
                        return;
                    }
                }
            }

            let from = registry.get(source);
            plan.ops.push(LinkOp {
                from_path: from.paths[0].clone(),
                to_path: path.clone(),
                from_inode: source,
                to_inode: target,
                from_stat: from.observed,
                to_stat,
            });
            stats.new_links += 1;
            if eliminable && !counted {
                stats.bytes_saveable += to_stat.size;
                counted = true;
            }

            registry.get_mut(source).sim.nlink += 1;
            let rec = registry.get_mut(target);
            rec.sim.nlink -= 1;
            let nlink_now = rec.sim.nlink;
            let dropped = registry.remove_path(target, path);
            registry.add_path(source, path.clone());
            if dropped && nlink_now == 0 {
                stats.inodes_consolidated += 1;
            }
        }
    }
}

/// The group member with the most remaining link capacity, lowest inode id
/// winning ties. The current target is never eligible: linking a path onto
/// its own inode would be a self-link.
fn next_source(
    registry: &InodeRegistry,
    members: &[InodeId],
    target: InodeId,
    link_max: u64,
) -> Option<InodeId> {
    members
        .iter()
        .copied()
        .filter(|&m| m != target && registry.contains(m))
        .map(|m| (link_max.saturating_sub(registry.get(m).sim.nlink), m))
        .filter(|&(capacity, _)| capacity > 0)
        .max_by_key(|&(capacity, m)| (capacity, Reverse(m)))
        .map(|(_, m)| m)
}

/// Every source is at the link limit: record what cannot be scheduled and
/// give up on the rest of the group.
fn exhaust(
    registry: &InodeRegistry,
    stats: &mut LinkingStats,
    plan: &mut LinkPlan,
    remaining_members: &[InodeId],
    source: InodeId,
    remaining_paths: &[PathBuf],
    group_name: &Option<OsString>,
) {
    let mut unlinkable: Vec<PathBuf> = remaining_paths.to_vec();
    for &member in &remaining_members[1..] {
        if member == source || !registry.contains(member) {
            continue;
        }
        let rec = registry.get(member);
        match group_name {
            Some(name) => unlinkable.extend(
                rec.paths
                    .iter()
                    .filter(|p| p.file_name() == Some(name.as_os_str()))
                    .cloned(),
            ),
            None => unlinkable.extend(rec.paths.iter().cloned()),
        }
    }
    stats.unlinkable_paths += unlinkable.len() as u64;
    plan.unlinkable.extend(unlinkable);
}
