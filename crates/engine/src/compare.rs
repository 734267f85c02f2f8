// crates/engine/src/compare.rs

use std::fs::File;
use std::io::{self, Read};

use tracing::warn;
use xxhash_rust::xxh64::xxh64;

use crate::digest::DigestCache;
use crate::registry::InodeRecord;
use crate::stats::LinkingStats;
use crate::MatchOptions;

/// Comparison granularity. First-block digests cover exactly this much of a
/// file, so two files equal in their first block always produce the same
/// digest.
pub(crate) const BLOCK_SIZE: usize = 64 * 1024;

/// Decide whether two inodes may be linked under `opts`.
///
/// Attribute requirements are checked against the observed stats first and
/// bump the matching mismatch counters. Content is only read when every
/// required attribute matches and the digest cache cannot already rule the
/// pair out. I/O failures make the pair indeterminate: it is reported as
/// unequal and counted, never unioned.
pub(crate) fn files_equal(
    a: &InodeRecord,
    b: &InodeRecord,
    digests: &mut DigestCache,
    stats: &mut LinkingStats,
    opts: &MatchOptions,
) -> bool {
    let (sa, sb) = (&a.observed, &b.observed);
    debug_assert_eq!(sa.dev, sb.dev);
    debug_assert_eq!(sa.size, sb.size);
    if sa.size < opts.min_size || opts.max_size.is_some_and(|max| sa.size > max) {
        return false;
    }

    if !opts.content_only {
        let mut mismatch = false;
        if !opts.ignore_time && sa.mtime != sb.mtime {
            stats.mismatched_times += 1;
            mismatch = true;
        }
        if !opts.ignore_perms && sa.mode != sb.mode {
            stats.mismatched_modes += 1;
            mismatch = true;
        }
        if sa.uid != sb.uid || sa.gid != sb.gid {
            stats.mismatched_ownership += 1;
            mismatch = true;
        }
        if !opts.ignore_xattr && a.xattr != b.xattr {
            stats.mismatched_xattrs += 1;
            mismatch = true;
        }
        if mismatch {
            return false;
        }
    }

    if opts.same_name && !share_basename(a, b) {
        stats.mismatched_names += 1;
        return false;
    }

    if digests.disjoint(a.id, b.id) {
        stats.digest_prefilter_hits += 1;
        return false;
    }

    stats.comparisons += 1;
    match contents_equal(a, b, digests, stats) {
        Ok(true) => {
            stats.equal_comparisons += 1;
            true
        }
        Ok(false) => {
            stats.content_mismatches += 1;
            false
        }
        Err(err) => {
            warn!(
                "comparison of {} and {} failed: {}",
                a.paths[0].display(),
                b.paths[0].display(),
                err
            );
            stats.comparison_errors += 1;
            false
        }
    }
}

fn share_basename(a: &InodeRecord, b: &InodeRecord) -> bool {
    a.paths.iter().any(|pa| {
        b.paths
            .iter()
            .any(|pb| pa.file_name() == pb.file_name())
    })
}

fn contents_equal(
    a: &InodeRecord,
    b: &InodeRecord,
    digests: &mut DigestCache,
    stats: &mut LinkingStats,
) -> io::Result<bool> {
    let mut fa = File::open(&a.paths[0])?;
    let mut fb = File::open(&b.paths[0])?;
    let mut buf_a = vec![0u8; BLOCK_SIZE];
    let mut buf_b = vec![0u8; BLOCK_SIZE];
    let mut first = true;
    loop {
        let na = read_block(&mut fa, &mut buf_a)?;
        let nb = read_block(&mut fb, &mut buf_b)?;
        if first {
            digests.record(a.id, xxh64(&buf_a[..na], 0));
            digests.record(b.id, xxh64(&buf_b[..nb], 0));
            stats.hashes_computed += 2;
            first = false;
        }
        // Equal sizes mean one EOF implies the other; anything else is a
        // concurrent modification and the pair is not linkable.
        if na != nb {
            return Ok(false);
        }
        if na == 0 {
            return Ok(true);
        }
        if buf_a[..na] != buf_b[..nb] {
            return Ok(false);
        }
    }
}

/// Fill `buf` as far as the stream allows; short only at EOF.
fn read_block(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
