// crates/walk/src/lib.rs

//! Directory traversal feeding the planning core.
//!
//! The walker is a pull iterator over one or more root directories. It
//! applies the basename filters, prunes excluded directories without
//! descending into them, and stats every surviving regular file exactly
//! once. Symlinks are never followed; non-regular files are dropped
//! silently. Entries come out in a deterministic order (roots in the order
//! given, directory contents sorted by name) so downstream plans are
//! reproducible.

use std::path::PathBuf;

use filters::Matcher;
use meta::{xattr_fingerprint, StatSnapshot, XattrFingerprint};
use tracing::warn;

/// A regular file surviving the name filters, with its stat capture.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub stat: StatSnapshot,
    pub xattr: XattrFingerprint,
}

/// One observation made during the walk.
///
/// Everything the statistics report cares about is surfaced as an event so
/// the consumer can tally without the walker owning any counters.
#[derive(Debug)]
pub enum WalkEvent {
    Directory(PathBuf),
    File(FileEntry),
    ExcludedDir(PathBuf),
    ExcludedFile(PathBuf),
    UnmatchedFile(PathBuf),
    Inaccessible(PathBuf),
}

/// Walk `roots` in order, yielding [`WalkEvent`]s.
///
/// `want_xattr` controls whether an xattr fingerprint is captured per file;
/// callers pass false when the matching policy ignores xattrs so no listing
/// syscalls are spent on them.
pub fn walk<'a>(roots: &[PathBuf], matcher: &'a Matcher, want_xattr: bool) -> Walker<'a> {
    Walker {
        matcher,
        want_xattr,
        roots: roots.to_vec().into_iter(),
        cur: None,
    }
}

pub struct Walker<'a> {
    matcher: &'a Matcher,
    want_xattr: bool,
    roots: std::vec::IntoIter<PathBuf>,
    cur: Option<walkdir::IntoIter>,
}

impl Walker<'_> {
    fn file_event(&self, path: PathBuf) -> WalkEvent {
        let stat = match StatSnapshot::from_path(&path) {
            Ok(stat) => stat,
            Err(err) => {
                warn!("unable to stat {}: {}", path.display(), err);
                return WalkEvent::Inaccessible(path);
            }
        };
        let xattr = if self.want_xattr {
            match xattr_fingerprint(&path) {
                Ok(fp) => fp,
                Err(err) => {
                    warn!("unable to read xattrs of {}: {}", path.display(), err);
                    return WalkEvent::Inaccessible(path);
                }
            }
        } else {
            XattrFingerprint::Absent
        };
        WalkEvent::File(FileEntry { path, stat, xattr })
    }
}

impl Iterator for Walker<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        loop {
            let Some(it) = self.cur.as_mut() else {
                let root = self.roots.next()?;
                self.cur = Some(
                    walkdir::WalkDir::new(root)
                        .follow_links(false)
                        .sort_by_file_name()
                        .into_iter(),
                );
                continue;
            };
            let entry = match it.next() {
                None => {
                    self.cur = None;
                    continue;
                }
                Some(Err(err)) => {
                    let path = err
                        .path()
                        .map(|p| p.to_path_buf())
                        .unwrap_or_default();
                    warn!("unable to read {}: {}", path.display(), err);
                    return Some(WalkEvent::Inaccessible(path));
                }
                Some(Ok(entry)) => entry,
            };

            let name = entry.file_name().to_os_string();
            if entry.file_type().is_dir() {
                if self.matcher.is_excluded(&name) {
                    it.skip_current_dir();
                    return Some(WalkEvent::ExcludedDir(entry.into_path()));
                }
                return Some(WalkEvent::Directory(entry.into_path()));
            }
            // Symlinks, devices and other specials never participate.
            if !entry.file_type().is_file() {
                continue;
            }
            if self.matcher.is_excluded(&name) {
                return Some(WalkEvent::ExcludedFile(entry.into_path()));
            }
            if !self.matcher.is_matched(&name) {
                return Some(WalkEvent::UnmatchedFile(entry.into_path()));
            }
            return Some(self.file_event(entry.into_path()));
        }
    }
}
