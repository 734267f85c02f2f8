// crates/meta/src/lib.rs

use std::io;
use std::path::Path;

use filetime::FileTime;
use nix::sys::stat::{self, SFlag};

#[cfg(feature = "xattr")]
use std::os::unix::ffi::OsStrExt;
#[cfg(feature = "xattr")]
use xxhash_rust::xxh64::Xxh64;

/// Fallback for filesystems where `pathconf(_PC_LINK_MAX)` is unavailable.
pub const DEFAULT_LINK_MAX: u64 = 65_000;

/// Point-in-time `lstat` capture of a file.
///
/// Snapshots are taken once per pathname during the walk and never refreshed;
/// [`file_has_changed`] re-stats a path against its snapshot before the
/// filesystem is modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSnapshot {
    /// Device the inode lives on.
    pub dev: u64,
    /// Inode number.
    pub ino: u64,
    /// File size in bytes.
    pub size: u64,
    /// Modification time with nanosecond precision.
    pub mtime: FileTime,
    /// Access time with nanosecond precision.
    pub atime: FileTime,
    /// Full `st_mode` bits, type included.
    pub mode: u32,
    /// File owner user ID.
    pub uid: u32,
    /// File owner group ID.
    pub gid: u32,
    /// Link count at capture time.
    pub nlink: u64,
    /// Whether the path named a regular file.
    pub is_regular: bool,
}

impl StatSnapshot {
    /// Capture a snapshot of `path` without following symlinks.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let st = stat::lstat(path).map_err(nix_to_io)?;
        let mode = st.st_mode as u32;
        Ok(StatSnapshot {
            dev: st.st_dev as u64,
            ino: st.st_ino as u64,
            size: st.st_size as u64,
            mtime: FileTime::from_unix_time(st.st_mtime, st.st_mtime_nsec as u32),
            atime: FileTime::from_unix_time(st.st_atime, st.st_atime_nsec as u32),
            mode,
            uid: st.st_uid,
            gid: st.st_gid,
            nlink: st.st_nlink as u64,
            is_regular: mode & SFlag::S_IFMT.bits() as u32 == SFlag::S_IFREG.bits() as u32,
        })
    }

    /// Permission bits only (`0o7777`).
    pub fn perm_bits(&self) -> u32 {
        self.mode & 0o7777
    }
}

/// Re-stat `path` and report whether it no longer matches `snap`.
///
/// The link count is deliberately not compared: linking changes it. A stat
/// failure counts as changed.
pub fn file_has_changed(path: &Path, snap: &StatSnapshot) -> bool {
    match StatSnapshot::from_path(path) {
        Ok(cur) => {
            cur.dev != snap.dev
                || cur.ino != snap.ino
                || cur.size != snap.size
                || cur.mtime != snap.mtime
                || cur.mode != snap.mode
                || cur.uid != snap.uid
                || cur.gid != snap.gid
        }
        Err(_) => true,
    }
}

/// Maximum link count for the filesystem holding `path`. `pathconf` reports
/// -1 both for errors and for "no limit"; the conservative default covers
/// both.
pub fn link_max(path: &Path) -> u64 {
    use std::os::unix::ffi::OsStrExt as _;
    let Ok(cpath) = std::ffi::CString::new(path.as_os_str().as_bytes()) else {
        return DEFAULT_LINK_MAX;
    };
    let limit = unsafe { libc::pathconf(cpath.as_ptr(), libc::_PC_LINK_MAX) };
    if limit > 0 {
        limit as u64
    } else {
        DEFAULT_LINK_MAX
    }
}

/// Order-independent digest of a file's extended attributes.
///
/// `Absent` means xattrs were not captured at all; two captured fingerprints
/// compare equal exactly when the name/value sets are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XattrFingerprint {
    Absent,
    Digest(u64),
}

#[cfg(feature = "xattr")]
pub fn xattr_fingerprint(path: &Path) -> io::Result<XattrFingerprint> {
    let mut attrs: Vec<(std::ffi::OsString, Vec<u8>)> = Vec::new();
    for name in xattr::list(path)? {
        // The attribute may vanish between list and get.
        if let Some(value) = xattr::get(path, &name)? {
            attrs.push((name, value));
        }
    }
    attrs.sort_by(|a, b| a.0.cmp(&b.0));
    let mut hasher = Xxh64::new(0);
    for (name, value) in &attrs {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
        hasher.update(value);
        hasher.update(&[0]);
    }
    Ok(XattrFingerprint::Digest(hasher.digest()))
}

#[cfg(not(feature = "xattr"))]
pub fn xattr_fingerprint(_path: &Path) -> io::Result<XattrFingerprint> {
    Ok(XattrFingerprint::Absent)
}

fn nix_to_io(err: nix::errno::Errno) -> io::Error {
    io::Error::from_raw_os_error(err as i32)
}
