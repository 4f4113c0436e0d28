use std::{fs::Metadata, time::UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::Mode;

/// Result of [`FsContext::stat`](super::FsContext::stat).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatResult {
    /// File type and permission bits.
    pub st_mode: u32,
    pub st_size: u64,
    /// Seconds since the epoch.
    pub st_mtime: f64,
    pub st_uid: u32,
    pub st_gid: u32,
    pub is_dir: bool,
}

impl StatResult {
    pub(crate) fn from_metadata(meta: &Metadata) -> Self {
        let st_mtime = meta
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0.0, |elapsed| elapsed.as_secs_f64());
        let (st_mode, st_uid, st_gid) = host_ids(meta);
        Self {
            st_mode,
            st_size: meta.len(),
            st_mtime,
            st_uid,
            st_gid,
            is_dir: meta.is_dir(),
        }
    }

    /// The permission bits alone.
    #[must_use]
    pub fn permissions(&self) -> Mode {
        Mode(self.st_mode & 0o777)
    }
}

#[cfg(unix)]
fn host_ids(meta: &Metadata) -> (u32, u32, u32) {
    use std::os::unix::fs::MetadataExt;
    (meta.mode(), meta.uid(), meta.gid())
}

/// Hosts without POSIX modes get a synthesized mode from the read-only flag.
#[cfg(not(unix))]
fn host_ids(meta: &Metadata) -> (u32, u32, u32) {
    let file_type = if meta.is_dir() { 0o040_000 } else { 0o100_000 };
    let permissions = match (meta.is_dir(), meta.permissions().readonly()) {
        (true, true) => 0o555,
        (true, false) => 0o777,
        (false, true) => 0o444,
        (false, false) => 0o666,
    };
    (file_type | permissions, 0, 0)
}
