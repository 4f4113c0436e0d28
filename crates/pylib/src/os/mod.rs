//! Filesystem access for guest code.
//!
//! Every path-accepting operation goes through [`FsContext::resolve`]: absolute paths are used
//! verbatim and relative paths are joined to the context's working directory. The context is
//! the only place the working directory lives; the host process directory is never changed.

mod access;
mod stat;

use std::{
    env, fs,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use tracing::debug;

pub use self::{
    access::{AccessMode, Mode, PosixPermission},
    stat::StatResult,
};
use crate::{
    exception::{ExcType, RunResult, SimpleException},
    stream::{OpenMode, Stream, StreamOptions, Whence},
};

/// Separator between entries of a search path such as `PATH`.
#[cfg(windows)]
pub const PATHSEP: &str = ";";
#[cfg(not(windows))]
pub const PATHSEP: &str = ":";

/// Line terminator of the host platform.
#[cfg(windows)]
pub const LINESEP: &str = "\r\n";
#[cfg(not(windows))]
pub const LINESEP: &str = "\n";

/// Path of the null device.
#[cfg(windows)]
pub const DEVNULL: &str = "nul";
#[cfg(not(windows))]
pub const DEVNULL: &str = "/dev/null";

/// Working-directory state plus the filesystem operations that resolve against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsContext {
    cwd: PathBuf,
}

impl FsContext {
    /// Creates a context rooted at `cwd`. Relative input is normalized against nothing, so pass
    /// an absolute directory.
    #[must_use]
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: normalize(&cwd.into()),
        }
    }

    /// Creates a context rooted at the host process's current directory.
    pub fn from_host() -> RunResult<Self> {
        env::current_dir()
            .map(Self::new)
            .map_err(|err| ExcType::os_error_from_io(&err, "getcwd", Path::new(".")))
    }

    #[must_use]
    pub fn getcwd(&self) -> &Path {
        &self.cwd
    }

    /// Absolute input verbatim, relative input joined to the working directory.
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Changes the working directory. The target must be an existing directory.
    pub fn chdir(&mut self, path: impl AsRef<Path>) -> RunResult<()> {
        let target = self.resolve(path);
        let meta = fs::metadata(&target).map_err(|err| ExcType::os_error_from_io(&err, "chdir", &target))?;
        if !meta.is_dir() {
            return Err(ExcType::os_error(
                ExcType::NotADirectoryError,
                "chdir",
                "Not a directory",
                &target,
            ));
        }
        self.cwd = normalize(&target);
        debug!(cwd = %self.cwd.display(), "chdir");
        Ok(())
    }

    /// Checks `access` against the target's permission bits.
    ///
    /// A missing or unreadable target is `false` for every mode, `F_OK` included.
    #[must_use]
    pub fn access(&self, path: impl AsRef<Path>, access: AccessMode) -> bool {
        let target = self.resolve(path);
        let Ok(meta) = fs::metadata(&target) else {
            return false;
        };
        if access.is_existence_only() {
            return true;
        }
        StatResult::from_metadata(&meta).permissions().grants(access)
    }

    #[must_use]
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.access(path, AccessMode::F_OK)
    }

    #[must_use]
    pub fn isabs(path: impl AsRef<Path>) -> bool {
        path.as_ref().is_absolute()
    }

    /// Resolves and lexically normalizes `path` without touching the filesystem.
    #[must_use]
    pub fn abspath(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize(&self.resolve(path))
    }

    /// Resolves `path` and follows symlinks. The target must exist.
    pub fn realpath(&self, path: impl AsRef<Path>) -> RunResult<PathBuf> {
        let target = self.resolve(path);
        fs::canonicalize(&target).map_err(|err| ExcType::os_error_from_io(&err, "realpath", &target))
    }

    /// Creates one directory. The parent must exist and the target must not.
    pub fn mkdir(&self, path: impl AsRef<Path>, mode: Mode) -> RunResult<()> {
        let target = self.resolve(path);
        dir_builder(mode, false)
            .create(&target)
            .map_err(|err| ExcType::os_error_from_io(&err, "mkdir", &target))?;
        debug!(path = %target.display(), %mode, "mkdir");
        Ok(())
    }

    /// Creates a directory and any missing parents.
    ///
    /// An existing directory is accepted only with `exist_ok`; any other existing target fails.
    pub fn makedirs(&self, path: impl AsRef<Path>, mode: Mode, exist_ok: bool) -> RunResult<()> {
        let target = self.resolve(path);
        if let Ok(meta) = fs::metadata(&target) {
            if meta.is_dir() && exist_ok {
                return Ok(());
            }
            return Err(ExcType::os_error(
                ExcType::FileExistsError,
                "makedirs",
                "File exists",
                &target,
            ));
        }
        dir_builder(mode, true)
            .create(&target)
            .map_err(|err| ExcType::os_error_from_io(&err, "makedirs", &target))?;
        debug!(path = %target.display(), %mode, "makedirs");
        Ok(())
    }

    /// Entry names in `path`, sorted.
    ///
    /// A name that is not valid Unicode raises `UnicodeDecodeError` instead of being altered.
    pub fn listdir(&self, path: impl AsRef<Path>) -> RunResult<Vec<String>> {
        let target = self.resolve(path);
        let to_err = |err: std::io::Error| ExcType::os_error_from_io(&err, "listdir", &target);
        let mut names = Vec::new();
        for entry in fs::read_dir(&target).map_err(to_err)? {
            let name = entry.map_err(to_err)?.file_name().into_string().map_err(|raw| {
                SimpleException::new_msg(
                    ExcType::UnicodeDecodeError,
                    format!(
                        "listdir: entry name is not valid unicode: {:?} in '{}'",
                        raw.to_string_lossy(),
                        target.display()
                    ),
                )
            })?;
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// Deletes a file. A missing target is a no-op.
    pub fn remove(&self, path: impl AsRef<Path>) -> RunResult<()> {
        let target = self.resolve(path);
        best_effort("remove", &target, fs::remove_file(&target))
    }

    /// Deletes an empty directory. A missing target is a no-op.
    pub fn rmdir(&self, path: impl AsRef<Path>) -> RunResult<()> {
        let target = self.resolve(path);
        best_effort("rmdir", &target, fs::remove_dir(&target))
    }

    pub fn rename(&self, old: impl AsRef<Path>, new: impl AsRef<Path>) -> RunResult<()> {
        let (from, to) = (self.resolve(old), self.resolve(new));
        fs::rename(&from, &to).map_err(|err| ExcType::os_error_from_io_pair(&err, "rename", &from, &to))?;
        debug!(from = %from.display(), to = %to.display(), "rename");
        Ok(())
    }

    /// Sets permission bits. Hosts without POSIX modes honor only the owner-write bit.
    pub fn chmod(&self, path: impl AsRef<Path>, mode: Mode) -> RunResult<()> {
        let target = self.resolve(path);
        let to_err = |err: std::io::Error| ExcType::os_error_from_io(&err, "chmod", &target);
        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            fs::Permissions::from_mode(mode.bits())
        };
        #[cfg(not(unix))]
        let permissions = {
            let mut permissions = fs::metadata(&target).map_err(to_err)?.permissions();
            permissions.set_readonly(mode.bits() & PosixPermission::OwnerWrite.bit() == 0);
            permissions
        };
        fs::set_permissions(&target, permissions).map_err(to_err)?;
        debug!(path = %target.display(), %mode, "chmod");
        Ok(())
    }

    /// Changes owner and group; `None` leaves that id unchanged.
    #[cfg(unix)]
    pub fn chown(&self, path: impl AsRef<Path>, uid: Option<u32>, gid: Option<u32>) -> RunResult<()> {
        let target = self.resolve(path);
        std::os::unix::fs::chown(&target, uid, gid).map_err(|err| ExcType::os_error_from_io(&err, "chown", &target))?;
        debug!(path = %target.display(), ?uid, ?gid, "chown");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn chown(&self, _path: impl AsRef<Path>, _uid: Option<u32>, _gid: Option<u32>) -> RunResult<()> {
        Err(ExcType::not_implemented("chown"))
    }

    pub fn stat(&self, path: impl AsRef<Path>) -> RunResult<StatResult> {
        let target = self.resolve(path);
        fs::metadata(&target)
            .map(|meta| StatResult::from_metadata(&meta))
            .map_err(|err| ExcType::os_error_from_io(&err, "stat", &target))
    }

    /// Opens a guest file object. `mode` is a guest mode string such as `"r"` or `"ab+"`.
    pub fn open(&self, path: impl AsRef<Path>, mode: &str, options: StreamOptions) -> RunResult<Stream> {
        let mode = OpenMode::parse(mode)?;
        let target = self.resolve(path);
        if fs::metadata(&target).is_ok_and(|meta| meta.is_dir()) {
            return Err(ExcType::os_error(
                ExcType::IsADirectoryError,
                "open",
                "Is a directory",
                &target,
            ));
        }
        let file = mode
            .open_options()
            .open(&target)
            .map_err(|err| ExcType::os_error_from_io(&err, "open", &target))?;
        debug!(path = %target.display(), %mode, "open");
        let mut stream = Stream::new(file, target.display().to_string(), mode, options);
        if mode.is_append() {
            stream.seek(0, Whence::End)?;
        }
        Ok(stream)
    }
}

/// Treats a missing target as success; every other failure propagates.
fn best_effort(op: &str, target: &Path, result: std::io::Result<()>) -> RunResult<()> {
    match result {
        Ok(()) => {
            debug!(path = %target.display(), op, "removed");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %target.display(), op, "target missing, nothing to remove");
            Ok(())
        }
        Err(err) => Err(ExcType::os_error_from_io(&err, op, target)),
    }
}

fn dir_builder(mode: Mode, recursive: bool) -> fs::DirBuilder {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode.bits());
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder
}

/// Collapses `.` and `..` lexically. `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("../../a")), PathBuf::from("../../a"));
    }
}
