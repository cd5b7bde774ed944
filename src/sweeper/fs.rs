use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What the sweeper needs to know about one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub modified: SystemTime,
    pub is_dir: bool,
}

/// How an entry is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveKind {
    /// Regular file, symlink, or anything that is not a directory
    File,
    /// Directory that must already be empty
    EmptyDir,
    /// Directory together with everything below it
    Tree,
}

/// Filesystem primitives consumed by a sweep.
///
/// Implementations must report a vanished entry with
/// `io::ErrorKind::NotFound` so the sweeper can tell it apart from a
/// real failure.
pub trait SweepFs {
    /// Names of the direct children of `dir`
    fn list(&self, dir: &Path) -> io::Result<Vec<OsString>>;

    /// Metadata of `path` itself (symlinks are not followed)
    fn stat(&self, path: &Path) -> io::Result<EntryMeta>;

    /// Remove `path`
    fn remove(&self, path: &Path, kind: RemoveKind) -> io::Result<()>;

    /// Resolve `path` to its absolute form, for the protected-path check.
    /// Filesystems without links can return the path unchanged.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_path_buf())
    }
}

/// Source of the sweep's reference time
pub trait Clock {
    fn now(&self) -> SystemTime;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl SweepFs for StdFs {
    fn list(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            names.push(entry?.file_name());
        }
        Ok(names)
    }

    fn stat(&self, path: &Path) -> io::Result<EntryMeta> {
        let metadata = std::fs::symlink_metadata(path)?;
        Ok(EntryMeta {
            modified: metadata.modified()?,
            is_dir: metadata.file_type().is_dir(),
        })
    }

    fn remove(&self, path: &Path, kind: RemoveKind) -> io::Result<()> {
        match kind {
            RemoveKind::File => std::fs::remove_file(path),
            RemoveKind::EmptyDir => std::fs::remove_dir(path),
            RemoveKind::Tree => std::fs::remove_dir_all(path),
        }
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}
