/// The filesystem operations the remover needs, behind a trait so that
/// failures (locked files, vanished entries) can be injected in tests.
use crate::platform;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirChild {
    pub path: PathBuf,
    /// `true` for real directories only. Symlinks and junctions are `false`
    /// so they are unlinked rather than descended into.
    pub is_dir: bool,
}

/// Filesystem primitives used by [`super::ForcedRemover`].
pub trait FileSystem {
    /// Metadata of `path` itself, not following symlinks.
    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Drop read-only style attributes. `Ok(true)` if a read-only flag was among them.
    fn clear_read_only(&self, path: &Path, metadata: &Metadata) -> io::Result<bool>;

    /// Immediate children of `path`, sorted by file name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirChild>>;

    /// Remove a file or symlink.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        fs::symlink_metadata(path)
    }

    fn clear_read_only(&self, path: &Path, metadata: &Metadata) -> io::Result<bool> {
        platform::clear_read_only(path, metadata)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirChild>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            children.push(DirChild {
                is_dir: entry.file_type()?.is_dir(),
                path: entry.path(),
            });
        }
        children.sort_unstable_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(children)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(err) if is_directory_link(path) => {
                // Directory symlinks and junctions unlink with RemoveDirectoryW.
                fs::remove_dir(path).map_err(|_| err)
            }
            other => other,
        }
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

#[cfg(windows)]
fn is_directory_link(path: &Path) -> bool {
    use std::os::windows::fs::FileTypeExt;
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink_dir())
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn is_directory_link(_path: &Path) -> bool {
    false
}
