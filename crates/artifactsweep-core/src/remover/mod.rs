/// Forced removal: deletes files and whole directory trees, clearing
/// read-only attributes first.
///
/// # Ordering
///
/// A directory is deleted only after every entry beneath it is gone:
/// subdirectories first (in name order, depth-first), then the directory's
/// own files, then the directory itself. The walk uses an explicit frame
/// stack rather than recursion, so deep trees cannot overflow the call stack.
///
/// # Failure containment
///
/// The first failure aborts the whole call. Nothing above the failing node
/// is attempted, so the tree stays structurally valid; everything already
/// deleted stays deleted. Absent nodes are no-ops, which makes a second run
/// pick up exactly where the first one stopped.
///
/// # Records
///
/// Every delete is announced through an [`EventSink`] *before* the
/// filesystem call, so a failing delete still leaves a trace of intent.
pub mod fs;

use crate::error::DeleteError;
use fs::{FileSystem, OsFileSystem};
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Observable side effects of a removal, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalEvent {
    /// A read-only (or system/hidden) attribute was cleared on this path.
    ReadOnlyCleared(PathBuf),
    /// This file or symlink is about to be deleted.
    DeletingFile(PathBuf),
    /// This directory is empty and about to be deleted.
    DeletingDirectory(PathBuf),
}

impl RemovalEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::ReadOnlyCleared(p) | Self::DeletingFile(p) | Self::DeletingDirectory(p) => p,
        }
    }
}

/// Receives [`RemovalEvent`]s as they happen.
///
/// Implemented for any `Fn(RemovalEvent)`, so a closure forwarding into a
/// channel is the usual sink.
pub trait EventSink {
    fn emit(&self, event: RemovalEvent);
}

impl<F: Fn(RemovalEvent)> EventSink for F {
    #[inline]
    fn emit(&self, event: RemovalEvent) {
        self(event)
    }
}

/// Terminal success states of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Nothing was there (never existed, or already removed).
    Absent,
    /// The node was deleted by this call.
    Deleted,
}

/// A pending step of the iterative directory walk.
enum Frame {
    /// Clear the directory's attributes and queue its subdirectories.
    Descend(PathBuf),
    /// All subdirectories are gone: delete the files, then the directory.
    Sweep(PathBuf),
}

/// Deletes files and directory trees through a [`FileSystem`].
#[derive(Debug, Default, Clone)]
pub struct ForcedRemover<F = OsFileSystem> {
    fs: F,
}

impl ForcedRemover<OsFileSystem> {
    /// A remover operating on the real filesystem.
    pub fn new() -> Self {
        Self { fs: OsFileSystem }
    }
}

impl<F: FileSystem> ForcedRemover<F> {
    /// A remover operating on a custom filesystem implementation.
    pub fn with_file_system(fs: F) -> Self {
        Self { fs }
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// Delete a single file (or symlink), clearing read-only first.
    ///
    /// A missing path is `Ok(Removal::Absent)`. If `path` turns out to be a
    /// directory the delete fails like any other OS refusal.
    pub fn remove_file(&self, path: &Path, sink: &dyn EventSink) -> Result<Removal, DeleteError> {
        match self.stat(path)? {
            None => Ok(Removal::Absent),
            Some(metadata) => self.remove_entry(path, &metadata, sink),
        }
    }

    /// Delete a directory and everything beneath it, bottom-up.
    ///
    /// Subdirectories are enumerated when they are reached, not taken from
    /// an earlier scan, and all of them go regardless of their names. If
    /// `path` is not a directory it is removed like a file.
    pub fn remove_dir_recursive(
        &self,
        path: &Path,
        sink: &dyn EventSink,
    ) -> Result<Removal, DeleteError> {
        let metadata = match self.stat(path)? {
            None => return Ok(Removal::Absent),
            Some(metadata) => metadata,
        };
        if !metadata.is_dir() {
            return self.remove_entry(path, &metadata, sink);
        }

        let mut stack = vec![Frame::Descend(path.to_path_buf())];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Descend(dir) => {
                    let Some(metadata) = self.stat(&dir)? else {
                        continue;
                    };
                    if !metadata.is_dir() {
                        // Replaced by a file or link since the listing.
                        self.remove_entry(&dir, &metadata, sink)?;
                        continue;
                    }
                    if !self.clear_attributes(&dir, &metadata, sink)? {
                        continue;
                    }
                    let Some(children) = self.list(&dir)? else {
                        continue;
                    };

                    stack.push(Frame::Sweep(dir));
                    // Reversed so the first subdirectory by name is popped first.
                    stack.extend(
                        children
                            .into_iter()
                            .rev()
                            .filter(|child| child.is_dir)
                            .map(|child| Frame::Descend(child.path)),
                    );
                }
                Frame::Sweep(dir) => {
                    let Some(children) = self.list(&dir)? else {
                        continue;
                    };
                    for child in children.iter().filter(|child| !child.is_dir) {
                        self.remove_file(&child.path, sink)?;
                    }

                    sink.emit(RemovalEvent::DeletingDirectory(dir.clone()));
                    match self.fs.remove_dir(&dir) {
                        Ok(()) => trace!(path = %dir.display(), "directory deleted"),
                        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                        Err(err) => return Err(DeleteError::new(&dir, err)),
                    }
                }
            }
        }

        Ok(Removal::Deleted)
    }

    /// Clear attributes, announce, and unlink a non-directory entry.
    fn remove_entry(
        &self,
        path: &Path,
        metadata: &Metadata,
        sink: &dyn EventSink,
    ) -> Result<Removal, DeleteError> {
        if !self.clear_attributes(path, metadata, sink)? {
            return Ok(Removal::Absent);
        }

        sink.emit(RemovalEvent::DeletingFile(path.to_path_buf()));
        match self.fs.remove_file(path) {
            Ok(()) => Ok(Removal::Deleted),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Removal::Absent),
            Err(err) => Err(DeleteError::new(path, err)),
        }
    }

    /// `Ok(false)` if the path vanished while its attributes were cleared.
    fn clear_attributes(
        &self,
        path: &Path,
        metadata: &Metadata,
        sink: &dyn EventSink,
    ) -> Result<bool, DeleteError> {
        match self.fs.clear_read_only(path, metadata) {
            Ok(true) => {
                debug!(path = %path.display(), "cleared read-only attribute");
                sink.emit(RemovalEvent::ReadOnlyCleared(path.to_path_buf()));
                Ok(true)
            }
            Ok(false) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(DeleteError::new(path, err)),
        }
    }

    /// `Ok(None)` for a path that does not exist.
    fn stat(&self, path: &Path) -> Result<Option<Metadata>, DeleteError> {
        match self.fs.symlink_metadata(path) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!(path = %path.display(), "already absent");
                Ok(None)
            }
            Err(err) => Err(DeleteError::new(path, err)),
        }
    }

    /// `Ok(None)` for a directory that no longer exists.
    fn list(&self, dir: &Path) -> Result<Option<Vec<fs::DirChild>>, DeleteError> {
        match self.fs.read_dir(dir) {
            Ok(children) => Ok(Some(children)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DeleteError::new(dir, err)),
        }
    }
}
