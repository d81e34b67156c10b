/// Error taxonomy for the core crate.
///
/// `ScanError` aborts a run before anything is listed. `DeleteError` aborts
/// only the candidate subtree it occurred in; the session keeps going.
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The scan root is unusable.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("root path {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("root path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot access root path {}", path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A file or directory could not be removed, even after clearing its
/// read-only attribute.
#[derive(Debug, Error)]
#[error("failed to delete {}: {cause}", path.display())]
pub struct DeleteError {
    /// The node that refused to go away.
    pub path: PathBuf,
    /// The underlying OS error.
    pub cause: io::Error,
}

impl DeleteError {
    pub fn new(path: &Path, cause: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            cause,
        }
    }

    /// `true` when the OS refused access (permissions, ACLs, elevation).
    pub fn is_permission_denied(&self) -> bool {
        self.cause.kind() == io::ErrorKind::PermissionDenied
    }
}

/// Writing a session report failed.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unsupported report format `{0}` (expected .json or .csv)")]
    UnsupportedFormat(String),

    #[error("failed to write report {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode JSON report")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode CSV report")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_error_mentions_path_and_cause() {
        let err = DeleteError::new(
            Path::new("/tmp/locked.dll"),
            io::Error::new(io::ErrorKind::PermissionDenied, "in use"),
        );
        let text = err.to_string();
        assert!(text.contains("locked.dll"), "{text}");
        assert!(text.contains("in use"), "{text}");
        assert!(err.is_permission_denied());
    }

    #[test]
    fn scan_error_names_the_root() {
        let err = ScanError::NotADirectory(PathBuf::from("notes.txt"));
        assert_eq!(err.to_string(), "root path notes.txt is not a directory");
    }
}
