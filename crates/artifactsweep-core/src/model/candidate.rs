/// Scan output: the directories and files selected for deletion.
///
/// A `ScanResult` is built once by the scanner, shown to the operator, and
/// then consumed by the cleaner in list order. It is never mutated in
/// between, so what was displayed is exactly what gets deleted.
use super::filters::ArtifactFilters;
use compact_str::CompactString;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Whether a candidate is removed as a whole tree or as a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Directory,
    File,
}

impl CandidateKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Directory => "Directory",
            Self::File => "File",
        }
    }
}

/// A path matched by one of the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub path: PathBuf,
    pub kind: CandidateKind,
    /// The directory name or extension filter that selected this path.
    pub matched: CompactString,
    /// File length, or the total length of all files beneath a directory.
    pub size: u64,
}

impl Candidate {
    pub fn directory(path: PathBuf, matched: CompactString) -> Self {
        Self {
            path,
            kind: CandidateKind::Directory,
            matched,
            size: 0,
        }
    }

    pub fn file(path: PathBuf, matched: CompactString, size: u64) -> Self {
        Self {
            path,
            kind: CandidateKind::File,
            matched,
            size,
        }
    }
}

/// Everything one scan found below a root.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Absolute scan root.
    pub root: PathBuf,
    /// Filters the scan ran with.
    pub filters: ArtifactFilters,
    /// Matching directories, in walk order.
    pub directories: Vec<Candidate>,
    /// Matching files, in walk order. May include files inside `directories`.
    pub files: Vec<Candidate>,
    /// Entries that could not be read and were left out.
    pub inaccessible: u64,
    pub duration: Duration,
}

impl ScanResult {
    /// `true` when there is nothing to delete.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    /// Total number of candidates across both lists.
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    /// All candidates in deletion order: directories first, then files.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.directories.iter().chain(self.files.iter())
    }

    /// Bytes freed by deleting everything, counting each byte once.
    ///
    /// Nested candidates (`bin/Debug`, a `.user` file inside `obj/`) are
    /// already covered by their enclosing directory.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.candidates()
            .filter(|c| !self.is_covered(&c.path))
            .map(|c| c.size)
            .sum()
    }

    /// `true` if `path` lies strictly inside one of the directory candidates.
    pub fn is_covered(&self, path: &Path) -> bool {
        self.directories
            .iter()
            .any(|dir| dir.path.as_path() != path && path.starts_with(&dir.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(dirs: &[(&str, u64)], files: &[(&str, u64)]) -> ScanResult {
        ScanResult {
            root: PathBuf::from("/src"),
            filters: ArtifactFilters::default(),
            directories: dirs
                .iter()
                .map(|(p, size)| Candidate {
                    size: *size,
                    ..Candidate::directory(PathBuf::from(p), CompactString::new("bin"))
                })
                .collect(),
            files: files
                .iter()
                .map(|(p, size)| Candidate::file(PathBuf::from(p), CompactString::new(".user"), *size))
                .collect(),
            inaccessible: 0,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn candidates_list_directories_before_files() {
        let r = result(&[("/src/a/bin", 10)], &[("/src/a.user", 1)]);
        let kinds: Vec<_> = r.candidates().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![CandidateKind::Directory, CandidateKind::File]);
        assert_eq!(r.len(), 2);
        assert!(!r.is_empty());
    }

    #[test]
    fn reclaimable_bytes_skips_nested_candidates() {
        let r = result(
            &[("/src/a/bin", 100), ("/src/a/bin/Debug", 60), ("/src/b/obj", 40)],
            &[("/src/a/bin/x.user", 5), ("/src/b.user", 7)],
        );
        assert_eq!(r.reclaimable_bytes(), 100 + 40 + 7);
    }

    #[test]
    fn sibling_with_common_prefix_is_not_covered() {
        let r = result(&[("/src/a/bin", 1)], &[]);
        assert!(!r.is_covered(Path::new("/src/a/binaries/x.user")));
        assert!(r.is_covered(Path::new("/src/a/bin/x.user")));
        assert!(!r.is_covered(Path::new("/src/a/bin")));
    }

    #[test]
    fn empty_result() {
        let r = result(&[], &[]);
        assert!(r.is_empty());
        assert_eq!(r.reclaimable_bytes(), 0);
    }
}
