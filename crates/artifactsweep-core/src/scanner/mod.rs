/// Scanner: finds artifact directories and files below a root.
///
/// Uses `jwalk` with sorted, depth-first output, so the candidate lists come
/// out in the same order on every run whether the walk is serial or spread
/// over a thread pool. The scan is read-only: unreadable entries are counted
/// and skipped, never fatal. Only a bad root fails the scan.
///
/// Candidates nest freely. `bin/Debug` yields both `bin` and `bin/Debug`, and
/// a `.user` file inside `obj/` is listed as a file too; the remover treats
/// whatever is already gone as a no-op.
use crate::error::ScanError;
use crate::model::{ArtifactFilters, Candidate, ScanResult};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Tunables for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Walker threads: 1 walks on the calling thread, 0 uses one per CPU.
    pub threads: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

impl ScanOptions {
    fn parallelism(&self) -> jwalk::Parallelism {
        match self.threads {
            1 => jwalk::Parallelism::Serial,
            0 => jwalk::Parallelism::RayonNewPool(num_cpus::get()),
            n => jwalk::Parallelism::RayonNewPool(n),
        }
    }
}

/// Scan `root` for directories and files matching `filters`.
pub fn scan(
    root: &Path,
    filters: &ArtifactFilters,
    options: &ScanOptions,
) -> Result<ScanResult, ScanError> {
    let start = Instant::now();
    check_root(root)?;
    info!(root = %root.display(), threads = options.threads, "Starting artifact scan");

    let mut directories: Vec<Candidate> = Vec::new();
    let mut files: Vec<Candidate> = Vec::new();
    let mut inaccessible: u64 = 0;

    // Directory candidate path -> position in `directories`, for size roll-up.
    let mut dir_index: HashMap<PathBuf, usize> = HashMap::new();

    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .parallelism(options.parallelism());

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                inaccessible += 1;
                debug!(
                    path = %err.path().map(|p| p.display().to_string()).unwrap_or_default(),
                    "skipping inaccessible entry: {err}"
                );
                continue;
            }
        };

        // The root itself is never a candidate.
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            // jwalk reports an unreadable directory on the entry itself, not
            // as an `Err` item.
            if let Some(err) = &entry.read_children_error {
                inaccessible += 1;
                debug!(path = %path.display(), "skipping unreadable directory: {err}");
            }
            // A name that is not UTF-8 can never equal a filter.
            let name = entry.file_name().to_str();
            if let Some(matched) = name.and_then(|n| filters.match_directory(n)) {
                dir_index.insert(path.clone(), directories.len());
                directories.push(Candidate::directory(path, matched.clone()));
            }
            continue;
        }

        let size = if file_type.is_file() {
            match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(err) => {
                    inaccessible += 1;
                    debug!(path = %path.display(), "cannot stat file: {err}");
                    0
                }
            }
        } else {
            0
        };

        if size > 0 && !dir_index.is_empty() {
            credit_enclosing(&path, root, size, &dir_index, &mut directories);
        }

        if let Some(matched) = filters.match_file(entry.file_name()) {
            files.push(Candidate::file(path, matched.clone(), size));
        }
    }

    let duration = start.elapsed();
    info!(
        directories = directories.len(),
        files = files.len(),
        inaccessible,
        "Scan complete in {duration:?}"
    );

    Ok(ScanResult {
        root: root.to_path_buf(),
        filters: filters.clone(),
        directories,
        files,
        inaccessible,
        duration,
    })
}

/// The root must exist and be a directory.
fn check_root(root: &Path) -> Result<(), ScanError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(root.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(ScanError::NotFound(root.to_path_buf()))
        }
        Err(source) => Err(ScanError::Inaccessible {
            path: root.to_path_buf(),
            source,
        }),
    }
}

/// Add a file's size to every directory candidate that encloses it.
///
/// The walk is depth-first with parents first, so every enclosing candidate
/// is already registered when its files arrive.
fn credit_enclosing(
    path: &Path,
    root: &Path,
    size: u64,
    dir_index: &HashMap<PathBuf, usize>,
    directories: &mut [Candidate],
) {
    for ancestor in path.ancestors().skip(1) {
        if ancestor == root {
            break;
        }
        if let Some(&idx) = dir_index.get(ancestor) {
            directories[idx].size += size;
        }
    }
}
