/// End-to-end clean sessions: scan a generated solution tree, then run the
/// result through `run_clean` / `start_clean` and check what is left.
use artifactsweep_core::cleaner::{run_clean, start_clean, Outcome, SessionEvent};
use artifactsweep_core::model::CaseRule;
use artifactsweep_core::remover::fs::{DirChild, FileSystem, OsFileSystem};
use artifactsweep_core::remover::{ForcedRemover, RemovalEvent};
use artifactsweep_core::scanner::{scan, ScanOptions};
use artifactsweep_core::{ArtifactFilters, CandidateKind, ScanResult};
use std::cell::RefCell;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A two-project solution with nested and read-only artifacts.
fn build_solution(root: &Path) {
    write(&root.join("App.sln"), "sln");
    write(&root.join("App").join("Program.cs"), "class P {}");
    write(&root.join("App").join("App.csproj"), "<Project/>");
    write(&root.join("App").join("App.csproj.user"), "<Project/>");
    write(&root.join("App").join("bin").join("Debug").join("App.dll"), "dll");
    write(&root.join("App").join("obj").join("project.assets.json"), "{}");
    write(&root.join("App").join("obj").join("stale.user"), "x");
    write(&root.join("Lib").join("Lib.cs"), "class L {}");
    write(&root.join("Lib").join("Release").join("Lib.dll"), "dll");

    let locked = root.join("Lib").join("Release").join("Lib.dll");
    let mut perms = fs::metadata(&locked).unwrap().permissions();
    perms.set_readonly(true);
    fs::set_permissions(&locked, perms).unwrap();
}

fn scan_solution(root: &Path) -> ScanResult {
    let filters = ArtifactFilters::default().with_case_rule(CaseRule::Sensitive);
    scan(root, &filters, &ScanOptions::default()).unwrap()
}

fn assert_sources_intact(root: &Path) {
    for source in [
        root.join("App.sln"),
        root.join("App").join("Program.cs"),
        root.join("App").join("App.csproj"),
        root.join("Lib").join("Lib.cs"),
    ] {
        assert!(source.exists(), "{} was deleted", source.display());
    }
}

/// Forwards to the OS but refuses to delete one path.
struct LockingFs {
    locked: PathBuf,
}

impl FileSystem for LockingFs {
    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        OsFileSystem.symlink_metadata(path)
    }

    fn clear_read_only(&self, path: &Path, metadata: &Metadata) -> io::Result<bool> {
        OsFileSystem.clear_read_only(path, metadata)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirChild>> {
        OsFileSystem.read_dir(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if path == self.locked {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "in use"));
        }
        OsFileSystem.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        OsFileSystem.remove_dir(path)
    }
}

// ── run_clean ────────────────────────────────────────────────────────────────

#[test]
fn cleans_solution_and_keeps_sources() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    build_solution(root);
    let result = scan_solution(root);
    assert_eq!(result.directories.len(), 4, "{result:?}");

    let summary = run_clean(&result, &ForcedRemover::new(), &|_| {});

    assert!(summary.is_success(), "{summary:?}");
    assert_eq!(summary.outcomes.len(), result.len());
    assert!(!root.join("App").join("bin").exists());
    assert!(!root.join("App").join("obj").exists());
    assert!(!root.join("Lib").join("Release").exists());
    assert!(!root.join("App").join("App.csproj.user").exists());
    assert!(summary.read_only_cleared >= 1);
    assert_sources_intact(root);

    // A rescan finds nothing.
    assert!(scan_solution(root).is_empty());
}

#[test]
fn nested_candidates_resolve_as_absent() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    build_solution(root);
    let result = scan_solution(root);

    let summary = run_clean(&result, &ForcedRemover::new(), &|_| {});

    let outcome_of = |path: PathBuf| {
        let index = result
            .candidates()
            .position(|c| c.path == path)
            .unwrap_or_else(|| panic!("{} not listed", path.display()));
        summary.outcomes[index].clone()
    };
    assert_eq!(outcome_of(root.join("App").join("bin")), Outcome::Deleted);
    // Listed separately but removed together with bin/ and obj/.
    assert_eq!(
        outcome_of(root.join("App").join("bin").join("Debug")),
        Outcome::Absent
    );
    assert_eq!(
        outcome_of(root.join("App").join("obj").join("stale.user")),
        Outcome::Absent
    );
    assert_eq!(
        outcome_of(root.join("App").join("App.csproj.user")),
        Outcome::Deleted
    );
}

#[test]
fn events_announce_every_candidate_in_order() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    build_solution(root);
    let result = scan_solution(root);

    let started = RefCell::new(Vec::new());
    let deleted_files = RefCell::new(Vec::new());
    run_clean(&result, &ForcedRemover::new(), &|event| match event {
        SessionEvent::CandidateStarted { index, kind } => started.borrow_mut().push((index, kind)),
        SessionEvent::Removal(RemovalEvent::DeletingFile(path)) => {
            deleted_files.borrow_mut().push(path)
        }
        _ => {}
    });

    let started = started.into_inner();
    assert_eq!(started.len(), result.len());
    assert!(started.iter().enumerate().all(|(i, (index, _))| i == *index));
    // Directories are processed before files.
    let first_file = started
        .iter()
        .position(|(_, kind)| *kind == CandidateKind::File)
        .unwrap();
    assert_eq!(first_file, result.directories.len());
    assert!(deleted_files
        .into_inner()
        .contains(&root.join("App").join("bin").join("Debug").join("App.dll")));
}

#[test]
fn failure_aborts_one_candidate_and_session_continues() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    build_solution(root);
    let result = scan_solution(root);

    let locked = root.join("App").join("obj").join("project.assets.json");
    let remover = ForcedRemover::with_file_system(LockingFs {
        locked: locked.clone(),
    });
    let failures = RefCell::new(Vec::new());
    let summary = run_clean(&result, &remover, &|event| {
        if let SessionEvent::Failed { index, error } = event {
            failures.borrow_mut().push((index, error.path));
        }
    });

    assert_eq!(summary.failures(), 1);
    assert!(!summary.is_success());
    let failures = failures.into_inner();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].1, locked);
    assert!(matches!(
        &summary.outcomes[failures[0].0],
        Outcome::Failed(message) if message.contains("project.assets.json")
    ));

    // Only deletes that happened are counted, not the refused one.
    assert_eq!(summary.files_removed, 4);
    assert_eq!(summary.directories_removed, 3);

    // obj/ survives with the locked file; everything after it was still cleaned.
    assert!(locked.exists());
    assert!(!root.join("Lib").join("Release").exists());
    assert!(!root.join("App").join("App.csproj.user").exists());
    assert_sources_intact(root);
}

#[test]
fn empty_result_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("src").join("main.cs"), "x");
    let result = scan_solution(tmp.path());
    assert!(result.is_empty());

    let events = RefCell::new(0usize);
    let summary = run_clean(&result, &ForcedRemover::new(), &|_| *events.borrow_mut() += 1);

    assert!(summary.outcomes.is_empty());
    assert!(summary.is_success());
    assert_eq!(*events.borrow(), 0);
}

// ── start_clean ──────────────────────────────────────────────────────────────

#[test]
fn background_session_ends_with_complete() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    build_solution(root);
    let result = Arc::new(scan_solution(root));

    let handle = start_clean(Arc::clone(&result)).unwrap();
    let mut removals = 0u64;
    let mut summary = None;
    for event in handle.events() {
        match event {
            SessionEvent::Removal(RemovalEvent::DeletingFile(_))
            | SessionEvent::Removal(RemovalEvent::DeletingDirectory(_)) => removals += 1,
            SessionEvent::Complete(s) => {
                summary = Some(s);
                break;
            }
            _ => {}
        }
    }

    let summary = summary.expect("session must end with Complete");
    assert!(summary.is_success(), "{summary:?}");
    assert_eq!(removals, summary.files_removed + summary.directories_removed);
    assert!(!root.join("App").join("bin").exists());
    assert_sources_intact(root);
}

#[test]
fn wait_lets_the_session_finish_without_a_reader() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    for i in 0..40 {
        write(&root.join(format!("P{i:02}")).join("bin").join("App.dll"), "dll");
    }
    let result = Arc::new(scan_solution(root));
    assert_eq!(result.directories.len(), 40);

    let handle = start_clean(result).unwrap();
    // Read a single event, then stop listening.
    assert!(handle.events().next().is_some());
    let summary = handle.wait().expect("summary not yet received");

    assert!(summary.is_success(), "{summary:?}");
    assert_eq!(summary.directories_removed, 40);
    for i in 0..40 {
        assert!(!root.join(format!("P{i:02}")).join("bin").exists());
    }
}
