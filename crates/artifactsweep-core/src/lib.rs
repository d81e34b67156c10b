/// ArtifactSweep Core: scanning, forced removal, and clean sessions.
///
/// This crate contains all filesystem logic with zero console dependencies.
/// Everything observable (deletion records, failures, completion) is
/// emitted as structured events so any frontend can present it.
///
/// # Modules
///
/// - [`model`]: Filters, candidates, and size formatting.
/// - [`scanner`]: `jwalk`-based artifact discovery below a root folder.
/// - [`remover`]: Forced, bottom-up deletion of files and directory trees.
/// - [`cleaner`]: Runs a confirmed scan result through the remover on a worker thread.
/// - [`report`]: JSON / CSV export of a session.
/// - [`platform`]: Attribute clearing and elevation checks.
pub mod cleaner;
pub mod error;
pub mod model;
pub mod platform;
pub mod remover;
pub mod report;
pub mod scanner;

pub use error::{DeleteError, ReportError, ScanError};
pub use model::{ArtifactFilters, Candidate, CandidateKind, ScanResult};
