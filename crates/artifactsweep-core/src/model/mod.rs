/// Data model for ArtifactSweep.
///
/// Filters decide what counts as an artifact; candidates are what the
/// scanner found; `size` turns byte counts into something readable.
pub mod candidate;
pub mod filters;
pub mod size;

pub use candidate::{Candidate, CandidateKind, ScanResult};
pub use filters::{file_extension, os_extension, ArtifactFilters, CaseRule};
