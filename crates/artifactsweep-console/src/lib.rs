/// ArtifactSweep console frontend.
///
/// This crate contains all terminal I/O. Scanning and deletion live in
/// `artifactsweep-core`; here they are wired to arguments, a colored
/// listing, the confirmation prompt, and the live deletion log.
pub mod app;
pub mod args;
pub mod prompt;
pub mod theme;

pub use app::{run, run_with, RunStatus};
pub use args::Args;
pub use theme::{Palette, Theme};
