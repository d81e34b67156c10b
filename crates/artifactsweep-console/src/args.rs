/// Command-line arguments.
use artifactsweep_core::model::filters::{DEFAULT_DIRECTORY_NAMES, DEFAULT_FILE_EXTENSIONS};
use artifactsweep_core::scanner::ScanOptions;
use artifactsweep_core::ArtifactFilters;
use clap::{ArgAction, Parser};
use std::io;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ArtifactSweep",
    author,
    version,
    about = "Find and force-delete Visual Studio build artifacts (bin, obj, Debug, Release, *.user)",
    long_about = None
)]
pub struct Args {
    /// Folder to clean (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Directory name to delete; repeat to replace the default list
    #[arg(short = 'd', long = "dir", value_name = "NAME")]
    pub dirs: Vec<String>,

    /// File extension to delete; repeat to replace the default list
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub exts: Vec<String>,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Scanner threads (0 = one per CPU)
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub threads: usize,

    /// Write a session report (.json or .csv)
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Wait for Enter before exiting
    #[arg(long)]
    pub pause: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Filters for this run. `--dir` and `--ext` each replace only their own
    /// default list.
    pub fn filters(&self) -> ArtifactFilters {
        let dirs: Vec<&str> = if self.dirs.is_empty() {
            DEFAULT_DIRECTORY_NAMES.to_vec()
        } else {
            self.dirs.iter().map(String::as_str).collect()
        };
        let exts: Vec<&str> = if self.exts.is_empty() {
            DEFAULT_FILE_EXTENSIONS.to_vec()
        } else {
            self.exts.iter().map(String::as_str).collect()
        };
        ArtifactFilters::new(dirs, exts)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            threads: self.threads,
        }
    }

    /// The absolute scan root. Relative paths resolve against the current
    /// directory; symlinks are left alone.
    pub fn resolve_root(&self) -> io::Result<PathBuf> {
        match &self.root {
            Some(root) => std::path::absolute(root),
            None => std::env::current_dir(),
        }
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
