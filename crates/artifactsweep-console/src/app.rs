/// The console session: banner, filters, listing, confirmation, live
/// deletion output, summary, and the optional report.
///
/// Everything is written through the `out` / `err` handles passed to
/// [`run_with`], so the whole flow runs against in-memory buffers in tests.
use crate::args::Args;
use crate::prompt;
use crate::theme::{Palette, Theme};
use anyhow::{Context, Result};
use artifactsweep_core::cleaner::{start_clean, Outcome, SessionEvent, SessionSummary};
use artifactsweep_core::model::size::{format_count, format_size};
use artifactsweep_core::model::Candidate;
use artifactsweep_core::platform::permission_hint;
use artifactsweep_core::remover::RemovalEvent;
use artifactsweep_core::report::SessionReport;
use artifactsweep_core::scanner;
use artifactsweep_core::{ArtifactFilters, ScanResult};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const BANNER: &str = "*** Visual Studio Artifact Cleaner ***";
pub const NOTHING_TO_DELETE: &str = "No files or directories to be deleted.";
pub const CANCELED: &str = "Operation canceled.";
pub const ALL_DELETED: &str = "Successfully deleted all files.";

/// How a run ended, short of a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The scan found no candidates; nothing was touched.
    NothingToDelete,
    /// The operator declined; nothing was touched.
    Canceled,
    /// The session ran; `failures` candidates could not be fully removed.
    Completed { failures: usize },
}

impl RunStatus {
    /// Process exit code: 1 if anything failed to delete, otherwise 0.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Completed { failures } if failures > 0 => 1,
            _ => 0,
        }
    }
}

/// Run against the real terminal.
pub fn run(args: &Args) -> Result<RunStatus> {
    let palette = Palette::detect(args.no_color);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with(
        args,
        palette,
        &mut stdin.lock(),
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

/// Run one session reading answers from `input`.
pub fn run_with<R, W, E>(
    args: &Args,
    palette: Palette,
    input: &mut R,
    out: &mut W,
    err: &mut E,
) -> Result<RunStatus>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let root = args
        .resolve_root()
        .context("cannot determine the folder to clean")?;
    let filters = args.filters();
    let theme = palette.out;

    writeln!(out, "{BANNER}")?;
    writeln!(out)?;
    print_filters(out, theme, &filters)?;

    let result = scanner::scan(&root, &filters, &args.scan_options())
        .with_context(|| format!("scan of {} failed", root.display()))?;

    print_listing(out, theme, &result)?;

    if result.is_empty() {
        writeln!(out, "{NOTHING_TO_DELETE}")?;
        export(args, out, &result, &[], &Outcome::Pending)?;
        return Ok(RunStatus::NothingToDelete);
    }

    writeln!(
        out,
        "{} directories and {} files, {} reclaimable.",
        format_count(result.directories.len() as u64),
        format_count(result.files.len() as u64),
        format_size(result.reclaimable_bytes()),
    )?;
    if result.inaccessible > 0 {
        writeln!(
            out,
            "{}",
            theme.muted(&format!(
                "{} entries could not be read and were skipped.",
                format_count(result.inaccessible)
            ))
        )?;
    }

    let confirmed = args.yes || prompt::confirm(input, out)?;
    if !confirmed {
        writeln!(out, "{CANCELED}")?;
        info!("Clean canceled by operator");
        export(args, out, &result, &[], &Outcome::Skipped)?;
        return Ok(RunStatus::Canceled);
    }
    writeln!(out)?;

    let result = Arc::new(result);
    let summary = clean(out, err, palette, Arc::clone(&result))?;

    writeln!(out)?;
    print_summary(out, err, palette, &result, &summary)?;
    export(args, out, &result, &summary.outcomes, &Outcome::Pending)?;

    Ok(RunStatus::Completed {
        failures: summary.failures(),
    })
}

/// Start the session worker and print its events until it completes.
///
/// If printing fails the worker is still allowed to finish before the
/// error is returned; deletion never stops halfway.
fn clean<W: Write, E: Write>(
    out: &mut W,
    err: &mut E,
    palette: Palette,
    result: Arc<ScanResult>,
) -> Result<SessionSummary> {
    let handle = start_clean(result).context("failed to start the clean session")?;

    while let Ok(event) = handle.events_rx.recv() {
        let event = match event {
            SessionEvent::Complete(summary) => return Ok(summary),
            event => event,
        };
        if let Err(write_err) = print_event(out, err, palette, event) {
            match handle.wait() {
                Some(summary) => warn!(
                    failures = summary.failures(),
                    "clean finished after console output failed"
                ),
                None => warn!("clean worker ended without a summary"),
            }
            return Err(anyhow::Error::new(write_err).context("cannot write deletion output"));
        }
    }

    anyhow::bail!("clean session ended without reporting a result")
}

fn print_event<W: Write, E: Write>(
    out: &mut W,
    err: &mut E,
    palette: Palette,
    event: SessionEvent,
) -> io::Result<()> {
    let theme = palette.out;
    match event {
        SessionEvent::Removal(RemovalEvent::DeletingDirectory(path)) => writeln!(
            out,
            "{} {}",
            theme.delete_label("Deleting Directory:"),
            theme.directory(&path.display().to_string())
        ),
        SessionEvent::Removal(RemovalEvent::DeletingFile(path)) => writeln!(
            out,
            "{} {}",
            theme.delete_label("Deleting File:"),
            theme.file(&path.display().to_string())
        ),
        SessionEvent::Failed { error, .. } => {
            writeln!(err, "{}", palette.err.error(&error.to_string()))?;
            match permission_hint(&error.cause) {
                Some(hint) => writeln!(err, "  {}", palette.err.muted(hint)),
                None => Ok(()),
            }
        }
        SessionEvent::Removal(RemovalEvent::ReadOnlyCleared(_))
        | SessionEvent::CandidateStarted { .. }
        | SessionEvent::Complete(_) => Ok(()),
    }
}

fn print_filters<W: Write>(out: &mut W, theme: Theme, filters: &ArtifactFilters) -> io::Result<()> {
    writeln!(out, "Searching for directory names:")?;
    writeln!(out)?;
    for name in filters.directory_names() {
        writeln!(out, "{}", theme.directory(name))?;
    }
    writeln!(out)?;

    writeln!(out, "Searching for files with extensions:")?;
    writeln!(out)?;
    for ext in filters.file_extensions() {
        writeln!(out, "{}", theme.file(ext))?;
    }
    writeln!(out)
}

fn print_listing<W: Write>(out: &mut W, theme: Theme, result: &ScanResult) -> io::Result<()> {
    writeln!(out, "Directories to be deleted:")?;
    writeln!(out)?;
    for candidate in &result.directories {
        writeln!(out, "{}", theme.directory(&entry_line(candidate)))?;
    }
    writeln!(out)?;

    writeln!(out, "Files to be deleted:")?;
    writeln!(out)?;
    for candidate in &result.files {
        writeln!(out, "{}", theme.file(&entry_line(candidate)))?;
    }
    writeln!(out)
}

fn entry_line(candidate: &Candidate) -> String {
    format!(
        "{}  ({})",
        candidate.path.display(),
        format_size(candidate.size)
    )
}

fn print_summary<W: Write, E: Write>(
    out: &mut W,
    err: &mut E,
    palette: Palette,
    result: &ScanResult,
    summary: &SessionSummary,
) -> io::Result<()> {
    let theme = palette.out;
    writeln!(
        out,
        "Removed {} files and {} directories in {:.2?}.",
        format_count(summary.files_removed),
        format_count(summary.directories_removed),
        summary.duration,
    )?;
    if summary.read_only_cleared > 0 {
        writeln!(
            out,
            "{}",
            theme.muted(&format!(
                "Cleared the read-only attribute on {} entries.",
                format_count(summary.read_only_cleared)
            ))
        )?;
    }

    let failures = summary.failures();
    if failures == 0 {
        writeln!(out, "{}", theme.success(ALL_DELETED))
    } else {
        writeln!(
            err,
            "{}",
            palette.err.error(&format!(
                "{failures} of {} items could not be deleted.",
                result.len()
            ))
        )
    }
}

/// Write the report if `--export` was given.
fn export<W: Write>(
    args: &Args,
    out: &mut W,
    result: &ScanResult,
    outcomes: &[Outcome],
    fallback: &Outcome,
) -> Result<()> {
    let Some(path) = args.export.as_deref() else {
        return Ok(());
    };
    write_report(path, result, outcomes, fallback)?;
    writeln!(out, "Report written to {}", path.display())?;
    Ok(())
}

fn write_report(
    path: &Path,
    result: &ScanResult,
    outcomes: &[Outcome],
    fallback: &Outcome,
) -> Result<()> {
    SessionReport::new(result, outcomes, fallback)
        .export(path)
        .with_context(|| format!("cannot export report to {}", path.display()))
}
