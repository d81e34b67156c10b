/// Session reports: a record of what was found and what became of it,
/// written as pretty JSON or as one CSV row per candidate.
use crate::cleaner::Outcome;
use crate::error::ReportError;
use crate::model::{ArtifactFilters, CandidateKind, ScanResult};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// On-disk report encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(ReportError::UnsupportedFormat(ext)),
        }
    }
}

/// One candidate and its fate.
#[derive(Debug, Serialize)]
pub struct ReportRow<'a> {
    pub kind: CandidateKind,
    /// Lossy for names that are not UTF-8.
    pub path: Cow<'a, str>,
    pub matched: &'a str,
    pub size: u64,
    pub status: &'static str,
    pub message: Option<&'a str>,
}

/// A whole session, ready to serialise.
#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    pub root: Cow<'a, str>,
    pub generated_at: DateTime<Local>,
    pub filters: &'a ArtifactFilters,
    pub inaccessible: u64,
    pub reclaimable_bytes: u64,
    pub candidates: Vec<ReportRow<'a>>,
}

impl<'a> SessionReport<'a> {
    /// Pair each candidate with its outcome.
    ///
    /// `outcomes` follows [`ScanResult::candidates`] order; missing entries
    /// (no session ran, or it stopped early) are reported as `fallback`.
    pub fn new(result: &'a ScanResult, outcomes: &'a [Outcome], fallback: &'a Outcome) -> Self {
        let candidates = result
            .candidates()
            .enumerate()
            .map(|(i, candidate)| {
                let outcome = outcomes.get(i).unwrap_or(fallback);
                ReportRow {
                    kind: candidate.kind,
                    path: candidate.path.to_string_lossy(),
                    matched: &candidate.matched,
                    size: candidate.size,
                    status: outcome.status(),
                    message: outcome.message(),
                }
            })
            .collect();

        Self {
            root: result.root.to_string_lossy(),
            generated_at: Local::now(),
            filters: &result.filters,
            inaccessible: result.inaccessible,
            reclaimable_bytes: result.reclaimable_bytes(),
            candidates,
        }
    }

    /// Encode into `writer`.
    pub fn write_to<W: Write>(&self, format: ReportFormat, writer: W) -> Result<(), ReportError> {
        match format {
            ReportFormat::Json => {
                let mut writer = writer;
                serde_json::to_writer_pretty(&mut writer, self)?;
                writeln!(writer).map_err(serde_json::Error::io)?;
            }
            ReportFormat::Csv => {
                let mut csv = csv::Writer::from_writer(writer);
                for row in &self.candidates {
                    csv.serialize(row)?;
                }
                csv.flush().map_err(csv::Error::from)?;
            }
        }
        Ok(())
    }

    /// Write the report to `path`, choosing the format from its extension.
    pub fn export(&self, path: &Path) -> Result<(), ReportError> {
        let format = ReportFormat::from_path(path)?;
        let io_err = |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        self.write_to(format, &mut writer)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}
