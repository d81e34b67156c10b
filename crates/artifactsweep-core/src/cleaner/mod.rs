/// Clean sessions: feed a confirmed [`ScanResult`] through the
/// [`ForcedRemover`], directories first, then files, in list order.
///
/// A failure aborts only the candidate it happened in; the session moves on
/// to the next candidate and records the error. Nothing is retried.
///
/// [`start_clean`] runs a session on a background thread and streams
/// [`SessionEvent`]s over a `crossbeam` channel so the console can print each
/// deletion as it happens. The worker is the only thread touching the
/// filesystem, one node at a time.
use crate::error::DeleteError;
use crate::model::{CandidateKind, ScanResult};
use crate::remover::fs::{FileSystem, OsFileSystem};
use crate::remover::{ForcedRemover, Removal, RemovalEvent};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Maximum number of events that may queue up in the session channel.
///
/// The console drains continuously, so this only bounds memory if output
/// is slow (e.g. a paused terminal); the worker then waits for it.
pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not processed yet.
    Pending,
    /// Removed by this session.
    Deleted,
    /// Already gone, typically removed with an enclosing candidate.
    Absent,
    /// Could not be removed; the message carries path and cause.
    Failed(String),
    /// The operator declined, so the session never ran.
    Skipped,
}

impl Outcome {
    /// Lowercase status word, as used in reports.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Deleted => "deleted",
            Self::Absent => "absent",
            Self::Failed(_) => "failed",
            Self::Skipped => "skipped",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn from_result(result: &Result<Removal, DeleteError>) -> Self {
        match result {
            Ok(Removal::Deleted) => Self::Deleted,
            Ok(Removal::Absent) => Self::Absent,
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

/// Totals for a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// One outcome per candidate, in [`ScanResult::candidates`] order.
    pub outcomes: Vec<Outcome>,
    /// Files and symlinks deleted (including nested ones).
    pub files_removed: u64,
    /// Directories deleted (including nested ones).
    pub directories_removed: u64,
    /// Nodes whose read-only attribute had to be cleared.
    pub read_only_cleared: u64,
    pub duration: Duration,
}

impl SessionSummary {
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Failed(_)))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    fn record(&mut self, event: &RemovalEvent) {
        match event {
            RemovalEvent::ReadOnlyCleared(_) => self.read_only_cleared += 1,
            RemovalEvent::DeletingFile(_) => self.files_removed += 1,
            RemovalEvent::DeletingDirectory(_) => self.directories_removed += 1,
        }
    }

    /// Undo the count of an announced delete that then failed.
    fn retract(&mut self, event: &RemovalEvent) {
        match event {
            RemovalEvent::ReadOnlyCleared(_) => {}
            RemovalEvent::DeletingFile(_) => self.files_removed -= 1,
            RemovalEvent::DeletingDirectory(_) => self.directories_removed -= 1,
        }
    }
}

/// Messages streamed from a session.
#[derive(Debug)]
pub enum SessionEvent {
    /// A candidate is about to be processed.
    CandidateStarted { index: usize, kind: CandidateKind },
    /// A record from the remover.
    Removal(RemovalEvent),
    /// A candidate could not be removed completely.
    Failed { index: usize, error: DeleteError },
    /// The session is over; no further events follow.
    Complete(SessionSummary),
}

/// Run every candidate of `result` through `remover`, reporting to `on_event`.
///
/// Directories go through [`ForcedRemover::remove_dir_recursive`], files
/// through [`ForcedRemover::remove_file`]. `Complete` is *not* emitted here;
/// the summary is returned instead.
pub fn run_clean<F: FileSystem>(
    result: &ScanResult,
    remover: &ForcedRemover<F>,
    on_event: &dyn Fn(SessionEvent),
) -> SessionSummary {
    let start = Instant::now();
    let summary = std::cell::RefCell::new(SessionSummary {
        outcomes: Vec::with_capacity(result.len()),
        ..SessionSummary::default()
    });

    info!(
        directories = result.directories.len(),
        files = result.files.len(),
        "Starting clean of {}",
        result.root.display()
    );

    // Records come before the delete, so the last one may name a node
    // that is still there when the candidate fails.
    let last_announced = std::cell::RefCell::new(None::<RemovalEvent>);
    let sink = |event: RemovalEvent| {
        summary.borrow_mut().record(&event);
        if !matches!(event, RemovalEvent::ReadOnlyCleared(_)) {
            *last_announced.borrow_mut() = Some(event.clone());
        }
        on_event(SessionEvent::Removal(event));
    };

    for (index, candidate) in result.candidates().enumerate() {
        on_event(SessionEvent::CandidateStarted {
            index,
            kind: candidate.kind,
        });

        let removal = match candidate.kind {
            CandidateKind::Directory => remover.remove_dir_recursive(&candidate.path, &sink),
            CandidateKind::File => remover.remove_file(&candidate.path, &sink),
        };

        let outcome = Outcome::from_result(&removal);
        summary.borrow_mut().outcomes.push(outcome);
        let announced = last_announced.borrow_mut().take();
        if let Err(error) = removal {
            if let Some(event) = announced.filter(|e| e.path() == error.path) {
                summary.borrow_mut().retract(&event);
            }
            warn!("{error}");
            on_event(SessionEvent::Failed { index, error });
        }
    }

    let mut summary = summary.into_inner();
    summary.duration = start.elapsed();
    info!(
        files = summary.files_removed,
        directories = summary.directories_removed,
        failures = summary.failures(),
        "Clean finished in {:?}",
        summary.duration
    );
    summary
}

/// Handle to a running clean session.
pub struct CleanHandle {
    /// Receiver for session events; ends with [`SessionEvent::Complete`].
    pub events_rx: Receiver<SessionEvent>,
    /// Join handle for the worker thread.
    thread: Option<thread::JoinHandle<()>>,
}

impl CleanHandle {
    /// Iterate events until `Complete` has been delivered or the worker
    /// is gone.
    pub fn events(&self) -> crossbeam_channel::Iter<'_, SessionEvent> {
        self.events_rx.iter()
    }

    /// Discard the remaining events and block until the worker has finished.
    ///
    /// Deletion cannot be interrupted, so a frontend that can no longer
    /// present events calls this before giving up. Returns the summary if
    /// it had not been received yet.
    pub fn wait(mut self) -> Option<SessionSummary> {
        let mut summary = None;
        for event in self.events_rx.iter() {
            if let SessionEvent::Complete(s) = event {
                summary = Some(s);
            }
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("clean worker panicked");
            }
        }
        summary
    }
}

/// Start cleaning `result` on a background thread using the real filesystem.
pub fn start_clean(result: Arc<ScanResult>) -> std::io::Result<CleanHandle> {
    let (events_tx, events_rx) = crossbeam_channel::bounded::<SessionEvent>(EVENT_CHANNEL_CAPACITY);

    let thread = thread::Builder::new()
        .name("artifactsweep-cleaner".into())
        .spawn(move || run_worker(&result, &events_tx))?;

    Ok(CleanHandle {
        events_rx,
        thread: Some(thread),
    })
}

fn run_worker(result: &ScanResult, events_tx: &Sender<SessionEvent>) {
    let remover = ForcedRemover::<OsFileSystem>::new();
    // A dropped receiver only means nobody is listening; keep deleting.
    let summary = run_clean(result, &remover, &|event| {
        let _ = events_tx.send(event);
    });
    let _ = events_tx.send(SessionEvent::Complete(summary));
}
