use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use thiserror::Error;

use crate::archive::{self, PdfArchive};
use crate::extract;
use crate::matcher::TermMatcher;
use crate::request::{MatchResult, MatchSource, ProgressState, RequestError, SearchRequest};
use crate::walker::Walker;

/// Errors that stop a search before it starts
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("Invalid search term: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Failed to start search thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Messages emitted by a running search.
///
/// `Started` always comes first and `Finished` always comes last. Archives
/// that failed during discovery are reported right after `Started`.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// Candidate discovery is done
    Started { total: usize },
    FileSearched { source: MatchSource, matches: Vec<MatchResult> },
    FileFailed { source: MatchSource, reason: String },
    /// The archive could not be opened; none of its members are searched
    ArchiveFailed { archive: PathBuf, error: String },
    Progress(ProgressState),
    Finished(SearchSummary),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    NoFiles,
    NoResults { files: usize },
    Matches { total: usize, files: usize },
    Cancelled { processed: usize, total: usize, matches: usize },
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::NoFiles => write!(f, "No PDF files found"),
            SearchOutcome::NoResults { files } => {
                write!(f, "No results found in {} file(s)", files)
            }
            SearchOutcome::Matches { total, files } => write!(
                f,
                "{} {} found in {} file(s)",
                total,
                if *total == 1 { "match" } else { "matches" },
                files
            ),
            SearchOutcome::Cancelled { processed, total, matches } => write!(
                f,
                "Search stopped after {} of {} file(s), {} match(es) so far",
                processed, total, matches
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSummary {
    pub outcome: SearchOutcome,
    pub progress: ProgressState,
    /// Files and archives that could not be read
    pub failures: usize,
}

impl SearchSummary {
    pub fn total_matches(&self) -> usize {
        match self.outcome {
            SearchOutcome::Matches { total, .. } => total,
            SearchOutcome::Cancelled { matches, .. } => matches,
            SearchOutcome::NoFiles | SearchOutcome::NoResults { .. } => 0,
        }
    }
}

/// Cooperative stop flag, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A validated request with its compiled matcher
#[derive(Debug, Clone)]
pub struct SearchJob {
    request: SearchRequest,
    matcher: TermMatcher,
}

/// Candidate files found before matching starts
struct Candidates {
    archives: Vec<(PathBuf, Vec<String>)>,
    pdfs: Vec<PathBuf>,
    /// Archives that could not be listed, with the reason
    broken_archives: Vec<(PathBuf, String)>,
}

impl Candidates {
    fn total(&self) -> usize {
        self.pdfs.len() + self.archives.iter().map(|(_, entries)| entries.len()).sum::<usize>()
    }
}

/// Running totals for one run
struct RunState {
    progress: ProgressState,
    matches: usize,
    matched_files: usize,
    failures: usize,
}

impl SearchJob {
    /// Validate the request and compile the term
    pub fn prepare(request: SearchRequest) -> Result<Self, SearchError> {
        request.validate()?;
        let matcher = TermMatcher::new(request.term(), &request.options())?;
        Ok(Self { request, matcher })
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Run the search to completion (or cancellation) on the current thread.
    ///
    /// Archive members are searched before plain PDFs. A `Progress` event
    /// follows every file, and the last event is always `Finished`.
    pub fn run(&self, cancel: &CancelToken, mut emit: impl FnMut(SearchEvent)) -> SearchSummary {
        info!(
            "Searching for '{}' in {}",
            self.request.term(),
            self.request.root().display()
        );

        let candidates = self.discover();
        let total = candidates.total();
        let failures = candidates.broken_archives.len();
        emit(SearchEvent::Started { total });

        for (archive, error) in candidates.broken_archives.iter().cloned() {
            emit(SearchEvent::ArchiveFailed { archive, error });
        }

        if total == 0 {
            let summary = SearchSummary {
                outcome: SearchOutcome::NoFiles,
                progress: ProgressState::default(),
                failures,
            };
            info!("{}", summary.outcome);
            emit(SearchEvent::Finished(summary.clone()));
            return summary;
        }

        let mut state = RunState {
            progress: ProgressState::new(total),
            matches: 0,
            matched_files: 0,
            failures,
        };

        let completed = self.search_archives(&candidates.archives, cancel, &mut state, &mut emit)
            && self.search_pdfs(&candidates.pdfs, cancel, &mut state, &mut emit);

        let outcome = if !completed {
            SearchOutcome::Cancelled {
                processed: state.progress.processed,
                total,
                matches: state.matches,
            }
        } else if state.matches == 0 {
            SearchOutcome::NoResults { files: total }
        } else {
            SearchOutcome::Matches {
                total: state.matches,
                files: state.matched_files,
            }
        };

        let summary = SearchSummary {
            outcome,
            progress: state.progress,
            failures: state.failures,
        };
        info!("{}", summary.outcome);
        emit(SearchEvent::Finished(summary.clone()));
        summary
    }

    fn discover(&self) -> Candidates {
        let options = self.request.options();
        let walker = Walker::new(
            self.request.root(),
            options.include_subdirectories,
            options.include_archives,
        );

        let mut archives = Vec::new();
        let mut broken_archives = Vec::new();
        for path in walker.archive_files() {
            match archive::list_pdf_entries(&path) {
                Ok(entries) => {
                    debug!("{}: {} PDF member(s)", path.display(), entries.len());
                    archives.push((path, entries));
                }
                Err(e) => {
                    warn!("Error opening archive {}: {}", path.display(), e);
                    broken_archives.push((path, e.to_string()));
                }
            }
        }

        let pdfs = walker.pdf_files().collect();

        Candidates {
            archives,
            pdfs,
            broken_archives,
        }
    }

    /// Returns false when the run was cancelled
    fn search_archives(
        &self,
        archives: &[(PathBuf, Vec<String>)],
        cancel: &CancelToken,
        state: &mut RunState,
        emit: &mut impl FnMut(SearchEvent),
    ) -> bool {
        for (path, entries) in archives {
            if entries.is_empty() {
                continue;
            }
            if cancel.is_cancelled() {
                return false;
            }

            let mut opened = match PdfArchive::open(path) {
                Ok(opened) => opened,
                Err(e) => {
                    // Gone or changed since discovery; its members still count as processed
                    warn!("Error opening archive {}: {}", path.display(), e);
                    state.failures += 1;
                    emit(SearchEvent::ArchiveFailed {
                        archive: path.clone(),
                        error: e.to_string(),
                    });
                    for _ in entries {
                        state.progress.advance();
                    }
                    emit(SearchEvent::Progress(state.progress));
                    continue;
                }
            };

            for name in entries {
                if cancel.is_cancelled() {
                    return false;
                }

                // Decompression runs outside the PDF parser's panic guard
                let searched = panic::catch_unwind(AssertUnwindSafe(|| {
                    opened.search_member(name, &self.matcher)
                }));

                match searched {
                    Ok(outcome) => {
                        record(outcome.source, outcome.result.map_err(|e| e.to_string()), state, emit)
                    }
                    Err(_) => {
                        let source = MatchSource::ArchiveMember {
                            archive: path.clone(),
                            member: name.clone(),
                        };
                        record(source, Err("reading the member panicked".to_string()), state, emit);
                    }
                }
            }
        }

        true
    }

    /// Returns false when the run was cancelled
    fn search_pdfs(
        &self,
        pdfs: &[PathBuf],
        cancel: &CancelToken,
        state: &mut RunState,
        emit: &mut impl FnMut(SearchEvent),
    ) -> bool {
        for path in pdfs {
            if cancel.is_cancelled() {
                return false;
            }

            let result = self.search_file(path);
            record(MatchSource::File(path.clone()), result, state, emit);
        }

        true
    }

    /// Search one PDF on disk
    pub fn search_file(&self, path: &Path) -> Result<Vec<MatchResult>, String> {
        debug!("Searching {}", path.display());
        let source = MatchSource::File(path.to_path_buf());

        extract::extract_pages_from_file(path)
            .map(|pages| self.matcher.match_pages(&source, &pages))
            .map_err(|e| e.to_string())
    }
}

/// Fold one file's result into the run state and report it
fn record(
    source: MatchSource,
    result: Result<Vec<MatchResult>, String>,
    state: &mut RunState,
    emit: &mut impl FnMut(SearchEvent),
) {
    match result {
        Ok(matches) => {
            if !matches.is_empty() {
                state.matches += matches.len();
                state.matched_files += 1;
            }
            emit(SearchEvent::FileSearched { source, matches });
        }
        Err(reason) => {
            warn!("Error processing {}: {}", source, reason);
            state.failures += 1;
            emit(SearchEvent::FileFailed { source, reason });
        }
    }

    state.progress.advance();
    emit(SearchEvent::Progress(state.progress));
}

/// Validate, then run the whole search on the current thread
pub fn run_search(
    request: SearchRequest,
    cancel: &CancelToken,
    emit: impl FnMut(SearchEvent),
) -> Result<SearchSummary, SearchError> {
    let job = SearchJob::prepare(request)?;
    Ok(job.run(cancel, emit))
}

/// A search running on its own worker thread
pub struct SearchHandle {
    events: Receiver<SearchEvent>,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
}

impl SearchHandle {
    /// Events received so far, without blocking
    pub fn try_events(&self) -> impl Iterator<Item = SearchEvent> + '_ {
        self.events.try_iter()
    }

    /// Block until the next event. `None` once the worker is gone.
    pub fn next_event(&self) -> Option<SearchEvent> {
        self.events.recv().ok()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    /// Wait for the worker to exit
    pub fn join(mut self) {
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.join() {
                warn!("Search thread panicked: {:?}", e);
            }
        }
    }
}

/// Validate the request and start it on a background thread.
///
/// `notify` is called after every event is queued so a UI can wake up and
/// drain the channel.
pub fn spawn_search(
    request: SearchRequest,
    notify: impl Fn() + Send + 'static,
) -> Result<SearchHandle, SearchError> {
    let job = SearchJob::prepare(request)?;
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();

    let worker_cancel = cancel.clone();
    let worker = thread::Builder::new()
        .name("pdf-search".to_string())
        .spawn(move || {
            job.run(&worker_cancel, |event| {
                // The receiver going away just means nobody is listening any more
                if tx.send(event).is_ok() {
                    notify();
                }
            });
        })?;

    Ok(SearchHandle {
        events: rx,
        cancel,
        worker: Some(worker),
    })
}
