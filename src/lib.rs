//! Find text in PDF files, including PDFs stored inside ZIP archives.
//!
//! The search runs on one worker thread and reports back through a channel
//! of [`SearchEvent`]s; see [`spawn_search`].

pub mod archive;
pub mod extract;
pub mod matcher;
pub mod request;
pub mod search;
pub mod viewer;
pub mod walker;

pub use matcher::TermMatcher;
pub use request::{MatchResult, MatchSource, ProgressState, RequestError, SearchOptions, SearchRequest};
pub use search::{
    run_search, spawn_search, CancelToken, SearchError, SearchEvent, SearchHandle, SearchJob,
    SearchOutcome, SearchSummary,
};
