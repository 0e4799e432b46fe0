use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors caught before a search is started
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Please choose a directory to search")]
    MissingDirectory,
    #[error("Please enter a search term")]
    MissingTerm,
    #[error("Directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),
}

/// Flags controlling how a search is performed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub match_case: bool,
    pub whole_word: bool,
    pub include_subdirectories: bool,
    pub include_archives: bool,
}

/// Everything a search run needs. Built once, never changed while the run is going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    root: PathBuf,
    term: String,
    options: SearchOptions,
}

impl SearchRequest {
    pub fn new(root: impl Into<PathBuf>, term: impl Into<String>, options: SearchOptions) -> Self {
        Self {
            root: root.into(),
            term: term.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Check the request the same way the form does before enabling a run.
    ///
    /// Order matters for the user: a missing directory is reported before a
    /// missing term, and existence is only checked once both are present.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.root.as_os_str().is_empty() {
            return Err(RequestError::MissingDirectory);
        }

        if self.term.trim().is_empty() {
            return Err(RequestError::MissingTerm);
        }

        if !self.root.is_dir() {
            return Err(RequestError::DirectoryNotFound(self.root.clone()));
        }

        Ok(())
    }
}

/// Where a searched document lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchSource {
    File(PathBuf),
    ArchiveMember { archive: PathBuf, member: String },
}

impl MatchSource {
    /// Short name suitable for a results header
    pub fn display_name(&self) -> String {
        match self {
            MatchSource::File(path) => path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            MatchSource::ArchiveMember { archive, member } => format!(
                "{} › {}",
                archive.file_name().unwrap_or_default().to_string_lossy(),
                member
            ),
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::File(path) => write!(f, "{}", path.display()),
            MatchSource::ArchiveMember { archive, member } => {
                write!(f, "{}!/{}", archive.display(), member)
            }
        }
    }
}

/// One matching text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub source: MatchSource,
    /// 1-based
    pub page: u32,
    pub label: String,
    pub snippet: String,
}

impl MatchResult {
    pub fn new(source: MatchSource, page: u32, block: &str) -> Self {
        Self {
            source,
            page,
            label: format!("Page {}", page),
            snippet: make_snippet(block, 80),
        }
    }
}

/// Collapse whitespace and cut the block down to `max_chars` characters
fn make_snippet(block: &str, max_chars: usize) -> String {
    let collapsed = block.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Files processed so far out of the total discovered for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub processed: usize,
    pub total: usize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self { processed: 0, total }
    }

    pub fn advance(&mut self) {
        self.processed = (self.processed + 1).min(self.total);
    }

    /// Value in 0.0..=1.0. An empty run sits at zero.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f32 / self.total as f32
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.processed == self.total
    }
}
