use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::extract::{self, ExtractError};
use crate::matcher::TermMatcher;
use crate::request::{MatchResult, MatchSource};

/// Errors raised while opening or reading a ZIP archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a valid ZIP archive: {}: {source}", .path.display())]
    BadFormat { path: PathBuf, source: ZipError },
    #[error("Archive member not found: {0}")]
    MemberNotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ArchiveError {
    fn from_zip(path: &Path, err: ZipError) -> Self {
        match err {
            ZipError::Io(e) if e.kind() == io::ErrorKind::NotFound => {
                ArchiveError::NotFound(path.to_path_buf())
            }
            ZipError::Io(e) => ArchiveError::Io(e),
            other => ArchiveError::BadFormat {
                path: path.to_path_buf(),
                source: other,
            },
        }
    }
}

/// Outcome of searching one archive member
#[derive(Debug)]
pub struct MemberOutcome {
    pub source: MatchSource,
    pub result: Result<Vec<MatchResult>, MemberError>,
}

/// Largest member that will be read into memory
pub const MAX_MEMBER_SIZE: u64 = 512 * 1024 * 1024;

/// Failure reading or parsing one archive member
#[derive(Debug, Error)]
pub enum MemberError {
    #[error("Failed to read archive member: {0}")]
    Read(#[from] ZipError),
    #[error("Archive member is too large ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// An opened ZIP container
pub struct PdfArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
    member_limit: u64,
}

impl PdfArchive {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ArchiveError::NotFound(path.to_path_buf())
            } else {
                ArchiveError::Io(e)
            }
        })?;

        let archive = ZipArchive::new(file).map_err(|e| ArchiveError::from_zip(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            archive,
            member_limit: MAX_MEMBER_SIZE,
        })
    }

    /// Override the per-member size limit
    pub fn with_member_limit(mut self, limit: u64) -> Self {
        self.member_limit = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the PDF members, sorted
    pub fn pdf_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| is_pdf_entry(name))
            .map(str::to_string)
            .collect();

        // file_names() has no stable order
        names.sort();
        names
    }

    /// Read a single member into memory.
    ///
    /// The size recorded in the archive can't be trusted, so it is checked
    /// against the limit before reading and the read itself is capped too.
    pub fn read_member(&mut self, name: &str) -> Result<Vec<u8>, MemberError> {
        let limit = self.member_limit;
        let entry = self.archive.by_name(name)?;

        let declared = entry.size();
        if declared > limit {
            return Err(MemberError::TooLarge { size: declared, limit });
        }

        let mut bytes = Vec::new();
        entry
            .take(limit.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(ZipError::Io)?;

        if bytes.len() as u64 > limit {
            return Err(MemberError::TooLarge { size: bytes.len() as u64, limit });
        }

        Ok(bytes)
    }

    /// Search one member. Failures are confined to the member.
    pub fn search_member(&mut self, name: &str, matcher: &TermMatcher) -> MemberOutcome {
        let source = MatchSource::ArchiveMember {
            archive: self.path.clone(),
            member: name.to_string(),
        };

        debug!("Searching {}", source);
        let result = self
            .read_member(name)
            .and_then(|bytes| extract::extract_pages_from_mem(&bytes).map_err(MemberError::from))
            .map(|pages| matcher.match_pages(&source, &pages));

        MemberOutcome { source, result }
    }
}

/// List the PDF members of an archive
pub fn list_pdf_entries(path: &Path) -> Result<Vec<String>, ArchiveError> {
    Ok(PdfArchive::open(path)?.pdf_entries())
}

/// Search every PDF member of an archive.
///
/// An error is only returned when the archive itself cannot be opened.
pub fn search_archive(path: &Path, matcher: &TermMatcher) -> Result<Vec<MemberOutcome>, ArchiveError> {
    let mut archive = PdfArchive::open(path)?;
    let entries = archive.pdf_entries();

    let outcomes = entries
        .iter()
        .map(|name| archive.search_member(name, matcher))
        .inspect(|outcome| {
            if let Err(e) = &outcome.result {
                warn!("Error processing {}: {}", outcome.source, e);
            }
        })
        .collect();

    Ok(outcomes)
}

/// Copy one member out of the archive into `dest_dir`, returning the new path
pub fn extract_member(archive_path: &Path, member: &str, dest_dir: &Path) -> Result<PathBuf, ArchiveError> {
    let mut archive = PdfArchive::open(archive_path)?;
    let bytes = archive.read_member(member).map_err(|e| match e {
        MemberError::Read(ZipError::FileNotFound) => ArchiveError::MemberNotFound(member.to_string()),
        MemberError::Read(e) => ArchiveError::from_zip(archive_path, e),
        e => ArchiveError::Io(io::Error::new(io::ErrorKind::InvalidData, e.to_string())),
    })?;

    // Only keep the final path component so a crafted member name can't escape dest_dir
    let file_name = Path::new(member)
        .file_name()
        .ok_or_else(|| ArchiveError::MemberNotFound(member.to_string()))?;

    fs::create_dir_all(dest_dir)?;
    let target = dest_dir.join(file_name);
    fs::write(&target, bytes)?;

    Ok(target)
}

fn is_pdf_entry(name: &str) -> bool {
    !name.ends_with('/') && name.to_lowercase().ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_entry_names() {
        assert!(is_pdf_entry("report.pdf"));
        assert!(is_pdf_entry("nested/dir/REPORT.PDF"));
        assert!(!is_pdf_entry("notes.txt"));
        assert!(!is_pdf_entry("folder.pdf/"));
    }
}
