use std::fmt;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use log::{debug, warn};
use lopdf::Document;
use thiserror::Error;

/// Errors raised while pulling text out of a PDF
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("PDF parser panicked (malformed PDF?)")]
    Panicked,
}

/// Text of one page, split into blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number
    pub number: u32,
    pub blocks: Vec<String>,
}

/// Extract per-page blocks from a PDF file on disk
pub fn extract_pages_from_file(path: &Path) -> Result<Vec<PageText>, ExtractError> {
    let bytes = fs::read(path)?;
    extract_pages_from_mem(&bytes)
}

/// Extract per-page blocks from PDF bytes.
///
/// The parser is run under `catch_unwind` since malformed fonts and
/// streams can make it panic. A page that fails to decode is skipped, the
/// rest of the document is still returned.
pub fn extract_pages_from_mem(bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    guard_parser(|| extract_pages(bytes))
}

/// Run a parser call, turning a panic into `ExtractError::Panicked`
fn guard_parser<T>(parse: impl FnOnce() -> Result<T, ExtractError>) -> Result<T, ExtractError> {
    match panic::catch_unwind(AssertUnwindSafe(parse)) {
        Ok(result) => result,
        Err(_) => Err(ExtractError::Panicked),
    }
}

fn extract_pages(bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    let document = Document::load_mem(bytes)?;

    if document.is_encrypted() {
        return Err(ExtractError::Encrypted);
    }

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    debug!("Extracting text from {} pages", page_numbers.len());

    Ok(collect_pages(page_numbers, |number| document.extract_text(&[number])))
}

/// Decode each page in turn; pages that fail are logged and left out
fn collect_pages<E: fmt::Display>(
    page_numbers: Vec<u32>,
    mut page_text: impl FnMut(u32) -> Result<String, E>,
) -> Vec<PageText> {
    let mut pages = Vec::with_capacity(page_numbers.len());
    for number in page_numbers {
        match page_text(number) {
            Ok(text) => pages.push(PageText {
                number,
                blocks: split_blocks(&text),
            }),
            Err(e) => warn!("Skipping page {}: {}", number, e),
        }
    }
    pages
}

/// Split extracted page text into blocks.
///
/// The extractor ends every text object (`BT` .. `ET`) with a line break,
/// so each non-blank line is one text region of the page.
pub fn split_blocks(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_not_blocks() {
        let blocks = split_blocks("first\n\n   \n second \nthird\n");
        assert_eq!(blocks, vec!["first", "second", "third"]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(extract_pages_from_mem(b"definitely not a pdf").is_err());
    }

    #[test]
    fn parser_panic_becomes_panicked() {
        let result: Result<Vec<PageText>, _> = guard_parser(|| panic!("bad font program"));
        assert!(matches!(result, Err(ExtractError::Panicked)));
    }

    #[test]
    fn parser_errors_pass_through() {
        let result: Result<(), _> = guard_parser(|| Err(ExtractError::Encrypted));
        assert!(matches!(result, Err(ExtractError::Encrypted)));
    }

    #[test]
    fn undecodable_page_is_skipped() {
        let pages = collect_pages(vec![1, 2, 3], |number| match number {
            2 => Err("unknown font encoding"),
            n => Ok(format!("page {} text\n", n)),
        });

        let numbers: Vec<u32> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(pages[1].blocks, vec!["page 3 text"]);
    }
}
