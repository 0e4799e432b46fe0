use regex::{Regex, RegexBuilder};

use crate::extract::PageText;
use crate::request::{MatchResult, MatchSource, SearchOptions};

/// Compiled form of the user's search term
#[derive(Debug, Clone)]
pub struct TermMatcher {
    regex: Regex,
}

impl TermMatcher {
    /// Build a matcher for `term`.
    ///
    /// The term is always taken literally. Whole-word mode requires that the
    /// characters on either side of a hit are not word characters, which also
    /// works for terms like `C++` where `\b` would not.
    pub fn new(term: &str, options: &SearchOptions) -> Result<Self, regex::Error> {
        let escaped = regex::escape(term);

        let pattern = if options.whole_word {
            format!(r"(?:^|\W){}(?:\W|$)", escaped)
        } else {
            escaped
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.match_case)
            .build()?;

        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Apply the matcher to every block of every page.
    ///
    /// Returns one result per matching block, so a page with two matching
    /// blocks is reported twice.
    pub fn match_pages(&self, source: &MatchSource, pages: &[PageText]) -> Vec<MatchResult> {
        let mut results = Vec::new();

        for page in pages {
            for block in &page.blocks {
                if self.is_match(block) {
                    results.push(MatchResult::new(source.clone(), page.number, block));
                }
            }
        }

        results
    }
}
