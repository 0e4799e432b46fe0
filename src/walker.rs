use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

/// Finds candidate files below a root directory
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    recursive: bool,
    include_archives: bool,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, recursive: bool, include_archives: bool) -> Self {
        Self {
            root: root.into(),
            recursive,
            include_archives,
        }
    }

    /// PDF files, lazily
    pub fn pdf_files(&self) -> impl Iterator<Item = PathBuf> {
        self.files_with_extension("pdf")
    }

    /// ZIP files, lazily. Empty when archives are not searched.
    pub fn archive_files(&self) -> Box<dyn Iterator<Item = PathBuf>> {
        if self.include_archives {
            Box::new(self.files_with_extension("zip"))
        } else {
            Box::new(std::iter::empty())
        }
    }

    fn files_with_extension(&self, wanted: &'static str) -> impl Iterator<Item = PathBuf> {
        let mut walk = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        if !self.recursive {
            walk = walk.max_depth(1);
        }

        walk.into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(move |path| has_extension(path, wanted))
    }
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}
