//! Opening results in the system's PDF viewer.
//!
//! The default handler for PDF files is looked up so that a page argument
//! can be passed in the form that viewer understands. If that fails for any
//! reason the file is handed to the generic OS "open" action instead, which
//! opens it on the first page.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use thiserror::Error;

use crate::archive::{self, ArchiveError};
use crate::request::MatchSource;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Failed to launch viewer: {0}")]
    Launch(#[from] io::Error),
    #[error("Failed to open with the system handler: {0}")]
    Open(#[from] opener::OpenError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Open a search result at `page` (1-based)
pub fn open_source(source: &MatchSource, page: Option<u32>) -> Result<(), ViewerError> {
    match source {
        MatchSource::File(path) => open_at_page(path, page),
        MatchSource::ArchiveMember { archive, member } => {
            let extracted = archive::extract_member(archive, member, &extraction_dir(archive))?;
            open_at_page(&extracted, page)
        }
    }
}

/// Open a PDF file, jumping to `page` when the viewer supports it
pub fn open_at_page(path: &Path, page: Option<u32>) -> Result<(), ViewerError> {
    if let Some(viewer) = default_pdf_viewer() {
        let args = viewer_arguments(&viewer, path, page);
        debug!("Launching {} {:?}", viewer.display(), args);

        match Command::new(&viewer).args(&args).spawn() {
            Ok(child) => {
                reap(child);
                return Ok(());
            }
            Err(e) => warn!("Failed to launch {}: {}; falling back to system open", viewer.display(), e),
        }
    }

    info!("Opening {} with the system handler", path.display());
    opener::open(path)?;
    Ok(())
}

/// Wait for a launched viewer in the background so it never lingers as a zombie
fn reap(mut child: Child) -> Option<JoinHandle<()>> {
    let spawned = thread::Builder::new()
        .name("viewer-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => debug!("Viewer exited with {}", status),
            Err(e) => warn!("Failed to wait for viewer: {}", e),
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to start viewer reaper thread: {}", e);
            None
        }
    }
}

/// Where archive members are unpacked before being opened
fn extraction_dir(archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    std::env::temp_dir().join("pdf-finder").join(stem)
}

/// Build the argument list for a known viewer.
///
/// Viewers that aren't recognised just get the path.
pub fn viewer_arguments(viewer: &Path, path: &Path, page: Option<u32>) -> Vec<OsString> {
    let name = viewer
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_lowercase();
    let file = path.as_os_str().to_owned();

    let page = match page {
        Some(page) if page > 0 => page,
        _ => return vec![file],
    };

    match name.as_str() {
        "acrord32" | "acrobat" | "foxitreader" | "foxitpdfreader" | "foxitpdfeditor" => {
            with_flags(&["/A", format!("page={}", page).as_str()], file)
        }
        "sumatrapdf" => with_flags(&["-page", page.to_string().as_str()], file),
        "evince" | "atril" | "xreader" => with_flags(&["-i", page.to_string().as_str()], file),
        "okular" => with_flags(&["-p", page.to_string().as_str()], file),
        "zathura" => with_flags(&["-P", page.to_string().as_str()], file),
        "qpdfview" => {
            let mut target = file;
            target.push(format!("#{}", page));
            vec![OsString::from("--unique"), target]
        }
        "mupdf" | "mupdf-gl" | "mupdf-x11" => vec![file, OsString::from(page.to_string())],
        _ => vec![file],
    }
}

fn with_flags(flags: &[&str], file: OsString) -> Vec<OsString> {
    let mut args: Vec<OsString> = flags.iter().map(|flag| OsString::from(*flag)).collect();
    args.push(file);
    args
}

/// Path of the program registered for PDF files, if it can be found
pub fn default_pdf_viewer() -> Option<PathBuf> {
    let viewer = platform_default_viewer();
    if viewer.is_none() {
        debug!("No default PDF viewer found");
    }
    viewer
}

#[cfg(target_os = "linux")]
fn platform_default_viewer() -> Option<PathBuf> {
    let output = Command::new("xdg-mime")
        .args(["query", "default", "application/pdf"])
        .output()
        .ok()?;
    let desktop_file = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if desktop_file.is_empty() {
        return None;
    }

    let mut application_dirs: Vec<PathBuf> = Vec::new();
    if let Some(data_dir) = dirs::data_dir() {
        application_dirs.push(data_dir.join("applications"));
    }
    application_dirs.push(PathBuf::from("/usr/local/share/applications"));
    application_dirs.push(PathBuf::from("/usr/share/applications"));

    application_dirs
        .iter()
        .filter_map(|dir| std::fs::read_to_string(dir.join(&desktop_file)).ok())
        .find_map(|contents| parse_desktop_exec(&contents))
}

#[cfg(target_os = "windows")]
fn platform_default_viewer() -> Option<PathBuf> {
    // ".pdf=AcroExch.Document.DC"
    let assoc = Command::new("cmd").args(["/C", "assoc", ".pdf"]).output().ok()?;
    let assoc = String::from_utf8_lossy(&assoc.stdout);
    let file_type = assoc.trim().split_once('=')?.1.trim().to_string();

    // "AcroExch.Document.DC="C:\...\Acrobat.exe" "%1""
    let ftype = Command::new("cmd").args(["/C", "ftype", &file_type]).output().ok()?;
    let ftype = String::from_utf8_lossy(&ftype.stdout);
    let command = ftype.trim().split_once('=')?.1;
    first_command_token(command).map(PathBuf::from)
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn platform_default_viewer() -> Option<PathBuf> {
    None
}

/// Program from the `Exec=` line of a `.desktop` entry
pub fn parse_desktop_exec(contents: &str) -> Option<PathBuf> {
    contents
        .lines()
        .skip_while(|line| line.trim() != "[Desktop Entry]")
        .find_map(|line| line.trim().strip_prefix("Exec="))
        .and_then(first_command_token)
        .map(PathBuf::from)
}

/// First token of a command line, honouring double quotes
pub fn first_command_token(command: &str) -> Option<String> {
    let command = command.trim_start();
    let token = if let Some(rest) = command.strip_prefix('"') {
        rest.split('"').next()?
    } else {
        command.split_whitespace().next()?
    };

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
