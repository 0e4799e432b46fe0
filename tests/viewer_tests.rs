// Tests for building external viewer command lines

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use pdf_finder::viewer::{first_command_token, parse_desktop_exec, viewer_arguments};

fn args(viewer: &str, page: Option<u32>) -> Vec<OsString> {
    viewer_arguments(Path::new(viewer), Path::new("/docs/report.pdf"), page)
}

fn os(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}

#[test]
fn test_page_arguments_for_known_viewers() {
    assert_eq!(args("/usr/bin/evince", Some(3)), os(&["-i", "3", "/docs/report.pdf"]));
    assert_eq!(args("/usr/bin/okular", Some(3)), os(&["-p", "3", "/docs/report.pdf"]));
    assert_eq!(args("/usr/bin/zathura", Some(3)), os(&["-P", "3", "/docs/report.pdf"]));
    assert_eq!(args("SumatraPDF.exe", Some(7)), os(&["-page", "7", "/docs/report.pdf"]));
    assert_eq!(args("AcroRd32.exe", Some(2)), os(&["/A", "page=2", "/docs/report.pdf"]));
    assert_eq!(args("/usr/bin/qpdfview", Some(5)), os(&["--unique", "/docs/report.pdf#5"]));
    assert_eq!(args("/usr/bin/mupdf", Some(5)), os(&["/docs/report.pdf", "5"]));
}

#[test]
fn test_unknown_viewer_or_no_page_gets_only_the_path() {
    assert_eq!(args("/usr/bin/firefox", Some(3)), os(&["/docs/report.pdf"]));
    assert_eq!(args("/usr/bin/evince", None), os(&["/docs/report.pdf"]));
    assert_eq!(args("/usr/bin/evince", Some(0)), os(&["/docs/report.pdf"]));
}

#[test]
fn test_parse_desktop_exec() {
    let desktop = "\
[Desktop Entry]
Name=Document Viewer
Exec=evince %U
Type=Application
";
    assert_eq!(parse_desktop_exec(desktop), Some(PathBuf::from("evince")));
    assert_eq!(parse_desktop_exec("[Desktop Entry]\nName=Nothing\n"), None);
}

#[test]
fn test_first_command_token_handles_quotes() {
    assert_eq!(
        first_command_token(r#""C:\Program Files\Adobe\Acrobat.exe" "%1""#),
        Some(r"C:\Program Files\Adobe\Acrobat.exe".to_string())
    );
    assert_eq!(first_command_token("okular %U"), Some("okular".to_string()));
    assert_eq!(first_command_token("   "), None);
}
