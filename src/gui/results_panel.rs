use egui::{RichText, Ui};

use pdf_finder::{MatchResult, MatchSource};

use super::utils::{match_count_label, truncate_start};

/// A click on a result label
pub struct OpenRequest {
    pub source: MatchSource,
    pub page: Option<u32>,
}

/// Matches for one searched document
struct FileResults {
    source: MatchSource,
    matches: Vec<MatchResult>,
}

/// Results pane, filled as events arrive from the worker
#[derive(Default)]
pub struct ResultsPanel {
    files: Vec<FileResults>,
    failures: Vec<String>,
    status: Option<String>,
}

impl ResultsPanel {
    pub fn clear(&mut self) {
        self.files.clear();
        self.failures.clear();
        self.status = None;
    }

    pub fn add_file(&mut self, source: MatchSource, matches: Vec<MatchResult>) {
        if !matches.is_empty() {
            self.files.push(FileResults { source, matches });
        }
    }

    pub fn add_failure(&mut self, message: String) {
        self.failures.push(message);
    }

    pub fn set_status(&mut self, status: String) {
        self.status = Some(status);
    }

    /// Draw the pane. Returns the label the user clicked, if any.
    pub fn show(&self, ui: &mut Ui) -> Option<OpenRequest> {
        let mut clicked = None;

        if let Some(status) = &self.status {
            ui.label(RichText::new(status).strong());
        }

        // Limit number of files displayed to keep the UI responsive
        let max_files_to_show = 200;

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                if self.files.len() > max_files_to_show {
                    ui.label(format!("Showing first {} of {} files", max_files_to_show, self.files.len()));
                    ui.separator();
                }

                for file in self.files.iter().take(max_files_to_show) {
                    ui.horizontal(|ui| {
                        let header = ui
                            .link(RichText::new(file.source.display_name()).strong())
                            .on_hover_text(file.source.to_string());
                        if header.clicked() {
                            clicked = Some(OpenRequest {
                                source: file.source.clone(),
                                page: None,
                            });
                        }
                        ui.label(format!("({})", match_count_label(file.matches.len())));
                    });

                    ui.indent(file.source.to_string(), |ui| {
                        for m in &file.matches {
                            ui.horizontal(|ui| {
                                if ui.link(m.label.as_str()).clicked() {
                                    clicked = Some(OpenRequest {
                                        source: m.source.clone(),
                                        page: Some(m.page),
                                    });
                                }
                                ui.label(RichText::new(&m.snippet).weak());
                            });
                        }
                    });

                    ui.add_space(4.0);
                }

                if !self.failures.is_empty() {
                    ui.separator();
                    let warning = ui.visuals().warn_fg_color;
                    ui.label(RichText::new(format!("{} file(s) could not be read", self.failures.len())).color(warning));
                    for failure in &self.failures {
                        ui.label(RichText::new(truncate_start(failure, 160)).small().weak());
                    }
                }
            });

        clicked
    }
}
