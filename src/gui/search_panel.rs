use std::path::PathBuf;

use egui::{Context, Key, RichText, TextEdit, Ui};
use egui_modal::{Icon, Modal};
use log::error;

use pdf_finder::{
    spawn_search, viewer, ProgressState, SearchEvent, SearchHandle, SearchOptions, SearchRequest,
};

use super::results_panel::{OpenRequest, ResultsPanel};
use super::utils::setup_search_button_style;

/// Search form, progress and results
pub struct SearchPanel {
    directory: String,
    search_query: String,
    options: SearchOptions,
    search: Option<SearchHandle>,
    progress: ProgressState,
    results: ResultsPanel,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self {
            directory: String::new(),
            search_query: String::new(),
            options: SearchOptions::default(),
            search: None,
            progress: ProgressState::default(),
            results: ResultsPanel::default(),
        }
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    /// Ask for a directory, starting from the current one or the home directory
    pub fn pick_directory(&mut self) {
        let start = if self.directory.is_empty() {
            dirs::home_dir()
        } else {
            Some(PathBuf::from(&self.directory))
        };

        let mut dialog = rfd::FileDialog::new();
        if let Some(start) = start {
            dialog = dialog.set_directory(start);
        }

        if let Some(path) = dialog.pick_folder() {
            self.directory = path.to_string_lossy().to_string();
        }
    }

    pub fn show(&mut self, ui: &mut Ui, ctx: &Context, dialog: &Modal) {
        self.poll_events();

        let searching = self.is_searching();

        ui.add_enabled_ui(!searching, |ui| {
            ui.horizontal(|ui| {
                ui.label("Directory:");
                ui.add(TextEdit::singleline(&mut self.directory)
                    .hint_text("Folder with PDF files...")
                    .desired_width(ui.available_width() - 90.0));
                if ui.button("📁 Browse...").clicked() {
                    self.pick_directory();
                }
            });

            ui.horizontal(|ui| {
                ui.label("Search for:");
                let response = ui.add(TextEdit::singleline(&mut self.search_query)
                    .hint_text("Enter search text...")
                    .desired_width(ui.available_width()));

                if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                    self.start_search(ctx, dialog);
                }
            });

            ui.horizontal(|ui| {
                ui.checkbox(&mut self.options.match_case, "Match case");
                ui.checkbox(&mut self.options.whole_word, "Whole word");
                ui.checkbox(&mut self.options.include_subdirectories, "Include subdirectories");
                ui.checkbox(&mut self.options.include_archives, "Search in ZIP archives");
            });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            let label = if searching { "Searching..." } else { "🔍 Search" };
            let button = setup_search_button_style(ui, egui::Button::new(label));
            if ui.add_enabled(!searching, button).clicked() {
                self.start_search(ctx, dialog);
            }

            if ui.add_enabled(searching, egui::Button::new("⏹ Stop")).clicked() {
                if let Some(search) = &self.search {
                    search.cancel();
                }
            }

            ui.add(egui::ProgressBar::new(self.progress.fraction())
                .text(format!("{}/{}", self.progress.processed, self.progress.total))
                .desired_width(ui.available_width()));
        });

        ui.separator();

        if let Some(request) = self.results.show(ui) {
            open_in_viewer(request);
        }

        if self.search.is_none() && self.progress.total == 0 && self.search_query.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(RichText::new("Choose a directory, enter a search term and press Enter").italics());
            });
        }
    }

    /// Validate the form and hand the request to a worker thread
    fn start_search(&mut self, ctx: &Context, dialog: &Modal) {
        if self.is_searching() {
            return;
        }

        let request = SearchRequest::new(self.directory.trim(), self.search_query.clone(), self.options);

        // Repaint when the worker has something new for us
        let repaint_ctx = ctx.clone();
        match spawn_search(request, move || repaint_ctx.request_repaint()) {
            Ok(handle) => {
                self.results.clear();
                self.progress = ProgressState::default();
                self.search = Some(handle);
            }
            Err(e) => {
                dialog.open_dialog(Some("Cannot search"), Some(e.to_string()), Some(Icon::Warning));
            }
        }
    }

    /// Drain worker events into the panel state
    fn poll_events(&mut self) {
        // Checked before draining so that no event can slip in between
        let (events, worker_gone): (Vec<SearchEvent>, bool) = match &self.search {
            Some(search) => {
                let worker_gone = search.is_finished();
                (search.try_events().collect(), worker_gone)
            }
            None => return,
        };

        let mut finished = false;
        for event in events {
            match event {
                SearchEvent::Started { total } => {
                    self.progress = ProgressState::new(total);
                }
                SearchEvent::FileSearched { source, matches } => {
                    self.results.add_file(source, matches);
                }
                SearchEvent::FileFailed { source, reason } => {
                    self.results.add_failure(format!("{}: {}", source, reason));
                }
                SearchEvent::ArchiveFailed { archive, error } => {
                    self.results.add_failure(format!("{}: {}", archive.display(), error));
                }
                SearchEvent::Progress(progress) => {
                    self.progress = progress;
                }
                SearchEvent::Finished(summary) => {
                    self.progress = summary.progress;
                    self.results.set_status(summary.outcome.to_string());
                    finished = true;
                }
            }
        }

        if !finished && worker_gone {
            error!("Search worker stopped without finishing");
            self.results.set_status("Search stopped unexpectedly; see the log for details".to_string());
            finished = true;
        }

        if finished {
            if let Some(search) = self.search.take() {
                search.join();
            }
        }
    }
}

/// Launch the external viewer off the UI thread
fn open_in_viewer(request: OpenRequest) {
    std::thread::spawn(move || {
        if let Err(e) = viewer::open_source(&request.source, request.page) {
            error!("Error opening {}: {}", request.source, e);
        }
    });
}
