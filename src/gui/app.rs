use eframe::{egui, CreationContext};
use egui::{Context, Ui, ViewportCommand};
use egui_modal::Modal;

use super::search_panel::SearchPanel;
use super::theme::{apply_theme, Theme};

/// The main application state
pub struct PdfFinderApp {
    search_panel: SearchPanel,
    theme: Theme,
}

impl PdfFinderApp {
    pub fn new(cc: &CreationContext) -> Self {
        let theme = Theme::Dark;
        apply_theme(&cc.egui_ctx, theme);

        Self {
            search_panel: SearchPanel::new(),
            theme,
        }
    }

    /// Draw the top menu bar
    fn menu_bar(&mut self, ui: &mut Ui, ctx: &Context) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                let searching = self.search_panel.is_searching();
                if ui.add_enabled(!searching, egui::Button::new("Choose Directory...")).clicked() {
                    self.search_panel.pick_directory();
                    ui.close_menu();
                }

                ui.separator();
                if ui.button("Exit").clicked() {
                    ctx.send_viewport_cmd(ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.radio_value(&mut self.theme, Theme::Light, "Light Theme").clicked() {
                    apply_theme(ctx, self.theme);
                    ui.close_menu();
                }
                if ui.radio_value(&mut self.theme, Theme::Dark, "Dark Theme").clicked() {
                    apply_theme(ctx, self.theme);
                    ui.close_menu();
                }
            });
        });
    }
}

impl eframe::App for PdfFinderApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // Validation notices; the modal has to be registered every frame
        let mut dialog = Modal::new(ctx, "pdf_finder_dialog");
        dialog.show_dialog();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.menu_bar(ui, ctx);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("PDF Finder");
            ui.separator();
            self.search_panel.show(ui, ctx, &dialog);
        });
    }
}
