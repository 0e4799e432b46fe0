use eframe::{NativeOptions, run_native};
use egui::ViewportBuilder;

mod gui;

fn main() -> Result<(), eframe::Error> {
    // Initialize logging
    env_logger::init();

    let options = NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([560.0, 420.0])
            .with_title("PDF Finder"),
        ..Default::default()
    };

    run_native(
        "PDF Finder",
        options,
        Box::new(|cc| Box::new(crate::gui::PdfFinderApp::new(cc)))
    )
}
