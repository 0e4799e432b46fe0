mod app;
mod results_panel;
mod search_panel;
mod theme;
mod utils;

pub use app::PdfFinderApp;
