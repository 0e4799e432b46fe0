use egui::{Button, Color32, Ui};

/// Keeps the end of a long string, which for paths is the interesting part
pub fn truncate_start(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - max_chars.saturating_sub(3)).collect();
        format!("...{}", tail)
    }
}

/// "1 match", "3 matches"
pub fn match_count_label(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "match" } else { "matches" })
}

/// Sets up styling for the search button
pub fn setup_search_button_style<'a>(_ui: &mut Ui, button: Button<'a>) -> Button<'a> {
    button
        .fill(Color32::from_rgb(60, 120, 180))
        .stroke((1.0, Color32::from_rgb(40, 80, 120)))
        .min_size(egui::vec2(120.0, 28.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_tail() {
        assert_eq!(truncate_start("short", 10), "short");
        assert_eq!(truncate_start("/very/long/path/file.pdf", 10), "...ile.pdf");
        assert_eq!(match_count_label(1), "1 match");
        assert_eq!(match_count_label(2), "2 matches");
    }
}
