use egui::{Color32, Context, Rounding, Stroke, Visuals};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Theme {
    Light,
    Dark,
}

/// Colors that set the app apart from egui's stock look
struct Palette {
    panel: Color32,
    window: Color32,
    /// Result links and the selection highlight
    accent: Color32,
    /// "Could not be read" notices
    warning: Color32,
}

const DARK: Palette = Palette {
    panel: Color32::from_rgb(24, 26, 31),
    window: Color32::from_rgb(31, 33, 40),
    accent: Color32::from_rgb(86, 168, 245),
    warning: Color32::from_rgb(230, 180, 80),
};

const LIGHT: Palette = Palette {
    panel: Color32::from_rgb(246, 246, 248),
    window: Color32::from_rgb(252, 252, 253),
    accent: Color32::from_rgb(20, 100, 190),
    warning: Color32::from_rgb(170, 100, 0),
};

impl Theme {
    fn palette(self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }

    /// egui visuals for this theme
    pub fn visuals(self) -> Visuals {
        let palette = self.palette();
        let mut visuals = match self {
            Theme::Light => Visuals::light(),
            Theme::Dark => Visuals::dark(),
        };

        visuals.panel_fill = palette.panel;
        visuals.window_fill = palette.window;
        visuals.hyperlink_color = palette.accent;
        visuals.warn_fg_color = palette.warning;

        visuals.selection.bg_fill = palette.accent.gamma_multiply(0.35);
        visuals.selection.stroke = Stroke::new(1.0, palette.accent);

        visuals.window_rounding = Rounding::same(4.0);
        visuals.menu_rounding = Rounding::same(4.0);
        visuals
    }
}

pub fn apply_theme(ctx: &Context, theme: Theme) {
    ctx.set_visuals(theme.visuals());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themes_keep_their_mode() {
        assert!(Theme::Dark.visuals().dark_mode);
        assert!(!Theme::Light.visuals().dark_mode);
    }

    #[test]
    fn links_use_the_accent() {
        for theme in [Theme::Light, Theme::Dark] {
            let visuals = theme.visuals();
            assert_eq!(visuals.hyperlink_color, theme.palette().accent);
            assert_eq!(visuals.selection.stroke.color, theme.palette().accent);
        }
    }
}
