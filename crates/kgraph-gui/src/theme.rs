//! Theme and canvas palette, powered by catppuccin-egui.

use eframe::egui::{self, Color32};
use kgraph_canvas::Color;

use crate::settings::ThemeMode;

/// Spacing constants
pub mod spacing {
    pub const PANEL_PADDING: f32 = 12.0;
    pub const ITEM_SPACING: f32 = 8.0;
    pub const BUTTON_PADDING: f32 = 8.0;
}

/// Colors the canvases draw with that follow the active flavor.
#[derive(Debug, Clone, Copy)]
pub struct CanvasPalette {
    pub background: Color32,
    pub grid: Color32,
    pub text: Color32,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub flavor: catppuccin_egui::Theme,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl Theme {
    pub fn new(mode: ThemeMode) -> Self {
        let flavor = match mode {
            ThemeMode::Latte => catppuccin_egui::LATTE,
            ThemeMode::Frappe => catppuccin_egui::FRAPPE,
            ThemeMode::Macchiato => catppuccin_egui::MACCHIATO,
            ThemeMode::Mocha => catppuccin_egui::MOCHA,
        };
        Self { flavor }
    }

    /// Apply theme to egui context
    pub fn apply(&self, ctx: &egui::Context) {
        catppuccin_egui::set_theme(ctx, self.flavor);

        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        ctx.set_fonts(fonts);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = egui::vec2(spacing::ITEM_SPACING, spacing::ITEM_SPACING);
        style.spacing.button_padding =
            egui::vec2(spacing::BUTTON_PADDING, spacing::BUTTON_PADDING / 2.0);
        style.spacing.window_margin = egui::Margin::same(spacing::PANEL_PADDING as i8);
        ctx.set_style(style);
    }

    pub fn canvas_palette(&self) -> CanvasPalette {
        CanvasPalette {
            background: self.flavor.base,
            grid: self.flavor.surface0,
            text: self.flavor.text,
        }
    }
}

pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}
