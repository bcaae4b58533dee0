//! Colors for the editor cards, edges and the explorer's nodes.
//!
//! Kept free of any UI toolkit so renderers and tests can share one palette.

use kgraph_core::NodeType;
use serde::{Deserialize, Serialize};

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_tuple(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }
}

/// Fill/border/text triple for a node card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeColors {
    pub fill: Color,
    pub border: Color,
    pub text: Color,
}

// Editor cards
pub const COLOR_TECHNICAL_FILL: Color = Color::rgb(80, 130, 180);
pub const COLOR_TECHNICAL_BORDER: Color = Color::rgb(60, 110, 160);
pub const COLOR_BUSINESS_FILL: Color = Color::rgb(80, 140, 100);
pub const COLOR_BUSINESS_BORDER: Color = Color::rgb(60, 120, 80);
pub const COLOR_CARD_TEXT: Color = Color::rgb(255, 255, 255);

// Focus/selection
pub const COLOR_FOCUS_BORDER: Color = Color::rgb(255, 200, 100);
pub const COLOR_HANDLE: Color = Color::rgb(230, 230, 230);

// Edges
pub const COLOR_EDGE: Color = Color::rgb(140, 140, 140);
pub const COLOR_EDGE_SELECTED: Color = Color::rgb(255, 200, 100);
pub const COLOR_EDGE_PENDING: Color = Color::rgba(200, 160, 80, 180);

// Explorer
pub const COLOR_EXPLORER_BACKGROUND: Color = Color::rgb(24, 24, 32);
pub const COLOR_EXPLORER_EDGE: Color = Color::rgba(180, 180, 200, 90);
pub const COLOR_EXPLORER_TEXT: Color = Color::rgb(235, 235, 235);
pub const COLOR_UNLABELED: Color = Color::rgb(100, 100, 100);

/// Fill colors handed out to explorer labels.
pub const LABEL_PALETTE: [Color; 8] = [
    Color::rgb(200, 160, 80),
    Color::rgb(80, 130, 180),
    Color::rgb(80, 140, 100),
    Color::rgb(130, 100, 160),
    Color::rgb(200, 120, 80),
    Color::rgb(80, 150, 150),
    Color::rgb(180, 100, 140),
    Color::rgb(150, 150, 90),
];

pub fn node_colors(node_type: NodeType, selected: bool) -> NodeColors {
    let (fill, border) = match node_type {
        NodeType::Technical => (COLOR_TECHNICAL_FILL, COLOR_TECHNICAL_BORDER),
        NodeType::Business => (COLOR_BUSINESS_FILL, COLOR_BUSINESS_BORDER),
    };
    NodeColors {
        fill,
        border: if selected { COLOR_FOCUS_BORDER } else { border },
        text: COLOR_CARD_TEXT,
    }
}

/// Stable color for an explorer node, keyed by its primary label.
pub fn label_color(primary_label: Option<&str>) -> Color {
    let Some(label) = primary_label else {
        return COLOR_UNLABELED;
    };
    // FNV-1a; stable across runs and platforms.
    let hash = label
        .bytes()
        .fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    LABEL_PALETTE[hash as usize % LABEL_PALETTE.len()]
}

/// Inner and outer stops of the explorer's radial node gradient.
pub fn gradient_stops(base: Color) -> (Color, Color) {
    (base.lighten(0.35), base.darken(0.25))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lighten_darken() {
        let c = Color::rgb(100, 100, 100);
        assert_eq!(c.darken(0.5), Color::rgb(50, 50, 50));
        assert_eq!(Color::rgb(0, 0, 0).lighten(1.0), Color::rgb(255, 255, 255));
        assert_eq!(c.with_alpha(10).to_tuple(), (100, 100, 100, 10));
    }

    #[test]
    fn test_label_color_is_stable() {
        assert_eq!(label_color(Some("Person")), label_color(Some("Person")));
        assert_eq!(label_color(None), COLOR_UNLABELED);
        assert!(LABEL_PALETTE.contains(&label_color(Some("Movie"))));
    }

    #[test]
    fn test_selected_card_border() {
        let colors = node_colors(NodeType::Business, true);
        assert_eq!(colors.fill, COLOR_BUSINESS_FILL);
        assert_eq!(colors.border, COLOR_FOCUS_BORDER);
    }
}
