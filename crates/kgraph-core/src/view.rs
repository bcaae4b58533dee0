use crate::Vec2;
use serde::{Deserialize, Serialize};

/// Inclusive zoom range a view is allowed to reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f32,
    pub max: f32,
}

impl ZoomBounds {
    /// Bounds used by the schema editor canvas.
    pub const EDITOR: ZoomBounds = ZoomBounds { min: 0.5, max: 2.0 };
    /// Bounds used by the force-directed explorer.
    pub const EXPLORER: ZoomBounds = ZoomBounds { min: 0.1, max: 5.0 };

    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min, self.max)
    }

    pub fn contains(&self, zoom: f32) -> bool {
        zoom >= self.min && zoom <= self.max
    }
}

/// Pan/zoom applied to world coordinates to obtain screen coordinates.
///
/// Screen coordinates here are relative to the canvas origin (pointer client
/// position minus the canvas rect's top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        pan: Vec2::ZERO,
        zoom: 1.0,
    };

    pub fn new(pan: Vec2, zoom: f32) -> Self {
        Self { pan, zoom }
    }

    /// `world = (screen - pan) / zoom`. Every subsystem converts through here.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.zoom
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.zoom + self.pan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_conversion() {
        let view = ViewTransform::default();
        let p = Vec2::new(12.0, -4.0);
        assert_eq!(view.screen_to_world(p), p);
        assert_eq!(view.world_to_screen(p), p);
    }

    #[test]
    fn test_screen_to_world_formula() {
        let view = ViewTransform::new(Vec2::new(100.0, 50.0), 2.0);
        assert_eq!(view.screen_to_world(Vec2::new(300.0, 250.0)), Vec2::new(100.0, 100.0));
        assert_eq!(view.world_to_screen(Vec2::new(100.0, 100.0)), Vec2::new(300.0, 250.0));
    }

    #[test]
    fn test_zoom_bounds() {
        assert_eq!(ZoomBounds::EDITOR.clamp(3.0), 2.0);
        assert_eq!(ZoomBounds::EDITOR.clamp(0.1), 0.5);
        assert_eq!(ZoomBounds::EXPLORER.clamp(0.1), 0.1);
        assert!(ZoomBounds::EXPLORER.contains(4.9));
    }
}
