//! The editor's view transform: wheel handling, zoom buttons, fit and reset.

use kgraph_core::{EditorNode, Rect, Vec2, ViewTransform, ZoomBounds};
use serde::{Deserialize, Serialize};

/// Zoom change per unit of wheel delta while the zoom modifier is held.
pub const WHEEL_ZOOM_SENSITIVITY: f32 = 0.001;
/// Zoom change per toolbar zoom button press.
pub const ZOOM_STEP: f32 = 0.1;
/// World-space padding kept around the content by "fit to content".
pub const FIT_PADDING: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanZoomController {
    pub bounds: ZoomBounds,
    pub zoom_step: f32,
    pub wheel_sensitivity: f32,
    pub fit_padding: f32,
}

impl Default for PanZoomController {
    fn default() -> Self {
        Self::editor()
    }
}

impl PanZoomController {
    pub fn editor() -> Self {
        Self {
            bounds: ZoomBounds::EDITOR,
            zoom_step: ZOOM_STEP,
            wheel_sensitivity: WHEEL_ZOOM_SENSITIVITY,
            fit_padding: FIT_PADDING,
        }
    }

    /// Apply a wheel event.
    ///
    /// With the zoom modifier held the vertical delta zooms (pan untouched);
    /// otherwise both deltas scroll the canvas.
    pub fn apply_wheel(
        &self,
        view: ViewTransform,
        delta: Vec2,
        zoom_modifier: bool,
    ) -> ViewTransform {
        if zoom_modifier {
            ViewTransform {
                pan: view.pan,
                zoom: self.bounds.clamp(view.zoom - delta.y * self.wheel_sensitivity),
            }
        } else {
            ViewTransform {
                pan: view.pan - delta,
                zoom: view.zoom,
            }
        }
    }

    pub fn zoom_in(&self, view: ViewTransform) -> ViewTransform {
        ViewTransform {
            pan: view.pan,
            zoom: self.bounds.clamp(view.zoom + self.zoom_step),
        }
    }

    pub fn zoom_out(&self, view: ViewTransform) -> ViewTransform {
        ViewTransform {
            pan: view.pan,
            zoom: self.bounds.clamp(view.zoom - self.zoom_step),
        }
    }

    pub fn reset(&self) -> ViewTransform {
        ViewTransform::IDENTITY
    }

    /// Bounding box of all node cards, or `None` for an empty canvas.
    pub fn content_bounds(nodes: &[EditorNode]) -> Option<Rect> {
        nodes
            .iter()
            .map(EditorNode::rect)
            .reduce(|acc, rect| acc.union(&rect))
    }

    /// Pan/zoom that shows every node with padding, centred in the viewport.
    ///
    /// Returns `None` when there are no nodes or the viewport is degenerate.
    pub fn fit_to_content(&self, nodes: &[EditorNode], viewport: Vec2) -> Option<ViewTransform> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let padded = Self::content_bounds(nodes)?.expand(self.fit_padding);
        let zoom = self.bounds.clamp(
            (viewport.x / padded.width()).min(viewport.y / padded.height()),
        );
        let pan = viewport * 0.5 - padded.center() * zoom;
        Some(ViewTransform { pan, zoom })
    }
}
