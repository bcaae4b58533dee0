//! Pure geometry shared by the editor canvas and the explorer.
//!
//! Nothing in here holds state: bezier evaluation, the edge curve recipe
//! (default, user-controlled and self-loop variants) and the screen/world
//! conversion helpers.

use kgraph_core::{NODE_HEIGHT, NODE_WIDTH, Vec2, ViewTransform};
use std::fmt::Write;

/// How far (0..1) the inner control points travel from each anchor toward a
/// user-dragged control point.
pub const CONTROL_PULL: f32 = 0.7;
/// Minimum horizontal reach of default control points.
pub const MIN_CURVE_REACH: f32 = 80.0;
/// Lateral spacing between parallel edges sharing a source/target pair.
pub const PARALLEL_SPACING: f32 = 30.0;
/// Height of the innermost self-loop above its anchors.
pub const SELF_LOOP_BASE_HEIGHT: f32 = 80.0;
/// Extra height per additional self-loop on the same node.
pub const SELF_LOOP_STEP: f32 = 25.0;
/// Horizontal reach of self-loop control points beyond the node's sides.
pub const SELF_LOOP_REACH: f32 = 60.0;

/// A cubic bezier curve segment defined by four control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    /// Sample the curve at parameter t [0, 1]
    pub fn sample(&self, t: f32) -> Vec2 {
        bezier_point(t, self.start, self.control1, self.control2, self.end)
    }

    pub fn midpoint(&self) -> Vec2 {
        self.sample(0.5)
    }

    /// Compute the minimum distance from a point to this bezier curve.
    ///
    /// Uses uniform sampling along the curve; `num_samples` trades accuracy for
    /// speed (20-50 is plenty for hit testing).
    pub fn point_distance(&self, point: Vec2, num_samples: usize) -> f32 {
        let mut min_dist_sq = f32::INFINITY;
        let samples = num_samples.max(2);

        for i in 0..=samples {
            let t = i as f32 / samples as f32;
            let dist_sq = (self.sample(t) - point).length_sq();
            if dist_sq < min_dist_sq {
                min_dist_sq = dist_sq;
            }
        }

        min_dist_sq.sqrt()
    }

    /// SVG path data (`M .. C ..`) for this segment.
    pub fn to_svg_path(&self) -> String {
        let mut path = String::with_capacity(64);
        let _ = write!(
            path,
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        );
        path
    }
}

/// Standard Bernstein-basis evaluation of a cubic bezier at `t`.
pub fn bezier_point(t: f32, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    Vec2::new(
        p0.x * mt3 + 3.0 * p1.x * mt2 * t + 3.0 * p2.x * mt * t2 + p3.x * t3,
        p0.y * mt3 + 3.0 * p1.y * mt2 * t + 3.0 * p2.y * mt * t2 + p3.y * t3,
    )
}

/// Lateral offset of the `index`-th of `total` parallel edges.
///
/// Offsets are symmetric around zero: `(index - (total - 1) / 2) * 30`.
pub fn parallel_offset(index: usize, total: usize) -> f32 {
    let total = total.max(1);
    (index as f32 - (total as f32 - 1.0) / 2.0) * PARALLEL_SPACING
}

/// Height of the `index`-th self-loop on a node; successive loops nest outward.
pub fn self_loop_height(index: usize) -> f32 {
    SELF_LOOP_BASE_HEIGHT + index as f32 * SELF_LOOP_STEP
}

/// Geometry of one rendered edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCurve {
    pub path: String,
    pub curve: CubicBezier,
    pub is_self_loop: bool,
}

impl EdgeCurve {
    pub fn start(&self) -> Vec2 {
        self.curve.start
    }

    pub fn end(&self) -> Vec2 {
        self.curve.end
    }

    /// Default label/handle position.
    pub fn midpoint(&self) -> Vec2 {
        self.curve.midpoint()
    }
}

/// Build the curve joining two node cards.
///
/// `source` and `target` are node origins (top-left corners, world space).
/// The curve leaves the source's right-center and enters the target's
/// left-center. `index`/`total` place the edge among its parallel siblings.
pub fn get_curve(
    source: Vec2,
    target: Vec2,
    index: usize,
    total: usize,
    control: Option<Vec2>,
    is_self_loop: bool,
) -> EdgeCurve {
    let start = Vec2::new(source.x + NODE_WIDTH, source.y + NODE_HEIGHT / 2.0);
    let end = Vec2::new(target.x, target.y + NODE_HEIGHT / 2.0);

    let curve = if is_self_loop {
        let height = self_loop_height(index);
        CubicBezier {
            start,
            control1: Vec2::new(start.x + SELF_LOOP_REACH, start.y - height),
            control2: Vec2::new(end.x - SELF_LOOP_REACH, end.y - height),
            end,
        }
    } else if let Some(control) = control {
        CubicBezier {
            start,
            control1: start.lerp(control, CONTROL_PULL),
            control2: end.lerp(control, CONTROL_PULL),
            end,
        }
    } else {
        let reach = ((end.x - start.x).abs() * 0.5).max(MIN_CURVE_REACH);
        let offset = parallel_offset(index, total);
        CubicBezier {
            start,
            control1: Vec2::new(start.x + reach, start.y + offset),
            control2: Vec2::new(end.x - reach, end.y + offset),
            end,
        }
    };

    EdgeCurve {
        path: curve.to_svg_path(),
        curve,
        is_self_loop,
    }
}

/// `world = (screen - pan) / zoom`
pub fn screen_to_world(screen: Vec2, pan: Vec2, zoom: f32) -> Vec2 {
    ViewTransform::new(pan, zoom).screen_to_world(screen)
}

pub fn world_to_screen(world: Vec2, pan: Vec2, zoom: f32) -> Vec2 {
    ViewTransform::new(pan, zoom).world_to_screen(world)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_bezier_endpoints_and_midpoint() {
        let p0 = Vec2::new(0.0, 0.0);
        let p1 = Vec2::new(0.0, 100.0);
        let p2 = Vec2::new(100.0, 100.0);
        let p3 = Vec2::new(100.0, 0.0);
        assert_eq!(bezier_point(0.0, p0, p1, p2, p3), p0);
        assert_eq!(bezier_point(1.0, p0, p1, p2, p3), p3);
        assert!(approx(bezier_point(0.5, p0, p1, p2, p3), Vec2::new(50.0, 75.0)));
    }

    #[test]
    fn test_default_curve_uses_minimum_reach() {
        // Anchors 100 apart horizontally: 0.5 * 100 < 80, so reach is 80.
        let curve = get_curve(Vec2::new(0.0, 0.0), Vec2::new(300.0, 0.0), 0, 1, None, false);
        assert_eq!(curve.start(), Vec2::new(200.0, 40.0));
        assert_eq!(curve.end(), Vec2::new(300.0, 40.0));
        assert_eq!(curve.curve.control1, Vec2::new(280.0, 40.0));
        assert_eq!(curve.curve.control2, Vec2::new(220.0, 40.0));
        assert!(!curve.is_self_loop);
    }

    #[test]
    fn test_default_curve_scales_with_distance() {
        let curve = get_curve(Vec2::new(0.0, 0.0), Vec2::new(600.0, 0.0), 0, 1, None, false);
        // dx = 400, reach = 200
        assert_eq!(curve.curve.control1, Vec2::new(400.0, 40.0));
        assert_eq!(curve.curve.control2, Vec2::new(400.0, 40.0));
    }

    #[test]
    fn test_parallel_edges_fan_out() {
        let first = get_curve(Vec2::ZERO, Vec2::new(400.0, 0.0), 0, 2, None, false);
        let second = get_curve(Vec2::ZERO, Vec2::new(400.0, 0.0), 1, 2, None, false);
        assert_eq!(first.curve.control1.y, 40.0 - 15.0);
        assert_eq!(second.curve.control1.y, 40.0 + 15.0);
        assert_ne!(first.path, second.path);
    }

    #[test]
    fn test_controlled_curve_pulls_toward_control() {
        let control = Vec2::new(300.0, 240.0);
        let curve = get_curve(Vec2::ZERO, Vec2::new(400.0, 0.0), 0, 1, Some(control), false);
        let start = Vec2::new(200.0, 40.0);
        let end = Vec2::new(400.0, 40.0);
        assert!(approx(curve.curve.control1, start + (control - start) * 0.7));
        assert!(approx(curve.curve.control2, end + (control - end) * 0.7));
        // Pulled through the neighbourhood of the control point, not through it.
        let mid = curve.midpoint();
        assert!(mid.y > 40.0 && mid.y < 240.0);
    }

    #[test]
    fn test_control_ignores_parallel_offset() {
        let control = Vec2::new(300.0, 100.0);
        let a = get_curve(Vec2::ZERO, Vec2::new(400.0, 0.0), 0, 3, Some(control), false);
        let b = get_curve(Vec2::ZERO, Vec2::new(400.0, 0.0), 2, 3, Some(control), false);
        assert_eq!(a.curve, b.curve);
    }

    #[test]
    fn test_self_loop_shape() {
        let node = Vec2::new(100.0, 100.0);
        let curve = get_curve(node, node, 0, 1, None, true);
        assert!(curve.is_self_loop);
        assert_eq!(curve.start(), Vec2::new(300.0, 140.0));
        assert_eq!(curve.end(), Vec2::new(100.0, 140.0));
        assert_eq!(curve.curve.control1, Vec2::new(360.0, 60.0));
        assert_eq!(curve.curve.control2, Vec2::new(40.0, 60.0));
        assert!(curve.midpoint().y < 140.0);
    }

    #[test]
    fn test_self_loops_nest() {
        assert_eq!(self_loop_height(1) - self_loop_height(0), 25.0);
        let node = Vec2::new(0.0, 0.0);
        let inner = get_curve(node, node, 0, 2, None, true);
        let outer = get_curve(node, node, 1, 2, None, true);
        assert_ne!(inner.path, outer.path);
        assert!(outer.midpoint().y < inner.midpoint().y);
    }

    #[test]
    fn test_svg_path_format() {
        let curve = CubicBezier {
            start: Vec2::new(0.0, 1.0),
            control1: Vec2::new(2.0, 3.0),
            control2: Vec2::new(4.0, 5.0),
            end: Vec2::new(6.0, 7.0),
        };
        assert_eq!(curve.to_svg_path(), "M 0 1 C 2 3, 4 5, 6 7");
    }

    #[test]
    fn test_point_distance() {
        let curve = CubicBezier {
            start: Vec2::new(0.0, 0.0),
            control1: Vec2::new(33.0, 0.0),
            control2: Vec2::new(66.0, 0.0),
            end: Vec2::new(100.0, 0.0),
        };
        assert!(curve.point_distance(Vec2::new(50.0, 3.0), 48) < 3.5);
        assert!(curve.point_distance(Vec2::new(50.0, 50.0), 48) > 45.0);
    }
}
