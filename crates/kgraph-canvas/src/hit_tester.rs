use crate::edge_layout::EdgeGeometry;
use crate::geometry::CubicBezier;
use kgraph_core::{EdgeId, EditorNode, HANDLE_RADIUS, HandleSide, NodeId, Rect, Vec2};

/// Hit radius of an edge's control-point handle.
pub const EDGE_HANDLE_RADIUS: f32 = 6.0;
/// Approximate glyph width used to size edge label hit boxes.
const LABEL_CHAR_WIDTH: f32 = 7.0;
const LABEL_HEIGHT: f32 = 18.0;
const LABEL_PADDING: f32 = 6.0;
/// Labels sit just above the edge handle.
const LABEL_OFFSET_Y: f32 = -16.0;

/// What lies under a world-space point.
///
/// Precedence when several regions overlap:
/// Handle > Node > EdgeHandle > EdgeLabel > Edge > Background
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    /// Empty canvas.
    Background,
    /// A node card body.
    Node(NodeId),
    /// A connection handle on a node's left or right side.
    Handle { node: NodeId, side: HandleSide },
    /// The clickable path of an edge.
    Edge(EdgeId),
    /// The drag handle of an edge's control point.
    EdgeHandle(EdgeId),
    /// The label of an edge.
    EdgeLabel(EdgeId),
}

impl HitTarget {
    pub fn is_node_interactive(&self) -> bool {
        matches!(self, HitTarget::Node(_) | HitTarget::Handle { .. })
    }

    pub fn is_edge_interactive(&self) -> bool {
        matches!(
            self,
            HitTarget::Edge(_) | HitTarget::EdgeHandle(_) | HitTarget::EdgeLabel(_)
        )
    }

    pub fn edge_id(&self) -> Option<&EdgeId> {
        match self {
            HitTarget::Edge(id) | HitTarget::EdgeHandle(id) | HitTarget::EdgeLabel(id) => Some(id),
            _ => None,
        }
    }
}

/// Resolves a world-space point to the node under it.
///
/// Used when a connection gesture is dropped. Anything that can answer the
/// question (a scene graph, a quadtree, the [`HitTester`] below) can stand in.
pub trait SpatialHitTester {
    fn node_at(&self, point: Vec2) -> Option<NodeId>;
}

impl<F> SpatialHitTester for F
where
    F: Fn(Vec2) -> Option<NodeId>,
{
    fn node_at(&self, point: Vec2) -> Option<NodeId> {
        self(point)
    }
}

#[derive(Debug, Clone)]
struct EdgeRegion {
    id: EdgeId,
    curve: CubicBezier,
    handle: Vec2,
    label_rect: Option<Rect>,
}

/// Hit tester for the editor canvas.
///
/// Rebuild it with [`HitTester::update`] from the current snapshot whenever
/// nodes or edges change.
#[derive(Debug, Clone)]
pub struct HitTester {
    /// Node rects in draw order; later entries are drawn on top.
    nodes: Vec<(NodeId, Rect)>,
    edges: Vec<EdgeRegion>,
    /// Default tolerance (in world units) for edge hit testing.
    edge_tolerance: f32,
    /// Number of samples along bezier curves for distance computation.
    bezier_samples: usize,
}

impl Default for HitTester {
    fn default() -> Self {
        Self::new()
    }
}

impl HitTester {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_tolerance: 8.0,
            bezier_samples: 48,
        }
    }

    pub fn with_tolerance(tolerance: f32) -> Self {
        Self {
            edge_tolerance: tolerance,
            ..Self::new()
        }
    }

    pub fn edge_tolerance(&self) -> f32 {
        self.edge_tolerance
    }

    pub fn set_edge_tolerance(&mut self, tolerance: f32) {
        self.edge_tolerance = tolerance;
    }

    pub fn update(&mut self, nodes: &[EditorNode], edges: &[EdgeGeometry]) {
        self.nodes = nodes.iter().map(|n| (n.id.clone(), n.rect())).collect();
        self.edges = edges
            .iter()
            .map(|geometry| EdgeRegion {
                id: geometry.edge_id.clone(),
                curve: geometry.curve.curve,
                handle: geometry.handle,
                label_rect: label_rect(&geometry.label, geometry.handle),
            })
            .collect();
    }

    /// Resolve the top-most interactive region at `pos`.
    ///
    /// Nodes are visited top-most first; within one node its handles win over
    /// its body, but a node drawn on top hides the handles of those below it.
    pub fn hit_test(&self, pos: Vec2) -> HitTarget {
        if let Some(target) = self.nodes.iter().rev().find_map(|(id, rect)| {
            if let Some(side) = handle_at(rect, pos) {
                Some(HitTarget::Handle {
                    node: id.clone(),
                    side,
                })
            } else if rect.contains(pos) {
                Some(HitTarget::Node(id.clone()))
            } else {
                None
            }
        }) {
            return target;
        }
        if let Some(edge) = self.hit_test_edge_handle(pos) {
            return HitTarget::EdgeHandle(edge);
        }
        if let Some(edge) = self.hit_test_edge_label(pos) {
            return HitTarget::EdgeLabel(edge);
        }
        if let Some(edge) = self.hit_test_edge(pos, self.edge_tolerance) {
            return HitTarget::Edge(edge);
        }
        HitTarget::Background
    }

    /// Top-most node whose card contains `pos`.
    pub fn hit_test_node(&self, pos: Vec2) -> Option<NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(id, _)| id.clone())
    }

    pub fn hit_test_handle(&self, pos: Vec2) -> Option<(NodeId, HandleSide)> {
        self.nodes
            .iter()
            .rev()
            .find_map(|(id, rect)| handle_at(rect, pos).map(|side| (id.clone(), side)))
    }

    pub fn hit_test_edge_handle(&self, pos: Vec2) -> Option<EdgeId> {
        self.edges
            .iter()
            .rev()
            .find(|region| pos.distance(region.handle) <= EDGE_HANDLE_RADIUS)
            .map(|region| region.id.clone())
    }

    pub fn hit_test_edge_label(&self, pos: Vec2) -> Option<EdgeId> {
        self.edges
            .iter()
            .rev()
            .find(|region| region.label_rect.is_some_and(|rect| rect.contains(pos)))
            .map(|region| region.id.clone())
    }

    /// Closest edge whose curve passes within `tolerance` of `pos`.
    pub fn hit_test_edge(&self, pos: Vec2, tolerance: f32) -> Option<EdgeId> {
        let mut best_id = None;
        let mut best_dist = tolerance;

        for region in &self.edges {
            let dist = region.curve.point_distance(pos, self.bezier_samples);
            if dist < best_dist {
                best_dist = dist;
                best_id = Some(&region.id);
            }
        }

        best_id.cloned()
    }
}

impl SpatialHitTester for HitTester {
    fn node_at(&self, point: Vec2) -> Option<NodeId> {
        match self.hit_test(point) {
            HitTarget::Node(id) | HitTarget::Handle { node: id, .. } => Some(id),
            _ => None,
        }
    }
}

fn handle_at(rect: &Rect, pos: Vec2) -> Option<HandleSide> {
    let mid_y = rect.center().y;
    if pos.distance(Vec2::new(rect.max.x, mid_y)) <= HANDLE_RADIUS {
        Some(HandleSide::Right)
    } else if pos.distance(Vec2::new(rect.min.x, mid_y)) <= HANDLE_RADIUS {
        Some(HandleSide::Left)
    } else {
        None
    }
}

fn label_rect(label: &str, handle: Vec2) -> Option<Rect> {
    if label.is_empty() {
        return None;
    }
    let width = label.chars().count() as f32 * LABEL_CHAR_WIDTH + LABEL_PADDING * 2.0;
    let center = Vec2::new(handle.x, handle.y + LABEL_OFFSET_Y);
    Some(Rect::from_pos_size(
        Vec2::new(center.x - width / 2.0, center.y - LABEL_HEIGHT / 2.0),
        Vec2::new(width, LABEL_HEIGHT),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_layout::EdgeLayout;
    use kgraph_core::EditorEdge;

    fn scene() -> (Vec<EditorNode>, Vec<EditorEdge>) {
        let nodes = vec![
            EditorNode::new("a", "A", 0.0, 0.0),
            EditorNode::new("b", "B", 400.0, 0.0),
        ];
        let mut edge = EditorEdge::new("e1", "a", "b");
        edge.label = "references".to_string();
        (nodes, vec![edge])
    }

    fn tester() -> HitTester {
        let (nodes, edges) = scene();
        let geometry = EdgeLayout::layout(&nodes, &edges);
        let mut tester = HitTester::new();
        tester.update(&nodes, &geometry);
        tester
    }

    #[test]
    fn test_hit_test_node_body() {
        let tester = tester();
        assert_eq!(tester.hit_test(Vec2::new(100.0, 40.0)), HitTarget::Node(NodeId::from("a")));
        assert_eq!(tester.hit_test(Vec2::new(500.0, 10.0)), HitTarget::Node(NodeId::from("b")));
    }

    #[test]
    fn test_handles_beat_node_body() {
        let tester = tester();
        assert_eq!(
            tester.hit_test(Vec2::new(198.0, 40.0)),
            HitTarget::Handle {
                node: NodeId::from("a"),
                side: HandleSide::Right
            }
        );
        // Handles extend past the card edge.
        assert_eq!(
            tester.hit_test(Vec2::new(395.0, 40.0)),
            HitTarget::Handle {
                node: NodeId::from("b"),
                side: HandleSide::Left
            }
        );
    }

    #[test]
    fn test_edge_regions() {
        let tester = tester();
        // Default curve from (200,40) to (400,40) has its midpoint at (300,40).
        assert_eq!(
            tester.hit_test(Vec2::new(300.0, 42.0)),
            HitTarget::EdgeHandle(EdgeId::from("e1"))
        );
        assert_eq!(
            tester.hit_test(Vec2::new(300.0, 24.0)),
            HitTarget::EdgeLabel(EdgeId::from("e1"))
        );
        assert_eq!(tester.hit_test(Vec2::new(250.0, 44.0)), HitTarget::Edge(EdgeId::from("e1")));
        assert_eq!(tester.hit_test(Vec2::new(300.0, 200.0)), HitTarget::Background);
    }

    #[test]
    fn test_top_most_node_wins() {
        let nodes = vec![
            EditorNode::new("under", "U", 0.0, 0.0),
            EditorNode::new("over", "O", 50.0, 20.0),
        ];
        let mut tester = HitTester::new();
        tester.update(&nodes, &[]);
        assert_eq!(tester.hit_test_node(Vec2::new(100.0, 50.0)), Some(NodeId::from("over")));
        assert_eq!(tester.hit_test_node(Vec2::new(10.0, 10.0)), Some(NodeId::from("under")));
    }

    #[test]
    fn test_upper_node_hides_lower_handles() {
        // "over" covers the right handle of "under" at (200, 40).
        let nodes = vec![
            EditorNode::new("under", "U", 0.0, 0.0),
            EditorNode::new("over", "O", 100.0, 20.0),
        ];
        let mut tester = HitTester::new();
        tester.update(&nodes, &[]);
        assert_eq!(tester.hit_test(Vec2::new(200.0, 40.0)), HitTarget::Node(NodeId::from("over")));
        assert_eq!(tester.node_at(Vec2::new(200.0, 40.0)), Some(NodeId::from("over")));
        // The uncovered left handle of "under" still works.
        assert_eq!(
            tester.hit_test(Vec2::new(2.0, 40.0)),
            HitTarget::Handle {
                node: NodeId::from("under"),
                side: HandleSide::Left
            }
        );
        // A handle sticking out past its own card still beats the card below it.
        assert_eq!(
            tester.hit_test(Vec2::new(95.0, 60.0)),
            HitTarget::Handle {
                node: NodeId::from("over"),
                side: HandleSide::Left
            }
        );
    }

    #[test]
    fn test_interactive_classification() {
        assert!(HitTarget::Node(NodeId::from("a")).is_node_interactive());
        assert!(HitTarget::EdgeLabel(EdgeId::from("e")).is_edge_interactive());
        assert!(!HitTarget::Background.is_node_interactive());
        assert!(!HitTarget::Background.is_edge_interactive());
    }

    #[test]
    fn test_closure_hit_tester() {
        let only_b = |p: Vec2| (p.x > 300.0).then(|| NodeId::from("b"));
        assert_eq!(only_b.node_at(Vec2::new(350.0, 0.0)), Some(NodeId::from("b")));
        assert_eq!(only_b.node_at(Vec2::new(10.0, 0.0)), None);
    }

    #[test]
    fn test_update_replaces_previous_data() {
        let mut tester = tester();
        tester.update(&[], &[]);
        assert_eq!(tester.hit_test(Vec2::new(100.0, 40.0)), HitTarget::Background);
    }
}
