//! Pointer-gesture state machine for the editor canvas.
//!
//! The controller never owns nodes or edges. Each handler receives the
//! current [`CanvasSnapshot`] and reports mutations through
//! [`CanvasCallbacks`]; the owner applies them and hands a fresh snapshot to
//! the next event.

use crate::edge_layout::EdgeLayout;
use crate::hit_tester::{HitTarget, HitTester, SpatialHitTester};
use crate::pan_zoom::PanZoomController;
use kgraph_core::{
    EdgeId, EdgeUpdate, EditorEdge, EditorNode, HandleSide, NODE_HEIGHT, NODE_WIDTH, NodeId,
    Vec2, ViewTransform,
};
use kgraph_events::CanvasCallbacks;

pub type PointerId = u64;

/// The one active manipulation mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    PanningCanvas,
    DraggingNode(NodeId),
    DraggingEdgeControl(EdgeId),
    ConnectingFrom { node: NodeId, handle: HandleSide },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }
}

/// A pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub client: Vec2,
}

impl PointerEvent {
    pub fn new(pointer_id: PointerId, x: f32, y: f32) -> Self {
        Self {
            pointer_id,
            client: Vec2::new(x, y),
        }
    }
}

/// Externally owned state the controller reads for one event.
#[derive(Debug, Clone, Copy)]
pub struct CanvasSnapshot<'a> {
    pub nodes: &'a [EditorNode],
    pub edges: &'a [EditorEdge],
    pub view: ViewTransform,
    /// Top-left corner of the canvas element, in client coordinates.
    pub origin: Vec2,
}

impl CanvasSnapshot<'_> {
    pub fn to_world(&self, client: Vec2) -> Vec2 {
        self.view.screen_to_world(client - self.origin)
    }

    fn node(&self, id: &NodeId) -> Option<&EditorNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    fn edge(&self, id: &EdgeId) -> Option<&EditorEdge> {
        self.edges.iter().find(|e| &e.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct CanvasController {
    state: InteractionState,
    captured: Option<PointerId>,
    /// `pointer client - pan`, captured when a pan starts.
    pan_offset: Vec2,
    /// `handle position - pointer world`, captured when an edge drag starts.
    control_offset: Vec2,
    connection_start: Vec2,
    temp_edge_end: Option<Vec2>,
    pan_zoom: PanZoomController,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasController {
    pub fn new() -> Self {
        Self::with_pan_zoom(PanZoomController::editor())
    }

    pub fn with_pan_zoom(pan_zoom: PanZoomController) -> Self {
        Self {
            state: InteractionState::Idle,
            captured: None,
            pan_offset: Vec2::ZERO,
            control_offset: Vec2::ZERO,
            connection_start: Vec2::ZERO,
            temp_edge_end: None,
            pan_zoom,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn captured_pointer(&self) -> Option<PointerId> {
        self.captured
    }

    pub fn pan_zoom(&self) -> &PanZoomController {
        &self.pan_zoom
    }

    /// Rubber-band edge being drawn: `(start anchor, current end)`, world space.
    pub fn pending_connection(&self) -> Option<(Vec2, Vec2)> {
        match (&self.state, self.temp_edge_end) {
            (InteractionState::ConnectingFrom { .. }, Some(end)) => {
                Some((self.connection_start, end))
            }
            _ => None,
        }
    }

    /// Pointer-down resolved against a [`HitTester`].
    pub fn pointer_down_at<C: CanvasCallbacks>(
        &mut self,
        snapshot: &CanvasSnapshot<'_>,
        event: PointerEvent,
        hit_tester: &HitTester,
        callbacks: &mut C,
    ) -> bool {
        let target = hit_tester.hit_test(snapshot.to_world(event.client));
        self.pointer_down(snapshot, event, target, callbacks)
    }

    /// Start a gesture on `target`. Returns `false` if the event was ignored
    /// because another pointer already owns a gesture.
    pub fn pointer_down<C: CanvasCallbacks>(
        &mut self,
        snapshot: &CanvasSnapshot<'_>,
        event: PointerEvent,
        target: HitTarget,
        callbacks: &mut C,
    ) -> bool {
        if !self.state.is_idle() {
            tracing::trace!(
                "Ignoring pointer {} while {:?} is active",
                event.pointer_id,
                self.state
            );
            return false;
        }

        let world = snapshot.to_world(event.client);
        let next = match target {
            HitTarget::Background => {
                callbacks.on_node_select(None);
                callbacks.on_edge_select(None);
                self.pan_offset = event.client - snapshot.view.pan;
                InteractionState::PanningCanvas
            }
            HitTarget::Node(id) => {
                if snapshot.node(&id).is_none() {
                    return false;
                }
                callbacks.on_node_select(Some(id.clone()));
                callbacks.on_edge_select(None);
                InteractionState::DraggingNode(id)
            }
            HitTarget::Handle { node, side } => {
                let Some(source) = snapshot.node(&node) else {
                    return false;
                };
                self.connection_start = match side {
                    HandleSide::Right => source.source_anchor(),
                    HandleSide::Left => source.target_anchor(),
                };
                self.temp_edge_end = Some(world);
                InteractionState::ConnectingFrom { node, handle: side }
            }
            HitTarget::Edge(id) | HitTarget::EdgeHandle(id) | HitTarget::EdgeLabel(id) => {
                let Some(edge) = snapshot.edge(&id) else {
                    return false;
                };
                callbacks.on_edge_select(Some(id.clone()));
                callbacks.on_node_select(None);

                // Self-loop shape is fixed; there is no control point to drag.
                if edge.is_self_loop() {
                    return true;
                }
                let Some(geometry) = EdgeLayout::geometry_for(snapshot.nodes, snapshot.edges, &id)
                else {
                    tracing::debug!("Edge {} has a missing endpoint, not dragging", id);
                    return true;
                };
                let handle = match edge.control {
                    Some(control) => control,
                    None => {
                        // Persist an anchor before any move-driven update.
                        let midpoint = geometry.curve.midpoint();
                        callbacks.on_edge_update(id.clone(), EdgeUpdate::control(midpoint));
                        midpoint
                    }
                };
                self.control_offset = handle - world;
                InteractionState::DraggingEdgeControl(id)
            }
        };

        tracing::trace!("Pointer {} down: {:?}", event.pointer_id, next);
        self.captured = Some(event.pointer_id);
        self.state = next;
        true
    }

    pub fn pointer_move<C: CanvasCallbacks>(
        &mut self,
        snapshot: &CanvasSnapshot<'_>,
        event: PointerEvent,
        callbacks: &mut C,
    ) -> bool {
        if !self.owns(event.pointer_id) {
            return false;
        }

        let world = snapshot.to_world(event.client);
        let state = self.state.clone();
        match &state {
            InteractionState::Idle => return false,
            InteractionState::PanningCanvas => {
                let view = ViewTransform {
                    pan: event.client - self.pan_offset,
                    zoom: snapshot.view.zoom,
                };
                callbacks.on_pan_zoom_change(view);
            }
            InteractionState::DraggingNode(id) => {
                let mut nodes = snapshot.nodes.to_vec();
                let Some(node) = nodes.iter_mut().find(|n| &n.id == id) else {
                    tracing::debug!("Dragged node {} disappeared, ending drag", id);
                    self.reset();
                    return false;
                };
                node.set_position(world - Vec2::new(NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0));
                callbacks.on_nodes_change(nodes);
            }
            InteractionState::DraggingEdgeControl(id) => {
                let control = world + self.control_offset;
                callbacks.on_edge_update(id.clone(), EdgeUpdate::control(control));
            }
            InteractionState::ConnectingFrom { .. } => {
                self.temp_edge_end = Some(world);
            }
        }
        true
    }

    /// Canvas-level pointer-up. A connection in progress is resolved through
    /// `hit_tester`.
    pub fn pointer_up<C: CanvasCallbacks>(
        &mut self,
        snapshot: &CanvasSnapshot<'_>,
        event: PointerEvent,
        hit_tester: &dyn SpatialHitTester,
        callbacks: &mut C,
    ) -> bool {
        if !self.owns(event.pointer_id) {
            return false;
        }
        if let InteractionState::ConnectingFrom { node, .. } = &self.state {
            let source = node.clone();
            let hit = hit_tester.node_at(snapshot.to_world(event.client));
            self.finish_connection(source, hit, callbacks);
        }
        self.reset();
        true
    }

    /// Pointer-up delivered by a node's own handler, before it reaches the
    /// canvas. Resolves a pending connection without spatial lookup; the
    /// canvas-level pointer-up that follows finds the gesture already closed.
    pub fn node_pointer_up<C: CanvasCallbacks>(
        &mut self,
        node: &NodeId,
        event: PointerEvent,
        callbacks: &mut C,
    ) -> bool {
        if !self.owns(event.pointer_id) {
            return false;
        }
        let InteractionState::ConnectingFrom { node: source, .. } = &self.state else {
            return false;
        };
        let source = source.clone();
        self.finish_connection(source, Some(node.clone()), callbacks);
        self.reset();
        true
    }

    /// Pointer cancel: abandon any pending connection. Position mutations
    /// already reported stay applied.
    pub fn pointer_cancel(&mut self, event: PointerEvent) -> bool {
        if !self.owns(event.pointer_id) {
            return false;
        }
        if !self.state.is_idle() {
            tracing::debug!("Gesture {:?} cancelled", self.state);
        }
        self.reset();
        true
    }

    /// Pointer left the canvas; same unwinding as cancel.
    pub fn pointer_leave(&mut self, event: PointerEvent) -> bool {
        self.pointer_cancel(event)
    }

    /// Wheel over the canvas: zoom with the modifier held, scroll otherwise.
    pub fn wheel<C: CanvasCallbacks>(
        &mut self,
        snapshot: &CanvasSnapshot<'_>,
        delta: Vec2,
        zoom_modifier: bool,
        callbacks: &mut C,
    ) {
        let view = self.pan_zoom.apply_wheel(snapshot.view, delta, zoom_modifier);
        if view != snapshot.view {
            callbacks.on_pan_zoom_change(view);
        }
    }

    fn owns(&self, pointer_id: PointerId) -> bool {
        self.captured == Some(pointer_id)
    }

    fn finish_connection<C: CanvasCallbacks>(
        &mut self,
        source: NodeId,
        hit: Option<NodeId>,
        callbacks: &mut C,
    ) {
        match hit {
            Some(target) if target != source => {
                tracing::debug!("Connecting {} -> {}", source, target);
                callbacks.on_edge_create(source, target);
            }
            _ => tracing::trace!("Connection from {} dropped on nothing", source),
        }
    }

    fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.captured = None;
        self.temp_edge_end = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        node_selects: Vec<Option<NodeId>>,
        edge_selects: Vec<Option<EdgeId>>,
        node_changes: Vec<Vec<EditorNode>>,
        edge_updates: Vec<(EdgeId, EdgeUpdate)>,
        created: Vec<(NodeId, NodeId)>,
        views: Vec<ViewTransform>,
    }

    impl CanvasCallbacks for Recorder {
        fn on_node_select(&mut self, id: Option<NodeId>) {
            self.node_selects.push(id);
        }
        fn on_edge_select(&mut self, id: Option<EdgeId>) {
            self.edge_selects.push(id);
        }
        fn on_nodes_change(&mut self, nodes: Vec<EditorNode>) {
            self.node_changes.push(nodes);
        }
        fn on_edge_update(&mut self, id: EdgeId, update: EdgeUpdate) {
            self.edge_updates.push((id, update));
        }
        fn on_edge_create(&mut self, source: NodeId, target: NodeId) {
            self.created.push((source, target));
        }
        fn on_pan_zoom_change(&mut self, view: ViewTransform) {
            self.views.push(view);
        }
    }

    fn nodes() -> Vec<EditorNode> {
        vec![
            EditorNode::new("A", "A", 0.0, 0.0),
            EditorNode::new("B", "B", 400.0, 0.0),
        ]
    }

    fn snapshot<'a>(nodes: &'a [EditorNode], edges: &'a [EditorEdge]) -> CanvasSnapshot<'a> {
        CanvasSnapshot {
            nodes,
            edges,
            view: ViewTransform::default(),
            origin: Vec2::ZERO,
        }
    }

    #[test]
    fn test_background_press_pans_and_clears_selection() {
        let nodes = nodes();
        let mut snap = snapshot(&nodes, &[]);
        snap.view = ViewTransform::new(Vec2::new(10.0, 20.0), 2.0);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        let down = PointerEvent::new(1, 100.0, 100.0);
        assert!(ctl.pointer_down(&snap, down, HitTarget::Background, &mut rec));
        assert_eq!(ctl.state(), &InteractionState::PanningCanvas);
        assert_eq!(rec.node_selects, vec![None]);
        assert_eq!(rec.edge_selects, vec![None]);

        ctl.pointer_move(&snap, PointerEvent::new(1, 130.0, 90.0), &mut rec);
        // 1:1 with pointer movement regardless of zoom.
        assert_eq!(rec.views, vec![ViewTransform::new(Vec2::new(40.0, 10.0), 2.0)]);
    }

    #[test]
    fn test_node_drag_centres_node_on_pointer() {
        let nodes = nodes();
        let mut snap = snapshot(&nodes, &[]);
        snap.view = ViewTransform::new(Vec2::new(50.0, 0.0), 2.0);
        snap.origin = Vec2::new(10.0, 10.0);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        let a = HitTarget::Node(NodeId::from("A"));
        ctl.pointer_down(&snap, PointerEvent::new(1, 70.0, 70.0), a, &mut rec);
        assert_eq!(ctl.state(), &InteractionState::DraggingNode(NodeId::from("A")));
        assert_eq!(rec.node_selects, vec![Some(NodeId::from("A"))]);
        assert_eq!(rec.edge_selects, vec![None]);

        ctl.pointer_move(&snap, PointerEvent::new(1, 460.0, 410.0), &mut rec);
        // world = ((460 - 10 - 50) / 2, (410 - 10 - 0) / 2) = (200, 200)
        let moved = &rec.node_changes[0];
        assert_eq!(moved.len(), 2);
        assert_eq!(moved[0].position(), Vec2::new(100.0, 160.0));
        assert_eq!(moved[1], nodes[1]);
    }

    #[test]
    fn test_other_pointers_are_ignored_while_captured() {
        let nodes = nodes();
        let snap = snapshot(&nodes, &[]);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        ctl.pointer_down(&snap, PointerEvent::new(1, 0.0, 0.0), HitTarget::Background, &mut rec);
        assert_eq!(ctl.captured_pointer(), Some(1));
        let a = HitTarget::Node(NodeId::from("A"));
        assert!(!ctl.pointer_down(&snap, PointerEvent::new(2, 50.0, 40.0), a, &mut rec));
        assert!(!ctl.pointer_move(&snap, PointerEvent::new(2, 5.0, 5.0), &mut rec));
        assert!(rec.views.is_empty());
        assert_eq!(ctl.state(), &InteractionState::PanningCanvas);

        ctl.pointer_up(&snap, PointerEvent::new(1, 0.0, 0.0), &HitTester::new(), &mut rec);
        assert!(ctl.state().is_idle());
        assert_eq!(ctl.captured_pointer(), None);
    }

    #[test]
    fn test_connection_via_hit_tester() {
        let nodes = nodes();
        let snap = snapshot(&nodes, &[]);
        let mut tester = HitTester::new();
        tester.update(&nodes, &[]);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        assert!(ctl.pointer_down_at(&snap, PointerEvent::new(7, 200.0, 40.0), &tester, &mut rec));
        assert_eq!(
            ctl.state(),
            &InteractionState::ConnectingFrom {
                node: NodeId::from("A"),
                handle: HandleSide::Right
            }
        );
        // Starting a connection leaves selection alone.
        assert!(rec.node_selects.is_empty());

        ctl.pointer_move(&snap, PointerEvent::new(7, 300.0, 60.0), &mut rec);
        assert_eq!(
            ctl.pending_connection(),
            Some((Vec2::new(200.0, 40.0), Vec2::new(300.0, 60.0)))
        );
        assert!(rec.node_changes.is_empty() && rec.edge_updates.is_empty());

        ctl.pointer_up(&snap, PointerEvent::new(7, 500.0, 40.0), &tester, &mut rec);
        assert_eq!(rec.created, vec![(NodeId::from("A"), NodeId::from("B"))]);
        assert!(ctl.pending_connection().is_none());
    }

    #[test]
    fn test_connection_dropped_on_source_or_nothing_is_abandoned() {
        let nodes = nodes();
        let snap = snapshot(&nodes, &[]);
        let mut tester = HitTester::new();
        tester.update(&nodes, &[]);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        ctl.pointer_down_at(&snap, PointerEvent::new(1, 200.0, 40.0), &tester, &mut rec);
        ctl.pointer_up(&snap, PointerEvent::new(1, 300.0, 300.0), &tester, &mut rec);
        ctl.pointer_down_at(&snap, PointerEvent::new(1, 200.0, 40.0), &tester, &mut rec);
        ctl.pointer_up(&snap, PointerEvent::new(1, 100.0, 40.0), &tester, &mut rec);

        assert!(rec.created.is_empty());
        assert!(ctl.state().is_idle());
    }

    #[test]
    fn test_cancel_discards_connection() {
        let nodes = nodes();
        let snap = snapshot(&nodes, &[]);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        ctl.pointer_down(
            &snap,
            PointerEvent::new(1, 200.0, 40.0),
            HitTarget::Handle { node: NodeId::from("A"), side: HandleSide::Right },
            &mut rec,
        );
        assert!(ctl.pointer_leave(PointerEvent::new(1, 500.0, 40.0)));
        assert!(ctl.state().is_idle());
        // The canvas-level pointer-up that may follow has nothing to resolve.
        let everything_is_b = |_: Vec2| Some(NodeId::from("B"));
        let up = PointerEvent::new(1, 500.0, 40.0);
        assert!(!ctl.pointer_up(&snap, up, &everything_is_b, &mut rec));
        assert!(rec.created.is_empty());
    }

    #[test]
    fn test_edge_drag_persists_midpoint_once() {
        let nodes = nodes();
        let edges = vec![EditorEdge::new("e1", "A", "B")];
        let snap = snapshot(&nodes, &edges);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        let edge = HitTarget::Edge(EdgeId::from("e1"));
        ctl.pointer_down(&snap, PointerEvent::new(1, 305.0, 45.0), edge, &mut rec);
        assert_eq!(rec.edge_selects, vec![Some(EdgeId::from("e1"))]);
        assert_eq!(rec.node_selects, vec![None]);
        assert_eq!(
            rec.edge_updates,
            vec![(EdgeId::from("e1"), EdgeUpdate::control(Vec2::new(300.0, 40.0)))]
        );

        ctl.pointer_move(&snap, PointerEvent::new(1, 305.0, 145.0), &mut rec);
        ctl.pointer_move(&snap, PointerEvent::new(1, 315.0, 245.0), &mut rec);
        assert_eq!(rec.edge_updates.len(), 3);
        // Offset (-5,-5) keeps the handle from snapping to the pointer tip.
        assert_eq!(rec.edge_updates[1].1, EdgeUpdate::control(Vec2::new(300.0, 140.0)));
        assert_eq!(rec.edge_updates[2].1, EdgeUpdate::control(Vec2::new(310.0, 240.0)));
    }

    #[test]
    fn test_edge_drag_with_existing_control_does_not_persist() {
        let nodes = nodes();
        let mut edge = EditorEdge::new("e1", "A", "B");
        edge.control = Some(Vec2::new(300.0, 200.0));
        let edges = vec![edge];
        let snap = snapshot(&nodes, &edges);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        let handle = HitTarget::EdgeHandle(EdgeId::from("e1"));
        ctl.pointer_down(&snap, PointerEvent::new(1, 300.0, 210.0), handle, &mut rec);
        assert!(rec.edge_updates.is_empty());
        ctl.pointer_move(&snap, PointerEvent::new(1, 320.0, 230.0), &mut rec);
        assert_eq!(
            rec.edge_updates,
            vec![(EdgeId::from("e1"), EdgeUpdate::control(Vec2::new(320.0, 220.0)))]
        );
    }

    #[test]
    fn test_self_loop_selects_without_dragging() {
        let nodes = nodes();
        let edges = vec![EditorEdge::new("loop", "A", "A")];
        let snap = snapshot(&nodes, &edges);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        let handle = HitTarget::EdgeHandle(EdgeId::from("loop"));
        assert!(ctl.pointer_down(&snap, PointerEvent::new(1, 100.0, -20.0), handle, &mut rec));
        assert_eq!(rec.edge_selects, vec![Some(EdgeId::from("loop"))]);
        assert!(ctl.state().is_idle());
        assert_eq!(ctl.captured_pointer(), None);

        assert!(!ctl.pointer_move(&snap, PointerEvent::new(1, 150.0, 80.0), &mut rec));
        assert!(rec.edge_updates.is_empty());
    }

    #[test]
    fn test_wheel_reports_view_changes() {
        let nodes = nodes();
        let snap = snapshot(&nodes, &[]);
        let mut ctl = CanvasController::new();
        let mut rec = Recorder::default();

        ctl.wheel(&snap, Vec2::new(0.0, 40.0), false, &mut rec);
        ctl.wheel(&snap, Vec2::new(0.0, -200.0), true, &mut rec);
        assert_eq!(rec.views[0], ViewTransform::new(Vec2::new(0.0, -40.0), 1.0));
        assert!((rec.views[1].zoom - 1.2).abs() < 1e-6);

        // Already at the lower bound: nothing to report.
        let mut snap = snap;
        snap.view.zoom = 0.5;
        ctl.wheel(&snap, Vec2::new(0.0, 100.0), true, &mut rec);
        assert_eq!(rec.views.len(), 2);
    }
}
