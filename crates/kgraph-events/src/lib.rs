use crossbeam_channel::{Receiver, Sender, unbounded};
use kgraph_core::{EdgeId, EdgeUpdate, EditorNode, NodeId, ViewTransform};
use serde::{Deserialize, Serialize};

/// Outgoing side effects of the canvas.
///
/// The canvas never owns the node/edge collections; every mutation it wants to
/// make is reported through one of these calls and applied by the owner.
pub trait CanvasCallbacks {
    fn on_node_select(&mut self, id: Option<NodeId>);
    fn on_edge_select(&mut self, id: Option<EdgeId>);
    /// Whole-collection replace, used while dragging nodes.
    fn on_nodes_change(&mut self, nodes: Vec<EditorNode>);
    fn on_edge_update(&mut self, id: EdgeId, update: EdgeUpdate);
    fn on_edge_create(&mut self, source: NodeId, target: NodeId);
    fn on_pan_zoom_change(&mut self, view: ViewTransform);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Canvas callbacks
    NodeSelect(Option<NodeId>),
    EdgeSelect(Option<EdgeId>),
    NodesChange(Vec<EditorNode>),
    EdgeUpdate { id: EdgeId, update: EdgeUpdate },
    EdgeCreate { source: NodeId, target: NodeId },
    PanZoomChange(ViewTransform),

    // Toolbar / keyboard
    /// Delete whatever is currently selected.
    DeleteSelection,
    /// Zoom the editor viewport in by one step
    ZoomIn,
    /// Zoom the editor viewport out by one step
    ZoomOut,
    /// Fit all nodes into the viewport
    ZoomToFit,
    /// Reset pan and zoom
    ZoomReset,
    /// Open the force-directed explorer over the current graph
    OpenExplorer,
    CloseExplorer,
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Event bus disconnected, dropping event");
        }
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    /// Drain pending events without dispatching them.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

impl CanvasCallbacks for EventBus {
    fn on_node_select(&mut self, id: Option<NodeId>) {
        self.publish(Event::NodeSelect(id));
    }

    fn on_edge_select(&mut self, id: Option<EdgeId>) {
        self.publish(Event::EdgeSelect(id));
    }

    fn on_nodes_change(&mut self, nodes: Vec<EditorNode>) {
        self.publish(Event::NodesChange(nodes));
    }

    fn on_edge_update(&mut self, id: EdgeId, update: EdgeUpdate) {
        self.publish(Event::EdgeUpdate { id, update });
    }

    fn on_edge_create(&mut self, source: NodeId, target: NodeId) {
        self.publish(Event::EdgeCreate { source, target });
    }

    fn on_pan_zoom_change(&mut self, view: ViewTransform) {
        self.publish(Event::PanZoomChange(view));
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::Vec2;

    #[test]
    fn test_event_bus_publish_receive() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        sender
            .send(Event::NodeSelect(Some(NodeId::from("orders"))))
            .unwrap();

        match receiver.recv().unwrap() {
            Event::NodeSelect(Some(id)) => assert_eq!(id.as_str(), "orders"),
            other => panic!("Expected NodeSelect event, got {:?}", other),
        }
    }

    #[test]
    fn test_callbacks_publish_in_order() {
        let mut bus = EventBus::new();
        bus.on_edge_create(NodeId::from("a"), NodeId::from("b"));
        bus.on_edge_update(EdgeId::from("e"), EdgeUpdate::control(Vec2::new(1.0, 2.0)));
        bus.on_pan_zoom_change(ViewTransform::new(Vec2::new(3.0, 4.0), 1.5));

        let events = bus.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            Event::EdgeCreate {
                source: NodeId::from("a"),
                target: NodeId::from("b"),
            }
        );
        assert!(matches!(&events[1], Event::EdgeUpdate { id, .. } if id.as_str() == "e"));
        assert!(matches!(events[2], Event::PanZoomChange(view) if view.zoom == 1.5));
    }

    #[test]
    fn test_dispatch_to_listener() {
        struct Counter(usize);
        impl EventListener for Counter {
            fn handle_event(&mut self, _event: &Event) {
                self.0 += 1;
            }
        }

        let bus = EventBus::new();
        bus.publish(Event::ZoomIn);
        bus.publish(Event::ZoomToFit);
        let mut counter = Counter(0);
        bus.dispatch_to(&mut counter);
        assert_eq!(counter.0, 2);
        assert!(bus.drain().is_empty());
    }
}
