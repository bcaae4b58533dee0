//! Owner of the editor's nodes, edges, selection and view.
//!
//! The canvas only ever proposes changes; `EditorDocument` is the state the
//! GUI keeps and feeds back into the canvas as the next snapshot.

use crate::interaction::CanvasSnapshot;
use crate::pan_zoom::PanZoomController;
use kgraph_core::{
    CanvasError, EdgeId, EdgeUpdate, EditorEdge, EditorNode, NodeData, NodeId, NodeType, Vec2,
    ViewTransform,
};
use kgraph_events::{Event, EventListener};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorDocument {
    nodes: Vec<EditorNode>,
    edges: Vec<EditorEdge>,
    selected_node: Option<NodeId>,
    selected_edge: Option<EdgeId>,
    view: ViewTransform,
    #[serde(skip)]
    viewport: Vec2,
    #[serde(skip)]
    pan_zoom: PanZoomController,
}

impl EditorDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(nodes: Vec<EditorNode>, edges: Vec<EditorEdge>) -> Self {
        Self {
            nodes,
            edges,
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[EditorNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EditorEdge] {
        &self.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&EditorNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&EditorEdge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    pub fn selected_node(&self) -> Option<&NodeId> {
        self.selected_node.as_ref()
    }

    pub fn selected_edge(&self) -> Option<&EdgeId> {
        self.selected_edge.as_ref()
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn set_pan_zoom(&mut self, pan_zoom: PanZoomController) {
        self.pan_zoom = pan_zoom;
    }

    /// Size of the canvas in screen pixels; needed by "fit to content".
    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport = size;
    }

    pub fn snapshot(&self, origin: Vec2) -> CanvasSnapshot<'_> {
        CanvasSnapshot {
            nodes: &self.nodes,
            edges: &self.edges,
            view: self.view,
            origin,
        }
    }

    pub fn create_node(
        &mut self,
        node_type: NodeType,
        sub_type: impl Into<String>,
        label: impl Into<String>,
        position: Vec2,
    ) -> NodeId {
        let id = NodeId::generate();
        self.nodes.push(EditorNode {
            id: id.clone(),
            node_type,
            sub_type: sub_type.into(),
            label: label.into(),
            x: position.x,
            y: position.y,
            data: NodeData::default(),
        });
        id
    }

    pub fn add_node(&mut self, node: EditorNode) -> Result<(), CanvasError> {
        if self.node(&node.id).is_some() {
            return Err(CanvasError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Insert an imported subgraph (e.g. a search result).
    ///
    /// Nodes whose id is already present are skipped; edges are kept only if
    /// both endpoints exist afterwards and their id is new. Returns the
    /// number of nodes and edges actually inserted.
    pub fn insert_nodes(
        &mut self,
        nodes: Vec<EditorNode>,
        edges: Vec<EditorEdge>,
    ) -> (usize, usize) {
        let mut known: HashSet<NodeId> = self.nodes.iter().map(|n| n.id.clone()).collect();
        let mut added_nodes = 0;
        for node in nodes {
            if known.insert(node.id.clone()) {
                self.nodes.push(node);
                added_nodes += 1;
            }
        }

        let mut known_edges: HashSet<EdgeId> = self.edges.iter().map(|e| e.id.clone()).collect();
        let mut added_edges = 0;
        for edge in edges {
            if !known.contains(&edge.source) || !known.contains(&edge.target) {
                tracing::debug!("Import skipped edge {} with unknown endpoint", edge.id);
                continue;
            }
            if known_edges.insert(edge.id.clone()) {
                self.edges.push(edge);
                added_edges += 1;
            }
        }
        (added_nodes, added_edges)
    }

    /// Edit a node in place.
    pub fn update_node(
        &mut self,
        id: &NodeId,
        edit: impl FnOnce(&mut EditorNode),
    ) -> Result<(), CanvasError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| CanvasError::UnknownNode(id.clone()))?;
        edit(node);
        Ok(())
    }

    pub fn replace_nodes(&mut self, nodes: Vec<EditorNode>) {
        self.nodes = nodes;
        if let Some(selected) = &self.selected_node
            && self.node(selected).is_none()
        {
            self.selected_node = None;
        }
    }

    /// Delete a node together with every edge that references it.
    pub fn delete_node(&mut self, id: &NodeId) -> Result<(), CanvasError> {
        let before = self.nodes.len();
        self.nodes.retain(|n| &n.id != id);
        if self.nodes.len() == before {
            return Err(CanvasError::UnknownNode(id.clone()));
        }

        let edges_before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        tracing::debug!(
            "Deleted node {} and {} attached edge(s)",
            id,
            edges_before - self.edges.len()
        );

        if self.selected_node.as_ref() == Some(id) {
            self.selected_node = None;
        }
        if let Some(edge) = &self.selected_edge
            && self.edge(edge).is_none()
        {
            self.selected_edge = None;
        }
        Ok(())
    }

    /// Connect two existing nodes. Self-connections are allowed.
    pub fn create_edge(&mut self, source: &NodeId, target: &NodeId) -> Result<EdgeId, CanvasError> {
        for endpoint in [source, target] {
            if self.node(endpoint).is_none() {
                return Err(CanvasError::UnknownNode(endpoint.clone()));
            }
        }
        let id = EdgeId::generate();
        self.edges
            .push(EditorEdge::new(id.clone(), source.clone(), target.clone()));
        Ok(id)
    }

    pub fn update_edge(&mut self, id: &EdgeId, update: &EdgeUpdate) -> Result<(), CanvasError> {
        let edge = self
            .edges
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| CanvasError::UnknownEdge(id.clone()))?;
        edge.apply(update);
        Ok(())
    }

    pub fn delete_edge(&mut self, id: &EdgeId) -> Result<(), CanvasError> {
        let before = self.edges.len();
        self.edges.retain(|e| &e.id != id);
        if self.edges.len() == before {
            return Err(CanvasError::UnknownEdge(id.clone()));
        }
        if self.selected_edge.as_ref() == Some(id) {
            self.selected_edge = None;
        }
        Ok(())
    }

    /// Select a node; any edge selection is cleared.
    pub fn select_node(&mut self, id: Option<NodeId>) {
        if id.is_some() {
            self.selected_edge = None;
        }
        self.selected_node = id;
    }

    /// Select an edge; any node selection is cleared.
    pub fn select_edge(&mut self, id: Option<EdgeId>) {
        if id.is_some() {
            self.selected_node = None;
        }
        self.selected_edge = id;
    }

    /// Delete the selected node (with its edges) or the selected edge.
    pub fn delete_selection(&mut self) -> Result<(), CanvasError> {
        if let Some(node) = self.selected_node.clone() {
            return self.delete_node(&node);
        }
        if let Some(edge) = self.selected_edge.clone() {
            return self.delete_edge(&edge);
        }
        Ok(())
    }

    /// Edges whose endpoints both exist; dangling edges are hidden.
    pub fn visible_edges(&self) -> impl Iterator<Item = &EditorEdge> {
        self.edges.iter().filter(|edge| {
            let visible = self.node(&edge.source).is_some() && self.node(&edge.target).is_some();
            if !visible {
                tracing::debug!("Hiding dangling edge {}", edge.id);
            }
            visible
        })
    }

    pub fn zoom_in(&mut self) {
        self.view = self.pan_zoom.zoom_in(self.view);
    }

    pub fn zoom_out(&mut self) {
        self.view = self.pan_zoom.zoom_out(self.view);
    }

    pub fn reset_view(&mut self) {
        self.view = self.pan_zoom.reset();
    }

    /// Fit all nodes into the viewport; no-op without nodes.
    pub fn fit_to_content(&mut self) {
        if let Some(view) = self.pan_zoom.fit_to_content(&self.nodes, self.viewport) {
            self.view = view;
        }
    }
}

impl EventListener for EditorDocument {
    fn handle_event(&mut self, event: &Event) {
        let result = match event {
            Event::NodeSelect(id) => {
                self.select_node(id.clone());
                Ok(())
            }
            Event::EdgeSelect(id) => {
                self.select_edge(id.clone());
                Ok(())
            }
            Event::NodesChange(nodes) => {
                self.replace_nodes(nodes.clone());
                Ok(())
            }
            Event::EdgeUpdate { id, update } => self.update_edge(id, update),
            Event::EdgeCreate { source, target } => self.create_edge(source, target).map(|_| ()),
            Event::PanZoomChange(view) => {
                self.view = *view;
                Ok(())
            }
            Event::DeleteSelection => self.delete_selection(),
            Event::ZoomIn => {
                self.zoom_in();
                Ok(())
            }
            Event::ZoomOut => {
                self.zoom_out();
                Ok(())
            }
            Event::ZoomToFit => {
                self.fit_to_content();
                Ok(())
            }
            Event::ZoomReset => {
                self.reset_view();
                Ok(())
            }
            Event::OpenExplorer | Event::CloseExplorer => Ok(()),
        };

        if let Err(err) = result {
            tracing::warn!("Ignoring canvas event: {}", err);
        }
    }
}
