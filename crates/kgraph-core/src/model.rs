use crate::{EdgeId, NODE_HEIGHT, NODE_WIDTH, NodeId, NodeType, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form annotations attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeData {
    pub description: Option<String>,
    pub data_type: Option<String>,
    pub properties: BTreeMap<String, String>,
}

/// A node on the editor canvas. `x`/`y` is the top-left corner in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub sub_type: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub data: NodeData,
}

impl EditorNode {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::Technical,
            sub_type: String::new(),
            label: label.into(),
            x,
            y,
            data: NodeData::default(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.x = pos.x;
        self.y = pos.y;
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.position(), Vec2::new(NODE_WIDTH, NODE_HEIGHT))
    }

    /// Right-center of the card, where outgoing edges start.
    pub fn source_anchor(&self) -> Vec2 {
        Vec2::new(self.x + NODE_WIDTH, self.y + NODE_HEIGHT / 2.0)
    }

    /// Left-center of the card, where incoming edges end.
    pub fn target_anchor(&self) -> Vec2 {
        Vec2::new(self.x, self.y + NODE_HEIGHT / 2.0)
    }
}

/// A directed relationship between two nodes.
///
/// `control` is a world-space point the user dragged to bend the curve; `None`
/// means the default curvature is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<Vec2>,
}

impl EditorEdge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: String::new(),
            control: None,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    pub fn apply(&mut self, update: &EdgeUpdate) {
        if let Some(control) = update.control {
            self.control = control;
        }
        if let Some(label) = &update.label {
            self.label = label.clone();
        }
    }
}

/// Partial edge update carried by `on_edge_update`.
///
/// `control: Some(None)` resets the edge to its default curvature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<Option<Vec2>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EdgeUpdate {
    pub fn control(point: Vec2) -> Self {
        Self {
            control: Some(Some(point)),
            label: None,
        }
    }

    pub fn reset_control() -> Self {
        Self {
            control: Some(None),
            label: None,
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            control: None,
            label: Some(label.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_anchors() {
        let node = EditorNode::new("a", "A", 10.0, 20.0);
        assert_eq!(node.source_anchor(), Vec2::new(210.0, 60.0));
        assert_eq!(node.target_anchor(), Vec2::new(10.0, 60.0));
        assert_eq!(node.rect().max, Vec2::new(210.0, 100.0));
    }

    #[test]
    fn test_edge_update_applies_partially() {
        let mut edge = EditorEdge::new("e", "a", "b");
        edge.label = "owns".to_string();

        edge.apply(&EdgeUpdate::control(Vec2::new(5.0, 6.0)));
        assert_eq!(edge.control, Some(Vec2::new(5.0, 6.0)));
        assert_eq!(edge.label, "owns");

        edge.apply(&EdgeUpdate::label("has"));
        assert_eq!(edge.control, Some(Vec2::new(5.0, 6.0)));
        assert_eq!(edge.label, "has");

        edge.apply(&EdgeUpdate::reset_control());
        assert_eq!(edge.control, None);
    }

    #[test]
    fn test_node_json_shape() {
        let json = r#"{
            "id": "orders",
            "type": "TECHNICAL",
            "subType": "table",
            "label": "Orders",
            "x": 1.0,
            "y": 2.0,
            "data": { "description": "All orders", "properties": { "pk": "id" } }
        }"#;
        let node: EditorNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, NodeId::from("orders"));
        assert_eq!(node.sub_type, "table");
        assert_eq!(node.data.description.as_deref(), Some("All orders"));
        assert_eq!(node.data.properties.get("pk").map(String::as_str), Some("id"));
        assert_eq!(node.data.data_type, None);
    }

    #[test]
    fn test_edge_without_control_omits_field() {
        let edge = EditorEdge::new("e1", "a", "b");
        let json = serde_json::to_string(&edge).unwrap();
        assert!(!json.contains("control"));
        assert!(!edge.is_self_loop());
        assert!(EditorEdge::new("e2", "a", "a").is_self_loop());
    }
}
