use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod math;
pub mod model;
pub mod view;

pub use error::CanvasError;
pub use math::{Rect, Vec2};
pub use model::{EdgeUpdate, EditorEdge, EditorNode, NodeData};
pub use view::{ViewTransform, ZoomBounds};

/// Fixed width of an editor node card, in world units.
pub const NODE_WIDTH: f32 = 200.0;
/// Fixed height of an editor node card, in world units.
pub const NODE_HEIGHT: f32 = 80.0;
/// Hit radius of the left/right connection handles, in world units.
pub const HANDLE_RADIUS: f32 = 8.0;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier for a node created in the editor.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EdgeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Which layer of the knowledge graph a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Physical schema objects (tables, columns).
    #[default]
    Technical,
    /// Business concepts layered on top of the technical schema.
    Business,
}

impl NodeType {
    pub fn label(&self) -> &'static str {
        match self {
            NodeType::Technical => "Technical",
            NodeType::Business => "Business",
        }
    }
}

/// Side of a node card a connection handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleSide {
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
        assert_ne!(EdgeId::generate(), EdgeId::generate());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = NodeId::new("orders");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"orders\"");
        let back: EdgeId = serde_json::from_str("\"e-1\"").unwrap();
        assert_eq!(back, EdgeId::from("e-1"));
    }

    #[test]
    fn test_node_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&NodeType::Business).unwrap(),
            "\"BUSINESS\""
        );
        assert_eq!(NodeType::default(), NodeType::Technical);
    }
}
