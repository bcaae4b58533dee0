use crate::{EdgeId, NodeId};
use thiserror::Error;

/// Errors raised by editor-document operations.
///
/// Interaction misses (a connection dropped on empty space, a dangling edge at
/// render time) are not errors and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Unknown edge: {0}")]
    UnknownEdge(EdgeId),
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),
}
