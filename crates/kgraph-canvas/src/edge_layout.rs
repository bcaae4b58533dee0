//! Parallel-edge grouping and per-edge curve derivation.

use crate::geometry::{EdgeCurve, get_curve};
use kgraph_core::{EdgeId, EditorEdge, EditorNode, NodeId, Vec2};
use std::collections::HashMap;

/// Rank of each edge among the edges sharing its `(source, target)` pair.
///
/// Returns `(index, total)` per edge, in array order. Always recomputed from
/// the slice: indices shift whenever an edge is removed.
pub fn parallel_indices(edges: &[EditorEdge]) -> Vec<(usize, usize)> {
    let mut totals: HashMap<(&NodeId, &NodeId), usize> = HashMap::new();
    for edge in edges {
        *totals.entry((&edge.source, &edge.target)).or_default() += 1;
    }

    let mut seen: HashMap<(&NodeId, &NodeId), usize> = HashMap::new();
    edges
        .iter()
        .map(|edge| {
            let key = (&edge.source, &edge.target);
            let slot = seen.entry(key).or_default();
            let index = *slot;
            *slot += 1;
            (index, totals[&key])
        })
        .collect()
}

/// `(index, total)` for a single edge of the slice.
pub fn parallel_index(edges: &[EditorEdge], position: usize) -> Option<(usize, usize)> {
    let edge = edges.get(position)?;
    let same_pair =
        |other: &&EditorEdge| other.source == edge.source && other.target == edge.target;
    let index = edges[..position].iter().filter(same_pair).count();
    let total = edges.iter().filter(same_pair).count();
    Some((index, total))
}

/// Everything the canvas needs to draw and hit-test one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub edge_id: EdgeId,
    pub label: String,
    pub curve: EdgeCurve,
    /// Where the drag handle and label sit: the persisted control point, or the
    /// curve midpoint when the edge still uses default curvature. Self-loops
    /// ignore any stored control point.
    pub handle: Vec2,
    pub index: usize,
    pub total: usize,
}

pub struct EdgeLayout;

impl EdgeLayout {
    /// Compute geometry for every edge whose endpoints exist.
    ///
    /// Dangling edges are skipped, not reported.
    pub fn layout(nodes: &[EditorNode], edges: &[EditorEdge]) -> Vec<EdgeGeometry> {
        let positions: HashMap<&NodeId, Vec2> =
            nodes.iter().map(|n| (&n.id, n.position())).collect();
        let indices = parallel_indices(edges);

        edges
            .iter()
            .zip(indices)
            .filter_map(|(edge, (index, total))| {
                Self::geometry(&positions, edge, index, total)
            })
            .collect()
    }

    /// Geometry for a single edge, or `None` if it is unknown or dangling.
    pub fn geometry_for(
        nodes: &[EditorNode],
        edges: &[EditorEdge],
        edge_id: &EdgeId,
    ) -> Option<EdgeGeometry> {
        let position = edges.iter().position(|e| &e.id == edge_id)?;
        let (index, total) = parallel_index(edges, position)?;
        let positions: HashMap<&NodeId, Vec2> =
            nodes.iter().map(|n| (&n.id, n.position())).collect();
        Self::geometry(&positions, &edges[position], index, total)
    }

    fn geometry(
        positions: &HashMap<&NodeId, Vec2>,
        edge: &EditorEdge,
        index: usize,
        total: usize,
    ) -> Option<EdgeGeometry> {
        let (Some(&source), Some(&target)) =
            (positions.get(&edge.source), positions.get(&edge.target))
        else {
            tracing::debug!(
                "Skipping edge {} with missing endpoint ({} -> {})",
                edge.id,
                edge.source,
                edge.target
            );
            return None;
        };

        let curve = get_curve(
            source,
            target,
            index,
            total,
            edge.control,
            edge.is_self_loop(),
        );
        let handle = match edge.control {
            Some(control) if !curve.is_self_loop => control,
            _ => curve.midpoint(),
        };

        Some(EdgeGeometry {
            edge_id: edge.id.clone(),
            label: edge.label.clone(),
            curve,
            handle,
            index,
            total,
        })
    }
}
