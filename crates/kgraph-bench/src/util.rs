use kgraph_canvas::{ExploredEdge, ExploredGraph, ExploredNode};
use kgraph_core::{EditorEdge, EditorNode};

/// Nodes on a grid with `edges_per_node` edges to following nodes, wrapping
/// around; every tenth node also gets a self-loop.
pub fn synthetic_editor_graph(
    node_count: usize,
    edges_per_node: usize,
) -> (Vec<EditorNode>, Vec<EditorEdge>) {
    let columns = (node_count as f32).sqrt().ceil().max(1.0) as usize;
    let nodes: Vec<EditorNode> = (0..node_count)
        .map(|i| {
            let x = (i % columns) as f32 * 300.0;
            let y = (i / columns) as f32 * 160.0;
            EditorNode::new(format!("n{i}"), format!("Node {i}"), x, y)
        })
        .collect();

    let mut edges = Vec::new();
    for i in 0..node_count {
        for k in 1..=edges_per_node {
            let j = (i + k) % node_count;
            edges.push(EditorEdge::new(format!("e{i}_{k}"), format!("n{i}"), format!("n{j}")));
        }
        if i % 10 == 0 {
            edges.push(EditorEdge::new(format!("loop{i}"), format!("n{i}"), format!("n{i}")));
        }
    }
    (nodes, edges)
}

/// A ring with chords, the usual shape of an exploration result.
pub fn synthetic_explored_graph(node_count: usize) -> ExploredGraph {
    let nodes = (0..node_count)
        .map(|i| ExploredNode::new(format!("n{i}"), &[if i % 2 == 0 { "Person" } else { "Movie" }]))
        .collect();
    let mut edges = Vec::new();
    for i in 0..node_count {
        edges.push(ExploredEdge::new(
            format!("n{i}"),
            format!("n{}", (i + 1) % node_count),
            "NEXT",
        ));
        if i % 5 == 0 {
            edges.push(ExploredEdge::new(
                format!("n{i}"),
                format!("n{}", (i + node_count / 2) % node_count),
                "CHORD",
            ));
        }
    }
    ExploredGraph { nodes, edges }
}
