//! Spring-embedder layout for the read-only graph explorer.
//!
//! `ForceSimulation::step` is the whole physics frame; drawing lives in
//! [`crate::render`] so the layout can be tested without a display.

use kgraph_core::{EditorEdge, EditorNode, NodeId, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Tunable constants of the spring embedder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceParams {
    pub repulsion: f32,
    /// Pairs further apart than this do not repel.
    pub repulsion_cutoff: f32,
    pub rest_length: f32,
    pub stiffness: f32,
    pub gravity: f32,
    pub damping: f32,
    pub node_radius: f32,
    /// Half-width of the initial placement box around the center.
    pub jitter: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            repulsion: 8000.0,
            repulsion_cutoff: 500.0,
            rest_length: 120.0,
            stiffness: 0.08,
            gravity: 0.005,
            damping: 0.8,
            node_radius: 24.0,
            jitter: 50.0,
        }
    }
}

/// Closest two bodies may get when computing repulsion.
const MIN_DISTANCE: f32 = 1.0;

/// A node of an explored (query result) graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploredNode {
    pub id: NodeId,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl ExploredNode {
    pub fn new(id: impl Into<NodeId>, labels: &[&str]) -> Self {
        Self {
            id: id.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: BTreeMap::new(),
        }
    }

    pub fn primary_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// Text shown on the node: a `name` property if present, else the id.
    pub fn display_name(&self) -> String {
        match self.properties.get("name") {
            Some(serde_json::Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => self.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploredEdge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl ExploredEdge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, kind: &str) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploredGraph {
    pub nodes: Vec<ExploredNode>,
    #[serde(default)]
    pub edges: Vec<ExploredEdge>,
}

impl ExploredGraph {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn node(&self, id: &NodeId) -> Option<&ExploredNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Read-only view of the editor's graph. The sub-type (or the node type
    /// when there is none) becomes the primary label.
    pub fn from_editor(nodes: &[EditorNode], edges: &[EditorEdge]) -> Self {
        let nodes = nodes
            .iter()
            .map(|node| {
                let mut labels = Vec::new();
                if !node.sub_type.is_empty() {
                    labels.push(node.sub_type.clone());
                }
                labels.push(node.node_type.label().to_string());

                let mut properties = BTreeMap::new();
                properties.insert("name".to_string(), node.label.clone().into());
                if let Some(description) = &node.data.description {
                    properties.insert("description".to_string(), description.clone().into());
                }
                if let Some(data_type) = &node.data.data_type {
                    properties.insert("dataType".to_string(), data_type.clone().into());
                }
                for (key, value) in &node.data.properties {
                    properties.insert(key.clone(), value.clone().into());
                }
                ExploredNode {
                    id: node.id.clone(),
                    labels,
                    properties,
                }
            })
            .collect();
        let edges = edges
            .iter()
            .map(|edge| ExploredEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                kind: edge.label.clone(),
            })
            .collect();
        Self { nodes, edges }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug, Clone)]
pub struct ForceSimulation {
    params: ForceParams,
    center: Vec2,
    ids: Vec<NodeId>,
    bodies: Vec<Body>,
    springs: Vec<(usize, usize)>,
    dragged: Option<usize>,
}

impl ForceSimulation {
    /// Place every node near `center` with random jitter to break symmetry.
    pub fn new<R: Rng + ?Sized>(
        graph: &ExploredGraph,
        center: Vec2,
        params: ForceParams,
        rng: &mut R,
    ) -> Self {
        let jitter = params.jitter.abs();
        let mut ids = Vec::with_capacity(graph.nodes.len());
        let mut bodies = Vec::with_capacity(graph.nodes.len());
        let mut index = HashMap::new();
        for node in &graph.nodes {
            if index.contains_key(&node.id) {
                tracing::debug!("Explorer ignored duplicate node {}", node.id);
                continue;
            }
            index.insert(node.id.clone(), ids.len());
            ids.push(node.id.clone());
            let offset = Vec2::new(
                rng.random_range(-jitter..=jitter),
                rng.random_range(-jitter..=jitter),
            );
            bodies.push(Body {
                position: center + offset,
                velocity: Vec2::ZERO,
            });
        }

        let springs = graph
            .edges
            .iter()
            .filter_map(|edge| match (index.get(&edge.source), index.get(&edge.target)) {
                (Some(&a), Some(&b)) if a != b => Some((a, b)),
                (Some(_), Some(_)) => None,
                _ => {
                    tracing::debug!(
                        "Explorer skipped edge {} -> {} with unknown endpoint",
                        edge.source,
                        edge.target
                    );
                    None
                }
            })
            .collect();

        Self {
            params,
            center,
            ids,
            bodies,
            springs,
            dragged: None,
        }
    }

    /// Build a simulation with explicit starting positions.
    ///
    /// Springs must reference two distinct indices into `nodes`; any other
    /// pair is dropped.
    pub fn with_positions(
        nodes: Vec<(NodeId, Vec2)>,
        springs: Vec<(usize, usize)>,
        center: Vec2,
        params: ForceParams,
    ) -> Self {
        let (ids, bodies): (Vec<NodeId>, Vec<Body>) = nodes
            .into_iter()
            .map(|(id, position)| {
                (
                    id,
                    Body {
                        position,
                        velocity: Vec2::ZERO,
                    },
                )
            })
            .unzip();
        let len = bodies.len();
        let springs = springs
            .into_iter()
            .filter(|&(a, b)| {
                let valid = a < len && b < len && a != b;
                if !valid {
                    tracing::debug!("Explorer dropped spring {a} -> {b} for {len} nodes");
                }
                valid
            })
            .collect();
        Self {
            params,
            center,
            ids,
            bodies,
            springs,
            dragged: None,
        }
    }

    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn springs(&self) -> &[(usize, usize)] {
        &self.springs
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.ids.iter().position(|n| n == id)
    }

    pub fn position(&self, id: &NodeId) -> Option<Vec2> {
        self.index_of(id).map(|i| self.bodies[i].position)
    }

    /// Top-most node whose circle contains `world`.
    pub fn node_at(&self, world: Vec2) -> Option<&NodeId> {
        let radius_sq = self.params.node_radius * self.params.node_radius;
        self.bodies
            .iter()
            .enumerate()
            .rev()
            .find(|(_, body)| (body.position - world).length_sq() <= radius_sq)
            .map(|(i, _)| &self.ids[i])
    }

    pub fn dragged(&self) -> Option<&NodeId> {
        self.dragged.map(|i| &self.ids[i])
    }

    /// Pin `id` to `world`; it stays there, motionless, until released.
    pub fn drag(&mut self, id: &NodeId, world: Vec2) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        self.dragged = Some(i);
        self.bodies[i].position = world;
        self.bodies[i].velocity = Vec2::ZERO;
        true
    }

    pub fn release(&mut self) {
        self.dragged = None;
    }

    /// Total kinetic energy; useful to tell whether the layout has settled.
    pub fn energy(&self) -> f32 {
        self.bodies.iter().map(|b| b.velocity.length_sq()).sum()
    }

    /// Advance the layout by one frame. `dt` is measured in frames (1.0 at
    /// the display's nominal refresh rate).
    pub fn step(&mut self, dt: f32) {
        let n = self.bodies.len();
        if n == 0 {
            return;
        }
        let p = self.params;
        let mut forces = vec![Vec2::ZERO; n];
        let dragged = self.dragged;

        // Repulsion between all pairs within the cutoff.
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.bodies[i].position - self.bodies[j].position;
                let raw = delta.length();
                if raw > p.repulsion_cutoff {
                    continue;
                }
                let dist = raw.max(MIN_DISTANCE);
                let dir = if raw > f32::EPSILON {
                    delta / raw
                } else {
                    Vec2::new(1.0, 0.0)
                };
                let push = dir * (p.repulsion / (dist * dist));
                forces[i] += push;
                forces[j] -= push;
            }
        }

        // Springs toward the rest length.
        for &(a, b) in &self.springs {
            let delta = self.bodies[b].position - self.bodies[a].position;
            let dist = delta.length();
            if dist <= f32::EPSILON {
                continue;
            }
            let pull = delta / dist * ((dist - p.rest_length) * p.stiffness);
            forces[a] += pull;
            forces[b] -= pull;
        }

        for (i, force) in forces.iter_mut().enumerate() {
            *force += (self.center - self.bodies[i].position) * p.gravity;
        }

        for (i, body) in self.bodies.iter_mut().enumerate() {
            if dragged == Some(i) {
                body.velocity = Vec2::ZERO;
                continue;
            }
            body.velocity = (body.velocity + forces[i] * dt) * p.damping;
            body.position += body.velocity * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pair() -> ForceSimulation {
        ForceSimulation::with_positions(
            vec![
                (NodeId::from("a"), Vec2::new(350.0, 300.0)),
                (NodeId::from("b"), Vec2::new(450.0, 300.0)),
            ],
            vec![(0, 1)],
            Vec2::new(400.0, 300.0),
            ForceParams::default(),
        )
    }

    #[test]
    fn test_two_nodes_settle_near_rest_length() {
        let mut sim = pair();
        for _ in 0..2000 {
            sim.step(1.0);
        }
        let a = sim.bodies()[0].position;
        let b = sim.bodies()[1].position;
        let d = a.distance(b);
        assert!((d - 120.0).abs() < 5.0, "distance {d}");
        assert!(sim.energy() < 1e-3);
    }

    #[test]
    fn test_invalid_springs_are_dropped() {
        let mut sim = ForceSimulation::with_positions(
            vec![
                (NodeId::from("a"), Vec2::new(350.0, 300.0)),
                (NodeId::from("b"), Vec2::new(450.0, 300.0)),
            ],
            vec![(0, 1), (0, 2), (7, 1), (1, 1)],
            Vec2::new(400.0, 300.0),
            ForceParams::default(),
        );
        assert_eq!(sim.springs(), &[(0, 1)]);
        for _ in 0..10 {
            sim.step(1.0);
        }
        assert!(sim.bodies().iter().all(|b| b.position.x.is_finite()));
    }

    #[test]
    fn test_dragged_node_stays_pinned() {
        let mut sim = pair();
        let target = Vec2::new(10.0, 20.0);
        assert!(sim.drag(&NodeId::from("a"), target));
        for _ in 0..50 {
            sim.step(1.0);
        }
        assert_eq!(sim.position(&NodeId::from("a")), Some(target));
        assert_eq!(sim.bodies()[0].velocity, Vec2::ZERO);
        // The free endpoint is pulled toward the pinned one.
        let b = sim.position(&NodeId::from("b")).unwrap();
        assert!(b.distance(target) < Vec2::new(450.0, 300.0).distance(target));

        sim.release();
        assert_eq!(sim.dragged(), None);
        assert!(!sim.drag(&NodeId::from("missing"), target));
    }

    #[test]
    fn test_initial_jitter_stays_in_box() {
        let graph = ExploredGraph {
            nodes: (0..20).map(|i| ExploredNode::new(format!("n{i}"), &["Thing"])).collect(),
            edges: vec![
                ExploredEdge::new("n0", "n1", "REL"),
                ExploredEdge::new("n0", "ghost", "REL"),
            ],
        };
        let center = Vec2::new(100.0, 100.0);
        let mut rng = StdRng::seed_from_u64(7);
        let sim = ForceSimulation::new(&graph, center, ForceParams::default(), &mut rng);
        assert_eq!(sim.len(), 20);
        assert_eq!(sim.springs(), &[(0usize, 1usize)][..]);
        for body in sim.bodies() {
            assert!((body.position.x - center.x).abs() <= 50.0);
            assert!((body.position.y - center.y).abs() <= 50.0);
        }
    }

    #[test]
    fn test_coincident_nodes_separate() {
        let mut sim = ForceSimulation::with_positions(
            vec![
                (NodeId::from("a"), Vec2::new(0.0, 0.0)),
                (NodeId::from("b"), Vec2::new(0.0, 0.0)),
            ],
            Vec::new(),
            Vec2::ZERO,
            ForceParams::default(),
        );
        sim.step(1.0);
        let d = sim.bodies()[0].position.distance(sim.bodies()[1].position);
        assert!(d > 1.0);
    }

    #[test]
    fn test_cutoff_disables_far_repulsion() {
        let params = ForceParams {
            gravity: 0.0,
            ..ForceParams::default()
        };
        let mut sim = ForceSimulation::with_positions(
            vec![
                (NodeId::from("a"), Vec2::new(0.0, 0.0)),
                (NodeId::from("b"), Vec2::new(600.0, 0.0)),
            ],
            Vec::new(),
            Vec2::ZERO,
            params,
        );
        sim.step(1.0);
        assert_eq!(sim.bodies()[0].position, Vec2::ZERO);
    }

    #[test]
    fn test_node_at_prefers_top_most() {
        let sim = ForceSimulation::with_positions(
            vec![
                (NodeId::from("under"), Vec2::new(0.0, 0.0)),
                (NodeId::from("over"), Vec2::new(10.0, 0.0)),
            ],
            Vec::new(),
            Vec2::ZERO,
            ForceParams::default(),
        );
        assert_eq!(sim.node_at(Vec2::new(5.0, 0.0)), Some(&NodeId::from("over")));
        assert_eq!(sim.node_at(Vec2::new(-20.0, 0.0)), Some(&NodeId::from("under")));
        assert_eq!(sim.node_at(Vec2::new(100.0, 100.0)), None);
    }

    #[test]
    fn test_graph_from_editor() {
        let mut customer = EditorNode::new("c", "Customer", 0.0, 0.0);
        customer.sub_type = "entity".into();
        customer.data.description = Some("Buys things".into());
        let order = EditorNode::new("o", "Order", 300.0, 0.0);
        let mut places = EditorEdge::new("e", "c", "o");
        places.label = "PLACES".into();

        let graph = ExploredGraph::from_editor(&[customer, order], &[places]);
        assert_eq!(graph.nodes[0].labels, vec!["entity", "Technical"]);
        assert_eq!(graph.nodes[0].display_name(), "Customer");
        assert_eq!(graph.nodes[0].properties["description"], serde_json::json!("Buys things"));
        assert_eq!(graph.nodes[1].primary_label(), Some("Technical"));
        assert_eq!(graph.edges[0].kind, "PLACES");
    }

    #[test]
    fn test_graph_from_json() {
        let graph = ExploredGraph::from_json(
            r#"{"nodes":[{"id":"1","labels":["Person"],"properties":{"name":"Ada","born":1815}}],
                "edges":[{"source":"1","target":"1","type":"KNOWS"}]}"#,
        )
        .unwrap();
        let node = &graph.nodes[0];
        assert_eq!(node.primary_label(), Some("Person"));
        assert_eq!(node.display_name(), "Ada");
        assert_eq!(node.properties["born"], serde_json::json!(1815));
        assert_eq!(graph.edges[0].kind, "KNOWS");
    }
}
