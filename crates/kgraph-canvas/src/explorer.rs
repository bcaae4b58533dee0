//! Read-only graph explorer: a force layout plus its own pan/zoom and
//! selection, driven by a per-frame tick.

use crate::force_layout::{ExploredGraph, ExploredNode, ForceParams, ForceSimulation};
use kgraph_core::{NodeId, Vec2, ViewTransform, ZoomBounds};
use rand::Rng;

/// Per-pixel wheel zoom rate of the explorer.
pub const EXPLORER_WHEEL_SENSITIVITY: f32 = 0.001;

/// Identifies the frame loop a tick was scheduled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Self-rescheduling animation loop.
///
/// Every `start` invalidates previously issued tokens, so a tick queued
/// against old data becomes a no-op instead of animating a stale graph.
#[derive(Debug, Default)]
pub struct FrameLoop {
    generation: u64,
    running: bool,
}

impl FrameLoop {
    pub fn start(&mut self) -> FrameToken {
        self.generation += 1;
        self.running = true;
        tracing::trace!("Frame loop started, generation {}", self.generation);
        FrameToken(self.generation)
    }

    pub fn cancel(&mut self) {
        if self.running {
            tracing::trace!("Frame loop cancelled, generation {}", self.generation);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_current(&self, token: FrameToken) -> bool {
        self.running && token.0 == self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    Panning {
        last: Vec2,
    },
    Dragging,
}

#[derive(Debug)]
pub struct ExplorerView {
    params: ForceParams,
    graph: Option<ExploredGraph>,
    simulation: Option<ForceSimulation>,
    view: ViewTransform,
    bounds: ZoomBounds,
    frame: FrameLoop,
    token: Option<FrameToken>,
    selected: Option<NodeId>,
    gesture: Gesture,
}

impl Default for ExplorerView {
    fn default() -> Self {
        Self::new(ForceParams::default())
    }
}

impl ExplorerView {
    pub fn new(params: ForceParams) -> Self {
        Self {
            params,
            graph: None,
            simulation: None,
            view: ViewTransform::IDENTITY,
            bounds: ZoomBounds::EXPLORER,
            frame: FrameLoop::default(),
            token: None,
            selected: None,
            gesture: Gesture::Idle,
        }
    }

    pub fn set_params(&mut self, params: ForceParams) {
        self.params = params;
    }

    /// Replace the explored graph and restart the animation loop.
    pub fn load<R: Rng + ?Sized>(
        &mut self,
        graph: ExploredGraph,
        viewport: Vec2,
        rng: &mut R,
    ) -> FrameToken {
        self.view = ViewTransform::IDENTITY;
        self.selected = None;
        self.gesture = Gesture::Idle;
        let simulation = ForceSimulation::new(&graph, viewport / 2.0, self.params, rng);
        tracing::debug!(
            "Explorer loaded {} node(s), {} spring(s)",
            simulation.len(),
            simulation.springs().len()
        );
        self.simulation = Some(simulation);
        self.graph = Some(graph);
        let token = self.frame.start();
        self.token = Some(token);
        token
    }

    /// Stop the loop and drop the graph.
    pub fn close(&mut self) {
        self.frame.cancel();
        self.token = None;
        self.simulation = None;
        self.graph = None;
        self.selected = None;
        self.gesture = Gesture::Idle;
    }

    pub fn is_open(&self) -> bool {
        self.simulation.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_running()
    }

    /// Token of the currently scheduled loop, if any.
    pub fn token(&self) -> Option<FrameToken> {
        self.token
    }

    /// Run one animation frame. Returns whether the caller should schedule
    /// another tick with the same token.
    pub fn tick(&mut self, token: FrameToken, dt: f32) -> bool {
        if !self.frame.is_current(token) {
            return false;
        }
        match self.simulation.as_mut() {
            Some(simulation) => {
                simulation.step(dt);
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn simulation(&self) -> Option<&ForceSimulation> {
        self.simulation.as_ref()
    }

    pub fn graph(&self) -> Option<&ExploredGraph> {
        self.graph.as_ref()
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Labels and properties of the selected node, for the side panel.
    pub fn selected_details(&self) -> Option<&ExploredNode> {
        let id = self.selected.as_ref()?;
        self.graph.as_ref()?.node(id)
    }

    /// Resize keeps the layout gravitating toward the middle of the viewport.
    ///
    /// The gravity center is a world-space point derived from the viewport size
    /// alone; pan and zoom only affect drawing.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.set_center(viewport / 2.0);
        }
    }

    /// `screen` is relative to the explorer canvas origin.
    pub fn pointer_down(&mut self, screen: Vec2) {
        let world = self.view.screen_to_world(screen);
        let hit = self
            .simulation
            .as_ref()
            .and_then(|simulation| simulation.node_at(world))
            .cloned();

        match (hit, self.simulation.as_mut()) {
            (Some(id), Some(simulation)) => {
                simulation.drag(&id, world);
                self.selected = Some(id);
                self.gesture = Gesture::Dragging;
            }
            _ => {
                self.selected = None;
                self.gesture = Gesture::Panning { last: screen };
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Vec2) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Panning { last } => {
                self.view.pan += screen - last;
                self.gesture = Gesture::Panning { last: screen };
            }
            Gesture::Dragging => {
                let world = self.view.screen_to_world(screen);
                if let (Some(simulation), Some(id)) = (self.simulation.as_mut(), &self.selected)
                {
                    simulation.drag(id, world);
                }
            }
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.release();
        }
        self.gesture = Gesture::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// Zoom about `screen`, keeping the world point under the pointer fixed.
    pub fn wheel(&mut self, screen: Vec2, delta_y: f32) {
        let anchor = self.view.screen_to_world(screen);
        let zoom = self
            .bounds
            .clamp(self.view.zoom * (-delta_y * EXPLORER_WHEEL_SENSITIVITY).exp());
        self.view = ViewTransform::new(screen - anchor * zoom, zoom);
    }
}
