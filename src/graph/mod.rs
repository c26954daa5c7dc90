//! Relationship graph engine
//!
//! # Architecture
//!
//! ```text
//! ScanResult (payload.rs)
//!        │
//!        ▼
//! normalize::build_graph ──► GraphData (base)
//!        │
//!        ▼
//! grouping (tags + optional collapse) ──► GraphData (derived)
//!        │
//!        ├──► force_sim / radial (positions arena)
//!        │          │
//!        │          └──► spatial (R-tree over positions)
//!        │
//!        ├──► filter (visibility / search / hover overlays)
//!        │
//!        └──► input (gesture machine) ──► camera (pan/zoom)
//! ```
//!
//! `GraphView` wires the stages together. `GraphData` is rebuilt, never
//! mutated; the force arena is the sole writer of positions; the camera
//! survives rebuilds while positions do not.

pub mod camera;
pub mod colors;
pub mod filter;
pub mod force_sim;
pub mod grouping;
pub mod input;
pub mod normalize;
pub mod radial;
pub mod spatial;
pub mod types;

pub use camera::{Camera, ViewTransform};
pub use filter::{FilterState, HoverState};
pub use force_sim::ForceLayout;
pub use grouping::GroupingSettings;
pub use input::{Gesture, InputController};
pub use normalize::NormalizeOptions;
pub use spatial::{SpatialIndex, SpatialNode};
pub use types::*;

use std::collections::HashMap;

use egui::{Pos2, Vec2};
use tracing::info;

use crate::payload::ScanResult;

/// Layout strategy for the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Continuous force relaxation, free pan/zoom
    #[default]
    Force,
    /// Deterministic rings around the target, tighter zoom range
    Radial,
}

// =============================================================================
// GRAPH VIEW
// =============================================================================

/// Owns the whole pipeline for one view: graphs, layout, camera, filters
/// and the gesture machine.
pub struct GraphView {
    target: Option<String>,
    /// Normalized graph with group tags assigned; grouping re-derives
    /// from this, so toggling grouping off restores it exactly
    base: GraphData,
    /// The graph currently displayed (collapsed when grouping is on)
    graph: GraphData,
    layout: ForceLayout,
    /// Radial positions, recomputed on rebuild when in radial mode
    radial_positions: HashMap<String, Pos2>,
    mode: LayoutMode,
    camera: Camera,
    filter: FilterState,
    hover: HoverState,
    grouping: GroupingSettings,
    input: InputController,
    index: SpatialIndex,
    normalize: NormalizeOptions,
    viewport: Vec2,
}

impl GraphView {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            target: None,
            base: GraphData::default(),
            graph: GraphData::default(),
            layout: ForceLayout::new(&GraphData::default(), viewport),
            radial_positions: HashMap::new(),
            mode: LayoutMode::Force,
            camera: Camera::free_view(viewport),
            filter: FilterState::default(),
            hover: HoverState::default(),
            grouping: GroupingSettings::default(),
            input: InputController::new(),
            index: SpatialIndex::new(),
            normalize: NormalizeOptions::default(),
            viewport,
        }
    }

    // =========================================================================
    // REBUILD
    // =========================================================================

    /// Replace the payload. Rebuilds both graphs and reseeds the layout;
    /// the camera transform is preserved, positions are not.
    pub fn set_payload(&mut self, value: serde_json::Value) {
        // Stale ticks from the old simulation must not touch the new arena
        self.layout.stop();

        let scan = ScanResult::parse(value);
        self.target = scan.target.clone();
        let mut base = normalize::build_graph(&scan, &self.normalize);
        if let Some(target) = &self.target {
            grouping::assign_groups(&mut base, target);
        }
        self.base = base;
        self.derive(false);

        info!(
            target = self.target.as_deref().unwrap_or(""),
            nodes = self.graph.nodes.len(),
            edges = self.graph.edges.len(),
            "payload rebuilt"
        );
    }

    /// Change grouping settings. Re-derives from the stored base graph;
    /// surviving node ids keep their positions.
    pub fn set_grouping(&mut self, settings: GroupingSettings) {
        self.grouping = settings;
        self.layout.stop();
        self.derive(true);
    }

    fn derive(&mut self, keep_positions: bool) {
        let previous = keep_positions.then(|| self.layout.positions());

        self.graph = if self.grouping.enabled {
            let target = self.target.as_deref().unwrap_or("");
            grouping::collapse(&self.base, target, self.grouping.threshold)
        } else {
            self.base.clone()
        };

        self.layout = ForceLayout::new(&self.graph, self.viewport);
        if let Some(previous) = previous {
            self.layout.seed_positions(&previous);
        }
        self.radial_positions =
            radial::radial_positions(&self.graph, self.viewport, self.grouping.enabled);
        self.hover.clear();
        self.rebuild_index();
    }

    /// Switch layout strategy. The camera keeps its transform but adopts
    /// the strategy's zoom range (re-clamping the current scale).
    pub fn set_mode(&mut self, mode: LayoutMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        let transform = self.camera.transform;
        self.camera = match mode {
            LayoutMode::Force => Camera::free_view(self.viewport),
            LayoutMode::Radial => Camera::radial_view(self.viewport),
        };
        self.camera.transform = transform;
        self.camera.transform.k = self
            .camera
            .transform
            .k
            .clamp(self.camera.min_zoom, self.camera.max_zoom);
        self.rebuild_index();
    }

    /// Cap the number of nodes emitted per class on the next rebuild
    pub fn set_node_limit(&mut self, limit: Option<usize>) {
        self.normalize.node_limit = limit;
    }

    /// Frame the whole graph in the viewport with a margin
    pub fn fit_to_graph(&mut self, padding: f32) {
        let positions = self.positions();
        let mut bounds: Option<egui::Rect> = None;
        for node in &self.graph.nodes {
            if let Some(&pos) = positions.get(&node.id) {
                let disc = egui::Rect::from_center_size(pos, Vec2::splat(node.size * 2.0));
                bounds = Some(match bounds {
                    Some(rect) => rect.union(disc),
                    None => disc,
                });
            }
        }
        if let Some(bounds) = bounds {
            self.camera.fit_to_bounds(bounds, padding);
        }
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.camera.resize(viewport);
        self.radial_positions =
            radial::radial_positions(&self.graph, viewport, self.grouping.enabled);
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Advance the force simulation and refresh the hit-test index.
    /// No-op in radial mode.
    pub fn tick(&mut self, dt: f32) {
        if self.mode != LayoutMode::Force {
            return;
        }
        self.layout.tick(dt);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        let positions = self.positions();
        let graph = &self.graph;
        self.index.rebuild(graph.nodes.iter().filter_map(|n| {
            let pos = positions.get(&n.id)?;
            Some(SpatialNode::new(n.id.clone(), [pos.x, pos.y], n.size))
        }));
    }

    /// Current position of every node, from the active strategy
    pub fn positions(&self) -> HashMap<String, Pos2> {
        match self.mode {
            LayoutMode::Force => self.layout.positions(),
            LayoutMode::Radial => self.radial_positions.clone(),
        }
    }

    // =========================================================================
    // POINTER
    // =========================================================================

    pub fn pointer_down(&mut self, screen: Pos2) {
        self.input
            .pointer_down(screen, &self.camera, &self.index, &mut self.layout);
    }

    pub fn pointer_move(&mut self, screen: Pos2) {
        self.input.pointer_move(
            screen,
            &mut self.camera,
            &self.index,
            &mut self.layout,
            &mut self.hover,
            &self.graph,
        );
    }

    pub fn pointer_up(&mut self) {
        self.input.pointer_up(&mut self.layout);
    }

    pub fn pointer_leave(&mut self) {
        self.input.pointer_leave(&mut self.layout, &mut self.hover);
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn graph(&self) -> &GraphData {
        &self.graph
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Filter changes never touch the layout arena
    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn grouping(&self) -> &GroupingSettings {
        &self.grouping
    }
}
