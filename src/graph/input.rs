//! Pointer gesture machine
//!
//! One explicit state machine drives every pointer interaction. A press
//! that lands on a node starts a node drag (the body is pinned in the
//! force layout for the duration); a press on empty canvas starts a pan.
//! The two are mutually exclusive by construction. `pointer_leave` resets
//! gesture and hover state completely, so a drag interrupted by the
//! pointer leaving the surface cannot leak a pinned body.

use egui::Pos2;

use super::camera::Camera;
use super::filter::HoverState;
use super::force_sim::ForceLayout;
use super::spatial::SpatialIndex;
use super::types::GraphData;

/// Model-space slack around a node disc for press/hover resolution
pub const HIT_THRESHOLD: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    DraggingNode { id: String },
    PanningCanvas { last: Pos2 },
}

/// Translates pointer events into camera, layout and hover mutations
#[derive(Debug, Clone)]
pub struct InputController {
    gesture: Gesture,
}

impl Default for InputController {
    fn default() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::DraggingNode { .. })
    }

    /// Press: node hit starts a drag, empty canvas starts a pan
    pub fn pointer_down(
        &mut self,
        screen: Pos2,
        camera: &Camera,
        index: &SpatialIndex,
        layout: &mut ForceLayout,
    ) {
        let model = camera.screen_to_model(screen);
        match index.hit_test([model.x, model.y], HIT_THRESHOLD) {
            Some(node) => {
                layout.pin(&node.id, model);
                self.gesture = Gesture::DraggingNode {
                    id: node.id.clone(),
                };
            }
            None => {
                self.gesture = Gesture::PanningCanvas { last: screen };
            }
        }
    }

    /// Move: drive the active gesture, or update hover when idle
    pub fn pointer_move(
        &mut self,
        screen: Pos2,
        camera: &mut Camera,
        index: &SpatialIndex,
        layout: &mut ForceLayout,
        hover: &mut HoverState,
        graph: &GraphData,
    ) {
        match &mut self.gesture {
            Gesture::DraggingNode { id } => {
                let model = camera.screen_to_model(screen);
                layout.pin(id, model);
            }
            Gesture::PanningCanvas { last } => {
                let delta = screen - *last;
                *last = screen;
                camera.pan(delta.x, delta.y);
            }
            Gesture::Idle => {
                let model = camera.screen_to_model(screen);
                match index.hit_test([model.x, model.y], HIT_THRESHOLD) {
                    Some(node) if hover.hovered.as_deref() != Some(node.id.as_str()) => {
                        hover.set(graph, &node.id);
                    }
                    Some(_) => {}
                    None => hover.clear(),
                }
            }
        }
    }

    /// Release: a dragged body rejoins the simulation after its cool-down
    pub fn pointer_up(&mut self, layout: &mut ForceLayout) {
        if let Gesture::DraggingNode { id } = &self.gesture {
            layout.release(id);
        }
        self.gesture = Gesture::Idle;
    }

    /// Pointer left the surface: full reset of gesture and hover
    pub fn pointer_leave(&mut self, layout: &mut ForceLayout, hover: &mut HoverState) {
        if let Gesture::DraggingNode { id } = &self.gesture {
            layout.release(id);
        }
        self.gesture = Gesture::Idle;
        hover.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::normalize::{build_graph, NormalizeOptions};
    use crate::graph::spatial::SpatialNode;
    use crate::payload::ScanResult;
    use egui::Vec2;
    use serde_json::json;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn fixture() -> (GraphData, ForceLayout, SpatialIndex, Camera) {
        let graph = build_graph(
            &ScanResult::parse(json!({
                "target": "ex.com",
                "subdomains": ["a.ex.com"]
            })),
            &NormalizeOptions::default(),
        );
        let mut layout = ForceLayout::new(&graph, VIEWPORT);
        // Park the bodies at known spots for hit testing
        layout.pin("domain-ex.com", Pos2::new(100.0, 100.0));
        layout.release("domain-ex.com");
        layout.stop();
        let mut index = SpatialIndex::new();
        index.rebuild(std::iter::once(SpatialNode::new(
            "domain-ex.com",
            [100.0, 100.0],
            30.0,
        )));
        let camera = Camera::free_view(VIEWPORT);
        (graph, layout, index, camera)
    }

    #[test]
    fn test_press_on_node_starts_drag_and_pins() {
        let (_graph, mut layout, index, camera) = fixture();
        let mut input = InputController::new();
        input.pointer_down(Pos2::new(100.0, 100.0), &camera, &index, &mut layout);

        assert!(input.is_dragging());
        // Move drags the pinned body along
        let mut camera = camera;
        let mut hover = HoverState::default();
        let graph = GraphData::default();
        input.pointer_move(
            Pos2::new(140.0, 130.0),
            &mut camera,
            &index,
            &mut layout,
            &mut hover,
            &graph,
        );
        assert_eq!(
            layout.position_of("domain-ex.com"),
            Some(Pos2::new(140.0, 130.0))
        );
        // Camera untouched while dragging a node
        assert_eq!(camera.transform.x, 0.0);
    }

    #[test]
    fn test_press_on_empty_canvas_pans() {
        let (graph, mut layout, index, mut camera) = fixture();
        let mut input = InputController::new();
        let mut hover = HoverState::default();

        input.pointer_down(Pos2::new(500.0, 500.0), &camera, &index, &mut layout);
        assert_eq!(
            *input.gesture(),
            Gesture::PanningCanvas {
                last: Pos2::new(500.0, 500.0)
            }
        );

        input.pointer_move(
            Pos2::new(520.0, 490.0),
            &mut camera,
            &index,
            &mut layout,
            &mut hover,
            &graph,
        );
        assert!((camera.transform.x - 20.0).abs() < 1e-4);
        assert!((camera.transform.y + 10.0).abs() < 1e-4);
        // Node untouched while panning
        assert_eq!(
            layout.position_of("domain-ex.com"),
            Some(Pos2::new(100.0, 100.0))
        );
    }

    #[test]
    fn test_release_returns_to_idle() {
        let (_graph, mut layout, index, camera) = fixture();
        let mut input = InputController::new();
        input.pointer_down(Pos2::new(100.0, 100.0), &camera, &index, &mut layout);
        input.pointer_up(&mut layout);
        assert_eq!(*input.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_idle_move_updates_hover() {
        let (graph, mut layout, index, mut camera) = fixture();
        let mut input = InputController::new();
        let mut hover = HoverState::default();

        input.pointer_move(
            Pos2::new(100.0, 100.0),
            &mut camera,
            &index,
            &mut layout,
            &mut hover,
            &graph,
        );
        assert_eq!(hover.hovered.as_deref(), Some("domain-ex.com"));

        input.pointer_move(
            Pos2::new(700.0, 500.0),
            &mut camera,
            &index,
            &mut layout,
            &mut hover,
            &graph,
        );
        assert!(!hover.is_active());
    }

    #[test]
    fn test_leave_resets_gesture_and_hover() {
        let (graph, mut layout, index, mut camera) = fixture();
        let mut input = InputController::new();
        let mut hover = HoverState::default();
        input.pointer_move(
            Pos2::new(100.0, 100.0),
            &mut camera,
            &index,
            &mut layout,
            &mut hover,
            &graph,
        );
        input.pointer_down(Pos2::new(100.0, 100.0), &camera, &index, &mut layout);
        input.pointer_leave(&mut layout, &mut hover);

        assert_eq!(*input.gesture(), Gesture::Idle);
        assert!(!hover.is_active());
    }
}
