//! Report Exporter
//!
//! Produces three artifacts from the current scan and scene:
//! - a schema-stable JSON snapshot ([`json`]),
//! - a paginated PDF report ([`pdf`]),
//! - a PNG render of the graph ([`snapshot`]).
//!
//! One export runs at a time. All three artifacts share a date-stamped
//! naming scheme, so a second export started while the first is writing
//! is rejected with [`ExportError::Busy`] instead of racing it.

pub mod json;
pub mod pdf;
pub mod snapshot;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use egui::{Color32, Pos2, Rect};
use tracing::info;

use crate::error::ExportError;
use crate::graph::colors;
use crate::graph::GraphView;
use crate::payload::ScanResult;

// =============================================================================
// SETTINGS
// =============================================================================

/// Which report sections to emit, and how
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub include_graph: bool,
    pub include_subdomains: bool,
    pub include_ips: bool,
    pub include_services: bool,
    /// Break tabular sections across pages at `items_per_page`
    pub paginate: bool,
    /// Cap the graph snapshot at 75% of a page's content height
    pub fit_to_page: bool,
    pub items_per_page: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            include_graph: true,
            include_subdomains: true,
            include_ips: true,
            include_services: true,
            paginate: true,
            fit_to_page: true,
            items_per_page: 40,
        }
    }
}

// =============================================================================
// ARTIFACT NAMES
// =============================================================================

fn date_stamp() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

pub fn json_filename(target: &str) -> String {
    format!("{}_{}.json", target, date_stamp())
}

pub fn pdf_filename(target: &str) -> String {
    format!("{}_relatório_{}.pdf", target, date_stamp())
}

pub fn png_filename(target: &str) -> String {
    format!("cortex-map-{}.png", target)
}

// =============================================================================
// SCENE
// =============================================================================

/// A drawable snapshot of the graph: visible nodes with resolved colors
/// and positions, plus visible edges as segments. Decoupled from the live
/// view so exporting does not hold the view borrowed.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub label: String,
    pub pos: Pos2,
    pub radius: f32,
    pub color: Color32,
}

#[derive(Debug, Clone)]
pub struct SceneEdge {
    pub from: Pos2,
    pub to: Pos2,
}

impl Scene {
    /// Capture the view's visible nodes and edges at their current
    /// positions
    pub fn capture(view: &GraphView) -> Self {
        let positions = view.positions();
        let filter = view.filter();
        let graph = view.graph();

        let nodes = filter
            .visible_nodes(graph)
            .into_iter()
            .filter_map(|n| {
                let pos = *positions.get(&n.id)?;
                Some(SceneNode {
                    label: n.label.clone(),
                    pos,
                    radius: n.size,
                    color: colors::node_color(n),
                })
            })
            .collect();

        let edges = filter
            .visible_edges(graph)
            .into_iter()
            .filter_map(|e| {
                Some(SceneEdge {
                    from: *positions.get(&e.source)?,
                    to: *positions.get(&e.target)?,
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounding box over node discs
    pub fn bounds(&self) -> Option<Rect> {
        let mut iter = self.nodes.iter();
        let first = iter.next()?;
        let mut rect = Rect::from_center_size(first.pos, egui::Vec2::splat(first.radius * 2.0));
        for node in iter {
            rect = rect.union(Rect::from_center_size(
                node.pos,
                egui::Vec2::splat(node.radius * 2.0),
            ));
        }
        Some(rect)
    }
}

// =============================================================================
// EXPORTER
// =============================================================================

/// Runs exports, one at a time
#[derive(Debug, Default)]
pub struct Exporter {
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the export ends, error paths included
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, ExportError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(ExportError::Busy);
        }
        Ok(InFlightGuard(&self.in_flight))
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Write the JSON snapshot into `dir`
    pub fn export_json(
        &self,
        scan: &ScanResult,
        settings: &ExportSettings,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let _guard = self.begin()?;
        let target = scan.target.as_deref().unwrap_or("scan");
        let path = dir.join(json_filename(target));
        let body = json::render(scan, settings);
        write_artifact(&path, body.as_bytes())?;
        info!(path = %path.display(), "json export written");
        Ok(path)
    }

    /// Write the paginated PDF report into `dir`. A missing or empty
    /// scene degrades to an in-document notice, never a failed export.
    pub fn export_pdf(
        &self,
        scan: &ScanResult,
        scene: Option<&Scene>,
        settings: &ExportSettings,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let _guard = self.begin()?;
        let target = scan.target.as_deref().unwrap_or("scan");
        let path = dir.join(pdf_filename(target));
        let body = pdf::render(scan, scene, settings)?;
        write_artifact(&path, &body)?;
        info!(path = %path.display(), "pdf export written");
        Ok(path)
    }

    /// Write the PNG scene render into `dir`
    pub fn export_png(
        &self,
        scene: &Scene,
        target: &str,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let _guard = self.begin()?;
        let path = dir.join(png_filename(target));
        let body = snapshot::render_png(scene)?;
        write_artifact(&path, &body)?;
        info!(path = %path.display(), "png export written");
        Ok(path)
    }
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphView;
    use egui::Vec2;
    use serde_json::json;

    #[test]
    fn test_artifact_names() {
        let date = date_stamp();
        assert_eq!(json_filename("ex.com"), format!("ex.com_{}.json", date));
        assert_eq!(
            pdf_filename("ex.com"),
            format!("ex.com_relatório_{}.pdf", date)
        );
        assert_eq!(png_filename("ex.com"), "cortex-map-ex.com.png");
    }

    #[test]
    fn test_scene_capture_covers_visible_graph() {
        let mut view = GraphView::new(Vec2::new(800.0, 600.0));
        view.set_payload(json!({
            "target": "ex.com",
            "subdomains": ["a.ex.com"],
            "ips": ["1.2.3.4"]
        }));
        let scene = Scene::capture(&view);
        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.edges.len(), view.graph().edges.len());
        assert!(scene.bounds().is_some());
    }

    #[test]
    fn test_exporter_rejects_concurrent_exports() {
        let exporter = Exporter::new();
        let guard = exporter.begin().expect("first export must start");
        assert!(matches!(exporter.begin(), Err(ExportError::Busy)));
        drop(guard);
        assert!(exporter.begin().is_ok());
    }

    #[test]
    fn test_export_json_writes_named_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = Exporter::new();
        let scan = ScanResult::parse(json!({"target": "ex.com", "subdomains": ["a.ex.com"]}));
        let path = exporter
            .export_json(&scan, &ExportSettings::default(), dir.path())
            .expect("export succeeds");
        assert!(path.ends_with(json_filename("ex.com")));
        assert!(path.exists());
    }

    #[test]
    fn test_write_failure_is_typed() {
        let exporter = Exporter::new();
        let scan = ScanResult::parse(json!({"target": "ex.com"}));
        let err = exporter
            .export_json(
                &scan,
                &ExportSettings::default(),
                Path::new("/nonexistent-dir-for-test"),
            )
            .expect_err("missing directory must fail");
        assert!(matches!(err, ExportError::Write { .. }));
        // And the busy flag is released on the error path
        assert!(!exporter.is_busy());
    }
}
