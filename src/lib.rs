//! CorteX Map engine: reconnaissance relationship graphs
//!
//! Turns raw reconnaissance payloads into an interactive relationship
//! graph and paginated reports. The pipeline is headless; a rendering
//! shell draws from the positions and palettes exposed here.
//!
//! - [`payload`]: tolerant payload model (`ScanResult`)
//! - [`graph`]: normalizer, grouping, layout strategies, camera, filters
//! - [`export`]: JSON / PDF / PNG report artifacts
//!
//! # Usage
//!
//! ```ignore
//! let mut view = GraphView::new(Vec2::new(1280.0, 800.0));
//! view.set_payload(scan_json);
//! view.tick(dt); // each frame, force mode
//! ```

pub mod error;
pub mod export;
pub mod graph;
pub mod payload;

pub use error::ExportError;
pub use export::{ExportSettings, Exporter, Scene};
pub use graph::{GraphView, LayoutMode};
pub use payload::ScanResult;
