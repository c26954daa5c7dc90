//! End-to-end pipeline: payload in, interactive graph and artifacts out

use cortex_map::export::{json_filename, pdf_filename, png_filename};
use cortex_map::graph::GroupingSettings;
use cortex_map::{ExportSettings, Exporter, GraphView, LayoutMode, Scene, ScanResult};
use egui::{Pos2, Vec2};
use serde_json::json;

const VIEWPORT: Vec2 = Vec2::new(1280.0, 800.0);

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn payload() -> serde_json::Value {
    let subdomains: Vec<serde_json::Value> = (0..60)
        .map(|i| {
            json!({
                "name": format!("{}.h{}.ex.com", ["api", "dev", "prod"][i % 3], i),
                "ips": [format!("10.0.{}.1", i % 8)]
            })
        })
        .collect();
    json!({
        "target": "ex.com",
        "subdomains": subdomains,
        "ips": ["203.0.113.7"],
        "services": [
            {"ip": "10.0.0.1", "port": 80, "service": "http", "status": "open"},
            {"ip": "10.0.0.1", "port": 22, "service": "ssh", "status": "open"}
        ]
    })
}

#[test]
fn payload_to_interactive_graph() {
    init_logging();
    let mut view = GraphView::new(VIEWPORT);
    view.set_payload(payload());

    assert_eq!(view.target(), Some("ex.com"));
    assert!(view.graph().nodes.len() > 60);

    // Force layout converges and the scene stays hit-testable
    for _ in 0..200 {
        view.tick(1.0 / 60.0);
    }
    let positions = view.positions();
    assert_eq!(positions.len(), view.graph().nodes.len());

    let target_pos = positions["domain-ex.com"];
    view.pointer_move(view.camera().model_to_screen(target_pos));
    assert_eq!(view.hover().hovered.as_deref(), Some("domain-ex.com"));
    assert!(!view.hover().neighbors.is_empty());

    // Drag the target somewhere else, then pan from empty space
    view.pointer_down(view.camera().model_to_screen(target_pos));
    view.pointer_move(Pos2::new(50.0, 50.0));
    view.pointer_up();
    let moved = view.positions()["domain-ex.com"];
    assert_eq!(moved, view.camera().screen_to_model(Pos2::new(50.0, 50.0)));
}

#[test]
fn grouping_and_radial_work_off_the_same_build() {
    let mut view = GraphView::new(VIEWPORT);
    view.set_payload(payload());
    let plain_nodes = view.graph().nodes.len();

    view.set_grouping(GroupingSettings {
        enabled: true,
        threshold: 50,
    });
    assert!(view.graph().nodes.len() < plain_nodes);

    view.set_mode(LayoutMode::Radial);
    let a = view.positions();
    view.tick(1.0 / 60.0);
    assert_eq!(a, view.positions(), "radial positions must not drift");

    // Zoom range tightens in radial mode
    for _ in 0..20 {
        view.camera_mut().zoom_in();
    }
    assert!(view.camera().zoom() <= 2.0 + 1e-4);

    view.set_grouping(GroupingSettings {
        enabled: false,
        threshold: 50,
    });
    assert_eq!(view.graph().nodes.len(), plain_nodes);
}

#[test]
fn export_all_three_artifacts() {
    init_logging();
    let mut view = GraphView::new(VIEWPORT);
    view.set_payload(payload());
    for _ in 0..60 {
        view.tick(1.0 / 60.0);
    }

    let scan = ScanResult::parse(payload());
    let scene = Scene::capture(&view);
    let exporter = Exporter::new();
    let settings = ExportSettings::default();
    let dir = tempfile::tempdir().expect("tempdir");

    let json_path = exporter
        .export_json(&scan, &settings, dir.path())
        .expect("json export");
    let pdf_path = exporter
        .export_pdf(&scan, Some(&scene), &settings, dir.path())
        .expect("pdf export");
    let png_path = exporter
        .export_png(&scene, "ex.com", dir.path())
        .expect("png export");

    assert!(json_path.ends_with(json_filename("ex.com")));
    assert!(pdf_path.ends_with(pdf_filename("ex.com")));
    assert!(png_path.ends_with(png_filename("ex.com")));

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).expect("readable"))
            .expect("valid json");
    assert_eq!(doc["target"], "ex.com");
    assert_eq!(doc["subdomains"].as_array().map(Vec::len), Some(60));

    let pdf = std::fs::read(&pdf_path).expect("readable");
    assert!(pdf.starts_with(b"%PDF-"));
    let png = std::fs::read(&png_path).expect("readable");
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
}

#[test]
fn malformed_payloads_never_panic() {
    let mut view = GraphView::new(VIEWPORT);
    for value in [
        json!(null),
        json!("just a string"),
        json!({"target": 42, "subdomains": {"not": "a list"}}),
        json!({"subdomains": [null, 17, {"wrong": "shape"}]}),
    ] {
        view.set_payload(value);
        view.tick(1.0 / 60.0);
    }
    // A payload with no target still yields a usable (possibly empty) view
    assert!(view.target().is_none());
}
