//! Paginated PDF report
//!
//! Landscape A4, composed with a running cursor from the top of the page.
//! Every block asks `ensure_space` before drawing; crossing the content
//! boundary starts a new page and re-emits the active section and column
//! headers. Tabular sections additionally break at `items_per_page` rows
//! when pagination is on.
//!
//! Footers cannot be drawn inline (the total page count is unknown until
//! layout finishes), so they are appended to every page afterwards.
//!
//! The graph snapshot is drawn as vector shapes, not an embedded image,
//! and is subject to the same space check as any other block.

use chrono::Local;
use lopdf::{dictionary, Document, Object, Stream};

use super::{ExportSettings, Scene};
use crate::error::ExportError;
use crate::graph::colors;
use crate::payload::ScanResult;
use egui::Color32;

const PAGE_W: f32 = 842.0;
const PAGE_H: f32 = 595.0;
/// 10 mm in points
const MARGIN: f32 = 28.0;
const FOOTER_SPACE: f32 = 24.0;
const ROW_H: f32 = 14.0;
const BODY_SIZE: f32 = 9.0;
const SECTION_SIZE: f32 = 14.0;
/// Graph snapshot never takes more than this share of the content height
const SNAPSHOT_MAX_RATIO: f32 = 0.75;
/// Bezier circle constant
const CIRCLE_K: f32 = 0.5523;

fn content_width() -> f32 {
    PAGE_W - MARGIN * 2.0
}

fn content_bottom() -> f32 {
    PAGE_H - MARGIN - FOOTER_SPACE
}

/// Render the full report to PDF bytes
pub fn render(
    scan: &ScanResult,
    scene: Option<&Scene>,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    assemble(compose_pages(scan, scene, settings))
}

// =============================================================================
// PAGE COMPOSITION
// =============================================================================

#[derive(Clone)]
struct Section {
    title: String,
    columns: Vec<&'static str>,
}

struct Composer<'a> {
    done: Vec<String>,
    current: String,
    /// Cursor measured from the top of the page
    y: f32,
    settings: &'a ExportSettings,
    /// Active tabular section, re-emitted after a page break
    section: Option<Section>,
    rows_on_page: usize,
}

impl<'a> Composer<'a> {
    fn new(settings: &'a ExportSettings) -> Self {
        Self {
            done: Vec::new(),
            current: String::new(),
            y: MARGIN,
            settings,
            section: None,
            rows_on_page: 0,
        }
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = MARGIN;
        self.rows_on_page = 0;
        if let Some(section) = self.section.clone() {
            self.emit_section_header(&section, true);
        }
    }

    /// Break to a new page unless `height` fits above the footer area
    fn ensure_space(&mut self, height: f32) {
        if self.y + height > content_bottom() {
            self.new_page();
        }
    }

    // --- primitive ops -------------------------------------------------------

    fn text(&mut self, x: f32, size: f32, bold: bool, color: Color32, s: &str) {
        let font = if bold { "F2" } else { "F1" };
        let (r, g, b) = rgb(color);
        // Baseline sits `size` below the cursor
        self.current.push_str(&format!(
            "BT /{} {:.1} Tf {:.3} {:.3} {:.3} rg {:.1} {:.1} Td ({}) Tj ET\n",
            font,
            size,
            r,
            g,
            b,
            x,
            PAGE_H - (self.y + size),
            escape(s),
        ));
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color32, width: f32) {
        let (r, g, b) = rgb(color);
        self.current.push_str(&format!(
            "{:.3} {:.3} {:.3} RG {:.2} w {:.1} {:.1} m {:.1} {:.1} l S\n",
            r,
            g,
            b,
            width,
            x0,
            PAGE_H - y0,
            x1,
            PAGE_H - y1,
        ));
    }

    fn disc(&mut self, cx: f32, cy: f32, radius: f32, color: Color32) {
        let (r, g, b) = rgb(color);
        let cy = PAGE_H - cy;
        let k = radius * CIRCLE_K;
        self.current.push_str(&format!(
            "{:.3} {:.3} {:.3} rg \
             {x0:.1} {cy:.1} m \
             {x0:.1} {y1:.1} {x1:.1} {y2:.1} {cx:.1} {y2:.1} c \
             {x2:.1} {y2:.1} {x3:.1} {y1:.1} {x3:.1} {cy:.1} c \
             {x3:.1} {y3:.1} {x2:.1} {y4:.1} {cx:.1} {y4:.1} c \
             {x1:.1} {y4:.1} {x0:.1} {y3:.1} {x0:.1} {cy:.1} c f\n",
            r,
            g,
            b,
            cx = cx,
            cy = cy,
            x0 = cx + radius,
            x1 = cx + k,
            x2 = cx - k,
            x3 = cx - radius,
            y1 = cy + k,
            y2 = cy + radius,
            y3 = cy - k,
            y4 = cy - radius,
        ));
    }

    // --- sections ------------------------------------------------------------

    fn emit_section_header(&mut self, section: &Section, continuation: bool) {
        let title = if continuation {
            format!("{} (cont.)", section.title)
        } else {
            section.title.clone()
        };
        self.text(MARGIN, SECTION_SIZE, true, ink(), &title);
        self.y += SECTION_SIZE + 8.0;

        let step = content_width() / section.columns.len() as f32;
        let columns = section.columns.clone();
        for (i, column) in columns.iter().enumerate() {
            self.text(MARGIN + step * i as f32, BODY_SIZE, true, ink(), column);
        }
        self.y += BODY_SIZE + 3.0;
        self.line(
            MARGIN,
            self.y,
            PAGE_W - MARGIN,
            self.y,
            Color32::from_gray(180),
            0.5,
        );
        self.y += 5.0;
    }

    /// Emit one tabular section: rows are `|`-joined cell strings, laid
    /// out at fixed column offsets
    fn table(&mut self, title: &str, columns: Vec<&'static str>, rows: &[String]) {
        let section = Section {
            title: title.to_string(),
            columns,
        };
        self.ensure_space(SECTION_SIZE + ROW_H * 3.0);
        self.emit_section_header(&section, false);
        self.section = Some(section.clone());

        let step = content_width() / section.columns.len() as f32;
        for row in rows {
            if self.settings.paginate && self.rows_on_page >= self.settings.items_per_page {
                self.new_page();
            }
            self.ensure_space(ROW_H);
            for (i, cell) in row.split('|').take(section.columns.len()).enumerate() {
                self.text(MARGIN + step * i as f32, BODY_SIZE, false, ink(), cell);
            }
            self.y += ROW_H;
            self.rows_on_page += 1;
        }

        self.section = None;
        self.y += 12.0;
    }

    // --- graph snapshot ------------------------------------------------------

    fn graph_snapshot(&mut self, scene: Option<&Scene>) {
        let section = Section {
            title: "Graph overview".to_string(),
            columns: Vec::new(),
        };
        self.ensure_space(SECTION_SIZE + 60.0);
        self.text(MARGIN, SECTION_SIZE, true, ink(), &section.title);
        self.y += SECTION_SIZE + 8.0;

        let bounds = match scene.filter(|s| !s.is_empty()).and_then(|s| s.bounds()) {
            Some(bounds) => bounds,
            None => {
                // Degraded export: visible notice instead of the snapshot
                self.text(
                    MARGIN,
                    BODY_SIZE + 1.0,
                    true,
                    Color32::from_rgb(0xDC, 0x26, 0x26),
                    "Graph snapshot unavailable",
                );
                self.y += ROW_H + 12.0;
                return;
            }
        };
        let scene = match scene {
            Some(scene) => scene,
            None => return,
        };

        let content_h = content_bottom() - MARGIN;
        let mut avail_h = content_bottom() - self.y;
        if self.settings.fit_to_page {
            avail_h = avail_h.min(content_h * SNAPSHOT_MAX_RATIO);
        }
        let scale = (content_width() / bounds.width().max(1.0))
            .min(avail_h / bounds.height().max(1.0))
            .min(1.0);
        let drawn_h = bounds.height() * scale;
        let origin_y = self.y;
        let origin_x = MARGIN + (content_width() - bounds.width() * scale) / 2.0;
        let project = |p: egui::Pos2| -> (f32, f32) {
            (
                origin_x + (p.x - bounds.min.x) * scale,
                origin_y + (p.y - bounds.min.y) * scale,
            )
        };

        for edge in &scene.edges {
            let (x0, y0) = project(edge.from);
            let (x1, y1) = project(edge.to);
            self.line(x0, y0, x1, y1, colors::EDGE_STROKE, 0.5);
        }
        for node in &scene.nodes {
            let (cx, cy) = project(node.pos);
            self.disc(cx, cy, (node.radius * scale).max(1.5), node.color);
        }

        self.y += drawn_h + 12.0;
    }

    // --- assembly ------------------------------------------------------------

    fn finish(mut self) -> Vec<String> {
        self.done.push(self.current);
        let total = self.done.len();
        let stamp = Local::now().format("%Y-%m-%d %H:%M").to_string();
        for (i, page) in self.done.iter_mut().enumerate() {
            let footer = format!(
                "Generated by CorteX Map on {} | Page {} of {}",
                stamp,
                i + 1,
                total,
            );
            page.push_str(&format!(
                "BT /F1 8.0 Tf 0.5 0.5 0.5 rg {:.1} {:.1} Td ({}) Tj ET\n",
                MARGIN,
                14.0,
                escape(&footer),
            ));
        }
        self.done
    }
}

fn ink() -> Color32 {
    Color32::from_gray(33)
}

fn rgb(color: Color32) -> (f32, f32, f32) {
    (
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    )
}

/// PDF string escaping, restricted to the ASCII range the builtin font
/// encoding covers
fn escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            c if c.is_ascii_graphic() || c == ' ' => c.to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

// =============================================================================
// REPORT CONTENT
// =============================================================================

fn compose_pages(
    scan: &ScanResult,
    scene: Option<&Scene>,
    settings: &ExportSettings,
) -> Vec<String> {
    let mut composer = Composer::new(settings);
    let target = scan.target.as_deref().unwrap_or("(unknown target)");

    composer.text(MARGIN, 20.0, true, ink(), "CorteX Map");
    composer.y += 26.0;
    composer.text(
        MARGIN,
        12.0,
        false,
        ink(),
        &format!("Reconnaissance report: {}", target),
    );
    composer.y += 16.0;
    composer.text(
        MARGIN,
        10.0,
        false,
        Color32::from_gray(110),
        &format!("Date: {}", Local::now().format("%Y-%m-%d")),
    );
    composer.y += 22.0;

    if settings.include_graph {
        composer.graph_snapshot(scene);
    }

    if settings.include_subdomains {
        let rows: Vec<String> = scan
            .subdomains
            .iter()
            .map(|s| {
                let source = match s {
                    crate::payload::SubdomainEntry::Record {
                        source: Some(source),
                        ..
                    } => source.as_str(),
                    _ => "-",
                };
                format!("{}|{}|{}", s.name(), source, s.resolved_ips().join(", "))
            })
            .collect();
        composer.table(
            &format!("Subdomains ({})", rows.len()),
            vec!["Subdomain", "Source", "Resolved IPs"],
            &rows,
        );
    }

    if settings.include_ips {
        let rows: Vec<String> = scan
            .ips
            .iter()
            .map(|ip| match ip {
                crate::payload::IpEntry::Addr(addr) => format!("{}|-|-|-", addr),
                crate::payload::IpEntry::Record {
                    ip,
                    ports,
                    isp,
                    location,
                    ..
                } => format!(
                    "{}|{}|{}|{}",
                    ip,
                    if ports.is_empty() {
                        "-".to_string()
                    } else {
                        ports
                            .iter()
                            .map(|p| p.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    },
                    isp.as_deref().unwrap_or("-"),
                    location.as_deref().unwrap_or("-"),
                ),
            })
            .collect();
        composer.table(
            &format!("IPs ({})", rows.len()),
            vec!["IP", "Ports", "ISP", "Location"],
            &rows,
        );
    }

    if settings.include_services {
        let rows: Vec<String> = scan
            .services
            .iter()
            .map(|svc| {
                format!(
                    "{}|{}|{}|{}",
                    svc.ip.as_deref().unwrap_or("-"),
                    svc.port,
                    svc.display_name(),
                    svc.status.as_deref().unwrap_or("-"),
                )
            })
            .collect();
        composer.table(
            &format!("Services ({})", rows.len()),
            vec!["IP", "Port", "Service", "Status"],
            &rows,
        );
    }

    composer.finish()
}

// =============================================================================
// DOCUMENT ASSEMBLY
// =============================================================================

fn assemble(pages: Vec<String>) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
            "F2" => Object::Reference(bold_id),
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    let count = pages.len() as i64;
    for content in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), PAGE_W.into(), PAGE_H.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
