//! PNG scene rasterizer
//!
//! Software-renders a [`Scene`] to PNG bytes: dark canvas, edges as thin
//! segments, nodes as filled discs. No GPU involved, so exports work the
//! same headless as in the shell.

use egui::Color32;
use image::{Rgba, RgbaImage};

use super::Scene;
use crate::error::ExportError;
use crate::graph::colors;

const IMAGE_WIDTH: u32 = 1200;
const IMAGE_HEIGHT: u32 = 800;
const PADDING: f32 = 48.0;

/// Render the scene to PNG bytes. An empty scene is a snapshot failure
/// (the caller decides whether that aborts or degrades).
pub fn render_png(scene: &Scene) -> Result<Vec<u8>, ExportError> {
    let bounds = scene
        .bounds()
        .ok_or_else(|| ExportError::Snapshot("scene contains no nodes".to_string()))?;

    let mut img = RgbaImage::from_pixel(IMAGE_WIDTH, IMAGE_HEIGHT, to_rgba(colors::BACKGROUND));

    // Fit the scene bounds into the padded image
    let avail_w = IMAGE_WIDTH as f32 - PADDING * 2.0;
    let avail_h = IMAGE_HEIGHT as f32 - PADDING * 2.0;
    let scale = (avail_w / bounds.width().max(1.0))
        .min(avail_h / bounds.height().max(1.0))
        .min(2.0);
    let project = |p: egui::Pos2| -> (f32, f32) {
        (
            PADDING + (p.x - bounds.min.x) * scale + (avail_w - bounds.width() * scale) / 2.0,
            PADDING + (p.y - bounds.min.y) * scale + (avail_h - bounds.height() * scale) / 2.0,
        )
    };

    for edge in &scene.edges {
        let (x0, y0) = project(edge.from);
        let (x1, y1) = project(edge.to);
        draw_line(&mut img, x0, y0, x1, y1, to_rgba(colors::EDGE_STROKE));
    }
    for node in &scene.nodes {
        let (x, y) = project(node.pos);
        draw_disc(&mut img, x, y, node.radius * scale, to_rgba(node.color));
    }

    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img).write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba([color.r(), color.g(), color.b(), 255])
}

fn put(img: &mut RgbaImage, x: f32, y: f32, color: Rgba<u8>) {
    if x >= 0.0 && y >= 0.0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Segment drawn by sampling at sub-pixel steps
fn draw_line(img: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        put(img, x0 + dx * t, y0 + dy * t, color);
    }
}

fn draw_disc(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let r = radius.max(1.5);
    let r2 = r * r;
    let (min_x, max_x) = ((cx - r).floor() as i32, (cx + r).ceil() as i32);
    let (min_y, max_y) = ((cy - r).floor() as i32, (cy + r).ceil() as i32);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= r2 {
                put(img, x as f32, y as f32, color);
            }
        }
    }
}
