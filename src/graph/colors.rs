//! Color palettes for nodes and edges
//!
//! Base color comes from the node kind; a grouping key, when assigned,
//! overrides it so one bucket reads as one hue across the scene. Unknown
//! keys fall back to the shared gray.

use egui::Color32;

use super::types::{GroupClass, Node, NodeKind};

pub const EDGE_STROKE: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
pub const NODE_STROKE: Color32 = Color32::from_rgb(0xCB, 0xD5, 0xE1);
pub const LABEL_COLOR: Color32 = Color32::from_rgb(0x94, 0xA3, 0xB8);
pub const BACKGROUND: Color32 = Color32::from_rgb(0x1F, 0x29, 0x37);

/// Shared fallback for unknown kinds and unknown grouping keys
const FALLBACK: Color32 = Color32::from_rgb(0x94, 0xA3, 0xB8);

/// Base palette by node kind
pub fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Domain => Color32::from_rgb(0x8B, 0x5C, 0xF6),
        NodeKind::Subdomain => Color32::from_rgb(0x38, 0xBD, 0xF8),
        NodeKind::Ip => Color32::from_rgb(0x4A, 0xDE, 0x80),
        NodeKind::Service => Color32::from_rgb(0xFB, 0x92, 0x3C),
        NodeKind::Group(GroupClass::Subdomain) => Color32::from_rgb(0x63, 0x66, 0xF1),
        NodeKind::Group(GroupClass::Ip) => Color32::from_rgb(0x0E, 0xA5, 0xE9),
        NodeKind::Group(GroupClass::Service) => Color32::from_rgb(0xF5, 0x9E, 0x0B),
    }
}

/// Per-bucket palette for grouped subdomains
pub fn subdomain_group_color(key: &str) -> Color32 {
    match key {
        "api" => Color32::from_rgb(0xF4, 0x72, 0xB6),
        "dev" => Color32::from_rgb(0x4A, 0xDE, 0x80),
        "staging" => Color32::from_rgb(0xFB, 0xBF, 0x24),
        "test" => Color32::from_rgb(0x60, 0xA5, 0xFA),
        "prod" => Color32::from_rgb(0xF8, 0x71, 0x71),
        "admin" => Color32::from_rgb(0xC0, 0x84, 0xFC),
        _ => FALLBACK,
    }
}

/// Per-class palette for grouped services
pub fn service_group_color(key: &str) -> Color32 {
    match key {
        "web" => Color32::from_rgb(0xF4, 0x72, 0xB6),
        "email" => Color32::from_rgb(0x4A, 0xDE, 0x80),
        "dns" => Color32::from_rgb(0xC0, 0x84, 0xFC),
        "file" => Color32::from_rgb(0x60, 0xA5, 0xFA),
        "remote" => Color32::from_rgb(0xF8, 0x71, 0x71),
        _ => FALLBACK,
    }
}

/// Resolved fill for a node: explicit override, then group key, then kind
pub fn node_color(node: &Node) -> Color32 {
    if let Some(color) = node.color {
        return color;
    }
    if let Some(key) = node.group.as_deref() {
        match node.kind.filter_class() {
            NodeKind::Subdomain => return subdomain_group_color(key),
            NodeKind::Service => return service_group_color(key),
            _ => {}
        }
    }
    kind_color(node.kind)
}

/// Brightened variant for hover emphasis
pub fn hover_color(base: Color32) -> Color32 {
    let lift = |c: u8| c.saturating_add((255 - c) / 2);
    Color32::from_rgb(lift(base.r()), lift(base.g()), lift(base.b()))
}

/// Dimmed variant for search non-matches
pub fn dim_color(base: Color32) -> Color32 {
    Color32::from_rgba_unmultiplied(base.r(), base.g(), base.b(), 70)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_overrides_kind_color() {
        let mut node = Node::new("subdomain-api.ex.com", "api.ex.com", NodeKind::Subdomain);
        assert_eq!(node_color(&node), kind_color(NodeKind::Subdomain));
        node.group = Some("api".into());
        assert_eq!(node_color(&node), subdomain_group_color("api"));
    }

    #[test]
    fn test_unknown_group_key_falls_back_to_gray() {
        assert_eq!(subdomain_group_color("nonesuch"), FALLBACK);
        assert_eq!(service_group_color("nonesuch"), FALLBACK);
    }

    #[test]
    fn test_explicit_override_wins() {
        let mut node = Node::new("ip-1.2.3.4", "1.2.3.4", NodeKind::Ip);
        node.color = Some(Color32::WHITE);
        node.group = Some("10".into());
        assert_eq!(node_color(&node), Color32::WHITE);
    }

    #[test]
    fn test_hover_brightens() {
        let base = kind_color(NodeKind::Domain);
        let hovered = hover_color(base);
        assert!(hovered.r() >= base.r());
        assert!(hovered.g() >= base.g());
        assert!(hovered.b() >= base.b());
        assert_ne!(hovered, base);
    }
}
