//! Radial layout strategy
//!
//! Deterministic closed-form placement: identical graph and settings always
//! produce identical positions, with no simulation ticks involved.
//!
//! Ungrouped: the target sits at the viewport center, subdomains fan across
//! the upper semicircle, IPs across the lower one at a tighter radius, and
//! each service hangs just below its resolving IP.
//!
//! Grouped: subdomains orbit their group anchor as satellites; anchors and
//! IPs take concentric circles around the target.

use std::collections::HashMap;

use egui::{Pos2, Vec2};

use super::types::{EdgeKind, GraphData, NodeKind};

/// Satellite orbit radius around a group anchor
const SATELLITE_RADIUS: f32 = 50.0;
/// Service arc radius beside its parent IP (grouped mode)
const SERVICE_ARC_RADIUS: f32 = 40.0;
/// Vertical offset below the resolving IP (ungrouped mode)
const SERVICE_DROP: f32 = 50.0;
/// Fallback drop below center for services with no resolved IP
const ORPHAN_SERVICE_DROP: f32 = 150.0;

/// Main ring radius for a viewport
fn ring_radius(viewport: Vec2) -> f32 {
    (viewport.x.min(viewport.y) / 2.0 - 60.0).max(120.0)
}

/// Placement class: group nodes lay out with their member class
fn placement_kind(kind: NodeKind) -> NodeKind {
    kind.filter_class()
}

fn on_ring(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    // Negative sin keeps the 0..pi range on the upper half in screen coords
    Pos2::new(
        center.x + radius * angle.cos(),
        center.y - radius * angle.sin(),
    )
}

/// Compute positions for every node. Total over the graph: every node id
/// appears in the output.
pub fn radial_positions(
    graph: &GraphData,
    viewport: Vec2,
    grouped: bool,
) -> HashMap<String, Pos2> {
    let center = (viewport / 2.0).to_pos2();
    let radius = ring_radius(viewport);
    let mut positions = HashMap::with_capacity(graph.nodes.len());

    // service id -> parent ip id, via runs edges
    let service_parent: HashMap<&str, &str> = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Runs)
        .map(|e| (e.target.as_str(), e.source.as_str()))
        .collect();

    let of_kind = |kind: NodeKind| -> Vec<&str> {
        graph
            .nodes
            .iter()
            .filter(|n| placement_kind(n.kind) == kind)
            .map(|n| n.id.as_str())
            .collect()
    };

    // First domain node is the hub; any further domains join the subdomain ring
    let domains = of_kind(NodeKind::Domain);
    let mut ring_members: Vec<&str> = domains.iter().skip(1).copied().collect();
    ring_members.extend(of_kind(NodeKind::Subdomain));
    if let Some(hub) = domains.first() {
        positions.insert(hub.to_string(), center);
    }

    let ips = of_kind(NodeKind::Ip);

    if grouped {
        place_grouped(graph, &ring_members, center, radius, &mut positions);
        arrange_full_circle(&ips, center, radius, &mut positions);
    } else {
        // Upper semicircle, angle pi*(0.2 + 0.6*t)
        arrange_arc(&ring_members, center, radius, 0.2, 0.6, &mut positions);
        // Lower semicircle at 0.7R, angle pi*(1 + 0.5*t)
        arrange_arc(&ips, center, radius * 0.7, 1.0, 0.5, &mut positions);
    }

    place_services(
        graph,
        &service_parent,
        center,
        grouped,
        &mut positions,
    );

    positions
}

/// Spread ids along an arc: angle = pi * (start + span * i / max(n-1, 1))
fn arrange_arc(
    ids: &[&str],
    center: Pos2,
    radius: f32,
    start: f32,
    span: f32,
    positions: &mut HashMap<String, Pos2>,
) {
    let denom = ids.len().saturating_sub(1).max(1) as f32;
    for (i, id) in ids.iter().enumerate() {
        let angle = std::f32::consts::PI * (start + span * i as f32 / denom);
        positions.insert(id.to_string(), on_ring(center, radius, angle));
    }
}

fn arrange_full_circle(
    ids: &[&str],
    center: Pos2,
    radius: f32,
    positions: &mut HashMap<String, Pos2>,
) {
    let n = ids.len().max(1) as f32;
    for (i, id) in ids.iter().enumerate() {
        let angle = std::f32::consts::TAU * i as f32 / n;
        positions.insert(id.to_string(), on_ring(center, radius, angle));
    }
}

/// Anchor each group on a circle at 0.7R, members as satellites around it.
/// Untagged members fall back to a shared trailing group.
fn place_grouped(
    graph: &GraphData,
    ring_members: &[&str],
    center: Pos2,
    radius: f32,
    positions: &mut HashMap<String, Pos2>,
) {
    // First-sight group order, then members per group in node order
    let mut group_order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<&str>> = HashMap::new();
    for id in ring_members {
        let key = graph
            .get_node(id)
            .and_then(|n| n.group.as_deref())
            .unwrap_or("outros");
        if !members.contains_key(key) {
            group_order.push(key);
        }
        members.entry(key).or_default().push(id);
    }

    let total = group_order.len().max(1) as f32;
    for (g, key) in group_order.iter().enumerate() {
        let anchor_angle = std::f32::consts::TAU * g as f32 / total;
        let anchor = on_ring(center, radius * 0.7, anchor_angle);
        let ids = &members[key];
        let n = ids.len().max(1) as f32;
        for (m, id) in ids.iter().enumerate() {
            let angle = std::f32::consts::TAU * m as f32 / n;
            positions.insert(id.to_string(), on_ring(anchor, SATELLITE_RADIUS, angle));
        }
    }
}

fn place_services(
    graph: &GraphData,
    service_parent: &HashMap<&str, &str>,
    center: Pos2,
    grouped: bool,
    positions: &mut HashMap<String, Pos2>,
) {
    // Per-IP counter so siblings on one IP fan out instead of stacking
    let mut sibling_index: HashMap<&str, usize> = HashMap::new();

    for node in &graph.nodes {
        if placement_kind(node.kind) != NodeKind::Service {
            continue;
        }
        let parent_pos = service_parent
            .get(node.id.as_str())
            .and_then(|ip| positions.get(*ip))
            .copied();

        let pos = match parent_pos {
            Some(ip_pos) if grouped => {
                let ip_id = service_parent[node.id.as_str()];
                let k = sibling_index.entry(ip_id).or_insert(0);
                // Quarter arc below-right of the IP
                let angle = -std::f32::consts::FRAC_PI_4
                    - std::f32::consts::FRAC_PI_2 * (*k as f32) / 4.0;
                *k += 1;
                on_ring(ip_pos, SERVICE_ARC_RADIUS, angle)
            }
            Some(ip_pos) => {
                let ip_id = service_parent[node.id.as_str()];
                let k = sibling_index.entry(ip_id).or_insert(0);
                let offset = Vec2::new(*k as f32 * 20.0, SERVICE_DROP);
                *k += 1;
                ip_pos + offset
            }
            None => center + Vec2::new(0.0, ORPHAN_SERVICE_DROP),
        };
        positions.insert(node.id.clone(), pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::grouping::assign_groups;
    use crate::graph::normalize::{build_graph, NormalizeOptions};
    use crate::payload::ScanResult;
    use serde_json::json;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn graph() -> GraphData {
        build_graph(
            &ScanResult::parse(json!({
                "target": "ex.com",
                "subdomains": [
                    {"name": "a.ex.com", "ips": ["1.2.3.4"]},
                    "b.ex.com",
                    "c.ex.com"
                ],
                "ips": ["5.6.7.8"],
                "services": [{"ip": "1.2.3.4", "port": 80, "service": "http"}]
            })),
            &NormalizeOptions::default(),
        )
    }

    #[test]
    fn test_every_node_gets_a_position() {
        let g = graph();
        for grouped in [false, true] {
            let positions = radial_positions(&g, VIEWPORT, grouped);
            for node in &g.nodes {
                assert!(positions.contains_key(&node.id), "missing {}", node.id);
            }
        }
    }

    #[test]
    fn test_target_sits_at_center() {
        let positions = radial_positions(&graph(), VIEWPORT, false);
        assert_eq!(positions["domain-ex.com"], Pos2::new(400.0, 300.0));
    }

    #[test]
    fn test_placement_is_deterministic() {
        let g = graph();
        let a = radial_positions(&g, VIEWPORT, false);
        let b = radial_positions(&g, VIEWPORT, false);
        assert_eq!(a, b);
        let c = radial_positions(&g, VIEWPORT, true);
        let d = radial_positions(&g, VIEWPORT, true);
        assert_eq!(c, d);
    }

    #[test]
    fn test_subdomains_above_ips_below() {
        let positions = radial_positions(&graph(), VIEWPORT, false);
        let center_y = 300.0;
        assert!(positions["subdomain-a.ex.com"].y < center_y);
        assert!(positions["subdomain-b.ex.com"].y < center_y);
        // The IP arc starts on the horizontal axis, so its first entry
        // lands at center height and the rest drop below
        assert!(positions["ip-1.2.3.4"].y >= center_y - 1e-3);
        assert!(positions["ip-5.6.7.8"].y > center_y);
    }

    #[test]
    fn test_service_hangs_below_its_ip() {
        let positions = radial_positions(&graph(), VIEWPORT, false);
        let ip = positions["ip-1.2.3.4"];
        let svc = positions["service-1.2.3.4-80"];
        assert!((svc.y - ip.y - SERVICE_DROP).abs() < 1e-3);
    }

    #[test]
    fn test_orphan_service_falls_back_below_center() {
        let mut g = build_graph(
            &ScanResult::parse(json!({
                "target": "ex.com",
                "services": [{"ip": "9.9.9.9", "port": 22, "service": "ssh"}]
            })),
            &NormalizeOptions::default(),
        );
        // Strip the runs edge to simulate a service with no resolved parent
        g.edges.retain(|e| e.kind != EdgeKind::Runs);
        let positions = radial_positions(&g, VIEWPORT, false);
        assert_eq!(
            positions["service-9.9.9.9-22"],
            Pos2::new(400.0, 300.0 + ORPHAN_SERVICE_DROP)
        );
    }

    #[test]
    fn test_grouped_members_orbit_their_anchor() {
        // Buckets form on the first prefix label: both api.* hosts share
        // the "api" group, dev.* stands alone
        let mut g = build_graph(
            &ScanResult::parse(json!({
                "target": "ex.com",
                "subdomains": ["api.h1.ex.com", "api.h2.ex.com", "dev.h1.ex.com"]
            })),
            &NormalizeOptions::default(),
        );
        assign_groups(&mut g, "ex.com");
        let positions = radial_positions(&g, VIEWPORT, true);

        // Same-group members stay within one satellite diameter of each other
        let a = positions["subdomain-api.h1.ex.com"];
        let b = positions["subdomain-api.h2.ex.com"];
        let other = positions["subdomain-dev.h1.ex.com"];
        let same = (a - b).length();
        let cross = (a - other).length();
        assert!(same <= SATELLITE_RADIUS * 2.0 + 1e-3);
        assert!(cross > same);
    }
}
