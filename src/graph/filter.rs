//! Filter & Highlight Engine
//!
//! Three independent overlays on the current graph:
//! - kind toggles decide visibility (an edge needs both endpoints visible),
//! - search marks matching nodes highlighted; non-matches dim, never hide,
//! - hover lights up a node's incident edges and opposite endpoints.
//!
//! None of these touch `GraphData` or the layout arena.

use std::collections::HashSet;

use super::types::{Edge, GraphData, Node, NodeKind};

/// Visibility toggles plus the active search text
#[derive(Debug, Clone)]
pub struct FilterState {
    visible: HashSet<NodeKind>,
    pub search: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            visible: [
                NodeKind::Domain,
                NodeKind::Subdomain,
                NodeKind::Ip,
                NodeKind::Service,
            ]
            .into(),
            search: String::new(),
        }
    }
}

impl FilterState {
    /// A node is visible when its filter class toggle is on. Group nodes
    /// follow the toggle of the class they collapsed.
    pub fn is_visible(&self, kind: NodeKind) -> bool {
        self.visible.contains(&kind.filter_class())
    }

    pub fn set_visible(&mut self, kind: NodeKind, visible: bool) {
        let class = kind.filter_class();
        if visible {
            self.visible.insert(class);
        } else {
            self.visible.remove(&class);
        }
    }

    pub fn toggle(&mut self, kind: NodeKind) {
        let class = kind.filter_class();
        if !self.visible.remove(&class) {
            self.visible.insert(class);
        }
    }

    pub fn visible_nodes<'a>(&self, graph: &'a GraphData) -> Vec<&'a Node> {
        graph
            .nodes
            .iter()
            .filter(|n| self.is_visible(n.kind))
            .collect()
    }

    /// Edges with both endpoints currently visible
    pub fn visible_edges<'a>(&self, graph: &'a GraphData) -> Vec<&'a Edge> {
        let ids: HashSet<&str> = self
            .visible_nodes(graph)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        graph
            .edges
            .iter()
            .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
            .collect()
    }

    /// Ids of nodes matching the search text, case-insensitive substring
    /// over the label. Empty search highlights nothing.
    pub fn highlighted(&self, graph: &GraphData) -> HashSet<String> {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return HashSet::new();
        }
        graph
            .nodes
            .iter()
            .filter(|n| n.label.to_lowercase().contains(&needle))
            .map(|n| n.id.clone())
            .collect()
    }
}

// =============================================================================
// HOVER
// =============================================================================

/// Hover neighborhood: the hovered node, its incident edges, and the
/// opposite endpoints. Fully cleared when the pointer leaves.
#[derive(Debug, Clone, Default)]
pub struct HoverState {
    pub hovered: Option<String>,
    pub neighbors: HashSet<String>,
    pub edges: HashSet<String>,
}

impl HoverState {
    pub fn set(&mut self, graph: &GraphData, id: &str) {
        self.hovered = Some(id.to_string());
        self.neighbors.clear();
        self.edges.clear();
        for edge in &graph.edges {
            if edge.source == id {
                self.neighbors.insert(edge.target.clone());
                self.edges.insert(edge.id.clone());
            } else if edge.target == id {
                self.neighbors.insert(edge.source.clone());
                self.edges.insert(edge.id.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.neighbors.clear();
        self.edges.clear();
    }

    pub fn is_active(&self) -> bool {
        self.hovered.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::normalize::{build_graph, NormalizeOptions};
    use crate::graph::types::GroupClass;
    use crate::payload::ScanResult;
    use serde_json::json;

    fn graph() -> GraphData {
        build_graph(
            &ScanResult::parse(json!({
                "target": "ex.com",
                "subdomains": [{"name": "api.ex.com", "ips": ["1.2.3.4"]}, "www.ex.com"],
                "services": [{"ip": "1.2.3.4", "port": 80, "service": "http"}]
            })),
            &NormalizeOptions::default(),
        )
    }

    #[test]
    fn test_all_kinds_visible_by_default() {
        let filter = FilterState::default();
        let g = graph();
        assert_eq!(filter.visible_nodes(&g).len(), g.nodes.len());
        assert_eq!(filter.visible_edges(&g).len(), g.edges.len());
    }

    #[test]
    fn test_hiding_a_kind_hides_its_edges() {
        let mut filter = FilterState::default();
        filter.set_visible(NodeKind::Ip, false);
        let g = graph();

        assert!(filter
            .visible_nodes(&g)
            .iter()
            .all(|n| n.kind != NodeKind::Ip));
        // Every edge touching the hidden ip disappears too
        for edge in filter.visible_edges(&g) {
            assert!(!edge.source.starts_with("ip-"));
            assert!(!edge.target.starts_with("ip-"));
        }
    }

    #[test]
    fn test_group_node_follows_member_class_toggle() {
        let mut filter = FilterState::default();
        filter.set_visible(NodeKind::Subdomain, false);
        assert!(!filter.is_visible(NodeKind::Group(GroupClass::Subdomain)));
        assert!(filter.is_visible(NodeKind::Group(GroupClass::Ip)));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let filter = FilterState {
            search: "API".into(),
            ..Default::default()
        };
        let hits = filter.highlighted(&graph());
        assert!(hits.contains("subdomain-api.ex.com"));
        assert!(!hits.contains("subdomain-www.ex.com"));
    }

    #[test]
    fn test_empty_search_highlights_nothing() {
        let filter = FilterState {
            search: "   ".into(),
            ..Default::default()
        };
        assert!(filter.highlighted(&graph()).is_empty());
    }

    #[test]
    fn test_search_never_hides_nodes() {
        let filter = FilterState {
            search: "api".into(),
            ..Default::default()
        };
        let g = graph();
        // Non-matches stay visible (they only dim)
        assert_eq!(filter.visible_nodes(&g).len(), g.nodes.len());
    }

    #[test]
    fn test_hover_neighborhood() {
        let g = graph();
        let mut hover = HoverState::default();
        hover.set(&g, "ip-1.2.3.4");

        assert!(hover.neighbors.contains("subdomain-api.ex.com"));
        assert!(hover.neighbors.contains("service-1.2.3.4-80"));
        assert!(!hover.neighbors.contains("subdomain-www.ex.com"));
        assert_eq!(hover.edges.len(), 2);
    }

    #[test]
    fn test_hover_clear_resets_everything() {
        let g = graph();
        let mut hover = HoverState::default();
        hover.set(&g, "domain-ex.com");
        hover.clear();
        assert!(!hover.is_active());
        assert!(hover.neighbors.is_empty());
        assert!(hover.edges.is_empty());
    }
}
