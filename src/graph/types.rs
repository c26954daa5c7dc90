//! Core graph model shared by every stage of the pipeline
//!
//! `GraphData` is the immutable output of the normalizer/grouping stages.
//! It is rebuilt (never mutated) whenever the payload or grouping settings
//! change. Node positions are NOT stored here; they live in the layout
//! arena, which is the sole writer.

use std::collections::HashSet;

use egui::Color32;

// =============================================================================
// NODE
// =============================================================================

/// Classes that can be collapsed into synthetic group nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupClass {
    Subdomain,
    Ip,
    Service,
}

impl GroupClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupClass::Subdomain => "subdomain",
            GroupClass::Ip => "ip",
            GroupClass::Service => "service",
        }
    }
}

/// Kind of a graph vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Domain,
    Subdomain,
    Ip,
    Service,
    /// Synthetic node standing in for a collapsed bucket of one class
    Group(GroupClass),
}

impl NodeKind {
    /// The class used for filter toggles. Group nodes follow the toggle of
    /// the class they collapsed.
    pub fn filter_class(&self) -> NodeKind {
        match self {
            NodeKind::Group(GroupClass::Subdomain) => NodeKind::Subdomain,
            NodeKind::Group(GroupClass::Ip) => NodeKind::Ip,
            NodeKind::Group(GroupClass::Service) => NodeKind::Service,
            other => *other,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, NodeKind::Group(_))
    }
}

/// A visual vertex: domain, subdomain, IP, service, or a group thereof
#[derive(Debug, Clone)]
pub struct Node {
    /// Canonical id, unique within one graph build (`<kind>-<label>`)
    pub id: String,
    /// Display label
    pub label: String,
    pub kind: NodeKind,
    /// Grouping key assigned by the grouping engine (used by the radial
    /// grouped placement); `None` until groups are assigned
    pub group: Option<String>,
    /// Explicit color override; palette default when `None`
    pub color: Option<Color32>,
    /// Render radius in world units
    pub size: f32,
    /// Member count; 1 for ordinary nodes, bucket size for group nodes
    pub members: usize,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            group: None,
            color: None,
            size: default_size(kind),
            members: 1,
        }
    }
}

/// Default render radius per node kind (the target dominates visually)
fn default_size(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Domain => 30.0,
        NodeKind::Subdomain => 15.0,
        NodeKind::Ip => 12.0,
        NodeKind::Service => 10.0,
        NodeKind::Group(_) => 20.0,
    }
}

// =============================================================================
// EDGE
// =============================================================================

/// Directed relationship between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    HasSubdomain,
    ResolvesTo,
    Runs,
    HasIp,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::HasSubdomain => "has_subdomain",
            EdgeKind::ResolvesTo => "resolves_to",
            EdgeKind::Runs => "runs",
            EdgeKind::HasIp => "has_ip",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("edge_{}_{}", source, target),
            source,
            target,
            kind,
        }
    }
}

// =============================================================================
// GRAPH DATA
// =============================================================================

/// Immutable node/edge set produced by the normalizer (and, optionally, the
/// grouping collapse). Rebuilt on every payload or grouping change.
#[derive(Debug, Clone, Default)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Count of nodes of one kind (group nodes do not count toward their
    /// member class)
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// Drop edges whose endpoints are not both present. Dangling edges are
    /// a normal consequence of partial payloads, not an error.
    pub fn retain_connected_edges(&mut self) {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .retain(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()));
    }
}
