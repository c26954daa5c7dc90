//! Graph Normalizer - payload to node/edge set
//!
//! Converts a `ScanResult` into a typed `GraphData`, deduplicating by
//! canonical id. Insertion order is preserved (the radial layout
//! parameterizes positions by index, so deterministic ordering matters;
//! sort order does not).
//!
//! Containment order: target → domain → subdomain → ip → service. An edge
//! is only emitted when both endpoints exist; anything left dangling by a
//! partial payload is dropped at the end.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::types::{Edge, EdgeKind, GraphData, Node, NodeKind};
use crate::payload::{IpEntry, ScanResult, SubdomainEntry};

/// Knobs for the normalization pass
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Per-class cap on emitted nodes; entries past the cap are skipped.
    /// `None` = unbounded.
    pub node_limit: Option<usize>,
}

/// Canonical node id: kind prefix + label
pub fn node_id(kind: NodeKind, label: &str) -> String {
    let prefix = match kind {
        NodeKind::Domain => "domain",
        NodeKind::Subdomain => "subdomain",
        NodeKind::Ip => "ip",
        NodeKind::Service => "service",
        NodeKind::Group(class) => return format!("group_{}_{}", class.as_str(), label),
    };
    format!("{}-{}", prefix, label)
}

/// Accumulator with idempotent insertion
struct Builder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
    edge_seen: HashSet<(String, String, EdgeKind)>,
    limit: Option<usize>,
}

impl Builder {
    fn new(limit: Option<usize>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
            edge_seen: HashSet::new(),
            limit,
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Idempotent add: a repeat id is a no-op, first sight appends.
    fn add_node(&mut self, id: String, label: &str, kind: NodeKind) {
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node::new(id, label, kind));
    }

    /// Add an edge once per (source, target, kind) triple; repeats from
    /// duplicated payload entries are no-ops, like repeat node ids.
    fn add_edge(&mut self, source: &str, target: &str, kind: EdgeKind) {
        if !self
            .edge_seen
            .insert((source.to_string(), target.to_string(), kind))
        {
            return;
        }
        self.edges.push(Edge::new(source, target, kind));
    }

    /// True when the per-class cap for `kind` has been reached
    fn at_limit(&self, kind: NodeKind) -> bool {
        match self.limit {
            Some(cap) => self.nodes.iter().filter(|n| n.kind == kind).count() >= cap,
            None => false,
        }
    }

    fn finish(mut self) -> GraphData {
        let mut graph = GraphData {
            nodes: self.nodes,
            edges: std::mem::take(&mut self.edges),
        };
        graph.retain_connected_edges();
        graph
    }
}

/// Build a graph from a payload. Total: any input yields a graph, an empty
/// payload yields an empty one.
pub fn build_graph(scan: &ScanResult, options: &NormalizeOptions) -> GraphData {
    let mut b = Builder::new(options.node_limit);

    let target_id = scan.target.as_ref().map(|target| {
        let id = node_id(NodeKind::Domain, target);
        b.add_node(id.clone(), target, NodeKind::Domain);
        id
    });

    // Root-level subdomains hang off the target
    for sub in &scan.subdomains {
        add_subdomain(&mut b, sub, target_id.as_deref());
    }

    // Nested form: domains[] each carrying their own subdomains
    for domain in &scan.domains {
        let domain_id = node_id(NodeKind::Domain, &domain.domain);
        b.add_node(domain_id.clone(), &domain.domain, NodeKind::Domain);
        for sub in &domain.subdomains {
            add_subdomain(&mut b, sub, Some(&domain_id));
        }
    }

    // Root-level IPs connect straight to the target
    for ip in &scan.ips {
        add_ip(&mut b, ip.addr(), target_id.as_deref());
        if let IpEntry::Record { ip, services, .. } = ip {
            for svc in services {
                add_service(&mut b, ip, svc.port, &svc.display_name());
            }
        }
    }

    // Root-level services; an unseen IP is materialized on the way
    for svc in &scan.services {
        let Some(ip) = svc.ip.as_deref() else {
            continue;
        };
        if !b.contains(&node_id(NodeKind::Ip, ip)) {
            add_ip(&mut b, ip, target_id.as_deref());
        }
        add_service(&mut b, ip, svc.port, &svc.display_name());
    }

    let graph = b.finish();
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "normalized payload"
    );
    graph
}

fn add_subdomain(b: &mut Builder, sub: &SubdomainEntry, parent_id: Option<&str>) {
    if b.at_limit(NodeKind::Subdomain) {
        return;
    }
    let name = sub.name();
    let sub_id = node_id(NodeKind::Subdomain, name);
    b.add_node(sub_id.clone(), name, NodeKind::Subdomain);
    if let Some(parent) = parent_id {
        b.add_edge(parent, &sub_id, EdgeKind::HasSubdomain);
    }

    // Resolution edges take precedence over target → ip containment. The
    // per-class cap applies here too, but an already-seen IP still gets
    // its resolution edge.
    for addr in sub.resolved_ips() {
        let ip_id = node_id(NodeKind::Ip, addr);
        if !b.contains(&ip_id) {
            if b.at_limit(NodeKind::Ip) {
                continue;
            }
            b.add_node(ip_id.clone(), addr, NodeKind::Ip);
        }
        b.add_edge(&sub_id, &ip_id, EdgeKind::ResolvesTo);
    }
}

fn add_ip(b: &mut Builder, addr: &str, target_id: Option<&str>) {
    if b.at_limit(NodeKind::Ip) {
        return;
    }
    let ip_id = node_id(NodeKind::Ip, addr);
    let is_new = !b.contains(&ip_id);
    b.add_node(ip_id.clone(), addr, NodeKind::Ip);
    if is_new {
        if let Some(target) = target_id {
            b.add_edge(target, &ip_id, EdgeKind::HasIp);
        }
    }
}

fn add_service(b: &mut Builder, ip: &str, port: u16, name: &str) {
    if b.at_limit(NodeKind::Service) {
        return;
    }
    let svc_label = format!("{}:{}", name, port);
    let svc_id = format!("service-{}-{}", ip, port);
    b.add_node(svc_id.clone(), &svc_label, NodeKind::Service);
    b.add_edge(&node_id(NodeKind::Ip, ip), &svc_id, EdgeKind::Runs);
}
