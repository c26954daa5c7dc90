//! Grouping Engine - collapsing high-cardinality node classes
//!
//! Two products, driven by the same key-extraction policies:
//! - `assign_groups` tags nodes with their bucket key (the radial grouped
//!   placement arranges tagged members as satellites);
//! - `collapse` derives a new graph where multi-member buckets become one
//!   synthetic `group_<class>_<key>` node, with edges rewritten to the
//!   group endpoints.
//!
//! The key extractors are policy, not incident: they materially shape what
//! the user sees and are unit-tested directly.
//!   - subdomain: first label of the prefix before the target domain
//!   - ip: first octet
//!   - service: keyword class (web, remote, dns, email, file, other)
//!
//! `collapse` never mutates its input, so toggling grouping off restores
//! the exact original graph.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::types::{Edge, EdgeKind, GraphData, GroupClass, Node, NodeKind};

/// Grouping configuration
#[derive(Debug, Clone)]
pub struct GroupingSettings {
    pub enabled: bool,
    /// A class is collapsed only when it has more nodes than this
    pub threshold: usize,
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 50,
        }
    }
}

// =============================================================================
// KEY EXTRACTION POLICIES
// =============================================================================

/// Bucket key for a subdomain label: the first label of its prefix before
/// the target domain. `api.v2.ex.com` under `ex.com` buckets as `api`.
/// Labels that do not end in the target fall into `outros`.
pub fn subdomain_key(label: &str, target: &str) -> String {
    let suffix = format!(".{}", target);
    match label.strip_suffix(&suffix) {
        Some(prefix) if !prefix.is_empty() => prefix
            .split('.')
            .next()
            .unwrap_or(prefix)
            .to_string(),
        _ => "outros".to_string(),
    }
}

/// Bucket key for an IP: its first octet
pub fn ip_key(label: &str) -> String {
    label.split('.').next().unwrap_or(label).to_string()
}

/// Bucket key for a service: coarse keyword classification of its name
pub fn service_key(label: &str) -> String {
    let name = label.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| name.contains(w));

    if contains_any(&["http", "https", "www", "web", "ssl"]) {
        "web"
    } else if contains_any(&["ssh", "telnet", "rdp", "vnc"]) {
        "remote"
    } else if contains_any(&["dns", "domain"]) {
        "dns"
    } else if contains_any(&["smtp", "mail", "pop3", "imap"]) {
        "email"
    } else if contains_any(&["ftp", "smb", "nfs"]) {
        "file"
    } else {
        "other"
    }
    .to_string()
}

fn key_for(node: &Node, target: &str) -> Option<String> {
    match node.kind {
        NodeKind::Subdomain => Some(subdomain_key(&node.label, target)),
        NodeKind::Ip => Some(ip_key(&node.label)),
        NodeKind::Service => Some(service_key(&node.label)),
        NodeKind::Domain | NodeKind::Group(_) => None,
    }
}

/// Tag every groupable node with its bucket key
pub fn assign_groups(graph: &mut GraphData, target: &str) {
    for node in &mut graph.nodes {
        node.group = key_for(node, target);
    }
}

// =============================================================================
// COLLAPSE
// =============================================================================

/// Group node radius grows with member count, capped so outliers do not
/// dwarf the scene
fn group_size(members: usize) -> f32 {
    25.0 + (members.min(50) as f32) * 0.5
}

fn class_of(kind: NodeKind) -> Option<GroupClass> {
    match kind {
        NodeKind::Subdomain => Some(GroupClass::Subdomain),
        NodeKind::Ip => Some(GroupClass::Ip),
        NodeKind::Service => Some(GroupClass::Service),
        NodeKind::Domain | NodeKind::Group(_) => None,
    }
}

/// Derive the collapsed graph. Classes at or below the threshold pass
/// through untouched; singleton buckets re-insert their member unchanged.
pub fn collapse(graph: &GraphData, target: &str, threshold: usize) -> GraphData {
    // node id -> rewritten id (group id for collapsed members)
    let mut rewrite: HashMap<&str, String> = HashMap::new();
    // bucket id -> (class, key, member count), in first-sight order
    let mut groups: Vec<(String, GroupClass, String, usize)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for class in [GroupClass::Subdomain, GroupClass::Ip, GroupClass::Service] {
        let members: Vec<&Node> = graph
            .nodes
            .iter()
            .filter(|n| class_of(n.kind) == Some(class))
            .collect();
        if members.len() <= threshold {
            continue;
        }

        // Partition into buckets, preserving first-sight order
        let mut buckets: Vec<(String, Vec<&Node>)> = Vec::new();
        let mut bucket_index: HashMap<String, usize> = HashMap::new();
        for node in members {
            let key = key_for(node, target).unwrap_or_else(|| "outros".into());
            let idx = *bucket_index.entry(key.clone()).or_insert_with(|| {
                buckets.push((key, Vec::new()));
                buckets.len() - 1
            });
            buckets[idx].1.push(node);
        }

        for (key, bucket) in buckets {
            // Lossless for singletons: the member stays an ordinary node
            if bucket.len() < 2 {
                continue;
            }
            let group_id = format!("group_{}_{}", class.as_str(), key);
            for member in &bucket {
                rewrite.insert(member.id.as_str(), group_id.clone());
            }
            group_index.insert(group_id.clone(), groups.len());
            groups.push((group_id, class, key, bucket.len()));
        }
    }

    if groups.is_empty() {
        return graph.clone();
    }

    // Surviving ordinary nodes keep their order; group nodes append after
    let mut nodes: Vec<Node> = graph
        .nodes
        .iter()
        .filter(|n| !rewrite.contains_key(n.id.as_str()))
        .cloned()
        .collect();

    for (group_id, class, key, count) in &groups {
        let label = match class {
            GroupClass::Subdomain => format!("Subdomains {}* ({})", key, count),
            GroupClass::Ip => format!("IPs {}.* ({})", key, count),
            GroupClass::Service => format!("Services ({}) ({})", key, count),
        };
        let mut node = Node::new(group_id.clone(), label, NodeKind::Group(*class));
        node.group = Some(key.clone());
        node.size = group_size(*count);
        node.members = *count;
        nodes.push(node);
    }

    // Rewrite edges to group endpoints; suppress duplicates and self-loops
    let mut edges: Vec<Edge> = Vec::new();
    let mut seen: HashSet<(String, String, EdgeKind)> = HashSet::new();
    for edge in &graph.edges {
        let source = rewrite
            .get(edge.source.as_str())
            .cloned()
            .unwrap_or_else(|| edge.source.clone());
        let target_id = rewrite
            .get(edge.target.as_str())
            .cloned()
            .unwrap_or_else(|| edge.target.clone());
        if source == target_id {
            continue;
        }
        if seen.insert((source.clone(), target_id.clone(), edge.kind)) {
            edges.push(Edge::new(source, target_id, edge.kind));
        }
    }

    let mut collapsed = GraphData { nodes, edges };
    collapsed.retain_connected_edges();
    debug!(
        groups = groups.len(),
        nodes = collapsed.nodes.len(),
        "collapsed graph"
    );
    collapsed
}
