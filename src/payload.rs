//! Reconnaissance payload model
//!
//! The collector returns a loosely-structured JSON object: every field is
//! optional and list elements arrive either as bare strings or as records,
//! depending on which OSINT module produced them. Each accepted shape is an
//! explicit `#[serde(untagged)]` variant; downstream code pattern-matches
//! instead of probing fields.
//!
//! Malformed or missing fields degrade to empty — parsing a payload never
//! fails on shape problems.

use serde::{Deserialize, Serialize};

// =============================================================================
// ENTRY SHAPES
// =============================================================================

/// A subdomain, as a bare name or a full record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubdomainEntry {
    Name(String),
    Record {
        #[serde(alias = "subdomain")]
        name: String,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        ip: Option<String>,
        #[serde(default)]
        ips: Vec<IpEntry>,
    },
}

impl SubdomainEntry {
    pub fn name(&self) -> &str {
        match self {
            SubdomainEntry::Name(n) => n,
            SubdomainEntry::Record { name, .. } => name,
        }
    }

    /// IPs this subdomain resolves to, regardless of entry shape
    pub fn resolved_ips(&self) -> Vec<&str> {
        match self {
            SubdomainEntry::Name(_) => Vec::new(),
            SubdomainEntry::Record { ip, ips, .. } => {
                let mut out: Vec<&str> = ips.iter().map(|e| e.addr()).collect();
                if let Some(ip) = ip {
                    if !out.contains(&ip.as_str()) {
                        out.push(ip);
                    }
                }
                out
            }
        }
    }
}

/// A domain with its nested subdomains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEntry {
    pub domain: String,
    #[serde(default)]
    pub subdomains: Vec<SubdomainEntry>,
}

/// An IP address, as a bare string or a record with enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpEntry {
    Addr(String),
    Record {
        ip: String,
        #[serde(default)]
        ports: Vec<u16>,
        #[serde(default)]
        isp: Option<String>,
        #[serde(default)]
        location: Option<String>,
        #[serde(default)]
        services: Vec<ServiceEntry>,
    },
}

impl IpEntry {
    pub fn addr(&self) -> &str {
        match self {
            IpEntry::Addr(a) => a,
            IpEntry::Record { ip, .. } => ip,
        }
    }
}

/// A discovered service on an IP/port
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    #[serde(default)]
    pub ip: Option<String>,
    pub port: u16,
    #[serde(alias = "name", default)]
    pub service: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
}

impl ServiceEntry {
    /// Display name, falling back to the port when unnamed
    pub fn display_name(&self) -> String {
        match &self.service {
            Some(name) => name.clone(),
            None => format!("Port {}", self.port),
        }
    }
}

// =============================================================================
// SCAN RESULT
// =============================================================================

/// The full payload returned by the reconnaissance collector. Every field
/// is optional; absent means empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub subdomains: Vec<SubdomainEntry>,
    #[serde(default)]
    pub domains: Vec<DomainEntry>,
    #[serde(default)]
    pub ips: Vec<IpEntry>,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

impl ScanResult {
    /// Parse a payload value, tolerating wrong-shaped fields.
    ///
    /// A field that fails to deserialize is dropped to its default rather
    /// than failing the whole payload.
    pub fn parse(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(map) = value else {
            return Self::default();
        };

        fn field<T: serde::de::DeserializeOwned + Default>(
            map: &serde_json::Map<String, serde_json::Value>,
            key: &str,
        ) -> T {
            map.get(key)
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default()
        }

        Self {
            target: field(&map, "target"),
            subdomains: field(&map, "subdomains"),
            domains: field(&map, "domains"),
            ips: field(&map, "ips"),
            services: field(&map, "services"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_none()
            && self.subdomains.is_empty()
            && self.domains.is_empty()
            && self.ips.is_empty()
            && self.services.is_empty()
    }
}
