//! Schema-stable JSON snapshot
//!
//! The output object always carries the same five keys. A section the
//! settings exclude is emitted as an empty list, never omitted, so
//! downstream consumers can index unconditionally.

use serde_json::json;

use super::ExportSettings;
use crate::payload::ScanResult;

pub fn render(scan: &ScanResult, settings: &ExportSettings) -> String {
    let section = |enabled: bool, value: serde_json::Value| -> serde_json::Value {
        if enabled {
            value
        } else {
            json!([])
        }
    };

    let doc = json!({
        "target": scan.target.as_deref().unwrap_or(""),
        "date": chrono::Local::now().format("%Y-%m-%d").to_string(),
        "subdomains": section(
            settings.include_subdomains,
            serde_json::to_value(&scan.subdomains).unwrap_or_else(|_| json!([])),
        ),
        "ips": section(
            settings.include_ips,
            serde_json::to_value(&scan.ips).unwrap_or_else(|_| json!([])),
        ),
        "services": section(
            settings.include_services,
            serde_json::to_value(&scan.services).unwrap_or_else(|_| json!([])),
        ),
    });

    // Object serialization of plain data cannot fail; fall back to the
    // empty object rather than unwrapping
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}
