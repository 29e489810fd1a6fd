// Record types for the three logical tables.
//
// The backing data service is schemaless: records carry a server-assigned
// `_id` plus whatever the writer stored. Known fields are modeled
// explicitly; everything else lands in `extra`.

use serde::{Deserialize, Serialize};

// ── Resource envelope ────────────────────────────────────────────────

/// List payloads are wrapped by the data service:
/// ```json
/// { "resource": [ {...}, {...} ] }
/// ```
#[derive(Debug, Deserialize)]
pub struct ResourceSet<T> {
    #[serde(default = "Vec::new")]
    pub resource: Vec<T>,
}

/// Minimal projection of any record down to its identifier.
///
/// Used when a lookup or create only needs the `_id` back.
#[derive(Debug, Deserialize)]
pub struct RecordId {
    #[serde(rename = "_id")]
    pub id: String,
}

// ── Device ───────────────────────────────────────────────────────────

/// A registered device, keyed by its hardware (MAC) identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub mac: String,
    /// Catch-all for the arbitrary attribute payload stored at registration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Device group ─────────────────────────────────────────────────────

/// A set of devices collectively owned by one user.
///
/// `mac` is the member list; a device belongs to at most one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceGroup {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub mac: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── User-group link ──────────────────────────────────────────────────

/// Association between a user and their device group.
///
/// One active link per user; first match wins on lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDeviceGroup {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: i64,
    pub group_id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
