// Gatus API data models
//
// Wire types mirror the JSON returned by `/api/v1/...`; the public types are
// what the rest of the workspace consumes. Fields Gatus sends that nothing
// here uses (`status`, `conditionResults`, ...) are ignored by serde.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Config probe ────────────────────────────────────────────────────

/// Authentication capabilities reported by `GET /api/v1/config`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub oidc: bool,
    #[serde(default)]
    pub authenticated: bool,
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct RawEndpoint {
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    pub key: String,
    #[serde(default)]
    pub results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawResult {
    #[serde(default)]
    pub hostname: String,
    pub timestamp: String,
    pub success: bool,
    /// Nanoseconds.
    pub duration: u64,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

// ── Public types ────────────────────────────────────────────────────

/// Latest observed state of one monitored endpoint.
///
/// Always built from the most recent entry of the endpoint's result
/// history, never from an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub name: String,
    /// Empty when the endpoint is not grouped.
    pub group: String,
    pub key: String,
    pub hostname: String,
    /// ISO-8601 timestamp of the check, verbatim from the server.
    pub last_checked: String,
    pub success: bool,
    pub response_time_ns: u64,
    pub errors: Vec<String>,
}

impl EndpointStatus {
    /// Build from a wire endpoint. `None` when the history is empty.
    pub(crate) fn from_raw(raw: RawEndpoint) -> Option<Self> {
        let RawEndpoint {
            name,
            group,
            key,
            mut results,
        } = raw;
        let Some(last) = results.pop() else {
            debug!(key = %key, "endpoint has no results yet, skipping");
            return None;
        };
        Some(Self {
            name,
            group: group.unwrap_or_default(),
            key,
            hostname: last.hostname,
            last_checked: last.timestamp,
            success: last.success,
            response_time_ns: last.duration,
            errors: last.errors.unwrap_or_default(),
        })
    }
}

/// Current statuses of every monitored endpoint, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot {
    statuses: Vec<EndpointStatus>,
}

impl StatusSnapshot {
    pub fn new(statuses: Vec<EndpointStatus>) -> Self {
        Self { statuses }
    }

    pub(crate) fn from_raw(raw: Vec<RawEndpoint>) -> Self {
        Self::new(raw.into_iter().filter_map(EndpointStatus::from_raw).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EndpointStatus> {
        self.statuses.iter()
    }

    /// Look up an endpoint by its key.
    pub fn get(&self, key: &str) -> Option<&EndpointStatus> {
        self.statuses.iter().find(|s| s.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.statuses.iter().map(|s| s.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl<'a> IntoIterator for &'a StatusSnapshot {
    type Item = &'a EndpointStatus;
    type IntoIter = std::slice::Iter<'a, EndpointStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.statuses.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> StatusSnapshot {
        let raw: Vec<RawEndpoint> = serde_json::from_value(value).unwrap();
        StatusSnapshot::from_raw(raw)
    }

    #[test]
    fn empty_config_defaults_to_false() {
        let cfg: ServerConfig = serde_json::from_value(json!({})).unwrap();
        assert!(!cfg.oidc);
        assert!(!cfg.authenticated);
    }

    #[test]
    fn last_result_wins() {
        let snap = parse(json!([{
            "name": "atuin",
            "key": "apps_atuin",
            "results": [
                {"hostname": "old.example.com", "timestamp": "2025-02-04T04:14:22Z",
                 "success": true, "duration": 1},
                {"hostname": "atuin.example.com", "timestamp": "2025-02-04T04:14:33Z",
                 "success": false, "duration": 84_588_472,
                 "errors": ["dial tcp: no such host"]}
            ]
        }]));

        let status = snap.get("apps_atuin").unwrap();
        assert!(!status.success);
        assert_eq!(status.hostname, "atuin.example.com");
        assert_eq!(status.response_time_ns, 84_588_472);
        assert_eq!(status.errors, vec!["dial tcp: no such host".to_string()]);
        assert_eq!(status.last_checked, "2025-02-04T04:14:33Z");
        assert_eq!(status.group, "");
    }

    #[test]
    fn endpoint_without_results_is_skipped() {
        let snap = parse(json!([
            {"name": "new", "key": "new", "results": []},
            {"name": "old", "key": "old", "results": [
                {"hostname": "h", "timestamp": "t", "success": true, "duration": 5}
            ]}
        ]));
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["old"]);
    }

    #[test]
    fn snapshot_serializes_as_plain_list() {
        let snap = StatusSnapshot::default();
        assert_eq!(serde_json::to_value(&snap).unwrap(), json!([]));
    }
}
