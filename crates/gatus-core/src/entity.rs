// ── Binary sensor entities ──
//
// One `GatusBinarySensor` per monitored endpoint. The sensor itself holds
// only identity (ids, name, device info); its state is always computed
// from the coordinator's current snapshot, so nothing here goes stale.

use std::fmt;
use std::sync::Arc;

use gatus_api::{EndpointStatus, StatusSnapshot};
use serde::Serialize;

use crate::config::{ConfigEntry, DOMAIN};
use crate::coordinator::Coordinator;

/// Manufacturer shown on the per-entry service device.
pub const MANUFACTURER: &str = "Gatus Integration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Connectivity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceEntryType {
    Service,
}

/// Device-registry metadata. Every sensor of an entry shares one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(domain, entry_id)` pairs.
    pub identifiers: Vec<(String, String)>,
    pub manufacturer: String,
    pub entry_type: DeviceEntryType,
}

impl DeviceInfo {
    pub fn for_entry(entry: &ConfigEntry) -> Self {
        Self {
            identifiers: vec![(DOMAIN.to_string(), entry.entry_id.clone())],
            manufacturer: MANUFACTURER.to_string(),
            entry_type: DeviceEntryType::Service,
        }
    }
}

/// Extra state attributes published with every sensor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorAttributes {
    pub name: String,
    pub group: String,
    pub key: String,
    pub hostname: String,
    pub last_checked: String,
    /// Nanoseconds.
    pub response_time: u64,
    pub errors: Vec<String>,
    /// Gatus detail page for the endpoint.
    pub url: String,
}

/// What the host needs to create an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRegistration {
    pub unique_id: String,
    pub entity_id: String,
    pub name: String,
    pub device_class: DeviceClass,
    pub device_info: DeviceInfo,
}

/// A point-in-time state of one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorState {
    pub entity_id: String,
    /// `None` when the endpoint is absent from the cached snapshot.
    pub is_on: Option<bool>,
    pub available: bool,
    pub attributes: Option<SensorAttributes>,
}

impl SensorState {
    /// Host-style state string: `on`, `off`, or `unavailable`.
    pub fn state_str(&self) -> &'static str {
        match (self.available, self.is_on) {
            (true, Some(true)) => "on",
            (true, Some(false)) => "off",
            _ => "unavailable",
        }
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.entity_id, self.state_str())
    }
}

/// "Gatus endpoint is up" sensor for one endpoint key.
#[derive(Debug, Clone)]
pub struct GatusBinarySensor {
    entry: Arc<ConfigEntry>,
    key: String,
    name: String,
    unique_id: String,
    entity_id: String,
}

impl GatusBinarySensor {
    pub fn new(entry: Arc<ConfigEntry>, status: &EndpointStatus) -> Self {
        Self {
            unique_id: format!("{}_{}", entry.entry_id, status.key),
            entity_id: format!("binary_sensor.gatus_{}", status.key),
            key: status.key.clone(),
            name: status.name.clone(),
            entry,
        }
    }

    /// One sensor per endpoint in `snapshot`, in snapshot order.
    pub fn for_snapshot(entry: &Arc<ConfigEntry>, snapshot: &StatusSnapshot) -> Vec<Self> {
        snapshot
            .iter()
            .map(|status| Self::new(Arc::clone(entry), status))
            .collect()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::Connectivity
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::for_entry(&self.entry)
    }

    pub fn registration(&self) -> EntityRegistration {
        EntityRegistration {
            unique_id: self.unique_id.clone(),
            entity_id: self.entity_id.clone(),
            name: self.name.clone(),
            device_class: self.device_class(),
            device_info: self.device_info(),
        }
    }

    /// Whether the endpoint is up according to `snapshot`.
    pub fn is_on(&self, snapshot: &StatusSnapshot) -> Option<bool> {
        snapshot.get(&self.key).map(|s| s.success)
    }

    pub fn attributes(&self, status: &EndpointStatus) -> SensorAttributes {
        SensorAttributes {
            name: status.name.clone(),
            group: status.group.clone(),
            key: status.key.clone(),
            hostname: status.hostname.clone(),
            last_checked: status.last_checked.clone(),
            response_time: status.response_time_ns,
            errors: status.errors.clone(),
            url: self.entry.endpoint_url(&status.key),
        }
    }

    /// Compute the state from a snapshot and the outcome of the last refresh.
    pub fn state_from(&self, snapshot: Option<&StatusSnapshot>, last_update_success: bool) -> SensorState {
        let status = snapshot.and_then(|s| s.get(&self.key));
        SensorState {
            entity_id: self.entity_id.clone(),
            is_on: status.map(|s| s.success),
            available: last_update_success && status.is_some(),
            attributes: status.map(|s| self.attributes(s)),
        }
    }

    /// Current state according to `coordinator`.
    pub fn state(&self, coordinator: &Coordinator) -> SensorState {
        let snapshot = coordinator.data();
        self.state_from(snapshot.as_deref(), coordinator.last_update_success())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;

    fn entry() -> Arc<ConfigEntry> {
        Arc::new(ConfigEntry::new(
            "test_entry_id",
            "Test Gatus",
            Url::parse("http://test-url").unwrap(),
            false,
        ))
    }

    fn status(key: &str, success: bool) -> EndpointStatus {
        EndpointStatus {
            name: "test_name".into(),
            group: "test_group".into(),
            key: key.into(),
            hostname: "test_hostname".into(),
            last_checked: "2023-10-01T00:00:00Z".into(),
            success,
            response_time_ns: 100,
            errors: vec!["boom".into()],
        }
    }

    #[test]
    fn identity_is_derived_from_entry_and_key() {
        let sensor = GatusBinarySensor::new(entry(), &status("test_key", true));

        assert_eq!(sensor.unique_id(), "test_entry_id_test_key");
        assert_eq!(sensor.entity_id(), "binary_sensor.gatus_test_key");
        assert_eq!(sensor.name(), "test_name");
        assert_eq!(sensor.device_class(), DeviceClass::Connectivity);
        assert_eq!(
            sensor.device_info(),
            DeviceInfo {
                identifiers: vec![("gatus".into(), "test_entry_id".into())],
                manufacturer: "Gatus Integration".into(),
                entry_type: DeviceEntryType::Service,
            }
        );
    }

    #[test]
    fn attributes_include_status_url() {
        let st = status("test_key", true);
        let sensor = GatusBinarySensor::new(entry(), &st);

        assert_eq!(
            sensor.attributes(&st),
            SensorAttributes {
                name: "test_name".into(),
                group: "test_group".into(),
                key: "test_key".into(),
                hostname: "test_hostname".into(),
                last_checked: "2023-10-01T00:00:00Z".into(),
                response_time: 100,
                errors: vec!["boom".into()],
                url: "http://test-url/endpoints/test_key".into(),
            }
        );
    }

    #[test]
    fn is_on_tracks_the_given_snapshot() {
        let sensor = GatusBinarySensor::new(entry(), &status("a", true));

        let up = StatusSnapshot::new(vec![status("a", true)]);
        let down = StatusSnapshot::new(vec![status("a", false)]);
        let gone = StatusSnapshot::new(vec![status("b", true)]);

        assert_eq!(sensor.is_on(&up), Some(true));
        assert_eq!(sensor.is_on(&down), Some(false));
        assert_eq!(sensor.is_on(&gone), None);
    }

    #[test]
    fn state_strings() {
        let sensor = GatusBinarySensor::new(entry(), &status("a", true));
        let snap = StatusSnapshot::new(vec![status("a", false)]);

        assert_eq!(sensor.state_from(Some(&snap), true).state_str(), "off");
        assert_eq!(sensor.state_from(Some(&snap), false).state_str(), "unavailable");
        assert_eq!(sensor.state_from(None, true).state_str(), "unavailable");

        let failed = sensor.state_from(Some(&snap), false);
        assert_eq!(failed.is_on, Some(false));
        assert!(failed.attributes.is_some());
    }

    #[test]
    fn one_sensor_per_endpoint_in_order() {
        let snap = StatusSnapshot::new(vec![status("apps_atuin", true), status("atuin", false)]);
        let sensors = GatusBinarySensor::for_snapshot(&entry(), &snap);

        let ids: Vec<_> = sensors.iter().map(GatusBinarySensor::entity_id).collect();
        assert_eq!(ids, vec!["binary_sensor.gatus_apps_atuin", "binary_sensor.gatus_atuin"]);
    }
}
