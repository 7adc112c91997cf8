//! Virtual Device definitions for hosts that run devices in-process.
//!
//! A Virtual Device is described by configuration: a label, the
//! capabilities the registry declared for it, and its endpoints with the
//! clusters (and cluster feature maps) each endpoint exposes.

use super::SensorDevice;
use crate::capabilities::Capability;
use crate::matter::attribute::{AttributeKey, ClusterId, EndpointId};
use crate::matter::clusters::{
    boolean_state, illuminance_measurement, occupancy_sensing, power_source, relative_humidity,
    temperature_measurement,
};
use crate::profile::Profile;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A cluster instance on an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub id: ClusterId,
    #[serde(default)]
    pub feature_map: u32,
}

/// Configuration for one endpoint of a Virtual Device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub id: EndpointId,
    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,
}

impl EndpointConfig {
    pub fn new(id: EndpointId) -> Self {
        Self {
            id,
            clusters: Vec::new(),
        }
    }

    /// Add a cluster with an empty feature map.
    pub fn with_cluster(self, id: ClusterId) -> Self {
        self.with_cluster_features(id, 0)
    }

    pub fn with_cluster_features(mut self, id: ClusterId, feature_map: u32) -> Self {
        self.clusters.push(ClusterConfig { id, feature_map });
        self
    }

    /// Add a battery-backed PowerSource cluster.
    pub fn with_battery(self) -> Self {
        self.with_cluster_features(
            power_source::CLUSTER_ID,
            power_source::feature::BATTERY | power_source::feature::REPLACEABLE,
        )
    }

    /// Add a mains-powered PowerSource cluster.
    pub fn with_wired_power(self) -> Self {
        self.with_cluster_features(power_source::CLUSTER_ID, power_source::feature::WIRED)
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&ClusterConfig> {
        self.clusters.iter().find(|c| c.id == id)
    }
}

/// Static description of a Virtual Device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Declared capabilities. When omitted they are derived from the
    /// endpoint clusters.
    #[serde(default)]
    pub capabilities: Option<Vec<Capability>>,
    pub endpoints: Vec<EndpointConfig>,
}

impl DeviceConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            capabilities: None,
            endpoints: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: &[Capability]) -> Self {
        self.capabilities = Some(capabilities.to_vec());
        self
    }

    pub fn with_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Capabilities implied by the clusters present on any endpoint.
    /// Battery is not derived; it comes from the PowerSource feature map.
    pub fn derived_capabilities(&self) -> BTreeSet<Capability> {
        self.endpoints
            .iter()
            .flat_map(|ep| ep.clusters.iter())
            .filter_map(|cluster| match cluster.id {
                occupancy_sensing::CLUSTER_ID => Some(Capability::MotionSensor),
                boolean_state::CLUSTER_ID => Some(Capability::ContactSensor),
                illuminance_measurement::CLUSTER_ID => Some(Capability::IlluminanceMeasurement),
                temperature_measurement::CLUSTER_ID => Some(Capability::TemperatureMeasurement),
                relative_humidity::CLUSTER_ID => Some(Capability::RelativeHumidityMeasurement),
                _ => None,
            })
            .collect()
    }
}

/// A device living inside this process.
///
/// Until a profile is applied, the supported capabilities are the declared
/// ones. After that they follow the profile's tokens.
pub struct VirtualDevice {
    config: DeviceConfig,
    declared: BTreeSet<Capability>,
    profile: RwLock<Option<Profile>>,
    subscriptions: RwLock<BTreeSet<AttributeKey>>,
}

impl VirtualDevice {
    pub fn new(config: DeviceConfig) -> Self {
        let declared = match &config.capabilities {
            Some(list) => list.iter().copied().collect(),
            None => config.derived_capabilities(),
        };
        Self {
            config,
            declared,
            profile: RwLock::new(None),
            subscriptions: RwLock::new(BTreeSet::new()),
        }
    }

    /// Restore a profile applied in an earlier run.
    pub fn with_profile(self, profile: Profile) -> Self {
        *self.profile.write() = Some(profile);
        self
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Apply `profile` and return the previous one.
    pub fn apply_profile(&self, profile: Profile) -> Profile {
        self.profile
            .write()
            .replace(profile)
            .unwrap_or_default()
    }

    pub fn set_subscriptions(&self, attributes: BTreeSet<AttributeKey>) {
        *self.subscriptions.write() = attributes;
    }

    pub fn subscriptions(&self) -> BTreeSet<AttributeKey> {
        self.subscriptions.read().clone()
    }

    /// First endpoint exposing `cluster_id`.
    pub fn endpoint_for(&self, cluster_id: ClusterId) -> Option<EndpointId> {
        self.config
            .endpoints
            .iter()
            .find(|ep| ep.cluster(cluster_id).is_some())
            .map(|ep| ep.id)
    }
}

impl SensorDevice for VirtualDevice {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn endpoints(&self, cluster_id: ClusterId, feature_filter: Option<u32>) -> Vec<EndpointId> {
        self.config
            .endpoints
            .iter()
            .filter(|ep| {
                ep.cluster(cluster_id).is_some_and(|cluster| match feature_filter {
                    Some(bits) => cluster.feature_map & bits == bits,
                    None => true,
                })
            })
            .map(|ep| ep.id)
            .collect()
    }

    fn declared_capabilities(&self) -> BTreeSet<Capability> {
        self.declared.clone()
    }

    fn supports_capability(&self, capability: Capability) -> bool {
        match self.profile.read().as_ref() {
            Some(profile) => profile.capabilities().contains(&capability),
            None => self.declared.contains(&capability),
        }
    }

    fn profile(&self) -> Profile {
        self.profile.read().clone().unwrap_or_default()
    }
}
