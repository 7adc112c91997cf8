//! Device collaborator boundary.
//!
//! The lifecycle coordinator never owns a device. It reads device metadata
//! through [`SensorDevice`], keeps its own per-device state in a
//! [`FieldStore`], and hands results to an [`EventSink`] and a
//! [`ProfileManager`]. Hosts implement these traits.

pub mod coordinator;
pub mod field_store;
pub mod virtual_device;

use crate::capabilities::{Capability, CapabilityEvent};
use crate::error::Result;
use crate::matter::attribute::{AttributeKey, ClusterId, EndpointId};
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use coordinator::{LifecycleCoordinator, ProfileState};
pub use field_store::{FieldStore, FieldValue, JsonFieldStore, MemoryFieldStore};
pub use virtual_device::{ClusterConfig, DeviceConfig, EndpointConfig, VirtualDevice};

/// Read access to a device's metadata.
pub trait SensorDevice: Send + Sync {
    /// Stable device identity.
    fn id(&self) -> &str;

    /// Endpoints exposing `cluster_id`. With a feature filter, only endpoints
    /// whose cluster feature map contains every filter bit are returned.
    fn endpoints(&self, cluster_id: ClusterId, feature_filter: Option<u32>) -> Vec<EndpointId>;

    /// Capabilities the registry declared for the device at pairing time.
    fn declared_capabilities(&self) -> BTreeSet<Capability>;

    /// Whether the device's active profile supports `capability`.
    fn supports_capability(&self, capability: Capability) -> bool;

    /// Currently applied profile.
    fn profile(&self) -> Profile;
}

/// Receives decoded capability events.
pub trait EventSink: Send + Sync {
    fn emit_event_for_endpoint(
        &self,
        device_id: &str,
        endpoint_id: EndpointId,
        event: CapabilityEvent,
    );

    /// Device-scoped event, not tied to an endpoint.
    fn emit_event(&self, device_id: &str, event: CapabilityEvent);
}

/// Applies profiles and attribute subscriptions on the host side.
pub trait ProfileManager: Send + Sync {
    fn update_profile(&self, device_id: &str, profile: &Profile) -> Result<()>;

    fn subscribe(&self, device_id: &str, attributes: &BTreeSet<AttributeKey>) -> Result<()>;
}

/// Old and new profile carried by a metadata change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChange {
    pub old: Profile,
    pub new: Profile,
}

impl ProfileChange {
    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }
}
