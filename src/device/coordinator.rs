//! Device lifecycle coordinator.
//!
//! Per device the coordinator moves from `Uninitialized` to `Profiled`
//! exactly once: the first init with no persisted inference flag infers the
//! profile, applies it and persists the flag. Every init then subscribes to
//! the attributes backing the device's supported capabilities, and every
//! profile change re-subscribes. Attribute reports are decoded through the
//! [`DecoderTable`] and forwarded to the event sink.

use super::field_store::{FieldStore, FieldValue};
use super::{EventSink, ProfileChange, ProfileManager, SensorDevice};
use crate::capabilities::{EventTarget, SemanticEvent};
use crate::error::Result;
use crate::matter::attribute::{AttributeKey, AttributeReport};
use crate::matter::decoder::DecoderTable;
use crate::matter::subscriptions::attribute_set;
use crate::profile::{self, Profile};
use log::{debug, info, trace, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Field keys owned by the coordinator.
pub mod fields {
    /// Set once the profile has been inferred and applied.
    pub const PROFILE_INFERRED: &str = "profile_inferred";
    /// The profile that was inferred.
    pub const PROFILE: &str = "profile";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileState {
    Uninitialized,
    Profiled,
}

/// Attributes a device should be subscribed to right now.
pub fn subscription_set(device: &dyn SensorDevice) -> BTreeSet<AttributeKey> {
    attribute_set(|capability| device.supports_capability(capability))
}

pub struct LifecycleCoordinator {
    fields: Arc<dyn FieldStore>,
    sink: Arc<dyn EventSink>,
    profiles: Arc<dyn ProfileManager>,
    decoders: DecoderTable,
}

impl LifecycleCoordinator {
    pub fn new(
        fields: Arc<dyn FieldStore>,
        sink: Arc<dyn EventSink>,
        profiles: Arc<dyn ProfileManager>,
    ) -> Self {
        Self {
            fields,
            sink,
            profiles,
            decoders: DecoderTable::sensors(),
        }
    }

    pub fn with_decoders(mut self, decoders: DecoderTable) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn profile_state(&self, device_id: &str) -> ProfileState {
        let inferred = self
            .fields
            .get_field(device_id, fields::PROFILE_INFERRED)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if inferred {
            ProfileState::Profiled
        } else {
            ProfileState::Uninitialized
        }
    }

    /// Profile persisted by an earlier inference, if any.
    pub fn persisted_profile(&self, device_id: &str) -> Option<Profile> {
        self.fields
            .get_field(device_id, fields::PROFILE)?
            .as_text()?
            .parse()
            .ok()
    }

    /// Device init callback.
    ///
    /// The persisted flag is checked before inference, so a device that was
    /// already profiled keeps its profile across restarts.
    pub fn on_init(&self, device: &dyn SensorDevice) -> Result<()> {
        let device_id = device.id();

        match self.profile_state(device_id) {
            ProfileState::Uninitialized => {
                let inferred = profile::inspect(device);
                info!("[{}] Inferred profile '{}'", device_id, inferred);
                self.profiles.update_profile(device_id, &inferred)?;
                self.fields.set_fields(
                    device_id,
                    &[
                        (fields::PROFILE, FieldValue::Text(inferred.to_string())),
                        (fields::PROFILE_INFERRED, FieldValue::Bool(true)),
                    ],
                    true,
                )?;
            }
            ProfileState::Profiled => {
                debug!(
                    "[{}] Profile already inferred ('{}'), skipping",
                    device_id,
                    device.profile()
                );
            }
        }

        self.subscribe(device)
    }

    /// Device metadata change callback. Returns true when it re-subscribed.
    pub fn on_info_changed(&self, device: &dyn SensorDevice, change: &ProfileChange) -> Result<bool> {
        if !change.is_changed() {
            trace!("[{}] Metadata changed, profile unchanged", device.id());
            return Ok(false);
        }
        info!(
            "[{}] Profile changed '{}' -> '{}', re-subscribing",
            device.id(),
            change.old,
            change.new
        );
        self.subscribe(device)?;
        Ok(true)
    }

    /// Attribute report callback. Returns the event that was emitted, if any.
    pub fn on_attribute_report(
        &self,
        device: &dyn SensorDevice,
        report: &AttributeReport,
    ) -> Option<SemanticEvent> {
        let device_id = device.id();
        if !report.is_success() {
            debug!(
                "[{}] Report for {} on endpoint {} has status {:?}",
                device_id,
                report.key(),
                report.endpoint_id,
                report.status
            );
        }

        let decoded = match self.decoders.decode(report) {
            Ok(Some(event)) => event,
            Ok(None) => {
                trace!(
                    "[{}] No event for {} on endpoint {}",
                    device_id,
                    report.key(),
                    report.endpoint_id
                );
                return None;
            }
            Err(e) => {
                warn!("[{}] Dropping report on endpoint {}: {}", device_id, report.endpoint_id, e);
                return None;
            }
        };

        match decoded.target {
            EventTarget::Endpoint(endpoint_id) => {
                self.sink
                    .emit_event_for_endpoint(device_id, endpoint_id, decoded.event.clone())
            }
            EventTarget::Device => self.sink.emit_event(device_id, decoded.event.clone()),
        }
        Some(decoded)
    }

    fn subscribe(&self, device: &dyn SensorDevice) -> Result<()> {
        let attributes = subscription_set(device);
        debug!(
            "[{}] Subscribing to {} attribute(s)",
            device.id(),
            attributes.len()
        );
        self.profiles.subscribe(device.id(), &attributes)
    }
}
