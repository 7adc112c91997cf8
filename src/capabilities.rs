//! Semantic capabilities and the typed events emitted for them.
//!
//! Capabilities are protocol-agnostic feature identifiers. Every decoded
//! attribute report becomes one [`CapabilityEvent`], addressed either at the
//! endpoint the report came from or at the device as a whole.

use crate::matter::attribute::EndpointId;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Capabilities this adapter knows how to profile and translate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Capability {
    MotionSensor,
    ContactSensor,
    IlluminanceMeasurement,
    TemperatureMeasurement,
    RelativeHumidityMeasurement,
    Battery,
}

impl Capability {
    /// Token used for this capability inside a profile name.
    pub const fn profile_token(&self) -> &'static str {
        match self {
            Self::MotionSensor => "motion",
            Self::ContactSensor => "contact",
            Self::IlluminanceMeasurement => "illuminance",
            Self::TemperatureMeasurement => "temperature",
            Self::RelativeHumidityMeasurement => "humidity",
            Self::Battery => "battery",
        }
    }

    /// Reverse of [`Capability::profile_token`].
    pub fn from_profile_token(token: &str) -> Option<Self> {
        match token {
            "motion" => Some(Self::MotionSensor),
            "contact" => Some(Self::ContactSensor),
            "illuminance" => Some(Self::IlluminanceMeasurement),
            "temperature" => Some(Self::TemperatureMeasurement),
            "humidity" => Some(Self::RelativeHumidityMeasurement),
            "battery" => Some(Self::Battery),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
}

/// A typed capability attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", rename_all = "lowercase")]
pub enum CapabilityEvent {
    Motion { value: MotionState },
    Contact { value: ContactState },
    Illuminance { value: u32 },
    Temperature { value: f64, unit: TemperatureUnit },
    Humidity { value: i64 },
    Battery { value: i64 },
}

impl CapabilityEvent {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Motion { .. } => Capability::MotionSensor,
            Self::Contact { .. } => Capability::ContactSensor,
            Self::Illuminance { .. } => Capability::IlluminanceMeasurement,
            Self::Temperature { .. } => Capability::TemperatureMeasurement,
            Self::Humidity { .. } => Capability::RelativeHumidityMeasurement,
            Self::Battery { .. } => Capability::Battery,
        }
    }

    /// Name of the capability attribute this event updates.
    pub fn attribute_name(&self) -> &'static str {
        match self {
            Self::Motion { .. } => "motion",
            Self::Contact { .. } => "contact",
            Self::Illuminance { .. } => "illuminance",
            Self::Temperature { .. } => "temperature",
            Self::Humidity { .. } => "humidity",
            Self::Battery { .. } => "battery",
        }
    }
}

/// Where an event is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTarget {
    Endpoint(EndpointId),
    Device,
}

/// A decoded event together with its delivery target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticEvent {
    pub target: EventTarget,
    pub event: CapabilityEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_capability_ids() {
        assert_eq!(Capability::MotionSensor.to_string(), "motionSensor");
        assert_eq!(
            Capability::RelativeHumidityMeasurement.to_string(),
            "relativeHumidityMeasurement"
        );
        assert_eq!(
            Capability::from_str("illuminanceMeasurement").unwrap(),
            Capability::IlluminanceMeasurement
        );
        assert_eq!(
            serde_json::to_string(&Capability::ContactSensor).unwrap(),
            "\"contactSensor\""
        );
    }

    #[test]
    fn test_profile_tokens_map_back() {
        for capability in Capability::iter() {
            let token = capability.profile_token();
            assert_eq!(Capability::from_profile_token(token), Some(capability));
        }
        assert_eq!(Capability::from_profile_token("pressure"), None);
    }

    #[test]
    fn test_event_serialization() {
        let event = SemanticEvent {
            target: EventTarget::Endpoint(1),
            event: CapabilityEvent::Temperature {
                value: 23.5,
                unit: TemperatureUnit::Celsius,
            },
        };
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            serde_json::json!({
                "target": {"endpoint": 1},
                "event": {"attribute": "temperature", "value": 23.5, "unit": "C"}
            })
        );

        let event = SemanticEvent {
            target: EventTarget::Device,
            event: CapabilityEvent::Motion {
                value: MotionState::Active,
            },
        };
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            serde_json::json!({
                "target": "device",
                "event": {"attribute": "motion", "value": "active"}
            })
        );
    }
}
