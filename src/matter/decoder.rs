//! Attribute decoder table.
//!
//! Maps an [`AttributeKey`] to the function that turns its raw payload into a
//! capability event, plus the scope the event is delivered at. Keys missing
//! from the table are ignored.

use super::attribute::{AttributeKey, AttributeReport, RawValue};
use super::clusters::{
    boolean_state, illuminance_measurement, occupancy_sensing, power_source, relative_humidity,
    temperature_measurement,
};
use crate::capabilities::{CapabilityEvent, EventTarget, SemanticEvent};
use crate::error::Result;
use std::collections::HashMap;

/// Pure decode function for one attribute.
pub type DecodeFn = fn(RawValue) -> Result<CapabilityEvent>;

/// Whether an event is addressed at the reporting endpoint or the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    Endpoint,
    Device,
}

#[derive(Clone, Copy)]
pub struct DecoderEntry {
    pub decode: DecodeFn,
    pub scope: EventScope,
}

pub struct DecoderTable {
    entries: HashMap<AttributeKey, DecoderEntry>,
}

impl DecoderTable {
    /// An empty table; use [`DecoderTable::with_entry`] to populate it.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The sensor table: illuminance, temperature, humidity and contact at
    /// endpoint scope; battery and motion at device scope.
    pub fn sensors() -> Self {
        Self::empty()
            .with_entry(
                illuminance_measurement::MEASURED_VALUE,
                illuminance_measurement::decode_measured_value,
                EventScope::Endpoint,
            )
            .with_entry(
                temperature_measurement::MEASURED_VALUE,
                temperature_measurement::decode_measured_value,
                EventScope::Endpoint,
            )
            .with_entry(
                relative_humidity::MEASURED_VALUE,
                relative_humidity::decode_measured_value,
                EventScope::Endpoint,
            )
            .with_entry(
                boolean_state::STATE_VALUE,
                boolean_state::decode_state_value,
                EventScope::Endpoint,
            )
            .with_entry(
                power_source::BAT_PERCENT_REMAINING,
                power_source::decode_bat_percent_remaining,
                EventScope::Device,
            )
            .with_entry(
                occupancy_sensing::OCCUPANCY,
                occupancy_sensing::decode_occupancy,
                EventScope::Device,
            )
    }

    pub fn with_entry(mut self, key: AttributeKey, decode: DecodeFn, scope: EventScope) -> Self {
        self.entries.insert(key, DecoderEntry { decode, scope });
        self
    }

    pub fn contains(&self, key: &AttributeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &AttributeKey> {
        self.entries.keys()
    }

    /// Decode one report.
    ///
    /// Returns `Ok(None)` for unmapped keys and for absent payloads. A payload
    /// of the wrong type is an error.
    pub fn decode(&self, report: &AttributeReport) -> Result<Option<SemanticEvent>> {
        let Some(entry) = self.entries.get(&report.key()) else {
            return Ok(None);
        };
        let Some(value) = report.value else {
            return Ok(None);
        };

        let event = (entry.decode)(value)?;
        let target = match entry.scope {
            EventScope::Endpoint => EventTarget::Endpoint(report.endpoint_id),
            EventScope::Device => EventTarget::Device,
        };
        Ok(Some(SemanticEvent { target, event }))
    }
}

impl Default for DecoderTable {
    fn default() -> Self {
        Self::sensors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{ContactState, MotionState, TemperatureUnit};

    fn decode(key: AttributeKey, endpoint: u16, value: Option<RawValue>) -> Option<SemanticEvent> {
        DecoderTable::sensors()
            .decode(&AttributeReport::new(endpoint, key, value))
            .unwrap()
    }

    #[test]
    fn test_illuminance_is_endpoint_scoped() {
        assert_eq!(
            decode(
                illuminance_measurement::MEASURED_VALUE,
                2,
                Some(RawValue::Int(40001))
            ),
            Some(SemanticEvent {
                target: EventTarget::Endpoint(2),
                event: CapabilityEvent::Illuminance { value: 10000 },
            })
        );
    }

    #[test]
    fn test_temperature_and_humidity() {
        assert_eq!(
            decode(
                temperature_measurement::MEASURED_VALUE,
                1,
                Some(RawValue::Int(2350))
            ),
            Some(SemanticEvent {
                target: EventTarget::Endpoint(1),
                event: CapabilityEvent::Temperature {
                    value: 23.5,
                    unit: TemperatureUnit::Celsius
                },
            })
        );
        assert_eq!(
            decode(relative_humidity::MEASURED_VALUE, 3, Some(RawValue::Int(4567))),
            Some(SemanticEvent {
                target: EventTarget::Endpoint(3),
                event: CapabilityEvent::Humidity { value: 46 },
            })
        );
    }

    #[test]
    fn test_contact_state() {
        let closed = decode(boolean_state::STATE_VALUE, 1, Some(RawValue::Bool(true)));
        assert_eq!(
            closed.map(|e| e.event),
            Some(CapabilityEvent::Contact {
                value: ContactState::Closed
            })
        );
        let open = decode(boolean_state::STATE_VALUE, 1, Some(RawValue::Bool(false)));
        assert_eq!(
            open.map(|e| e.event),
            Some(CapabilityEvent::Contact {
                value: ContactState::Open
            })
        );
    }

    #[test]
    fn test_battery_and_motion_are_device_scoped() {
        assert_eq!(
            decode(
                power_source::BAT_PERCENT_REMAINING,
                1,
                Some(RawValue::Int(150))
            ),
            Some(SemanticEvent {
                target: EventTarget::Device,
                event: CapabilityEvent::Battery { value: 75 },
            })
        );
        assert_eq!(
            decode(occupancy_sensing::OCCUPANCY, 4, Some(RawValue::Int(0x01))),
            Some(SemanticEvent {
                target: EventTarget::Device,
                event: CapabilityEvent::Motion {
                    value: MotionState::Active
                },
            })
        );
    }

    #[test]
    fn test_absent_battery_emits_nothing() {
        assert_eq!(decode(power_source::BAT_PERCENT_REMAINING, 1, None), None);
    }

    #[test]
    fn test_unmapped_key_is_ignored() {
        let table = DecoderTable::sensors();
        let key = AttributeKey::new(9999, 1);
        assert!(!table.contains(&key));
        let report = AttributeReport::new(1, key, Some(RawValue::Int(5)));
        assert!(table.decode(&report).unwrap().is_none());
    }

    #[test]
    fn test_wrong_payload_type_is_an_error() {
        let table = DecoderTable::sensors();
        let report = AttributeReport::new(
            1,
            temperature_measurement::MEASURED_VALUE,
            Some(RawValue::Bool(true)),
        );
        assert!(table.decode(&report).is_err());
    }

    #[test]
    fn test_table_has_six_entries() {
        assert_eq!(DecoderTable::sensors().keys().count(), 6);
    }
}
