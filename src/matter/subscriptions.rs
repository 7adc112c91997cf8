//! Attributes backing each capability.
//!
//! A device subscribes to the union of the backing attributes of every
//! capability it currently supports.

use super::attribute::AttributeKey;
use super::clusters::{
    boolean_state, illuminance_measurement, occupancy_sensing, power_source, relative_humidity,
    temperature_measurement,
};
use crate::capabilities::Capability;
use std::collections::BTreeSet;
use strum::IntoEnumIterator;

/// The protocol attributes a capability is fed from.
pub fn backing_attributes(capability: Capability) -> &'static [AttributeKey] {
    match capability {
        Capability::MotionSensor => &[occupancy_sensing::OCCUPANCY],
        Capability::ContactSensor => &[boolean_state::STATE_VALUE],
        Capability::IlluminanceMeasurement => &[illuminance_measurement::MEASURED_VALUE],
        Capability::TemperatureMeasurement => &[temperature_measurement::MEASURED_VALUE],
        Capability::RelativeHumidityMeasurement => &[relative_humidity::MEASURED_VALUE],
        Capability::Battery => &[power_source::BAT_PERCENT_REMAINING],
    }
}

/// Union of backing attributes over all capabilities accepted by `supports`.
pub fn attribute_set(supports: impl Fn(Capability) -> bool) -> BTreeSet<AttributeKey> {
    Capability::iter()
        .filter(|capability| supports(*capability))
        .flat_map(|capability| backing_attributes(capability).iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_and_battery_union() {
        let set = attribute_set(|c| matches!(c, Capability::MotionSensor | Capability::Battery));
        let expected: BTreeSet<_> = [
            occupancy_sensing::OCCUPANCY,
            power_source::BAT_PERCENT_REMAINING,
        ]
        .into_iter()
        .collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_no_capabilities_no_subscriptions() {
        assert!(attribute_set(|_| false).is_empty());
    }

    #[test]
    fn test_every_backing_attribute_is_decodable() {
        let table = crate::matter::decoder::DecoderTable::sensors();
        for key in attribute_set(|_| true) {
            assert!(table.contains(&key), "{key} has no decoder");
        }
    }
}
