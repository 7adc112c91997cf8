//! RelativeHumidityMeasurement cluster (0x0405).
//!
//! Humidity is reported in centi-percent (value * 100).
//!
//! For example: 55.5% is reported as 5550.

use crate::capabilities::CapabilityEvent;
use crate::error::{AdapterError, Result};
use crate::matter::attribute::{AttributeKey, RawValue};
use strum::FromRepr;

/// Matter Cluster ID for RelativeHumidityMeasurement
pub const CLUSTER_ID: u32 = 0x0405;

/// Attribute IDs for the RelativeHumidityMeasurement cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum RelativeHumidityAttribute {
    /// Measured humidity in centi-percent
    MeasuredValue = 0x0000,
    /// Minimum measurable humidity
    MinMeasuredValue = 0x0001,
    /// Maximum measurable humidity
    MaxMeasuredValue = 0x0002,
    /// Tolerance
    Tolerance = 0x0003,
}

pub const MEASURED_VALUE: AttributeKey =
    AttributeKey::new(CLUSTER_ID, RelativeHumidityAttribute::MeasuredValue as u32);

/// Whole percent, rounded half away from zero.
pub fn decode_measured_value(value: RawValue) -> Result<CapabilityEvent> {
    let centipercent = value.as_int().ok_or(AdapterError::UnexpectedValue {
        key: MEASURED_VALUE,
        expected: "integer",
    })?;
    Ok(CapabilityEvent::Humidity {
        value: (centipercent as f64 / 100.0).round() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn humidity(raw: i64) -> i64 {
        match decode_measured_value(RawValue::Int(raw)).unwrap() {
            CapabilityEvent::Humidity { value } => value,
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_rounds_to_whole_percent() {
        assert_eq!(humidity(4567), 46);
        assert_eq!(humidity(4549), 45);
        assert_eq!(humidity(4550), 46);
        assert_eq!(humidity(0), 0);
        assert_eq!(humidity(10000), 100);
    }
}
