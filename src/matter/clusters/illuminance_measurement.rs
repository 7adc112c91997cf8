//! IlluminanceMeasurement cluster (0x0400).
//!
//! MeasuredValue uses the logarithmic lux encoding:
//! `MeasuredValue = 10000 * log10(lux) + 1`, so decoding inverts it as
//! `lux = 10^((MeasuredValue - 1) / 10000)`.

use crate::capabilities::CapabilityEvent;
use crate::error::{AdapterError, Result};
use crate::matter::attribute::{AttributeKey, RawValue};
use strum::FromRepr;

/// Matter Cluster ID for IlluminanceMeasurement
pub const CLUSTER_ID: u32 = 0x0400;

/// Attribute IDs for the IlluminanceMeasurement cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum IlluminanceMeasurementAttribute {
    /// Log-encoded illuminance
    MeasuredValue = 0x0000,
    MinMeasuredValue = 0x0001,
    MaxMeasuredValue = 0x0002,
    Tolerance = 0x0003,
    LightSensorType = 0x0004,
}

pub const MEASURED_VALUE: AttributeKey = AttributeKey::new(
    CLUSTER_ID,
    IlluminanceMeasurementAttribute::MeasuredValue as u32,
);

/// Convert a log-encoded MeasuredValue to whole lux (floored).
pub fn lux_from_measured(raw: i64) -> u32 {
    10f64.powf((raw - 1) as f64 / 10000.0).floor() as u32
}

pub fn decode_measured_value(value: RawValue) -> Result<CapabilityEvent> {
    let raw = value.as_int().ok_or(AdapterError::UnexpectedValue {
        key: MEASURED_VALUE,
        expected: "integer",
    })?;
    Ok(CapabilityEvent::Illuminance {
        value: lux_from_measured(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_lux_decoding() {
        assert_eq!(lux_from_measured(40001), 10000);
        assert_eq!(lux_from_measured(1), 1);
        assert_eq!(lux_from_measured(10001), 10);
        // 10^(0.5) = 3.16..
        assert_eq!(lux_from_measured(5001), 3);
        assert_eq!(lux_from_measured(0), 0);
    }

    #[test]
    fn test_rejects_boolean_payload() {
        assert!(decode_measured_value(RawValue::Bool(true)).is_err());
    }
}
