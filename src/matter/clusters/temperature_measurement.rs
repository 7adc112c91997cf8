//! TemperatureMeasurement cluster (0x0402).
//!
//! Temperature is reported in centidegrees Celsius (value * 100).
//!
//! For example: 21.5°C is reported as 2150.

use crate::capabilities::{CapabilityEvent, TemperatureUnit};
use crate::error::{AdapterError, Result};
use crate::matter::attribute::{AttributeKey, RawValue};
use strum::FromRepr;

/// Matter Cluster ID for TemperatureMeasurement
pub const CLUSTER_ID: u32 = 0x0402;

/// Attribute IDs for the TemperatureMeasurement cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum TemperatureMeasurementAttribute {
    /// Measured temperature in centidegrees Celsius
    MeasuredValue = 0x0000,
    /// Minimum measurable temperature
    MinMeasuredValue = 0x0001,
    /// Maximum measurable temperature
    MaxMeasuredValue = 0x0002,
    /// Tolerance
    Tolerance = 0x0003,
}

pub const MEASURED_VALUE: AttributeKey = AttributeKey::new(
    CLUSTER_ID,
    TemperatureMeasurementAttribute::MeasuredValue as u32,
);

pub fn decode_measured_value(value: RawValue) -> Result<CapabilityEvent> {
    let centidegrees = value.as_int().ok_or(AdapterError::UnexpectedValue {
        key: MEASURED_VALUE,
        expected: "integer",
    })?;
    Ok(CapabilityEvent::Temperature {
        value: centidegrees as f64 / 100.0,
        unit: TemperatureUnit::Celsius,
    })
}
