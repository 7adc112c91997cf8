//! PowerSource cluster (0x002F).
//!
//! BatPercentRemaining is reported in half-percent steps (0-200) and is
//! nullable; a null value means no reading is available.

use crate::capabilities::CapabilityEvent;
use crate::error::{AdapterError, Result};
use crate::matter::attribute::{AttributeKey, RawValue};
use strum::FromRepr;

/// Matter Cluster ID for PowerSource
pub const CLUSTER_ID: u32 = 0x002F;

/// PowerSource feature map bits.
pub mod feature {
    pub const WIRED: u32 = 0x01;
    pub const BATTERY: u32 = 0x02;
    pub const RECHARGEABLE: u32 = 0x04;
    pub const REPLACEABLE: u32 = 0x08;
}

/// Attribute IDs for the PowerSource cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum PowerSourceAttribute {
    Status = 0x0000,
    Order = 0x0001,
    Description = 0x0002,
    BatVoltage = 0x000B,
    /// Remaining charge in half-percent units
    BatPercentRemaining = 0x000C,
    BatTimeRemaining = 0x000D,
    BatChargeLevel = 0x000E,
}

pub const BAT_PERCENT_REMAINING: AttributeKey = AttributeKey::new(
    CLUSTER_ID,
    PowerSourceAttribute::BatPercentRemaining as u32,
);

/// Half-percent units to whole percent, rounding half up.
pub fn percent_from_half_percent(raw: i64) -> i64 {
    (raw as f64 / 2.0 + 0.5).floor() as i64
}

pub fn decode_bat_percent_remaining(value: RawValue) -> Result<CapabilityEvent> {
    let raw = value.as_int().ok_or(AdapterError::UnexpectedValue {
        key: BAT_PERCENT_REMAINING,
        expected: "integer",
    })?;
    Ok(CapabilityEvent::Battery {
        value: percent_from_half_percent(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_percent_rounding() {
        assert_eq!(percent_from_half_percent(150), 75);
        assert_eq!(percent_from_half_percent(151), 76);
        assert_eq!(percent_from_half_percent(200), 100);
        assert_eq!(percent_from_half_percent(1), 1);
        assert_eq!(percent_from_half_percent(0), 0);
    }

    #[test]
    fn test_decodes_battery_event() {
        assert_eq!(
            decode_bat_percent_remaining(RawValue::Int(151)).unwrap(),
            CapabilityEvent::Battery { value: 76 }
        );
    }
}
