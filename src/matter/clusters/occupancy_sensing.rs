//! OccupancySensing cluster (0x0406) for motion/presence sensors.

use crate::capabilities::{CapabilityEvent, MotionState};
use crate::error::{AdapterError, Result};
use crate::matter::attribute::{AttributeKey, RawValue};
use strum::FromRepr;

/// Matter Cluster ID for OccupancySensing
pub const CLUSTER_ID: u32 = 0x0406;

/// Occupancy bitmap value reported while occupancy is sensed.
pub const OCCUPIED: i64 = 0x01;

/// Attribute IDs for the OccupancySensing cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum OccupancySensingAttribute {
    /// Bitmap8 where bit 0 indicates sensed occupancy
    Occupancy = 0x0000,
    /// The type of sensor (PIR, Ultrasonic, PhysicalContact, etc.)
    OccupancySensorType = 0x0001,
    /// Bitmap of supported sensor types
    OccupancySensorTypeBitmap = 0x0002,
}

pub const OCCUPANCY: AttributeKey =
    AttributeKey::new(CLUSTER_ID, OccupancySensingAttribute::Occupancy as u32);

/// Only an exact `0x01` bitmap counts as motion.
pub fn decode_occupancy(value: RawValue) -> Result<CapabilityEvent> {
    let bitmap = value.as_int().ok_or(AdapterError::UnexpectedValue {
        key: OCCUPANCY,
        expected: "integer",
    })?;
    let value = if bitmap == OCCUPIED {
        MotionState::Active
    } else {
        MotionState::Inactive
    };
    Ok(CapabilityEvent::Motion { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(raw: i64) -> MotionState {
        match decode_occupancy(RawValue::Int(raw)).unwrap() {
            CapabilityEvent::Motion { value } => value,
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_occupancy_bitmap() {
        assert_eq!(motion(0x01), MotionState::Active);
        assert_eq!(motion(0x00), MotionState::Inactive);
        assert_eq!(motion(0x02), MotionState::Inactive);
        assert_eq!(motion(0x03), MotionState::Inactive);
    }
}
