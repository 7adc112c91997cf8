//! BooleanState cluster (0x0045) for contact sensors.
//!
//! StateValue `true` means the contact is made (closed).

use crate::capabilities::{CapabilityEvent, ContactState};
use crate::error::{AdapterError, Result};
use crate::matter::attribute::{AttributeKey, RawValue};
use strum::FromRepr;

/// Matter Cluster ID for BooleanState
pub const CLUSTER_ID: u32 = 0x0045;

/// Attribute IDs for the BooleanState cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum BooleanStateAttribute {
    /// The current state value (true/false)
    StateValue = 0x00,
}

pub const STATE_VALUE: AttributeKey =
    AttributeKey::new(CLUSTER_ID, BooleanStateAttribute::StateValue as u32);

pub fn decode_state_value(value: RawValue) -> Result<CapabilityEvent> {
    let state = value.as_bool().ok_or(AdapterError::UnexpectedValue {
        key: STATE_VALUE,
        expected: "boolean",
    })?;
    let value = if state {
        ContactState::Closed
    } else {
        ContactState::Open
    };
    Ok(CapabilityEvent::Contact { value })
}
