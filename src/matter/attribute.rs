//! Attribute addressing and raw report payloads.
//!
//! An attribute is addressed by its cluster and attribute ID. The pair forms
//! the lookup key for the decoder table and the element type of a device's
//! subscription set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Matter cluster identifier.
pub type ClusterId = u32;

/// Attribute identifier, scoped to its cluster.
pub type AttributeId = u32;

/// Endpoint identifier within a node.
pub type EndpointId = u16;

/// Composite (cluster, attribute) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeKey {
    pub cluster_id: ClusterId,
    pub attribute_id: AttributeId,
}

impl AttributeKey {
    pub const fn new(cluster_id: ClusterId, attribute_id: AttributeId) -> Self {
        Self {
            cluster_id,
            attribute_id,
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}/0x{:04X}", self.cluster_id, self.attribute_id)
    }
}

/// Raw attribute payload as delivered by the protocol layer.
///
/// Deserializes from a bare JSON boolean or integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
}

impl RawValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Bool(b) => Some(*b),
            RawValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            RawValue::Int(i) => Some(*i),
            RawValue::Bool(_) => None,
        }
    }
}

/// Interaction model status code for a successful report.
pub const STATUS_SUCCESS: u8 = 0x00;

/// A single attribute report for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeReport {
    pub endpoint_id: EndpointId,
    pub cluster_id: ClusterId,
    pub attribute_id: AttributeId,
    /// `None` when the attribute is null or was not delivered.
    #[serde(default)]
    pub value: Option<RawValue>,
    #[serde(default)]
    pub status: Option<u8>,
}

impl AttributeReport {
    pub fn new(endpoint_id: EndpointId, key: AttributeKey, value: Option<RawValue>) -> Self {
        Self {
            endpoint_id,
            cluster_id: key.cluster_id,
            attribute_id: key.attribute_id,
            value,
            status: None,
        }
    }

    pub fn key(&self) -> AttributeKey {
        AttributeKey::new(self.cluster_id, self.attribute_id)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_none_or(|s| s == STATUS_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_deserializes_raw_values() {
        let report: AttributeReport = serde_json::from_str(
            r#"{"endpoint_id":1,"cluster_id":1026,"attribute_id":0,"value":2350}"#,
        )
        .unwrap();
        assert_eq!(report.value, Some(RawValue::Int(2350)));
        assert!(report.is_success());

        let report: AttributeReport = serde_json::from_str(
            r#"{"endpoint_id":1,"cluster_id":69,"attribute_id":0,"value":true}"#,
        )
        .unwrap();
        assert_eq!(report.value, Some(RawValue::Bool(true)));

        let report: AttributeReport = serde_json::from_str(
            r#"{"endpoint_id":0,"cluster_id":47,"attribute_id":12,"value":null,"status":134}"#,
        )
        .unwrap();
        assert_eq!(report.value, None);
        assert!(!report.is_success());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(AttributeKey::new(0x0402, 0).to_string(), "0x0402/0x0000");
    }
}
