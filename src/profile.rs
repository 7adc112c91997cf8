//! Profile inference from declared capabilities.
//!
//! A profile name lists the capabilities a device exposes as dash-joined
//! tokens in a fixed precedence order, e.g. `motion-temperature-battery`.
//! Battery is never taken from the declared set; it is present when at least
//! one endpoint has a PowerSource cluster with the BATTERY feature.

use crate::capabilities::Capability;
use crate::device::SensorDevice;
use crate::error::{AdapterError, Result};
use crate::matter::attribute::EndpointId;
use crate::matter::clusters::power_source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Token order of a profile name. Battery is always last.
pub const PROFILE_TOKEN_ORDER: [Capability; 6] = [
    Capability::MotionSensor,
    Capability::ContactSensor,
    Capability::IlluminanceMeasurement,
    Capability::TemperatureMeasurement,
    Capability::RelativeHumidityMeasurement,
    Capability::Battery,
];

const SEPARATOR: char = '-';

/// Canonical profile name. The empty profile is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(String);

impl Profile {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Capabilities named by this profile's tokens.
    pub fn capabilities(&self) -> BTreeSet<Capability> {
        self.0
            .split(SEPARATOR)
            .filter_map(Capability::from_profile_token)
            .collect()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Profile {
    type Err = AdapterError;

    /// Parses a profile name, rejecting unknown tokens. Token order is kept as given.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        for token in s.split(SEPARATOR) {
            if Capability::from_profile_token(token).is_none() {
                return Err(AdapterError::UnknownProfileToken(token.to_string()));
            }
        }
        Ok(Self(s.to_string()))
    }
}

/// Build the profile name for a declared capability set.
///
/// `battery_endpoints` are the endpoints whose PowerSource cluster advertises
/// the BATTERY feature. A `Battery` entry in `declared` is ignored.
pub fn infer_profile(declared: &BTreeSet<Capability>, battery_endpoints: &[EndpointId]) -> Profile {
    let mut name = String::new();
    for capability in PROFILE_TOKEN_ORDER {
        let present = match capability {
            Capability::Battery => !battery_endpoints.is_empty(),
            other => declared.contains(&other),
        };
        if present {
            name.push(SEPARATOR);
            name.push_str(capability.profile_token());
        }
    }
    // Strip the separator in front of the first token
    Profile(name.strip_prefix(SEPARATOR).unwrap_or(&name).to_string())
}

/// Query `device` and infer its profile.
pub fn inspect(device: &dyn SensorDevice) -> Profile {
    let declared = device.declared_capabilities();
    let battery_endpoints =
        device.endpoints(power_source::CLUSTER_ID, Some(power_source::feature::BATTERY));
    infer_profile(&declared, &battery_endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(list: &[Capability]) -> BTreeSet<Capability> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_motion_with_battery() {
        let profile = infer_profile(&caps(&[Capability::MotionSensor]), &[1]);
        assert_eq!(profile.as_str(), "motion-battery");
    }

    #[test]
    fn test_canonical_order_ignores_declaration_order() {
        let a = infer_profile(
            &caps(&[
                Capability::RelativeHumidityMeasurement,
                Capability::ContactSensor,
                Capability::TemperatureMeasurement,
                Capability::MotionSensor,
                Capability::IlluminanceMeasurement,
            ]),
            &[2, 3],
        );
        assert_eq!(
            a.as_str(),
            "motion-contact-illuminance-temperature-humidity-battery"
        );

        let b = infer_profile(
            &caps(&[
                Capability::IlluminanceMeasurement,
                Capability::MotionSensor,
                Capability::TemperatureMeasurement,
                Capability::ContactSensor,
                Capability::RelativeHumidityMeasurement,
            ]),
            &[3, 2],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_deterministic() {
        let declared = caps(&[
            Capability::TemperatureMeasurement,
            Capability::RelativeHumidityMeasurement,
        ]);
        let first = infer_profile(&declared, &[]);
        let second = infer_profile(&declared, &[]);
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "temperature-humidity");
    }

    #[test]
    fn test_empty_profile() {
        let profile = infer_profile(&BTreeSet::new(), &[]);
        assert!(profile.is_empty());
        assert_eq!(profile.as_str(), "");
    }

    #[test]
    fn test_battery_only() {
        assert_eq!(infer_profile(&BTreeSet::new(), &[0]).as_str(), "battery");
    }

    #[test]
    fn test_declared_battery_without_battery_endpoint_is_ignored() {
        let profile = infer_profile(&caps(&[Capability::Battery, Capability::ContactSensor]), &[]);
        assert_eq!(profile.as_str(), "contact");
    }

    #[test]
    fn test_parse_and_capabilities() {
        let profile: Profile = "contact-temperature-battery".parse().unwrap();
        assert_eq!(
            profile.capabilities(),
            caps(&[
                Capability::ContactSensor,
                Capability::TemperatureMeasurement,
                Capability::Battery
            ])
        );
        assert!("".parse::<Profile>().unwrap().capabilities().is_empty());
        assert!(matches!(
            "motion-pressure".parse::<Profile>(),
            Err(AdapterError::UnknownProfileToken(t)) if t == "pressure"
        ));
    }
}
