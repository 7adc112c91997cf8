//! Matter cluster definitions for the sensor clusters this adapter consumes.
//!
//! Each module carries the cluster ID, its attribute enum and the decode
//! function for the attribute that backs a capability.

pub mod boolean_state;
pub mod illuminance_measurement;
pub mod occupancy_sensing;
pub mod power_source;
pub mod relative_humidity;
pub mod temperature_measurement;
