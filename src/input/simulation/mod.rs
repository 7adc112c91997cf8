//! Simulated sensors for development and testing.

mod sensors;

pub use sensors::{run_sensor_simulation, simulated_report, simulated_value};
