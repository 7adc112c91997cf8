use crate::capabilities::Capability;
use crate::device::virtual_device::{DeviceConfig, EndpointConfig};
use crate::error::{AdapterError, Result};
use crate::matter::clusters::{
    boolean_state, illuminance_measurement, occupancy_sensing, relative_humidity,
    temperature_measurement,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Load variables from `.env` in the working directory, if present.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

/// Load `KEY=value` lines from `path` into the environment.
///
/// Values may contain spaces without quotes; surrounding quotes are
/// stripped. Variables already set in the environment are left alone.
/// Returns how many variables were set.
pub fn load_dotenv_from(path: &Path) -> usize {
    let Ok(content) = fs::read_to_string(path) else {
        return 0;
    };

    let mut loaded = 0;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let mut value = value.trim();
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }

        if std::env::var(key).is_err() {
            // SAFETY: called at startup before any other thread is spawned
            unsafe { std::env::set_var(key, value) };
            loaded += 1;
        }
    }
    loaded
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub simulation: SimulationConfig,
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding persisted device fields
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

/// Default location of the field store.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("matter-sensor-adapter")
        .join("fields.json")
}

/// Two demo devices: a battery motion sensor and a mains-powered
/// contact/climate sensor.
pub fn default_devices() -> Vec<DeviceConfig> {
    vec![
        DeviceConfig::new("hallway-motion", "Hallway Motion")
            .with_endpoint(EndpointConfig::new(0).with_battery())
            .with_endpoint(
                EndpointConfig::new(1)
                    .with_cluster(occupancy_sensing::CLUSTER_ID)
                    .with_cluster(illuminance_measurement::CLUSTER_ID),
            ),
        DeviceConfig::new("patio-door", "Patio Door")
            .with_capabilities(&[
                Capability::ContactSensor,
                Capability::TemperatureMeasurement,
                Capability::RelativeHumidityMeasurement,
            ])
            .with_endpoint(EndpointConfig::new(0).with_wired_power())
            .with_endpoint(EndpointConfig::new(1).with_cluster(boolean_state::CLUSTER_ID))
            .with_endpoint(
                EndpointConfig::new(2)
                    .with_cluster(temperature_measurement::CLUSTER_ID)
                    .with_cluster(relative_humidity::CLUSTER_ID),
            ),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                path: default_store_path(),
            },
            simulation: SimulationConfig {
                enabled: true,
                interval_secs: 10,
            },
            devices: default_devices(),
        }
    }
}

impl Config {
    /// Defaults overridden from the environment.
    ///
    /// `ADAPTER_DEVICES` holds a JSON array of device definitions;
    /// `ADAPTER_DEVICES_FILE` names a file containing one.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("ADAPTER_STORE_PATH") {
            config.store.path = PathBuf::from(path);
        }
        if let Ok(enabled) = std::env::var("ADAPTER_SIMULATION") {
            config.simulation.enabled = !matches!(enabled.as_str(), "0" | "false" | "off");
        }
        if let Ok(interval) = std::env::var("ADAPTER_SIM_INTERVAL_SECS") {
            match interval.parse() {
                Ok(secs) if secs > 0 => config.simulation.interval_secs = secs,
                _ => warn!("Ignoring invalid ADAPTER_SIM_INTERVAL_SECS={}", interval),
            }
        }

        if let Ok(path) = std::env::var("ADAPTER_DEVICES_FILE") {
            let content = fs::read_to_string(&path)
                .map_err(|e| AdapterError::Config(format!("cannot read {path}: {e}")))?;
            config.devices = parse_devices(&content)?;
        } else if let Ok(json) = std::env::var("ADAPTER_DEVICES") {
            config.devices = parse_devices(&json)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject duplicate device IDs and duplicate endpoint IDs within a device.
    pub fn validate(&self) -> Result<()> {
        let mut device_ids = HashSet::new();
        for device in &self.devices {
            if device.id.is_empty() {
                return Err(AdapterError::Config("device with empty id".to_string()));
            }
            if !device_ids.insert(device.id.as_str()) {
                return Err(AdapterError::Config(format!(
                    "duplicate device id '{}'",
                    device.id
                )));
            }
            let mut endpoint_ids = HashSet::new();
            for endpoint in &device.endpoints {
                if !endpoint_ids.insert(endpoint.id) {
                    return Err(AdapterError::Config(format!(
                        "device '{}' declares endpoint {} twice",
                        device.id, endpoint.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_devices(json: &str) -> Result<Vec<DeviceConfig>> {
    serde_json::from_str(json)
        .map_err(|e| AdapterError::Config(format!("invalid device definitions: {e}")))
}
