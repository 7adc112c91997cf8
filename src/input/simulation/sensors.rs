//! Sensor simulation for testing.
//!
//! Produces synthetic attribute reports for every attribute a hosted device
//! is subscribed to, so the whole decode path can be watched in the logs.

use crate::device::{SensorDevice, VirtualDevice};
use crate::host::{DeviceHost, HostEvent};
use crate::matter::attribute::{AttributeKey, AttributeReport, RawValue};
use crate::matter::clusters::{
    boolean_state, illuminance_measurement, occupancy_sensing, power_source, relative_humidity,
    temperature_measurement,
};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

/// Raw value the simulation reports for `key` on tick `tick`.
///
/// Values cycle so consecutive ticks produce visible changes.
pub fn simulated_value(key: AttributeKey, tick: u64) -> Option<RawValue> {
    let step = (tick % 10) as i64;
    let value = match key {
        k if k == temperature_measurement::MEASURED_VALUE => RawValue::Int(2000 + step * 25),
        k if k == relative_humidity::MEASURED_VALUE => RawValue::Int(4000 + step * 150),
        // 10 lux .. 10^1.9 lux
        k if k == illuminance_measurement::MEASURED_VALUE => RawValue::Int(10001 + step * 1000),
        k if k == occupancy_sensing::OCCUPANCY => RawValue::Int(tick as i64 % 2),
        k if k == boolean_state::STATE_VALUE => RawValue::Bool(tick % 2 == 0),
        // Slow drain from 100%, with the occasional missing reading
        k if k == power_source::BAT_PERCENT_REMAINING => {
            if tick % 7 == 6 {
                return None;
            }
            RawValue::Int(200 - (tick as i64 % 200))
        }
        _ => return None,
    };
    Some(value)
}

/// Build the report for `key` on the first endpoint of `device` exposing its cluster.
pub fn simulated_report(
    device: &VirtualDevice,
    key: AttributeKey,
    tick: u64,
) -> Option<AttributeReport> {
    let endpoint_id = device.endpoint_for(key.cluster_id)?;
    Some(AttributeReport::new(
        endpoint_id,
        key,
        simulated_value(key, tick),
    ))
}

/// Spawn a task that periodically reports every subscribed attribute of
/// every hosted device.
///
/// # Returns
///
/// A `JoinHandle` that can be used to abort the simulation task.
pub fn run_sensor_simulation(host: Arc<DeviceHost>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("[Sim] Reporting every {:?}", period);
        let mut ticker = interval(period);
        let mut tick: u64 = 0;
        loop {
            ticker.tick().await;
            for device in host.devices() {
                for key in device.subscriptions() {
                    let Some(report) = simulated_report(&device, key, tick) else {
                        debug!("[Sim] {} has no endpoint for {}", device.id(), key);
                        continue;
                    };
                    if let Err(e) = host.send(device.id(), HostEvent::Report(report)) {
                        warn!("[Sim] Failed to queue report for {}: {}", device.id(), e);
                    }
                }
            }
            tick = tick.wrapping_add(1);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceConfig, EndpointConfig};
    use crate::matter::decoder::DecoderTable;

    #[test]
    fn test_every_simulated_value_decodes() {
        let table = DecoderTable::sensors();
        for key in table.keys().copied().collect::<Vec<_>>() {
            for tick in 0..20 {
                let report = AttributeReport::new(1, key, simulated_value(key, tick));
                assert!(table.decode(&report).is_ok(), "{key} at tick {tick}");
            }
        }
    }

    #[test]
    fn test_report_uses_exposing_endpoint() {
        let device = VirtualDevice::new(
            DeviceConfig::new("climate", "Climate")
                .with_endpoint(EndpointConfig::new(3).with_cluster(relative_humidity::CLUSTER_ID)),
        );
        let report = simulated_report(&device, relative_humidity::MEASURED_VALUE, 0).unwrap();
        assert_eq!(report.endpoint_id, 3);
        assert!(simulated_report(&device, occupancy_sensing::OCCUPANCY, 0).is_none());
    }

    #[test]
    fn test_battery_sometimes_missing() {
        assert_eq!(
            simulated_value(power_source::BAT_PERCENT_REMAINING, 0),
            Some(RawValue::Int(200))
        );
        assert_eq!(simulated_value(power_source::BAT_PERCENT_REMAINING, 6), None);
    }
}
