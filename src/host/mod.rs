//! In-process device host.
//!
//! Each registered device gets its own task that drains a queue of
//! [`HostEvent`]s and hands them to the shared [`LifecycleCoordinator`]
//! one at a time. Handlers for one device never overlap; different devices
//! run independently.
//!
//! The host is also the coordinator's [`ProfileManager`]: applying a new
//! profile to a device queues an `InfoChanged` event for that device, the
//! same way a real registry reports the metadata change back.

use crate::capabilities::CapabilityEvent;
use crate::device::{
    EventSink, LifecycleCoordinator, ProfileChange, ProfileManager, SensorDevice, VirtualDevice,
};
use crate::error::{AdapterError, Result};
use crate::matter::attribute::{AttributeKey, AttributeReport, EndpointId};
use crate::profile::Profile;
use log::{debug, error, info};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Work item for a device task.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Init,
    InfoChanged(ProfileChange),
    Report(AttributeReport),
}

struct HostedDevice {
    device: Arc<VirtualDevice>,
    tx: mpsc::UnboundedSender<HostEvent>,
}

#[derive(Default)]
pub struct DeviceHost {
    devices: RwLock<HashMap<String, HostedDevice>>,
}

impl DeviceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device and return the receiving end of its queue.
    pub fn register(&self, device: Arc<VirtualDevice>) -> mpsc::UnboundedReceiver<HostEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = device.id().to_string();
        self.devices
            .write()
            .insert(id, HostedDevice { device, tx });
        rx
    }

    pub fn device(&self, device_id: &str) -> Option<Arc<VirtualDevice>> {
        self.devices
            .read()
            .get(device_id)
            .map(|hosted| hosted.device.clone())
    }

    pub fn devices(&self) -> Vec<Arc<VirtualDevice>> {
        self.devices
            .read()
            .values()
            .map(|hosted| hosted.device.clone())
            .collect()
    }

    /// Queue an event for a device.
    pub fn send(&self, device_id: &str, event: HostEvent) -> Result<()> {
        let devices = self.devices.read();
        let hosted = devices
            .get(device_id)
            .ok_or_else(|| AdapterError::UnknownDevice(device_id.to_string()))?;
        hosted.tx.send(event).map_err(|_| AdapterError::ChannelClosed)
    }
}

impl ProfileManager for DeviceHost {
    fn update_profile(&self, device_id: &str, profile: &Profile) -> Result<()> {
        let device = self
            .device(device_id)
            .ok_or_else(|| AdapterError::UnknownDevice(device_id.to_string()))?;
        let old = device.apply_profile(profile.clone());
        let change = ProfileChange {
            old,
            new: profile.clone(),
        };
        self.send(device_id, HostEvent::InfoChanged(change))
    }

    fn subscribe(&self, device_id: &str, attributes: &BTreeSet<AttributeKey>) -> Result<()> {
        let device = self
            .device(device_id)
            .ok_or_else(|| AdapterError::UnknownDevice(device_id.to_string()))?;
        let summary = attributes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        info!("[{}] Subscribed to [{}]", device_id, summary);
        device.set_subscriptions(attributes.clone());
        Ok(())
    }
}

/// Sink that logs every event.
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit_event_for_endpoint(
        &self,
        device_id: &str,
        endpoint_id: EndpointId,
        event: CapabilityEvent,
    ) {
        info!(
            "[{}] ep{} {}.{} = {:?}",
            device_id,
            endpoint_id,
            event.capability(),
            event.attribute_name(),
            event
        );
    }

    fn emit_event(&self, device_id: &str, event: CapabilityEvent) {
        info!(
            "[{}] {}.{} = {:?}",
            device_id,
            event.capability(),
            event.attribute_name(),
            event
        );
    }
}

/// Handle one event to completion.
pub fn handle_event(
    coordinator: &LifecycleCoordinator,
    device: &VirtualDevice,
    event: HostEvent,
) -> Result<()> {
    match event {
        HostEvent::Init => coordinator.on_init(device),
        HostEvent::InfoChanged(change) => coordinator.on_info_changed(device, &change).map(|_| ()),
        HostEvent::Report(report) => {
            coordinator.on_attribute_report(device, &report);
            Ok(())
        }
    }
}

/// Spawn the task that serves one device's queue until it closes.
pub fn run_device(
    coordinator: Arc<LifecycleCoordinator>,
    device: Arc<VirtualDevice>,
    mut rx: mpsc::UnboundedReceiver<HostEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = handle_event(&coordinator, &device, event) {
                error!("[{}] Handler failed: {}", device.id(), e);
            }
        }
        debug!("[{}] Device queue closed", device.id());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceConfig, EndpointConfig, MemoryFieldStore, ProfileState};
    use crate::matter::attribute::RawValue;
    use crate::matter::clusters::{occupancy_sensing, power_source};

    fn motion_device() -> Arc<VirtualDevice> {
        Arc::new(VirtualDevice::new(
            DeviceConfig::new("motion-1", "Hallway Motion")
                .with_endpoint(EndpointConfig::new(0).with_battery())
                .with_endpoint(EndpointConfig::new(1).with_cluster(occupancy_sensing::CLUSTER_ID)),
        ))
    }

    #[test]
    fn test_send_to_unknown_device() {
        let host = DeviceHost::new();
        assert!(matches!(
            host.send("nope", HostEvent::Init),
            Err(AdapterError::UnknownDevice(_))
        ));
    }

    #[test]
    fn test_init_flow_resubscribes_after_profile_applied() {
        let host = Arc::new(DeviceHost::new());
        let fields = Arc::new(MemoryFieldStore::new());
        let coordinator = LifecycleCoordinator::new(fields, Arc::new(LogEventSink), host.clone());
        let device = motion_device();
        let mut rx = host.register(device.clone());

        handle_event(&coordinator, &device, HostEvent::Init).unwrap();
        assert_eq!(coordinator.profile_state("motion-1"), ProfileState::Profiled);
        assert_eq!(device.profile().as_str(), "motion-battery");

        // Profile update queued the metadata change for this device
        let queued = rx.try_recv().unwrap();
        assert_eq!(
            queued,
            HostEvent::InfoChanged(ProfileChange {
                old: Profile::default(),
                new: "motion-battery".parse().unwrap(),
            })
        );
        handle_event(&coordinator, &device, queued).unwrap();
        assert_eq!(
            device.subscriptions(),
            [
                occupancy_sensing::OCCUPANCY,
                power_source::BAT_PERCENT_REMAINING
            ]
            .into_iter()
            .collect()
        );
    }

    #[tokio::test]
    async fn test_device_task_drains_queue() {
        let host = Arc::new(DeviceHost::new());
        let coordinator = Arc::new(LifecycleCoordinator::new(
            Arc::new(MemoryFieldStore::new()),
            Arc::new(LogEventSink),
            host.clone(),
        ));
        let device = motion_device();
        let rx = host.register(device.clone());
        let task = run_device(coordinator.clone(), device.clone(), rx);

        host.send("motion-1", HostEvent::Init).unwrap();
        host.send(
            "motion-1",
            HostEvent::Report(AttributeReport::new(
                1,
                occupancy_sensing::OCCUPANCY,
                Some(RawValue::Int(1)),
            )),
        )
        .unwrap();

        // Wait for init and the queued profile change to be handled
        for _ in 0..50 {
            if device.subscriptions().len() == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(device.subscriptions().len(), 2);
        task.abort();
    }
}
