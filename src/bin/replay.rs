//! Replay a recorded device scenario through the lifecycle coordinator.
//!
//! A scenario is a JSON file with a device definition and an ordered list
//! of steps (`init`, `info_changed`, `report`). Every emitted capability
//! event is printed to stdout as one JSON line.
//!
//! Usage:
//!   cargo run --bin replay -- scenario.json
//!   cargo run --bin replay -- scenario.json --store /tmp/fields.json

use clap::Parser;
use log::{error, info};
use matter_sensor_adapter::capabilities::{CapabilityEvent, EventTarget};
use matter_sensor_adapter::device::{
    DeviceConfig, EventSink, FieldStore, JsonFieldStore, LifecycleCoordinator, MemoryFieldStore,
    ProfileChange, ProfileManager, SensorDevice, VirtualDevice,
};
use matter_sensor_adapter::error::Result;
use matter_sensor_adapter::matter::attribute::{AttributeKey, AttributeReport, EndpointId};
use matter_sensor_adapter::profile::Profile;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Replay attribute reports for one device and print capability events")]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Persist device fields to this file instead of keeping them in memory
    #[arg(long, env = "ADAPTER_STORE_PATH")]
    store: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    device: DeviceConfig,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum Step {
    Init,
    InfoChanged { old: Profile, new: Profile },
    Report(AttributeReport),
}

#[derive(Serialize)]
struct EventLine<'a> {
    device: &'a str,
    target: EventTarget,
    capability: String,
    #[serde(flatten)]
    event: CapabilityEvent,
}

/// Prints each event as a JSON line.
struct JsonLinesSink;

impl JsonLinesSink {
    fn print(&self, device: &str, target: EventTarget, event: CapabilityEvent) {
        let line = EventLine {
            device,
            target,
            capability: event.capability().to_string(),
            event,
        };
        match serde_json::to_string(&line) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to encode event: {}", e),
        }
    }
}

impl EventSink for JsonLinesSink {
    fn emit_event_for_endpoint(
        &self,
        device_id: &str,
        endpoint_id: EndpointId,
        event: CapabilityEvent,
    ) {
        self.print(device_id, EventTarget::Endpoint(endpoint_id), event);
    }

    fn emit_event(&self, device_id: &str, event: CapabilityEvent) {
        self.print(device_id, EventTarget::Device, event);
    }
}

/// Applies profiles to the replayed device and remembers the resulting
/// metadata changes so they can be fed back after the current step.
struct ReplayProfiles {
    device: Arc<VirtualDevice>,
    pending: Mutex<Vec<ProfileChange>>,
}

impl ProfileManager for ReplayProfiles {
    fn update_profile(&self, _device_id: &str, profile: &Profile) -> Result<()> {
        let old = self.device.apply_profile(profile.clone());
        self.pending.lock().push(ProfileChange {
            old,
            new: profile.clone(),
        });
        Ok(())
    }

    fn subscribe(&self, device_id: &str, attributes: &BTreeSet<AttributeKey>) -> Result<()> {
        info!(
            "[{}] Subscribed to {} attribute(s)",
            device_id,
            attributes.len()
        );
        self.device.set_subscriptions(attributes.clone());
        Ok(())
    }
}

fn init_logger() {
    // stdout carries the events; logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let content = std::fs::read_to_string(&args.scenario)?;
    let scenario: Scenario = serde_json::from_str(&content)?;

    let fields: Arc<dyn FieldStore> = match &args.store {
        Some(path) => Arc::new(JsonFieldStore::open(path)),
        None => Arc::new(MemoryFieldStore::new()),
    };

    let device = Arc::new(VirtualDevice::new(scenario.device));
    let profiles = Arc::new(ReplayProfiles {
        device: device.clone(),
        pending: Mutex::new(Vec::new()),
    });
    let coordinator =
        LifecycleCoordinator::new(fields, Arc::new(JsonLinesSink), profiles.clone());
    if let Some(profile) = coordinator.persisted_profile(device.id()) {
        device.apply_profile(profile);
    }

    for step in scenario.steps {
        match step {
            Step::Init => coordinator.on_init(device.as_ref())?,
            Step::InfoChanged { old, new } => {
                coordinator.on_info_changed(device.as_ref(), &ProfileChange { old, new })?;
            }
            Step::Report(report) => {
                coordinator.on_attribute_report(device.as_ref(), &report);
            }
        }

        let pending = std::mem::take(&mut *profiles.pending.lock());
        for change in pending {
            coordinator.on_info_changed(device.as_ref(), &change)?;
        }
    }

    info!(
        "[{}] Replay finished with profile '{}'",
        device.id(),
        device.profile()
    );
    Ok(())
}

fn main() {
    init_logger();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("Replay failed: {}", e);
        std::process::exit(1);
    }
}
