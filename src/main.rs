use log::{error, info};
use matter_sensor_adapter::config::{Config, load_dotenv};
use matter_sensor_adapter::device::{
    JsonFieldStore, LifecycleCoordinator, SensorDevice, VirtualDevice,
};
use matter_sensor_adapter::host::{DeviceHost, HostEvent, LogEventSink, run_device};
use matter_sensor_adapter::input::simulation::run_sensor_simulation;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_logger();
    info!("Starting Matter sensor adapter");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration loaded:");
    info!("  Field store: {:?}", config.store.path);
    info!("  Devices: {}", config.devices.len());
    if config.simulation.enabled {
        info!("  Simulation interval: {}s", config.simulation.interval_secs);
    }

    let fields = Arc::new(JsonFieldStore::open(&config.store.path));
    let host = Arc::new(DeviceHost::new());
    let coordinator = Arc::new(LifecycleCoordinator::new(
        fields,
        Arc::new(LogEventSink),
        host.clone(),
    ));

    let mut device_tasks = Vec::new();
    for device_config in config.devices {
        let mut device = VirtualDevice::new(device_config);
        // Restore the profile applied in an earlier run
        if let Some(profile) = coordinator.persisted_profile(device.id()) {
            device = device.with_profile(profile);
        }
        let device = Arc::new(device);
        info!("Hosting device '{}' ({})", device.id(), device.label());

        let rx = host.register(device.clone());
        device_tasks.push(run_device(coordinator.clone(), device.clone(), rx));
        if let Err(e) = host.send(device.id(), HostEvent::Init) {
            error!("Failed to queue init for {}: {}", device.id(), e);
        }
    }

    let simulation = config.simulation.enabled.then(|| {
        run_sensor_simulation(
            host.clone(),
            Duration::from_secs(config.simulation.interval_secs),
        )
    });

    info!("Matter sensor adapter is running");
    info!("  - Press Ctrl+C to exit");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    if let Some(task) = simulation {
        task.abort();
    }
    for task in device_tasks {
        task.abort();
    }

    info!("Matter sensor adapter stopped");
}
