use courier::gateway::ZenohGateway;
use courier::logging::init_logger_from_env;
use courier::plugins::{ManagerRegistry, RegistryProvider};
use courier::sensor::DeviceContext;
use courier::updater::{SensorUpdater, UpdaterConfig};
use courier::{CourierError, Result};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zenoh::prelude::r#async::*;

#[derive(Debug, Serialize, Deserialize)]
struct Settings {
    device_id: String,
    update_interval_secs: u64,
    managers: Vec<String>,
}

fn load_settings(path: &str) -> Result<Settings> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CourierError::Other(format!("Failed to read settings file: {}", e)))?;
    parse_settings(&raw)
}

fn parse_settings(raw: &str) -> Result<Settings> {
    serde_yaml::from_str(raw)
        .map_err(|e| CourierError::Other(format!("Failed to parse settings: {}", e)))
}

fn simulated_platform_state() -> serde_json::Value {
    let mut rng = rand::thread_rng();
    serde_json::json!({
        "battery": {
            "level": rng.gen_range(20..100),
            "charging": rng.gen_bool(0.5),
        },
        "network": {
            "connected": true,
            "ssid": "workbench",
        },
    })
}

// Stands in for the host platform keeping the property tree current.
async fn drive_platform(context: DeviceContext, cancel: CancellationToken) {
    while !cancel.is_cancelled() {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let level = context
            .property("/battery/level")
            .await
            .and_then(|value| value.as_i64())
            .unwrap_or(100);
        let drained = (level - rand::thread_rng().gen_range(0..3i64)).max(5);
        context
            .set_property("/battery/level", serde_json::json!(drained))
            .await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger_from_env();

    let settings_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let settings = load_settings(&settings_path)?;
    let zenoh_peer = env::var("ZENOH_PEER").unwrap_or_else(|_| "tcp/localhost:7447".to_string());

    info!("Starting updater node for device: {}", settings.device_id);
    info!("Connecting to Zenoh peer: {}", zenoh_peer);

    let mut config = zenoh::config::Config::default();
    config
        .set_mode(Some(zenoh::config::whatami::WhatAmI::Client))
        .unwrap();
    config.connect.endpoints.push(zenoh_peer.parse().unwrap());

    let session = Arc::new(
        zenoh::open(config)
            .res()
            .await
            .map_err(CourierError::ZenohError)?,
    );

    let context = DeviceContext::new(settings.device_id.clone(), simulated_platform_state());
    let provider = RegistryProvider::new(ManagerRegistry::new(), settings.managers.clone());
    let gateway = Arc::new(ZenohGateway::new(session.clone(), settings.device_id.clone()));
    let updater = SensorUpdater::new(
        Box::new(provider),
        gateway,
        context.clone(),
        UpdaterConfig {
            update_interval: Duration::from_secs(settings.update_interval_secs),
        },
    );

    let cancel = CancellationToken::new();
    let platform_task = tokio::spawn(drive_platform(context.clone(), cancel.clone()));

    tokio::select! {
        result = updater.run(cancel.clone()) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down...");
            cancel.cancel();
        }
    }

    let _ = platform_task.await;

    Ok(())
}
