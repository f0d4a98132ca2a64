use courier::gateway::GatewayAck;
use courier::logging::init_logger_from_env;
use courier::sensor::{SensorReading, SensorRegistration};
use courier::{CourierError, Result};
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use zenoh::config::EndPoint;
use zenoh::prelude::r#async::*;
use zenoh::queryable::Query;

/// Development stand-in for the remote integration service. Sensors must
/// be registered before their readings are accepted, which is exactly the
/// condition the updater's re-registration recovery handles.
struct GatewayState {
    registrations: HashMap<String, SensorRegistration>,
    readings: HashMap<String, SensorReading>,
}

impl GatewayState {
    fn new() -> Self {
        Self {
            registrations: HashMap::new(),
            readings: HashMap::new(),
        }
    }

    fn register(&mut self, registration: SensorRegistration) -> GatewayAck {
        info!("Registered sensor: {}", registration.unique_id);
        self.registrations
            .insert(registration.unique_id.clone(), registration);
        GatewayAck { success: true }
    }

    fn update(&mut self, readings: Vec<SensorReading>) -> GatewayAck {
        let mut success = true;
        for reading in readings {
            if self.registrations.contains_key(&reading.unique_id) {
                self.readings.insert(reading.unique_id.clone(), reading);
            } else {
                warn!("Rejecting update for unregistered sensor: {}", reading.unique_id);
                success = false;
            }
        }
        GatewayAck { success }
    }
}

struct GatewayNode {
    session: Arc<Session>,
    state: Arc<Mutex<GatewayState>>,
}

impl GatewayNode {
    async fn new() -> Result<Self> {
        let mut config = config::peer();
        config.listen.endpoints.push(
            "tcp/0.0.0.0:7447"
                .parse::<EndPoint>()
                .map_err(|e| CourierError::Other(e.to_string()))?,
        );
        let session = Arc::new(
            zenoh::open(config)
                .res()
                .await
                .map_err(CourierError::ZenohError)?,
        );
        Ok(Self {
            session,
            state: Arc::new(Mutex::new(GatewayState::new())),
        })
    }

    async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let register_queryable = self
            .session
            .declare_queryable("integration/*/register")
            .res()
            .await
            .map_err(CourierError::ZenohError)?;
        let update_queryable = self
            .session
            .declare_queryable("integration/*/update")
            .res()
            .await
            .map_err(CourierError::ZenohError)?;

        while !cancel.is_cancelled() {
            tokio::select! {
                Ok(query) = register_queryable.recv_async() => {
                    if let Err(e) = self.handle_register(query).await {
                        warn!("Failed to answer register query: {}", e);
                    }
                }
                Ok(query) = update_queryable.recv_async() => {
                    if let Err(e) = self.handle_update(query).await {
                        warn!("Failed to answer update query: {}", e);
                    }
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
        Ok(())
    }

    async fn handle_register(&self, query: Query) -> Result<()> {
        let payload = query_payload(&query)?;
        let registration: SensorRegistration = serde_json::from_str(&payload)?;
        let ack = self.state.lock().await.register(registration);
        self.reply(query, ack).await
    }

    async fn handle_update(&self, query: Query) -> Result<()> {
        let payload = query_payload(&query)?;
        let readings: Vec<SensorReading> = serde_json::from_str(&payload)?;
        let ack = self.state.lock().await.update(readings);
        self.reply(query, ack).await
    }

    async fn reply(&self, query: Query, ack: GatewayAck) -> Result<()> {
        let sample = Sample::new(
            query.key_expr().clone().into_owned(),
            serde_json::to_string(&ack)?,
        );
        query
            .reply(Ok(sample))
            .res()
            .await
            .map_err(CourierError::ZenohError)?;
        Ok(())
    }

    async fn monitor_sensors(&self, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            let state = self.state.lock().await;
            println!("Current sensor readings:");
            for (id, reading) in state.readings.iter() {
                println!("  {}: {}", id, reading.state);
            }
            drop(state);
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        }
    }
}

fn query_payload(query: &Query) -> Result<String> {
    let value = query
        .value()
        .ok_or_else(|| CourierError::Gateway("query without payload".to_string()))?;
    Ok(std::str::from_utf8(&value.payload.contiguous())
        .map_err(|e| CourierError::Other(e.to_string()))?
        .to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger_from_env();
    info!("Starting gateway node...");

    let node = Arc::new(GatewayNode::new().await?);
    let cancel = CancellationToken::new();

    let run_task = tokio::spawn({
        let node = node.clone();
        let cancel = cancel.clone();
        async move {
            if let Err(e) = node.run(cancel).await {
                eprintln!("Gateway node run error: {}", e);
            }
        }
    });

    let monitor_task = tokio::spawn({
        let node = node.clone();
        let cancel = cancel.clone();
        async move { node.monitor_sensors(cancel).await }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CourierError::Other(e.to_string()))?;
    info!("Ctrl-C received, shutting down...");
    cancel.cancel();

    let _ = tokio::join!(run_task, monitor_task);

    Ok(())
}
