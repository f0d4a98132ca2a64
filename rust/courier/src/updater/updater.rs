use super::UpdaterConfig;
use crate::error::Result;
use crate::gateway::IntegrationGateway;
use crate::sensor::context::DeviceContext;
use crate::sensor::interface::{ManagerProvider, SensorManager, SensorReading};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Drives one device's sensor pipeline: announce sensors to the gateway,
/// push a batched reading update, and re-announce everything once if the
/// update is rejected or fails. Registration state lives entirely on the
/// gateway side; nothing is tracked here between cycles.
pub struct SensorUpdater {
    provider: Box<dyn ManagerProvider>,
    gateway: Arc<dyn IntegrationGateway>,
    context: DeviceContext,
    config: UpdaterConfig,
    refresh_tx: flume::Sender<()>,
    refresh_rx: flume::Receiver<()>,
}

impl SensorUpdater {
    pub fn new(
        provider: Box<dyn ManagerProvider>,
        gateway: Arc<dyn IntegrationGateway>,
        context: DeviceContext,
        config: UpdaterConfig,
    ) -> Self {
        let (refresh_tx, refresh_rx) = flume::unbounded();
        Self {
            provider,
            gateway,
            context,
            config,
            refresh_tx,
            refresh_rx,
        }
    }

    /// Handle for requesting an out-of-schedule update cycle.
    pub fn refresh_handle(&self) -> flume::Sender<()> {
        self.refresh_tx.clone()
    }

    /// Runs one full update cycle. Gateway failures are logged and
    /// swallowed; the cycle always returns normally.
    pub async fn update_sensors(&self) {
        let managers = self.provider.get_managers().await;

        self.register_sensors(&managers).await;

        let success = match self.push_readings(&managers).await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to push sensor update: {}", e);
                false
            }
        };

        // A rejected update usually means the gateway no longer knows one
        // of the sensors, so announce all of them again.
        if !success {
            warn!("Sensor update not accepted, re-registering all sensors");
            self.register_sensors(&managers).await;
        }
    }

    async fn push_readings(&self, managers: &[Box<dyn SensorManager>]) -> Result<bool> {
        let mut readings: Vec<SensorReading> = Vec::new();
        for manager in managers {
            readings.extend(manager.get_sensors(&self.context).await?);
        }
        debug!("Pushing {} sensor readings", readings.len());
        self.gateway.update_sensors(&readings).await
    }

    async fn register_sensors(&self, managers: &[Box<dyn SensorManager>]) {
        let mut registrations = Vec::new();
        for manager in managers {
            match manager.get_sensor_registrations(&self.context).await {
                Ok(batch) => registrations.extend(batch),
                Err(e) => warn!(
                    "Registrations unavailable for manager {}: {}",
                    manager.name(),
                    e
                ),
            }
        }

        // One call at a time: the gateway must record a registration
        // before the next one is issued.
        for registration in registrations {
            if let Err(e) = self.gateway.register_sensor(&registration).await {
                error!("Issue registering sensor {}: {}", registration.unique_id, e);
            }
        }
    }

    /// Cycles at the configured interval and on manual refresh until
    /// cancelled. Cycles never overlap; a refresh during a cycle is
    /// queued and served next.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        info!("Sensor updater for device {} starting", self.context.device_id());

        let mut last_cycle = Instant::now();
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(last_cycle + self.config.update_interval) => {
                    self.update_sensors().await;
                    last_cycle = Instant::now();
                }
                Ok(()) = self.refresh_rx.recv_async() => {
                    debug!("Manual refresh requested");
                    self.update_sensors().await;
                    last_cycle = Instant::now();
                }
                _ = cancel.cancelled() => {
                    info!(
                        "Sensor updater for device {} shutting down",
                        self.context.device_id()
                    );
                    break;
                }
            }
        }

        Ok(())
    }
}
