use crate::error::Result;
use crate::sensor::interface::{SensorReading, SensorRegistration};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod remote;
pub use remote::ZenohGateway;

/// Remote integration boundary. The gateway owns all registration state;
/// this side only announces sensors and pushes readings.
///
/// A returned `false` means the call completed but the gateway rejected
/// it (for updates, typically because a sensor id is unknown to it). A
/// returned error means the call itself failed.
#[async_trait]
pub trait IntegrationGateway: Send + Sync {
    async fn register_sensor(&self, registration: &SensorRegistration) -> Result<bool>;
    async fn update_sensors(&self, readings: &[SensorReading]) -> Result<bool>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayAck {
    pub success: bool,
}
