use super::{GatewayAck, IntegrationGateway};
use crate::error::{CourierError, Result};
use crate::sensor::interface::{SensorReading, SensorRegistration};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use zenoh::prelude::r#async::*;

/// Gateway client over zenoh query/reply. Each call is one get on
/// `integration/<device_id>/<endpoint>` with a JSON payload, answered by
/// a `GatewayAck`. Reply timeout policy is zenoh's, not ours.
pub struct ZenohGateway {
    session: Arc<Session>,
    device_id: String,
}

impl ZenohGateway {
    pub fn new(session: Arc<Session>, device_id: String) -> Self {
        Self { session, device_id }
    }

    async fn call(&self, endpoint: &str, payload: String) -> Result<bool> {
        let selector = format!("integration/{}/{}", self.device_id, endpoint);
        debug!("Gateway call: {}", selector);

        let replies = self
            .session
            .get(selector.as_str())
            .with_value(payload)
            .res()
            .await
            .map_err(CourierError::ZenohError)?;

        let reply = replies
            .recv_async()
            .await
            .map_err(|_| CourierError::Gateway(format!("No reply from {}", selector)))?;

        match reply.sample {
            Ok(sample) => {
                let ack: GatewayAck =
                    serde_json::from_slice(&sample.value.payload.contiguous())?;
                Ok(ack.success)
            }
            Err(value) => {
                let reason = std::str::from_utf8(&value.payload.contiguous())
                    .unwrap_or("unreadable error reply")
                    .to_string();
                Err(CourierError::Gateway(reason))
            }
        }
    }
}

#[async_trait]
impl IntegrationGateway for ZenohGateway {
    async fn register_sensor(&self, registration: &SensorRegistration) -> Result<bool> {
        let payload = serde_json::to_string(registration)?;
        self.call("register", payload).await
    }

    async fn update_sensors(&self, readings: &[SensorReading]) -> Result<bool> {
        let payload = serde_json::to_string(readings)?;
        self.call("update", payload).await
    }
}
