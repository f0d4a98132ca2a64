use crate::error::{CourierError, Result};
use crate::sensor::context::DeviceContext;
use crate::sensor::interface::{
    ManagerFactory, SensorManager, SensorReading, SensorRegistration,
};
use async_trait::async_trait;

/// Reports connectivity and the current wifi network from the host
/// property tree (`/network/connected`, `/network/ssid`).
pub struct NetworkManager;

impl NetworkManager {
    async fn connected(&self, context: &DeviceContext) -> Result<bool> {
        context
            .property("/network/connected")
            .await
            .and_then(|value| value.as_bool())
            .ok_or_else(|| CourierError::Other("network state unavailable".to_string()))
    }

    async fn ssid(&self, context: &DeviceContext) -> Option<String> {
        context
            .property("/network/ssid")
            .await
            .and_then(|value| value.as_str().map(str::to_string))
    }
}

#[async_trait]
impl SensorManager for NetworkManager {
    fn name(&self) -> &str {
        "network"
    }

    async fn get_sensors(&self, context: &DeviceContext) -> Result<Vec<SensorReading>> {
        let connected = self.connected(context).await?;
        let ssid = if connected {
            self.ssid(context)
                .await
                .unwrap_or_else(|| "<unknown>".to_string())
        } else {
            "<not connected>".to_string()
        };

        Ok(vec![
            SensorReading {
                unique_id: "wifi_connection".to_string(),
                state: serde_json::json!(ssid),
                sensor_type: "sensor".to_string(),
                icon: "mdi:wifi".to_string(),
                attributes: None,
            },
            SensorReading {
                unique_id: "network_connected".to_string(),
                state: serde_json::json!(connected),
                sensor_type: "binary_sensor".to_string(),
                icon: if connected {
                    "mdi:lan-connect".to_string()
                } else {
                    "mdi:lan-disconnect".to_string()
                },
                attributes: None,
            },
        ])
    }

    async fn get_sensor_registrations(
        &self,
        _context: &DeviceContext,
    ) -> Result<Vec<SensorRegistration>> {
        Ok(vec![
            SensorRegistration {
                unique_id: "wifi_connection".to_string(),
                name: "Wifi Connection".to_string(),
                sensor_type: "sensor".to_string(),
                device_class: None,
                icon: "mdi:wifi".to_string(),
                unit_of_measurement: None,
            },
            SensorRegistration {
                unique_id: "network_connected".to_string(),
                name: "Network Connected".to_string(),
                sensor_type: "binary_sensor".to_string(),
                device_class: Some("connectivity".to_string()),
                icon: "mdi:lan-connect".to_string(),
                unit_of_measurement: None,
            },
        ])
    }
}

pub struct NetworkManagerFactory;

impl ManagerFactory for NetworkManagerFactory {
    fn create(&self) -> Box<dyn SensorManager> {
        Box::new(NetworkManager)
    }
}
