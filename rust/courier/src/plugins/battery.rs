use crate::error::{CourierError, Result};
use crate::sensor::context::DeviceContext;
use crate::sensor::interface::{
    ManagerFactory, SensorManager, SensorReading, SensorRegistration,
};
use async_trait::async_trait;

/// Reports battery charge level and charging state from the host
/// property tree (`/battery/level`, `/battery/charging`).
pub struct BatteryManager;

impl BatteryManager {
    async fn level(&self, context: &DeviceContext) -> Result<serde_json::Value> {
        context
            .property("/battery/level")
            .await
            .ok_or_else(|| CourierError::Other("battery level unavailable".to_string()))
    }

    async fn charging(&self, context: &DeviceContext) -> Result<bool> {
        context
            .property("/battery/charging")
            .await
            .and_then(|value| value.as_bool())
            .ok_or_else(|| CourierError::Other("battery charging state unavailable".to_string()))
    }
}

#[async_trait]
impl SensorManager for BatteryManager {
    fn name(&self) -> &str {
        "battery"
    }

    async fn get_sensors(&self, context: &DeviceContext) -> Result<Vec<SensorReading>> {
        let level = self.level(context).await?;
        let charging = self.charging(context).await?;

        Ok(vec![
            SensorReading {
                unique_id: "battery_level".to_string(),
                state: level,
                sensor_type: "sensor".to_string(),
                icon: "mdi:battery".to_string(),
                attributes: None,
            },
            SensorReading {
                unique_id: "battery_state".to_string(),
                state: serde_json::json!(if charging { "charging" } else { "discharging" }),
                sensor_type: "sensor".to_string(),
                icon: if charging {
                    "mdi:power-plug".to_string()
                } else {
                    "mdi:power-plug-off".to_string()
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
                unique_id: "battery_level".to_string(),
                name: "Battery Level".to_string(),
                sensor_type: "sensor".to_string(),
                device_class: Some("battery".to_string()),
                icon: "mdi:battery".to_string(),
                unit_of_measurement: Some("%".to_string()),
            },
            SensorRegistration {
                unique_id: "battery_state".to_string(),
                name: "Battery State".to_string(),
                sensor_type: "sensor".to_string(),
                device_class: None,
                icon: "mdi:power-plug".to_string(),
                unit_of_measurement: None,
            },
        ])
    }
}

pub struct BatteryManagerFactory;

impl ManagerFactory for BatteryManagerFactory {
    fn create(&self) -> Box<dyn SensorManager> {
        Box::new(BatteryManager)
    }
}
