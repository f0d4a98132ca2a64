use crate::error::Result;
use crate::sensor::context::DeviceContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One capability source for a category of device sensor data.
///
/// Managers are constructed fresh for every update cycle and queried
/// twice: once for registration descriptors, once for current readings.
#[async_trait]
pub trait SensorManager: Send + Sync {
    fn name(&self) -> &str;
    async fn get_sensors(&self, context: &DeviceContext) -> Result<Vec<SensorReading>>;
    async fn get_sensor_registrations(
        &self,
        context: &DeviceContext,
    ) -> Result<Vec<SensorRegistration>>;
}

/// Supplies the manager set for one update cycle. Which managers exist
/// depends on the device build, so the set is resolved at runtime.
#[async_trait]
pub trait ManagerProvider: Send + Sync {
    async fn get_managers(&self) -> Vec<Box<dyn SensorManager>>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub unique_id: String,
    pub state: serde_json::Value,
    pub sensor_type: String,
    pub icon: String,
    pub attributes: Option<serde_json::Value>,
}

/// Descriptor announcing a sensor to the gateway. Safe to send repeatedly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorRegistration {
    pub unique_id: String,
    pub name: String,
    pub sensor_type: String,
    pub device_class: Option<String>,
    pub icon: String,
    pub unit_of_measurement: Option<String>,
}

pub trait ManagerFactory: Send + Sync {
    fn create(&self) -> Box<dyn SensorManager>;
}
