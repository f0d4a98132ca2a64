use std::sync::Arc;
use tokio::sync::RwLock;

/// Opaque handle to host platform state. The host keeps the property
/// tree current; managers only read it, by JSON pointer.
#[derive(Clone)]
pub struct DeviceContext {
    device_id: String,
    properties: Arc<RwLock<serde_json::Value>>,
}

impl DeviceContext {
    pub fn new(device_id: String, properties: serde_json::Value) -> Self {
        Self {
            device_id,
            properties: Arc::new(RwLock::new(properties)),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Looks up a property by JSON pointer, e.g. `/battery/level`.
    pub async fn property(&self, pointer: &str) -> Option<serde_json::Value> {
        self.properties.read().await.pointer(pointer).cloned()
    }

    pub async fn set_property(&self, pointer: &str, value: serde_json::Value) {
        let mut properties = self.properties.write().await;
        if let Some(slot) = properties.pointer_mut(pointer) {
            *slot = value;
        }
    }

    pub async fn replace_properties(&self, properties: serde_json::Value) {
        *self.properties.write().await = properties;
    }
}
