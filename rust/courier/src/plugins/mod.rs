use crate::sensor::interface::{ManagerFactory, ManagerProvider, SensorManager};
use async_trait::async_trait;
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

mod battery;
mod network;

pub use battery::BatteryManager;
pub use network::NetworkManager;

pub struct ManagerRegistry {
    factories: HashMap<String, Arc<dyn ManagerFactory>>,
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register_default_managers();
        registry
    }

    fn register_default_managers(&mut self) {
        self.register_manager("battery", Arc::new(battery::BatteryManagerFactory));
        self.register_manager("network", Arc::new(network::NetworkManagerFactory));
        // Register more default managers here
    }

    pub fn register_manager(&mut self, name: &str, factory: Arc<dyn ManagerFactory>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create_manager(&self, name: &str) -> Option<Box<dyn SensorManager>> {
        self.factories.get(name).map(|factory| factory.create())
    }
}

/// Builds the manager set for a device from the registry and the list of
/// manager names enabled for this build. The set is constructed fresh on
/// every call, one manager per enabled name, in configured order.
pub struct RegistryProvider {
    registry: ManagerRegistry,
    enabled: Vec<String>,
}

impl RegistryProvider {
    pub fn new(registry: ManagerRegistry, enabled: Vec<String>) -> Self {
        Self { registry, enabled }
    }
}

#[async_trait]
impl ManagerProvider for RegistryProvider {
    async fn get_managers(&self) -> Vec<Box<dyn SensorManager>> {
        let mut managers = Vec::new();
        for name in &self.enabled {
            match self.registry.create_manager(name) {
                Some(manager) => managers.push(manager),
                None => warn!("Unknown sensor manager: {}", name),
            }
        }
        managers
    }
}
