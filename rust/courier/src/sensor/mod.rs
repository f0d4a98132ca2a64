pub mod context;
pub mod interface;

pub use context::DeviceContext;
pub use interface::{
    ManagerFactory, ManagerProvider, SensorManager, SensorReading, SensorRegistration,
};
