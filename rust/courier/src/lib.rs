pub mod error;
pub mod gateway;
pub mod logging;
pub mod plugins;
pub mod sensor;
pub mod updater;

pub use error::{CourierError, Result};
pub use logging::init_logger;
