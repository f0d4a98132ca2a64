#[allow(clippy::module_inception)]
mod updater;
pub use updater::SensorUpdater;

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct UpdaterConfig {
    pub update_interval: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            // Matches the companion app's periodic job cadence.
            update_interval: Duration::from_secs(900),
        }
    }
}
