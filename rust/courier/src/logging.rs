use log::{LevelFilter, Metadata, Record};
use std::sync::Once;

pub struct CourierLogger;

impl log::Log for CourierLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static INIT: Once = Once::new();

pub fn init_logger(level: LevelFilter) {
    INIT.call_once(|| {
        let logger = CourierLogger;
        log::set_boxed_logger(Box::new(logger)).unwrap();
        log::set_max_level(level);
    });
}

/// Reads the level from `COURIER_LOG`, defaulting to `info`.
pub fn init_logger_from_env() {
    let level = std::env::var("COURIER_LOG")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    init_logger(level);
}
