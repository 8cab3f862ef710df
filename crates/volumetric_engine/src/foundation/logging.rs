//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default level
///
/// `RUST_LOG` still wins when it is set. Calling this twice is harmless; the
/// second attempt is reported and ignored.
pub fn init_with_level(level: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init();

    if let Err(e) = result {
        log::debug!("Logger already initialized: {}", e);
    }
}
