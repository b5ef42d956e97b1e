//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// `default_level` is used as the filter when `RUST_LOG` is not set
/// (for example `"info"` or `"scene_annotator=debug"`).
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();
}

/// Initialize logging for tests, ignoring repeated initialization
#[cfg(test)]
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
