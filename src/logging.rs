//! Logger setup for native and browser builds.

use crate::config::LogLevel;

/// Install the global logger. Calling it again is harmless; the first
/// logger stays in place.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LogLevel) {
    let result = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
    if result.is_ok() {
        log::debug!("Logger initialized at {:?}", level);
    }
}

/// Install the console logger and route panics to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LogLevel) {
    console_error_panic_hook::set_once();
    let Some(level) = level.to_level_filter().to_level() else {
        return;
    };
    if console_log::init_with_level(level).is_ok() {
        log::debug!("Logger initialized at {:?}", level);
    }
}
