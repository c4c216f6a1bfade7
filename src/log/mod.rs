//! Diagnostic logging. This is separate from _reporting_: reports are the model's output (daily
//! counts written to CSV or stdout), log messages describe what the simulator is doing and
//! surface numeric instabilities.
//!
//! The five logging macros of the `log` crate are re-exported here:
//!
//! ```rust
//! use vaxpool::log::info;
//!
//! pub fn announce(day: usize) {
//!     info!("starting day {day}");
//! }
//! ```
//!
//! Logging is _disabled_ by default. It is enabled with the command line option
//! `--log-level <level>` or from code:
//!
//! ```rust
//! use vaxpool::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! pub fn setup_logging() {
//!     // Numeric instability warnings and daily summaries.
//!     set_log_level(LevelFilter::Info);
//!     // Per-band vaccination detail.
//!     set_module_filter("vaxpool::simulation", LevelFilter::Trace);
//! }
//! ```
//!
//! Messages go to stderr so that they never interleave with the daily report on stdout.
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard};

#[cfg(feature = "logging")]
use log4rs::Handle;

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// Tracks the global level and per-module filters, and owns the handle of the installed logger.
/// Only the singleton in `LOG_CONFIGURATION` should exist; the public API is free functions.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// Level for modules ("targets") without an explicit filter. `LevelFilter::Off` disables
    /// logging.
    pub(in crate::log) global_log_level: LevelFilter,
    /// Module path to maximum level, e.g. `"vaxpool::simulation"`.
    pub(in crate::log) module_levels: HashMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_levels: HashMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    fn set_module_filter(&mut self, module: &str, level: LevelFilter) {
        if self.module_levels.insert(module.to_string(), level) != Some(level) {
            self.set_config();
        }
    }

    fn remove_module_filter(&mut self, module: &str) {
        if self.module_levels.remove(module).is_some() {
            self.set_config();
        }
    }
}

/// Enables every log message. Equivalent to `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    get_log_configuration().set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    get_log_configuration().set_module_filter(module_path, level_filter);
}

/// Removes a module-specific level filter; the global level applies to the module again.
pub fn remove_module_filter(module_path: &str) {
    get_log_configuration().remove_module_filter(module_path);
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::{get_log_configuration, remove_module_filter, set_log_level, set_module_filter};
    use log::{error, trace, LevelFilter};
    use std::sync::{LazyLock, Mutex};

    // Force logging tests to run serially for consistent behavior.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn test_set_log_level() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Error);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            error!("test_set_log_level: global set to error");
            trace!("test_set_log_level: NOT EMITTED");
        }
        set_log_level(LevelFilter::Off);
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Off);
    }

    #[test]
    fn test_set_remove_module_filter() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_module_filter("vaxpool::simulation", LevelFilter::Debug);
        assert_eq!(
            get_log_configuration()
                .module_levels
                .get("vaxpool::simulation"),
            Some(&LevelFilter::Debug)
        );

        remove_module_filter("vaxpool::simulation");
        assert!(get_log_configuration()
            .module_levels
            .get("vaxpool::simulation")
            .is_none());
    }
}
