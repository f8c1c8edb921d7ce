//! Logging for applications
//!
//! Re-exports the `liblogger` macros so applications can log through
//! plugin_core without naming the logger crate themselves.

pub use liblogger::{log_debug, log_error, log_info, log_warn, Logger};

/// Initialize the logger for an application
///
/// Reads the `[logging]` section of `app_config.toml` in the working
/// directory, or falls back to console defaults when it is missing. This is
/// not necessarily the file the engine was started with. An app built as a
/// cdylib carries its own logger instance; one linked into the engine
/// process re-configures the shared one.
pub fn init_logger(app_name: &str) -> Result<(), String> {
    match Logger::init_with_config_file("app_config.toml") {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("[{}] Error initializing logger from config: {}", app_name, e);
            Logger::init_with_config(liblogger::LogConfig::default())
        }
    }
}
