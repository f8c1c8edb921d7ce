/*
 * Process-wide logger shared by the engine and the apps it loads
 *
 * - Logger: initialization from app_config.toml or a LogConfig, shutdown
 * - LogConfig / LogLevel / LogType: the [logging] section
 * - log_debug!, log_info!, log_warn!, log_error!: take a &str message and an
 *   optional Option<String> context, and record the call site
 *
 * Lines logged before initialization go to stderr with default settings.
 */

mod config;
mod logger;
mod outputs;

pub use config::{LogConfig, LogLevel, LogType};
pub use logger::Logger;

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:ident, $message:expr, $context:expr) => {
        $crate::Logger::$level($message, $context, file!(), line!(), module_path!())
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(,)?) => { $crate::__log_at!(debug, $message, None) };
    ($message:expr, $context:expr $(,)?) => { $crate::__log_at!(debug, $message, $context) };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(,)?) => { $crate::__log_at!(info, $message, None) };
    ($message:expr, $context:expr $(,)?) => { $crate::__log_at!(info, $message, $context) };
}

#[macro_export]
macro_rules! log_warn {
    ($message:expr $(,)?) => { $crate::__log_at!(warn, $message, None) };
    ($message:expr, $context:expr $(,)?) => { $crate::__log_at!(warn, $message, $context) };
}

#[macro_export]
macro_rules! log_error {
    ($message:expr $(,)?) => { $crate::__log_at!(error, $message, None) };
    ($message:expr, $context:expr $(,)?) => { $crate::__log_at!(error, $message, $context) };
}
