/*
 * Logger implementation module
 *
 * This file implements the core Logger functionality which includes:
 * - Creation and initialization of the global logger instance
 * - Configuration of the logger from TOML files or programmatically
 * - Optional asynchronous logging through a Tokio worker fed by a channel
 * - Fallback to synchronous logging when the channel is full
 *
 * The Logger is a singleton behind a OnceCell; calls made before
 * initialization go straight to stderr.
 */

use chrono::Utc;
use once_cell::sync::OnceCell;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use tokio::runtime::Runtime;
use tokio::sync::{
    mpsc::{self, Receiver, Sender},
    oneshot,
};
use tokio::time::{timeout, Duration};

use crate::config::{LogConfig, LogLevel};
use crate::outputs::{create_log_output, LogOutput};

static LOGGER_INSTANCE: OnceCell<Arc<Mutex<LoggerInner>>> = OnceCell::new();
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

const CHANNEL_CAPACITY: usize = 100;

enum LogCommand {
    Entry(String),
    Shutdown(oneshot::Sender<()>),
}

struct LoggerInner {
    config: Option<LogConfig>,
    output: Option<Box<dyn LogOutput>>,
    async_sender: Option<Sender<LogCommand>>,
    /// Lines that went through the sync path because the channel was full
    dropped_logs: AtomicU64,
}

impl LoggerInner {
    fn new() -> Self {
        LoggerInner {
            config: None,
            output: None,
            async_sender: None,
            dropped_logs: AtomicU64::new(0),
        }
    }

    fn init_with_config(&mut self, config: LogConfig) -> Result<(), String> {
        let output = create_log_output(&config)?;

        if config.async_logging {
            let runtime = match RUNTIME.get() {
                Some(rt) => rt,
                None => {
                    let rt = Runtime::new()
                        .map_err(|e| format!("Failed to create Tokio runtime: {}", e))?;
                    RUNTIME.get_or_init(|| rt)
                }
            };

            let (tx, rx) = mpsc::channel::<LogCommand>(CHANNEL_CAPACITY);
            runtime.spawn(process_log_commands(rx, output));
            self.async_sender = Some(tx);
            // Used for the sync fallback while the worker owns the primary output
            self.output = Some(create_log_output(&config)?);
        } else {
            self.async_sender = None;
            self.output = Some(output);
        }

        self.config = Some(config);
        Ok(())
    }

    fn log(&mut self, level: LogLevel, message: &str, context: Option<&str>, file: &str, line: u32, module: &str) {
        if let Some(ref config) = self.config {
            if level < config.threshold {
                return;
            }
        }

        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        let formatted = format_log_message(&timestamp, level, message, context, file, line, module);

        if let Some(ref sender) = self.async_sender {
            match sender.try_send(LogCommand::Entry(formatted)) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(LogCommand::Entry(formatted)))
                | Err(mpsc::error::TrySendError::Closed(LogCommand::Entry(formatted))) => {
                    self.dropped_logs.fetch_add(1, Ordering::Relaxed);
                    self.log_sync(&formatted);
                }
                Err(_) => {}
            }
        } else {
            self.log_sync(&formatted);
        }
    }

    fn log_sync(&mut self, formatted: &str) {
        match self.output {
            Some(ref mut output) => {
                if let Err(e) = output.write_log(formatted) {
                    eprintln!("Failed to write log: {}", e);
                }
            }
            None => {
                let _ = writeln!(io::stderr(), "{}", formatted);
            }
        }
    }
}

fn format_log_message(timestamp: &str, level: LogLevel, message: &str,
                      context: Option<&str>, file: &str, line: u32, module: &str) -> String {
    let level_str = level.as_str();
    match context {
        Some(ctx) => format!("{} [{}] [{}:{}] [{}] {} | {}",
            timestamp, level_str, file, line, module, message, ctx),
        None => format!("{} [{}] [{}:{}] [{}] {}",
            timestamp, level_str, file, line, module, message),
    }
}

async fn process_log_commands(mut receiver: Receiver<LogCommand>, mut output: Box<dyn LogOutput>) {
    while let Some(cmd) = receiver.recv().await {
        match cmd {
            LogCommand::Entry(line) => {
                if let Err(e) = output.write_log(&line) {
                    eprintln!("Async logging error: {}", e);
                }
            }
            LogCommand::Shutdown(completion) => {
                let _ = output.flush();
                let _ = completion.send(());
                break;
            }
        }
    }
}

pub struct Logger;

impl Logger {
    /// Initialize the logger from the [logging] section of a TOML file
    pub fn init_with_config_file<P: AsRef<Path>>(config_path: P) -> Result<(), String> {
        let config = LogConfig::from_file(config_path)?;
        Self::init_with_config(config)
    }

    /// Initialize (or re-initialize) the logger with a LogConfig
    pub fn init_with_config(config: LogConfig) -> Result<(), String> {
        let logger = LOGGER_INSTANCE.get_or_init(|| Arc::new(Mutex::new(LoggerInner::new())));
        let mut guard = match logger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.init_with_config(config)
    }

    pub fn debug(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Debug, message, context, file, line, module)
    }

    pub fn info(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Info, message, context, file, line, module)
    }

    pub fn warn(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Warn, message, context, file, line, module)
    }

    pub fn error(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Error, message, context, file, line, module)
    }

    fn log_with_metadata(level: LogLevel, message: &str, context: Option<String>, file: &str, line: u32, module: &str) {
        let file_name = Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file);

        let logger = LOGGER_INSTANCE.get_or_init(|| Arc::new(Mutex::new(LoggerInner::new())));
        match logger.lock() {
            Ok(mut logger) => logger.log(level, message, context.as_deref(), file_name, line, module),
            Err(_) => {
                let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
                let line = format_log_message(&timestamp, level, message, Some("MUTEX POISONED"), file_name, line, module);
                let _ = writeln!(io::stderr(), "{}", line);
            }
        }
    }

    /// Drain the async worker (if any) and flush the output
    pub fn shutdown() -> Result<(), String> {
        let Some(logger) = LOGGER_INSTANCE.get() else {
            return Ok(());
        };

        let sender = {
            let mut guard = logger.lock().map_err(|_| "Logger mutex poisoned".to_string())?;
            let dropped = guard.dropped_logs.swap(0, Ordering::Relaxed);
            if dropped > 0 {
                let warning = format!("{} log messages bypassed the async worker due to backpressure", dropped);
                guard.log(LogLevel::Warn, &warning, None, "logger.rs", line!(), module_path!());
            }
            if let Some(ref mut output) = guard.output {
                output.flush()?;
            }
            guard.async_sender.take()
        };

        let (Some(sender), Some(rt)) = (sender, RUNTIME.get()) else {
            return Ok(());
        };

        let (completion_tx, completion_rx) = oneshot::channel();
        rt.block_on(async move {
            sender.send(LogCommand::Shutdown(completion_tx)).await
                .map_err(|e| format!("Failed to send shutdown command: {}", e))?;
            match timeout(Duration::from_secs(5), completion_rx).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(_)) => Err("Shutdown completion channel was closed".to_string()),
                Err(_) => Err("Logger shutdown timed out after 5 seconds".to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_and_without_context() {
        let plain = format_log_message("T", LogLevel::Info, "hello", None, "lib.rs", 7, "app");
        assert_eq!(plain, "T [INFO] [lib.rs:7] [app] hello");

        let ctx = format_log_message("T", LogLevel::Error, "boom", Some("uid=1"), "lib.rs", 9, "app");
        assert_eq!(ctx, "T [ERROR] [lib.rs:9] [app] boom | uid=1");
    }

    #[test]
    fn threshold_filters_lower_levels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered.log");

        let mut inner = LoggerInner::new();
        inner
            .init_with_config(LogConfig {
                log_type: crate::LogType::File,
                threshold: LogLevel::Warn,
                file_path: Some(path.to_string_lossy().into_owned()),
                force_flush: true,
                ..LogConfig::default()
            })
            .unwrap();

        inner.log(LogLevel::Info, "quiet", None, "t.rs", 1, "t");
        inner.log(LogLevel::Error, "loud", None, "t.rs", 2, "t");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("quiet"));
        assert!(contents.contains("[ERROR] [t.rs:2] [t] loud"));
    }
}
