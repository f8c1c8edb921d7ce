/*
 * Log output implementations
 *
 * - ConsoleOutput: writes lines to stderr (stdout is left to the program)
 * - FileOutput: appends lines to a file, optionally flushing every line
 *
 * Each output implements the LogOutput trait. create_log_output picks the
 * right one for a LogConfig.
 */

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::{LogConfig, LogType};

pub trait LogOutput: Send {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String>;

    fn flush(&mut self) -> Result<(), String> {
        Ok(())
    }
}

pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn new() -> Self {
        ConsoleOutput {}
    }
}

impl LogOutput for ConsoleOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        writeln!(io::stderr(), "{}", formatted_message)
            .map_err(|e| format!("Failed to write to console: {}", e))
    }
}

pub struct FileOutput {
    file_handle: Arc<Mutex<File>>,
    force_flush: bool,
}

impl FileOutput {
    pub fn new(file_path: &Path, force_flush: bool) -> Result<Self, String> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create log directory: {}", e))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        Ok(FileOutput {
            file_handle: Arc::new(Mutex::new(file)),
            force_flush,
        })
    }
}

impl LogOutput for FileOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        let mut file = self.file_handle.lock()
            .map_err(|_| "Failed to lock file mutex".to_string())?;

        file.write_all(formatted_message.as_bytes())
            .map_err(|e| format!("Failed to write to log file: {}", e))?;
        file.write_all(b"\n")
            .map_err(|e| format!("Failed to write newline to log file: {}", e))?;

        if self.force_flush {
            file.flush()
                .map_err(|e| format!("Failed to flush log file: {}", e))?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), String> {
        let mut file = self.file_handle.lock()
            .map_err(|_| "Failed to lock file mutex".to_string())?;
        file.flush().map_err(|e| format!("Failed to flush log file: {}", e))
    }
}

/// Creates the log output described by `config`
pub fn create_log_output(config: &LogConfig) -> Result<Box<dyn LogOutput>, String> {
    match config.log_type {
        LogType::Console => Ok(Box::new(ConsoleOutput::new())),
        LogType::File => {
            let full_path = config.resolved_file_path()
                .ok_or_else(|| "File path not specified in configuration".to_string())?;
            Ok(Box::new(FileOutput::new(&full_path, config.force_flush)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_output_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");

        let mut output = FileOutput::new(&path, true).unwrap();
        output.write_log("first").unwrap();
        output.write_log("second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn file_type_requires_a_path() {
        let config = LogConfig {
            log_type: LogType::File,
            ..LogConfig::default()
        };
        assert!(create_log_output(&config).is_err());
    }
}
