mod app_runner;

use std::env;
use std::process::ExitCode;

use engine_core::run_config::RunConfig;
use engine_core::HostError;
use liblogger::{log_error, log_info, LogConfig, Logger};

use crate::app_runner::AppRunner;

const DEFAULT_CONFIG: &str = "app_config.toml";

fn run(config_path: &str) -> Result<(), HostError> {
    let config = RunConfig::load_from_file(config_path)?;
    let runner = AppRunner::load(config)?;
    let status = runner.run()?;

    log_info!(
        &format!(
            "Copied {} to {} output(s)",
            runner.config().io.input.display(),
            runner.config().io.outputs.len()
        ),
        Some(format!("status={:?}", status))
    );
    Ok(())
}

fn main() -> ExitCode {
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    if let Err(e) = Logger::init_with_config_file(&config_path) {
        eprintln!("Failed to initialize logger from {}: {}", config_path, e);
        if let Err(e) = Logger::init_with_config(LogConfig::default()) {
            eprintln!("Logging to stderr only: {}", e);
        }
    }
    log_info!(&format!("Engine starting with {}", config_path));

    let code = match run(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!(&format!("Engine failed: {}", e));
            ExitCode::FAILURE
        }
    };

    if let Err(e) = Logger::shutdown() {
        eprintln!("Logger shutdown failed: {}", e);
    }
    code
}
