//! Example application for the engine's dynlib contract.
//!
//! Copies everything from its single input to each of its outputs, either
//! in one go (`run`) or as the host pushes data at it (`data_written` /
//! `drop_completed`), and can print throughput statistics when done.
//!
//! Parameters:
//! - `print_stats`: `1` or `true` to print statistics to stdout
//! - `bufsize`: read/write buffer size in bytes (default 65536)

pub mod config;
pub mod copy_loop;
pub mod stats;

use std::sync::Once;
use std::time::Instant;

use plugin_core::logging::{log_debug, log_info};
use plugin_core::{declare_app, AppError, AppHost, AppParams, Application, DropStatus};

use crate::config::{parse_params, CopyConfig};
use crate::copy_loop::{copy_stream, write_to_outputs};
use crate::stats::TransferStats;

static LOGGER_INIT: Once = Once::new();

#[ctor::ctor]
fn on_load() {
    log_debug!(&format!("[{}] >>> LOADED", CopyApp::NAME));
}

pub struct CopyApp {
    config: CopyConfig,
    stats: TransferStats,
}

impl CopyApp {
    pub fn config(&self) -> &CopyConfig {
        &self.config
    }

    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }
}

impl Application for CopyApp {
    const NAME: &'static str = "plugin_dynlib_example";

    fn initialize(params: &AppParams) -> Result<Self, AppError> {
        LOGGER_INIT.call_once(|| {
            if let Err(e) = plugin_core::logging::init_logger(CopyApp::NAME) {
                eprintln!("[{}] logger unavailable: {}", CopyApp::NAME, e);
            }
        });
        let config = parse_params(params);
        log_info!(&format!(
            "bufsize={} print_stats={}",
            config.bufsize, config.print_stats
        ));
        Ok(CopyApp {
            config,
            stats: TransferStats::default(),
        })
    }

    fn run(&mut self, host: &mut dyn AppHost) -> Result<(), AppError> {
        self.stats = copy_stream(host, self.config.bufsize)?;

        log_info!(&format!(
            "copied {} bytes to {} outputs",
            self.stats.total_bytes,
            host.n_outputs()
        ));
        if self.config.print_stats {
            for line in self.stats.run_report(self.config.bufsize) {
                println!("{}", line);
            }
        }
        Ok(())
    }

    fn on_data_written(&mut self, host: &mut dyn AppHost, uid: &str, data: &[u8]) -> Result<(), AppError> {
        let start = Instant::now();
        write_to_outputs(host, data)?;
        self.stats.record_write(data.len(), start.elapsed());
        log_debug!(&format!("forwarded {} bytes from {}", data.len(), uid));
        Ok(())
    }

    fn on_drop_completed(self, host: &mut dyn AppHost, uid: &str, status: DropStatus) -> Result<(), AppError> {
        log_info!(
            &format!("input {} completed after {} bytes", uid, self.stats.total_bytes),
            Some(format!("status={:?}", status))
        );
        if self.config.print_stats {
            println!("{}", self.stats.completion_report(host.n_outputs()));
        }
        Ok(())
    }
}

declare_app!(CopyApp);
