use liblogger_macros::log_entry_exit;
use plugin_core::logging::{log_debug, log_warn};
use plugin_core::AppParams;

pub const DEFAULT_BUFSIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyConfig {
    /// Print throughput statistics to stdout
    pub print_stats: bool,
    /// Size of the read/write buffer, always > 0
    pub bufsize: usize,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            print_stats: false,
            bufsize: DEFAULT_BUFSIZE,
        }
    }
}

/// Scans the parameters front to back; later keys override earlier ones.
#[log_entry_exit]
pub fn parse_params(params: &AppParams) -> CopyConfig {
    let mut config = CopyConfig::default();

    for (key, value) in params.iter() {
        match key {
            "print_stats" => config.print_stats = value == "1" || value == "true",
            "bufsize" => match value.trim().parse::<usize>() {
                Ok(bufsize) if bufsize > 0 => config.bufsize = bufsize,
                _ => log_warn!(
                    &format!("ignoring invalid bufsize {:?}, keeping {}", value, config.bufsize)
                ),
            },
            _ => log_debug!(&format!("ignoring unknown parameter {:?}", key)),
        }
    }

    config
}
