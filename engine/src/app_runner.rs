//! App Runner Module
//!
//! Loads the app library named by a `RunConfig` and runs it once over the
//! configured input and output files.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use engine_core::app_loader::load_app;
use engine_core::run_config::{IoSection, RunConfig};
use engine_core::{HostError, NativeApp};
use liblogger::{log_info, log_warn};
use liblogger_macros::{log_entry_exit, measure_time};
use libloading::Library;
use plugin_core::{AppStatus, LocalHost};

/// Keeps the app library loaded for as long as its entry points are used.
pub struct AppRunner {
    config: RunConfig,
    app: NativeApp,
    _library: Library,
}

impl AppRunner {
    /// Loads the library at `config.library_path()` and binds its entry points.
    #[log_entry_exit]
    pub fn load(config: RunConfig) -> Result<Self, HostError> {
        let path = config.library_path();
        log_info!(&format!("Loading app {} from {}", config.app.name, path.display()));

        let (binding, library) = load_app(&path)?;
        if !binding.supports_streaming() {
            log_warn!(&format!("{} only supports run()", config.app.name));
        }

        Ok(Self {
            config,
            app: NativeApp::new(binding),
            _library: library,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// `init` + `run` over freshly opened endpoints; outputs are flushed
    /// before returning.
    #[measure_time]
    pub fn run(&self) -> Result<AppStatus, HostError> {
        let mut host = open_endpoints(&self.config.io)?;
        self.app.execute(&self.config.app.params, &mut host)?;
        host.flush_outputs()?;

        let status = host.final_status();
        log_info!(
            &format!("{} done", self.config.app.name),
            Some(format!("status={:?}", status))
        );
        status.ok_or(HostError::Status(None))
    }
}

/// Opens the input for reading and creates (truncating) every output.
pub fn open_endpoints(io: &IoSection) -> Result<LocalHost<'static>, HostError> {
    let mut host = LocalHost::new().with_input(BufReader::new(File::open(&io.input)?));
    for output in &io.outputs {
        host.add_output(BufWriter::new(File::create(output)?));
    }
    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_core::AppHost;
    use std::fs;
    use std::path::PathBuf;

    fn run_config(dir: &std::path::Path, outputs: Vec<PathBuf>) -> RunConfig {
        RunConfig {
            app: engine_core::run_config::AppSection {
                name: "no_such_app".into(),
                library_dir: Some(dir.to_path_buf()),
                params: Default::default(),
            },
            io: IoSection {
                input: dir.join("input.bin"),
                outputs,
            },
        }
    }

    #[test]
    fn endpoints_match_the_io_section() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("input.bin"), b"ABCDEFGH").unwrap();
        let outputs = vec![dir.path().join("a.bin"), dir.path().join("b.bin")];
        let config = run_config(dir.path(), outputs.clone());

        let mut host = open_endpoints(&config.io).unwrap();
        assert_eq!(host.n_inputs(), 1);
        assert_eq!(host.n_outputs(), 2);

        let mut buf = [0u8; 16];
        assert_eq!(host.read(0, &mut buf).unwrap(), 8);
        assert_eq!(host.write(1, b"xyz").unwrap(), 3);
        host.flush_outputs().unwrap();
        drop(host);

        assert!(outputs.iter().all(|o| o.exists()));
        assert_eq!(fs::read(&outputs[1]).unwrap(), b"xyz");
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(dir.path(), vec![dir.path().join("out.bin")]);
        assert!(matches!(open_endpoints(&config.io), Err(HostError::Io(_))));
    }

    #[test]
    fn missing_library_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(dir.path(), vec![dir.path().join("out.bin")]);
        assert!(matches!(AppRunner::load(config), Err(HostError::Load { .. })));
    }
}
