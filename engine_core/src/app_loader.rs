use std::path::Path;

use libloading::{Library, Symbol};
use liblogger::{log_debug, log_info};
use plugin_core::ffi::{DataWrittenFn, DropCompletedFn, InitFn, RunFn};

use crate::app_binding::AppBinding;
use crate::error::HostError;

/// Loads an application from a shared library file.
///
/// The library must export `init` and `run`; `data_written` and
/// `drop_completed` are picked up when present. The returned `Library` must
/// outlive every use of the binding.
pub fn load_app<P: AsRef<Path>>(path: P) -> Result<(AppBinding, Library), HostError> {
    let path = path.as_ref();
    log_info!(&format!("Loading app library {}", path.display()));

    unsafe {
        let lib = Library::new(path).map_err(|source| HostError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let init = required::<InitFn>(&lib, "init")?;
        let run = required::<RunFn>(&lib, "run")?;
        let data_written = optional::<DataWrittenFn>(&lib, "data_written");
        let drop_completed = optional::<DropCompletedFn>(&lib, "drop_completed");

        let binding = AppBinding {
            name: path.display().to_string(),
            init,
            run,
            data_written,
            drop_completed,
        };
        log_debug!(&format!(
            "{}: init = {:p}, run = {:p}, streaming = {}",
            binding.name,
            init as *const (),
            run as *const (),
            binding.supports_streaming()
        ));

        Ok((binding, lib))
    }
}

unsafe fn required<T: Copy>(lib: &Library, symbol: &'static str) -> Result<T, HostError> {
    let sym: Symbol<T> = lib
        .get(symbol.as_bytes())
        .map_err(|source| HostError::MissingSymbol {
            symbol,
            source: Some(source),
        })?;
    Ok(*sym)
}

unsafe fn optional<T: Copy>(lib: &Library, symbol: &'static str) -> Option<T> {
    lib.get::<T>(symbol.as_bytes()).ok().map(|sym| *sym)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::app_utils::resolve_app_filename("nope"));
        match load_app(&path) {
            Err(HostError::Load { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other.map(|(b, _)| b.name)),
        }
    }
}
