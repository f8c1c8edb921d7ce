use plugin_core::ffi::{DataWrittenFn, DropCompletedFn, InitFn, RunFn};

/// The engine's handle on a loaded application's entry points.
///
/// `init` and `run` are mandatory; `data_written` and `drop_completed` are
/// only needed to stream data into the app as it is produced.
///
/// The function pointers are only valid while the library they came from
/// stays loaded; `load_app` returns the `Library` next to the binding for
/// that reason.
#[derive(Debug, Clone)]
pub struct AppBinding {
    /// Name used in log lines, usually the library path
    pub name: String,
    pub init: InitFn,
    pub run: RunFn,
    pub data_written: Option<DataWrittenFn>,
    pub drop_completed: Option<DropCompletedFn>,
}

impl AppBinding {
    /// Binds entry points that are already linked into this process.
    pub fn from_entry_points(
        name: impl Into<String>,
        init: InitFn,
        run: RunFn,
        data_written: Option<DataWrittenFn>,
        drop_completed: Option<DropCompletedFn>,
    ) -> Self {
        Self {
            name: name.into(),
            init,
            run,
            data_written,
            drop_completed,
        }
    }

    pub fn supports_streaming(&self) -> bool {
        self.data_written.is_some() && self.drop_completed.is_some()
    }
}
