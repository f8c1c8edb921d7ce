use crate::error::AppError;
use crate::ffi::DropStatus;
use crate::host::AppHost;
use crate::params::AppParams;

/// An application the engine can load and drive.
///
/// Implementors only deal with typed state and an `AppHost`; the lifecycle
/// bookkeeping (`running`/`done` signals, state checks, release) lives in
/// [`AppInstance`](crate::AppInstance), and the C entry points are generated
/// by [`declare_app!`](crate::declare_app).
pub trait Application: Sized {
    /// Name used in log lines
    const NAME: &'static str;

    /// Builds the instance state from the host-supplied parameters.
    fn initialize(params: &AppParams) -> Result<Self, AppError>;

    /// Main entry point: consume the inputs and produce the outputs.
    fn run(&mut self, host: &mut dyn AppHost) -> Result<(), AppError>;

    /// New data was written to input `uid`.
    fn on_data_written(
        &mut self,
        _host: &mut dyn AppHost,
        _uid: &str,
        _data: &[u8],
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// Input `uid` reached a final state. Consumes the instance; after this
    /// the host is told the application is done.
    fn on_drop_completed(
        self,
        _host: &mut dyn AppHost,
        _uid: &str,
        _status: DropStatus,
    ) -> Result<(), AppError> {
        Ok(())
    }
}
