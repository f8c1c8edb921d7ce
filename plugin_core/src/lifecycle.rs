//! Lifecycle of one application instance.
//!
//! `Uninitialized -> Initialized -> Running -> Finished`. The host sees
//! `running()` once, on the first transition into `Running`, and `done()`
//! exactly once, when the instance reaches `Finished`. The application state
//! is dropped at that point.

use crate::application::Application;
use crate::error::AppError;
use crate::ffi::{AppStatus, DropStatus};
use crate::host::AppHost;
use crate::params::AppParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Uninitialized,
    Initialized,
    Running,
    Finished,
}

pub struct AppInstance<A> {
    state: AppState,
    app: Option<A>,
}

impl<A: Application> AppInstance<A> {
    pub fn new() -> Self {
        Self {
            state: AppState::Uninitialized,
            app: None,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    /// The application state, while it is alive
    pub fn app(&self) -> Option<&A> {
        self.app.as_ref()
    }

    pub fn initialize(&mut self, params: &AppParams) -> Result<(), AppError> {
        self.expect_state("initialize", &[AppState::Uninitialized])?;
        self.app = Some(A::initialize(params)?);
        self.state = AppState::Initialized;
        liblogger::log_debug!(&format!("{} initialized with {} parameters", A::NAME, params.len()));
        Ok(())
    }

    /// Runs the application to completion and reports the outcome.
    pub fn run(&mut self, host: &mut dyn AppHost) -> Result<(), AppError> {
        self.expect_state("run", &[AppState::Initialized])?;
        self.enter_running(host);

        let result = match self.app.as_mut() {
            Some(app) => app.run(host),
            None => Err(self.invalid("run")),
        };
        self.finish(host, &result);
        result
    }

    pub fn data_written(&mut self, host: &mut dyn AppHost, uid: &str, data: &[u8]) -> Result<(), AppError> {
        self.expect_state("handle written data", &[AppState::Initialized, AppState::Running])?;
        self.enter_running(host);

        let result = match self.app.as_mut() {
            Some(app) => app.on_data_written(host, uid, data),
            None => Err(self.invalid("handle written data")),
        };
        if result.is_err() {
            self.finish(host, &result);
        }
        result
    }

    pub fn drop_completed(&mut self, host: &mut dyn AppHost, uid: &str, status: DropStatus) -> Result<(), AppError> {
        self.expect_state("complete", &[AppState::Initialized, AppState::Running])?;

        let result = match self.app.take() {
            Some(app) => app.on_drop_completed(host, uid, status),
            None => Err(self.invalid("complete")),
        };
        self.finish(host, &result);
        result
    }

    fn enter_running(&mut self, host: &mut dyn AppHost) {
        if self.state == AppState::Initialized {
            host.running();
            self.state = AppState::Running;
        }
    }

    fn finish(&mut self, host: &mut dyn AppHost, result: &Result<(), AppError>) {
        let status = match result {
            Ok(()) => AppStatus::Finished,
            Err(e) => {
                liblogger::log_error!(&format!("{} failed: {}", A::NAME, e));
                AppStatus::Error
            }
        };
        self.app = None;
        self.state = AppState::Finished;
        host.done(status);
    }

    fn expect_state(&self, operation: &'static str, allowed: &[AppState]) -> Result<(), AppError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> AppError {
        AppError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl<A: Application> Default for AppInstance<A> {
    fn default() -> Self {
        Self::new()
    }
}
