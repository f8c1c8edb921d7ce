use std::ffi::NulError;
use std::io;
use std::os::raw::c_int;
use std::path::PathBuf;

use plugin_core::AppError;
use thiserror::Error;

/// Failures on the engine side of the app contract
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to load app library {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("app library does not export `{symbol}`")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: Option<libloading::Error>,
    },

    #[error("app init returned status {0}")]
    Init(c_int),

    #[error("app run returned status {0}")]
    Run(c_int),

    #[error("app finished with status {0:?}")]
    Status(Option<plugin_core::AppStatus>),

    #[error("parameter contains a NUL byte")]
    InvalidParam(#[from] NulError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    App(#[from] AppError),
}
