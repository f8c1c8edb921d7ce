use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

use crate::lifecycle::AppState;

/// Everything that can go wrong inside an application or at its host boundary
#[derive(Debug, Error)]
pub enum AppError {
    #[error("couldn't allocate {requested} bytes for the read/write buffer")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("application has no input to read from")]
    MissingInput,

    #[error("input {0} does not exist")]
    NoSuchInput(usize),

    #[error("output {0} does not exist")]
    NoSuchOutput(usize),

    #[error("failed to read from input {input}")]
    Read {
        input: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to output {output}")]
    Write {
        output: usize,
        #[source]
        source: io::Error,
    },

    #[error("output {output} accepted {written} of {expected} bytes")]
    ShortWrite {
        output: usize,
        expected: usize,
        written: usize,
    },

    #[error("cannot {operation} while the application is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: AppState,
    },

    #[error("cannot {0}: no live application instance (not initialized, or already finished)")]
    NoInstance(&'static str),

    #[error("null pointer passed for {0}")]
    NullPointer(&'static str),

    #[error("application panicked: {0}")]
    Panicked(String),
}

impl AppError {
    /// Builds `Panicked` from a `catch_unwind` payload
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        AppError::Panicked(msg)
    }
}
