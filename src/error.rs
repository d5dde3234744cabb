//! Errors raised by the layers that drive an [`crate::engine::Engine`].
//!
//! The engine itself never fails; these cover loading programs and the
//! external bounds a driver imposes on execution.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("step limit of {limit} exceeded at ip {ip}")]
    StepLimitExceeded { limit: usize, ip: usize },

    #[error("program is waiting for input at ip {ip} but none is left")]
    InputExhausted { ip: usize },

    #[error("no program given (pass a file or -e <PROGRAM>)")]
    NoProgram,
}

pub type Result<T> = std::result::Result<T, Error>;
