//! Error taxonomy for the rawscan scanning core (spec §7).
//!
//! `PROBE_TIMEOUT` and `UNEXPECTED_PACKET` are deliberately absent:
//! both are recovered locally inside the classifier/driver and never
//! escape as an `Err`.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid port spec: {0}")]
    InvalidPortSpec(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("no interface named '{0}' found")]
    NoInterface(String),

    #[error("failed to create raw socket: {0}")]
    SocketCreateFailed(#[source] io::Error),

    #[error("failed to send probe: {0}")]
    SendFailed(#[source] io::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type ScanResult<T> = Result<T, ScanError>;
