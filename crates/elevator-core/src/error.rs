//! Shared error taxonomy (spec §7). Each binary maps a leaf error to an
//! exit code and a user-facing message; libraries only ever return
//! [`ElevatorError`] or propagate it with `?`.

use std::io;

use thiserror::Error;

/// The error kinds a binary can surface, independent of which one.
#[derive(Debug, Error)]
pub enum ElevatorError {
    /// Wrong argv count/shape. Caller should print usage and exit 1.
    #[error("usage error")]
    Usage,

    /// Bad floor token, same-floor call, out-of-mode operator verb. Never
    /// touches shared state.
    #[error("{0}")]
    Validation(String),

    /// The named car's shared region is missing or unreadable.
    #[error("Unable to access car {car}.")]
    Attach { car: String, #[source] source: io::Error },

    /// Could not reach the controller.
    #[error("Unable to connect to elevator system.")]
    Connect(#[source] io::Error),

    /// An unexpected or malformed wire message.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Any other I/O failure (reads; writes are handled per §7's
    /// ignore-on-write-failure rule by the caller, not by this variant).
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ElevatorError {
    /// Process exit code per spec §7. Every kind here is a `1`; `0` is
    /// reserved for the success path each binary's `main` returns directly.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
