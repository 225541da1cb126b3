//! Common error types
//!
//! Every error carries a [`Severity`] so callers can apply one policy:
//! fatal errors stop the affected component, transient errors drop one unit
//! of work (one event), skipped errors are data-quality issues that are
//! silently left out of results.

use thiserror::Error;

/// How far an error is allowed to propagate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The component cannot start or continue
    Fatal,
    /// One event was lost; the component keeps running
    Transient,
    /// One data entry was left out; never surfaced to the user
    Skipped,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Netlink socket error: {0}")]
    Socket(#[source] std::io::Error),

    #[error("Event multiplexer error: {0}")]
    Multiplexer(#[source] std::io::Error),

    #[error("Device database error: {0}")]
    Database(String),

    #[error("Failed to receive uevent: {0}")]
    Receive(#[source] std::io::Error),

    #[error("Event handler failed: {0}")]
    Handler(String),

    #[error("Entry skipped: {0}")]
    Skipped(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Propagation class of this error
    pub fn severity(&self) -> Severity {
        match self {
            Error::Socket(_)
            | Error::Multiplexer(_)
            | Error::Database(_)
            | Error::Config(_) => Severity::Fatal,
            Error::Receive(_) | Error::Handler(_) => Severity::Transient,
            Error::Skipped(_) => Severity::Skipped,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

pub type Result<T> = std::result::Result<T, Error>;
