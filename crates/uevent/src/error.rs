//! Uevent error types

use thiserror::Error;

/// Errors raised while interpreting uevent fields
///
/// Parsing a buffer never fails; these only come from the typed accessors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UeventError {
    /// The `ACTION` value is not one the kernel emits
    #[error("Unknown uevent action: {0:?}")]
    UnknownAction(String),
}
