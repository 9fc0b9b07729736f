//! Engine errors.
//!
//! Every failure is synchronous and local to the call that triggered it.
//! Writes the engine does not support (changing `tag`, assigning the
//! reference slot, ...) are not errors: they report `Ok(false)`.

use thiserror::Error;

use crate::dom::DomError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A reference name is already present on the target owner.
    #[error("'{name}' already present on owner")]
    NameCollision { name: String },

    /// A reference name contains characters outside the identifier pattern.
    #[error("'{name}' is not a valid reference name")]
    InvalidName { name: String },

    /// A component wrapper was built outside its factory contract.
    #[error("illegal component construction: {0}")]
    IllegalConstruction(String),

    /// A content index was assigned past the end of the sequence.
    #[error("content index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A declarative description could not be turned into model data.
    #[error("invalid model data: {0}")]
    InvalidData(String),

    /// The host tree refused an operation.
    #[error(transparent)]
    Dom(#[from] DomError),
}
