//! Error kinds shared by the scene, render and audio crates.

use thiserror::Error;

/// Errors raised while building visualizations or attaching audio controls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A value is outside the range the operation accepts.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A configuration would produce undefined behaviour (e.g. a zero rolloff factor).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A host capability the operation depends on is not available.
    #[error("missing capability: {0}")]
    MissingCapability(&'static str),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Shorthand for [`Error::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
