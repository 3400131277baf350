//! Error types

use thiserror::Error;

use crate::slots::ContextId;

/// Errors reported by a raster host while accepting a batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host cannot take batches right now (no surface, torn down, ...)
    #[error("Raster host unavailable: {0}")]
    Unavailable(String),

    /// The host refused the batch
    #[error("Raster host rejected batch: {0}")]
    Rejected(String),
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum Error {
    /// Context 0 is the always-present primary surface and is never released
    #[error("Tried to release the primary context")]
    PrimaryContextRelease,

    /// The id is not currently leased (never leased, or already released)
    #[error("Context {0} is not leased")]
    ContextNotLeased(ContextId),

    /// Every id in the 16-bit space is leased
    #[error("No free context ids left")]
    ContextsExhausted,

    /// Another renderer already owns the primary context
    #[error("Primary context is already bound to a live renderer")]
    PrimaryInUse,

    /// A string could not be turned into a null-terminated text buffer
    #[error("Text buffer rejected: {0}")]
    TextRejected(String),

    #[error(transparent)]
    Host(#[from] HostError),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
