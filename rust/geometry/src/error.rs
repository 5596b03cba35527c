use thiserror::Error;

use rvm_lite_core::{ConnectionKey, PrimitiveType};

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving connections, alignment and caps
#[derive(Error, Debug)]
pub enum Error {
    /// A circular connection reached a primitive that has no circular
    /// interface. The connection graph is corrupt.
    #[error("circular connection {connection:?} reaches {primitive} of type {kind}")]
    NonCircularInterface {
        connection: ConnectionKey,
        primitive: String,
        kind: PrimitiveType,
    },

    /// A connection key that is not in the model.
    #[error("connection not found: {0:?}")]
    ConnectionNotFound(ConnectionKey),

    /// A connection whose direction cannot seed an up vector.
    #[error("connection {0:?} has a degenerate direction")]
    DegenerateDirection(ConnectionKey),

    /// The adjacency resolver left its working set inconsistent.
    #[error("connection resolver invariant violated: {0}")]
    ResolverInvariant(String),

    #[error("Scene model error: {0}")]
    CoreError(#[from] rvm_lite_core::Error),
}
