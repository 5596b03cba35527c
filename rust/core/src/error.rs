// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the scene model.

use crate::keys::{NodeKey, PrimitiveKey};

/// Result type alias for scene model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or annotating a scene model.
///
/// All of these are structural: the caller is expected to abort the
/// conversion that triggered them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The local-to-world matrix cannot be split into scale, rotation and
    /// translation.
    #[error("failed to decompose transform of {primitive}: {matrix}")]
    Decomposition { primitive: String, matrix: String },

    /// The local-to-world matrix has no inverse.
    #[error("transform of {primitive} is not invertible: {matrix}")]
    NotInvertible { primitive: String, matrix: String },

    /// A connection slot index past the fixed slot array.
    #[error("connection slot {slot} out of range for {primitive} (max {max})")]
    SlotOutOfRange {
        primitive: String,
        slot: usize,
        max: usize,
    },

    /// A connection slot that already holds a connection.
    #[error("connection slot {slot} of {primitive} is already occupied")]
    SlotOccupied { primitive: String, slot: usize },

    /// A connection whose two ends are the same primitive.
    #[error("connection joins {0} to itself")]
    SelfConnection(String),

    /// Node key not found in the model.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// Primitive key not found in the model.
    #[error("primitive not found: {0:?}")]
    PrimitiveNotFound(PrimitiveKey),
}
