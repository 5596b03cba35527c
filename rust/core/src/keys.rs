// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based storage.
//!
//! Nodes, primitives and connections each live in their own
//! `slotmap::SlotMap`. A connection is shared by the two primitives it joins:
//! both slot arrays hold the same [`ConnectionKey`], so connection identity is
//! key equality rather than pointer equality.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a hierarchy node (group) in the scene tree.
    pub struct NodeKey;

    /// Key for a primitive owned by exactly one node.
    pub struct PrimitiveKey;

    /// Key for a connection shared by two primitives.
    pub struct ConnectionKey;
}
