// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Confirmed adjacency between two primitives.

use nalgebra::{Point3, Vector3};

use crate::keys::PrimitiveKey;

/// Face kinds present on a connection.
///
/// A connection carries the union of the kinds of its two anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConnectionFlags(u8);

impl ConnectionFlags {
    pub const NONE: Self = Self(0);
    pub const CIRCULAR: Self = Self(1);
    pub const RECTANGULAR: Self = Self(1 << 1);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ConnectionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for ConnectionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// A connection between slot `slot_a` of `primitive_a` and slot `slot_b` of
/// `primitive_b`.
///
/// `position` and `direction` are the world-space values of the anchor on
/// `primitive_a`. Once inserted into a model a connection is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub primitive_a: PrimitiveKey,
    pub primitive_b: PrimitiveKey,
    pub slot_a: usize,
    pub slot_b: usize,
    pub position: Point3<f64>,
    pub direction: Vector3<f64>,
    pub flags: ConnectionFlags,
}

impl Connection {
    #[inline]
    pub fn is_circular(&self) -> bool {
        self.flags.contains(ConnectionFlags::CIRCULAR)
    }

    #[inline]
    pub fn is_rectangular(&self) -> bool {
        self.flags.contains(ConnectionFlags::RECTANGULAR)
    }

    /// Whether `primitive` is one of the two endpoints.
    #[inline]
    pub fn involves(&self, primitive: PrimitiveKey) -> bool {
        self.primitive_a == primitive || self.primitive_b == primitive
    }

    /// The endpoint opposite `primitive`, or `None` if `primitive` is not an
    /// endpoint.
    pub fn other(&self, primitive: PrimitiveKey) -> Option<PrimitiveKey> {
        if self.primitive_a == primitive {
            Some(self.primitive_b)
        } else if self.primitive_b == primitive {
            Some(self.primitive_a)
        } else {
            None
        }
    }

    /// Slot index the connection occupies on `primitive`.
    pub fn slot_of(&self, primitive: PrimitiveKey) -> Option<usize> {
        if self.primitive_a == primitive {
            Some(self.slot_a)
        } else if self.primitive_b == primitive {
            Some(self.slot_b)
        } else {
            None
        }
    }

    /// Both endpoints with their slots, `a` first.
    #[inline]
    pub fn endpoints(&self) -> [(PrimitiveKey, usize); 2] {
        [(self.primitive_a, self.slot_a), (self.primitive_b, self.slot_b)]
    }
}
