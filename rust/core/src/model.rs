// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene tree with arena-backed nodes, primitives and connections.

use nalgebra::Matrix4;
use slotmap::SlotMap;

use crate::bounds::BoundingBox;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::keys::{ConnectionKey, NodeKey, PrimitiveKey};
use crate::primitive::{Primitive, PrimitiveKind, MAX_CONNECTIONS};

/// A group in the scene hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub primitives: Vec<PrimitiveKey>,
}

/// A fully loaded scene.
///
/// The tree and the primitive shapes are fixed once loaded; only the
/// connection arena, the per-primitive slot arrays and the sample start
/// angles are written afterwards.
#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    nodes: SlotMap<NodeKey, Node>,
    primitives: SlotMap<PrimitiveKey, Primitive>,
    connections: SlotMap<ConnectionKey, Connection>,
    roots: Vec<NodeKey>,
}

impl SceneModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level node.
    pub fn add_root(&mut self, name: impl Into<String>) -> NodeKey {
        let key = self.nodes.insert(Node {
            name: name.into(),
            ..Node::default()
        });
        self.roots.push(key);
        key
    }

    /// Add a child node under `parent`.
    pub fn add_child(&mut self, parent: NodeKey, name: impl Into<String>) -> Result<NodeKey> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let key = self.nodes.insert(Node {
            name: name.into(),
            parent: Some(parent),
            ..Node::default()
        });
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(key);
        }
        Ok(key)
    }

    /// Add a primitive owned by `node`.
    pub fn add_primitive(
        &mut self,
        node: NodeKey,
        kind: PrimitiveKind,
        matrix: Matrix4<f64>,
    ) -> Result<PrimitiveKey> {
        let owner = self.nodes.get_mut(node).ok_or(Error::NodeNotFound(node))?;
        let key = self.primitives.insert(Primitive::new(node, kind, matrix));
        owner.primitives.push(key);
        Ok(key)
    }

    #[inline]
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    #[inline]
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    #[inline]
    pub fn primitive(&self, key: PrimitiveKey) -> Option<&Primitive> {
        self.primitives.get(key)
    }

    /// Like [`primitive`](Self::primitive) but a missing key is an error.
    pub fn try_primitive(&self, key: PrimitiveKey) -> Result<&Primitive> {
        self.primitives.get(key).ok_or(Error::PrimitiveNotFound(key))
    }

    #[inline]
    pub fn connection(&self, key: ConnectionKey) -> Option<&Connection> {
        self.connections.get(key)
    }

    /// All primitives in arena order.
    pub fn primitives(&self) -> impl Iterator<Item = (PrimitiveKey, &Primitive)> {
        self.primitives.iter()
    }

    /// All connections in insertion order (arena order while no connection
    /// has been removed).
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionKey, &Connection)> {
        self.connections.iter()
    }

    #[inline]
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    #[inline]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Store a connection and record its key in both endpoint slot arrays.
    pub fn insert_connection(&mut self, connection: Connection) -> Result<ConnectionKey> {
        let a = connection.primitive_a;
        let b = connection.primitive_b;
        let prim_a = self.try_primitive(a)?;
        if a == b {
            return Err(Error::SelfConnection(prim_a.describe(a)));
        }
        let prim_b = self.try_primitive(b)?;

        for (key, prim, slot) in [(a, prim_a, connection.slot_a), (b, prim_b, connection.slot_b)] {
            if slot >= MAX_CONNECTIONS {
                return Err(Error::SlotOutOfRange {
                    primitive: prim.describe(key),
                    slot,
                    max: MAX_CONNECTIONS,
                });
            }
            if prim.connections[slot].is_some() {
                return Err(Error::SlotOccupied {
                    primitive: prim.describe(key),
                    slot,
                });
            }
        }

        let (slot_a, slot_b) = (connection.slot_a, connection.slot_b);
        let key = self.connections.insert(connection);
        if let Some(p) = self.primitives.get_mut(a) {
            p.connections[slot_a] = Some(key);
        }
        if let Some(p) = self.primitives.get_mut(b) {
            p.connections[slot_b] = Some(key);
        }
        Ok(key)
    }

    /// Drop every connection and empty all slot arrays.
    ///
    /// The arena is rebuilt rather than cleared, so connections inserted
    /// afterwards get the same keys and iteration order as the first time.
    pub fn clear_connections(&mut self) {
        self.connections = SlotMap::with_key();
        for primitive in self.primitives.values_mut() {
            primitive.connections = [None; MAX_CONNECTIONS];
        }
    }

    pub fn set_sample_start_angle(&mut self, key: PrimitiveKey, angle: f64) -> Result<()> {
        let primitive = self
            .primitives
            .get_mut(key)
            .ok_or(Error::PrimitiveNotFound(key))?;
        primitive.sample_start_angle = angle;
        Ok(())
    }

    /// Reset every sample start angle to zero.
    pub fn reset_sample_start_angles(&mut self) {
        for primitive in self.primitives.values_mut() {
            primitive.sample_start_angle = 0.0;
        }
    }

    /// World-space bounds of all primitives, `None` for an empty scene.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.primitives
            .values()
            .map(Primitive::world_bounds)
            .reduce(|acc, b| acc.union(&b))
    }
}
