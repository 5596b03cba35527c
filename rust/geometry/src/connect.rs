// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adjacency resolver
//!
//! Every primitive face that can touch another primitive emits an anchor:
//! a world-space point with an outward direction. Anchors are matched
//! bottom-up over the scene tree. A node first resolves its children, then
//! matches its own primitives' anchors against whatever its children left
//! unmatched. Two anchors match when they belong to different primitives,
//! coincide within the configured epsilon and face each other.

use nalgebra::{Point3, Vector3};
use smallvec::{smallvec, SmallVec};

use rvm_lite_core::transform::{transform_direction, transform_point};
use rvm_lite_core::{
    Connection, ConnectionFlags, NodeKey, PrimitiveKey, PrimitiveKind, SceneModel,
};

use crate::config::ConnectConfig;
use crate::error::{Error, Result};

/// Anchor in the primitive's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalAnchor {
    pub position: Point3<f64>,
    /// Outward direction, not necessarily unit length.
    pub direction: Vector3<f64>,
    pub slot: usize,
    pub flags: ConnectionFlags,
}

impl LocalAnchor {
    fn circular(position: Point3<f64>, direction: Vector3<f64>, slot: usize) -> Self {
        Self {
            position,
            direction,
            slot,
            flags: ConnectionFlags::CIRCULAR,
        }
    }

    fn rectangular(position: Point3<f64>, direction: Vector3<f64>, slot: usize) -> Self {
        Self {
            position,
            direction,
            slot,
            flags: ConnectionFlags::RECTANGULAR,
        }
    }
}

pub type LocalAnchors = SmallVec<[LocalAnchor; 6]>;

/// Anchors emitted by a primitive of the given shape, in its local frame.
///
/// Slot indices follow the per-kind convention: 0 is the bottom or start
/// face and 1 the top or end face for round primitives; boxes and pyramids
/// use all six slots.
pub fn local_anchors(kind: &PrimitiveKind) -> LocalAnchors {
    match kind {
        PrimitiveKind::Pyramid(p) => {
            let (bx, by) = (0.5 * p.bottom_x, 0.5 * p.bottom_y);
            let (tx, ty) = (0.5 * p.top_x, 0.5 * p.top_y);
            let (mx, my) = (0.5 * (bx + tx), 0.5 * (by + ty));
            let (ox, oy) = (0.5 * p.offset_x, 0.5 * p.offset_y);
            let h = 0.5 * p.height;

            let normals = [
                Vector3::new(0.0, -h, (-ty + oy) - (-by - oy)),
                Vector3::new(h, 0.0, -((tx + ox) - (bx - ox))),
                Vector3::new(0.0, h, -((ty + oy) - (by - oy))),
                Vector3::new(-h, 0.0, (-tx + ox) - (-bx - ox)),
                Vector3::new(0.0, 0.0, -1.0),
                Vector3::new(0.0, 0.0, 1.0),
            ];
            let positions = [
                Point3::new(0.0, -my, 0.0),
                Point3::new(mx, 0.0, 0.0),
                Point3::new(0.0, my, 0.0),
                Point3::new(-mx, 0.0, 0.0),
                Point3::new(-ox, -oy, -h),
                Point3::new(ox, oy, h),
            ];
            positions
                .into_iter()
                .zip(normals)
                .enumerate()
                .map(|(slot, (p, n))| LocalAnchor::rectangular(p, n, slot))
                .collect()
        }
        PrimitiveKind::Box(b) => {
            let (x, y, z) = (0.5 * b.length_x, 0.5 * b.length_y, 0.5 * b.length_z);
            let faces = [
                (Point3::new(-x, 0.0, 0.0), -Vector3::x()),
                (Point3::new(x, 0.0, 0.0), Vector3::x()),
                (Point3::new(0.0, -y, 0.0), -Vector3::y()),
                (Point3::new(0.0, y, 0.0), Vector3::y()),
                (Point3::new(0.0, 0.0, -z), -Vector3::z()),
                (Point3::new(0.0, 0.0, z), Vector3::z()),
            ];
            faces
                .into_iter()
                .enumerate()
                .map(|(slot, (p, n))| LocalAnchor::rectangular(p, n, slot))
                .collect()
        }
        PrimitiveKind::RectangularTorus(t) => {
            let (s, c) = t.angle.sin_cos();
            let mid = 0.5 * (t.radius_inner + t.radius_outer);
            smallvec![
                LocalAnchor::rectangular(Point3::new(mid, 0.0, 0.0), -Vector3::y(), 0),
                LocalAnchor::rectangular(
                    Point3::new(mid * c, mid * s, 0.0),
                    Vector3::new(-s, c, 0.0),
                    1,
                ),
            ]
        }
        PrimitiveKind::CircularTorus(t) => {
            let (s, c) = t.angle.sin_cos();
            smallvec![
                LocalAnchor::circular(Point3::new(t.offset, 0.0, 0.0), -Vector3::y(), 0),
                LocalAnchor::circular(
                    Point3::new(t.offset * c, t.offset * s, 0.0),
                    Vector3::new(-s, c, 0.0),
                    1,
                ),
            ]
        }
        PrimitiveKind::EllipticalDish(_) | PrimitiveKind::SphericalDish(_) => {
            smallvec![LocalAnchor::circular(Point3::origin(), -Vector3::z(), 0)]
        }
        PrimitiveKind::Snout(sn) => {
            let (sbx, cbx) = sn.bottom_shear_x.sin_cos();
            let (sby, cby) = sn.bottom_shear_y.sin_cos();
            let (stx, ctx) = sn.top_shear_x.sin_cos();
            let (sty, cty) = sn.top_shear_y.sin_cos();
            let half = 0.5 * Vector3::new(sn.offset_x, sn.offset_y, sn.height);
            smallvec![
                LocalAnchor::circular(
                    Point3::from(-half),
                    Vector3::new(sbx * cby, sby, -cbx * cby),
                    0,
                ),
                LocalAnchor::circular(
                    Point3::from(half),
                    Vector3::new(-stx * cty, -sty, ctx * cty),
                    1,
                ),
            ]
        }
        PrimitiveKind::Cylinder(c) => {
            let h = 0.5 * c.height;
            smallvec![
                LocalAnchor::circular(Point3::new(0.0, 0.0, -h), -Vector3::z(), 0),
                LocalAnchor::circular(Point3::new(0.0, 0.0, h), Vector3::z(), 1),
            ]
        }
        PrimitiveKind::Sphere(_) | PrimitiveKind::Line(_) | PrimitiveKind::FacetGroup(_) => {
            SmallVec::new()
        }
    }
}

/// Counters reported by [`resolve_connections`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Anchors emitted over the whole model.
    pub anchors: usize,
    /// Anchors consumed by a connection (two per connection).
    pub matched: usize,
    pub connections: usize,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    primitive: PrimitiveKey,
    position: Point3<f64>,
    direction: Vector3<f64>,
    slot: usize,
    flags: ConnectionFlags,
    matched: bool,
}

struct Resolver<'a> {
    model: &'a SceneModel,
    config: &'a ConnectConfig,
    anchors: Vec<Anchor>,
    found: Vec<Connection>,
    emitted: usize,
}

impl<'a> Resolver<'a> {
    fn new(model: &'a SceneModel, config: &'a ConnectConfig) -> Self {
        Self {
            model,
            config,
            anchors: Vec::new(),
            found: Vec::new(),
            emitted: 0,
        }
    }

    fn visit(&mut self, node_key: NodeKey) -> Result<()> {
        let model = self.model;
        let node = model
            .node(node_key)
            .ok_or(rvm_lite_core::Error::NodeNotFound(node_key))?;
        let offset = self.anchors.len();

        for &child in &node.children {
            self.visit(child)?;
        }

        for &key in &node.primitives {
            let primitive = model.try_primitive(key)?;
            for local in local_anchors(&primitive.kind) {
                self.anchors.push(Anchor {
                    primitive: key,
                    position: transform_point(&primitive.matrix, &local.position),
                    direction: transform_direction(&primitive.matrix, &local.direction),
                    slot: local.slot,
                    flags: local.flags,
                    matched: false,
                });
                self.emitted += 1;
            }
        }

        self.match_from(offset)
    }

    /// Match the anchors at `offset..` against each other and drop the
    /// matched ones.
    fn match_from(&mut self, offset: usize) -> Result<()> {
        if offset > self.anchors.len() {
            return Err(Error::ResolverInvariant(format!(
                "match offset {} past {} anchors",
                offset,
                self.anchors.len()
            )));
        }

        let epsilon = self.config.epsilon;
        let epsilon_sq = self.config.epsilon_squared();
        let threshold = self.config.alignment_threshold;

        let window = &mut self.anchors[offset..];
        window.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

        for j in 0..window.len() {
            if window[j].matched {
                continue;
            }
            let limit = window[j].position.x + epsilon;
            for i in (j + 1)..window.len() {
                if window[i].position.x > limit {
                    break;
                }
                let (aj, ai) = (window[j], window[i]);
                if ai.matched || ai.primitive == aj.primitive {
                    continue;
                }
                let close = (aj.position - ai.position).norm_squared() <= epsilon_sq;
                let aligned = aj.direction.dot(&ai.direction) < threshold;
                if close && aligned {
                    self.found.push(Connection {
                        primitive_a: aj.primitive,
                        primitive_b: ai.primitive,
                        slot_a: aj.slot,
                        slot_b: ai.slot,
                        position: aj.position,
                        direction: aj.direction,
                        flags: aj.flags | ai.flags,
                    });
                    window[j].matched = true;
                    window[i].matched = true;
                    break;
                }
            }
        }

        let mut index = offset;
        self.anchors.retain(|anchor| {
            let keep = index < offset || !anchor.matched;
            index += 1;
            keep
        });

        if offset > self.anchors.len() {
            return Err(Error::ResolverInvariant(
                "matched anchors removed below the current level".into(),
            ));
        }
        Ok(())
    }
}

/// Find every pair of touching primitive faces in `model` and record the
/// connections on both primitives.
///
/// Existing connections are discarded first, so running the resolver twice
/// yields the same connection set.
pub fn resolve_connections(model: &mut SceneModel, config: &ConnectConfig) -> Result<ResolveStats> {
    model.clear_connections();

    let (found, emitted) = {
        let mut resolver = Resolver::new(model, config);
        for &root in model.roots() {
            resolver.visit(root)?;
        }
        if resolver.anchors.iter().any(|a| a.matched) {
            return Err(Error::ResolverInvariant(
                "matched anchors left in working set".into(),
            ));
        }
        (resolver.found, resolver.emitted)
    };

    for connection in found {
        model.insert_connection(connection)?;
    }

    let stats = ResolveStats {
        anchors: emitted,
        matched: 2 * model.connection_count(),
        connections: model.connection_count(),
    };
    tracing::info!(
        matched = stats.matched,
        anchors = stats.anchors,
        connections = stats.connections,
        "Resolved primitive connections"
    );
    Ok(stats)
}
