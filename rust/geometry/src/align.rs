// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Alignment propagator
//!
//! Walks chains of circular connections breadth-first and gives every
//! primitive on a chain a sample start angle, so that neighbouring
//! tessellations start their circumferential samples on a shared meridian.

use std::collections::VecDeque;

use nalgebra::{Matrix4, Vector3};
use rustc_hash::FxHashSet;

use rvm_lite_core::transform::{linear_part, transform_direction};
use rvm_lite_core::{ConnectionKey, Primitive, PrimitiveKey, PrimitiveKind, SceneModel};

use crate::error::{Error, Result};

/// Counters reported by [`propagate_alignment`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignStats {
    /// Connected components of the circular connection graph.
    pub components: usize,
    pub circular_connections: usize,
    pub connections: usize,
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    from: Option<PrimitiveKey>,
    connection: ConnectionKey,
    up_world: Vector3<f64>,
}

/// Arbitrary unit vector perpendicular to `direction`.
///
/// Crosses with whichever of world X or Y is less aligned with `direction`.
pub fn seed_up(direction: &Vector3<f64>) -> Option<Vector3<f64>> {
    let d = direction;
    let helper = if d.x.abs() > d.y.abs() && d.x.abs() > d.z.abs() {
        Vector3::y()
    } else {
        Vector3::x()
    };
    d.cross(&helper).try_normalize(f64::EPSILON)
}

#[inline]
fn finite_or_zero(angle: f64) -> f64 {
    if angle.is_finite() {
        angle
    } else {
        0.0
    }
}

/// Sample start angle of a cylinder, snout or dish whose local frame is
/// `matrix`, and the canonical world up vector it implies.
pub fn round_alignment(
    matrix: &Matrix4<f64>,
    inverse: &Matrix4<f64>,
    up_world: &Vector3<f64>,
) -> (f64, Vector3<f64>) {
    let up = up_world.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
    let mut local = linear_part(inverse) * up;
    local.z = 0.0;

    let angle = finite_or_zero(local.y.atan2(local.x));
    let up_new = transform_direction(matrix, &Vector3::new(angle.cos(), angle.sin(), 0.0));
    (angle, up_new)
}

/// Sample start angle of a circular torus entered through `entry_slot`,
/// and the world up vectors at its start (slot 0) and end (slot 1).
pub fn torus_alignment(
    matrix: &Matrix4<f64>,
    inverse: &Matrix4<f64>,
    sweep: f64,
    entry_slot: usize,
    up_world: &Vector3<f64>,
) -> (f64, [Vector3<f64>; 2]) {
    let (s, c) = sweep.sin_cos();
    let mut local = transform_direction(inverse, up_world);
    if entry_slot == 1 {
        // Rotate back into the start cross-section.
        local = Vector3::new(c * local.x + s * local.y, -s * local.x + c * local.y, local.z);
    }

    let angle = finite_or_zero(local.z.atan2(local.x));
    let (si, ci) = angle.sin_cos();
    let up_start = Vector3::new(ci, 0.0, si);
    let up_end = Vector3::new(
        c * up_start.x - s * up_start.y,
        s * up_start.x + c * up_start.y,
        up_start.z,
    );
    (
        angle,
        [
            transform_direction(matrix, &up_start),
            transform_direction(matrix, &up_end),
        ],
    )
}

/// World up vector implied by a primitive's current sample start angle at
/// connection slot `slot`. `None` for primitives without a circular
/// cross-section.
pub fn sample_up_world(primitive: &Primitive, slot: usize) -> Option<Vector3<f64>> {
    let angle = primitive.sample_start_angle();
    match &primitive.kind {
        PrimitiveKind::Cylinder(_)
        | PrimitiveKind::Snout(_)
        | PrimitiveKind::EllipticalDish(_)
        | PrimitiveKind::SphericalDish(_) => Some(transform_direction(
            &primitive.matrix,
            &Vector3::new(angle.cos(), angle.sin(), 0.0),
        )),
        PrimitiveKind::CircularTorus(t) => {
            let (s, c) = t.angle.sin_cos();
            let up = Vector3::new(angle.cos(), 0.0, angle.sin());
            let up = if slot == 1 {
                Vector3::new(c * up.x - s * up.y, s * up.x + c * up.y, up.z)
            } else {
                up
            };
            Some(transform_direction(&primitive.matrix, &up))
        }
        _ => None,
    }
}

struct Propagator<'a> {
    model: &'a mut SceneModel,
    queue: VecDeque<QueueItem>,
    enqueued: FxHashSet<ConnectionKey>,
}

impl<'a> Propagator<'a> {
    fn enqueue(
        &mut self,
        from: Option<PrimitiveKey>,
        connection: ConnectionKey,
        up_world: Vector3<f64>,
    ) {
        self.enqueued.insert(connection);
        self.queue.push_back(QueueItem {
            from,
            connection,
            up_world,
        });
    }

    /// Enqueue the circular connection in `slot` of `primitive` unless it has
    /// been seen already.
    fn follow(
        &mut self,
        primitive: PrimitiveKey,
        slot: usize,
        up_world: Vector3<f64>,
    ) -> Result<()> {
        let Some(next) = self.model.try_primitive(primitive)?.connection(slot) else {
            return Ok(());
        };
        if self.enqueued.contains(&next) {
            return Ok(());
        }
        let connection = self
            .model
            .connection(next)
            .ok_or(Error::ConnectionNotFound(next))?;
        if !connection.is_rectangular() {
            self.enqueue(Some(primitive), next, up_world);
        }
        Ok(())
    }

    fn process(&mut self, item: QueueItem) -> Result<()> {
        let connection = self
            .model
            .connection(item.connection)
            .ok_or(Error::ConnectionNotFound(item.connection))?;

        for (key, slot) in connection.endpoints() {
            if item.from == Some(key) {
                continue;
            }
            let primitive = self.model.try_primitive(key)?;
            let inverse = primitive.inverse_matrix(key)?;
            let matrix = primitive.matrix;

            match &primitive.kind {
                PrimitiveKind::Cylinder(_)
                | PrimitiveKind::Snout(_)
                | PrimitiveKind::EllipticalDish(_)
                | PrimitiveKind::SphericalDish(_) => {
                    let (angle, up) = round_alignment(&matrix, &inverse, &item.up_world);
                    self.model.set_sample_start_angle(key, angle)?;
                    for next_slot in 0..2 {
                        self.follow(key, next_slot, up)?;
                    }
                }
                PrimitiveKind::CircularTorus(t) => {
                    let (angle, ups) =
                        torus_alignment(&matrix, &inverse, t.angle, slot, &item.up_world);
                    self.model.set_sample_start_angle(key, angle)?;
                    for (next_slot, up) in ups.into_iter().enumerate() {
                        self.follow(key, next_slot, up)?;
                    }
                }
                _ => {
                    return Err(Error::NonCircularInterface {
                        connection: item.connection,
                        primitive: primitive.describe(key),
                        kind: primitive.primitive_type(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Assign sample start angles along every chain of circular connections.
///
/// Primitives outside any circular chain keep a sample start angle of zero.
pub fn propagate_alignment(model: &mut SceneModel) -> Result<AlignStats> {
    model.reset_sample_start_angles();

    let mut stats = AlignStats {
        connections: model.connection_count(),
        ..AlignStats::default()
    };
    let seeds: Vec<(ConnectionKey, Vector3<f64>)> = model
        .connections()
        .filter(|(_, c)| !c.is_rectangular())
        .map(|(key, c)| (key, c.direction))
        .collect();
    stats.circular_connections = seeds.len();

    let mut propagator = Propagator {
        model,
        queue: VecDeque::new(),
        enqueued: FxHashSet::default(),
    };

    for (key, direction) in seeds {
        if propagator.enqueued.contains(&key) {
            continue;
        }
        let up = seed_up(&direction).ok_or(Error::DegenerateDirection(key))?;
        propagator.enqueue(None, key, up);
        while let Some(item) = propagator.queue.pop_front() {
            propagator.process(item)?;
        }
        stats.components += 1;
    }

    tracing::info!(
        components = stats.components,
        circular_connections = stats.circular_connections,
        connections = stats.connections,
        "Propagated sample alignment"
    );
    Ok(stats)
}
