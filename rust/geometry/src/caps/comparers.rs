// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairwise radius comparisons between connected primitives.

use nalgebra::Vector3;

use rvm_lite_core::{Primitive, PrimitiveKey, PrimitiveKind, PrimitiveType};

use crate::error::Result;
use crate::snout::{cap_ellipse, SnoutCap};

/// One side of a connection as seen by the cap resolver.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CapData<'a> {
    pub key: PrimitiveKey,
    pub primitive: &'a Primitive,
    /// Slot the connection occupies on this primitive.
    pub slot: usize,
}

impl<'a> CapData<'a> {
    #[inline]
    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive.primitive_type()
    }

    /// Scale of the primitive's transform. Decomposition failure is fatal.
    pub fn scale(&self) -> Result<Vector3<f64>> {
        Ok(self.primitive.decompose(self.key)?.scale)
    }
}

/// Relative slack under which two radii count as equal.
const TIE_TOLERANCE: f64 = 1e-9;

/// Whether a `covering` radius widened by `margin` reaches `own`. Equal radii
/// cover, including radii that differ only by rounding in the transform scale.
pub(crate) fn covers(covering: f64, own: f64, margin: f64) -> bool {
    covering + margin >= own - TIE_TOLERANCE * own.abs().max(1.0)
}

/// Which side of the comparison a radius is taken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// The primitive whose cap is being decided.
    Own,
    /// The neighbour that might close the opening.
    Covering,
}

/// Scaled radius of a round primitive at the connected face.
///
/// A snout cap is an ellipse: its own extent is the semi-major axis, while
/// it is only guaranteed to cover up to its semi-minor axis. `None` for
/// primitives without a round face.
pub(crate) fn interface_radius(cap: &CapData<'_>, role: Role) -> Result<Option<f64>> {
    let radius = match &cap.primitive.kind {
        PrimitiveKind::Cylinder(c) => c.radius,
        PrimitiveKind::CircularTorus(t) => t.radius,
        PrimitiveKind::EllipticalDish(d) | PrimitiveKind::SphericalDish(d) => d.base_radius,
        PrimitiveKind::Snout(s) => {
            let ellipse = cap_ellipse(s, SnoutCap::from_slot(cap.slot)).polar;
            match role {
                Role::Own => ellipse.semi_major_axis,
                Role::Covering => ellipse.semi_minor_axis,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(radius * cap.scale()?.x))
}

/// Whether `other` closes the round opening of `this`: the covering radius
/// plus `margin` reaches at least the own radius.
pub(crate) fn round_cap_hidden(
    this: &CapData<'_>,
    other: &CapData<'_>,
    margin: f64,
) -> Result<bool> {
    let Some(own) = interface_radius(this, Role::Own)? else {
        return Ok(false);
    };
    let Some(covering) = interface_radius(other, Role::Covering)? else {
        return Ok(false);
    };
    Ok(covers(covering, own, margin))
}

/// Box against a round primitive. A box has no caps of its own; the round
/// cap is hidden when it fits inside every box half-length.
pub(crate) fn box_cap_hidden(this: &CapData<'_>, other: &CapData<'_>) -> Result<bool> {
    let PrimitiveKind::Box(b) = &other.primitive.kind else {
        return Ok(false);
    };
    let Some(radius) = interface_radius(this, Role::Own)? else {
        return Ok(false);
    };
    let scale = other.scale()?;
    let half = Vector3::new(
        0.5 * b.length_x * scale.x,
        0.5 * b.length_y * scale.y,
        0.5 * b.length_z * scale.z,
    );
    Ok(radius < half.x && radius < half.y && radius < half.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_cover() {
        assert!(covers(0.5, 0.5, 0.0));
        assert!(covers(0.5 * 0.9999999999999999, 0.5, 0.0));
        assert!(!covers(0.4, 0.5, 0.0));
        assert!(covers(0.4, 0.5, 0.1));
        assert!(covers(0.0, 0.0, 0.0));
    }

    #[test]
    fn tie_slack_is_one_part_in_a_billion() {
        // Absolute below one unit.
        assert!(covers(0.5 - 5e-10, 0.5, 0.0));
        assert!(!covers(0.5 - 2e-9, 0.5, 0.0));
        // Relative above it.
        assert!(covers(1000.0 - 5e-7, 1000.0, 0.0));
        assert!(!covers(1000.0 - 2e-6, 1000.0, 0.0));
    }
}
