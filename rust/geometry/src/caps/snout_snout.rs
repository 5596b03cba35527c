// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snout against snout.
//!
//! The returned decision comes from the radius comparison. The ellipse
//! containment test runs alongside it and only feeds [`CapStats`].

use nalgebra::{Matrix4, Point3};

use rvm_lite_core::transform::transform_point;
use rvm_lite_core::{PrimitiveKind, SnoutParams};

use crate::caps::comparers::{covers, CapData};
use crate::caps::stats::CapStats;
use crate::config::ConnectConfig;
use crate::ellipse::Ellipse3D;
use crate::error::Result;
use crate::snout::{cap_ellipse, SnoutCap};

/// Radii under which a snout counts as collapsed to its axis.
const COLLAPSED_RADIUS: f64 = 1e-5;

fn is_collapsed(snout: &SnoutParams) -> bool {
    snout.radius_bottom < COLLAPSED_RADIUS && snout.radius_top < COLLAPSED_RADIUS
}

pub(crate) fn snout_snout_hidden(
    this: &CapData<'_>,
    other: &CapData<'_>,
    config: &ConnectConfig,
    stats: &CapStats,
) -> Result<bool> {
    let (PrimitiveKind::Snout(this_snout), PrimitiveKind::Snout(other_snout)) =
        (&this.primitive.kind, &other.primitive.kind)
    else {
        return Ok(false);
    };

    // Any snout covers one without radius, and one without radius covers
    // nothing.
    if is_collapsed(this_snout) {
        return Ok(true);
    }
    if is_collapsed(other_snout) {
        return Ok(false);
    }

    let this_ellipse = cap_ellipse(this_snout, SnoutCap::from_slot(this.slot));
    let other_ellipse = cap_ellipse(other_snout, SnoutCap::from_slot(other.slot));

    let own = this_ellipse.polar.semi_major_axis * this.scale()?.x;
    let covering = other_ellipse.polar.semi_minor_axis * other.scale()?.x;
    let fast = covers(covering, own, config.cap_margin);

    let other_inverse = other.primitive.inverse_matrix(other.key)?;
    let precise = cap_inside_other(
        &this_ellipse,
        &this.primitive.matrix,
        &other_ellipse,
        &other_inverse,
        config.precise_tolerance,
    );
    stats.record_precise(precise, fast);
    if precise.is_some_and(|p| p != fast) {
        tracing::debug!(
            this = ?this.key,
            other = ?other.key,
            fast,
            "Snout cap containment disagrees with radius comparison"
        );
    }

    Ok(fast)
}

/// Whether the four extremities of `this` cap ellipse fall inside `other`
/// cap ellipse once carried into the other cap's plane.
///
/// `None` when either ellipse is the zero sentinel.
pub fn cap_inside_other(
    this: &Ellipse3D,
    this_to_world: &Matrix4<f64>,
    other: &Ellipse3D,
    world_to_other: &Matrix4<f64>,
    tolerance: f64,
) -> Option<bool> {
    if this.is_zero() || other.is_zero() {
        return None;
    }

    let chain = other.model_to_plane * world_to_other * this_to_world * this.plane_to_model;

    let e = &this.polar;
    let (s, c) = e.theta.sin_cos();
    let (a, b) = (e.semi_major_axis, e.semi_minor_axis);
    let extremities = [
        (e.x0 + c * a, e.y0 + s * a),
        (e.x0 - c * a, e.y0 - s * a),
        (e.x0 - s * b, e.y0 + c * b),
        (e.x0 + s * b, e.y0 - c * b),
    ];

    Some(extremities.iter().all(|&(x, y)| {
        let p = transform_point(&chain, &Point3::new(x, y, 0.0));
        other.polar.contains_point(p.x, p.y, tolerance)
    }))
}
