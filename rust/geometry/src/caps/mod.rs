// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cap visibility resolver
//!
//! Decides, for a primitive with two named caps, whether each cap must be
//! rendered or is already closed by the primitive it connects to there.

mod comparers;
mod snout_snout;
mod stats;

pub use snout_snout::cap_inside_other;
pub use stats::{CapStats, CapStatsSnapshot};

use nalgebra::Point3;

use rvm_lite_core::{PrimitiveKey, PrimitiveType, SceneModel};

use crate::config::ConnectConfig;
use crate::error::{Error, Result};
use comparers::{box_cap_hidden, round_cap_hidden, CapData};
use snout_snout::snout_snout_hidden;

/// Order a type pair by name so each unordered pair has one table entry.
fn canonical_pair(a: PrimitiveType, b: PrimitiveType) -> (PrimitiveType, PrimitiveType) {
    if a.as_str() <= b.as_str() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Whether the cap of `this` at the connection is closed by `other`.
fn cap_hidden(
    this: &CapData<'_>,
    other: &CapData<'_>,
    config: &ConnectConfig,
    stats: &CapStats,
) -> Result<bool> {
    use PrimitiveType as T;

    match canonical_pair(this.primitive_type(), other.primitive_type()) {
        (T::Box, T::Cylinder) | (T::Box, T::Snout) => box_cap_hidden(this, other),
        (T::Snout, T::Snout) => snout_snout_hidden(this, other, config, stats),
        (T::Cylinder, T::Cylinder)
        | (T::CircularTorus, T::CircularTorus)
        | (T::CircularTorus, T::Cylinder)
        | (T::CircularTorus, T::Snout)
        | (T::Cylinder, T::SphericalDish)
        | (T::Cylinder, T::EllipticalDish)
        | (T::Cylinder, T::Snout)
        | (T::EllipticalDish, T::Snout)
        | (T::Snout, T::SphericalDish) => round_cap_hidden(this, other, config.cap_margin),
        _ => Ok(false),
    }
}

/// Decide whether the two caps of `key`, centred at the world points
/// `cap_center_a` and `cap_center_b`, should be rendered.
///
/// Both caps start visible. A connection whose position lies within the
/// matching epsilon of a cap centre may hide that cap.
pub fn cap_visibility(
    model: &SceneModel,
    key: PrimitiveKey,
    cap_center_a: &Point3<f64>,
    cap_center_b: &Point3<f64>,
    config: &ConnectConfig,
    stats: &CapStats,
) -> Result<(bool, bool)> {
    let primitive = model.try_primitive(key)?;
    let mut show_a = true;
    let mut show_b = true;

    if !primitive.has_connections() {
        stats.record_unconnected();
    }

    for connection_key in primitive.connections().iter().flatten() {
        let connection = model
            .connection(*connection_key)
            .ok_or(Error::ConnectionNotFound(*connection_key))?;

        let at_a = (connection.position - cap_center_a).norm() <= config.epsilon;
        let at_b = (connection.position - cap_center_b).norm() <= config.epsilon;
        if !at_a && !at_b {
            continue;
        }

        let (Some(slot), Some(other_key)) = (connection.slot_of(key), connection.other(key)) else {
            continue;
        };
        let this = CapData {
            key,
            primitive,
            slot,
        };
        let other = CapData {
            key: other_key,
            primitive: model.try_primitive(other_key)?,
            slot: connection.slot_of(other_key).unwrap_or_default(),
        };

        if cap_hidden(&this, &other, config, stats)? {
            show_a &= !at_a;
            show_b &= !at_b;
        }
    }

    stats.record_caps(show_a, show_b);
    Ok((show_a, show_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_ordered_by_name() {
        assert_eq!(
            canonical_pair(PrimitiveType::Snout, PrimitiveType::Cylinder),
            (PrimitiveType::Cylinder, PrimitiveType::Snout)
        );
        assert_eq!(
            canonical_pair(PrimitiveType::SphericalDish, PrimitiveType::Snout),
            (PrimitiveType::Snout, PrimitiveType::SphericalDish)
        );
        assert_eq!(
            canonical_pair(PrimitiveType::Cylinder, PrimitiveType::CircularTorus),
            (PrimitiveType::CircularTorus, PrimitiveType::Cylinder)
        );
    }
}
