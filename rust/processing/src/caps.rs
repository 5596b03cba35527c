// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cap evaluation over a whole model.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use rvm_lite_core::transform::transform_point;
use rvm_lite_core::{Primitive, PrimitiveKey, PrimitiveKind, SceneModel};
use rvm_lite_geometry::{cap_visibility, local_anchors, CapStats};

use crate::config::PipelineConfig;
use crate::error::Result;

/// Whether each of a primitive's two caps must be tessellated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapVisibility {
    pub show_a: bool,
    pub show_b: bool,
}

/// Cap decisions for every primitive that has caps.
pub type CapTable = FxHashMap<PrimitiveKey, CapVisibility>;

/// World-space centres of a primitive's two caps.
///
/// Cylinders and snouts close at their bottom and top faces, a partial torus
/// at its start and end faces, and a dish at its base and apex. Other kinds,
/// and a torus that closes on itself, have no caps.
pub fn cap_centers(primitive: &Primitive) -> Option<(Point3<f64>, Point3<f64>)> {
    let (a, b) = match &primitive.kind {
        PrimitiveKind::Cylinder(_) | PrimitiveKind::Snout(_) => end_anchors(&primitive.kind)?,
        PrimitiveKind::CircularTorus(t) if !t.is_full_turn() => end_anchors(&primitive.kind)?,
        PrimitiveKind::EllipticalDish(d) | PrimitiveKind::SphericalDish(d) => {
            (Point3::origin(), Point3::new(0.0, 0.0, d.height))
        }
        _ => return None,
    };
    Some((
        transform_point(&primitive.matrix, &a),
        transform_point(&primitive.matrix, &b),
    ))
}

/// Local positions of the slot 0 and slot 1 anchors.
fn end_anchors(kind: &PrimitiveKind) -> Option<(Point3<f64>, Point3<f64>)> {
    let anchors = local_anchors(kind);
    let start = anchors.iter().find(|a| a.slot == 0)?;
    let end = anchors.iter().find(|a| a.slot == 1)?;
    Some((start.position, end.position))
}

type CapJob = (PrimitiveKey, Point3<f64>, Point3<f64>);

/// Decide cap visibility for every primitive with caps.
///
/// Runs on the rayon pool when `config.parallel_caps` is set, sequentially
/// otherwise and always on wasm. Counters accumulate into `stats`.
pub fn evaluate_caps(
    model: &SceneModel,
    config: &PipelineConfig,
    stats: &CapStats,
) -> Result<CapTable> {
    #[cfg(not(target_arch = "wasm32"))]
    use rayon::prelude::*;

    let jobs: Vec<CapJob> = model
        .primitives()
        .filter_map(|(key, primitive)| cap_centers(primitive).map(|(a, b)| (key, a, b)))
        .collect();

    let evaluate = |&(key, a, b): &CapJob| -> Result<(PrimitiveKey, CapVisibility)> {
        let (show_a, show_b) = cap_visibility(model, key, &a, &b, &config.connect, stats)?;
        Ok((key, CapVisibility { show_a, show_b }))
    };

    #[cfg(not(target_arch = "wasm32"))]
    let decided: Vec<(PrimitiveKey, CapVisibility)> = if config.parallel_caps {
        jobs.par_iter().map(evaluate).collect::<Result<_>>()?
    } else {
        jobs.iter().map(evaluate).collect::<Result<_>>()?
    };

    #[cfg(target_arch = "wasm32")]
    let decided: Vec<(PrimitiveKey, CapVisibility)> =
        jobs.iter().map(evaluate).collect::<Result<_>>()?;

    Ok(decided.into_iter().collect())
}
