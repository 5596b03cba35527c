// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model preparation: resolve connections, align sampling, decide caps.

use rvm_lite_core::SceneModel;
use rvm_lite_geometry::{propagate_alignment, resolve_connections, CapStats};

use crate::caps::evaluate_caps;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::report::{PrepareReport, Timings};

/// Wall-clock stage timer. Reads zero on wasm, where `Instant` is unavailable.
struct Timer {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

impl Timer {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed().as_millis() as u64
        }
        #[cfg(target_arch = "wasm32")]
        {
            0
        }
    }
}

/// Run every preparation stage over a loaded model.
///
/// Connections and sample start angles are written into `model`; cap
/// decisions are returned in the report.
pub fn prepare(model: &mut SceneModel, config: &PipelineConfig) -> Result<PrepareReport> {
    let total = Timer::start();
    tracing::info!(
        nodes = model.node_count(),
        primitives = model.primitive_count(),
        "Starting model preparation"
    );

    let timer = Timer::start();
    let resolved = resolve_connections(model, &config.connect)?;
    let resolve_time_ms = timer.elapsed_ms();
    tracing::info!(
        matched = resolved.matched,
        anchors = resolved.anchors,
        elapsed_ms = resolve_time_ms,
        "Connection resolution complete"
    );

    let timer = Timer::start();
    let aligned = propagate_alignment(model)?;
    let align_time_ms = timer.elapsed_ms();
    tracing::info!(
        components = aligned.components,
        circular_connections = aligned.circular_connections,
        elapsed_ms = align_time_ms,
        "Alignment complete"
    );

    let timer = Timer::start();
    let stats = CapStats::new();
    let visibility = evaluate_caps(model, config, &stats)?;
    let caps_time_ms = timer.elapsed_ms();
    let caps = stats.snapshot();
    tracing::debug!(
        agreements = caps.precise_agreements,
        disagreements = caps.precise_disagreements,
        undetermined = caps.precise_undetermined,
        "Snout cap containment check"
    );
    tracing::info!(
        primitives = visibility.len(),
        hidden = caps.caps_hidden,
        shown = caps.caps_shown,
        parallel = config.parallel_caps,
        elapsed_ms = caps_time_ms,
        "Cap visibility complete"
    );

    let report = PrepareReport {
        primitives: model.primitive_count(),
        anchors: resolved.anchors,
        matched_anchors: resolved.matched,
        connections: resolved.connections,
        circular_connections: aligned.circular_connections,
        components: aligned.components,
        caps: caps.into(),
        bounds: model.bounds().map(Into::into),
        timings: Timings {
            resolve_time_ms,
            align_time_ms,
            caps_time_ms,
            total_time_ms: total.elapsed_ms(),
        },
        visibility,
    };
    tracing::info!(total_time_ms = report.timings.total_time_ms, "Model preparation complete");
    Ok(report)
}
