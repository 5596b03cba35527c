// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Summary of a pipeline run.

use serde::Serialize;

use rvm_lite_core::BoundingBox;
use rvm_lite_geometry::CapStatsSnapshot;

use crate::caps::CapTable;
use crate::error::Result;

/// Outcome of [`prepare`](crate::prepare).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrepareReport {
    /// Number of primitives in the model.
    pub primitives: usize,
    /// Anchors emitted by the connection resolver.
    pub anchors: usize,
    /// Anchors paired into connections.
    pub matched_anchors: usize,
    pub connections: usize,
    pub circular_connections: usize,
    /// Connected components of the circular connection graph.
    pub components: usize,
    pub caps: CapCounters,
    /// World-space bounds, absent for an empty model.
    pub bounds: Option<WorldBounds>,
    pub timings: Timings,
    /// Per-primitive cap decisions.
    #[serde(skip)]
    pub visibility: CapTable,
}

impl PrepareReport {
    /// Pretty-printed JSON, without the per-primitive table.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Cap counters gathered during evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapCounters {
    pub tested: usize,
    pub hidden: usize,
    pub shown: usize,
    pub without_connections: usize,
    pub precise_agreements: usize,
    pub precise_disagreements: usize,
    pub precise_undetermined: usize,
}

impl From<CapStatsSnapshot> for CapCounters {
    fn from(snap: CapStatsSnapshot) -> Self {
        Self {
            tested: snap.caps_tested,
            hidden: snap.caps_hidden,
            shown: snap.caps_shown,
            without_connections: snap.caps_without_connections,
            precise_agreements: snap.precise_agreements,
            precise_disagreements: snap.precise_disagreements,
            precise_undetermined: snap.precise_undetermined,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WorldBounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl From<BoundingBox> for WorldBounds {
    fn from(bounds: BoundingBox) -> Self {
        Self {
            min: [bounds.min.x, bounds.min.y, bounds.min.z],
            max: [bounds.max.x, bounds.max.y, bounds.max.z],
        }
    }
}

/// Stage durations (ms).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timings {
    pub resolve_time_ms: u64,
    pub align_time_ms: u64,
    pub caps_time_ms: u64,
    pub total_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_omits_the_cap_table() {
        let report = PrepareReport {
            primitives: 3,
            connections: 2,
            ..PrepareReport::default()
        };
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["primitives"], 3);
        assert_eq!(json["connections"], 2);
        assert!(json["bounds"].is_null());
        assert!(json.get("visibility").is_none());
        assert_eq!(json["caps"]["hidden"], 0);
    }
}
