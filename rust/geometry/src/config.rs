// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tuning constants for connection matching and cap visibility.

/// Matching and comparison tolerances.
///
/// The defaults are the empirically chosen values the file format's
/// exporters were tuned against. Change them only to re-tune deliberately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectConfig {
    /// World-space distance under which two anchors (or a connection and a
    /// cap centre) are considered coincident.
    pub epsilon: f64,
    /// Two anchors match only when the dot product of their directions is
    /// below this value.
    pub alignment_threshold: f64,
    /// Extra radius added to the covering side before the `>=` comparison.
    pub cap_margin: f64,
    /// Slack allowed by the precise snout containment test.
    pub precise_tolerance: f64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            epsilon: 5e-5,
            alignment_threshold: -0.98,
            cap_margin: 0.0,
            precise_tolerance: 1e-3,
        }
    }
}

impl ConnectConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            epsilon: env_f64("RVM_CONNECT_EPSILON", defaults.epsilon),
            alignment_threshold: env_f64("RVM_ALIGN_THRESHOLD", defaults.alignment_threshold),
            cap_margin: env_f64("RVM_CAP_MARGIN", defaults.cap_margin),
            precise_tolerance: env_f64("RVM_CAP_PRECISE_TOLERANCE", defaults.precise_tolerance),
        }
    }

    #[inline]
    pub(crate) fn epsilon_squared(&self) -> f64 {
        self.epsilon * self.epsilon
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}
