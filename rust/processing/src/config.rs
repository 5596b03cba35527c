// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables.

use rvm_lite_geometry::ConnectConfig;

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Matching and cap comparison tolerances.
    pub connect: ConnectConfig,
    /// Evaluate caps on the rayon pool. Ignored on wasm.
    pub parallel_caps: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            connect: ConnectConfig::default(),
            parallel_caps: true,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            connect: ConnectConfig::from_env(),
            parallel_caps: std::env::var("RVM_PARALLEL_CAPS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }
}

/// Anything but an explicit "off" value enables the flag.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
