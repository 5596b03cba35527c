// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RVM-Lite Processing
//!
//! Prepares a loaded [`SceneModel`](rvm_lite_core::SceneModel) for
//! tessellation: finds the connections between primitive faces, aligns the
//! circumferential sampling along circular chains and decides which caps
//! need to be closed.
//!
//! ```rust,ignore
//! use rvm_lite_processing::{prepare, PipelineConfig};
//!
//! let report = prepare(&mut model, &PipelineConfig::from_env())?;
//! println!("{}", report.to_json()?);
//! ```

pub mod caps;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use caps::{cap_centers, evaluate_caps, CapTable, CapVisibility};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::prepare;
pub use report::{CapCounters, PrepareReport, Timings, WorldBounds};
