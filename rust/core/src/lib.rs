// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RVM-Lite Core
//!
//! Primitive scene model for plant models decoded from RVM files.
//!
//! ## Overview
//!
//! - **Primitives**: a closed [`PrimitiveKind`] enum (boxes, cylinders,
//!   snouts, tori, dishes, pyramids, facet groups) with a local-to-world
//!   transform and six connection slots each
//! - **Scene tree**: nodes, primitives and connections stored in
//!   [slotmap](https://docs.rs/slotmap) arenas inside [`SceneModel`]
//! - **Connections**: shared by both endpoints through a [`ConnectionKey`]
//! - **Transforms**: decomposition helpers over [nalgebra](https://docs.rs/nalgebra)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rvm_lite_core::{CylinderParams, PrimitiveKind, SceneModel};
//! use nalgebra::Matrix4;
//!
//! let mut model = SceneModel::new();
//! let root = model.add_root("PIPE-100");
//! let cyl = model.add_primitive(
//!     root,
//!     PrimitiveKind::Cylinder(CylinderParams { radius: 0.5, height: 1.0 }),
//!     Matrix4::identity(),
//! )?;
//! ```

pub mod bounds;
pub mod connection;
pub mod error;
pub mod keys;
pub mod model;
pub mod primitive;
pub mod transform;

pub use bounds::BoundingBox;
pub use connection::{Connection, ConnectionFlags};
pub use error::{Error, Result};
pub use keys::{ConnectionKey, NodeKey, PrimitiveKey};
pub use model::{Node, SceneModel};
pub use primitive::{
    BoxParams, CircularTorusParams, CylinderParams, DishParams, FacetGroupParams, FacetPolygon,
    LineParams, Primitive, PrimitiveKind, PrimitiveType, PyramidParams, RectangularTorusParams,
    SnoutParams, SphereParams, MAX_CONNECTIONS,
};
pub use transform::Decomposed;
