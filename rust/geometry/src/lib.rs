//! RVM-Lite Geometry
//!
//! Connection resolution between primitive faces, sample alignment along
//! circular chains, and cap visibility decisions. Conic algebra for sheared
//! snout caps lives in [`ellipse`] and [`snout`].

pub mod align;
pub mod caps;
pub mod config;
pub mod connect;
pub mod ellipse;
pub mod error;
pub mod snout;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use align::{propagate_alignment, sample_up_world, seed_up, AlignStats};
pub use caps::{cap_inside_other, cap_visibility, CapStats, CapStatsSnapshot};
pub use config::ConnectConfig;
pub use connect::{local_anchors, resolve_connections, LocalAnchor, LocalAnchors, ResolveStats};
pub use ellipse::{
    implicit_from_projected_circle, polar_from_implicit, Ellipse3D, ImplicitEllipse, PolarEllipse,
};
pub use error::{Error, Result};
pub use snout::{cap_ellipse, SnoutCap};
