// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric solid primitives.
//!
//! The primitive set is closed by the file format, so it is modelled as a
//! tagged enum ([`PrimitiveKind`]) with exhaustive matching at every dispatch
//! site. Every primitive carries a local-to-world transform, a local bounding
//! box, six optional connection slots and the sample start angle written by
//! the alignment stage.

use nalgebra::{Matrix4, Point3};
use std::f64::consts::TAU;

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use crate::keys::{ConnectionKey, NodeKey, PrimitiveKey};
use crate::transform::{self, Decomposed};

/// Number of connection slots every primitive owns.
pub const MAX_CONNECTIONS: usize = 6;

/// Box with full edge lengths along the local axes, centred at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxParams {
    pub length_x: f64,
    pub length_y: f64,
    pub length_z: f64,
}

/// Cylinder along local Z, centred at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderParams {
    pub radius: f64,
    pub height: f64,
}

/// Truncated (possibly eccentric, possibly sheared) cone along local Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnoutParams {
    pub radius_bottom: f64,
    pub radius_top: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub bottom_shear_x: f64,
    pub bottom_shear_y: f64,
    pub top_shear_x: f64,
    pub top_shear_y: f64,
}

impl SnoutParams {
    /// Plain snout without offset or shear.
    pub fn new(radius_bottom: f64, radius_top: f64, height: f64) -> Self {
        Self {
            radius_bottom,
            radius_top,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
            bottom_shear_x: 0.0,
            bottom_shear_y: 0.0,
            top_shear_x: 0.0,
            top_shear_y: 0.0,
        }
    }

    /// Whether either cap plane is tilted.
    pub fn has_shear(&self) -> bool {
        self.bottom_shear_x != 0.0
            || self.bottom_shear_y != 0.0
            || self.top_shear_x != 0.0
            || self.top_shear_y != 0.0
    }

    /// Whether the top centre is offset from the bottom centre.
    pub fn is_eccentric(&self) -> bool {
        self.offset_x != 0.0 || self.offset_y != 0.0
    }

    /// Whether both radii are close enough to treat the snout as a cylinder.
    pub fn is_capped_cylinder(&self) -> bool {
        (self.radius_bottom - self.radius_top).abs() < 0.01
    }
}

/// Torus segment with circular cross-section, swept `angle` radians around
/// local Z starting at the +X axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularTorusParams {
    /// Distance from the torus axis to the tube centre.
    pub offset: f64,
    /// Tube radius.
    pub radius: f64,
    /// Sweep angle in radians.
    pub angle: f64,
}

impl CircularTorusParams {
    /// A torus swept a full turn has no open ends.
    pub fn is_full_turn(&self) -> bool {
        self.angle >= TAU - 1e-6
    }
}

/// Torus segment with rectangular cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangularTorusParams {
    pub radius_inner: f64,
    pub radius_outer: f64,
    pub height: f64,
    pub angle: f64,
}

/// Dish whose base circle sits at the local origin, bulging towards +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DishParams {
    pub base_radius: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    pub diameter: f64,
}

/// Frustum of a rectangular pyramid along local Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyramidParams {
    pub bottom_x: f64,
    pub bottom_y: f64,
    pub top_x: f64,
    pub top_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineParams {
    pub thickness: f64,
    pub length: f64,
}

/// One polygon of a facet group: an outer contour followed by holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FacetPolygon {
    pub contours: Vec<Vec<Point3<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FacetGroupParams {
    pub polygons: Vec<FacetPolygon>,
}

/// Shape parameters of a primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    Box(BoxParams),
    Cylinder(CylinderParams),
    Snout(SnoutParams),
    CircularTorus(CircularTorusParams),
    RectangularTorus(RectangularTorusParams),
    EllipticalDish(DishParams),
    SphericalDish(DishParams),
    Sphere(SphereParams),
    Pyramid(PyramidParams),
    Line(LineParams),
    FacetGroup(FacetGroupParams),
}

impl PrimitiveKind {
    /// Returns the discriminant of this kind.
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            PrimitiveKind::Box(_) => PrimitiveType::Box,
            PrimitiveKind::Cylinder(_) => PrimitiveType::Cylinder,
            PrimitiveKind::Snout(_) => PrimitiveType::Snout,
            PrimitiveKind::CircularTorus(_) => PrimitiveType::CircularTorus,
            PrimitiveKind::RectangularTorus(_) => PrimitiveType::RectangularTorus,
            PrimitiveKind::EllipticalDish(_) => PrimitiveType::EllipticalDish,
            PrimitiveKind::SphericalDish(_) => PrimitiveType::SphericalDish,
            PrimitiveKind::Sphere(_) => PrimitiveType::Sphere,
            PrimitiveKind::Pyramid(_) => PrimitiveType::Pyramid,
            PrimitiveKind::Line(_) => PrimitiveType::Line,
            PrimitiveKind::FacetGroup(_) => PrimitiveType::FacetGroup,
        }
    }

    /// Axis-aligned bounds of the shape in its own local frame.
    pub fn local_bounds(&self) -> BoundingBox {
        match self {
            PrimitiveKind::Box(b) => BoundingBox::centered(b.length_x, b.length_y, b.length_z),
            PrimitiveKind::Cylinder(c) => {
                BoundingBox::centered(2.0 * c.radius, 2.0 * c.radius, c.height)
            }
            PrimitiveKind::Snout(s) => {
                let r = s.radius_bottom.max(s.radius_top);
                let half = 0.5 * s.height;
                let ox = 0.5 * s.offset_x.abs();
                let oy = 0.5 * s.offset_y.abs();
                // Sheared caps may lean past the nominal height by up to r.
                BoundingBox::new(
                    Point3::new(-r - ox, -r - oy, -half - r),
                    Point3::new(r + ox, r + oy, half + r),
                )
            }
            PrimitiveKind::CircularTorus(t) => {
                let outer = t.offset + t.radius;
                BoundingBox::new(
                    Point3::new(-outer, -outer, -t.radius),
                    Point3::new(outer, outer, t.radius),
                )
            }
            PrimitiveKind::RectangularTorus(t) => {
                let half = 0.5 * t.height;
                BoundingBox::new(
                    Point3::new(-t.radius_outer, -t.radius_outer, -half),
                    Point3::new(t.radius_outer, t.radius_outer, half),
                )
            }
            PrimitiveKind::EllipticalDish(d) | PrimitiveKind::SphericalDish(d) => {
                BoundingBox::new(
                    Point3::new(-d.base_radius, -d.base_radius, 0.0),
                    Point3::new(d.base_radius, d.base_radius, d.height),
                )
            }
            PrimitiveKind::Sphere(s) => BoundingBox::centered(s.diameter, s.diameter, s.diameter),
            PrimitiveKind::Pyramid(p) => {
                let hx = 0.5 * (p.bottom_x.max(p.top_x) + p.offset_x.abs());
                let hy = 0.5 * (p.bottom_y.max(p.top_y) + p.offset_y.abs());
                BoundingBox::centered(2.0 * hx, 2.0 * hy, p.height)
            }
            PrimitiveKind::Line(l) => BoundingBox::centered(l.length, l.thickness, l.thickness),
            PrimitiveKind::FacetGroup(f) => {
                let points = f.polygons.iter().flat_map(|p| p.contours.iter().flatten());
                BoundingBox::from_points(points).unwrap_or_default()
            }
        }
    }
}

/// Field-less discriminant of [`PrimitiveKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Box,
    Cylinder,
    Snout,
    CircularTorus,
    RectangularTorus,
    EllipticalDish,
    SphericalDish,
    Sphere,
    Pyramid,
    Line,
    FacetGroup,
}

impl PrimitiveType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Box => "Box",
            PrimitiveType::Cylinder => "Cylinder",
            PrimitiveType::Snout => "Snout",
            PrimitiveType::CircularTorus => "CircularTorus",
            PrimitiveType::RectangularTorus => "RectangularTorus",
            PrimitiveType::EllipticalDish => "EllipticalDish",
            PrimitiveType::SphericalDish => "SphericalDish",
            PrimitiveType::Sphere => "Sphere",
            PrimitiveType::Pyramid => "Pyramid",
            PrimitiveType::Line => "Line",
            PrimitiveType::FacetGroup => "FacetGroup",
        }
    }

    /// Whether primitives of this type can expose a circular interface.
    pub fn has_circular_interface(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Cylinder
                | PrimitiveType::Snout
                | PrimitiveType::CircularTorus
                | PrimitiveType::EllipticalDish
                | PrimitiveType::SphericalDish
        )
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive instance in the scene.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    /// Local-to-world transform.
    pub matrix: Matrix4<f64>,
    /// Bounds in the primitive's local frame.
    pub bounds_local: BoundingBox,
    pub(crate) node: NodeKey,
    pub(crate) connections: [Option<ConnectionKey>; MAX_CONNECTIONS],
    pub(crate) sample_start_angle: f64,
}

impl Primitive {
    pub(crate) fn new(node: NodeKey, kind: PrimitiveKind, matrix: Matrix4<f64>) -> Self {
        let bounds_local = kind.local_bounds();
        Self {
            kind,
            matrix,
            bounds_local,
            node,
            connections: [None; MAX_CONNECTIONS],
            sample_start_angle: 0.0,
        }
    }

    #[inline]
    pub fn primitive_type(&self) -> PrimitiveType {
        self.kind.primitive_type()
    }

    /// The node owning this primitive.
    #[inline]
    pub fn node(&self) -> NodeKey {
        self.node
    }

    /// The connection slots, indexed by the per-kind slot convention.
    #[inline]
    pub fn connections(&self) -> &[Option<ConnectionKey>; MAX_CONNECTIONS] {
        &self.connections
    }

    /// Connection stored in `slot`, if any.
    #[inline]
    pub fn connection(&self, slot: usize) -> Option<ConnectionKey> {
        self.connections.get(slot).copied().flatten()
    }

    #[inline]
    pub fn has_connections(&self) -> bool {
        self.connections.iter().any(Option::is_some)
    }

    /// Angle at which tessellation should start sampling the circular
    /// cross-section. Zero unless the alignment stage reached this primitive.
    #[inline]
    pub fn sample_start_angle(&self) -> f64 {
        self.sample_start_angle
    }

    /// Decompose the transform, failing loudly when it is degenerate.
    pub fn decompose(&self, key: PrimitiveKey) -> Result<Decomposed> {
        transform::decompose(&self.matrix).ok_or_else(|| Error::Decomposition {
            primitive: self.describe(key),
            matrix: transform::format_matrix(&self.matrix),
        })
    }

    /// Inverse of the transform, failing loudly when it is singular.
    pub fn inverse_matrix(&self, key: PrimitiveKey) -> Result<Matrix4<f64>> {
        self.matrix.try_inverse().ok_or_else(|| Error::NotInvertible {
            primitive: self.describe(key),
            matrix: transform::format_matrix(&self.matrix),
        })
    }

    /// World-space axis-aligned bounds of the transformed local box.
    pub fn world_bounds(&self) -> BoundingBox {
        self.bounds_local.transformed(&self.matrix)
    }

    /// Human-readable identification used in error messages.
    pub fn describe(&self, key: PrimitiveKey) -> String {
        format!("{} {:?}", self.primitive_type(), key)
    }
}
