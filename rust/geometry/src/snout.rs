// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snout cap ellipses
//!
//! A snout is a truncated cone whose two caps may be sheared and whose top
//! may be offset from its bottom. Each cap is the intersection of the
//! (possibly infinite-apex) cone with a plane, so it is an ellipse. The
//! functions here build that ellipse in the cap plane together with the
//! rigid transforms between the plane and the snout's local frame.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use rvm_lite_core::SnoutParams;

use crate::ellipse::{
    implicit_from_projected_circle, polar_from_implicit, Ellipse3D, PolarEllipse,
};

/// Caps narrower than this are treated as points.
const DEGENERATE_CAP_RADIUS: f64 = 0.01;

/// The two caps of a snout, by connection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnoutCap {
    Bottom,
    Top,
}

impl SnoutCap {
    /// Cap for connection slot 0 (bottom) or 1 (top).
    pub fn from_slot(slot: usize) -> Self {
        if slot == 1 {
            SnoutCap::Top
        } else {
            SnoutCap::Bottom
        }
    }

    #[inline]
    pub fn slot(self) -> usize {
        match self {
            SnoutCap::Bottom => 0,
            SnoutCap::Top => 1,
        }
    }
}

/// Plane `normal · p + d = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapPlane {
    pub normal: Vector3<f64>,
    pub d: f64,
}

impl CapPlane {
    /// Plane through `point` whose normal is local +Z tilted by the shear
    /// angles.
    pub fn from_shear_and_point(shear_x: f64, shear_y: f64, point: &Point3<f64>) -> Self {
        let normal = shear_rotation(shear_x, shear_y) * Vector3::z();
        let normal = normal.normalize();
        Self {
            normal,
            d: -normal.dot(&point.coords),
        }
    }

    /// Same plane, oriented so the origin lies on the negative side.
    pub fn facing_away_from_origin(&self) -> Self {
        if self.d > 0.0 {
            Self {
                normal: -self.normal,
                d: -self.d,
            }
        } else {
            *self
        }
    }

    /// Signed distance of `point` from the plane.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.d
    }
}

/// Rotation that tilts local +Z by the snout shear angles.
pub fn shear_rotation(shear_x: f64, shear_y: f64) -> UnitQuaternion<f64> {
    let around_x = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), shear_y);
    let around_y = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -shear_x);
    around_x * around_y
}

/// Orthonormal `(right, up, view)` basis of a plane, `view` opposite the
/// normal.
pub fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let view = -normal;
    let helper = if (normal.y.abs() - 1.0).abs() < 1e-12 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let up = (helper - helper.dot(&view) * view).normalize();
    let right = up.cross(&view).normalize();
    (right, up, view)
}

/// Rigid transform from plane coordinates to model coordinates.
#[rustfmt::skip]
fn plane_to_model(
    right: &Vector3<f64>,
    up: &Vector3<f64>,
    view: &Vector3<f64>,
    origin: &Point3<f64>,
) -> Matrix4<f64> {
    Matrix4::new(
        right.x, up.x, view.x, origin.x,
        right.y, up.y, view.y, origin.y,
        right.z, up.z, view.z, origin.z,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Inverse of [`plane_to_model`].
#[rustfmt::skip]
fn model_to_plane(
    right: &Vector3<f64>,
    up: &Vector3<f64>,
    view: &Vector3<f64>,
    origin: &Point3<f64>,
) -> Matrix4<f64> {
    Matrix4::new(
        right.x, right.y, right.z, -right.dot(&origin.coords),
        up.x, up.y, up.z, -up.dot(&origin.coords),
        view.x, view.y, view.z, -view.dot(&origin.coords),
        0.0, 0.0, 0.0, 1.0,
    )
}

/// A cone given by the radius of its cross-section through the local origin
/// and its apex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub base_radius: f64,
    pub apex: Point3<f64>,
}

/// Reconstruct the cone a (non-cylindrical) snout is cut from.
pub fn cone_from_snout(snout: &SnoutParams) -> Cone {
    let base_radius = 0.5 * (snout.radius_top + snout.radius_bottom);
    let half_offset = 0.5 * Vector3::new(snout.offset_x, snout.offset_y, snout.height);
    if snout.radius_top == 0.0 {
        return Cone {
            base_radius,
            apex: Point3::from(half_offset),
        };
    }
    let ratio = base_radius / snout.radius_top;
    Cone {
        base_radius,
        apex: Point3::from(half_offset * (ratio / (ratio - 1.0))),
    }
}

/// Plane frame shared by the cone cases: origin at the apex projected into
/// the plane.
fn cone_plane_frame(
    plane: &CapPlane,
    cone: &Cone,
) -> (f64, Matrix4<f64>, Matrix4<f64>, [Vector3<f64>; 3]) {
    let plane = plane.facing_away_from_origin();
    let (right, up, view) = plane_basis(&plane.normal);
    let zn = plane.signed_distance(&cone.apex);
    let origin = cone.apex - zn * plane.normal;
    (
        zn,
        plane_to_model(&right, &up, &view, &origin),
        model_to_plane(&right, &up, &view, &origin),
        [right, up, view],
    )
}

/// Ellipse where `plane` cuts `cone`, by central projection from the apex.
pub fn cone_cap_ellipse(plane: &CapPlane, cone: &Cone) -> Ellipse3D {
    let (zn, to_model, to_plane, [right, up, view]) = cone_plane_frame(plane, cone);
    if zn == 0.0 {
        return Ellipse3D {
            polar: PolarEllipse::ZERO,
            plane_to_model: to_model,
            model_to_plane: to_plane,
        };
    }

    let apex = cone.apex.coords;
    #[rustfmt::skip]
    let view_matrix = Matrix4::new(
        right.x, right.y, right.z, -apex.dot(&right),
        up.x, up.y, up.z, -apex.dot(&up),
        view.x, view.y, view.z, -apex.dot(&view),
        0.0, 0.0, 0.0, 1.0,
    );
    // Points in the plane sit at view depth zn, so the divide is by depth.
    #[rustfmt::skip]
    let projection = Matrix4::new(
        zn, 0.0, 0.0, 0.0,
        0.0, zn, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
    );

    let implicit =
        implicit_from_projected_circle(&(projection * view_matrix), cone.base_radius, 0.0);
    Ellipse3D {
        polar: polar_from_implicit(&implicit),
        plane_to_model: to_model,
        model_to_plane: to_plane,
    }
}

/// Zero ellipse located where `plane` meets the cone axis.
pub fn degenerate_cap_ellipse(plane: &CapPlane, cone: &Cone) -> Ellipse3D {
    let (_, to_model, to_plane, _) = cone_plane_frame(plane, cone);
    Ellipse3D {
        polar: PolarEllipse::ZERO,
        plane_to_model: to_model,
        model_to_plane: to_plane,
    }
}

/// Ellipse where a sheared plane through `origin` cuts a cylinder of
/// `radius` whose axis is local Z through `origin`.
pub fn cylinder_cap_ellipse(plane: &CapPlane, radius: f64, origin: &Point3<f64>) -> Ellipse3D {
    let plane = plane.facing_away_from_origin();
    let (right, up, view) = plane_basis(&plane.normal);
    let n = plane.normal;

    #[rustfmt::skip]
    let rotation_to_plane = Matrix4::new(
        right.x, right.y, right.z, 0.0,
        up.x, up.y, up.z, 0.0,
        view.x, view.y, view.z, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    // Slide samples along Z onto the plane through the origin.
    #[rustfmt::skip]
    let oblique = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        -n.x / n.z, -n.y / n.z, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    #[rustfmt::skip]
    let drop_depth = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );

    let implicit =
        implicit_from_projected_circle(&(drop_depth * rotation_to_plane * oblique), radius, 0.0);
    Ellipse3D {
        polar: polar_from_implicit(&implicit),
        plane_to_model: plane_to_model(&right, &up, &view, origin),
        model_to_plane: model_to_plane(&right, &up, &view, origin),
    }
}

/// Circle of `radius` in an unsheared cylinder cap at `origin`.
pub fn flat_cylinder_cap_ellipse(radius: f64, origin: &Point3<f64>) -> Ellipse3D {
    #[rustfmt::skip]
    let to_model = Matrix4::new(
        -1.0, 0.0, 0.0, origin.x,
        0.0, 1.0, 0.0, origin.y,
        0.0, 0.0, -1.0, origin.z,
        0.0, 0.0, 0.0, 1.0,
    );
    #[rustfmt::skip]
    let to_plane = Matrix4::new(
        -1.0, 0.0, 0.0, origin.x,
        0.0, 1.0, 0.0, -origin.y,
        0.0, 0.0, -1.0, origin.z,
        0.0, 0.0, 0.0, 1.0,
    );
    Ellipse3D {
        polar: PolarEllipse::circle(radius),
        plane_to_model: to_model,
        model_to_plane: to_plane,
    }
}

/// Centre of a snout cap in the snout's local frame.
pub fn cap_center(snout: &SnoutParams, cap: SnoutCap) -> Point3<f64> {
    let half = 0.5 * Vector3::new(snout.offset_x, snout.offset_y, snout.height);
    match cap {
        SnoutCap::Bottom => Point3::from(-half),
        SnoutCap::Top => Point3::from(half),
    }
}

/// Plane of a snout cap in the snout's local frame.
pub fn cap_plane(snout: &SnoutParams, cap: SnoutCap) -> CapPlane {
    let center = cap_center(snout, cap);
    match cap {
        SnoutCap::Bottom => {
            CapPlane::from_shear_and_point(snout.bottom_shear_x, snout.bottom_shear_y, &center)
        }
        SnoutCap::Top => {
            CapPlane::from_shear_and_point(snout.top_shear_x, snout.top_shear_y, &center)
        }
    }
}

/// Ellipse outlining one cap of a snout, in the snout's local frame.
pub fn cap_ellipse(snout: &SnoutParams, cap: SnoutCap) -> Ellipse3D {
    let center = cap_center(snout, cap);
    let plane = cap_plane(snout, cap);

    if !snout.is_capped_cylinder() {
        let cone = cone_from_snout(snout);
        let cap_radius = match cap {
            SnoutCap::Bottom => snout.radius_bottom,
            SnoutCap::Top => snout.radius_top,
        };
        if cap_radius.abs() < DEGENERATE_CAP_RADIUS {
            return degenerate_cap_ellipse(&plane, &cone);
        }
        return cone_cap_ellipse(&plane, &cone);
    }

    if plane.normal.z >= 1.0 - 1e-12 {
        flat_cylinder_cap_ellipse(snout.radius_bottom, &center)
    } else {
        cylinder_cap_ellipse(&plane, snout.radius_bottom, &center)
    }
}
