// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ellipse algebra
//!
//! Planar ellipses in implicit form `Ax² + Bxy + Cy² + Dx + Ey + F = 0`
//! (interior negative) and in polar form (centre, semi-axes, rotation).
//! Implicit ellipses are recovered from a circle pushed through a 4x4
//! projective transform; see <https://en.wikipedia.org/wiki/Ellipse#General_ellipse>
//! for the conversion formulas.

use nalgebra::{Matrix4, Matrix6, Vector4};
use std::f64::consts::{FRAC_PI_2, PI};

/// Values below this are snapped to zero by [`polar_from_implicit`].
const SNAP_EPSILON: f64 = 1e-5;

/// Relative singular value under which the sample system is rank deficient.
const NULLITY_TOLERANCE: f64 = 1e-9;

/// Sample angles on the source circle. Spread out and never antipodal so
/// the 6x6 system stays well conditioned.
const SAMPLE_ANGLES: [f64; 6] = [
    0.05 * PI,
    PI / 3.0,
    2.0 * PI / 3.0,
    0.9 * PI,
    4.0 * PI / 3.0,
    1.7 * PI,
];

/// Conic coefficients `Ax² + Bxy + Cy² + Dx + Ey + F = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImplicitEllipse {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl ImplicitEllipse {
    /// Sentinel for "no real ellipse".
    pub const ZERO: Self = Self {
        a: 0.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Value of the quadratic form at `(x, y)`. Negative inside.
    #[inline]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.a * x * x + self.b * x * y + self.c * y * y + self.d * x + self.e * y + self.f
    }

    /// `B² - 4AC`, negative for a real ellipse.
    #[inline]
    pub fn discriminant(&self) -> f64 {
        self.b * self.b - 4.0 * self.a * self.c
    }

    /// Whether the discriminant is numerically zero relative to the
    /// quadratic coefficients.
    fn is_parabolic(&self) -> bool {
        let scale = self.a.abs() + self.b.abs() + self.c.abs();
        self.discriminant().abs() <= 1e-12 * scale * scale
    }

    /// Centre `(x0, y0)`, `None` when the conic has no unique centre.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.is_parabolic() {
            return None;
        }
        let den = self.discriminant();
        Some((
            (2.0 * self.c * self.d - self.b * self.e) / den,
            (2.0 * self.a * self.e - self.b * self.d) / den,
        ))
    }
}

/// Ellipse as centre, semi-axes and rotation of the major axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarEllipse {
    pub semi_minor_axis: f64,
    pub semi_major_axis: f64,
    /// Angle between the plane's x axis and the major axis, in radians.
    pub theta: f64,
    pub x0: f64,
    pub y0: f64,
    pub implicit: ImplicitEllipse,
}

impl PolarEllipse {
    /// Sentinel for "no real ellipse".
    pub const ZERO: Self = Self {
        semi_minor_axis: 0.0,
        semi_major_axis: 0.0,
        theta: 0.0,
        x0: 0.0,
        y0: 0.0,
        implicit: ImplicitEllipse::ZERO,
    };

    /// Circle of `radius` centred at the plane origin.
    pub fn circle(radius: f64) -> Self {
        let rsq = radius * radius;
        Self {
            semi_minor_axis: radius,
            semi_major_axis: radius,
            theta: 0.0,
            x0: 0.0,
            y0: 0.0,
            implicit: ImplicitEllipse::new(1.0 / rsq, 0.0, 1.0 / rsq, 0.0, 0.0, -1.0),
        }
    }

    /// True for the sentinel and for any ellipse without a positive extent.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.implicit.is_zero() || !(self.semi_major_axis > 0.0 && self.semi_minor_axis > 0.0)
    }

    /// Express `(px, py)` in the ellipse's own axes: centred, major axis
    /// along x.
    pub fn to_axis_frame(&self, px: f64, py: f64) -> (f64, f64) {
        let (s, c) = self.theta.sin_cos();
        let dx = px - self.x0;
        let dy = py - self.y0;
        (c * dx + s * dy, -s * dx + c * dy)
    }

    /// `(x/a)² + (y/b)² <= 1 + eps` in the ellipse's own axes.
    pub fn contains_point(&self, px: f64, py: f64, eps: f64) -> bool {
        if self.is_zero() {
            return false;
        }
        let (x, y) = self.to_axis_frame(px, py);
        let u = x / self.semi_major_axis;
        let v = y / self.semi_minor_axis;
        u * u + v * v <= 1.0 + eps
    }

    /// Point on the ellipse at parameter `t`, in plane coordinates.
    pub fn point_at(&self, t: f64) -> (f64, f64) {
        let (s, c) = self.theta.sin_cos();
        let x = self.semi_major_axis * t.cos();
        let y = self.semi_minor_axis * t.sin();
        (self.x0 + c * x - s * y, self.y0 + s * x + c * y)
    }
}

/// A planar ellipse embedded in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse3D {
    pub polar: PolarEllipse,
    /// Columns: plane x axis, plane y axis, plane normal, plane origin.
    pub plane_to_model: Matrix4<f64>,
    pub model_to_plane: Matrix4<f64>,
}

impl Ellipse3D {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.polar.is_zero()
    }
}

/// Fit the implicit ellipse traced by a circle of `radius` at local height
/// `height_offset` after the projective transform `projection`.
///
/// Returns [`ImplicitEllipse::ZERO`] when a sample projects to infinity or
/// the sample system has no null space.
pub fn implicit_from_projected_circle(
    projection: &Matrix4<f64>,
    radius: f64,
    height_offset: f64,
) -> ImplicitEllipse {
    let mut system = Matrix6::<f64>::zeros();
    for (row, theta) in SAMPLE_ANGLES.iter().enumerate() {
        let sample = Vector4::new(radius * theta.cos(), radius * theta.sin(), height_offset, 1.0);
        let projected = projection * sample;
        let x = projected.x / projected.w;
        let y = projected.y / projected.w;
        if !x.is_finite() || !y.is_finite() {
            return ImplicitEllipse::ZERO;
        }
        system[(row, 0)] = x * x;
        system[(row, 1)] = x * y;
        system[(row, 2)] = y * y;
        system[(row, 3)] = x;
        system[(row, 4)] = y;
        system[(row, 5)] = 1.0;
    }

    let svd = system.svd(false, true);
    let Some(v_t) = svd.v_t else {
        return ImplicitEllipse::ZERO;
    };
    let singular = svd.singular_values;
    let s_max = singular.max();
    if s_max <= 0.0 || !s_max.is_finite() {
        return ImplicitEllipse::ZERO;
    }
    let s_min_index = singular.imin();
    if singular[s_min_index] > NULLITY_TOLERANCE * s_max {
        return ImplicitEllipse::ZERO;
    }

    let kernel = v_t.row(s_min_index);
    let mut ellipse = ImplicitEllipse::new(
        kernel[0], kernel[1], kernel[2], kernel[3], kernel[4], kernel[5],
    );

    // Interior is the negative side.
    if let Some((x0, y0)) = ellipse.center() {
        if ellipse.evaluate(x0, y0) > 0.0 {
            ellipse = ImplicitEllipse::new(
                -ellipse.a, -ellipse.b, -ellipse.c, -ellipse.d, -ellipse.e, -ellipse.f,
            );
        }
    }
    ellipse
}

#[inline]
fn snap(value: f64) -> f64 {
    if value.abs() < SNAP_EPSILON {
        0.0
    } else {
        value
    }
}

/// Convert an implicit ellipse to polar form.
///
/// The zero sentinel, and any conic whose discriminant vanishes, map to
/// [`PolarEllipse::ZERO`].
pub fn polar_from_implicit(ellipse: &ImplicitEllipse) -> PolarEllipse {
    if ellipse.is_zero() || ellipse.is_parabolic() {
        return PolarEllipse::ZERO;
    }
    let ImplicitEllipse { a, b, c, d, e, f } = *ellipse;
    let den = ellipse.discriminant();

    let root = ((a - c) * (a - c) + b * b).sqrt();
    let common = 2.0 * (a * e * e + c * d * d - b * d * e + den * f);
    let radius_1 = -(common * ((a + c) + root)).max(0.0).sqrt() / den;
    let radius_2 = -(common * ((a + c) - root)).max(0.0).sqrt() / den;

    let b_snapped = snap(b);
    let theta = if b_snapped != 0.0 {
        ((c - a - root) / b).atan()
    } else if snap(a - c) <= 0.0 {
        0.0
    } else {
        FRAC_PI_2
    };

    let x0 = snap((2.0 * c * d - b * e) / den);
    let y0 = snap((2.0 * a * e - b * d) / den);

    PolarEllipse {
        semi_minor_axis: radius_1.min(radius_2),
        semi_major_axis: radius_1.max(radius_2),
        theta,
        x0,
        y0,
        implicit: *ellipse,
    }
}
