// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes.

use nalgebra::{Matrix4, Point3};

use crate::transform::transform_point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }
}

impl BoundingBox {
    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Box of the given full extents centred at the origin.
    pub fn centered(size_x: f64, size_y: f64, size_z: f64) -> Self {
        let half = Point3::new(0.5 * size_x.abs(), 0.5 * size_y.abs(), 0.5 * size_z.abs());
        Self::new(Point3::from(-half.coords), half)
    }

    /// Smallest box containing all points. `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.expand_point(p);
        }
        Some(bounds)
    }

    pub fn expand_point(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Axis-aligned bounds of this box after transformation by `matrix`.
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Self {
        let corners: Vec<Point3<f64>> = (0..8)
            .map(|i| {
                let corner = Point3::new(
                    if i & 1 == 0 { self.min.x } else { self.max.x },
                    if i & 2 == 0 { self.min.y } else { self.max.y },
                    if i & 4 == 0 { self.min.z } else { self.max.z },
                );
                transform_point(matrix, &corner)
            })
            .collect();
        Self::from_points(&corners).unwrap_or(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn centered_box() {
        let b = BoundingBox::centered(2.0, 4.0, 6.0);
        assert_relative_eq!(b.min, Point3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(b.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn transformed_box_is_axis_aligned() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let matrix = crate::transform::compose(
            Vector3::new(10.0, 0.0, 0.0),
            rotation,
            Vector3::new(1.0, 1.0, 1.0),
        );
        let b = BoundingBox::centered(2.0, 4.0, 6.0).transformed(&matrix);
        assert_relative_eq!(b.min, Point3::new(8.0, -1.0, -3.0), epsilon = 1e-12);
        assert_relative_eq!(b.max, Point3::new(12.0, 1.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn empty_points_have_no_bounds() {
        let points: Vec<Point3<f64>> = Vec::new();
        assert!(BoundingBox::from_points(&points).is_none());
    }
}
