// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared transform utilities for primitive placement matrices
//!
//! Matrices are column-vector `Matrix4<f64>` local-to-world transforms:
//! `world = M * local`. The upper-left 3x3 block is the linear part
//! (rotation times scale), column 3 holds the translation.

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};

/// Smallest axis scale accepted by [`decompose`].
const MIN_SCALE: f64 = 1e-12;

/// Maximum deviation from orthonormality tolerated in the rotation part.
const ORTHONORMAL_TOLERANCE: f64 = 1e-3;

/// A transform split into its scale, rotation and translation parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    pub scale: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

/// Returns the linear (rotation * scale) part of a transform.
#[inline]
pub fn linear_part(matrix: &Matrix4<f64>) -> Matrix3<f64> {
    matrix.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Returns the translation column of a transform.
#[inline]
pub fn translation_part(matrix: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

/// Transform a point (affine, no perspective divide).
#[inline]
pub fn transform_point(matrix: &Matrix4<f64>, point: &Point3<f64>) -> Point3<f64> {
    Point3::from(linear_part(matrix) * point.coords + translation_part(matrix))
}

/// Transform a direction with the linear part only and renormalise it.
///
/// Returns the zero vector when the transformed direction collapses.
#[inline]
pub fn transform_direction(matrix: &Matrix4<f64>, direction: &Vector3<f64>) -> Vector3<f64> {
    (linear_part(matrix) * direction)
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// Decompose an affine transform into scale, rotation and translation.
///
/// A negative determinant is folded into `scale.z`. Returns `None` when an
/// axis has (near) zero length, when the matrix contains non-finite values,
/// or when the normalised axes are not orthogonal (shear).
pub fn decompose(matrix: &Matrix4<f64>) -> Option<Decomposed> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let linear = linear_part(matrix);
    let mut scale = Vector3::new(
        linear.column(0).norm(),
        linear.column(1).norm(),
        linear.column(2).norm(),
    );
    if scale.iter().any(|s| *s < MIN_SCALE) {
        return None;
    }

    let mut rotation = Matrix3::from_columns(&[
        linear.column(0) / scale.x,
        linear.column(1) / scale.y,
        linear.column(2) / scale.z,
    ]);

    if rotation.determinant() < 0.0 {
        scale.z = -scale.z;
        let flipped = -rotation.column(2);
        rotation.set_column(2, &flipped);
    }

    let deviation = (rotation.transpose() * rotation - Matrix3::identity()).abs().max();
    if deviation > ORTHONORMAL_TOLERANCE {
        return None;
    }

    let rotation =
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation));

    Some(Decomposed {
        scale,
        rotation,
        translation: translation_part(matrix),
    })
}

/// Build a local-to-world matrix from translation, rotation and scale.
pub fn compose(
    translation: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
    scale: Vector3<f64>,
) -> Matrix4<f64> {
    let linear = rotation.to_rotation_matrix().into_inner() * Matrix3::from_diagonal(&scale);
    let mut matrix = linear.to_homogeneous();
    matrix[(0, 3)] = translation.x;
    matrix[(1, 3)] = translation.y;
    matrix[(2, 3)] = translation.z;
    matrix
}

/// Compact single-line rendering of a matrix for error messages.
pub fn format_matrix(matrix: &Matrix4<f64>) -> String {
    let rows: Vec<String> = (0..4)
        .map(|r| {
            let cells: Vec<String> = (0..4).map(|c| format!("{:.6}", matrix[(r, c)])).collect();
            format!("[{}]", cells.join(", "))
        })
        .collect();
    format!("[{}]", rows.join(", "))
}
