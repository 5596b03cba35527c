// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};
use rvm_lite_core::transform::{compose, transform_point};
use rvm_lite_core::{
    BoxParams, CircularTorusParams, CylinderParams, DishParams, PrimitiveKey, PrimitiveKind,
    SceneModel, SnoutParams,
};
use rvm_lite_geometry::{cap_visibility, resolve_connections, CapStats, ConnectConfig};
use std::f64::consts::FRAC_PI_2;

fn at(z: f64) -> Matrix4<f64> {
    Matrix4::new_translation(&Vector3::new(0.0, 0.0, z))
}

fn cylinder(radius: f64) -> PrimitiveKind {
    PrimitiveKind::Cylinder(CylinderParams { radius, height: 1.0 })
}

fn cube(side: f64) -> PrimitiveKind {
    PrimitiveKind::Box(BoxParams {
        length_x: side,
        length_y: side,
        length_z: side,
    })
}

/// Caps of a unit-height primitive centred at `z` on the world Z axis.
fn caps_of(model: &SceneModel, key: PrimitiveKey, z: f64, stats: &CapStats) -> (bool, bool) {
    let config = ConnectConfig::default();
    cap_visibility(
        model,
        key,
        &Point3::new(0.0, 0.0, z - 0.5),
        &Point3::new(0.0, 0.0, z + 0.5),
        &config,
        stats,
    )
    .unwrap()
}

/// Caps of `key` centred at two arbitrary world points.
fn caps_at(
    model: &SceneModel,
    key: PrimitiveKey,
    a: Point3<f64>,
    b: Point3<f64>,
) -> (bool, bool) {
    cap_visibility(model, key, &a, &b, &ConnectConfig::default(), &CapStats::new()).unwrap()
}

fn placed(parts: &[(PrimitiveKind, Matrix4<f64>)]) -> (SceneModel, Vec<PrimitiveKey>) {
    let mut model = SceneModel::new();
    let root = model.add_root("LINE-1");
    let keys = parts
        .iter()
        .map(|(kind, matrix)| model.add_primitive(root, kind.clone(), *matrix).unwrap())
        .collect();
    resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    (model, keys)
}

fn resolved(parts: &[(PrimitiveKind, f64)]) -> (SceneModel, Vec<PrimitiveKey>) {
    let parts: Vec<_> = parts.iter().map(|(kind, z)| (kind.clone(), at(*z))).collect();
    placed(&parts)
}

fn rotated(axis: Vector3<f64>, angle: f64, translation: Vector3<f64>) -> Matrix4<f64> {
    compose(
        translation,
        UnitQuaternion::from_scaled_axis(axis * angle),
        Vector3::new(1.0, 1.0, 1.0),
    )
}

fn quarter_torus(radius: f64) -> PrimitiveKind {
    PrimitiveKind::CircularTorus(CircularTorusParams {
        offset: 2.0,
        radius,
        angle: FRAC_PI_2,
    })
}

#[test]
fn cylinder_on_large_box_hides_bottom_cap() {
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0), (cube(2.0), -1.5)]);
    let stats = CapStats::new();
    assert_eq!(caps_of(&model, keys[0], 0.0, &stats), (false, true));

    let snap = stats.snapshot();
    assert_eq!(snap.caps_tested, 2);
    assert_eq!(snap.caps_hidden, 1);
    assert_eq!(snap.caps_shown, 1);
}

#[test]
fn cylinder_on_small_box_keeps_both_caps() {
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0), (cube(0.5), -0.75)]);
    assert_eq!(model.connection_count(), 1);
    assert_eq!(caps_of(&model, keys[0], 0.0, &CapStats::new()), (true, true));
}

#[test]
fn equal_cylinders_hide_the_shared_caps() {
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0), (cylinder(0.5), 1.0)]);
    let stats = CapStats::new();
    assert_eq!(caps_of(&model, keys[0], 0.0, &stats), (true, false));
    assert_eq!(caps_of(&model, keys[1], 1.0, &stats), (false, true));
    assert_eq!(stats.snapshot().caps_hidden, 2);
}

#[test]
fn narrower_neighbour_leaves_the_wider_cap_visible() {
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0), (cylinder(0.4), 1.0)]);
    let stats = CapStats::new();
    assert_eq!(caps_of(&model, keys[0], 0.0, &stats), (true, true));
    assert_eq!(caps_of(&model, keys[1], 1.0, &stats), (false, true));
}

#[test]
fn cap_margin_widens_the_covering_radius() {
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0), (cylinder(0.4), 1.0)]);
    let config = ConnectConfig {
        cap_margin: 0.15,
        ..ConnectConfig::default()
    };
    let shown = cap_visibility(
        &model,
        keys[0],
        &Point3::new(0.0, 0.0, -0.5),
        &Point3::new(0.0, 0.0, 0.5),
        &config,
        &CapStats::new(),
    )
    .unwrap();
    assert_eq!(shown, (true, false));
}

#[test]
fn dish_closes_the_cylinder_end() {
    let dish = PrimitiveKind::SphericalDish(DishParams {
        base_radius: 0.5,
        height: 0.25,
    });
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0), (dish, 0.5)]);
    assert_eq!(model.connection_count(), 1);
    assert_eq!(caps_of(&model, keys[0], 0.0, &CapStats::new()), (true, false));
}

#[test]
fn unconnected_primitive_shows_both_caps() {
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0)]);
    let stats = CapStats::new();
    assert_eq!(caps_of(&model, keys[0], 0.0, &stats), (true, true));

    let snap = stats.snapshot();
    assert_eq!(snap.caps_without_connections, 2);
    assert_eq!(snap.caps_shown, 2);
}

#[test]
fn stacked_snouts_compare_cap_ellipses() {
    // Lower top cap radius 0.5, upper bottom cap radius 0.6.
    let lower = PrimitiveKind::Snout(SnoutParams::new(1.0, 0.5, 1.0));
    let upper = PrimitiveKind::Snout(SnoutParams::new(0.6, 0.3, 1.0));
    let (model, keys) = resolved(&[(lower, 0.0), (upper, 1.0)]);
    assert_eq!(model.connection_count(), 1);

    let stats = CapStats::new();
    assert_eq!(caps_of(&model, keys[0], 0.0, &stats), (true, false));
    assert_eq!(caps_of(&model, keys[1], 1.0, &stats), (true, true));

    let snap = stats.snapshot();
    assert_eq!(snap.precise_agreements, 2);
    assert_eq!(snap.precise_disagreements, 0);
    assert_eq!(snap.precise_undetermined, 0);
}

#[test]
fn pointed_snout_is_covered_by_its_neighbour() {
    let cone = PrimitiveKind::Snout(SnoutParams::new(0.5, 0.0, 1.0));
    let tip = PrimitiveKind::Snout(SnoutParams::new(0.0, 0.0, 1.0));
    let (model, keys) = resolved(&[(cone, 0.0), (tip, 1.0)]);
    assert_eq!(model.connection_count(), 1);

    let stats = CapStats::new();
    // The collapsed snout never covers anything, and is always covered.
    assert_eq!(caps_of(&model, keys[0], 0.0, &stats), (true, true));
    assert_eq!(caps_of(&model, keys[1], 1.0, &stats), (false, true));
}

#[test]
fn snout_on_large_box_hides_bottom_cap() {
    let snout = PrimitiveKind::Snout(SnoutParams::new(0.5, 0.3, 1.0));
    let (model, keys) = resolved(&[(snout, 0.0), (cube(2.0), -1.5)]);
    assert_eq!(model.connection_count(), 1);
    assert_eq!(caps_of(&model, keys[0], 0.0, &CapStats::new()), (false, true));
}

#[test]
fn box_never_hides_its_own_faces() {
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0), (cube(2.0), -1.5)]);
    let faces = caps_at(&model, keys[1], Point3::new(0.0, 0.0, -2.5), Point3::new(0.0, 0.0, -0.5));
    assert_eq!(faces, (true, true));

    let snout = PrimitiveKind::Snout(SnoutParams::new(0.5, 0.3, 1.0));
    let (model, keys) = resolved(&[(snout, 0.0), (cube(2.0), -1.5)]);
    let faces = caps_at(&model, keys[1], Point3::new(0.0, 0.0, -2.5), Point3::new(0.0, 0.0, -0.5));
    assert_eq!(faces, (true, true));
}

#[test]
fn chained_tori_compare_tube_radii() {
    // The second elbow is the first turned a quarter about Z, so it starts
    // where the first one ends.
    let (model, keys) = placed(&[
        (quarter_torus(0.5), Matrix4::identity()),
        (quarter_torus(0.4), rotated(Vector3::z(), FRAC_PI_2, Vector3::zeros())),
    ]);
    assert_eq!(model.connection_count(), 1);

    let joint = Point3::new(0.0, 2.0, 0.0);
    assert_eq!(caps_at(&model, keys[0], Point3::new(2.0, 0.0, 0.0), joint), (true, true));
    assert_eq!(caps_at(&model, keys[1], joint, Point3::new(-2.0, 0.0, 0.0)), (false, true));
}

#[test]
fn snout_closes_the_torus_end() {
    // The elbow ends at (0, 2, 0) facing -X; the snout's bottom faces +X
    // there and its top lies one unit further along -X.
    let snout = PrimitiveKind::Snout(SnoutParams::new(0.6, 0.3, 1.0));
    let (model, keys) = placed(&[
        (quarter_torus(0.5), Matrix4::identity()),
        (snout, rotated(Vector3::y(), -FRAC_PI_2, Vector3::new(-0.5, 2.0, 0.0))),
    ]);
    assert_eq!(model.connection_count(), 1);

    let joint = Point3::new(0.0, 2.0, 0.0);
    assert_eq!(caps_at(&model, keys[0], Point3::new(2.0, 0.0, 0.0), joint), (true, false));
    assert_eq!(caps_at(&model, keys[1], joint, Point3::new(-1.0, 2.0, 0.0)), (true, true));
}

#[test]
fn elliptical_dish_wider_than_cylinder() {
    let dish = PrimitiveKind::EllipticalDish(DishParams {
        base_radius: 0.6,
        height: 0.3,
    });
    let (model, keys) = resolved(&[(cylinder(0.5), 0.0), (dish, 0.5)]);
    assert_eq!(model.connection_count(), 1);

    assert_eq!(caps_of(&model, keys[0], 0.0, &CapStats::new()), (true, false));
    let apex = Point3::new(0.0, 0.0, 0.8);
    let dish_caps = caps_at(&model, keys[1], Point3::new(0.0, 0.0, 0.5), apex);
    assert_eq!(dish_caps, (true, true));
}

#[test]
fn elliptical_dish_closes_the_snout_top() {
    let snout = PrimitiveKind::Snout(SnoutParams::new(0.5, 0.4, 1.0));
    let dish = PrimitiveKind::EllipticalDish(DishParams {
        base_radius: 0.45,
        height: 0.2,
    });
    let (model, keys) = resolved(&[(snout, 0.0), (dish, 0.5)]);
    assert_eq!(model.connection_count(), 1);

    assert_eq!(caps_of(&model, keys[0], 0.0, &CapStats::new()), (true, false));
    let apex = Point3::new(0.0, 0.0, 0.7);
    let dish_caps = caps_at(&model, keys[1], Point3::new(0.0, 0.0, 0.5), apex);
    assert_eq!(dish_caps, (true, true));
}

#[test]
fn spherical_dish_closes_the_snout_top() {
    let snout = PrimitiveKind::Snout(SnoutParams::new(0.3, 0.5, 1.0));
    let dish = PrimitiveKind::SphericalDish(DishParams {
        base_radius: 0.55,
        height: 0.2,
    });
    let (model, keys) = resolved(&[(snout, 0.0), (dish, 0.5)]);
    assert_eq!(model.connection_count(), 1);

    assert_eq!(caps_of(&model, keys[0], 0.0, &CapStats::new()), (true, false));
    let apex = Point3::new(0.0, 0.0, 0.7);
    let dish_caps = caps_at(&model, keys[1], Point3::new(0.0, 0.0, 0.5), apex);
    assert_eq!(dish_caps, (true, true));
}

#[test]
fn sheared_snout_uses_major_axis_for_itself_and_minor_for_covering() {
    // A straight snout of radius 0.5 whose top is sheared by 0.5 rad: the top
    // cap is an ellipse with semi-minor 0.5 and semi-major 0.5 / cos 0.5.
    let shear: f64 = 0.5;
    let mut sheared = SnoutParams::new(0.5, 0.5, 1.0);
    sheared.top_shear_x = shear;
    let major = 0.5 / shear.cos();
    let axis = Vector3::new(-shear.sin(), 0.0, shear.cos());
    let top = Point3::new(0.0, 0.0, 0.5);

    // (cylinder radius, snout top shown, cylinder bottom shown)
    let cases = [
        (0.45, true, false),
        (0.5 * (0.5 + major), true, true),
        (major + 0.02, false, true),
    ];
    for (radius, snout_top, cylinder_bottom) in cases {
        // Cylinder standing on the sheared face, its axis along the face normal.
        let matrix = rotated(Vector3::y(), -shear, top.coords + 0.5 * axis);
        let (model, keys) = placed(&[
            (PrimitiveKind::Snout(sheared), Matrix4::identity()),
            (cylinder(radius), matrix),
        ]);
        assert_eq!(model.connection_count(), 1, "radius {radius}");

        let snout_caps = caps_at(&model, keys[0], Point3::new(0.0, 0.0, -0.5), top);
        assert_eq!(snout_caps, (true, snout_top), "radius {radius}");

        let bottom = transform_point(&matrix, &Point3::new(0.0, 0.0, -0.5));
        let far = transform_point(&matrix, &Point3::new(0.0, 0.0, 0.5));
        let cylinder_caps = caps_at(&model, keys[1], bottom, far);
        assert_eq!(cylinder_caps, (cylinder_bottom, true), "radius {radius}");
    }
}
