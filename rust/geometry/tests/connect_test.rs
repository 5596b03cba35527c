// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use rvm_lite_core::transform::compose;
use rvm_lite_core::{
    BoxParams, CircularTorusParams, CylinderParams, PrimitiveKey, PrimitiveKind,
    RectangularTorusParams, SceneModel, SphereParams,
};
use rvm_lite_geometry::{resolve_connections, ConnectConfig};
use std::f64::consts::{FRAC_PI_2, TAU};

fn cylinder(radius: f64, height: f64) -> PrimitiveKind {
    PrimitiveKind::Cylinder(CylinderParams { radius, height })
}

fn at(x: f64, y: f64, z: f64) -> Matrix4<f64> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Endpoint tuples, sorted, for comparing runs whose connection keys differ.
fn endpoint_list(model: &SceneModel) -> Vec<(PrimitiveKey, PrimitiveKey, usize, usize)> {
    let mut list: Vec<_> = model
        .connections()
        .map(|(_, c)| (c.primitive_a, c.primitive_b, c.slot_a, c.slot_b))
        .collect();
    list.sort();
    list
}

#[test]
fn stacked_cylinders_share_one_connection() {
    let mut model = SceneModel::new();
    let root = model.add_root("PIPE-1");
    let lower = model.add_primitive(root, cylinder(0.5, 1.0), at(0.0, 0.0, 0.0)).unwrap();
    let upper = model.add_primitive(root, cylinder(0.5, 1.0), at(0.0, 0.0, 1.0)).unwrap();

    let stats = resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(stats.anchors, 4);
    assert_eq!(stats.connections, 1);
    assert_eq!(stats.matched, 2);

    let key = model.primitive(lower).unwrap().connection(1).unwrap();
    assert_eq!(model.primitive(upper).unwrap().connection(0), Some(key));
    assert_eq!(model.primitive(lower).unwrap().connection(0), None);

    let connection = model.connection(key).unwrap();
    assert!(connection.is_circular());
    assert!(!connection.is_rectangular());
    assert!(connection.involves(lower) && connection.involves(upper));
    assert!((connection.position.z - 0.5).abs() < 1e-12);
}

#[test]
fn every_connection_is_recorded_on_both_endpoints() {
    let mut model = SceneModel::new();
    let root = model.add_root("STACK");
    let mut keys = Vec::new();
    for i in 0..5 {
        let matrix = at(0.0, 0.0, 2.0 * i as f64);
        keys.push(model.add_primitive(root, cylinder(0.3, 2.0), matrix).unwrap());
    }
    resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(model.connection_count(), 4);

    for (key, connection) in model.connections() {
        assert_ne!(connection.primitive_a, connection.primitive_b);
        let a = model.primitive(connection.primitive_a).unwrap();
        let b = model.primitive(connection.primitive_b).unwrap();
        assert_eq!(a.connection(connection.slot_a), Some(key));
        assert_eq!(b.connection(connection.slot_b), Some(key));
    }
}

#[test]
fn full_torus_does_not_connect_to_itself() {
    let mut model = SceneModel::new();
    let root = model.add_root("RING");
    let ring = PrimitiveKind::CircularTorus(CircularTorusParams {
        offset: 2.0,
        radius: 0.25,
        angle: TAU,
    });
    let key = model.add_primitive(root, ring, Matrix4::identity()).unwrap();

    resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(model.connection_count(), 0);
    let primitive = model.primitive(key).unwrap();
    assert!(!primitive.has_connections());
    if let PrimitiveKind::CircularTorus(t) = &primitive.kind {
        assert!(t.is_full_turn());
    }
}

#[test]
fn isolated_partial_torus_stays_unconnected() {
    let mut model = SceneModel::new();
    let root = model.add_root("ELBOW");
    let elbow = PrimitiveKind::CircularTorus(CircularTorusParams {
        offset: 1.0,
        radius: 0.2,
        angle: FRAC_PI_2,
    });
    let key = model.add_primitive(root, elbow, at(4.0, 0.0, 0.0)).unwrap();
    model.add_primitive(root, cylinder(0.2, 1.0), at(-4.0, 0.0, 0.0)).unwrap();

    let stats = resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(stats.connections, 0);
    assert!(!model.primitive(key).unwrap().has_connections());
}

#[test]
fn anchors_beyond_epsilon_do_not_match() {
    let config = ConnectConfig::default();
    for (gap, expected) in [(1e-5, 1), (1e-4, 0)] {
        let mut model = SceneModel::new();
        let root = model.add_root("GAP");
        model.add_primitive(root, cylinder(0.5, 1.0), at(0.0, 0.0, 0.0)).unwrap();
        model.add_primitive(root, cylinder(0.5, 1.0), at(0.0, 0.0, 1.0 + gap)).unwrap();
        resolve_connections(&mut model, &config).unwrap();
        assert_eq!(model.connection_count(), expected, "gap {gap}");
    }
}

#[test]
fn perpendicular_faces_do_not_match() {
    let mut model = SceneModel::new();
    let root = model.add_root("TEE");
    model.add_primitive(root, cylinder(0.5, 1.0), at(0.0, 0.0, 0.0)).unwrap();
    // Bottom face sits on the first cylinder's top centre but faces along X.
    let sideways = compose(
        Vector3::new(0.5, 0.0, 0.5),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
        Vector3::new(1.0, 1.0, 1.0),
    );
    model.add_primitive(root, cylinder(0.5, 1.0), sideways).unwrap();

    resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(model.connection_count(), 0);
}

#[test]
fn box_face_connection_is_rectangular() {
    let mut model = SceneModel::new();
    let root = model.add_root("SUPPORT");
    let plate = PrimitiveKind::Box(BoxParams {
        length_x: 2.0,
        length_y: 2.0,
        length_z: 2.0,
    });
    model.add_primitive(root, plate, at(0.0, 0.0, -1.5)).unwrap();
    let pipe = model.add_primitive(root, cylinder(0.5, 1.0), Matrix4::identity()).unwrap();

    resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(model.connection_count(), 1);
    let key = model.primitive(pipe).unwrap().connection(0).unwrap();
    let connection = model.connection(key).unwrap();
    assert!(connection.is_rectangular());
    assert!(connection.is_circular());
}

#[test]
fn spheres_emit_no_anchors() {
    let mut model = SceneModel::new();
    let root = model.add_root("BALLS");
    model
        .add_primitive(
            root,
            PrimitiveKind::Sphere(SphereParams { diameter: 1.0 }),
            Matrix4::identity(),
        )
        .unwrap();
    let stats = resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(stats.anchors, 0);
}

#[test]
fn children_are_matched_against_their_ancestors() {
    let mut model = SceneModel::new();
    let root = model.add_root("SITE");
    let branch_a = model.add_child(root, "BRANCH-A").unwrap();
    let branch_b = model.add_child(root, "BRANCH-B").unwrap();
    let leaf = model.add_child(branch_b, "LEAF").unwrap();

    // Sibling subtrees meet at z = 0.5; the root primitive meets the leaf
    // at z = 1.5.
    let a = model.add_primitive(branch_a, cylinder(0.5, 1.0), at(0.0, 0.0, 0.0)).unwrap();
    let b = model.add_primitive(leaf, cylinder(0.5, 1.0), at(0.0, 0.0, 1.0)).unwrap();
    let c = model.add_primitive(root, cylinder(0.5, 1.0), at(0.0, 0.0, 2.0)).unwrap();

    let stats = resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(stats.connections, 2);
    assert!(model.primitive(a).unwrap().connection(1).is_some());
    assert!(model.primitive(b).unwrap().connection(0).is_some());
    assert!(model.primitive(b).unwrap().connection(1).is_some());
    assert!(model.primitive(c).unwrap().connection(0).is_some());
}

#[test]
fn resolving_twice_gives_the_same_connections() {
    let mut model = SceneModel::new();
    let root = model.add_root("LOOP");
    let child = model.add_child(root, "INNER").unwrap();
    for i in 0..4 {
        let owner = if i % 2 == 0 { root } else { child };
        model.add_primitive(owner, cylinder(0.4, 1.0), at(0.0, 0.0, i as f64)).unwrap();
    }
    let config = ConnectConfig::default();

    resolve_connections(&mut model, &config).unwrap();
    let first = endpoint_list(&model);
    resolve_connections(&mut model, &config).unwrap();
    let second = endpoint_list(&model);

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn chained_rectangular_tori_connect_end_to_start() {
    let bend = PrimitiveKind::RectangularTorus(RectangularTorusParams {
        radius_inner: 1.5,
        radius_outer: 2.5,
        height: 0.5,
        angle: FRAC_PI_2,
    });
    let mut model = SceneModel::new();
    let root = model.add_root("DUCT-1");
    let first = model.add_primitive(root, bend.clone(), Matrix4::identity()).unwrap();
    // A quarter turn about Z continues the sweep where the first bend ends.
    let second = model
        .add_primitive(
            root,
            bend,
            compose(
                Vector3::zeros(),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
                Vector3::new(1.0, 1.0, 1.0),
            ),
        )
        .unwrap();

    let stats = resolve_connections(&mut model, &ConnectConfig::default()).unwrap();
    assert_eq!(stats.connections, 1);

    let key = model.primitive(first).unwrap().connection(1).unwrap();
    assert_eq!(model.primitive(second).unwrap().connection(0), Some(key));
    let connection = model.connection(key).unwrap();
    assert!(connection.is_rectangular());
    assert!(!connection.is_circular());
    assert!((connection.position.y - 2.0).abs() < 1e-9);
}
