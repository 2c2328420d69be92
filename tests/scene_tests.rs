// Host-side tests for camera, light rig and avatar transform math.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]

mod constants {
    include!("../src/constants.rs");
}
mod core {
    pub mod animation {
        include!("../src/core/animation.rs");
    }
    pub mod constants {
        include!("../src/core/constants.rs");
    }
}
mod scene {
    include!("../src/scene.rs");
}

use crate::core::animation::Avatar;
use crate::core::constants::{CAMERA_FOVY_DEG, CAMERA_Z};
use glam::{Mat4, Vec3};
use scene::*;

#[test]
fn camera_looks_at_origin_from_front() {
    let cam = Camera::default();
    assert_eq!(cam.eye, Vec3::new(0.0, 0.0, CAMERA_Z));
    assert!((cam.fovy_radians - CAMERA_FOVY_DEG.to_radians()).abs() < 1e-6);
    let origin_in_view = cam.view_matrix().transform_point3(Vec3::ZERO);
    assert!((origin_in_view - Vec3::new(0.0, 0.0, -CAMERA_Z)).length() < 1e-5);
}

#[test]
fn origin_projects_to_screen_centre() {
    let mut cam = Camera::default();
    cam.set_viewport(1920.0, 1080.0);
    let clip = cam.view_proj() * Vec3::ZERO.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn degenerate_viewport_keeps_aspect() {
    let mut cam = Camera::default();
    cam.set_viewport(800.0, 400.0);
    assert_eq!(cam.aspect, 2.0);
    cam.set_viewport(0.0, 400.0);
    assert_eq!(cam.aspect, 2.0);
}

#[test]
fn lights_aim_at_target() {
    let lights = Lights::default();
    // The light sitting on the origin contributes no direction
    assert_eq!(lights.directional[0].direction, Vec3::ZERO);
    let right = Vec3::new(1.0, 0.0, 1.0).normalize();
    let left = Vec3::new(-1.0, 0.0, 1.0).normalize();
    assert!((lights.directional[1].direction - right).length() < 1e-6);
    assert!((lights.directional[2].direction - left).length() < 1e-6);
}

#[test]
fn lights_follow_a_moved_target() {
    let mut lights = Lights::default();
    lights.aim_at(Vec3::new(0.0, 0.0, 20.0));
    assert!((lights.directional[1].direction - Vec3::X).length() < 1e-6);
    assert!((lights.directional[0].direction - Vec3::NEG_Z).length() < 1e-6);
}

#[test]
fn idle_avatar_has_identity_transform() {
    assert!(model_matrix(&Avatar::default()).abs_diff_eq(Mat4::IDENTITY, 1e-6));
}

#[test]
fn avatar_scale_and_rotation_are_applied() {
    let avatar = Avatar {
        rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
        scale: 1.1,
    };
    let p = model_matrix(&avatar).transform_point3(Vec3::X);
    // +X turns to -Z under a quarter turn about Y
    assert!((p - Vec3::new(0.0, 0.0, -1.1)).length() < 1e-5);
}
