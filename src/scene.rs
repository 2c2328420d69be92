// Camera, lights and the avatar's model transform.
//
// Pure math shared by the renderer and the resize handler; no browser types.

use crate::core::animation::Avatar;
use crate::core::constants::{
    CAMERA_FAR, CAMERA_FOVY_DEG, CAMERA_NEAR, CAMERA_Z, DIR_LIGHT_INTENSITY, DIR_LIGHT_POSITIONS,
    HEMISPHERE_GROUND, HEMISPHERE_INTENSITY, HEMISPHERE_SKY,
};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Right-handed perspective camera looking down -Z at the model.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }
}

impl Camera {
    /// Match the aspect ratio to a viewport; degenerate sizes are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub intensity: f32,
    /// Unit vector from the target towards the light; zero when the light
    /// sits on its target and so contributes nothing.
    pub direction: Vec3,
}

#[derive(Clone, Debug)]
pub struct Lights {
    pub sky: [f32; 3],
    pub ground: [f32; 3],
    pub hemisphere_intensity: f32,
    pub directional: [DirectionalLight; 3],
}

impl Default for Lights {
    fn default() -> Self {
        let light = |position: Vec3| DirectionalLight {
            position,
            intensity: DIR_LIGHT_INTENSITY,
            direction: Vec3::ZERO,
        };
        let mut lights = Self {
            sky: HEMISPHERE_SKY,
            ground: HEMISPHERE_GROUND,
            hemisphere_intensity: HEMISPHERE_INTENSITY,
            directional: DIR_LIGHT_POSITIONS.map(light),
        };
        lights.aim_at(Vec3::ZERO);
        lights
    }
}

impl Lights {
    pub fn aim_at(&mut self, target: Vec3) {
        for l in self.directional.iter_mut() {
            l.direction = (l.position - target).normalize_or_zero();
        }
    }
}

/// World matrix for the avatar: uniform scale, then XYZ Euler rotation.
pub fn model_matrix(avatar: &Avatar) -> Mat4 {
    let r = avatar.rotation;
    Mat4::from_scale_rotation_translation(
        Vec3::splat(avatar.scale),
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
        Vec3::ZERO,
    )
}
