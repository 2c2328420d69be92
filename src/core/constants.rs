use glam::Vec3;

// Scene layout constants shared by the renderer and the bootstrap code.

// Camera
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_Z: f32 = 5.0;

// Lights: one hemisphere fill plus three white directionals aimed at the model
pub const HEMISPHERE_SKY: [f32; 3] = [1.0, 1.0, 1.0];
pub const HEMISPHERE_GROUND: [f32; 3] = [1.0, 1.0, 1.0];
pub const HEMISPHERE_INTENSITY: f32 = 1.0;
pub const DIR_LIGHT_INTENSITY: f32 = 1.0;
pub const DIR_LIGHT_POSITIONS: [Vec3; 3] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(20.0, 0.0, 20.0),
    Vec3::new(-20.0, 0.0, 20.0),
];

// Model is normalized so its bounding radius matches this value
pub const MODEL_FIT_RADIUS: f32 = 1.5;

// Stone albedo used when the asset has no material color
pub const DEFAULT_ALBEDO: [f32; 3] = [0.62, 0.6, 0.57];
