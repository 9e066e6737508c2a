use serde::{Deserialize, Serialize};

/// A transient prop attached to the character for the lifetime of one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropSpec {
    /// Model to stream in and spawn.
    pub model: String,

    /// Skeleton bone index the prop is rigidly attached to.
    pub bone: i32,

    /// Offset from the bone, in bone-local coordinates.
    #[serde(default)]
    pub position: Vec3,

    /// Rotation offset from the bone, in degrees.
    #[serde(default)]
    pub rotation: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
