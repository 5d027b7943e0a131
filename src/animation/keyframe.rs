use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Values that can be blended between two neighbouring keyframes.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        // glam's slerp already takes the shortest arc
        start.slerp(end, t)
    }
}

/// One transform sample of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Keyframe {
    /// Zero translation, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Local matrix of this sample, `T * R * S`.
    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Keyframe {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Interpolatable for Keyframe {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        // t == 0 must reproduce the lower sample bit for bit
        if t <= 0.0 {
            return start;
        }
        Self {
            position: Vec3::interpolate_linear(start.position, end.position, t),
            rotation: Quat::interpolate_linear(start.rotation, end.rotation, t),
            scale: Vec3::interpolate_linear(start.scale, end.scale, t),
        }
    }
}
