//! Transform component and smoothing utilities for spatial positioning.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Frame rate the per-frame smoothing factors were tuned at.
pub const REFERENCE_FPS: f32 = 60.0;

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder-style uniform scale.
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Map a point from this transform's local space into its parent space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * local)
    }

    /// Compose `self` (parent) with `child` (expressed in the parent's space).
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            position: self.transform_point(child.position),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    /// Blend position and rotation toward `target` by `t` (scale untouched).
    pub fn blend_towards(&mut self, target: &Transform, t: f32) {
        self.position = self.position.lerp(target.position, t);
        self.rotation = self.rotation.slerp(target.rotation, t).normalize();
    }
}

/// Rotation whose forward (-Z) axis points along `direction`.
///
/// Returns `None` for a degenerate direction. When `direction` is parallel to
/// `up` a fallback up axis is used so the result stays well defined.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Option<Quat> {
    let forward = direction.try_normalize()?;
    let up = if forward.cross(up).length_squared() < 1e-6 {
        if forward.cross(Vec3::Z).length_squared() < 1e-6 {
            Vec3::X
        } else {
            Vec3::Z
        }
    } else {
        up
    };
    let right = forward.cross(up).normalize();
    let true_up = right.cross(forward);
    Some(Quat::from_mat3(&glam::Mat3::from_cols(right, true_up, -forward)).normalize())
}

/// Convert a per-frame blend factor tuned at [`REFERENCE_FPS`] into the factor
/// for a frame lasting `dt` seconds.
///
/// `1 - (1 - f)^(dt * 60)`: identical to `f` at 60 Hz, and two half-length
/// frames land exactly where one full frame does.
pub fn smoothing_factor(per_frame: f32, dt: f32) -> f32 {
    let per_frame = per_frame.clamp(0.0, 1.0);
    if per_frame >= 1.0 {
        return 1.0;
    }
    1.0 - (1.0 - per_frame).powf(dt.max(0.0) * REFERENCE_FPS)
}

/// Scalar exponential smoothing toward `target` with a time-normalised factor.
pub fn smooth_scalar(current: f32, target: f32, per_frame: f32, dt: f32) -> f32 {
    current + (target - current) * smoothing_factor(per_frame, dt)
}

/// Raw transform data for GPU upload (instance data).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
}

impl From<&Transform> for TransformRaw {
    fn from(transform: &Transform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

impl From<Transform> for TransformRaw {
    fn from(transform: Transform) -> Self {
        Self::from(&transform)
    }
}
