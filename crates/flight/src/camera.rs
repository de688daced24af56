//! Chase camera: projection math plus the smoothed follow rig.

use crate::config::CameraTuning;
use bytemuck::{Pod, Zeroable};
use engine_core::{look_rotation, smoothing_factor, Transform};
use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Perspective camera with configurable FOV and clipping planes.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera transform (position and rotation).
    pub transform: Transform,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Viewport size in pixels.
    viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Camera {
    pub fn from_tuning(tuning: &CameraTuning) -> Self {
        let mut camera = Self {
            fov_degrees: tuning.fov_degrees,
            near: tuning.near,
            far: tuning.far,
            ..Default::default()
        };
        camera.set_viewport(tuning.viewport[0], tuning.viewport[1]);
        camera
    }

    /// Update the viewport (call on window resize).
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.transform.rotation, self.transform.position).inverse()
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect(), self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to window pixels (origin top-left).
    /// `None` when the point is behind the camera.
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.viewport.x,
            (-ndc.y * 0.5 + 0.5) * self.viewport.y,
        ))
    }

    /// World-space ray through a window pixel: (origin, unit direction).
    pub fn screen_ray(&self, pixel: Vec2) -> (Vec3, Vec3) {
        let ndc = Vec2::new(
            pixel.x / self.viewport.x * 2.0 - 1.0,
            1.0 - pixel.y / self.viewport.y * 2.0,
        );
        let inverse = self.view_projection_matrix().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - near).try_normalize().unwrap_or(self.transform.forward());
        (self.transform.position, direction)
    }

    /// Get camera position.
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Get camera forward direction.
    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }
}

/// Camera uniform data for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub position: [f32; 4], // w unused, padding
}

impl From<&Camera> for CameraUniform {
    fn from(camera: &Camera) -> Self {
        let pos = camera.position();
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
            position: [pos.x, pos.y, pos.z, 1.0],
        }
    }
}

/// Trailing chase rig. Position and gaze are smoothed separately, so the
/// camera swings behind the craft more lazily than it turns to face it.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub camera: Camera,
    look_target: Vec3,
    zoom: f32,
    tuning: CameraTuning,
}

impl CameraRig {
    pub fn new(tuning: &CameraTuning) -> Self {
        Self {
            camera: Camera::from_tuning(tuning),
            look_target: Vec3::ZERO,
            zoom: tuning.zoom_initial.clamp(tuning.zoom_min, tuning.zoom_max),
            tuning: tuning.clone(),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn look_target(&self) -> Vec3 {
        self.look_target
    }

    /// Accumulate a wheel delta in pixels (positive zooms out).
    pub fn apply_scroll(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta * self.tuning.zoom_sensitivity)
            .clamp(self.tuning.zoom_min, self.tuning.zoom_max);
    }

    /// Where the camera wants to be for a target pose.
    pub fn desired_position(&self, target: &Transform) -> Vec3 {
        target.position + target.rotation * (self.tuning.offset() * self.zoom)
    }

    /// Ease toward the target pose for a frame lasting `dt` seconds.
    pub fn update(&mut self, target: &Transform, dt: f32) {
        let desired = self.desired_position(target);
        let position = self.camera.transform.position.lerp(
            desired,
            smoothing_factor(self.tuning.position_smoothing, dt),
        );
        self.look_target = self
            .look_target
            .lerp(target.position, smoothing_factor(self.tuning.look_smoothing, dt));
        self.place(position, self.look_target);
    }

    /// Jump straight to the target pose.
    pub fn snap(&mut self, target: &Transform) {
        let desired = self.desired_position(target);
        self.look_target = target.position;
        self.place(desired, target.position);
    }

    fn place(&mut self, position: Vec3, look_at: Vec3) {
        self.camera.transform.position = position;
        if let Some(rotation) = look_rotation(look_at - position, Vec3::Y) {
            self.camera.transform.rotation = rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn rig() -> CameraRig {
        CameraRig::new(&CameraTuning::default())
    }

    #[test]
    fn stationary_target_converges() {
        let mut rig = rig();
        let target = Transform::from_position_rotation(
            Vec3::new(10.0, -4.0, 30.0),
            Quat::from_rotation_y(0.7),
        );
        for _ in 0..600 {
            rig.update(&target, 1.0 / 60.0);
        }
        let desired = rig.desired_position(&target);
        assert!(rig.camera.position().distance(desired) < 1e-3);
        assert!(rig.look_target().distance(target.position) < 1e-3);
    }

    #[test]
    fn frame_rate_does_not_change_the_path() {
        let target = Transform::from_position(Vec3::new(0.0, 0.0, -20.0));
        let mut at_60 = rig();
        let mut at_120 = rig();
        for _ in 0..60 {
            at_60.update(&target, 1.0 / 60.0);
            at_120.update(&target, 1.0 / 120.0);
            at_120.update(&target, 1.0 / 120.0);
        }
        assert!(at_60.camera.position().distance(at_120.camera.position()) < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut rig = rig();
        assert_eq!(rig.zoom(), 2.0);
        rig.apply_scroll(200.0);
        assert!((rig.zoom() - 3.0).abs() < 1e-6);
        rig.apply_scroll(1.0e6);
        assert_eq!(rig.zoom(), 25.0);
        rig.apply_scroll(-1.0e6);
        assert_eq!(rig.zoom(), 1.0);
    }

    #[test]
    fn snapped_camera_sits_behind_and_above() {
        let mut rig = rig();
        rig.snap(&Transform::default());
        // Forward is -Z, so behind is +Z.
        let position = rig.camera.position();
        assert!(position.z > 0.0 && position.y > 0.0);
        let centre = rig.camera.world_to_screen(Vec3::ZERO).unwrap();
        assert!((centre - rig.camera.viewport() * 0.5).length() < 1.0);
    }

    #[test]
    fn uniform_carries_camera_matrices() {
        let mut camera = Camera::default();
        camera.transform.position = Vec3::new(1.0, 2.0, 3.0);
        let uniform = CameraUniform::from(&camera);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.view_proj, camera.view_projection_matrix().to_cols_array_2d());
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 4 * (16 * 3 + 4));
    }

    #[test]
    fn points_behind_the_camera_do_not_project() {
        let camera = Camera::default();
        assert!(camera.world_to_screen(Vec3::new(0.0, 0.0, 10.0)).is_none());
        assert!(camera.world_to_screen(Vec3::new(0.0, 0.0, -10.0)).is_some());
    }

    #[test]
    fn screen_ray_round_trips_through_projection() {
        let mut camera = Camera::default();
        camera.transform = Transform::from_position_rotation(
            Vec3::new(3.0, 1.0, 5.0),
            Quat::from_rotation_x(-0.2),
        );
        let pixel = Vec2::new(900.0, 200.0);
        let (origin, direction) = camera.screen_ray(pixel);
        let hit = origin + direction * 150.0;
        let back = camera.world_to_screen(hit).unwrap();
        assert!((back - pixel).length() < 0.5, "{back:?}");
    }
}
