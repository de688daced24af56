//! HUD snapshot: reticle projection, navball orientation and gauges.

use crate::camera::Camera;
use engine_core::Transform;
use glam::{Quat, Vec2, Vec3};
use image::RgbaImage;

/// Everything an overlay needs to draw the HUD for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HudState {
    /// Reticle position in window pixels; `None` when off-screen behind the camera.
    pub reticle: Option<Vec2>,
    /// Rotation to apply to the navball sphere.
    pub navball: Quat,
    /// Hull speed in m/s.
    pub speed: f32,
    pub boosting: bool,
    pub zoom: f32,
    pub live_projectiles: usize,
    pub travelling: bool,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            reticle: None,
            navball: Quat::IDENTITY,
            speed: 0.0,
            boosting: false,
            zoom: 1.0,
            live_projectiles: 0,
            travelling: false,
        }
    }
}

/// Screen position of the point `distance` ahead of the craft.
pub fn reticle_position(camera: &Camera, craft: &Transform, distance: f32) -> Option<Vec2> {
    camera.world_to_screen(craft.transform_point(Vec3::new(0.0, 0.0, -distance)))
}

/// The navball counter-rotates so it shows the world as seen from the craft.
pub fn navball_rotation(craft_rotation: Quat) -> Quat {
    craft_rotation.inverse().normalize()
}

/// Repaint the green markings of a navball texture in `color`.
///
/// A pixel counts as marking when green exceeds 150 and outweighs red and
/// blue combined. Alpha is kept. Returns the number of pixels changed.
pub fn recolor_navball(texture: &mut RgbaImage, color: [u8; 3]) -> usize {
    let mut changed = 0;
    for pixel in texture.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if g > 150 && u16::from(g) > u16::from(r) + u16::from(b) {
            pixel.0 = [color[0], color[1], color[2], a];
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn navball_undoes_craft_rotation() {
        let craft = Quat::from_euler(glam::EulerRot::YXZ, 0.4, -0.3, 1.1);
        let combined = navball_rotation(craft) * craft;
        assert!(combined.angle_between(Quat::IDENTITY) < 1e-5);
    }

    #[test]
    fn reticle_sits_on_screen_centre_when_looking_down_the_nose() {
        let mut camera = Camera::default();
        camera.transform = Transform::from_position(Vec3::new(0.0, 0.0, 5.0));
        let reticle = reticle_position(&camera, &Transform::default(), 150.0).unwrap();
        assert!((reticle - camera.viewport() * 0.5).length() < 0.5);
    }

    #[test]
    fn reticle_hidden_when_craft_faces_the_camera() {
        let mut camera = Camera::default();
        camera.transform = Transform::from_position(Vec3::new(0.0, 0.0, -5.0));
        let craft = Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI));
        assert!(reticle_position(&camera, &craft, 150.0).is_none());
    }

    #[test]
    fn only_green_markings_are_recoloured() {
        let mut texture = RgbaImage::new(4, 1);
        texture.put_pixel(0, 0, Rgba([10, 200, 20, 255])); // marking
        texture.put_pixel(1, 0, Rgba([100, 200, 120, 128])); // g < r + b
        texture.put_pixel(2, 0, Rgba([0, 140, 0, 255])); // too dark
        texture.put_pixel(3, 0, Rgba([200, 255, 200, 255])); // r + b overflows u8
        let changed = recolor_navball(&mut texture, [0x00, 0xf6, 0xff]);
        assert_eq!(changed, 1);
        assert_eq!(texture.get_pixel(0, 0).0, [0x00, 0xf6, 0xff, 255]);
        assert_eq!(texture.get_pixel(1, 0).0, [100, 200, 120, 128]);
        assert_eq!(texture.get_pixel(3, 0).0, [200, 255, 200, 255]);
    }
}
