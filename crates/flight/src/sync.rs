//! Physics-to-visual sync for the player craft.
//!
//! Runs after the physics step and only reads body state. The root node is
//! eased toward the body; the gimbal node animates tilt and bank from the
//! held controls.

use crate::config::SyncTuning;
use crate::player::Player;
use engine_core::{smooth_scalar, smoothing_factor, SceneError, SceneGraph, Transform};
use glam::Vec3;
use input::{Action, ControlIntent};
use physics::PhysicsWorld;

/// Ease the player visual toward its body and animate the gimbal.
pub fn sync_player(
    physics: &PhysicsWorld,
    scene: &mut SceneGraph,
    player: &mut Player,
    intent: &ControlIntent,
    tuning: &SyncTuning,
    dt: f32,
) -> Result<(), SceneError> {
    let Some(body) = physics.get_body_transform(player.body) else {
        return Ok(());
    };
    let velocity = physics.linear_velocity(player.body).unwrap_or_default();
    let factor = interpolation_factor(&body, velocity, tuning, dt);
    scene.update_local(player.root, |visual| visual.blend_towards(&body, factor))?;

    let (tilt, bank) = gimbal_targets(intent, tuning);
    player.tilt = smooth_scalar(player.tilt, tilt, tuning.gimbal_smoothing, dt);
    player.bank = smooth_scalar(player.bank, bank, tuning.gimbal_smoothing, dt);
    let rotation = player.gimbal_rotation();
    scene.update_local(player.gimbal, |gimbal| gimbal.rotation = rotation)
}

/// Blend factor for this frame, halved (by default) while sliding sideways fast.
pub fn interpolation_factor(body: &Transform, velocity: Vec3, tuning: &SyncTuning, dt: f32) -> f32 {
    let lateral_speed = velocity.dot(body.right()).abs();
    let per_frame = if lateral_speed > tuning.strafe_speed_threshold {
        tuning.interpolation * tuning.strafe_smoothing_scale
    } else {
        tuning.interpolation
    };
    smoothing_factor(per_frame, dt)
}

/// Target (tilt, bank) in radians. Nose dips under forward thrust and lifts
/// under reverse or brake; the craft banks into yaw and roll input.
pub fn gimbal_targets(intent: &ControlIntent, tuning: &SyncTuning) -> (f32, f32) {
    let tilt = if intent.is(Action::ThrustForward) {
        -tuning.tilt_amount
    } else if intent.is(Action::ThrustBackward) || intent.is(Action::Brake) {
        tuning.tilt_amount
    } else {
        0.0
    };

    let bank = if intent.is(Action::YawLeft) || intent.is(Action::RollLeft) {
        tuning.bank_amount
    } else if intent.is(Action::YawRight) || intent.is(Action::RollRight) {
        -tuning.bank_amount
    } else {
        0.0
    };
    (tilt, bank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::HullModel;
    use crate::config::HullTuning;
    use glam::Quat;

    fn setup() -> (PhysicsWorld, SceneGraph, Player) {
        let mut physics = PhysicsWorld::new();
        let mut scene = SceneGraph::new();
        let model = HullModel::from_bounds("hull", Vec3::splat(-1.0), Vec3::splat(1.0));
        let player =
            Player::spawn(&mut physics, &mut scene, &model, &HullTuning::default(), Transform::default()).unwrap();
        (physics, scene, player)
    }

    #[test]
    fn visual_converges_to_moved_body() {
        let (mut physics, mut scene, mut player) = setup();
        let target = Vec3::new(5.0, -2.0, -12.0);
        let rotation = Quat::from_rotation_y(0.8);
        physics.set_pose(player.body, target, rotation);
        let tuning = SyncTuning::default();

        sync_player(&physics, &mut scene, &mut player, &ControlIntent::default(), &tuning, 1.0 / 60.0).unwrap();
        let first = player.visual_transform(&scene);
        // One frame moves 30% of the way, never a snap.
        assert!((first.position - target * 0.3).length() < 1e-4);

        for _ in 0..120 {
            sync_player(&physics, &mut scene, &mut player, &ControlIntent::default(), &tuning, 1.0 / 60.0)
                .unwrap();
        }
        let visual = player.visual_transform(&scene);
        assert!(visual.position.distance(target) < 1e-3);
        assert!(visual.rotation.angle_between(rotation) < 1e-3);
    }

    #[test]
    fn fast_sideways_motion_smooths_harder() {
        let tuning = SyncTuning::default();
        let body = Transform::default();
        let calm = interpolation_factor(&body, Vec3::new(2.0, 0.0, -40.0), &tuning, 1.0 / 60.0);
        let sliding = interpolation_factor(&body, Vec3::new(-12.0, 0.0, 0.0), &tuning, 1.0 / 60.0);
        assert!((calm - 0.3).abs() < 1e-5);
        assert!((sliding - 0.15).abs() < 1e-5);
    }

    #[test]
    fn gimbal_tilts_and_banks_from_controls_only() {
        let (physics, mut scene, mut player) = setup();
        let tuning = SyncTuning::default();
        let intent = ControlIntent::with_actions(&[Action::ThrustForward, Action::YawLeft]);
        for _ in 0..600 {
            sync_player(&physics, &mut scene, &mut player, &intent, &tuning, 1.0 / 60.0).unwrap();
        }
        assert!((player.tilt + 0.25).abs() < 1e-3);
        assert!((player.bank - 0.5).abs() < 1e-3);
        // Cosmetic only: the body has not turned.
        assert_eq!(physics.rotation(player.body), Some(Quat::IDENTITY));

        for _ in 0..600 {
            sync_player(&physics, &mut scene, &mut player, &ControlIntent::default(), &tuning, 1.0 / 60.0)
                .unwrap();
        }
        assert!(player.tilt.abs() < 1e-3 && player.bank.abs() < 1e-3);
    }

    #[test]
    fn brake_lifts_the_nose() {
        let tuning = SyncTuning::default();
        let (tilt, bank) = gimbal_targets(&ControlIntent::with_actions(&[Action::Brake]), &tuning);
        assert_eq!((tilt, bank), (0.25, 0.0));
    }
}
