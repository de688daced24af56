//! Flight controller: turns sampled control intent into forces and angular
//! velocity on the hull body.
//!
//! Translation is force-driven and rotation is written directly as angular
//! velocity, so the craft drifts but turns crisply. Forces are reset every
//! frame before new ones are applied.

use crate::config::{ControlMode, FlightTuning};
use crate::player::Player;
use engine_core::{look_rotation, smoothing_factor};
use glam::{Quat, Vec3};
use input::{Action, ControlIntent};
use physics::PhysicsWorld;

#[derive(Debug, Clone)]
pub struct FlightController {
    pub tuning: FlightTuning,
    pub mode: ControlMode,
    last_fire: Option<f32>,
}

impl FlightController {
    pub fn new(tuning: FlightTuning, mode: ControlMode) -> Self {
        Self {
            tuning,
            mode,
            last_fire: None,
        }
    }

    /// Apply one frame of control. `aim_point` is the world point under the
    /// cursor, used only in [`ControlMode::MouseAim`].
    pub fn apply(
        &mut self,
        physics: &mut PhysicsWorld,
        player: &Player,
        intent: &ControlIntent,
        aim_point: Option<Vec3>,
        dt: f32,
    ) {
        let body = player.body;
        let (Some(position), Some(rotation)) = (physics.position(body), physics.rotation(body)) else {
            return;
        };
        physics.reset_forces(body);

        let thrust = self.thrust(intent);
        if thrust != Vec3::ZERO {
            physics.apply_local_force(body, thrust);
        }

        let damping = if intent.is(Action::Brake) {
            self.tuning.brake_damping
        } else {
            player.original_linear_damping
        };
        physics.set_linear_damping(body, damping);

        let velocity = physics.linear_velocity(body).unwrap_or_default();
        let mass = physics.mass(body).unwrap_or(1.0);
        physics.apply_force(body, self.lateral_correction(rotation, velocity, mass, intent.is_strafing()));

        if let Some(force) = containment_force(position, &self.tuning) {
            physics.apply_force(body, force);
        }

        match (self.mode, aim_point) {
            (ControlMode::MouseAim, Some(aim)) => {
                let turned = self.aim_rotation(position, rotation, aim, dt);
                physics.set_pose(body, position, turned);
                let roll = Vec3::new(0.0, 0.0, self.roll_rate(intent));
                physics.set_angular_velocity(body, turned * roll);
            }
            _ => {
                let local = self.keyboard_angular_velocity(rotation, intent);
                physics.set_angular_velocity(body, rotation * local);
            }
        }
    }

    /// Summed local-space thrust for the held movement actions.
    pub fn thrust(&self, intent: &ControlIntent) -> Vec3 {
        let speed = if intent.is(Action::Boost) {
            self.tuning.move_speed * self.tuning.boost_multiplier
        } else {
            self.tuning.move_speed
        };
        let mut force = Vec3::ZERO;
        if intent.is(Action::ThrustForward) {
            force.z -= speed;
        }
        if intent.is(Action::ThrustBackward) {
            force.z += self.tuning.move_speed * 0.5;
        }
        force.x += intent.strafe_axis() * speed;
        if intent.is(Action::Ascend) {
            force.y += speed;
        }
        if intent.is(Action::Descend) {
            force.y -= speed;
        }
        force
    }

    /// World force opposing velocity along the hull's lateral axis.
    pub fn lateral_correction(&self, rotation: Quat, velocity: Vec3, mass: f32, strafing: bool) -> Vec3 {
        let right = rotation * Vec3::X;
        let lateral_speed = velocity.dot(right);
        let gain = if strafing {
            self.tuning.strafe_correction
        } else {
            self.tuning.centering_correction
        };
        -right * lateral_speed * gain * mass
    }

    /// Local angular velocity from the rotation keys. Pitch is refused once
    /// the nose is within the limit of straight up or down.
    pub fn keyboard_angular_velocity(&self, rotation: Quat, intent: &ControlIntent) -> Vec3 {
        let vertical = (rotation * -Vec3::Z).dot(Vec3::Y);
        let rate = self.tuning.rotation_speed;
        let mut local = Vec3::ZERO;

        if intent.is(Action::PitchUp) {
            if vertical < self.tuning.pitch_limit {
                local.x = rate;
            }
        } else if intent.is(Action::PitchDown) && vertical > -self.tuning.pitch_limit {
            local.x = -rate;
        }

        if intent.is(Action::YawLeft) {
            local.y = rate;
        } else if intent.is(Action::YawRight) {
            local.y = -rate;
        }

        local.z = self.roll_rate(intent);
        local
    }

    fn roll_rate(&self, intent: &ControlIntent) -> f32 {
        if intent.is(Action::RollLeft) {
            self.tuning.roll_speed
        } else if intent.is(Action::RollRight) {
            -self.tuning.roll_speed
        } else {
            0.0
        }
    }

    /// Orientation eased toward facing `aim`.
    pub fn aim_rotation(&self, position: Vec3, rotation: Quat, aim: Vec3, dt: f32) -> Quat {
        match look_rotation(aim - position, rotation * Vec3::Y) {
            Some(target) => rotation
                .slerp(target, smoothing_factor(self.tuning.aim_turn_rate, dt))
                .normalize(),
            None => rotation,
        }
    }

    /// Whether a shot may leave now. Records the shot time when it may.
    pub fn fire_ready(&mut self, intent: &ControlIntent, now: f32) -> bool {
        if !intent.is(Action::Fire) {
            return false;
        }
        let ready = self
            .last_fire
            .map_or(true, |last| now - last >= self.tuning.fire_interval);
        if ready {
            self.last_fire = Some(now);
        }
        ready
    }
}

/// Soft wall: a pull toward the origin once outside the play sphere.
pub fn containment_force(position: Vec3, tuning: &FlightTuning) -> Option<Vec3> {
    if position.length() <= tuning.play_radius {
        return None;
    }
    Some(-position.normalize_or_zero() * tuning.boundary_force)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::HullModel;
    use crate::config::HullTuning;
    use engine_core::{SceneGraph, Transform};

    fn setup(pose: Transform) -> (PhysicsWorld, Player, FlightController) {
        let mut physics = PhysicsWorld::new();
        let mut scene = SceneGraph::new();
        let model = HullModel::from_bounds("hull", Vec3::splat(-1.0), Vec3::splat(1.0));
        let player = Player::spawn(&mut physics, &mut scene, &model, &HullTuning::default(), pose).unwrap();
        let controller = FlightController::new(FlightTuning::default(), ControlMode::Keyboard);
        (physics, player, controller)
    }

    #[test]
    fn boost_triples_forward_thrust_but_not_reverse() {
        let controller = FlightController::new(FlightTuning::default(), ControlMode::Keyboard);
        let boosted = ControlIntent::with_actions(&[Action::ThrustForward, Action::Boost]);
        assert_eq!(controller.thrust(&boosted), Vec3::new(0.0, 0.0, -150.0));
        let reverse = ControlIntent::with_actions(&[Action::ThrustBackward, Action::Boost]);
        assert_eq!(controller.thrust(&reverse), Vec3::new(0.0, 0.0, 25.0));
    }

    #[test]
    fn forward_thrust_moves_along_the_nose() {
        let (mut physics, player, mut controller) = setup(Transform::default());
        let intent = ControlIntent::with_actions(&[Action::ThrustForward]);
        for _ in 0..60 {
            controller.apply(&mut physics, &player, &intent, None, 1.0 / 60.0);
            physics.step_variable(1.0 / 60.0);
        }
        let p = physics.position(player.body).unwrap();
        assert!(p.z < -1.0);
        assert!(p.x.abs() < 1e-3 && p.y.abs() < 1e-3);
    }

    #[test]
    fn forces_do_not_accumulate_across_frames() {
        let (mut physics, player, mut controller) = setup(Transform::default());
        let thrust = ControlIntent::with_actions(&[Action::ThrustForward]);
        controller.apply(&mut physics, &player, &thrust, None, 1.0 / 60.0);
        physics.step();
        controller.apply(&mut physics, &player, &ControlIntent::default(), None, 1.0 / 60.0);
        let before = physics.linear_velocity(player.body).unwrap().z;
        physics.step();
        let after = physics.linear_velocity(player.body).unwrap().z;
        // No thrust held: only damping acts, so forward speed shrinks.
        assert!(after > before);
    }

    #[test]
    fn brake_raises_damping_and_release_restores_it() {
        let (mut physics, player, mut controller) = setup(Transform::default());
        controller.apply(&mut physics, &player, &ControlIntent::with_actions(&[Action::Brake]), None, 0.016);
        assert!((physics.linear_damping(player.body).unwrap() - 0.95).abs() < 1e-4);
        controller.apply(&mut physics, &player, &ControlIntent::default(), None, 0.016);
        assert!((physics.linear_damping(player.body).unwrap() - 0.3).abs() < 1e-4);
    }

    #[test]
    fn lateral_drift_is_opposed_harder_while_strafing() {
        let controller = FlightController::new(FlightTuning::default(), ControlMode::Keyboard);
        let velocity = Vec3::new(4.0, 0.0, -10.0);
        let soft = controller.lateral_correction(Quat::IDENTITY, velocity, 5.0, false);
        let hard = controller.lateral_correction(Quat::IDENTITY, velocity, 5.0, true);
        assert!(soft.x < 0.0 && hard.x < soft.x);
        assert_eq!(soft.z, 0.0);
    }

    #[test]
    fn pitch_is_refused_near_vertical() {
        let controller = FlightController::new(FlightTuning::default(), ControlMode::Keyboard);
        let nose_up = Quat::from_rotation_x(1.5);
        let up = ControlIntent::with_actions(&[Action::PitchUp]);
        let down = ControlIntent::with_actions(&[Action::PitchDown]);
        assert_eq!(controller.keyboard_angular_velocity(nose_up, &up).x, 0.0);
        assert_eq!(controller.keyboard_angular_velocity(nose_up, &down).x, -2.5);
        assert_eq!(controller.keyboard_angular_velocity(Quat::IDENTITY, &up).x, 2.5);
    }

    #[test]
    fn rotation_is_written_in_world_space() {
        let pose = Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let (mut physics, player, mut controller) = setup(pose);
        let yaw = ControlIntent::with_actions(&[Action::YawLeft]);
        controller.apply(&mut physics, &player, &yaw, None, 1.0 / 60.0);
        // Rolled 90deg left, the hull's up axis is world -X.
        let w = physics.angular_velocity(player.body).unwrap();
        assert!((w - Vec3::new(-2.5, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn body_outside_the_play_sphere_is_pulled_home() {
        let tuning = FlightTuning::default();
        assert!(containment_force(Vec3::new(0.0, 0.0, -100.0), &tuning).is_none());
        let outside = Vec3::new(300.0, 0.0, -300.0);
        let force = containment_force(outside, &tuning).unwrap();
        assert!(force.dot(-outside) > 0.0);
        assert!((force.length() - tuning.boundary_force).abs() < 1e-3);

        let (mut physics, player, mut controller) = setup(Transform::from_position(outside));
        controller.apply(&mut physics, &player, &ControlIntent::default(), None, 1.0 / 60.0);
        physics.step();
        let v = physics.linear_velocity(player.body).unwrap();
        assert!(v.dot(-outside) > 0.0);
    }

    #[test]
    fn mouse_aim_turns_toward_the_cursor_point() {
        let (mut physics, player, mut controller) = setup(Transform::default());
        controller.mode = ControlMode::MouseAim;
        let aim = Vec3::new(-150.0, 0.0, 0.0);
        for _ in 0..120 {
            controller.apply(&mut physics, &player, &ControlIntent::default(), Some(aim), 1.0 / 60.0);
        }
        let forward = physics.rotation(player.body).unwrap() * -Vec3::Z;
        assert!(forward.dot(Vec3::NEG_X) > 0.99);
    }

    #[test]
    fn fire_is_rate_limited() {
        let mut controller = FlightController::new(FlightTuning::default(), ControlMode::Keyboard);
        let fire = ControlIntent::with_actions(&[Action::Fire]);
        assert!(controller.fire_ready(&fire, 1.0));
        assert!(!controller.fire_ready(&fire, 1.1));
        assert!(controller.fire_ready(&fire, 1.25));
        assert!(!controller.fire_ready(&ControlIntent::default(), 5.0));
    }
}
