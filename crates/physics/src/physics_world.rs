//! Physics world management with Rapier3D.
//!
//! The world runs without gravity. Each frame hands its variable delta to
//! [`PhysicsWorld::step_variable`], which advances the simulation in fixed
//! sub-steps. Pooled bodies are disabled rather than removed so their
//! handles stay valid across reuse.

use crate::collision::CollisionGroup;
use engine_core::{FixedStep, Quat, Transform, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// Default fixed sub-step (60 Hz).
pub const DEFAULT_FIXED_STEP: f32 = 1.0 / 60.0;
/// Default cap on sub-steps per frame.
pub const DEFAULT_MAX_SUBSTEPS: u32 = 3;

/// Convert "fraction of velocity lost per second" damping into rapier's
/// damping rate.
///
/// Rapier scales velocity by `1 / (1 + dt * rate)` per step, which is the
/// continuous decay `e^(-rate * t)`; a fraction `f` removed per second
/// therefore maps to `-ln(1 - f)`.
pub fn damping_rate(fraction_per_second: f32) -> f32 {
    let fraction = fraction_per_second.clamp(0.0, 0.999);
    -(1.0 - fraction).ln()
}

pub fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_rotation(q: Quat) -> Rotation<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub fn from_rotation(rot: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w).normalize()
}

/// Everything needed to create a dynamic sphere body.
#[derive(Debug, Clone, Copy)]
pub struct SphereBodyDesc {
    pub position: Vec3,
    pub rotation: Quat,
    pub radius: f32,
    pub mass: f32,
    /// Fraction of linear velocity removed per second.
    pub linear_damping: f32,
    /// Fraction of angular velocity removed per second.
    pub angular_damping: f32,
    pub groups: (Group, Group),
    pub enabled: bool,
    pub lock_rotations: bool,
}

impl SphereBodyDesc {
    pub fn new(radius: f32, mass: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            radius,
            mass,
            linear_damping: 0.0,
            angular_damping: 0.0,
            groups: (Group::ALL, Group::ALL),
            enabled: true,
            lock_rotations: false,
        }
    }
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    stepper: FixedStep,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a zero-gravity world stepping at 60 Hz with up to 3 sub-steps.
    pub fn new() -> Self {
        Self::with_step(DEFAULT_FIXED_STEP, DEFAULT_MAX_SUBSTEPS)
    }

    /// Create a zero-gravity world with a custom fixed step.
    pub fn with_step(fixed_step: f32, max_substeps: u32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = fixed_step;
        log::debug!(
            "Physics world: {:.4}s fixed step, up to {} sub-steps per frame",
            fixed_step,
            max_substeps
        );
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, 0.0, 0.0],
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            stepper: FixedStep::new(fixed_step, max_substeps),
        }
    }

    /// Step the physics simulation by exactly one fixed step.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Advance by a variable frame delta using fixed sub-steps.
    /// Returns the number of sub-steps taken.
    pub fn step_variable(&mut self, dt: f32) -> u32 {
        let substeps = self.stepper.consume(dt);
        for _ in 0..substeps {
            self.step();
        }
        substeps
    }

    pub fn fixed_step(&self) -> f32 {
        self.stepper.step()
    }

    /// Add a dynamic sphere body with its collider.
    pub fn add_sphere_body(&mut self, desc: &SphereBodyDesc) -> (RigidBodyHandle, ColliderHandle) {
        let mut builder = RigidBodyBuilder::dynamic()
            .position(Isometry3::from_parts(
                Translation3::new(desc.position.x, desc.position.y, desc.position.z),
                to_rotation(desc.rotation),
            ))
            .linear_damping(damping_rate(desc.linear_damping))
            .angular_damping(damping_rate(desc.angular_damping))
            .can_sleep(false)
            .enabled(desc.enabled);
        if desc.lock_rotations {
            builder = builder.lock_rotations();
        }
        let body_handle = self.rigid_body_set.insert(builder.build());
        let collider = ColliderBuilder::ball(desc.radius)
            .mass(desc.mass)
            .friction(0.2)
            .restitution(0.1)
            .collision_groups(CollisionGroup::interaction_groups(desc.groups))
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);
        (body_handle, collider_handle)
    }

    /// Whether the body exists and currently takes part in the simulation.
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .get(handle)
            .map(|body| body.is_enabled())
            .unwrap_or(false)
    }

    /// Enable or disable a body (and its colliders). Disabled bodies are
    /// neither simulated nor collided with.
    pub fn set_enabled(&mut self, handle: RigidBodyHandle, enabled: bool) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_enabled(enabled);
        }
    }

    /// Get the transform of a rigid body.
    pub fn get_body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.rigid_body_set.get(handle).map(|body| {
            Transform::from_position_rotation(
                from_vector(body.translation()),
                from_rotation(body.rotation()),
            )
        })
    }

    pub fn position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.translation()))
    }

    pub fn rotation(&self, handle: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_rotation(body.rotation()))
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.linvel()))
    }

    pub fn angular_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.angvel()))
    }

    /// Teleport a body, leaving its velocity untouched.
    pub fn set_pose(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(to_vector(position), true);
            body.set_rotation(to_rotation(rotation), true);
        }
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_angvel(to_vector(velocity), true);
        }
    }

    /// Clear the constant forces accumulated on a body. Rapier keeps user
    /// forces across steps, so per-frame controllers reset before applying.
    pub fn reset_forces(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.reset_forces(true);
        }
    }

    /// Add a world-space force at the centre of mass.
    pub fn apply_force(&mut self, handle: RigidBodyHandle, force: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.add_force(to_vector(force), true);
        }
    }

    /// Add a body-local force at the centre of mass.
    pub fn apply_local_force(&mut self, handle: RigidBodyHandle, local_force: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let world = body.rotation() * to_vector(local_force);
            body.add_force(world, true);
        }
    }

    /// Apply an impulse to a dynamic body.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.apply_impulse(to_vector(impulse), true);
        }
    }

    /// Linear damping as a fraction of velocity removed per second.
    pub fn linear_damping(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set
            .get(handle)
            .map(|body| 1.0 - (-body.linear_damping()).exp())
    }

    /// Set linear damping as a fraction of velocity removed per second.
    pub fn set_linear_damping(&mut self, handle: RigidBodyHandle, fraction_per_second: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linear_damping(damping_rate(fraction_per_second));
        }
    }

    pub fn mass(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle).map(|body| body.mass())
    }

    /// Number of bodies currently taking part in the simulation.
    pub fn enabled_body_count(&self) -> usize {
        self.rigid_body_set
            .iter()
            .filter(|(_, body)| body.is_enabled())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hull_desc() -> SphereBodyDesc {
        SphereBodyDesc {
            linear_damping: 0.3,
            angular_damping: 0.8,
            ..SphereBodyDesc::new(0.8, 5.0)
        }
    }

    #[test]
    fn damping_rate_round_trips_through_world() {
        let mut world = PhysicsWorld::new();
        let (body, _) = world.add_sphere_body(&hull_desc());
        let fraction = world.linear_damping(body).unwrap();
        assert!((fraction - 0.3).abs() < 1e-4);
        world.set_linear_damping(body, 0.95);
        assert!((world.linear_damping(body).unwrap() - 0.95).abs() < 1e-4);
    }

    #[test]
    fn constant_thrust_matches_closed_form() {
        let mut world = PhysicsWorld::new();
        let (body, _) = world.add_sphere_body(&hull_desc());
        let force = 50.0;
        let steps = 120;
        for _ in 0..steps {
            world.reset_forces(body);
            world.apply_local_force(body, Vec3::new(0.0, 0.0, -force));
            world.step();
        }

        // dv/dt = a - k v  =>  v = a/k (1 - e^-kt),  x = a/k (t - (1 - e^-kt)/k)
        let k = damping_rate(0.3);
        let a = force / 5.0;
        let t = steps as f32 * DEFAULT_FIXED_STEP;
        let decay = 1.0 - (-k * t).exp();
        let expected_v = a / k * decay;
        let expected_x = a / k * (t - decay / k);

        let v = world.linear_velocity(body).unwrap();
        let p = world.position(body).unwrap();
        assert!(v.x.abs() < 1e-3 && v.y.abs() < 1e-3);
        assert!(((-v.z) - expected_v).abs() / expected_v < 0.04, "v {} vs {}", -v.z, expected_v);
        assert!(((-p.z) - expected_x).abs() / expected_x < 0.04, "x {} vs {}", -p.z, expected_x);
    }

    #[test]
    fn disabled_bodies_do_not_move() {
        let mut world = PhysicsWorld::new();
        let (body, _) = world.add_sphere_body(&SphereBodyDesc {
            enabled: false,
            ..SphereBodyDesc::new(0.2, 0.1)
        });
        world.set_linear_velocity(body, Vec3::new(0.0, 0.0, -150.0));
        assert!(!world.contains(body));
        world.step();
        assert_eq!(world.position(body), Some(Vec3::ZERO));

        world.set_enabled(body, true);
        assert!(world.contains(body));
        world.step();
        assert!(world.position(body).unwrap().z < 0.0);
    }

    #[test]
    fn step_variable_runs_bounded_substeps() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.step_variable(1.0 / 60.0 + 1e-5), 1);
        assert_eq!(world.step_variable(0.5), DEFAULT_MAX_SUBSTEPS);
        assert_eq!(world.step_variable(0.0), 0);

        let mut world = PhysicsWorld::new();
        assert_eq!(world.step_variable(f32::INFINITY), 0);
        assert_eq!(world.step_variable(1.0 / 30.0 + 1e-5), 2);
    }

    #[test]
    fn local_force_follows_orientation() {
        let mut world = PhysicsWorld::new();
        let (body, _) = world.add_sphere_body(&SphereBodyDesc {
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..SphereBodyDesc::new(0.5, 1.0)
        });
        world.apply_local_force(body, Vec3::new(0.0, 0.0, -10.0));
        world.step();
        let v = world.linear_velocity(body).unwrap();
        // Local forward (-Z) yawed 90deg left is world -X.
        assert!(v.x < 0.0);
        assert!(v.z.abs() < 1e-3);
    }
}
