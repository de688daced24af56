//! The player craft: one hull body plus its visual node tree.

use crate::assets::HullModel;
use crate::config::HullTuning;
use engine_core::{NodeId, NodeKind, SceneError, SceneGraph, Transform};
use glam::{Quat, Vec3};
use physics::{CollisionGroup, PhysicsWorld, RigidBodyHandle, SphereBodyDesc};

/// Hull body, root visual, cosmetic gimbal and the model under it.
///
/// The root follows the body through interpolation; the gimbal adds tilt and
/// bank on top without ever feeding back into physics.
#[derive(Debug, Clone)]
pub struct Player {
    pub body: RigidBodyHandle,
    pub root: NodeId,
    pub gimbal: NodeId,
    pub model: NodeId,
    /// Linear damping at creation, restored when the brake is released.
    pub original_linear_damping: f32,
    /// Current gimbal pitch offset in radians.
    pub tilt: f32,
    /// Current gimbal roll offset in radians.
    pub bank: f32,
}

impl Player {
    pub fn spawn(
        physics: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        model: &HullModel,
        tuning: &HullTuning,
        pose: Transform,
    ) -> Result<Self, SceneError> {
        let (body, _) = physics.add_sphere_body(&SphereBodyDesc {
            position: pose.position,
            rotation: pose.rotation,
            linear_damping: tuning.linear_damping,
            angular_damping: tuning.angular_damping,
            groups: CollisionGroup::player(),
            ..SphereBodyDesc::new(tuning.radius, tuning.mass)
        });

        let root = scene.spawn_attached(NodeKind::Group, pose, None)?;
        let gimbal = scene.spawn_attached(NodeKind::Group, Transform::default(), Some(root))?;
        // Hull models face +Z; the craft flies along -Z.
        let facing = Quat::from_rotation_y(std::f32::consts::PI);
        let scale = model.normalising_scale(tuning.visual_size);
        let model_local = Transform::from_position_rotation(-(facing * model.center()) * scale, facing)
            .with_uniform_scale(scale);
        let model = scene.spawn_attached(NodeKind::Model, model_local, Some(gimbal))?;

        Ok(Self {
            body,
            root,
            gimbal,
            model,
            original_linear_damping: tuning.linear_damping,
            tilt: 0.0,
            bank: 0.0,
        })
    }

    /// Current rigid-body pose.
    pub fn body_transform(&self, physics: &PhysicsWorld) -> Transform {
        physics.get_body_transform(self.body).unwrap_or_default()
    }

    /// Current interpolated visual pose of the root node.
    pub fn visual_transform(&self, scene: &SceneGraph) -> Transform {
        scene.local(self.root).unwrap_or_default()
    }

    pub fn gimbal_rotation(&self) -> Quat {
        Quat::from_rotation_x(self.tilt) * Quat::from_rotation_z(self.bank)
    }

    pub fn speed(&self, physics: &PhysicsWorld) -> f32 {
        physics
            .linear_velocity(self.body)
            .map(Vec3::length)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_player(pose: Transform) -> (PhysicsWorld, SceneGraph, Player) {
        let mut physics = PhysicsWorld::new();
        let mut scene = SceneGraph::new();
        let model = HullModel::from_bounds("hull", Vec3::new(-1.0, 0.0, -2.0), Vec3::new(1.0, 1.0, 2.0));
        let player = Player::spawn(&mut physics, &mut scene, &model, &HullTuning::default(), pose).unwrap();
        (physics, scene, player)
    }

    #[test]
    fn visual_starts_snapped_to_body() {
        let pose = Transform::from_position_rotation(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.5));
        let (physics, scene, player) = spawn_player(pose);
        let body = player.body_transform(&physics);
        let visual = player.visual_transform(&scene);
        assert!(body.position.distance(visual.position) < 1e-5);
        assert!(body.rotation.angle_between(visual.rotation) < 1e-4);
    }

    #[test]
    fn hull_carries_configured_mass_and_damping() {
        let (physics, _, player) = spawn_player(Transform::default());
        assert!((physics.mass(player.body).unwrap() - 5.0).abs() < 1e-4);
        assert!((physics.linear_damping(player.body).unwrap() - 0.3).abs() < 1e-4);
        assert_eq!(player.original_linear_damping, 0.3);
    }

    #[test]
    fn model_is_normalised_and_centred() {
        let (_, scene, player) = spawn_player(Transform::default());
        let model = scene.world_transform(player.model).unwrap();
        // Largest extent 4 scaled to 1.6.
        assert!((model.scale.x - 0.4).abs() < 1e-6);
        assert!((model.position - Vec3::new(0.0, -0.2, 0.0)).length() < 1e-5);
        // The model's +Z nose points along the body's -Z flight axis.
        assert!((model.rotation * Vec3::Z - Vec3::NEG_Z).length() < 1e-5);
        let nose = model.transform_point(Vec3::new(0.0, 0.5, 2.0));
        assert!((nose - Vec3::new(0.0, 0.0, -0.8)).length() < 1e-5);
        assert!(scene.is_visible(player.model));
    }
}
