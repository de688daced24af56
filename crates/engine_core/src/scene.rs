//! Scene graph of visual nodes, stored in a hecs world.
//!
//! Nodes are never physically simulated; gameplay code drives their local
//! transforms by interpolating toward rigid bodies. A node is part of the
//! rendered scene only while it carries the [`Attached`] marker, so pooled
//! visuals can leave and re-enter the scene without being despawned.

use crate::components::{Attached, NodeKind, VisualNode};
use crate::transform::{Transform, TransformRaw};
use hecs::{Entity, World};
use thiserror::Error;

/// Handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Entity);

impl NodeId {
    pub fn entity(self) -> Entity {
        self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene node {0:?} does not exist")]
    UnknownNode(NodeId),
}

/// Owner of every visual node and its local transform.
#[derive(Default)]
pub struct SceneGraph {
    world: World,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node. `parent`, if any, must already exist.
    pub fn spawn(
        &mut self,
        kind: NodeKind,
        local: Transform,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            self.ensure_exists(parent)?;
        }
        let entity = self.world.spawn((
            local,
            VisualNode {
                kind,
                parent: parent.map(NodeId::entity),
            },
        ));
        Ok(NodeId(entity))
    }

    /// Create a node and attach it to the scene immediately.
    pub fn spawn_attached(
        &mut self,
        kind: NodeKind,
        local: Transform,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        let id = self.spawn(kind, local, parent)?;
        self.attach(id)?;
        Ok(id)
    }

    /// Add a node to the rendered scene. Returns `false` if it already was.
    pub fn attach(&mut self, id: NodeId) -> Result<bool, SceneError> {
        if self.is_attached(id) {
            return Ok(false);
        }
        self.world
            .insert_one(id.0, Attached)
            .map_err(|_| SceneError::UnknownNode(id))?;
        Ok(true)
    }

    /// Remove a node from the rendered scene. Returns `false` if it was not in it.
    pub fn detach(&mut self, id: NodeId) -> Result<bool, SceneError> {
        self.ensure_exists(id)?;
        Ok(self.world.remove_one::<Attached>(id.0).is_ok())
    }

    /// Whether the node is currently part of the rendered scene.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.world
            .entity(id.0)
            .map(|entity| entity.has::<Attached>())
            .unwrap_or(false)
    }

    /// Destroy a node outright.
    pub fn despawn(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.world
            .despawn(id.0)
            .map_err(|_| SceneError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.world.contains(id.0)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.world.get::<&VisualNode>(id.0).ok().map(|node| node.kind)
    }

    /// Local transform relative to the parent.
    pub fn local(&self, id: NodeId) -> Option<Transform> {
        self.world.get::<&Transform>(id.0).ok().map(|t| *t)
    }

    pub fn set_local(&mut self, id: NodeId, local: Transform) -> Result<(), SceneError> {
        let mut slot = self
            .world
            .get::<&mut Transform>(id.0)
            .map_err(|_| SceneError::UnknownNode(id))?;
        *slot = local;
        Ok(())
    }

    /// Mutate a node's local transform in place.
    pub fn update_local(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Transform),
    ) -> Result<(), SceneError> {
        let mut slot = self
            .world
            .get::<&mut Transform>(id.0)
            .map_err(|_| SceneError::UnknownNode(id))?;
        f(&mut slot);
        Ok(())
    }

    /// World transform, composed through the parent chain.
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let local = self.local(id)?;
        let parent = self.world.get::<&VisualNode>(id.0).ok()?.parent;
        match parent {
            Some(parent) => {
                let parent_world = self.world_transform(NodeId(parent))?;
                Some(parent_world.mul_transform(&local))
            }
            None => Some(local),
        }
    }

    /// Map a point in the node's local space to world space.
    pub fn local_to_world(&self, id: NodeId, point: glam::Vec3) -> Option<glam::Vec3> {
        self.world_transform(id).map(|t| t.transform_point(point))
    }

    /// Whether the node and every ancestor are attached.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id.0);
        while let Some(entity) = current {
            if !self.is_attached(NodeId(entity)) {
                return false;
            }
            current = match self.world.get::<&VisualNode>(entity) {
                Ok(node) => node.parent,
                Err(_) => return false,
            };
        }
        true
    }

    /// Number of attached nodes.
    pub fn attached_count(&self) -> usize {
        self.world.query::<&Attached>().iter().count()
    }

    /// Visible leaf-level draw data: node kind plus world model matrix.
    pub fn instance_data(&self) -> Vec<(NodeKind, TransformRaw)> {
        let ids: Vec<(NodeId, NodeKind)> = self
            .world
            .query::<&VisualNode>()
            .with::<&Attached>()
            .iter()
            .map(|(entity, node)| (NodeId(entity), node.kind))
            .filter(|(_, kind)| *kind != NodeKind::Group)
            .collect();
        ids.into_iter()
            .filter(|(id, _)| self.is_visible(*id))
            .filter_map(|(id, kind)| {
                self.world_transform(id)
                    .map(|t| (kind, TransformRaw::from(t)))
            })
            .collect()
    }

    fn ensure_exists(&self, id: NodeId) -> Result<(), SceneError> {
        if self.world.contains(id.0) {
            Ok(())
        } else {
            Err(SceneError::UnknownNode(id))
        }
    }
}
