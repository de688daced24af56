//! Common ECS components attached to scene-graph nodes.

/// What a visual node represents, so an external renderer knows which
/// mesh or sprite to draw for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Empty grouping node (player root, gimbal).
    Group,
    /// Loaded model (player hull).
    Model,
    /// Camera-facing sprite (projectile energy blast).
    Billboard,
    /// Decorative showcase object.
    Decoration,
}

/// Scene-graph bookkeeping for a visual node.
#[derive(Debug, Clone, Copy)]
pub struct VisualNode {
    pub kind: NodeKind,
    pub parent: Option<hecs::Entity>,
}

/// Marker: the node is currently part of the rendered scene.
#[derive(Debug, Clone, Copy, Default)]
pub struct Attached;
