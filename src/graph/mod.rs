//! Host transform-graph interface
//!
//! The solver never owns nodes. It reaches the host hierarchy through
//! [`TransformGraph`] using plain [`NodeId`] handles, resolved on every
//! access. [`SceneGraph`] is a small arena implementation used by the demo
//! and the tests; real hosts implement the trait over their own hierarchy.

mod scene;

pub use scene::{SceneGraph, SceneNode};

use glam::{Quat, Vec3};

use crate::ik::Constraint;

/// Non-owning handle to a node in a host graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What the IK core needs from the host hierarchy.
///
/// Calls are serialized by the host: nothing here is expected to be
/// reentrant, and a chain is never rebuilt while it is being solved.
pub trait TransformGraph {
    /// Whether `node` resolves in this graph. Chains built over a handle
    /// that does not resolve are reported invalid instead of being walked.
    fn contains(&self, _node: NodeId) -> bool {
        true
    }

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn local_rotation(&self, node: NodeId) -> Quat;

    fn set_local_rotation(&mut self, node: NodeId, rotation: Quat);

    fn world_position(&self, node: NodeId) -> Vec3;

    fn world_rotation(&self, node: NodeId) -> Quat;

    /// Local-space direction of `node` expressed in world space.
    fn transform_direction(&self, node: NodeId, direction: Vec3) -> Vec3 {
        self.world_rotation(node) * direction
    }

    /// Writes a world-space rotation by converting it through the parent.
    fn set_world_rotation(&mut self, node: NodeId, rotation: Quat) {
        let parent_rotation = self
            .parent(node)
            .map_or(Quat::IDENTITY, |parent| self.world_rotation(parent));
        self.set_local_rotation(node, (parent_rotation.inverse() * rotation).normalize());
    }

    /// Authored constraints attached to `node`, in application order.
    fn constraints(&self, _node: NodeId) -> &[Constraint] {
        &[]
    }

    /// Counter the host bumps whenever parenting (or the constraint set of
    /// any node) changes. Chains compare it to decide whether to rebuild.
    fn topology_revision(&self) -> u64 {
        0
    }
}
