use glam::{Quat, Vec3};

use super::{NodeId, TransformGraph};
use crate::error::GraphError;
use crate::ik::Constraint;
use crate::math::Transform;

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub local: Transform,
    pub constraints: Vec<Constraint>,
}

/// Append-only arena of named nodes with parent links.
///
/// World transforms are composed on demand by walking up the parents, so a
/// rotation written to one node is immediately visible on its descendants.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            revision: 0,
        }
    }

    pub fn add_root(&mut self, name: impl Into<String>, local: Transform) -> NodeId {
        self.push(name.into(), None, local)
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: NodeId,
        local: Transform,
    ) -> Result<NodeId, GraphError> {
        self.check(parent)?;
        Ok(self.push(name.into(), Some(parent), local))
    }

    fn push(&mut self, name: String, parent: Option<NodeId>, local: Transform) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            name,
            parent,
            local,
            constraints: Vec::new(),
        });
        self.revision += 1;
        id
    }

    fn check(&self, node: NodeId) -> Result<(), GraphError> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(node))
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node.index())
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId::from_index(i as u32))
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(node))
            .map(|(i, _)| NodeId::from_index(i as u32))
    }

    /// Re-parents `child`, keeping its local transform.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), GraphError> {
        self.check(child)?;

        if let Some(parent) = parent {
            self.check(parent)?;

            let mut ancestor = Some(parent);
            while let Some(id) = ancestor {
                if id == child {
                    return Err(GraphError::Cycle { child, parent });
                }
                ancestor = self.nodes[id.index()].parent;
            }
        }

        self.nodes[child.index()].parent = parent;
        self.revision += 1;
        Ok(())
    }

    /// Identity for a node that does not belong to this graph.
    pub fn world_transform(&self, node: NodeId) -> Transform {
        let Some(entry) = self.node(node) else {
            return Transform::IDENTITY;
        };
        match entry.parent {
            Some(parent) => self.world_transform(parent).then(&entry.local),
            None => entry.local,
        }
    }

    pub fn add_constraint(&mut self, node: NodeId, constraint: Constraint) -> Result<(), GraphError> {
        self.check(node)?;
        self.nodes[node.index()].constraints.push(constraint);
        self.revision += 1;
        Ok(())
    }

    /// Mutable access to a node's authored constraints. Counts as a structural
    /// edit, so chains built over this graph rebuild on their next update.
    pub fn constraints_mut(&mut self, node: NodeId) -> Option<&mut Vec<Constraint>> {
        let entry = self.nodes.get_mut(node.index())?;
        self.revision += 1;
        Some(&mut entry.constraints)
    }
}

/// Unknown handles read as an identity root node with no constraints, and
/// writes to them are dropped.
impl TransformGraph for SceneGraph {
    fn contains(&self, node: NodeId) -> bool {
        SceneGraph::contains(self, node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn local_rotation(&self, node: NodeId) -> Quat {
        self.node(node).map_or(Quat::IDENTITY, |n| n.local.rotation)
    }

    fn set_local_rotation(&mut self, node: NodeId, rotation: Quat) {
        if let Some(entry) = self.nodes.get_mut(node.index()) {
            entry.local.rotation = rotation;
        }
    }

    fn world_position(&self, node: NodeId) -> Vec3 {
        self.world_transform(node).position
    }

    fn world_rotation(&self, node: NodeId) -> Quat {
        self.world_transform(node).rotation
    }

    fn constraints(&self, node: NodeId) -> &[Constraint] {
        self.node(node)
            .map(|n| n.constraints.as_slice())
            .unwrap_or_default()
    }

    fn topology_revision(&self) -> u64 {
        self.revision
    }
}
