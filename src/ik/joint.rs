use super::constraint::Constraint;
use crate::graph::{NodeId, TransformGraph};
use glam::Quat;

/// What a constraint needs to know about the joint it is bound to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointBinding {
    pub root: NodeId,
    pub initial_local_rotation: Quat,
}

/// One rotating link: `root` pivots, `tip` is the next node down the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    root: NodeId,
    tip: NodeId,
    initial_local_rotation: Quat,
    constraints: Vec<Constraint>,
}

impl Joint {
    /// Captures the root's current local rotation as the baseline and pulls
    /// the root's constraints, bound against that baseline.
    pub fn new<G: TransformGraph + ?Sized>(graph: &G, root: NodeId, tip: NodeId) -> Self {
        let mut joint = Self {
            root,
            tip,
            initial_local_rotation: graph.local_rotation(root),
            constraints: Vec::new(),
        };
        joint.pull_constraints(graph);
        joint
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tip(&self) -> NodeId {
        self.tip
    }

    pub fn initial_local_rotation(&self) -> Quat {
        self.initial_local_rotation
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn binding(&self) -> JointBinding {
        JointBinding {
            root: self.root,
            initial_local_rotation: self.initial_local_rotation,
        }
    }

    pub fn save_pose<G: TransformGraph + ?Sized>(&mut self, graph: &G) {
        self.initial_local_rotation = graph.local_rotation(self.root);
        self.bind_constraints();
    }

    pub fn reset_pose<G: TransformGraph + ?Sized>(&self, graph: &mut G) {
        graph.set_local_rotation(self.root, self.initial_local_rotation);
    }

    /// Re-reads the root's authored constraints. The baseline is kept.
    pub fn pull_constraints<G: TransformGraph + ?Sized>(&mut self, graph: &G) {
        self.constraints = graph.constraints(self.root).to_vec();
        self.bind_constraints();
    }

    fn bind_constraints(&mut self) {
        let binding = self.binding();
        for constraint in &mut self.constraints {
            constraint.bind(binding);
        }
    }

    pub fn apply_constraints<G: TransformGraph + ?Sized>(&self, graph: &mut G) {
        for constraint in &self.constraints {
            if let Err(err) = constraint.apply(graph) {
                log::warn!("joint {:?}: {err}", self.root);
            }
        }
    }
}
