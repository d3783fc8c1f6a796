//! Read-only views of a chain for hosts that draw or log it.

use super::chain::{Chain, ChainStatus};
use super::constraint::{Constraint, RotationLimit};
use super::joint::Joint;
use super::solver::SolverResult;
use crate::graph::{NodeId, TransformGraph};
use glam::{Quat, Vec3};

/// World-space geometry of one rotation limit.
///
/// `axis`, `start` and `end` follow the baseline pose; `center` follows the
/// joint's current rotation, so it sweeps between `start` and `end` as the
/// joint turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitGizmo {
    pub origin: Vec3,
    pub axis: Vec3,
    pub center: Vec3,
    pub start: Vec3,
    pub end: Vec3,
    /// Half-angle of the allowed arc in radians.
    pub range: f32,
}

impl LimitGizmo {
    /// Whether the arc covers a full turn, in which case `start` and `end`
    /// carry no information.
    pub fn is_unbounded(&self) -> bool {
        self.range >= std::f32::consts::PI
    }

    fn from_limit<G: TransformGraph + ?Sized>(
        graph: &G,
        joint: &Joint,
        limit: &RotationLimit,
    ) -> Self {
        let root = joint.root();
        let baseline = joint.initial_local_rotation();
        let through_parent = |v: Vec3| match graph.parent(root) {
            Some(parent) => graph.transform_direction(parent, baseline * v),
            None => baseline * v,
        };

        Self {
            origin: graph.world_position(root),
            axis: through_parent(limit.axis()),
            center: graph.transform_direction(root, limit.range_center()),
            start: through_parent(limit.range_start()),
            end: through_parent(limit.range_end()),
            range: limit.range(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointSnapshot {
    pub root: NodeId,
    pub tip: NodeId,
    pub root_position: Vec3,
    pub tip_position: Vec3,
    pub root_rotation: Quat,
    pub limits: Vec<LimitGizmo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainSnapshot {
    pub status: ChainStatus,
    pub joints: Vec<JointSnapshot>,
    pub last_result: Option<SolverResult>,
}

impl ChainSnapshot {
    pub fn tip_position(&self) -> Option<Vec3> {
        self.joints.last().map(|j| j.tip_position)
    }
}

/// Receives a snapshot after each frame a host chooses to report.
pub trait ChainObserver {
    fn observe(&mut self, snapshot: &ChainSnapshot);
}

impl<F: FnMut(&ChainSnapshot)> ChainObserver for F {
    fn observe(&mut self, snapshot: &ChainSnapshot) {
        self(snapshot)
    }
}

impl Chain {
    pub fn snapshot<G: TransformGraph + ?Sized>(&self, graph: &G) -> ChainSnapshot {
        let joints = self
            .joints()
            .iter()
            .map(|joint| JointSnapshot {
                root: joint.root(),
                tip: joint.tip(),
                root_position: graph.world_position(joint.root()),
                tip_position: graph.world_position(joint.tip()),
                root_rotation: graph.world_rotation(joint.root()),
                limits: joint
                    .constraints()
                    .iter()
                    .map(|constraint| match constraint {
                        Constraint::RotationLimit(limit) => {
                            LimitGizmo::from_limit(graph, joint, limit)
                        }
                    })
                    .collect(),
            })
            .collect();

        ChainSnapshot {
            status: self.status(),
            joints,
            last_result: self.last_result(),
        }
    }
}
