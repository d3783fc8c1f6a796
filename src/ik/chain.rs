use super::joint::Joint;
use super::solver::{CcdSolver, SolverResult};
use crate::config::SolverConfig;
use crate::error::ConfigError;
use crate::graph::{NodeId, TransformGraph};
use glam::{Quat, Vec3};

/// Why a chain can or cannot be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    /// Root and tip resolve and at least one joint lies between them.
    Valid,
    /// No root node was set, or the graph does not know it.
    MissingRoot,
    /// No tip node was set, or the graph does not know it.
    MissingTip,
    /// The tip is a top-level node, so there is no joint to turn.
    TipWithoutParent,
    /// Root and tip are the same node.
    RootEqualsTip,
}

impl ChainStatus {
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Valid => "chain is valid",
            Self::MissingRoot => "root joint is missing",
            Self::MissingTip => "tip joint is missing",
            Self::TipWithoutParent => "tip joint has no parent, therefore it cannot be a tip",
            Self::RootEqualsTip => "root and tip joint are the same node",
        }
    }
}

/// Joints from an anchored root node down to a target-following tip node.
///
/// The chain only holds [`NodeId`] handles; every pose read and write goes
/// through the [`TransformGraph`] passed to each call.
#[derive(Debug, Clone)]
pub struct Chain {
    root_node: Option<NodeId>,
    tip_node: Option<NodeId>,
    joints: Vec<Joint>,
    config: SolverConfig,
    status: ChainStatus,
    root_reached: bool,
    dirty: bool,
    built_revision: Option<u64>,
    last_result: Option<SolverResult>,
}

impl Chain {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            root_node: None,
            tip_node: None,
            joints: Vec::new(),
            config,
            status: ChainStatus::MissingRoot,
            root_reached: false,
            dirty: true,
            built_revision: None,
            last_result: None,
        }
    }

    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn root_node(&self) -> Option<NodeId> {
        self.root_node
    }

    pub fn tip_node(&self) -> Option<NodeId> {
        self.tip_node
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn status(&self) -> ChainStatus {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_valid() && !self.joints.is_empty()
    }

    /// False when the last rebuild ran out of ancestors before meeting the
    /// root node. Such a chain still solves, from the topmost ancestor down.
    pub fn root_reached(&self) -> bool {
        self.root_reached
    }

    pub fn last_result(&self) -> Option<SolverResult> {
        self.last_result
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_config(&mut self, config: SolverConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_root(&mut self, root: Option<NodeId>) {
        if self.root_node != root {
            self.root_node = root;
            self.dirty = true;
        }
    }

    pub fn set_tip(&mut self, tip: Option<NodeId>) {
        if self.tip_node != tip {
            self.tip_node = tip;
            self.dirty = true;
        }
    }

    /// Flags a structural change the graph's revision counter cannot see.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.joints.iter().any(|j| j.root() == node || j.tip() == node)
    }

    /// Sum of root-to-tip distances over all joints in the current pose.
    pub fn total_length<G: TransformGraph + ?Sized>(&self, graph: &G) -> f32 {
        self.joints
            .iter()
            .map(|j| graph.world_position(j.root()).distance(graph.world_position(j.tip())))
            .sum()
    }

    /// World position and rotation of the end of the chain.
    pub fn tip_pose<G: TransformGraph + ?Sized>(&self, graph: &G) -> Option<(Vec3, Quat)> {
        self.joints
            .last()
            .map(|j| (graph.world_position(j.tip()), graph.world_rotation(j.tip())))
    }

    fn check_nodes<G: TransformGraph + ?Sized>(&self, graph: &G) -> ChainStatus {
        let Some(root) = self.root_node.filter(|&n| graph.contains(n)) else {
            return ChainStatus::MissingRoot;
        };
        let Some(tip) = self.tip_node.filter(|&n| graph.contains(n)) else {
            return ChainStatus::MissingTip;
        };
        if graph.parent(tip).is_none() {
            return ChainStatus::TipWithoutParent;
        }
        if root == tip {
            return ChainStatus::RootEqualsTip;
        }
        ChainStatus::Valid
    }

    /// Walks up from the tip, one joint per parent step, until the root node
    /// or the top of the hierarchy. Returns the joints root-first and whether
    /// the root node was met.
    fn walk_up<G: TransformGraph + ?Sized>(
        graph: &G,
        root: NodeId,
        tip: NodeId,
        tip_parent: NodeId,
    ) -> (Vec<Joint>, bool) {
        let mut joints = vec![Joint::new(graph, tip_parent, tip)];
        let mut pivot = tip_parent;

        while pivot != root {
            let Some(up) = graph.parent(pivot) else {
                break;
            };
            joints.push(Joint::new(graph, up, pivot));
            pivot = up;
        }

        joints.reverse();
        (joints, pivot == root)
    }

    /// Recomputes the joints from the root and tip nodes.
    ///
    /// Joints whose root and tip are unchanged keep their baseline rotation;
    /// every joint re-reads its constraints and rebinds them.
    pub fn rebuild<G: TransformGraph + ?Sized>(&mut self, graph: &G) {
        self.dirty = false;
        self.built_revision = Some(graph.topology_revision());
        self.status = self.check_nodes(graph);

        let (Some(root), Some(tip), Some(tip_parent), true) = (
            self.root_node,
            self.tip_node,
            self.tip_node.and_then(|tip| graph.parent(tip)),
            self.status.is_valid(),
        ) else {
            log::warn!("IK chain disabled: {}", self.status.describe());
            self.joints.clear();
            self.root_reached = false;
            return;
        };

        let (fresh, root_reached) = Self::walk_up(graph, root, tip, tip_parent);
        self.root_reached = root_reached;
        if !root_reached {
            log::warn!(
                "root node {root:?} is not an ancestor of tip {tip:?}; chain stops at the topmost ancestor"
            );
        }

        if self.joints.len() != fresh.len() {
            self.joints = fresh;
        } else {
            for (existing, fresh) in self.joints.iter_mut().zip(fresh) {
                if existing.root() != fresh.root() || existing.tip() != fresh.tip() {
                    *existing = fresh;
                }
            }
        }

        for joint in &mut self.joints {
            joint.pull_constraints(graph);
        }

        log::debug!("IK chain rebuilt with {} joints", self.joints.len());
    }

    /// Rebuilds when the chain was reconfigured or the graph's topology
    /// revision moved since the last build. Returns whether it rebuilt.
    pub fn rebuild_if_dirty<G: TransformGraph + ?Sized>(&mut self, graph: &G) -> bool {
        if self.dirty || self.built_revision != Some(graph.topology_revision()) {
            self.rebuild(graph);
            true
        } else {
            false
        }
    }

    /// Takes the current pose as every joint's baseline.
    pub fn save_pose<G: TransformGraph + ?Sized>(&mut self, graph: &G) {
        for joint in &mut self.joints {
            joint.save_pose(graph);
        }
        log::debug!("IK pose saved for {} joints", self.joints.len());
    }

    /// Writes every joint's baseline back onto the graph.
    pub fn reset_pose<G: TransformGraph + ?Sized>(&self, graph: &mut G) {
        for joint in &self.joints {
            joint.reset_pose(graph);
        }
        log::debug!("IK pose reset for {} joints", self.joints.len());
    }

    /// Re-reads every joint's constraints after authored parameters changed.
    pub fn pull_constraints<G: TransformGraph + ?Sized>(&mut self, graph: &G) {
        for joint in &mut self.joints {
            joint.pull_constraints(graph);
        }
    }

    /// One CCD solve toward the target pose. Skipped (returns `None`) while
    /// the chain is invalid.
    pub fn solve<G: TransformGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        target_position: Vec3,
        target_rotation: Quat,
    ) -> Option<SolverResult> {
        if !self.is_valid() {
            return None;
        }

        let result = CcdSolver::solve(self, graph, target_position, target_rotation);
        log::trace!(
            "IK solve: {:.2} iterations, distance {:.5}, rotation {:.4} rad",
            result.used_iterations,
            result.distance_to_target,
            result.rotation_to_target
        );
        self.last_result = Some(result);
        Some(result)
    }

    /// Per-frame tick: rebuild if needed, then solve.
    pub fn update<G: TransformGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        target_position: Vec3,
        target_rotation: Quat,
    ) -> Option<SolverResult> {
        self.rebuild_if_dirty(&*graph);
        self.solve(graph, target_position, target_rotation)
    }
}

pub struct ChainBuilder {
    root: Option<NodeId>,
    tip: Option<NodeId>,
    config: SolverConfig,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            root: None,
            tip: None,
            config: SolverConfig::default(),
        }
    }

    pub fn root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn tip(mut self, tip: NodeId) -> Self {
        self.tip = Some(tip);
        self
    }

    pub fn config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn iterations_per_frame(mut self, iterations: u32) -> Self {
        self.config.iterations_per_frame = iterations;
        self
    }

    pub fn orientation_matching_joints(mut self, joints: usize) -> Self {
        self.config.orientation_matching_joints = joints;
        self
    }

    pub fn tolerance(mut self, tolerance: f32) -> Self {
        self.config.tolerance_distance = tolerance;
        self
    }

    pub fn build<G: TransformGraph + ?Sized>(self, graph: &G) -> Chain {
        if let Err(err) = self.config.validate() {
            log::warn!("IK chain built with invalid solver settings: {err}");
        }

        let mut chain = Chain::new(self.config);
        chain.root_node = self.root;
        chain.tip_node = self.tip;
        chain.rebuild(graph);
        chain
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
