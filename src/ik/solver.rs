use super::chain::Chain;
use super::joint::Joint;
use crate::graph::{NodeId, TransformGraph};
use crate::math::{from_to_rotation, rotation_angle};
use glam::{Quat, Vec3};

const STALL_COSINE_EPSILON: f32 = 1e-6;
const MIN_LINK_LENGTH: f32 = 1e-6;

/// Outcome of one [`CcdSolver::solve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolverResult {
    /// Whole sweeps plus the fraction of the last sweep that ran.
    pub used_iterations: f32,
    /// Tip-to-target distance when the solve returned.
    pub distance_to_target: f32,
    /// Angle in radians between tip and target orientation.
    pub rotation_to_target: f32,
    /// `distance_to_target` was below the chain's tolerance.
    pub converged: bool,
}

/// Local rotations from just before a stall unfold, and the tip distance
/// the unfold has to beat.
#[derive(Debug, Clone, Copy)]
struct Unfold {
    joint: NodeId,
    joint_rotation: Quat,
    parent_rotation: Quat,
    distance: f32,
}

/// Cyclic Coordinate Descent over a [`Chain`] living in a host graph.
pub struct CcdSolver;

impl CcdSolver {
    /// Runs at most `iterations_per_frame` tip-to-root sweeps, rotating each
    /// joint's root in place and applying its constraints after every turn.
    ///
    /// Never fails: an exhausted budget returns the pose reached so far.
    pub fn solve<G: TransformGraph + ?Sized>(
        chain: &Chain,
        graph: &mut G,
        target_position: Vec3,
        target_rotation: Quat,
    ) -> SolverResult {
        let joints = chain.joints();
        let Some(last) = joints.last() else {
            return SolverResult::default();
        };

        let tip = last.tip();
        let config = chain.config();
        let tolerance = config.tolerance_distance;
        let joint_count = joints.len() as f32;
        let mut result = SolverResult::default();

        for sweep in 0..config.iterations_per_frame {
            let mut pending: Option<Unfold> = None;

            for (count, (index, joint)) in joints.iter().enumerate().rev().enumerate() {
                Self::measure(&mut result, graph, tip, target_position, target_rotation);

                if result.distance_to_target < tolerance {
                    result.converged = true;
                    return result;
                }

                let mut unfold = None;
                if count < config.orientation_matching_joints {
                    Self::match_orientation(graph, joint, tip, target_rotation);
                } else {
                    let parent = index.checked_sub(1).map(|i| &joints[i]);
                    unfold = Self::reach_position(
                        graph,
                        joint,
                        parent,
                        tip,
                        target_position,
                        result.distance_to_target,
                        tolerance,
                    );
                }

                joint.apply_constraints(graph);

                if let Some(previous) = pending.take() {
                    Self::settle_unfold(graph, previous, joint, tip, target_position);
                }
                pending = unfold;

                result.used_iterations = sweep as f32 + (count + 1) as f32 / joint_count;
            }
        }

        Self::measure(&mut result, graph, tip, target_position, target_rotation);
        result.converged = result.distance_to_target < tolerance;
        result
    }

    fn measure<G: TransformGraph + ?Sized>(
        result: &mut SolverResult,
        graph: &G,
        tip: NodeId,
        target_position: Vec3,
        target_rotation: Quat,
    ) {
        result.distance_to_target = graph.world_position(tip).distance(target_position);
        result.rotation_to_target = rotation_angle(graph.world_rotation(tip), target_rotation);
    }

    /// Turns the root so the tip's right axis, then its up axis, line up
    /// with the target's.
    fn match_orientation<G: TransformGraph + ?Sized>(
        graph: &mut G,
        joint: &Joint,
        tip: NodeId,
        target_rotation: Quat,
    ) {
        let root = joint.root();

        let right = from_to_rotation(
            graph.transform_direction(tip, Vec3::X),
            target_rotation * Vec3::X,
        );
        graph.set_world_rotation(root, right * graph.world_rotation(root));

        let up = from_to_rotation(
            graph.transform_direction(tip, Vec3::Y),
            target_rotation * Vec3::Y,
        );
        graph.set_world_rotation(root, up * graph.world_rotation(root));
    }

    /// Turns the root so the direction root->tip points at the target.
    ///
    /// Returns the pose to fall back to when the turn was a stall unfold,
    /// which only pays off once the parent joint has turned as well.
    fn reach_position<G: TransformGraph + ?Sized>(
        graph: &mut G,
        joint: &Joint,
        parent: Option<&Joint>,
        tip: NodeId,
        target_position: Vec3,
        distance: f32,
        tolerance: f32,
    ) -> Option<Unfold> {
        let root = joint.root();
        let pivot = graph.world_position(root);
        let to_tip = graph.world_position(tip) - pivot;
        let to_target = target_position - pivot;

        match parent {
            Some(parent) if Self::is_stalled(to_tip, to_target, tolerance) => {
                let fallback = Unfold {
                    joint: root,
                    joint_rotation: graph.local_rotation(root),
                    parent_rotation: graph.local_rotation(parent.root()),
                    distance,
                };
                let rotation = Self::unfold(&*graph, joint, parent, to_tip, target_position);
                graph.set_world_rotation(root, rotation * graph.world_rotation(root));
                Some(fallback)
            }
            _ => {
                Self::turn_toward(graph, root, to_tip, to_target);
                None
            }
        }
    }

    fn turn_toward<G: TransformGraph + ?Sized>(
        graph: &mut G,
        root: NodeId,
        to_tip: Vec3,
        to_target: Vec3,
    ) {
        let rotation = from_to_rotation(to_tip, to_target);
        graph.set_world_rotation(root, rotation * graph.world_rotation(root));
    }

    /// Runs after the parent of an unfolded joint took its turn. If the tip
    /// did not end up closer than before the unfold (the parent is limited
    /// or locked), both joints go back and the parent takes a plain turn.
    fn settle_unfold<G: TransformGraph + ?Sized>(
        graph: &mut G,
        unfold: Unfold,
        parent: &Joint,
        tip: NodeId,
        target_position: Vec3,
    ) {
        if graph.world_position(tip).distance(target_position) < unfold.distance {
            return;
        }

        graph.set_local_rotation(unfold.joint, unfold.joint_rotation);
        graph.set_local_rotation(parent.root(), unfold.parent_rotation);

        let pivot = graph.world_position(parent.root());
        let to_tip = graph.world_position(tip) - pivot;
        Self::turn_toward(graph, parent.root(), to_tip, target_position - pivot);
        parent.apply_constraints(graph);
    }

    /// Tip and target lie on the same ray from the pivot with the target
    /// nearer: no turn about this pivot can bring the tip closer.
    fn is_stalled(to_tip: Vec3, to_target: Vec3, tolerance: f32) -> bool {
        let cosine = to_tip
            .normalize_or_zero()
            .dot(to_target.normalize_or_zero());
        cosine > 1.0 - STALL_COSINE_EPSILON && to_tip.length() > to_target.length() + tolerance
    }

    /// Bends the joint so the tip sits as far from the parent's pivot as the
    /// target does; the parent's next turn then lands the tip on the target.
    fn unfold<G: TransformGraph + ?Sized>(
        graph: &G,
        joint: &Joint,
        parent: &Joint,
        to_tip: Vec3,
        target_position: Vec3,
    ) -> Quat {
        let parent_pivot = graph.world_position(parent.root());
        let upper = graph.world_position(joint.root()) - parent_pivot;

        let a = upper.length();
        let b = to_tip.length();
        if a < MIN_LINK_LENGTH || b < MIN_LINK_LENGTH {
            return Quat::IDENTITY;
        }

        let c = target_position.distance(parent_pivot);
        let cosine = ((c * c - a * a - b * b) / (2.0 * a * b)).clamp(-1.0, 1.0);
        let wanted = cosine.acos();
        let current = upper.angle_between(to_tip);

        let tip_dir = to_tip / b;
        let in_plane = upper.cross(to_tip);
        let axis = if in_plane.length_squared() > MIN_LINK_LENGTH * MIN_LINK_LENGTH {
            in_plane.normalize()
        } else {
            joint
                .constraints()
                .iter()
                .find_map(|c| c.hinge_axis(graph))
                .map(|hinge| (hinge - tip_dir * hinge.dot(tip_dir)).normalize_or_zero())
                .filter(|axis| *axis != Vec3::ZERO)
                .unwrap_or_else(|| tip_dir.any_orthonormal_vector())
        };

        Quat::from_axis_angle(axis, wanted - current)
    }
}
