use approx::assert_relative_eq;
use ccd_ik::graph::{NodeId, SceneGraph, TransformGraph};
use ccd_ik::ik::{Chain, ChainStatus, Constraint, RotationLimit};
use ccd_ik::math::Transform;
use ccd_ik::SolverConfig;
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

/// `links` unit links laid out along +X, nodes ordered root to tip.
fn straight_arm(links: usize) -> (SceneGraph, Vec<NodeId>) {
    let mut graph = SceneGraph::new();
    let mut nodes = vec![graph.add_root("j0", Transform::IDENTITY)];
    for i in 1..=links {
        let node = graph
            .add_node(format!("j{i}"), nodes[i - 1], Transform::from_position(Vec3::X))
            .unwrap();
        nodes.push(node);
    }
    (graph, nodes)
}

fn position_only(iterations: u32) -> SolverConfig {
    SolverConfig {
        iterations_per_frame: iterations,
        orientation_matching_joints: 0,
        tolerance_distance: 0.001,
    }
}

fn chain_over(graph: &SceneGraph, nodes: &[NodeId], config: SolverConfig) -> Chain {
    Chain::builder()
        .root(nodes[0])
        .tip(*nodes.last().unwrap())
        .config(config)
        .build(graph)
}

#[test]
fn target_at_tip_converges_immediately() {
    let (mut graph, nodes) = straight_arm(3);
    graph.set_local_rotation(nodes[1], Quat::from_rotation_z(0.4));
    let mut chain = chain_over(&graph, &nodes, SolverConfig::default());

    chain.solve(&mut graph, Vec3::new(0.0, 3.0, 0.0), Quat::IDENTITY);
    chain.reset_pose(&mut graph);

    let (position, rotation) = chain.tip_pose(&graph).unwrap();
    let result = chain.solve(&mut graph, position, rotation).unwrap();
    assert!(result.converged);
    assert!(result.used_iterations <= 1.0);
    assert!(result.distance_to_target < 0.001);
}

#[test]
fn reaches_target_at_ninety_percent_of_full_extension() {
    let (mut graph, nodes) = straight_arm(3);
    let mut chain = chain_over(&graph, &nodes, position_only(3));

    let result = chain
        .solve(&mut graph, Vec3::new(2.7, 0.0, 0.0), Quat::IDENTITY)
        .unwrap();
    assert!(result.converged, "distance {}", result.distance_to_target);
    assert!(result.distance_to_target < 0.001);
    assert!(result.used_iterations <= 3.0);
}

#[test]
fn target_beyond_reach_exhausts_budget() {
    let (mut graph, nodes) = straight_arm(3);
    let mut chain = chain_over(&graph, &nodes, position_only(3));

    let result = chain
        .solve(&mut graph, Vec3::new(4.0, 0.0, 0.0), Quat::IDENTITY)
        .unwrap();
    assert!(!result.converged);
    assert_relative_eq!(result.used_iterations, 3.0);
    assert_relative_eq!(result.distance_to_target, 1.0, epsilon = 1e-5);
}

#[test]
fn distance_never_grows_between_sweeps() {
    let (mut graph, nodes) = straight_arm(3);
    let mut chain = chain_over(&graph, &nodes, position_only(1));
    let target = Vec3::new(1.2, 1.6, 0.3);

    let mut previous = graph.world_position(nodes[3]).distance(target);
    for _ in 0..8 {
        let result = chain.solve(&mut graph, target, Quat::IDENTITY).unwrap();
        assert!(
            result.distance_to_target <= previous + 1e-5,
            "{} after {}",
            result.distance_to_target,
            previous
        );
        previous = result.distance_to_target;
    }
    assert!(previous < 0.05);
}

#[test]
fn larger_budgets_never_end_farther_away() {
    let target = Vec3::new(1.2, 1.6, 0.3);

    let distances: Vec<f32> = (1..=6)
        .map(|budget| {
            let (mut graph, nodes) = straight_arm(3);
            let mut chain = chain_over(&graph, &nodes, position_only(budget));
            chain
                .solve(&mut graph, target, Quat::IDENTITY)
                .unwrap()
                .distance_to_target
        })
        .collect();

    for pair in distances.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-5, "{distances:?}");
    }
    assert!(distances[5] < distances[0]);
}

fn assert_pose_is_finite(graph: &SceneGraph, nodes: &[NodeId]) {
    for node in nodes {
        assert!(graph.local_rotation(*node).is_finite(), "{node:?}");
        assert!(graph.world_position(*node).is_finite(), "{node:?}");
    }
}

#[test]
fn target_on_a_joint_pivot_stays_finite() {
    let (mut graph, nodes) = straight_arm(3);
    let mut chain = chain_over(&graph, &nodes, position_only(3));

    let result = chain
        .solve(&mut graph, Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY)
        .unwrap();
    assert!(result.distance_to_target.is_finite());
    assert!(result.rotation_to_target.is_finite());
    assert!(result.distance_to_target < 2.0);
    assert_pose_is_finite(&graph, &nodes);
}

#[test]
fn tip_on_its_parent_pivot_stays_finite() {
    let (mut graph, mut nodes) = straight_arm(2);
    let tip = graph
        .add_node("j3", nodes[2], Transform::IDENTITY)
        .unwrap();
    nodes.push(tip);
    graph
        .add_constraint(nodes[2], RotationLimit::new(Vec3::Z, 60.0, 0.0).into())
        .unwrap();
    let mut chain = chain_over(&graph, &nodes, SolverConfig::default());
    assert_eq!(chain.joint_count(), 3);

    for _ in 0..3 {
        let result = chain
            .solve(&mut graph, Vec3::new(0.5, 1.0, 0.0), Quat::from_rotation_z(1.0))
            .unwrap();
        assert!(result.distance_to_target.is_finite());
        assert!(result.rotation_to_target.is_finite());
        assert!(result.used_iterations.is_finite());
    }
    assert_pose_is_finite(&graph, &nodes);
}

#[test]
fn rotation_limit_clamps_to_boundary() {
    let (mut graph, nodes) = straight_arm(2);
    graph
        .add_constraint(nodes[1], RotationLimit::new(Vec3::Y, 45.0, 0.0).into())
        .unwrap();
    let chain = chain_over(&graph, &nodes, SolverConfig::default());
    let joint = &chain.joints()[1];
    let Constraint::RotationLimit(limit) = &joint.constraints()[0];

    graph.set_local_rotation(nodes[1], Quat::from_rotation_y(FRAC_PI_2));
    joint.apply_constraints(&mut graph);
    assert_relative_eq!(limit.swing(&graph).unwrap(), 45f32.to_radians(), epsilon = 1e-5);

    let once = graph.local_rotation(nodes[1]);
    joint.apply_constraints(&mut graph);
    assert_relative_eq!(once.dot(graph.local_rotation(nodes[1])).abs(), 1.0, epsilon = 1e-6);
}

#[test]
fn range_boundaries() {
    let (mut graph, nodes) = straight_arm(3);
    graph
        .add_constraint(nodes[1], RotationLimit::new(Vec3::Y, 180.0, 0.0).into())
        .unwrap();
    graph
        .add_constraint(nodes[2], RotationLimit::new(Vec3::Y, 0.0, 0.0).into())
        .unwrap();
    let chain = chain_over(&graph, &nodes, SolverConfig::default());
    let free = &chain.joints()[1];
    let locked = &chain.joints()[2];

    for degrees in [-180.0f32, -120.0, -45.0, 0.0, 45.0, 120.0, 180.0] {
        let swing = Quat::from_rotation_y(degrees.to_radians());

        graph.set_local_rotation(nodes[1], swing);
        free.apply_constraints(&mut graph);
        assert_relative_eq!(graph.local_rotation(nodes[1]).dot(swing).abs(), 1.0, epsilon = 1e-5);

        graph.set_local_rotation(nodes[2], swing);
        locked.apply_constraints(&mut graph);
        let Constraint::RotationLimit(limit) = &locked.constraints()[0];
        assert_relative_eq!(limit.swing(&graph).unwrap(), 0.0, epsilon = 1e-5);
    }
}

#[test]
fn rebuild_with_unchanged_topology_keeps_baselines() {
    let (mut graph, nodes) = straight_arm(3);
    graph
        .add_constraint(nodes[1], RotationLimit::new(Vec3::Z, 120.0, 0.0).into())
        .unwrap();
    let mut chain = chain_over(&graph, &nodes, position_only(3));
    let baselines: Vec<Quat> = chain
        .joints()
        .iter()
        .map(|j| j.initial_local_rotation())
        .collect();

    chain.solve(&mut graph, Vec3::new(1.0, 1.5, 0.0), Quat::IDENTITY);
    chain.rebuild(&graph);

    for (joint, baseline) in chain.joints().iter().zip(&baselines) {
        assert_eq!(joint.initial_local_rotation(), *baseline);
        for constraint in joint.constraints() {
            let Constraint::RotationLimit(limit) = constraint;
            assert_eq!(limit.binding(), Some(joint.binding()));
        }
    }
}

#[test]
fn invalid_chains_are_skipped() {
    let (mut graph, nodes) = straight_arm(2);
    let before = graph.world_position(nodes[2]);

    let cases = [
        (Chain::builder().tip(nodes[2]).build(&graph), ChainStatus::MissingRoot),
        (Chain::builder().root(nodes[0]).build(&graph), ChainStatus::MissingTip),
        (
            Chain::builder().root(nodes[0]).tip(nodes[0]).build(&graph),
            ChainStatus::TipWithoutParent,
        ),
        (
            Chain::builder().root(nodes[1]).tip(nodes[1]).build(&graph),
            ChainStatus::RootEqualsTip,
        ),
    ];

    for (mut chain, status) in cases {
        assert_eq!(chain.status(), status);
        assert!(!chain.is_valid());
        assert!(chain.update(&mut graph, Vec3::Y, Quat::IDENTITY).is_none());
    }
    assert_eq!(graph.world_position(nodes[2]), before);
}

#[test]
fn root_outside_the_tip_hierarchy_still_solves() {
    let (mut graph, nodes) = straight_arm(2);
    let elsewhere = graph.add_root("elsewhere", Transform::from_position(Vec3::Z * 5.0));
    let mut chain = Chain::builder()
        .root(elsewhere)
        .tip(nodes[2])
        .config(position_only(3))
        .build(&graph);

    assert!(chain.is_valid());
    assert!(!chain.root_reached());
    assert_eq!(chain.joints()[0].root(), nodes[0]);

    let result = chain
        .solve(&mut graph, Vec3::new(1.0, 1.0, 0.0), Quat::IDENTITY)
        .unwrap();
    assert!(result.converged, "distance {}", result.distance_to_target);
}

#[test]
fn reparenting_triggers_rebuild_on_update() {
    let (mut graph, nodes) = straight_arm(3);
    let mut chain = chain_over(&graph, &nodes, position_only(3));
    assert_eq!(chain.joint_count(), 3);

    graph.set_parent(nodes[3], Some(nodes[1])).unwrap();
    chain.update(&mut graph, Vec3::new(0.5, 1.0, 0.0), Quat::IDENTITY);
    assert_eq!(chain.joint_count(), 2);
    assert!(!chain.contains_node(nodes[2]));
}
