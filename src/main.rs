use ccd_ik::graph::{NodeId, SceneGraph, TransformGraph};
use ccd_ik::ik::{Chain, ChainObserver, ChainSnapshot, RotationLimitSettings};
use ccd_ik::math::Transform;
use ccd_ik::{IkConfig, IkError, NamedLimit, SolverConfig};
use glam::{Quat, Vec3};
use std::f32::consts::TAU;

const FRAMES: u32 = 240;
const FRAME_TIME: f32 = 1.0 / 60.0;
const TARGET_RADIUS: f32 = 2.2;
const TARGET_SPEED: f32 = 0.5;

/// Logs a snapshot every `every` frames.
struct LogObserver {
    every: u32,
    frame: u32,
}

impl ChainObserver for LogObserver {
    fn observe(&mut self, snapshot: &ChainSnapshot) {
        self.frame += 1;
        if self.frame % self.every != 0 {
            return;
        }

        let Some(result) = snapshot.last_result else {
            log::info!("frame {}: {}", self.frame, snapshot.status.describe());
            return;
        };
        log::info!(
            "frame {}: tip {:?}, distance {:.4}, rotation {:.3} rad, {:.2} iterations{}",
            self.frame,
            snapshot.tip_position().unwrap_or_default(),
            result.distance_to_target,
            result.rotation_to_target,
            result.used_iterations,
            if result.converged { ", converged" } else { "" }
        );
        for joint in &snapshot.joints {
            for gizmo in &joint.limits {
                log::debug!(
                    "  limit at {:?}: axis {:?}, arc {:.0} deg",
                    gizmo.origin,
                    gizmo.axis,
                    gizmo.range.to_degrees() * 2.0
                );
            }
        }
    }
}

struct App {
    graph: SceneGraph,
    chain: Chain,
    hand: NodeId,
    target_center: Vec3,
    time: f32,
    observer: LogObserver,
}

impl App {
    fn new(config: &IkConfig) -> Result<Self, IkError> {
        let mut graph = SceneGraph::new();
        let base = graph.add_root("base", Transform::IDENTITY);
        let shoulder = graph.add_node("shoulder", base, Transform::from_position(Vec3::Y * 0.5))?;
        let elbow = graph.add_node("elbow", shoulder, Transform::from_position(Vec3::Y))?;
        let wrist = graph.add_node("wrist", elbow, Transform::from_position(Vec3::Y))?;
        let hand = graph.add_node("hand", wrist, Transform::from_position(Vec3::Y * 0.5))?;
        config.attach_limits(&mut graph)?;

        let chain = Chain::builder()
            .root(shoulder)
            .tip(hand)
            .config(config.solver)
            .build(&graph);
        log::info!(
            "arm built: {} joints, reach {:.2}",
            chain.joint_count(),
            chain.total_length(&graph)
        );

        Ok(Self {
            graph,
            chain,
            hand,
            target_center: Vec3::new(0.0, 1.5, 0.0),
            time: 0.0,
            observer: LogObserver {
                every: 30,
                frame: 0,
            },
        })
    }

    fn target(&self) -> (Vec3, Quat) {
        let angle = self.time * TARGET_SPEED * TAU;
        let position = self.target_center
            + Vec3::new(angle.cos(), angle.sin(), 0.0) * TARGET_RADIUS;
        // Palm faces away from the circle's center.
        let rotation = Quat::from_rotation_z(angle - std::f32::consts::FRAC_PI_2);
        (position, rotation)
    }

    fn update(&mut self) {
        self.time += FRAME_TIME;
        let (position, rotation) = self.target();
        self.chain.update(&mut self.graph, position, rotation);
        self.observer.observe(&self.chain.snapshot(&self.graph));
    }
}

fn default_config() -> IkConfig {
    IkConfig {
        solver: SolverConfig {
            orientation_matching_joints: 1,
            ..SolverConfig::default()
        },
        limits: vec![
            NamedLimit {
                node: "elbow".into(),
                settings: RotationLimitSettings {
                    axis: Vec3::Z,
                    range_degrees: 150.0,
                    range_offset_degrees: 0.0,
                },
            },
            NamedLimit {
                node: "wrist".into(),
                settings: RotationLimitSettings {
                    axis: Vec3::Z,
                    range_degrees: 80.0,
                    range_offset_degrees: 0.0,
                },
            },
        ],
    }
}

fn main() -> Result<(), IkError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading rig configuration from {path}");
            IkConfig::from_file(path)?
        }
        None => default_config(),
    };

    let mut app = App::new(&config)?;
    app.chain.save_pose(&app.graph);
    let rest = app.graph.world_position(app.hand);

    for _ in 0..FRAMES {
        app.update();
    }

    app.chain.reset_pose(&mut app.graph);
    log::info!(
        "pose reset: hand back at {:?} (rest {:?})",
        app.graph.world_position(app.hand),
        rest
    );
    Ok(())
}
