//! # ccd-ik
//!
//! Cyclic Coordinate Descent inverse kinematics over a host transform
//! hierarchy.
//!
//! ## Features
//! - CCD solver with per-frame sweep budget and tolerance early-out
//! - Orientation matching on the joints nearest the tip
//! - Hinge-style rotation limits relative to a saved baseline pose
//! - Chains that rebuild themselves when the host's parenting changes
//! - TOML rig configuration and read-only debug snapshots
//!
//! ## Example
//! ```rust,ignore
//! use ccd_ik::graph::SceneGraph;
//! use ccd_ik::ik::{Chain, RotationLimit};
//! use ccd_ik::math::Transform;
//! use glam::{Quat, Vec3};
//!
//! let mut graph = SceneGraph::new();
//! let shoulder = graph.add_root("shoulder", Transform::IDENTITY);
//! let elbow = graph.add_node("elbow", shoulder, Transform::from_position(Vec3::X))?;
//! let hand = graph.add_node("hand", elbow, Transform::from_position(Vec3::X))?;
//! graph.add_constraint(elbow, RotationLimit::new(Vec3::Z, 90.0, 0.0).into())?;
//!
//! let mut chain = Chain::builder()
//!     .root(shoulder)
//!     .tip(hand)
//!     .orientation_matching_joints(0)
//!     .build(&graph);
//!
//! if let Some(result) = chain.update(&mut graph, Vec3::new(1.2, 0.8, 0.0), Quat::IDENTITY) {
//!     println!("converged: {}, distance: {}", result.converged, result.distance_to_target);
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod ik;
pub mod math;

pub use config::{IkConfig, NamedLimit, SolverConfig};
pub use error::{ConfigError, GraphError, IkError};
pub use graph::{NodeId, SceneGraph, TransformGraph};
pub use ik::{
    CcdSolver, Chain, ChainBuilder, ChainObserver, ChainSnapshot, ChainStatus, Constraint, Joint,
    RotationLimit, RotationLimitSettings, SolverResult,
};
pub use math::Transform;
