//! Cyclic Coordinate Descent IK over a host transform graph.
//!
//! A [`Chain`] is built from a root and a tip node, walks up the hierarchy
//! into [`Joint`]s, and is solved by [`CcdSolver`] once per frame. Joints
//! carry [`Constraint`]s copied from their root node and re-applied after
//! every corrective rotation.

pub mod chain;
pub mod constraint;
pub mod debug;
pub mod joint;
pub mod solver;

pub use chain::{Chain, ChainBuilder, ChainStatus};
pub use constraint::{Constraint, RotationLimit, RotationLimitSettings};
pub use debug::{ChainObserver, ChainSnapshot, JointSnapshot, LimitGizmo};
pub use joint::{Joint, JointBinding};
pub use solver::{CcdSolver, SolverResult};
