use thiserror::Error;

use crate::graph::NodeId;

/// Top-level error type for ccd-ik.
///
/// Nothing on the per-frame path (rebuild, solve, pose reset) returns one of
/// these; that path degrades and logs instead.
#[derive(Debug, Error)]
pub enum IkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Constraint applied before being bound to a joint")]
    UnboundConstraint,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("iterations_per_frame must be >= 1")]
    InvalidIterations,

    #[error("Invalid tolerance_distance: {0} (must be finite and >= 0)")]
    InvalidTolerance(f32),

    #[error("Unknown node in limit configuration: {0}")]
    UnknownNode(String),
}

/// Errors raised while editing a [`SceneGraph`](crate::graph::SceneGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Node {0:?} does not belong to this graph")]
    UnknownNode(NodeId),

    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
}
