use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::SceneGraph;
use crate::ik::{Constraint, RotationLimit, RotationLimitSettings};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_iterations_per_frame() -> u32 {
    3
}
const fn default_orientation_matching_joints() -> usize {
    3
}
const fn default_tolerance_distance() -> f32 {
    0.001
}

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// Per-chain CCD settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Upper bound on full tip-to-root sweeps per solve (default: 3).
    #[serde(default = "default_iterations_per_frame")]
    pub iterations_per_frame: u32,

    /// How many joints nearest the tip match the target's orientation
    /// instead of chasing its position (default: 3).
    #[serde(default = "default_orientation_matching_joints")]
    pub orientation_matching_joints: usize,

    /// Tip-to-target distance below which the solve stops (default: 0.001).
    #[serde(default = "default_tolerance_distance")]
    pub tolerance_distance: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations_per_frame: default_iterations_per_frame(),
            orientation_matching_joints: default_orientation_matching_joints(),
            tolerance_distance: default_tolerance_distance(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations_per_frame == 0 {
            return Err(ConfigError::InvalidIterations);
        }
        if !self.tolerance_distance.is_finite() || self.tolerance_distance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance_distance));
        }
        if self.tolerance_distance == 0.0 {
            log::warn!(
                "tolerance_distance is 0: every sweep runs and every joint is touched each frame"
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// IkConfig
// ---------------------------------------------------------------------------

/// A rotation limit attached to a node, addressed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLimit {
    pub node: String,
    #[serde(flatten)]
    pub settings: RotationLimitSettings,
}

/// Authored rig parameters: solver settings plus per-node limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IkConfig {
    #[serde(default)]
    pub solver: SolverConfig,

    #[serde(default)]
    pub limits: Vec<NamedLimit>,
}

impl IkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver.validate()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Attaches every configured limit to its node in `graph`.
    ///
    /// All names are resolved before anything is attached, so an unknown
    /// node leaves the graph untouched.
    pub fn attach_limits(&self, graph: &mut SceneGraph) -> Result<(), ConfigError> {
        let resolved = self
            .limits
            .iter()
            .map(|limit| {
                graph
                    .find(&limit.node)
                    .map(|node| (node, limit.settings))
                    .ok_or_else(|| ConfigError::UnknownNode(limit.node.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (node, settings) in resolved {
            if let Some(constraints) = graph.constraints_mut(node) {
                constraints.push(Constraint::from(RotationLimit::from_settings(settings)));
            }
        }
        Ok(())
    }
}
