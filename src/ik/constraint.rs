use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use super::joint::JointBinding;
use crate::error::IkError;
use crate::graph::TransformGraph;
use crate::math::{from_to_rotation, signed_angle};

/// Per-joint rotation constraint.
///
/// Constraints are attached to a node by the host, copied into the joint
/// built over that node, bound to the joint's baseline, and applied after
/// every corrective rotation the solver makes on that joint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    RotationLimit(RotationLimit),
}

impl Constraint {
    pub fn bind(&mut self, binding: JointBinding) {
        match self {
            Self::RotationLimit(limit) => limit.bind(binding),
        }
    }

    pub fn is_bound(&self) -> bool {
        match self {
            Self::RotationLimit(limit) => limit.binding().is_some(),
        }
    }

    pub fn apply<G: TransformGraph + ?Sized>(&self, graph: &mut G) -> Result<(), IkError> {
        match self {
            Self::RotationLimit(limit) => limit.apply(graph),
        }
    }

    /// World-space axis the constraint lets the joint turn about, if it
    /// restricts motion to a single axis.
    pub fn hinge_axis<G: TransformGraph + ?Sized>(&self, graph: &G) -> Option<Vec3> {
        match self {
            Self::RotationLimit(limit) => limit.world_axis(graph),
        }
    }
}

impl From<RotationLimit> for Constraint {
    fn from(limit: RotationLimit) -> Self {
        Self::RotationLimit(limit)
    }
}

/// Authored parameters of a [`RotationLimit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationLimitSettings {
    /// Local-space axis the joint may turn about.
    pub axis: Vec3,
    /// Half-angle of the allowed arc, 0..=180.
    pub range_degrees: f32,
    /// Turns the arc's center about `axis`, 0..360.
    pub range_offset_degrees: f32,
}

impl Default for RotationLimitSettings {
    fn default() -> Self {
        Self {
            axis: Vec3::Y,
            range_degrees: 155.0,
            range_offset_degrees: 0.0,
        }
    }
}

/// Hinge-style limit: keeps the joint's `axis` where the baseline pose put
/// it and clamps the turn about that axis to `range` either side of the
/// arc's center.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationLimit {
    axis: Vec3,
    range: f32,
    range_offset: f32,
    range_center: Vec3,
    range_start: Vec3,
    range_end: Vec3,
    binding: Option<JointBinding>,
}

impl Default for RotationLimit {
    fn default() -> Self {
        Self::from_settings(RotationLimitSettings::default())
    }
}

impl RotationLimit {
    pub fn new(axis: Vec3, range_degrees: f32, range_offset_degrees: f32) -> Self {
        let mut limit = Self {
            axis: Vec3::Y,
            range: 0.0,
            range_offset: 0.0,
            range_center: Vec3::Z,
            range_start: Vec3::Z,
            range_end: Vec3::Z,
            binding: None,
        };
        limit.set_axis(axis);
        limit.set_range_degrees(range_degrees);
        limit.set_range_offset_degrees(range_offset_degrees);
        limit
    }

    pub fn from_settings(settings: RotationLimitSettings) -> Self {
        Self::new(
            settings.axis,
            settings.range_degrees,
            settings.range_offset_degrees,
        )
    }

    pub fn settings(&self) -> RotationLimitSettings {
        RotationLimitSettings {
            axis: self.axis,
            range_degrees: self.range.to_degrees(),
            range_offset_degrees: self.range_offset.to_degrees(),
        }
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Half-angle of the allowed arc in radians.
    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn range_offset(&self) -> f32 {
        self.range_offset
    }

    pub fn range_center(&self) -> Vec3 {
        self.range_center
    }

    pub fn range_start(&self) -> Vec3 {
        self.range_start
    }

    pub fn range_end(&self) -> Vec3 {
        self.range_end
    }

    pub fn binding(&self) -> Option<JointBinding> {
        self.binding
    }

    pub fn set_axis(&mut self, axis: Vec3) {
        let normalized = axis.normalize_or_zero();
        self.axis = if normalized == Vec3::ZERO || !normalized.is_finite() {
            log::warn!("rotation limit axis {axis} is degenerate, using +Y");
            Vec3::Y
        } else {
            normalized
        };
        self.update_range();
    }

    pub fn set_range_degrees(&mut self, range_degrees: f32) {
        self.range = if range_degrees.is_nan() || range_degrees >= 180.0 {
            PI
        } else {
            range_degrees.max(0.0).to_radians()
        };
        self.update_range();
    }

    pub fn set_range_offset_degrees(&mut self, range_offset_degrees: f32) {
        self.range_offset = if range_offset_degrees.is_finite() {
            range_offset_degrees.to_radians().rem_euclid(TAU)
        } else {
            0.0
        };
        self.update_range();
    }

    fn update_range(&mut self) {
        let reference = if self.axis.dot(Vec3::X).abs() > 0.5 {
            Vec3::Z
        } else {
            Vec3::X
        };
        let center = reference.cross(self.axis).normalize();

        self.range_center = Quat::from_axis_angle(self.axis, self.range_offset) * center;
        self.range_start = Quat::from_axis_angle(self.axis, -self.range) * self.range_center;
        self.range_end = Quat::from_axis_angle(self.axis, self.range) * self.range_center;
    }

    pub fn bind(&mut self, binding: JointBinding) {
        self.binding = Some(binding);
    }

    pub fn apply<G: TransformGraph + ?Sized>(&self, graph: &mut G) -> Result<(), IkError> {
        let binding = self.binding.ok_or(IkError::UnboundConstraint)?;
        let current = graph.local_rotation(binding.root);
        let limited = self.limit(binding.initial_local_rotation, current);
        graph.set_local_rotation(binding.root, limited);
        Ok(())
    }

    /// Signed turn about the limited axis, relative to the baseline, in radians.
    pub fn swing<G: TransformGraph + ?Sized>(&self, graph: &G) -> Result<f32, IkError> {
        let binding = self.binding.ok_or(IkError::UnboundConstraint)?;
        Ok(self.measure(binding.initial_local_rotation, graph.local_rotation(binding.root)))
    }

    fn world_axis<G: TransformGraph + ?Sized>(&self, graph: &G) -> Option<Vec3> {
        let binding = self.binding?;
        let parent_rotation = graph
            .parent(binding.root)
            .map_or(Quat::IDENTITY, |parent| graph.world_rotation(parent));
        Some((parent_rotation * binding.initial_local_rotation * self.axis).normalize_or_zero())
    }

    fn measure(&self, baseline: Quat, current: Quat) -> f32 {
        signed_angle(
            baseline * self.range_center,
            current * self.range_center,
            baseline * self.axis,
        )
    }

    /// Returns `current` with the axis pinned back to its baseline direction
    /// and the turn about it clamped into the allowed arc.
    pub fn limit(&self, baseline: Quat, current: Quat) -> Quat {
        let pinned_axis = (baseline * self.axis).normalize();
        let rotation = from_to_rotation(current * self.axis, pinned_axis) * current;

        if self.range >= PI {
            return rotation.normalize();
        }

        let swing = self.measure(baseline, rotation);
        if swing.abs() <= self.range {
            return rotation.normalize();
        }

        let correction = Quat::from_axis_angle(pinned_axis, swing.signum() * self.range - swing);
        (correction * rotation).normalize()
    }
}
