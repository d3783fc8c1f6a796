use glam::{Quat, Vec3};

const DEGENERATE_LENGTH_SQUARED: f32 = 1e-12;

/// Shortest-arc rotation taking the direction of `from` onto the direction of `to`.
///
/// Inputs need not be normalized. A zero-length input yields the identity,
/// and exactly opposite inputs turn half a revolution about a deterministic
/// perpendicular of `from`, so the result is never NaN.
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();

    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    Quat::from_rotation_arc(from, to)
}

/// Signed angle in radians from `from` to `to`, measured in the plane normal
/// to `axis`. Positive is counter-clockwise when looking down `axis`.
///
/// Returns 0 when `axis` is zero or either vector is parallel to it.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return 0.0;
    }

    let from = from - axis * from.dot(axis);
    let to = to - axis * to.dot(axis);

    if from.length_squared() < DEGENERATE_LENGTH_SQUARED
        || to.length_squared() < DEGENERATE_LENGTH_SQUARED
    {
        return 0.0;
    }

    from.cross(to).dot(axis).atan2(from.dot(to))
}

/// Unsigned angle in radians between two orientations.
pub fn rotation_angle(a: Quat, b: Quat) -> f32 {
    a.angle_between(b)
}
