//! 2D rigid body transform type

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{Rotation2, Vector2};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 2D rigid body transform: a translation followed by a rotation.
///
/// Used both as a pose (position + facing) and as a directed line when
/// intersecting (the translation is a point on the line, the rotation its
/// direction).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RigidTransform2 {
    pub translation: Vector2,
    pub rotation: Rotation2,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RigidTransform2 {
    /// The identity transform.
    pub const ZERO: RigidTransform2 = RigidTransform2 {
        translation: Vector2::ZERO,
        rotation: Rotation2::ZERO,
    };

    pub fn new(translation: Vector2, rotation: Rotation2) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Compose this transform with another, applying the other transform in
    /// this transform's frame.
    pub fn transform_by(&self, other: &RigidTransform2) -> Self {
        Self::new(
            self.translation + other.translation.rotate_by(self.rotation),
            self.rotation.rotate_by(other.rotation),
        )
    }

    /// The transform which would "undo" this transform.
    pub fn inverse(&self) -> Self {
        let inverse_rotation = self.rotation.inverse();
        Self::new(
            self.translation.inverse().rotate_by(inverse_rotation),
            inverse_rotation,
        )
    }

    /// Find the point where the lines described by two transforms cross.
    ///
    /// If the lines are parallel there is no crossing point and the sentinel
    /// point at (inf, inf) is returned instead.
    pub fn intersection(&self, other: &RigidTransform2) -> Vector2 {
        if self.rotation.is_parallel(&other.rotation) {
            return Vector2::new(f64::INFINITY, f64::INFINITY);
        }

        // Solve against the line with the steeper direction to keep the
        // division by the tangent well conditioned.
        if self.rotation.cos.abs() < other.rotation.cos.abs() {
            Self::intersection_internal(self, other)
        } else {
            Self::intersection_internal(other, self)
        }
    }

    fn intersection_internal(a: &RigidTransform2, b: &RigidTransform2) -> Vector2 {
        let t = ((a.translation.x - b.translation.x) * b.rotation.tan + b.translation.y
            - a.translation.y)
            / (a.rotation.sin - a.rotation.cos * b.rotation.tan);

        a.translation + Vector2::from_angle(a.rotation).scale(t)
    }
}

impl Default for RigidTransform2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::fmt::Display for RigidTransform2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{{T: {}, R: {}}}", self.translation, self.rotation)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
