//! 2D vector type

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

// Internal
use super::Rotation2;
use util::maths::{clamp, epsilon_equals, epsilon_equals_eps};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A vector with 2 elements.
///
/// The length and angle of the vector are always derived from the `x` and `y`
/// components, they cannot be set independently.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Vector2 {
    /// The vector at (0, 0).
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a new unit vector pointing in the direction of the given
    /// rotation.
    pub fn from_angle(rotation: Rotation2) -> Self {
        Self::new(rotation.cos, rotation.sin)
    }

    /// The length (euclidean norm) of the vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The angle the vector makes with the positive x axis.
    pub fn angle(&self) -> Rotation2 {
        Rotation2::from_direction(self.x, self.y)
    }

    /// Calculate the angle between two vectors.
    ///
    /// If either vector is zero length the angle is reported as zero.
    pub fn angle_between(a: &Vector2, b: &Vector2) -> Rotation2 {
        let cos = a.dot(b) / (a.length() * b.length());
        if cos.is_nan() {
            return Rotation2::ZERO;
        }

        Rotation2::from_radians(clamp(&cos, &-1.0, &1.0).acos())
    }

    /// Multiply each component of the vector by a scalar value.
    pub fn scale(&self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }

    /// Multiply the components of two vectors together element-wise.
    pub fn multiply(&self, other: &Vector2) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// The vector pointing in the opposite direction to this one.
    pub fn inverse(&self) -> Self {
        Self::new(-self.x, -self.y)
    }

    /// The unit vector in the direction of this one.
    pub fn normalize(&self) -> Self {
        let length = self.length();
        Self::new(self.x / length, self.y / length)
    }

    pub fn dot(&self, other: &Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The z component of the 3D cross product of the two vectors.
    pub fn cross(&self, other: &Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Rotate this vector by the specified rotation.
    pub fn rotate_by(&self, rotation: Rotation2) -> Self {
        Self::new(
            self.x * rotation.cos - self.y * rotation.sin,
            self.x * rotation.sin + self.y * rotation.cos,
        )
    }

    /// Linearly interpolate between this vector and another.
    pub fn interpolate(&self, other: Vector2, t: f64) -> Self {
        if t <= 0.0 {
            *self
        } else if t >= 1.0 {
            other
        } else {
            *self + (other - *self).scale(t)
        }
    }

    /// Check equality against another vector with an explicit tolerance on
    /// each component.
    pub fn equals_eps(&self, other: &Vector2, epsilon: f64) -> bool {
        epsilon_equals_eps(self.x, other.x, epsilon) && epsilon_equals_eps(self.y, other.y, epsilon)
    }
}

impl PartialEq for Vector2 {
    /// Equality between vectors is epsilon based to absorb floating point
    /// noise from intermediate calculations.
    fn eq(&self, other: &Self) -> bool {
        epsilon_equals(self.x, other.x) && epsilon_equals(self.y, other.y)
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        self.inverse()
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        self.scale(rhs)
    }
}

impl std::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_length_angle() {
        let v = Vector2::new(3.0, 4.0);
        assert_abs_diff_eq!(v.length(), 5.0);

        let v = Vector2::new(1.0, 1.0);
        assert_abs_diff_eq!(v.angle().to_radians(), FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn test_algebra() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, -1.0);

        assert_eq!(a + b, Vector2::new(4.0, 1.0));
        assert_eq!(a - b, Vector2::new(-2.0, 3.0));
        assert_eq!(-a, Vector2::new(-1.0, -2.0));
        assert_eq!(a.scale(2.0), Vector2::new(2.0, 4.0));
        assert_abs_diff_eq!(a.dot(&b), 1.0);
        assert_abs_diff_eq!(a.cross(&b), -7.0);
    }

    #[test]
    fn test_rotate_by() {
        let v = Vector2::new(1.0, 0.0);
        let rotated = v.rotate_by(Rotation2::from_radians(FRAC_PI_2));

        assert_abs_diff_eq!(rotated.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rotated.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_between() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, 2.0);
        assert_abs_diff_eq!(Vector2::angle_between(&a, &b).to_radians(), FRAC_PI_2);

        // Degenerate zero length vector reports zero angle
        assert_eq!(Vector2::angle_between(&a, &Vector2::ZERO), Rotation2::ZERO);
    }

    #[test]
    fn test_interpolate() {
        let a = Vector2::ZERO;
        let b = Vector2::new(2.0, 4.0);

        assert_eq!(a.interpolate(b, 0.5), Vector2::new(1.0, 2.0));
        assert_eq!(a.interpolate(b, -1.0), a);
        assert_eq!(a.interpolate(b, 2.0), b);
    }
}
