//! 2D rotation type

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::Vector2;
use util::maths::{bound_radians, epsilon_equals, EPSILON};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A rotation represented by the trigonometric functions of its angle.
///
/// Storing the sine and cosine rather than a raw angle means composing
/// rotations is a pure matrix multiply with no repeated trig conversions. The
/// components always satisfy `cos^2 + sin^2 = 1`, enforced by normalisation
/// at construction. `tan` is the signed infinity when `cos` is close to zero.
#[derive(Debug, Copy, Clone)]
pub struct Rotation2 {
    /// The cosine of the angle.
    pub cos: f64,

    /// The sine of the angle.
    pub sin: f64,

    /// The tangent of the angle.
    pub tan: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rotation2 {
    /// A rotation which represents an angle of 0 degrees.
    pub const ZERO: Rotation2 = Rotation2 {
        cos: 1.0,
        sin: 0.0,
        tan: 0.0,
    };

    /// Create a new rotation from a point, normalising it onto the unit
    /// circle.
    ///
    /// If the point is so close to the origin that it has no meaningful
    /// direction the zero rotation is returned.
    pub fn from_direction(x: f64, y: f64) -> Self {
        let length = (x * x + y * y).sqrt();

        if length > EPSILON {
            Self::from_unit(x / length, y / length)
        } else {
            Self::ZERO
        }
    }

    /// Create a new rotation from an angle in radians.
    pub fn from_radians(angle: f64) -> Self {
        Self::from_unit(angle.cos(), angle.sin())
    }

    /// Create a new rotation from an angle in degrees.
    pub fn from_degrees(angle: f64) -> Self {
        Self::from_radians(angle.to_radians())
    }

    /// Build a rotation from components already known to lie on the unit
    /// circle.
    fn from_unit(cos: f64, sin: f64) -> Self {
        // Tangent has special cases when the cosine is 0 (straight up or
        // straight down on the unit circle).
        let tan = if epsilon_equals(cos, 0.0) {
            if sin >= 0.0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            }
        } else {
            sin / cos
        };

        Self { cos, sin, tan }
    }

    /// Get the angle of this rotation in radians, in the range [0, 2pi).
    pub fn to_radians(&self) -> f64 {
        bound_radians(self.sin.atan2(self.cos))
    }

    /// Get the angle of this rotation in degrees, in the range [0, 360).
    pub fn to_degrees(&self) -> f64 {
        self.to_radians().to_degrees()
    }

    /// Rotate this rotation by another, adding their effects together.
    ///
    /// This is a rotation matrix multiply, see
    /// https://en.wikipedia.org/wiki/Rotation_matrix for more information.
    pub fn rotate_by(&self, other: Rotation2) -> Self {
        Self::from_direction(
            self.cos * other.cos - self.sin * other.sin,
            self.cos * other.sin + self.sin * other.cos,
        )
    }

    /// The rotation perpendicular to this one.
    pub fn normal(&self) -> Self {
        Self::from_unit(-self.sin, self.cos)
    }

    /// The rotation which would "undo" this rotation.
    pub fn inverse(&self) -> Self {
        Self::from_unit(self.cos, -self.sin)
    }

    /// Check whether this rotation is parallel to another.
    ///
    /// This differs from equality because it also accepts rotations facing
    /// the opposite direction.
    pub fn is_parallel(&self, other: &Rotation2) -> bool {
        epsilon_equals(
            Vector2::from_angle(*self).cross(&Vector2::from_angle(*other)),
            0.0,
        )
    }

    /// Interpolate between this rotation and another, always taking the
    /// shorter way around the circle.
    pub fn interpolate(&self, other: Rotation2, t: f64) -> Self {
        if t <= 0.0 {
            return *self;
        } else if t >= 1.0 {
            return other;
        }

        let mut from = self.to_radians();
        let mut to = other.to_radians();

        let diff = (from - to).abs();
        if diff > std::f64::consts::PI {
            if from < to {
                from += 2.0 * std::f64::consts::PI;
            } else {
                to += 2.0 * std::f64::consts::PI;
            }
        }

        Self::from_radians(from + ((to - from) * t))
    }

    /// Check equality against another rotation with an explicit angular
    /// tolerance in radians.
    pub fn equals_eps(&self, other: &Rotation2, max_error: f64) -> bool {
        // Shortest angular distance between the two rotations
        let difference = self.rotate_by(other.inverse()).to_radians();
        difference.min(2.0 * std::f64::consts::PI - difference) <= max_error
    }
}

impl Default for Rotation2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Rotation2 {
    fn eq(&self, other: &Self) -> bool {
        epsilon_equals(self.cos, other.cos) && epsilon_equals(self.sin, other.sin)
    }
}

impl std::fmt::Display for Rotation2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.3}\u{00b0}", self.to_degrees())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
