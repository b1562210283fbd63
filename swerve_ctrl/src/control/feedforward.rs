//! Drivetrain feedforward models and the holonomic drive signal

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::maths::Vector2;
use util::maths::EPSILON;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Feedforward constants for one drivetrain axis: `kV * v + kA * a +
/// sign(ff) * kS`.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct DrivetrainFeedforwardConstants {
    /// Velocity constant (kV).
    pub velocity_constant: f64,

    /// Acceleration constant (kA).
    pub acceleration_constant: f64,

    /// Static friction constant (kS).
    pub static_constant: f64,
}

/// Open-loop feedforward for a holonomic drivetrain, with independent
/// constants for the forward and strafe axes.
#[derive(Debug, Copy, Clone)]
pub struct HolonomicFeedforward {
    forward_constants: DrivetrainFeedforwardConstants,
    strafe_constants: DrivetrainFeedforwardConstants,
}

/// The drive command handed to the drivetrain collaborator each tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HolonomicDriveSignal {
    /// Commanded translational output.
    pub translation: Vector2,

    /// Commanded rotational output.
    pub rotation: f64,

    /// Whether the translation is interpreted in the field frame rather than
    /// the robot frame.
    pub field_oriented: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DrivetrainFeedforwardConstants {
    pub fn new(velocity_constant: f64, acceleration_constant: f64, static_constant: f64) -> Self {
        Self {
            velocity_constant,
            acceleration_constant,
            static_constant,
        }
    }

    /// The feedforward for a single axis.
    pub fn calculate_feedforward(&self, velocity: f64, acceleration: f64) -> f64 {
        let feedforward = self.velocity_constant * velocity + self.acceleration_constant * acceleration;

        feedforward + self.static_constant.copysign(feedforward)
    }
}

impl HolonomicFeedforward {
    /// Use the same constants for both translational axes.
    pub fn new(translation_constants: DrivetrainFeedforwardConstants) -> Self {
        Self::with_axis_constants(translation_constants, translation_constants)
    }

    pub fn with_axis_constants(
        forward_constants: DrivetrainFeedforwardConstants,
        strafe_constants: DrivetrainFeedforwardConstants,
    ) -> Self {
        Self {
            forward_constants,
            strafe_constants,
        }
    }

    /// The feedforward vector for a translational velocity and acceleration.
    ///
    /// The static constants are not applied per-axis as a flat bias. They
    /// are scaled by the relative magnitude of each axis of the feedforward
    /// vector, so the axis doing less of the work receives proportionally
    /// less static friction compensation.
    pub fn calculate_feedforward(&self, velocity: Vector2, acceleration: Vector2) -> Vector2 {
        let mut forward = self.forward_constants.velocity_constant * velocity.x
            + self.forward_constants.acceleration_constant * acceleration.x;
        let mut strafe = self.strafe_constants.velocity_constant * velocity.y
            + self.strafe_constants.acceleration_constant * acceleration.y;

        let feedforward_vector = Vector2::new(forward, strafe);

        // A zero vector has no direction to distribute the static constants
        // along
        if feedforward_vector.length() > EPSILON {
            let unit = feedforward_vector.normalize();

            forward += (unit.x * self.forward_constants.static_constant).copysign(forward);
            strafe += (unit.y * self.strafe_constants.static_constant).copysign(strafe);
        }

        Vector2::new(forward, strafe)
    }
}

impl HolonomicDriveSignal {
    pub fn new(translation: Vector2, rotation: f64, field_oriented: bool) -> Self {
        Self {
            translation,
            rotation,
            field_oriented,
        }
    }

    /// The zero (stopped) drive signal.
    pub fn stop() -> Self {
        Self::new(Vector2::ZERO, 0.0, false)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_axis_feedforward() {
        let constants = DrivetrainFeedforwardConstants::new(2.0, 0.5, 0.1);

        assert_abs_diff_eq!(constants.calculate_feedforward(3.0, 2.0), 7.1, epsilon = 1e-9);
        assert_abs_diff_eq!(
            constants.calculate_feedforward(-3.0, -2.0),
            -7.1,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_static_constant_is_distributed_proportionally() {
        let feedforward = HolonomicFeedforward::new(DrivetrainFeedforwardConstants::new(
            1.0, 0.0, 1.0,
        ));

        // Pure forward motion: the whole static constant lands on x
        let output = feedforward.calculate_feedforward(Vector2::new(2.0, 0.0), Vector2::ZERO);
        assert_abs_diff_eq!(output.x, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(output.y, 0.0, epsilon = 1e-9);

        // Diagonal motion: each axis receives its share of the static
        // constant, not the full amount
        let output = feedforward.calculate_feedforward(Vector2::new(2.0, 2.0), Vector2::ZERO);
        let share = 2.0f64.sqrt() / 2.0;
        assert_abs_diff_eq!(output.x, 2.0 + share, epsilon = 1e-9);
        assert_abs_diff_eq!(output.y, 2.0 + share, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_feedforward_stays_zero() {
        let feedforward = HolonomicFeedforward::new(DrivetrainFeedforwardConstants::new(
            1.0, 0.0, 0.5,
        ));

        let output = feedforward.calculate_feedforward(Vector2::ZERO, Vector2::ZERO);
        assert_abs_diff_eq!(output.x, 0.0);
        assert_abs_diff_eq!(output.y, 0.0);
    }
}
