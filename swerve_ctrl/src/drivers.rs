//! # Driver traits
//!
//! Capability interfaces for the hardware collaborators the library consumes.
//! The library never talks to hardware itself: the kinematics and odometry
//! layers accept any implementer of these traits, and implementations live
//! with the robot program.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::maths::{Rotation2, Vector2};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// One physically steerable drive unit.
///
/// Angles are in radians in `[0, 2pi)`, velocities in the robot frame.
pub trait SwerveModuleIo {
    /// The current wheel direction.
    fn current_angle(&self) -> f64;

    /// The current speed along the wheel direction.
    fn current_velocity(&self) -> f64;

    /// Command the module to reach the given velocity vector.
    fn set_target_velocity(&mut self, velocity: Vector2);

    /// The module's current velocity as a vector, as consumed by the
    /// kinematics and odometry layers.
    fn current_velocity_vector(&self) -> Vector2 {
        Vector2::from_angle(Rotation2::from_radians(self.current_angle()))
            .scale(self.current_velocity())
    }
}

/// A heading sensor.
///
/// Odometry treats this as the authoritative heading source; the angle is
/// never integrated internally.
pub trait Gyroscope {
    /// The current heading, post any user adjustment.
    fn angle(&self) -> Rotation2;

    /// The current angular rate in rad/s.
    fn rate(&self) -> f64;
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
