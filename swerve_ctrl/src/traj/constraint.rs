//! Trajectory constraints
//!
//! Constraints cap the velocity and acceleration a trajectory may command
//! over a path segment. They are composable: the trajectory generator
//! evaluates every constraint against each segment and takes the most
//! restrictive value.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::path::PathSegment;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A constraint on the motion allowed over a path segment.
///
/// Implementations override whichever limits they constrain; unconstrained
/// quantities default to unbounded.
pub trait TrajectoryConstraint {
    /// The maximum velocity this constraint allows over the segment.
    fn max_velocity(&self, _segment: &PathSegment) -> f64 {
        f64::INFINITY
    }

    /// The maximum acceleration this constraint allows over the segment at
    /// the given velocity.
    fn max_acceleration(&self, _segment: &PathSegment, _velocity: f64) -> f64 {
        f64::INFINITY
    }

    /// The maximum deceleration this constraint allows over the segment at
    /// the given velocity.
    fn max_deceleration(&self, segment: &PathSegment, velocity: f64) -> f64 {
        self.max_acceleration(segment, velocity)
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A constraint that limits the velocity to a flat maximum.
pub struct MaxVelocityConstraint {
    max_velocity: f64,
}

/// A constraint that limits the acceleration to a flat maximum.
///
/// Usually used to make sure the robot won't tip over as it accelerates.
pub struct MaxAccelerationConstraint {
    max_acceleration: f64,
}

/// A constraint that limits velocity so the centripetal acceleration through
/// a turn never exceeds a maximum.
///
/// Limiting centripetal acceleration slows the robot down as it takes a
/// turn; the higher the limit the less it slows down.
pub struct CentripetalAccelerationConstraint {
    max_centripetal_acceleration: f64,
}

/// A constraint that keeps the drivetrain feedforward
/// `kV * v + kA * a + kS` under a target value (typically the available
/// voltage).
pub struct FeedforwardConstraint {
    target_feedforward: f64,

    velocity_constant: f64,
    acceleration_constant: f64,
    static_constant: f64,

    /// If set, deceleration is evaluated at the negated velocity, allowing
    /// the drivetrain to brake harder than it can accelerate.
    fast_deceleration: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MaxVelocityConstraint {
    pub fn new(max_velocity: f64) -> Self {
        Self {
            max_velocity: max_velocity.abs(),
        }
    }
}

impl TrajectoryConstraint for MaxVelocityConstraint {
    fn max_velocity(&self, _segment: &PathSegment) -> f64 {
        self.max_velocity
    }
}

impl MaxAccelerationConstraint {
    pub fn new(max_acceleration: f64) -> Self {
        Self {
            max_acceleration: max_acceleration.abs(),
        }
    }
}

impl TrajectoryConstraint for MaxAccelerationConstraint {
    fn max_acceleration(&self, _segment: &PathSegment, _velocity: f64) -> f64 {
        self.max_acceleration
    }
}

impl CentripetalAccelerationConstraint {
    pub fn new(max_centripetal_acceleration: f64) -> Self {
        Self {
            max_centripetal_acceleration: max_centripetal_acceleration.abs(),
        }
    }
}

impl TrajectoryConstraint for CentripetalAccelerationConstraint {
    fn max_velocity(&self, segment: &PathSegment) -> f64 {
        // a = v^2 * k  =>  v = sqrt(a / k)
        //
        // Following a line the curvature is 0 and no limit applies.
        let curvature = segment.start().curvature;
        if curvature == 0.0 {
            return f64::INFINITY;
        }

        (self.max_centripetal_acceleration / curvature).abs().sqrt()
    }
}

impl FeedforwardConstraint {
    pub fn new(
        target_feedforward: f64,
        velocity_constant: f64,
        acceleration_constant: f64,
        static_constant: f64,
    ) -> Self {
        Self::with_fast_deceleration(
            target_feedforward,
            velocity_constant,
            acceleration_constant,
            static_constant,
            true,
        )
    }

    pub fn with_fast_deceleration(
        target_feedforward: f64,
        velocity_constant: f64,
        acceleration_constant: f64,
        static_constant: f64,
        fast_deceleration: bool,
    ) -> Self {
        Self {
            target_feedforward,
            velocity_constant,
            acceleration_constant,
            static_constant,
            fast_deceleration,
        }
    }
}

impl TrajectoryConstraint for FeedforwardConstraint {
    fn max_velocity(&self, _segment: &PathSegment) -> f64 {
        (self.target_feedforward - self.static_constant) / self.velocity_constant
    }

    fn max_acceleration(&self, _segment: &PathSegment, velocity: f64) -> f64 {
        (self.target_feedforward - self.static_constant - self.velocity_constant * velocity)
            / self.acceleration_constant
    }

    fn max_deceleration(&self, segment: &PathSegment, velocity: f64) -> f64 {
        self.max_acceleration(
            segment,
            if self.fast_deceleration {
                -velocity
            } else {
                velocity
            },
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
