//! Motion profiles
//!
//! A motion profile describes how a scalar position evolves over time
//! between a start and end goal. Profiles are pure functions of time with a
//! fixed duration, fully determined at construction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position/velocity pair a profile starts or ends at.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Goal {
    pub position: f64,
    pub velocity: f64,
}

/// The kinematic limits a profile must respect.
#[derive(Debug, Copy, Clone)]
pub struct Constraints {
    pub max_velocity: f64,
    pub max_acceleration: f64,
}

/// The state of a profile at a point in time.
#[derive(Debug, Copy, Clone)]
pub struct State {
    pub time: f64,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

/// A trapezoidal motion profile: constant-acceleration ramp, constant
/// velocity cruise, constant-deceleration ramp.
///
/// The profile handles non-zero and reverse endpoint velocities. When the
/// distance is too short to reach the requested end velocity the profile
/// truncates: it ramps for the whole distance and the achieved end velocity
/// differs from the requested goal. Callers chaining profiles must read the
/// achieved end state with `calculate(duration())` rather than assuming the
/// requested goal was met.
#[derive(Debug, Clone)]
pub struct TrapezoidalMotionProfile {
    start: Goal,
    end: Goal,

    /// Direction of travel along the position axis, +1 or -1.
    direction: f64,

    /// Phase durations: ramp to cruise, cruise, ramp to end.
    ramp_up_time: f64,
    cruise_time: f64,
    ramp_down_time: f64,

    /// Signed accelerations of the two ramp phases in the forward frame.
    ramp_up_acceleration: f64,
    ramp_down_acceleration: f64,

    /// Velocities in the forward frame.
    start_velocity: f64,
    cruise_velocity: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A motion profile: a pure function from time to kinematic state.
pub trait MotionProfile {
    /// Evaluate the profile at the given time, clamped into `[0, duration]`.
    fn calculate(&self, time: f64) -> State;

    /// The total duration of the profile.
    fn duration(&self) -> f64;

    /// The goal the profile starts from.
    fn start(&self) -> Goal;

    /// The goal the profile was asked to end at.
    ///
    /// Truncated profiles may not achieve this, see
    /// [`TrapezoidalMotionProfile`].
    fn end(&self) -> Goal;

    fn is_finished(&self, time: f64) -> bool {
        time > self.duration()
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrapezoidalMotionProfile {
    pub fn new(start: Goal, end: Goal, constraints: Constraints) -> Self {
        let distance = end.position - start.position;
        let direction = if distance < 0.0 { -1.0 } else { 1.0 };

        // Work in the forward frame where travel is in +ve position
        let d = distance.abs();
        let v0 = direction * start.velocity;
        let v1 = direction * end.velocity;

        let max_v = constraints.max_velocity;
        let max_a = constraints.max_acceleration;

        // The highest cruise velocity which still leaves room to ramp down
        // to the end velocity within the distance
        let reachable = ((2.0 * max_a * d + v0 * v0 + v1 * v1) / 2.0).max(0.0).sqrt();
        let cruise = max_v.min(reachable);

        if cruise >= v0.max(v1) {
            // Full profile: ramp up to cruise, cruise, ramp down
            let ramp_up_time = (cruise - v0) / max_a;
            let ramp_down_time = (cruise - v1) / max_a;

            let ramp_up_distance = 0.5 * (cruise + v0) * ramp_up_time;
            let ramp_down_distance = 0.5 * (cruise + v1) * ramp_down_time;

            let cruise_distance = (d - ramp_up_distance - ramp_down_distance).max(0.0);
            let cruise_time = if cruise > 0.0 {
                cruise_distance / cruise
            } else {
                0.0
            };

            Self {
                start,
                end,
                direction,
                ramp_up_time,
                cruise_time,
                ramp_down_time,
                ramp_up_acceleration: max_a,
                ramp_down_acceleration: -max_a,
                start_velocity: v0,
                cruise_velocity: cruise,
            }
        } else if v1 >= v0 {
            // The distance is too short to reach the end velocity, ramp up
            // for the whole distance
            let achieved = (v0 * v0 + 2.0 * max_a * d).sqrt();
            let ramp_up_time = (achieved - v0) / max_a;

            Self {
                start,
                end,
                direction,
                ramp_up_time,
                cruise_time: 0.0,
                ramp_down_time: 0.0,
                ramp_up_acceleration: max_a,
                ramp_down_acceleration: 0.0,
                start_velocity: v0,
                cruise_velocity: achieved,
            }
        } else {
            // The distance is too short to slow down to the end velocity,
            // ramp down for the whole distance. If the velocity hits zero
            // before the distance is covered the profile stops short, which
            // is a caller configuration error.
            let achieved = (v0 * v0 - 2.0 * max_a * d).max(0.0).sqrt();
            let ramp_down_time = (v0 - achieved) / max_a;

            Self {
                start,
                end,
                direction,
                ramp_up_time: 0.0,
                cruise_time: 0.0,
                ramp_down_time,
                ramp_up_acceleration: 0.0,
                ramp_down_acceleration: -max_a,
                start_velocity: v0,
                cruise_velocity: v0,
            }
        }
    }
}

impl MotionProfile for TrapezoidalMotionProfile {
    fn calculate(&self, time: f64) -> State {
        let time = clamp(&time, &0.0, &self.duration());

        // Evaluate the phase the time falls in, accumulating position over
        // the completed phases
        let (position, velocity, acceleration) = if time < self.ramp_up_time {
            let t = time;
            (
                self.start_velocity * t + 0.5 * self.ramp_up_acceleration * t * t,
                self.start_velocity + self.ramp_up_acceleration * t,
                self.ramp_up_acceleration,
            )
        } else if time < self.ramp_up_time + self.cruise_time {
            let t = time - self.ramp_up_time;
            (self.ramp_up_distance() + self.cruise_velocity * t, self.cruise_velocity, 0.0)
        } else {
            let t = time - self.ramp_up_time - self.cruise_time;
            (
                self.ramp_up_distance()
                    + self.cruise_velocity * self.cruise_time
                    + self.cruise_velocity * t
                    + 0.5 * self.ramp_down_acceleration * t * t,
                self.cruise_velocity + self.ramp_down_acceleration * t,
                self.ramp_down_acceleration,
            )
        };

        State {
            time,
            position: self.start.position + self.direction * position,
            velocity: self.direction * velocity,
            acceleration: self.direction * acceleration,
        }
    }

    fn duration(&self) -> f64 {
        self.ramp_up_time + self.cruise_time + self.ramp_down_time
    }

    fn start(&self) -> Goal {
        self.start
    }

    fn end(&self) -> Goal {
        self.end
    }
}

impl TrapezoidalMotionProfile {
    fn ramp_up_distance(&self) -> f64 {
        self.start_velocity * self.ramp_up_time
            + 0.5 * self.ramp_up_acceleration * self.ramp_up_time * self.ramp_up_time
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ALLOWABLE_POSITION_ERROR: f64 = 1.0e-9;
    const ALLOWABLE_VELOCITY_ERROR: f64 = 1.0e-9;

    fn verify_start_end(profile: &TrapezoidalMotionProfile) {
        let profile_start = profile.calculate(0.0);
        let profile_end = profile.calculate(profile.duration());

        assert_abs_diff_eq!(
            profile.start().position,
            profile_start.position,
            epsilon = ALLOWABLE_POSITION_ERROR
        );
        assert_abs_diff_eq!(
            profile.start().velocity,
            profile_start.velocity,
            epsilon = ALLOWABLE_VELOCITY_ERROR
        );
        assert_abs_diff_eq!(
            profile.end().position,
            profile_end.position,
            epsilon = ALLOWABLE_POSITION_ERROR
        );
        assert_abs_diff_eq!(
            profile.end().velocity,
            profile_end.velocity,
            epsilon = ALLOWABLE_VELOCITY_ERROR
        );
    }

    #[test]
    fn test_forward_start_end() {
        let profile = TrapezoidalMotionProfile::new(
            Goal { position: 0.0, velocity: 0.0 },
            Goal { position: 10.0, velocity: 0.0 },
            Constraints { max_velocity: 1.0, max_acceleration: 1.0 },
        );
        verify_start_end(&profile);
    }

    #[test]
    fn test_forward_non_zero_start_end() {
        let profile = TrapezoidalMotionProfile::new(
            Goal { position: -1.0, velocity: 2.5 },
            Goal { position: 10.0, velocity: 0.5 },
            Constraints { max_velocity: 5.0, max_acceleration: 2.0 },
        );
        verify_start_end(&profile);
    }

    #[test]
    fn test_reverse_start_end() {
        let profile = TrapezoidalMotionProfile::new(
            Goal { position: 10.0, velocity: 0.0 },
            Goal { position: 0.0, velocity: 0.0 },
            Constraints { max_velocity: 1.0, max_acceleration: 1.0 },
        );
        verify_start_end(&profile);
    }

    #[test]
    fn test_reverse_non_zero_start_end() {
        let profile = TrapezoidalMotionProfile::new(
            Goal { position: 10.0, velocity: 2.5 },
            Goal { position: -2.3, velocity: -2.0 },
            Constraints { max_velocity: 5.0, max_acceleration: 2.0 },
        );
        verify_start_end(&profile);
    }

    #[test]
    fn test_velocity_never_exceeds_constraint() {
        let profile = TrapezoidalMotionProfile::new(
            Goal { position: 0.0, velocity: 0.0 },
            Goal { position: 15.0, velocity: 0.0 },
            Constraints { max_velocity: 10.0, max_acceleration: 5.0 },
        );

        let steps = 1000;
        for i in 0..=steps {
            let t = profile.duration() * i as f64 / steps as f64;
            assert!(profile.calculate(t).velocity.abs() <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn test_truncated_profile_reports_achieved_velocity() {
        // 1 unit of distance is not enough to reach 10 velocity at 2
        // acceleration, the profile ramps for the whole distance instead
        let profile = TrapezoidalMotionProfile::new(
            Goal { position: 0.0, velocity: 0.0 },
            Goal { position: 1.0, velocity: 10.0 },
            Constraints { max_velocity: 10.0, max_acceleration: 2.0 },
        );

        let achieved = profile.calculate(profile.duration());
        assert_abs_diff_eq!(achieved.position, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(achieved.velocity, 2.0, epsilon = 1e-9);
        assert!(achieved.velocity < profile.end().velocity);
    }

    #[test]
    fn test_is_finished() {
        let profile = TrapezoidalMotionProfile::new(
            Goal { position: 0.0, velocity: 0.0 },
            Goal { position: 1.0, velocity: 0.0 },
            Constraints { max_velocity: 1.0, max_acceleration: 1.0 },
        );

        assert!(!profile.is_finished(0.0));
        assert!(!profile.is_finished(profile.duration()));
        assert!(profile.is_finished(profile.duration() + 1e-6));
    }
}
