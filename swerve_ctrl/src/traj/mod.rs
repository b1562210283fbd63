//! # Trajectory module
//!
//! A trajectory time-parameterises a path: each path segment gets a
//! trapezoidal motion profile whose velocity cap comes from evaluating every
//! constraint against that segment's geometry. Profiles look ahead to the
//! next segment's cap so consecutive segments connect without a forced stop
//! where geometry allows, and the velocity actually achieved by a profile
//! (which may fall short of the request when a segment is too short to
//! finish accelerating) becomes the entry velocity of the next profile. This
//! back-pressure keeps the whole trajectory kinematically consistent across
//! segment joins.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod constraint;
mod motion_profile;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use constraint::*;
pub use motion_profile::*;

use crate::maths::{Rotation2, Vector2};
use crate::path::{Path, PathSegment};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A time-parameterised path.
#[derive(Debug)]
pub struct Trajectory {
    path: Path,
    profiles: Vec<TrapezoidalMotionProfile>,
    duration: f64,
}

/// The state of a trajectory at a point in time.
#[derive(Debug, Copy, Clone)]
pub struct TrajectorySegment {
    /// The time this segment was sampled at.
    pub time: f64,

    /// Position on the path.
    pub translation: Vector2,

    /// Direction of travel tangent to the path.
    pub heading: Rotation2,

    /// Scheduled robot facing. Evaluated against the path's global rotation
    /// schedule by distance, never the local path segment.
    pub rotation: Rotation2,

    /// Distance along the path.
    pub distance: f64,

    /// Speed along the path.
    pub velocity: f64,

    /// Acceleration along the path.
    pub acceleration: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Time-parameterise a path under the given constraints.
    ///
    /// A constraint returning a zero velocity cap over a segment produces a
    /// profile that never finishes; bounding trajectory duration is the
    /// caller's responsibility.
    pub fn new(path: Path, constraints: &[Box<dyn TrajectoryConstraint>]) -> Self {
        let segment_count = path.segments().len();
        let mut profiles = Vec::with_capacity(segment_count);

        let mut last_goal = Goal {
            position: 0.0,
            velocity: 0.0,
        };

        for i in 0..segment_count {
            let segment = &path.segments()[i];

            // The acceleration cap is evaluated at the segment's entry
            // velocity; at the velocity cap itself a feedforward constraint
            // has no headroom left
            let max_segment_velocity = max_velocity_for(segment, constraints);
            let max_segment_acceleration =
                max_acceleration_for(segment, last_goal.velocity, constraints);

            // Look ahead to the next segment's cap to find an achievable exit
            // velocity, the last segment always ends stopped
            let end_velocity = if i == segment_count - 1 {
                0.0
            } else {
                max_velocity_for(&path.segments()[i + 1], constraints).min(max_segment_velocity)
            };

            let end_goal = Goal {
                position: last_goal.position + segment.length(),
                velocity: end_velocity,
            };

            let profile = TrapezoidalMotionProfile::new(
                last_goal,
                end_goal,
                Constraints {
                    max_velocity: max_segment_velocity,
                    max_acceleration: max_segment_acceleration,
                },
            );

            // The profile may not have been able to finish accelerating, the
            // achieved end state is the entry for the next segment
            let achieved = profile.calculate(profile.duration());
            last_goal = Goal {
                position: achieved.position,
                velocity: achieved.velocity,
            };

            profiles.push(profile);
        }

        let duration = profiles.iter().map(|p| p.duration()).sum();

        Self {
            path,
            profiles,
            duration,
        }
    }

    /// The total duration of the trajectory.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Evaluate the trajectory at a point in time.
    ///
    /// The owning profile is found by a linear scan over the cumulative
    /// durations; segment counts are small so this is not a hot spot.
    pub fn calculate_segment(&self, time: f64) -> TrajectorySegment {
        let mut profile_index = 0;
        let mut profile_time = time;
        while profile_index < self.profiles.len() - 1
            && profile_time > self.profiles[profile_index].duration()
        {
            profile_time -= self.profiles[profile_index].duration();
            profile_index += 1;
        }

        let state = self.profiles[profile_index].calculate(profile_time);
        let path_state = self.path.calculate(state.position);

        TrajectorySegment {
            time,
            translation: path_state.position,
            heading: path_state.heading,
            rotation: path_state.rotation,
            distance: state.position,
            velocity: state.velocity,
            acceleration: state.acceleration,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// The most restrictive velocity cap over a segment.
fn max_velocity_for(segment: &PathSegment, constraints: &[Box<dyn TrajectoryConstraint>]) -> f64 {
    constraints
        .iter()
        .map(|c| c.max_velocity(segment))
        .fold(f64::INFINITY, f64::min)
}

/// The most restrictive acceleration cap over a segment at a velocity.
fn max_acceleration_for(
    segment: &PathSegment,
    velocity: f64,
    constraints: &[Box<dyn TrajectoryConstraint>],
) -> f64 {
    constraints
        .iter()
        .map(|c| c.max_acceleration(segment, velocity))
        .fold(f64::INFINITY, f64::min)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::maths::{Rotation2, Vector2};
    use crate::path::SimplePathBuilder;
    use approx::assert_abs_diff_eq;

    fn constraints(max_v: f64, max_a: f64) -> Vec<Box<dyn TrajectoryConstraint>> {
        vec![
            Box::new(MaxVelocityConstraint::new(max_v)),
            Box::new(MaxAccelerationConstraint::new(max_a)),
        ]
    }

    #[test]
    fn test_straight_line_trajectory() {
        let path = SimplePathBuilder::new(Vector2::ZERO, Rotation2::ZERO)
            .line_to(Vector2::new(5.0, 0.0))
            .build()
            .unwrap();
        let trajectory = Trajectory::new(path, &constraints(1.0, 1.0));

        // Ramp 1 s, cruise 4 s, ramp 1 s
        assert_abs_diff_eq!(trajectory.duration(), 6.0, epsilon = 1e-9);

        let start = trajectory.calculate_segment(0.0);
        assert_eq!(start.translation, Vector2::ZERO);
        assert_abs_diff_eq!(start.velocity, 0.0, epsilon = 1e-9);

        let end = trajectory.calculate_segment(trajectory.duration());
        assert_eq!(end.translation, Vector2::new(5.0, 0.0));
        assert_abs_diff_eq!(end.velocity, 0.0, epsilon = 1e-9);

        let cruise = trajectory.calculate_segment(3.0);
        assert_abs_diff_eq!(cruise.velocity, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_cap_backpressures_entry_velocity() {
        // Line into a tight arc: the centripetal constraint caps the arc
        // velocity, so the line's profile must exit no faster than the cap
        let path = SimplePathBuilder::new(Vector2::ZERO, Rotation2::ZERO)
            .line_to(Vector2::new(5.0, 0.0))
            .arc_to(Vector2::new(6.0, 1.0), Vector2::new(5.0, 1.0))
            .build()
            .unwrap();

        let mut all: Vec<Box<dyn TrajectoryConstraint>> = constraints(3.0, 1.0);
        all.push(Box::new(CentripetalAccelerationConstraint::new(1.0)));

        let trajectory = Trajectory::new(path, &all);

        // Arc radius 1, cap = sqrt(1 / 1) = 1. Find the segment boundary
        // (distance 5) and check the velocity there
        let mut boundary_velocity: f64 = 0.0;
        let steps = 2000;
        for i in 0..=steps {
            let t = trajectory.duration() * i as f64 / steps as f64;
            let segment = trajectory.calculate_segment(t);
            if (segment.distance - 5.0).abs() < 0.05 {
                boundary_velocity = boundary_velocity.max(segment.velocity);
            }
        }

        assert!(
            boundary_velocity <= 1.0 + 0.05,
            "velocity {} at segment join exceeds the arc cap",
            boundary_velocity
        );
    }

    #[test]
    fn test_rotation_follows_global_schedule() {
        // The rotation schedule spans the whole path: sampling the
        // trajectory mid-way must interpolate against global distance, not
        // the owning segment's local fraction
        let path = SimplePathBuilder::new(Vector2::ZERO, Rotation2::ZERO)
            .line_to(Vector2::new(5.0, 0.0))
            .line_to_facing(Vector2::new(10.0, 0.0), Rotation2::from_degrees(90.0))
            .build()
            .unwrap();
        let trajectory = Trajectory::new(path, &constraints(1.0, 1.0));

        let steps = 500;
        for i in 0..=steps {
            let t = trajectory.duration() * i as f64 / steps as f64;
            let segment = trajectory.calculate_segment(t);

            let expected = trajectory.path().rotation_at(segment.distance);
            assert!(
                segment.rotation.equals_eps(&expected, 1e-9),
                "rotation diverged from the global schedule at t = {}",
                t
            );
        }

        // Halfway along the distance the rotation is halfway interpolated
        let mid = trajectory.path().rotation_at(5.0);
        assert_abs_diff_eq!(mid.to_degrees(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trajectory_ends_stopped() {
        let path = SimplePathBuilder::new(Vector2::ZERO, Rotation2::ZERO)
            .line_to(Vector2::new(2.0, 0.0))
            .line_to(Vector2::new(2.0, 3.0))
            .line_to(Vector2::new(0.0, 3.0))
            .build()
            .unwrap();
        let trajectory = Trajectory::new(path, &constraints(2.0, 1.5));

        let end = trajectory.calculate_segment(trajectory.duration());
        assert_abs_diff_eq!(end.velocity, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(end.distance, 7.0, epsilon = 1e-9);
    }
}
