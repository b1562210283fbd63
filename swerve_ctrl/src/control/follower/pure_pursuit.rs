//! Pure pursuit follower control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{FollowerControl, TrajectoryFollower};
use crate::control::{HolonomicDriveSignal, HolonomicFeedforward, PidConstants, PidController};
use crate::maths::{RigidTransform2, Rotation2, Vector2};
use crate::path::{ArcSegment, LineSegment, PathSegment};
use crate::traj::{Trajectory, TrajectorySegment};
use util::maths::{epsilon_equals_eps, EPSILON};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The default time step used when searching along the trajectory.
pub const DEFAULT_SEARCH_DT: f64 = 5.0e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steers towards a lookahead point ahead of the robot on the trajectory.
///
/// A "closest segment" cursor is kept across ticks and only ever advances
/// forward in time: the search walks forward from the last known closest
/// point in `search_dt` steps and stops as soon as the distance to the pose
/// starts increasing. This keeps each tick O(search steps) rather than
/// O(trajectory length), at the cost of assuming the distance to the pose is
/// unimodal over the forward search window. The lookahead walk continues
/// from the closest point until it is a caller-supplied distance away,
/// allowing speed-adaptive lookahead.
pub struct HolonomicPurePursuitControl {
    /// Lookahead distance as a function of the current velocity.
    lookahead_fn: Box<dyn Fn(Vector2) -> f64 + Send>,

    feedforward: HolonomicFeedforward,
    rotation_controller: PidController,

    search_dt: f64,

    closest_segment: Option<TrajectorySegment>,
    last_pursuit_segment: Option<PathSegment>,

    finished: bool,
}

/// A trajectory follower steering by pure pursuit.
pub type HolonomicPurePursuitFollower = TrajectoryFollower<HolonomicPurePursuitControl>;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HolonomicPurePursuitControl {
    /// Create a control with a fixed lookahead distance.
    pub fn new(
        lookahead_distance: f64,
        feedforward: HolonomicFeedforward,
        rotation_constants: PidConstants,
    ) -> Self {
        Self::with_lookahead_fn(
            move |_| lookahead_distance,
            feedforward,
            rotation_constants,
        )
    }

    /// Create a control with a speed-adaptive lookahead distance.
    pub fn with_lookahead_fn<F>(
        lookahead_fn: F,
        feedforward: HolonomicFeedforward,
        rotation_constants: PidConstants,
    ) -> Self
    where
        F: Fn(Vector2) -> f64 + Send + 'static,
    {
        let mut rotation_controller = PidController::new(rotation_constants);
        rotation_controller.set_continuous(true);
        rotation_controller.set_input_range(0.0, 2.0 * std::f64::consts::PI);

        Self {
            lookahead_fn: Box::new(lookahead_fn),
            feedforward,
            rotation_controller,
            search_dt: DEFAULT_SEARCH_DT,
            closest_segment: None,
            last_pursuit_segment: None,
            finished: false,
        }
    }

    pub fn search_dt(&self) -> f64 {
        self.search_dt
    }

    pub fn set_search_dt(&mut self, search_dt: f64) {
        self.search_dt = search_dt;
    }

    /// The closest segment found on the last update, for telemetry.
    pub fn closest_segment(&self) -> Option<&TrajectorySegment> {
        self.closest_segment.as_ref()
    }

    /// The pursuit arc fitted on the last update, for telemetry.
    pub fn last_pursuit_segment(&self) -> Option<&PathSegment> {
        self.last_pursuit_segment.as_ref()
    }
}

impl FollowerControl for HolonomicPurePursuitControl {
    fn calculate_drive_signal(
        &mut self,
        pose: &RigidTransform2,
        velocity: Vector2,
        _rotational_velocity: f64,
        trajectory: &Trajectory,
        _time: f64,
        dt: f64,
    ) -> HolonomicDriveSignal {
        let closest = find_closest_segment(
            trajectory,
            pose,
            self.search_dt,
            self.closest_segment.take(),
        );

        let lookahead_distance = (self.lookahead_fn)(velocity);
        let lookahead =
            find_lookahead_segment(trajectory, pose, lookahead_distance, self.search_dt, &closest);

        // Finished once the lookahead search reaches the end of the
        // trajectory
        if epsilon_equals_eps(lookahead.time, trajectory.duration(), self.search_dt) {
            self.finished = true;
        }

        // Fit the pursuit arc from the current motion to the lookahead point
        self.last_pursuit_segment = Some(pursuit_segment(
            pose.translation,
            velocity.angle(),
            lookahead.translation,
        ));

        // Drive along the chord towards the lookahead point at the closest
        // segment's profiled speed
        let pursuit_delta = lookahead.translation - pose.translation;
        let translational = if pursuit_delta.length() > EPSILON {
            let velocity_vector = pursuit_delta.scale(closest.velocity / pursuit_delta.length());
            let acceleration_vector =
                pursuit_delta.scale(closest.acceleration / pursuit_delta.length());

            self.feedforward
                .calculate_feedforward(velocity_vector, acceleration_vector)
        } else {
            // Sitting exactly on the lookahead point, nothing to pursue
            Vector2::ZERO
        };

        // Rotation tracks the closest segment's scheduled facing
        // independently of the pursuit
        self.rotation_controller
            .set_setpoint(closest.rotation.to_radians());
        let rotation = self
            .rotation_controller
            .calculate(pose.rotation.to_radians(), dt);

        self.closest_segment = Some(closest);

        HolonomicDriveSignal::new(translational, rotation, true)
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn reset(&mut self) {
        self.rotation_controller.reset();

        self.closest_segment = None;
        self.last_pursuit_segment = None;
        self.finished = false;
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Walk forward along the trajectory from the last known closest segment
/// until the distance to the pose starts increasing.
///
/// The cursor never searches backward in time.
fn find_closest_segment(
    trajectory: &Trajectory,
    pose: &RigidTransform2,
    search_dt: f64,
    start_segment: Option<TrajectorySegment>,
) -> TrajectorySegment {
    let mut closest = match start_segment {
        Some(segment) => segment,
        None => trajectory.calculate_segment(0.0),
    };
    let mut closest_distance = (pose.translation - closest.translation).length();

    let mut at_end = false;
    while !at_end {
        let search_time = closest.time + search_dt;

        // Use the last segment if the search time exceeds the duration
        let segment = if search_time >= trajectory.duration() {
            at_end = true;
            trajectory.calculate_segment(trajectory.duration())
        } else {
            trajectory.calculate_segment(search_time)
        };

        // Once the distance starts increasing the previous segment was the
        // closest
        let distance = (pose.translation - segment.translation).length();
        if distance > closest_distance {
            break;
        }

        closest = segment;
        closest_distance = distance;
    }

    closest
}

/// Walk forward from the closest segment until the segment is at least the
/// lookahead distance away from the pose.
fn find_lookahead_segment(
    trajectory: &Trajectory,
    pose: &RigidTransform2,
    lookahead_distance: f64,
    search_dt: f64,
    start_segment: &TrajectorySegment,
) -> TrajectorySegment {
    let mut lookahead = *start_segment;
    let mut actual_distance = (pose.translation - lookahead.translation).length();

    let mut at_end = false;
    while actual_distance < lookahead_distance && !at_end {
        let search_time = lookahead.time + search_dt;

        if search_time >= trajectory.duration() {
            at_end = true;
            lookahead = trajectory.calculate_segment(trajectory.duration());
        } else {
            lookahead = trajectory.calculate_segment(search_time);
        }

        actual_distance = (pose.translation - lookahead.translation).length();
    }

    lookahead
}

/// Fit a segment from a point moving in a known direction to a target point.
///
/// The circle tangent to the direction of travel at `point_a` and passing
/// through `point_b` has its centre at the intersection of the perpendicular
/// to the travel direction at `point_a` with the perpendicular bisector of
/// the chord. When the travel direction points exactly at `point_b` the arc
/// degenerates to a straight line; when it points exactly away no connecting
/// arc exists, so a line out of `point_a` is produced in the hope that the
/// heading changes on a later tick.
fn pursuit_segment(point_a: Vector2, heading_a: Rotation2, point_b: Vector2) -> PathSegment {
    let delta = point_b - point_a;
    let midpoint = point_a.interpolate(point_b, 0.5);

    if heading_a.is_parallel(&delta.angle()) {
        if heading_a == delta.angle() {
            // Moving exactly towards the target
            return PathSegment::Line(LineSegment::new(point_a, point_b));
        } else {
            // Moving exactly away from the target
            return PathSegment::Line(LineSegment::new(point_a, point_a - delta));
        }
    }

    let center = RigidTransform2::new(point_a, heading_a.normal())
        .intersection(&RigidTransform2::new(midpoint, delta.angle().normal()));

    PathSegment::Arc(ArcSegment::new(point_a, point_b, center))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
