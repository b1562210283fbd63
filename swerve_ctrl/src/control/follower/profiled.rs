//! Motion-profile tracking follower control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{FollowerControl, TrajectoryFollower};
use crate::control::{HolonomicDriveSignal, HolonomicFeedforward, PidConstants, PidController};
use crate::maths::{RigidTransform2, Vector2};
use crate::traj::{Trajectory, TrajectorySegment};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tracks the trajectory's profiled state directly: three PID loops
/// (forward, strafe, rotation) are re-targeted every tick to the current
/// segment of the trajectory, plus an open-loop feedforward term from the
/// segment's target velocity and acceleration.
pub struct HolonomicProfiledControl {
    forward_controller: PidController,
    strafe_controller: PidController,
    rotation_controller: PidController,

    feedforward: HolonomicFeedforward,

    last_segment: Option<TrajectorySegment>,

    finished: bool,
}

/// A trajectory follower tracking the motion profile directly.
pub type HolonomicProfiledFollower = TrajectoryFollower<HolonomicProfiledControl>;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HolonomicProfiledControl {
    pub fn new(
        translation_constants: PidConstants,
        rotation_constants: PidConstants,
        feedforward: HolonomicFeedforward,
    ) -> Self {
        let mut rotation_controller = PidController::new(rotation_constants);
        rotation_controller.set_continuous(true);
        rotation_controller.set_input_range(0.0, 2.0 * std::f64::consts::PI);

        Self {
            forward_controller: PidController::new(translation_constants),
            strafe_controller: PidController::new(translation_constants),
            rotation_controller,
            feedforward,
            last_segment: None,
            finished: false,
        }
    }

    /// The trajectory segment targeted on the last update, for telemetry.
    pub fn last_segment(&self) -> Option<&TrajectorySegment> {
        self.last_segment.as_ref()
    }
}

impl FollowerControl for HolonomicProfiledControl {
    fn calculate_drive_signal(
        &mut self,
        pose: &RigidTransform2,
        _velocity: Vector2,
        _rotational_velocity: f64,
        trajectory: &Trajectory,
        time: f64,
        dt: f64,
    ) -> HolonomicDriveSignal {
        if time > trajectory.duration() {
            self.finished = true;
            return HolonomicDriveSignal::stop();
        }

        let segment = trajectory.calculate_segment(time);
        self.last_segment = Some(segment);

        // Feedforward acts along the path tangent
        let tangent = Vector2::from_angle(segment.heading);
        let feedforward = self.feedforward.calculate_feedforward(
            tangent.scale(segment.velocity),
            tangent.scale(segment.acceleration),
        );

        // Each axis re-targets the segment's current state
        self.forward_controller.set_setpoint(segment.translation.x);
        self.strafe_controller.set_setpoint(segment.translation.y);
        self.rotation_controller
            .set_setpoint(segment.rotation.to_radians());

        HolonomicDriveSignal::new(
            Vector2::new(
                self.forward_controller.calculate(pose.translation.x, dt) + feedforward.x,
                self.strafe_controller.calculate(pose.translation.y, dt) + feedforward.y,
            ),
            self.rotation_controller
                .calculate(pose.rotation.to_radians(), dt),
            true,
        )
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn reset(&mut self) {
        self.forward_controller.reset();
        self.strafe_controller.reset();
        self.rotation_controller.reset();

        self.last_segment = None;
        self.finished = false;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::control::DrivetrainFeedforwardConstants;
    use crate::maths::Rotation2;
    use crate::path::SimplePathBuilder;
    use crate::traj::{MaxAccelerationConstraint, MaxVelocityConstraint, TrajectoryConstraint};
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn control() -> HolonomicProfiledControl {
        HolonomicProfiledControl::new(
            PidConstants::new(1.0, 0.0, 0.0),
            PidConstants::new(1.0, 0.0, 0.0),
            HolonomicFeedforward::new(DrivetrainFeedforwardConstants::new(1.0, 0.0, 0.0)),
        )
    }

    fn line_trajectory() -> Arc<Trajectory> {
        let path = SimplePathBuilder::new(Vector2::ZERO, Rotation2::ZERO)
            .line_to(Vector2::new(5.0, 0.0))
            .build()
            .unwrap();
        let constraints: Vec<Box<dyn TrajectoryConstraint>> = vec![
            Box::new(MaxVelocityConstraint::new(1.0)),
            Box::new(MaxAccelerationConstraint::new(1.0)),
        ];

        Arc::new(Trajectory::new(path, &constraints))
    }

    #[test]
    fn test_cruise_feedforward_matches_profiled_velocity() {
        let mut control = control();
        let trajectory = line_trajectory();

        // Mid-trajectory the profile cruises at 1.0. With the robot exactly
        // on the path the PID errors are zero and the signal is pure
        // feedforward along +x.
        let segment = trajectory.calculate_segment(3.0);
        let pose = RigidTransform2::new(segment.translation, segment.rotation);

        let signal = control.calculate_drive_signal(&pose, Vector2::ZERO, 0.0, &trajectory, 3.0, 0.005);

        assert!(signal.field_oriented);
        assert_abs_diff_eq!(signal.translation.x, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.translation.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.rotation, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_position_error_produces_correction() {
        let mut control = control();
        let trajectory = line_trajectory();

        let segment = trajectory.calculate_segment(3.0);
        // Robot half a metre left of the path
        let pose = RigidTransform2::new(
            segment.translation + Vector2::new(0.0, 0.5),
            Rotation2::ZERO,
        );

        let signal = control.calculate_drive_signal(&pose, Vector2::ZERO, 0.0, &trajectory, 3.0, 0.005);

        // The strafe controller pulls back towards the path
        assert!(signal.translation.y < 0.0);
    }

    #[test]
    fn test_finishes_after_duration() {
        let mut control = control();
        let trajectory = line_trajectory();

        assert!(!control.is_finished());

        let signal = control.calculate_drive_signal(
            &RigidTransform2::ZERO,
            Vector2::ZERO,
            0.0,
            &trajectory,
            trajectory.duration() + 0.01,
            0.005,
        );

        assert!(control.is_finished());
        assert_eq!(signal, HolonomicDriveSignal::stop());

        control.reset();
        assert!(!control.is_finished());
    }
}
