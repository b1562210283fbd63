//! # Trajectory followers
//!
//! A follower consumes live pose feedback and an installed trajectory and
//! produces a holonomic drive signal every control tick. The state machine
//! is shared between follower flavours: `Idle -> Following -> (Finished |
//! Idle on cancel)`.
//!
//! Follows and cancels usually originate from a different execution context
//! (a command dispatcher) than the periodic loop calling `update`, so they
//! arrive over a channel held by a [`FollowerHandle`] and are drained at the
//! top of each tick. Installing a trajectory does not start it: the next
//! `update` call observes the unset start time, captures the current time as
//! t0 and resets the control. This two-phase protocol means `follow` never
//! needs to know when the loop will next run.
//!
//! `cancel` is fire-and-forget: it does not wait for an in-flight `update`
//! to observe it, but the next `update` after a cancel is guaranteed to see
//! no trajectory.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod profiled;
mod pure_pursuit;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

// Internal
pub use profiled::*;
pub use pure_pursuit::*;

use crate::control::HolonomicDriveSignal;
use crate::maths::{RigidTransform2, Vector2};
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The pluggable part of a trajectory follower: turns the current pose and
/// trajectory state into a drive signal.
pub trait FollowerControl {
    /// Calculate the drive signal required to follow the trajectory.
    ///
    /// `time` is the time elapsed since the trajectory was started, `dt` the
    /// time since the last update.
    fn calculate_drive_signal(
        &mut self,
        pose: &RigidTransform2,
        velocity: Vector2,
        rotational_velocity: f64,
        trajectory: &Trajectory,
        time: f64,
        dt: f64,
    ) -> HolonomicDriveSignal;

    /// Whether the control has finished following the current trajectory.
    fn is_finished(&self) -> bool;

    /// Clear per-follow state. Called when a newly installed trajectory
    /// starts.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

enum FollowerCommand {
    Follow(Arc<Trajectory>),
    Cancel,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Cloneable handle used to install or cancel trajectories from outside the
/// periodic loop.
#[derive(Clone)]
pub struct FollowerHandle {
    sender: Sender<FollowerCommand>,
}

/// The trajectory-follower state machine.
///
/// Owned by the periodic loop driver; other contexts interact through a
/// [`FollowerHandle`].
pub struct TrajectoryFollower<C> {
    control: C,

    commands: Receiver<FollowerCommand>,

    /// The trajectory currently being followed, if any.
    current_trajectory: Option<Arc<Trajectory>>,

    /// The time following started, unset until the first update after a
    /// follow.
    start_time: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FollowerHandle {
    /// Install a trajectory. Following begins on the loop's next update.
    pub fn follow(&self, trajectory: Arc<Trajectory>) {
        // A dropped follower means there is nothing left to command
        let _ = self.sender.send(FollowerCommand::Follow(trajectory));
    }

    /// Cancel the current trajectory unconditionally.
    pub fn cancel(&self) {
        let _ = self.sender.send(FollowerCommand::Cancel);
    }
}

impl<C: FollowerControl> TrajectoryFollower<C> {
    /// Create a follower around the given control, returning the follower
    /// and the handle used to command it.
    pub fn new(control: C) -> (Self, FollowerHandle) {
        let (sender, commands) = channel();

        (
            Self {
                control,
                commands,
                current_trajectory: None,
                start_time: None,
            },
            FollowerHandle { sender },
        )
    }

    /// Install a trajectory directly, for callers in the same context as the
    /// periodic loop. Following begins on the next update.
    pub fn follow(&mut self, trajectory: Arc<Trajectory>) {
        self.current_trajectory = Some(trajectory);
        self.start_time = None;
    }

    /// Cancel the current trajectory unconditionally.
    pub fn cancel(&mut self) {
        self.current_trajectory = None;
        self.start_time = None;
    }

    /// The trajectory currently being followed, if any.
    pub fn current_trajectory(&self) -> Option<&Arc<Trajectory>> {
        self.current_trajectory.as_ref()
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Run one tick of the follower.
    ///
    /// Returns the drive signal to apply, or `None` when idle or when the
    /// current trajectory has just finished.
    pub fn update(
        &mut self,
        pose: &RigidTransform2,
        velocity: Vector2,
        rotational_velocity: f64,
        time: f64,
        dt: f64,
    ) -> Option<HolonomicDriveSignal> {
        // Observe commands sent since the last tick before doing anything
        // else, so a cancel issued between ticks always wins
        for command in self.commands.try_iter() {
            match command {
                FollowerCommand::Follow(trajectory) => {
                    self.current_trajectory = Some(trajectory);
                    self.start_time = None;
                }
                FollowerCommand::Cancel => {
                    self.current_trajectory = None;
                    self.start_time = None;
                }
            }
        }

        let trajectory = self.current_trajectory.clone()?;

        let start_time = match self.start_time {
            // First update since the follow was installed: this tick is t0
            None => {
                debug!("Starting trajectory ({:.3} s) at t = {:.3}", trajectory.duration(), time);
                self.start_time = Some(time);
                self.control.reset();
                time
            }
            Some(start_time) => {
                if self.control.is_finished() {
                    debug!("Trajectory finished at t = {:.3}", time);
                    self.current_trajectory = None;
                    self.start_time = None;
                    return None;
                }
                start_time
            }
        };

        Some(self.control.calculate_drive_signal(
            pose,
            velocity,
            rotational_velocity,
            &trajectory,
            time - start_time,
            dt,
        ))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A control which finishes after a fixed number of updates.
    struct CountingControl {
        updates: usize,
        finish_after: usize,
        resets: usize,
    }

    impl CountingControl {
        fn new(finish_after: usize) -> Self {
            Self {
                updates: 0,
                finish_after,
                resets: 0,
            }
        }
    }

    impl FollowerControl for CountingControl {
        fn calculate_drive_signal(
            &mut self,
            _pose: &RigidTransform2,
            _velocity: Vector2,
            _rotational_velocity: f64,
            _trajectory: &Trajectory,
            _time: f64,
            _dt: f64,
        ) -> HolonomicDriveSignal {
            self.updates += 1;
            HolonomicDriveSignal::new(Vector2::new(1.0, 0.0), 0.0, true)
        }

        fn is_finished(&self) -> bool {
            self.updates >= self.finish_after
        }

        fn reset(&mut self) {
            self.resets += 1;
            self.updates = 0;
        }
    }

    fn test_trajectory() -> Arc<Trajectory> {
        use crate::maths::Rotation2;
        use crate::path::SimplePathBuilder;
        use crate::traj::{MaxAccelerationConstraint, MaxVelocityConstraint, TrajectoryConstraint};

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
    fn test_idle_returns_nothing() {
        let (mut follower, _handle) = TrajectoryFollower::new(CountingControl::new(10));

        assert!(follower
            .update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 0.0, 0.005)
            .is_none());
    }

    #[test]
    fn test_follow_resets_on_next_update() {
        let (mut follower, handle) = TrajectoryFollower::new(CountingControl::new(10));

        handle.follow(test_trajectory());

        // No reset until the loop actually runs
        assert_eq!(follower.control().resets, 0);

        let signal = follower.update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 1.0, 0.005);
        assert!(signal.is_some());
        assert_eq!(follower.control().resets, 1);
    }

    #[test]
    fn test_finish_clears_trajectory() {
        let (mut follower, handle) = TrajectoryFollower::new(CountingControl::new(2));
        handle.follow(test_trajectory());

        // Start tick + one more before the control reports finished
        assert!(follower
            .update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 0.0, 0.005)
            .is_some());
        assert!(follower
            .update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 0.005, 0.005)
            .is_some());

        // The control now reports finished, the trajectory is cleared
        assert!(follower
            .update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 0.010, 0.005)
            .is_none());
        assert!(follower.current_trajectory().is_none());

        // And the follower stays idle afterwards
        assert!(follower
            .update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 0.015, 0.005)
            .is_none());
    }

    #[test]
    fn test_cancel_is_observed_by_next_update() {
        let (mut follower, handle) = TrajectoryFollower::new(CountingControl::new(100));
        handle.follow(test_trajectory());

        assert!(follower
            .update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 0.0, 0.005)
            .is_some());

        handle.cancel();

        assert!(follower
            .update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 0.005, 0.005)
            .is_none());
        assert!(follower.current_trajectory().is_none());
    }

    #[test]
    fn test_refollow_restarts_time_base() {
        let (mut follower, handle) = TrajectoryFollower::new(CountingControl::new(100));

        handle.follow(test_trajectory());
        follower.update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 5.0, 0.005);

        // Installing a new trajectory clears the start time, the next update
        // resets the control again and re-captures t0
        handle.follow(test_trajectory());
        follower.update(&RigidTransform2::ZERO, Vector2::ZERO, 0.0, 9.0, 0.005);

        assert_eq!(follower.control().resets, 2);
    }
}
