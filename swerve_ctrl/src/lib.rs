//! # Swerve control library
//!
//! This library provides motion planning and trajectory tracking for
//! holonomic (swerve drive) mobile robots running under a periodic control
//! loop. Waypoints are turned into smooth geometric paths, paths are
//! time-parameterised into trajectories under pluggable kinematic
//! constraints, and trajectory followers convert live pose feedback into
//! holonomic drive signals each control tick.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control module - PID, feedforward, and the trajectory followers
pub mod control;

/// Driver traits - capability interfaces for the hardware collaborators
pub mod drivers;

/// Kinematics module - swerve forward/inverse kinematics and odometry
pub mod kinematics;

/// Maths module - 2D vector/rotation/transform algebra and splines
pub mod maths;

/// Path module - path segments, paths and path builders
pub mod path;

/// Snapshot sharing - single writer cells for cross-thread state hand-off
pub mod share;

/// Trajectory module - motion profiles, constraints and trajectories
pub mod traj;
