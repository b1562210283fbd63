//! # Follow simulation
//!
//! This binary runs the full planning and tracking pipeline against a
//! simulated swerve chassis: waypoints are fitted into a path, the path is
//! time-parameterised into a trajectory, and a pure pursuit follower drives
//! a perfect-response four module robot along it under the periodic control
//! loop model. Each tick the simulated module telemetry is published as a
//! snapshot, odometry integrates the snapshot into a pose, and the follower
//! turns the pose into the next drive signal. A CSV trace of the run is
//! written into the session directory.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{env, sync::Arc};

use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use serde::Deserialize;

use swerve_ctrl::{
    control::{
        follower::{HolonomicPurePursuitControl, TrajectoryFollower},
        DrivetrainFeedforwardConstants, HolonomicFeedforward, PidConstants,
    },
    kinematics::{SwerveKinematics, SwerveOdometry},
    maths::{RigidTransform2, Rotation2, Vector2},
    path::{SplinePathGenerator, Waypoint},
    share::SnapshotCell,
    traj::{
        CentripetalAccelerationConstraint, MaxAccelerationConstraint, MaxVelocityConstraint,
        Trajectory, TrajectoryConstraint,
    },
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default parameter file path, relative to the working directory.
const DEFAULT_PARAMS_PATH: &str = "params/follow_sim.toml";

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulation.
#[derive(Debug, Deserialize)]
struct SimParams {
    /// Period of one control tick in seconds.
    control_period_s: f64,

    /// Module positions relative to the robot centre, metres.
    module_offsets_m: Vec<[f64; 2]>,

    /// Maximum module speed in m/s.
    max_module_speed_ms: f64,

    /// Maximum path velocity in m/s.
    max_velocity_ms: f64,

    /// Maximum path acceleration in m/s^2.
    max_acceleration_ms2: f64,

    /// Maximum centripetal acceleration through turns in m/s^2.
    max_centripetal_acceleration_ms2: f64,

    /// Pure pursuit lookahead distance in metres.
    lookahead_distance_m: f64,

    /// Rotation controller gains.
    rotation_pid: PidConstants,

    /// Translational feedforward constants.
    feedforward: DrivetrainFeedforwardConstants,

    /// Waypoints as [x, y, heading_deg, rotation_deg].
    waypoints: Vec<[f64; 4]>,
}

/// One tick of simulated module telemetry.
#[derive(Debug, Clone)]
struct ModuleTelemetry {
    velocities: Vec<Vector2>,
    gyro_angle: Rotation2,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    let session = Session::new("follow_sim", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Info, &session).wrap_err("Failed to initialise logging")?;

    info!("Follow simulation");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_PARAMS_PATH.to_string());
    let params: SimParams =
        util::params::load(&params_path).wrap_err("Could not load simulation params")?;

    info!("Parameters loaded from \"{}\"", params_path);

    // ---- PLANNING ----

    let waypoints: Vec<Waypoint> = params
        .waypoints
        .iter()
        .map(|w| {
            Waypoint::with_rotation(
                Vector2::new(w[0], w[1]),
                Rotation2::from_degrees(w[2]),
                Rotation2::from_degrees(w[3]),
            )
        })
        .collect();

    let generator = SplinePathGenerator::new();
    let path = generator
        .generate(&waypoints)
        .wrap_err("Failed to generate the path")?;

    info!(
        "Path generated: {} segments, {:.3} m",
        path.segments().len(),
        path.length()
    );

    let constraints: Vec<Box<dyn TrajectoryConstraint>> = vec![
        Box::new(MaxVelocityConstraint::new(params.max_velocity_ms)),
        Box::new(MaxAccelerationConstraint::new(params.max_acceleration_ms2)),
        Box::new(CentripetalAccelerationConstraint::new(
            params.max_centripetal_acceleration_ms2,
        )),
    ];

    let trajectory = Arc::new(Trajectory::new(path, &constraints));

    info!("Trajectory duration: {:.3} s", trajectory.duration());

    // ---- MODULE INIT ----

    let module_offsets: Vec<Vector2> = params
        .module_offsets_m
        .iter()
        .map(|offset| Vector2::new(offset[0], offset[1]))
        .collect();
    let module_count = module_offsets.len();

    let kinematics =
        SwerveKinematics::new(module_offsets.clone()).wrap_err("Failed to build kinematics")?;
    let mut odometry = SwerveOdometry::new(
        SwerveKinematics::new(module_offsets).wrap_err("Failed to build odometry kinematics")?,
    );

    let control = HolonomicPurePursuitControl::new(
        params.lookahead_distance_m,
        HolonomicFeedforward::new(params.feedforward),
        params.rotation_pid,
    );
    let (mut follower, handle) = TrajectoryFollower::new(control);

    // Telemetry flows through a snapshot cell, the same hand-off a real
    // telemetry thread would use
    let telemetry_cell = SnapshotCell::with_initial(ModuleTelemetry {
        velocities: vec![Vector2::ZERO; module_count],
        gyro_angle: Rotation2::ZERO,
    });

    // ---- TRACE OUTPUT ----

    let trace_path = session
        .data_file_path("trace.csv")
        .wrap_err("Failed to create the trace file")?;
    let mut trace = csv::Writer::from_path(&trace_path).wrap_err("Failed to open the trace file")?;
    trace
        .write_record(&["time_s", "pose_x_m", "pose_y_m", "pose_rotation_deg", "speed_ms"])
        .wrap_err("Failed to write the trace header")?;

    // ---- MAIN LOOP ----

    handle.follow(Arc::clone(&trajectory));

    info!("Beginning control loop\n");

    let dt = params.control_period_s;
    let mut time = 0.0;
    let mut started = false;

    let mut velocity = Vector2::ZERO;
    let mut rotational_velocity = 0.0;
    let mut gyro_angle = Rotation2::ZERO;

    loop {
        // Read this tick's telemetry snapshot before anything else so the
        // pose fed to the follower is never older than one tick
        let telemetry = match telemetry_cell.latest() {
            Some(t) => t,
            None => break,
        };

        let pose = odometry
            .update(telemetry.gyro_angle, dt, &telemetry.velocities)
            .wrap_err("Odometry update failed")?;

        let signal = follower.update(&pose, velocity, rotational_velocity, time, dt);

        match signal {
            Some(signal) => {
                started = true;

                // Field oriented commands are rotated into the robot frame
                // before the kinematics
                let robot_translation = if signal.field_oriented {
                    signal.translation.rotate_by(pose.rotation.inverse())
                } else {
                    signal.translation
                };

                let mut module_velocities = kinematics.to_module_velocities(
                    swerve_ctrl::kinematics::ChassisVelocity::new(robot_translation, signal.rotation),
                );
                SwerveKinematics::normalize_module_velocities(
                    &mut module_velocities,
                    params.max_module_speed_ms,
                );

                // Perfect response modules: the commanded velocities are next
                // tick's measured velocities
                gyro_angle = gyro_angle.rotate_by(Rotation2::from_radians(signal.rotation * dt));
                telemetry_cell.publish(ModuleTelemetry {
                    velocities: module_velocities,
                    gyro_angle,
                });

                velocity = signal.translation;
                rotational_velocity = signal.rotation;
            }
            None => {
                // Idle before the first tick processes the follow command is
                // fine, idle afterwards means the trajectory finished
                if started {
                    info!("Trajectory finished at t = {:.3} s", time);
                    break;
                }
            }
        }

        trace
            .write_record(&[
                format!("{:.4}", time),
                format!("{:.4}", pose.translation.x),
                format!("{:.4}", pose.translation.y),
                format!("{:.4}", pose.rotation.to_degrees()),
                format!("{:.4}", velocity.length()),
            ])
            .wrap_err("Failed to write a trace record")?;

        time += dt;

        if time > 4.0 * trajectory.duration() {
            warn!("Simulation overran four times the trajectory duration, stopping");
            break;
        }
    }

    trace.flush().wrap_err("Failed to flush the trace file")?;

    // ---- SUMMARY ----

    let pose = odometry.pose();
    let end = trajectory.calculate_segment(trajectory.duration());

    info!("Final pose: {}", pose);
    info!("Path end: {}", RigidTransform2::new(end.translation, end.rotation));
    info!(
        "Position error: {:.4} m",
        (pose.translation - end.translation).length()
    );
    info!("Trace written to {:?}", trace_path);

    Ok(())
}
