//! Swerve odometry
//!
//! Dead-reckoning pose estimation from module telemetry and gyro heading.
//! The gyro is the authoritative heading source: each update rotates the
//! measured chassis velocity into the field frame using the externally
//! supplied gyro angle and integrates, and the pose's rotation is set to the
//! gyro angle directly rather than integrated.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{KinematicsError, SwerveKinematics};
use crate::drivers::{Gyroscope, SwerveModuleIo};
use crate::maths::{RigidTransform2, Rotation2, Vector2};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Integrates module velocities and gyro heading into a field-frame pose.
pub struct SwerveOdometry {
    kinematics: SwerveKinematics,
    pose: RigidTransform2,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveOdometry {
    /// Create odometry starting at the zero pose.
    pub fn new(kinematics: SwerveKinematics) -> Self {
        Self::with_pose(kinematics, RigidTransform2::ZERO)
    }

    /// Create odometry starting at the given pose.
    pub fn with_pose(kinematics: SwerveKinematics, initial_pose: RigidTransform2) -> Self {
        Self {
            kinematics,
            pose: initial_pose,
        }
    }

    /// The current estimated pose.
    pub fn pose(&self) -> RigidTransform2 {
        self.pose
    }

    /// Re-anchor the whole pose.
    pub fn reset_pose(&mut self, pose: RigidTransform2) {
        self.pose = pose;
    }

    /// Re-anchor the position, keeping the current rotation.
    pub fn reset_position(&mut self, position: Vector2) {
        self.pose = RigidTransform2::new(position, self.pose.rotation);
    }

    /// Re-anchor the rotation (e.g. after a gyro re-zero), keeping the
    /// current position.
    pub fn reset_rotation(&mut self, gyro_angle: Rotation2) {
        self.pose = RigidTransform2::new(self.pose.translation, gyro_angle);
    }

    /// Advance the pose estimate by one control period.
    ///
    /// The module velocities must be in the same fixed order as the
    /// kinematics were built with.
    pub fn update(
        &mut self,
        gyro_angle: Rotation2,
        dt: f64,
        module_velocities: &[Vector2],
    ) -> Result<RigidTransform2, KinematicsError> {
        let velocity = self.kinematics.to_chassis_velocity(module_velocities)?;

        // Rotate the robot-frame translational velocity into the field frame
        // with the gyro heading and integrate
        let field_velocity = velocity.translational.rotate_by(gyro_angle);

        self.pose = RigidTransform2::new(
            self.pose.translation + field_velocity.scale(dt),
            gyro_angle,
        );

        Ok(self.pose)
    }

    /// Advance the pose estimate by reading the module and gyro
    /// collaborators directly.
    ///
    /// The modules must be in the same fixed order as the kinematics were
    /// built with.
    pub fn update_from_io(
        &mut self,
        gyro: &dyn Gyroscope,
        dt: f64,
        modules: &[&dyn SwerveModuleIo],
    ) -> Result<RigidTransform2, KinematicsError> {
        let module_velocities: Vec<Vector2> = modules
            .iter()
            .map(|module| module.current_velocity_vector())
            .collect();

        self.update(gyro.angle(), dt, &module_velocities)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square_odometry() -> SwerveOdometry {
        SwerveOdometry::new(
            SwerveKinematics::new(vec![
                Vector2::new(12.0, 12.0),
                Vector2::new(12.0, -12.0),
                Vector2::new(-12.0, 12.0),
                Vector2::new(-12.0, -12.0),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_forward() {
        let mut odometry = square_odometry();

        let module_velocities = [Vector2::new(5.0, 0.0); 4];
        let pose = odometry
            .update(Rotation2::ZERO, 1.0, &module_velocities)
            .unwrap();

        assert_abs_diff_eq!(pose.translation.x, 5.0, epsilon = 0.01);
        assert_abs_diff_eq!(pose.translation.y, 0.0, epsilon = 0.01);
        assert_abs_diff_eq!(pose.rotation.to_degrees(), 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_strafe() {
        let mut odometry = square_odometry();

        let module_velocities = [Vector2::new(0.0, 5.0); 4];
        let pose = odometry
            .update(Rotation2::ZERO, 1.0, &module_velocities)
            .unwrap();

        assert_abs_diff_eq!(pose.translation.x, 0.0, epsilon = 0.01);
        assert_abs_diff_eq!(pose.translation.y, 5.0, epsilon = 0.01);
        assert_abs_diff_eq!(pose.rotation.to_degrees(), 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_gyro_rotates_translation_into_field_frame() {
        let mut odometry = square_odometry();

        // Driving "forward" in the robot frame while the gyro reads 90
        // degrees moves the robot along field +y
        let module_velocities = [Vector2::new(5.0, 0.0); 4];
        let pose = odometry
            .update(Rotation2::from_degrees(90.0), 1.0, &module_velocities)
            .unwrap();

        assert_abs_diff_eq!(pose.translation.x, 0.0, epsilon = 0.01);
        assert_abs_diff_eq!(pose.translation.y, 5.0, epsilon = 0.01);
        assert_abs_diff_eq!(pose.rotation.to_degrees(), 90.0, epsilon = 0.01);
    }

    #[test]
    fn test_gyro_angle_reset_only_changes_rotation() {
        let mut odometry = square_odometry();

        odometry.reset_pose(RigidTransform2::new(
            Vector2::new(-254.1323, 1114.2056),
            Rotation2::from_degrees(330.0),
        ));
        odometry.reset_rotation(Rotation2::from_degrees(148.2767));

        let pose = odometry.pose();
        assert_abs_diff_eq!(pose.translation.x, -254.1323, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.translation.y, 1114.2056, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.rotation.to_degrees(), 148.2767, epsilon = 1e-9);
    }

    #[test]
    fn test_starts_at_zero_pose() {
        let odometry = square_odometry();
        let pose = odometry.pose();

        assert_abs_diff_eq!(pose.translation.x, 0.0);
        assert_abs_diff_eq!(pose.translation.y, 0.0);
        assert_abs_diff_eq!(pose.rotation.to_degrees(), 0.0);
    }

    #[test]
    fn test_update_from_io() {
        struct FixedModule(Vector2);

        impl SwerveModuleIo for FixedModule {
            fn current_angle(&self) -> f64 {
                self.0.angle().to_radians()
            }

            fn current_velocity(&self) -> f64 {
                self.0.length()
            }

            fn set_target_velocity(&mut self, velocity: Vector2) {
                self.0 = velocity;
            }
        }

        struct FixedGyro(Rotation2);

        impl Gyroscope for FixedGyro {
            fn angle(&self) -> Rotation2 {
                self.0
            }

            fn rate(&self) -> f64 {
                0.0
            }
        }

        let mut odometry = square_odometry();

        let modules: Vec<FixedModule> = (0..4).map(|_| FixedModule(Vector2::new(5.0, 0.0))).collect();
        let module_refs: Vec<&dyn SwerveModuleIo> =
            modules.iter().map(|m| m as &dyn SwerveModuleIo).collect();

        let pose = odometry
            .update_from_io(&FixedGyro(Rotation2::ZERO), 1.0, &module_refs)
            .unwrap();

        assert_abs_diff_eq!(pose.translation.x, 5.0, epsilon = 0.01);
        assert_abs_diff_eq!(pose.translation.y, 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_mismatched_module_count_is_rejected() {
        let mut odometry = square_odometry();

        assert!(matches!(
            odometry.update(Rotation2::ZERO, 0.005, &[Vector2::ZERO; 2]),
            Err(KinematicsError::ModuleCountMismatch { expected: 4, got: 2 })
        ));
    }
}
