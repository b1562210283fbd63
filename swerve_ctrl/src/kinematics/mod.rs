//! # Kinematics module
//!
//! Matrix-based conversion between chassis motion and per-module velocity
//! vectors for swerve drive bases, plus pose integration from module
//! telemetry.
//!
//! For an in-depth explanation of the underlying mathematics see section
//! 13.4.3 of https://file.tavsys.net/control/state-space-guide.pdf

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod odometry;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DMatrix;

// Internal
pub use odometry::*;

use crate::maths::Vector2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The velocity of the robot chassis w.r.t. the robot frame.
///
/// The `x` component of the translational velocity is the robot's forward
/// velocity (positive forwards), the `y` component the sideways velocity
/// (positive to the left). Positive rotational velocity is counter-clockwise,
/// in rad/s.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChassisVelocity {
    pub translational: Vector2,
    pub rotational: f64,
}

/// Converts between chassis velocities and swerve module velocities.
///
/// The module ordering fixed at construction is used for every conversion
/// afterwards and must match the physical module ordering used everywhere
/// else.
pub struct SwerveKinematics {
    module_offsets: Vec<Vector2>,

    /// Chassis velocity to module velocities, `2N x 3`.
    inverse_kinematics: DMatrix<f64>,

    /// Module velocities to chassis velocity, the Moore-Penrose
    /// pseudo-inverse of the inverse kinematics matrix.
    forward_kinematics: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by the kinematics module.
#[derive(Debug, thiserror::Error)]
pub enum KinematicsError {
    #[error("At least 1 module offset is required")]
    NoModules,

    #[error("Got {got} module velocities but the kinematics were built with {expected} modules")]
    ModuleCountMismatch { expected: usize, got: usize },

    #[error("Could not compute the forward kinematics matrix: {0}")]
    SingularKinematics(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisVelocity {
    pub fn new(translational: Vector2, rotational: f64) -> Self {
        Self {
            translational,
            rotational,
        }
    }
}

impl SwerveKinematics {
    /// Build the kinematics for a set of module positions relative to the
    /// robot's centre of rotation.
    pub fn new(module_offsets: Vec<Vector2>) -> Result<Self, KinematicsError> {
        if module_offsets.is_empty() {
            return Err(KinematicsError::NoModules);
        }

        // Row pair per module: the module velocity is the translational
        // velocity plus the tangential contribution of the rotation about
        // the module's offset
        let mut inverse_kinematics = DMatrix::zeros(module_offsets.len() * 2, 3);
        for (i, offset) in module_offsets.iter().enumerate() {
            inverse_kinematics[(i * 2, 0)] = 1.0;
            inverse_kinematics[(i * 2, 2)] = -offset.y;
            inverse_kinematics[(i * 2 + 1, 1)] = 1.0;
            inverse_kinematics[(i * 2 + 1, 2)] = offset.x;
        }

        let forward_kinematics = inverse_kinematics
            .clone()
            .pseudo_inverse(1e-9)
            .map_err(KinematicsError::SingularKinematics)?;

        Ok(Self {
            module_offsets,
            inverse_kinematics,
            forward_kinematics,
        })
    }

    /// The number of modules the kinematics were built with.
    pub fn module_count(&self) -> usize {
        self.module_offsets.len()
    }

    pub fn module_offsets(&self) -> &[Vector2] {
        &self.module_offsets
    }

    /// Convert a desired chassis velocity into the module velocities
    /// required to achieve it.
    ///
    /// The returned velocities may exceed what the modules can actually
    /// reach, use [`SwerveKinematics::normalize_module_velocities`] to scale
    /// them down.
    pub fn to_module_velocities(&self, velocity: ChassisVelocity) -> Vec<Vector2> {
        let chassis_vector = DMatrix::from_column_slice(
            3,
            1,
            &[
                velocity.translational.x,
                velocity.translational.y,
                velocity.rotational,
            ],
        );

        let module_matrix = &self.inverse_kinematics * chassis_vector;

        (0..self.module_offsets.len())
            .map(|i| Vector2::new(module_matrix[(i * 2, 0)], module_matrix[(i * 2 + 1, 0)]))
            .collect()
    }

    /// Convert a set of module velocities into the chassis velocity they
    /// produce.
    ///
    /// The module velocities must be in the same order as the offsets the
    /// kinematics were built with.
    pub fn to_chassis_velocity(
        &self,
        module_velocities: &[Vector2],
    ) -> Result<ChassisVelocity, KinematicsError> {
        if module_velocities.len() != self.module_offsets.len() {
            return Err(KinematicsError::ModuleCountMismatch {
                expected: self.module_offsets.len(),
                got: module_velocities.len(),
            });
        }

        let mut module_matrix = DMatrix::zeros(self.module_offsets.len() * 2, 1);
        for (i, velocity) in module_velocities.iter().enumerate() {
            module_matrix[(i * 2, 0)] = velocity.x;
            module_matrix[(i * 2 + 1, 0)] = velocity.y;
        }

        let chassis_vector = &self.forward_kinematics * module_matrix;

        Ok(ChassisVelocity::new(
            Vector2::new(chassis_vector[(0, 0)], chassis_vector[(1, 0)]),
            chassis_vector[(2, 0)],
        ))
    }

    /// Scale module velocities down so none exceeds a maximum.
    ///
    /// When any module's required speed is over the maximum every module is
    /// scaled by the same ratio, preserving the relative velocities between
    /// modules and therefore the shape of the commanded chassis motion.
    pub fn normalize_module_velocities(module_velocities: &mut [Vector2], max_velocity: f64) {
        let real_max = module_velocities
            .iter()
            .map(|m| m.length())
            .fold(0.0, f64::max);

        if real_max > max_velocity {
            for velocity in module_velocities.iter_mut() {
                *velocity = velocity.scale(max_velocity / real_max);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::maths::Rotation2;
    use approx::assert_abs_diff_eq;

    fn square_kinematics() -> SwerveKinematics {
        SwerveKinematics::new(vec![
            Vector2::new(12.0, 12.0),   // front left
            Vector2::new(12.0, -12.0),  // front right
            Vector2::new(-12.0, 12.0),  // back left
            Vector2::new(-12.0, -12.0), // back right
        ])
        .unwrap()
    }

    #[test]
    fn test_no_modules_is_rejected() {
        assert!(matches!(
            SwerveKinematics::new(vec![]),
            Err(KinematicsError::NoModules)
        ));
    }

    #[test]
    fn test_straight_line_inverse_kinematics() {
        let kinematics = square_kinematics();
        let velocities =
            kinematics.to_module_velocities(ChassisVelocity::new(Vector2::new(5.0, 0.0), 0.0));

        for velocity in &velocities {
            assert_abs_diff_eq!(velocity.length(), 5.0, epsilon = 1e-9);
            assert_abs_diff_eq!(velocity.angle().to_degrees(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_straight_strafe_inverse_kinematics() {
        let kinematics = square_kinematics();
        let velocities =
            kinematics.to_module_velocities(ChassisVelocity::new(Vector2::new(0.0, 5.0), 0.0));

        for velocity in &velocities {
            assert_abs_diff_eq!(velocity.length(), 5.0, epsilon = 1e-9);
            assert_abs_diff_eq!(velocity.angle().to_degrees(), 90.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_turn_in_place_inverse_kinematics() {
        let kinematics = square_kinematics();
        let velocities = kinematics.to_module_velocities(ChassisVelocity::new(
            Vector2::ZERO,
            2.0 * std::f64::consts::PI,
        ));

        // Module speed is omega * |offset| = 2pi * sqrt(288)
        let expected_angles = [135.0, 45.0, 225.0, 315.0];
        for (velocity, expected_angle) in velocities.iter().zip(expected_angles.iter()) {
            assert_abs_diff_eq!(velocity.length(), 106.63, epsilon = 0.1);
            assert_abs_diff_eq!(velocity.angle().to_degrees(), *expected_angle, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_forward_kinematics_round_trip() {
        let kinematics = square_kinematics();

        for chassis in [
            ChassisVelocity::new(Vector2::new(5.0, 0.0), 0.0),
            ChassisVelocity::new(Vector2::new(0.0, 5.0), 0.0),
            ChassisVelocity::new(Vector2::new(-2.0, 3.5), 1.2),
            ChassisVelocity::new(Vector2::ZERO, 2.0 * std::f64::consts::PI),
        ]
        .iter()
        {
            let modules = kinematics.to_module_velocities(*chassis);
            let recovered = kinematics.to_chassis_velocity(&modules).unwrap();

            assert_abs_diff_eq!(
                recovered.translational.x,
                chassis.translational.x,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                recovered.translational.y,
                chassis.translational.y,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(recovered.rotational, chassis.rotational, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_module_count_mismatch() {
        let kinematics = square_kinematics();
        let result = kinematics.to_chassis_velocity(&[Vector2::ZERO; 3]);

        assert!(matches!(
            result,
            Err(KinematicsError::ModuleCountMismatch { expected: 4, got: 3 })
        ));
    }

    #[test]
    fn test_normalize_module_velocities() {
        let mut velocities = vec![
            Vector2::new(5.0, 0.0),
            Vector2::new(6.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(7.0, 0.0),
        ];

        SwerveKinematics::normalize_module_velocities(&mut velocities, 5.5);

        // All modules scale by the same factor, the ratios are preserved
        let factor = 5.5 / 7.0;
        assert_abs_diff_eq!(velocities[0].length(), 5.0 * factor, epsilon = 1e-9);
        assert_abs_diff_eq!(velocities[1].length(), 6.0 * factor, epsilon = 1e-9);
        assert_abs_diff_eq!(velocities[2].length(), 4.0 * factor, epsilon = 1e-9);
        assert_abs_diff_eq!(velocities[3].length(), 7.0 * factor, epsilon = 1e-9);

        // The maximum module speed now exactly equals the cap
        let max = velocities.iter().map(|v| v.length()).fold(0.0, f64::max);
        assert_abs_diff_eq!(max, 5.5, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_leaves_velocities_under_cap_alone() {
        let mut velocities = vec![Vector2::new(3.0, 0.0), Vector2::new(2.0, 1.0)];
        let original = velocities.clone();

        SwerveKinematics::normalize_module_velocities(&mut velocities, 5.0);

        assert_eq!(velocities, original);
    }

    #[test]
    fn test_directions_preserved_after_normalization() {
        let mut velocities = vec![
            Vector2::from_angle(Rotation2::from_degrees(30.0)).scale(8.0),
            Vector2::from_angle(Rotation2::from_degrees(200.0)).scale(4.0),
        ];

        SwerveKinematics::normalize_module_velocities(&mut velocities, 2.0);

        assert_abs_diff_eq!(velocities[0].angle().to_degrees(), 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(velocities[1].angle().to_degrees(), 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            velocities[0].length() / velocities[1].length(),
            2.0,
            epsilon = 1e-9
        );
    }
}
