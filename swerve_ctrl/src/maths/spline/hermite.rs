//! Hermite spline constructors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DMatrix;

// Internal
use super::Spline;
use crate::maths::{RigidTransform2, Vector2};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tangent magnitude as a multiple of the chord length for cubic splines.
/// Larger values produce "looser" curves which swing wider between the
/// endpoints.
const CUBIC_TANGENT_SCALE: f64 = 2.0;

/// Tangent magnitude as a multiple of the chord length for quintic splines.
const QUINTIC_TANGENT_SCALE: f64 = 1.2;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Create a cubic Hermite spline between two poses.
///
/// The tangent at each endpoint points along the pose's rotation, with a
/// magnitude scaled from the chord length.
pub fn cubic(start: RigidTransform2, end: RigidTransform2) -> Spline {
    let scale = CUBIC_TANGENT_SCALE * (end.translation - start.translation).length();

    cubic_with_tangents(
        start.translation,
        Vector2::from_angle(start.rotation).scale(scale),
        end.translation,
        Vector2::from_angle(end.rotation).scale(scale),
    )
}

/// Create a cubic Hermite spline with explicit endpoint tangent vectors.
pub fn cubic_with_tangents(
    start: Vector2,
    start_tangent: Vector2,
    end: Vector2,
    end_tangent: Vector2,
) -> Spline {
    // Basis functions of the cubic Hermite family by increasing power of t,
    // weights are the rows [p0, p1, t0, t1].
    let basis = DMatrix::from_row_slice(
        4,
        4,
        &[
            1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            -3.0, 3.0, -2.0, -1.0, //
            2.0, -2.0, 1.0, 1.0, //
        ],
    );

    let weights = DMatrix::from_row_slice(
        4,
        2,
        &[
            start.x,
            start.y,
            end.x,
            end.y,
            start_tangent.x,
            start_tangent.y,
            end_tangent.x,
            end_tangent.y,
        ],
    );

    // The dimensions are fixed above so construction cannot fail
    Spline::new(basis, weights).unwrap()
}

/// Create a quintic Hermite spline between two poses.
///
/// Second derivatives at both endpoints are assumed to be zero, which keeps
/// curvature low where segments join.
pub fn quintic(start: RigidTransform2, end: RigidTransform2) -> Spline {
    let scale = QUINTIC_TANGENT_SCALE * (end.translation - start.translation).length();

    let p0 = start.translation;
    let p1 = end.translation;
    let d0 = Vector2::from_angle(start.rotation).scale(scale);
    let d1 = Vector2::from_angle(end.rotation).scale(scale);

    // Closed form polynomial coefficients for the quintic with zero second
    // derivative boundary conditions, by increasing power of t.
    let coefficient =
        |x0: f64, x1: f64, dx0: f64, dx1: f64| -> [f64; 6] {
            [
                x0,
                dx0,
                0.0,
                -10.0 * x0 - 6.0 * dx0 - 4.0 * dx1 + 10.0 * x1,
                15.0 * x0 + 8.0 * dx0 + 7.0 * dx1 - 15.0 * x1,
                -6.0 * x0 - 3.0 * dx0 - 3.0 * dx1 + 6.0 * x1,
            ]
        };

    let x = coefficient(p0.x, p1.x, d0.x, d1.x);
    let y = coefficient(p0.y, p1.y, d0.y, d1.y);

    let mut weights = DMatrix::zeros(6, 2);
    for i in 0..6 {
        weights[(i, 0)] = x[i];
        weights[(i, 1)] = y[i];
    }

    // Polynomial coefficient form: the basis is the identity
    Spline::new(DMatrix::identity(6, 6), weights).unwrap()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
