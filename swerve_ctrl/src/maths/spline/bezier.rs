//! Bezier spline constructors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DMatrix;

// Internal
use super::{binomial, Spline, SplineError};
use crate::maths::Vector2;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the Bernstein basis matrix for a Bezier curve of the given degree.
///
/// Row `i` holds the coefficients of `t^i` for each control point weight:
/// `m[i][j] = (-1)^(i-j) * C(degree, i) * C(i, j)` for `j <= i`.
pub fn basis_matrix(degree: usize) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(degree + 1, degree + 1);
    for i in 0..=degree {
        for j in 0..=i {
            matrix[(i, j)] = (-1f64).powi((i - j) as i32) * binomial(degree, i) * binomial(i, j);
        }
    }

    matrix
}

/// Create a cubic Bezier spline from its four control points.
pub fn cubic(start: Vector2, control1: Vector2, control2: Vector2, end: Vector2) -> Spline {
    from_control_points(&[start, control1, control2, end])
}

/// Create a quintic Bezier spline from its six control points.
pub fn quintic(
    start: Vector2,
    control1: Vector2,
    control2: Vector2,
    control3: Vector2,
    control4: Vector2,
    end: Vector2,
) -> Spline {
    from_control_points(&[start, control1, control2, control3, control4, end])
}

/// Create a Bezier spline of arbitrary degree from its control points.
pub fn from_control_points(control_points: &[Vector2]) -> Spline {
    let degree = control_points.len() - 1;

    let mut weights = DMatrix::zeros(control_points.len(), 2);
    for (i, point) in control_points.iter().enumerate() {
        weights[(i, 0)] = point.x;
        weights[(i, 1)] = point.y;
    }

    // Dimensions are consistent by construction
    Spline::new(basis_matrix(degree), weights).unwrap()
}

/// Extract the Bezier control points of a spline.
///
/// The spline is first re-expressed in the Bernstein basis of its own degree,
/// the weight rows are then the control points.
pub fn control_points(spline: &Spline) -> Result<Vec<Vector2>, SplineError> {
    let converted = spline.with_basis(basis_matrix(spline.degree()))?;
    let weights = converted.weight_matrix();

    Ok((0..weights.nrows())
        .map(|i| Vector2::new(weights[(i, 0)], weights[(i, 1)]))
        .collect())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
