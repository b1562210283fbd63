//! # Spline module
//!
//! A spline is a parametric polynomial curve `p(t)` over `t` in [0, 1],
//! represented as a basis matrix multiplied by a weight matrix. Keeping the
//! representation generic means different spline families (Hermite, Bezier)
//! share the same evaluation, derivative and conversion machinery: the
//! derivative is a matrix transform on the weight matrix, and converting
//! between families is a change of basis (`W1 = B1^-1 * B2 * W2`).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod bezier;
pub mod hermite;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, RowDVector};

// Internal
use super::{Rotation2, Vector2};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A parametric polynomial curve defined by a basis matrix and a weight
/// matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    /// The square basis matrix of the curve family, indexed by increasing
    /// power of `t` along the rows.
    basis: DMatrix<f64>,

    /// The weight matrix, one row per basis function, columns are x and y.
    weights: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when constructing or converting splines.
#[derive(Debug, thiserror::Error)]
pub enum SplineError {
    #[error("The basis matrix must be square, got {0}x{1}")]
    NonSquareBasis(usize, usize),

    #[error("The weight matrix ({0} rows) cannot be multiplied by the basis matrix ({1} columns)")]
    IncompatibleWeights(usize, usize),

    #[error("The weight matrix must have 2 columns (x and y), got {0}")]
    WrongWeightColumns(usize),

    #[error("Expected a spline of degree {expected}, got degree {actual}")]
    WrongDegree { expected: usize, actual: usize },

    #[error("The basis matrix is singular and cannot be inverted")]
    SingularBasis,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Spline {
    /// Create a new spline from a basis matrix and a weight matrix.
    pub fn new(basis: DMatrix<f64>, weights: DMatrix<f64>) -> Result<Self, SplineError> {
        if basis.nrows() != basis.ncols() {
            return Err(SplineError::NonSquareBasis(basis.nrows(), basis.ncols()));
        }
        if weights.nrows() != basis.ncols() {
            return Err(SplineError::IncompatibleWeights(
                weights.nrows(),
                basis.ncols(),
            ));
        }
        if weights.ncols() != 2 {
            return Err(SplineError::WrongWeightColumns(weights.ncols()));
        }

        Ok(Self { basis, weights })
    }

    /// The polynomial degree of the spline.
    pub fn degree(&self) -> usize {
        self.basis.ncols() - 1
    }

    pub fn basis_matrix(&self) -> &DMatrix<f64> {
        &self.basis
    }

    pub fn weight_matrix(&self) -> &DMatrix<f64> {
        &self.weights
    }

    /// Evaluate the position of the curve at `t`.
    pub fn point(&self, t: f64) -> Vector2 {
        let result = power_row(self.degree(), t) * &self.basis * &self.weights;

        Vector2::new(result[(0, 0)], result[(0, 1)])
    }

    /// Evaluate the heading (tangent direction) of the curve at `t`.
    pub fn heading(&self, t: f64) -> Rotation2 {
        let d = self.derivative().point(t);
        Rotation2::from_direction(d.x, d.y)
    }

    /// Evaluate the signed curvature of the curve at `t`.
    pub fn curvature(&self, t: f64) -> f64 {
        let d = self.derivative();
        let dd = d.derivative();

        let dv = d.point(t);
        let ddv = dd.point(t);

        // k = (p' x p'') / |p'|^3
        // https://en.wikipedia.org/wiki/Curvature#In_terms_of_a_general_parametrization
        dv.cross(&ddv) / (dv.dot(&dv) * dv.length())
    }

    /// The derivative of the spline, a spline of one lower degree.
    pub fn derivative(&self) -> Spline {
        let coefficients = &self.basis * &self.weights;

        let mut derivative_matrix = DMatrix::zeros(coefficients.nrows() - 1, coefficients.nrows());
        for i in 0..derivative_matrix.nrows() {
            derivative_matrix[(i, i + 1)] = (i + 1) as f64;
        }

        Self {
            basis: DMatrix::identity(self.degree(), self.degree()),
            weights: derivative_matrix * coefficients,
        }
    }

    /// Re-express this spline in a different basis of the same degree.
    ///
    /// The curve itself is unchanged, only the representation changes:
    /// `W1 = B1^-1 * B2 * W2`.
    pub fn with_basis(&self, basis: DMatrix<f64>) -> Result<Spline, SplineError> {
        if basis.nrows() != basis.ncols() {
            return Err(SplineError::NonSquareBasis(basis.nrows(), basis.ncols()));
        }
        if basis.ncols() != self.basis.ncols() {
            return Err(SplineError::WrongDegree {
                expected: basis.ncols() - 1,
                actual: self.degree(),
            });
        }

        let inverse_basis = basis.clone().try_inverse().ok_or(SplineError::SingularBasis)?;
        let weights = inverse_basis * &self.basis * &self.weights;

        Spline::new(basis, weights)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the row vector [1, t, t^2, ..., t^degree].
fn power_row(degree: usize, t: f64) -> RowDVector<f64> {
    let mut row = RowDVector::zeros(degree + 1);
    row[0] = 1.0;
    for i in 1..=degree {
        row[i] = row[i - 1] * t;
    }

    row
}

/// The binomial coefficient C(n, k).
pub(crate) fn binomial(n: usize, k: usize) -> f64 {
    let mut value = 1.0;
    for i in 0..k {
        value = value * (n - i) as f64 / (i + 1) as f64;
    }

    value
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 0), 1.0);
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(6, 3), 20.0);
    }

    #[test]
    fn test_derivative_lowers_degree() {
        let spline = hermite::cubic(
            super::super::RigidTransform2::ZERO,
            super::super::RigidTransform2::new(Vector2::new(1.0, 0.0), Rotation2::ZERO),
        );

        assert_eq!(spline.degree(), 3);
        assert_eq!(spline.derivative().degree(), 2);
        assert_eq!(spline.derivative().derivative().degree(), 1);
    }

    #[test]
    fn test_line_spline_has_zero_curvature() {
        let spline = hermite::cubic(
            super::super::RigidTransform2::ZERO,
            super::super::RigidTransform2::new(Vector2::new(4.0, 0.0), Rotation2::ZERO),
        );

        for t in [0.1, 0.5, 0.9].iter() {
            assert_abs_diff_eq!(spline.curvature(*t), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invalid_construction() {
        let basis = DMatrix::identity(3, 4);
        let weights = DMatrix::zeros(4, 2);
        assert!(matches!(
            Spline::new(basis, weights),
            Err(SplineError::NonSquareBasis(3, 4))
        ));

        let basis = DMatrix::identity(4, 4);
        let weights = DMatrix::zeros(4, 3);
        assert!(matches!(
            Spline::new(basis, weights),
            Err(SplineError::WrongWeightColumns(3))
        ));
    }
}
