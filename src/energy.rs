//! Internal-energy matrix of an active contour.
//!
//! The snake energy `E = ∫ α|v'|² + β|v''|² ds` is discretized with central
//! finite differences over the control points. Minimizing it leads to the
//! pentadiagonal system `A x = f`, where every row carries the self term `r`,
//! the first-neighbour term `q` and the second-neighbour term `p`. On a closed
//! curve the neighbours of point 0 are points N-1 and 1, so the bands wrap
//! around and `A` becomes circulant.
//!
//! The semi-implicit update of the contour solves `(A + γI) x_t = γ x_{t-1} + f`
//! at every step, which is why the inverse of the regularized matrix is built
//! once here and handed back to the caller for reuse.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::circulant;
use crate::error::{EnergyError, Result};

/// Pivots (or eigenvalues) smaller than `SINGULARITY_FACTOR * N * ε * scale`
/// are treated as zero.
const SINGULARITY_FACTOR: f64 = 8.0;

// --- Parameters ---

/// Weights of the internal energy functional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyParams {
    /// Tension, resistance to stretching.
    pub alpha: f64,
    /// Rigidity, resistance to bending.
    pub beta: f64,
    /// Regularization / step size of the semi-implicit update.
    pub gamma: f64,
}

impl EnergyParams {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Rejects NaN and infinite weights. Negative values are accepted.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)] {
            if !value.is_finite() {
                return Err(EnergyError::InvalidArgument(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Diagonal coefficients of the finite-difference energy operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Main diagonal, `2α + 6β`.
    pub r: f64,
    /// First off-diagonals, `-α - 4β`.
    pub q: f64,
    /// Second off-diagonals, `β`.
    pub p: f64,
}

impl Coefficients {
    pub fn from_weights(alpha: f64, beta: f64) -> Self {
        Self {
            r: 2.0 * alpha + 6.0 * beta,
            q: -alpha - 4.0 * beta,
            p: beta,
        }
    }

    /// Upper bound of the row-sum norm of the coefficient matrix.
    pub fn magnitude(&self) -> f64 {
        self.r.abs() + 2.0 * self.q.abs() + 2.0 * self.p.abs()
    }

    fn validate(&self) -> Result<()> {
        if self.r.is_finite() && self.q.is_finite() && self.p.is_finite() {
            Ok(())
        } else {
            Err(EnergyError::InvalidArgument(
                "energy weights overflow the diagonal coefficients".to_string(),
            ))
        }
    }
}

/// Topology of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Closed curve, the bands wrap around (circulant matrix).
    #[default]
    Closed,
    /// Open curve, the bands are truncated at both ends.
    Open,
}

/// Strategy used to invert the regularized matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inversion {
    /// General LU-based inversion.
    #[default]
    Dense,
    /// Diagonalization of the circulant matrix through the FFT.
    Circulant,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Closed => write!(f, "closed"),
            Boundary::Open => write!(f, "open"),
        }
    }
}

impl fmt::Display for Inversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inversion::Dense => write!(f, "dense"),
            Inversion::Circulant => write!(f, "circulant"),
        }
    }
}

/// Configuration of a single internal-energy matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyConfig {
    pub params: EnergyParams,
    pub num_points: usize,
    pub boundary: Boundary,
    pub inversion: Inversion,
}

impl EnergyConfig {
    /// Closed curve, dense inversion.
    pub fn new(params: EnergyParams, num_points: usize) -> Self {
        Self {
            params,
            num_points,
            boundary: Boundary::default(),
            inversion: Inversion::default(),
        }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_inversion(mut self, inversion: Inversion) -> Self {
        self.inversion = inversion;
        self
    }
}

// --- Matrix construction ---

pub(crate) fn validate_num_points(num_points: usize) -> Result<()> {
    if num_points < 1 {
        return Err(EnergyError::InvalidArgument(
            "num_points must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Builds the coefficient matrix `A` of the internal energy.
///
/// For a closed curve every row holds `r` on the diagonal, `q` one position
/// to either side and `p` two positions to either side, with indices taken
/// modulo `N`. This is the circulant matrix whose first row is
/// `[r, q, p, 0, …, 0, p, q]`. When `N < 5` some of the wrapped positions
/// coincide and their coefficients are added, so `N = 1` yields the scalar
/// `r + 2q + 2p`.
///
/// For an open curve the bands are simply cut at the matrix border.
///
/// # Arguments
/// * `coefficients` - The diagonal coefficients `r`, `q`, `p`.
/// * `num_points` - The number of control points `N`.
/// * `boundary` - Whether the curve is closed or open.
///
/// # Returns
/// A `Result` containing the `N x N` coefficient matrix.
pub fn build_coefficient_matrix(
    coefficients: &Coefficients,
    num_points: usize,
    boundary: Boundary,
) -> Result<DMatrix<f64>> {
    validate_num_points(num_points)?;
    coefficients.validate()?;

    let n = num_points as isize;
    let bands = [
        (0, coefficients.r),
        (1, coefficients.q),
        (-1, coefficients.q),
        (2, coefficients.p),
        (-2, coefficients.p),
    ];

    let mut matrix = DMatrix::<f64>::zeros(num_points, num_points);
    for row in 0..n {
        for &(offset, weight) in &bands {
            let col = row + offset;
            let col = match boundary {
                Boundary::Closed => col.rem_euclid(n),
                Boundary::Open if (0..n).contains(&col) => col,
                Boundary::Open => continue,
            };
            matrix[(row as usize, col as usize)] += weight;
        }
    }

    Ok(matrix)
}

fn regularize(matrix: &DMatrix<f64>, gamma: f64) -> DMatrix<f64> {
    let n = matrix.nrows();
    matrix + DMatrix::<f64>::identity(n, n) * gamma
}

/// Builds the regularized matrix `A + γI`.
pub fn build_regularized_matrix(
    params: &EnergyParams,
    num_points: usize,
    boundary: Boundary,
) -> Result<DMatrix<f64>> {
    params.validate()?;
    let coefficients = Coefficients::from_weights(params.alpha, params.beta);
    let matrix = build_coefficient_matrix(&coefficients, num_points, boundary)?;
    Ok(regularize(&matrix, params.gamma))
}

// --- Inversion ---

/// Fails with `SingularMatrix` when the smallest magnitude is negligible next
/// to `scale` (or the largest magnitude, whichever is bigger).
pub(crate) fn check_conditioning<I>(magnitudes: I, size: usize, scale: f64) -> Result<()>
where
    I: IntoIterator<Item = f64>,
{
    let (smallest, largest) = magnitudes
        .into_iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), m| (lo.min(m), hi.max(m)));
    let reference = largest.max(scale);
    let tolerance = SINGULARITY_FACTOR * size as f64 * f64::EPSILON * reference;

    if !(reference > 0.0) || !smallest.is_finite() || smallest <= tolerance {
        return Err(EnergyError::SingularMatrix { size });
    }
    Ok(())
}

pub(crate) fn invert_dense_scaled(matrix: &DMatrix<f64>, scale: f64) -> Result<DMatrix<f64>> {
    if !matrix.is_square() || matrix.nrows() == 0 {
        return Err(EnergyError::InvalidArgument(format!(
            "cannot invert a {}x{} matrix",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(EnergyError::InvalidArgument(
            "matrix contains non-finite entries".to_string(),
        ));
    }

    let size = matrix.nrows();
    let lu = matrix.clone().lu();
    check_conditioning(lu.u().diagonal().iter().map(|v| v.abs()), size, scale)?;

    lu.try_inverse().ok_or(EnergyError::SingularMatrix { size })
}

/// Inverts a square matrix through its LU decomposition.
///
/// The matrix is reported singular when its smallest pivot is negligible
/// compared to the row-sum norm of the matrix.
///
/// # Arguments
/// * `matrix` - The square matrix to invert.
///
/// # Returns
/// A `Result` containing the inverse matrix.
pub fn invert_dense(matrix: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let scale = matrix
        .row_iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0f64, f64::max);
    invert_dense_scaled(matrix, scale)
}

// --- Computed artifact ---

/// Coefficient matrix of a curve together with the inverse of its
/// regularized form.
///
/// The value is immutable; rebuild it when any parameter changes.
#[derive(Debug, Clone)]
pub struct InternalEnergy {
    config: EnergyConfig,
    coefficients: Coefficients,
    coefficient_matrix: DMatrix<f64>,
    inverse: DMatrix<f64>,
}

impl InternalEnergy {
    /// Builds and inverts the internal-energy matrix for `config`.
    ///
    /// # Arguments
    /// * `config` - Weights, point count, boundary and inversion strategy.
    ///
    /// # Returns
    /// A `Result` containing the computed `InternalEnergy`, or
    /// `InvalidArgument` / `SingularMatrix` errors.
    pub fn compute(config: EnergyConfig) -> Result<Self> {
        let EnergyConfig { params, num_points, boundary, inversion } = config;
        params.validate()?;
        validate_num_points(num_points)?;

        let coefficients = Coefficients::from_weights(params.alpha, params.beta);
        let coefficient_matrix = build_coefficient_matrix(&coefficients, num_points, boundary)?;

        // Singularity is judged against the size of the operator itself, so a
        // vanishing 1x1 matrix (r + 2q + 2p = 0) is not mistaken for a regular one.
        let scale = coefficients.magnitude() + params.gamma.abs();

        let inverse = match (inversion, boundary) {
            (Inversion::Dense, _) => {
                invert_dense_scaled(&regularize(&coefficient_matrix, params.gamma), scale)?
            }
            (Inversion::Circulant, Boundary::Closed) => {
                let first_row =
                    circulant::circulant_first_row(&coefficients, params.gamma, num_points)?;
                circulant::invert_circulant_scaled(&first_row, scale)?
            }
            (Inversion::Circulant, Boundary::Open) => {
                return Err(EnergyError::InvalidArgument(
                    "circulant inversion requires a closed boundary".to_string(),
                ));
            }
        };

        Ok(Self {
            config,
            coefficients,
            coefficient_matrix,
            inverse,
        })
    }

    pub fn config(&self) -> &EnergyConfig {
        &self.config
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// The unregularized matrix `A`.
    pub fn coefficient_matrix(&self) -> &DMatrix<f64> {
        &self.coefficient_matrix
    }

    /// `A + γI`.
    pub fn regularized_matrix(&self) -> DMatrix<f64> {
        regularize(&self.coefficient_matrix, self.config.params.gamma)
    }

    /// `(A + γI)^-1`.
    pub fn inverse(&self) -> &DMatrix<f64> {
        &self.inverse
    }

    pub fn into_inverse(self) -> DMatrix<f64> {
        self.inverse
    }

    /// Largest absolute deviation of `inverse * (A + γI)` from the identity.
    pub fn identity_residual(&self) -> f64 {
        let n = self.config.num_points;
        let product = &self.inverse * self.regularized_matrix();
        max_abs_deviation(&product, &DMatrix::identity(n, n))
    }
}

/// Returns the inverse of the regularized internal-energy matrix of a closed
/// curve with `num_points` control points.
///
/// # Arguments
/// * `alpha` - Tension weight.
/// * `beta` - Rigidity weight.
/// * `gamma` - Regularization added to the diagonal.
/// * `num_points` - Number of control points of the closed curve.
///
/// # Returns
/// A `Result` containing `(A + γI)^-1`, an `N x N` matrix.
pub fn build_internal_energy_inverse(
    alpha: f64,
    beta: f64,
    gamma: f64,
    num_points: usize,
) -> Result<DMatrix<f64>> {
    let config = EnergyConfig::new(EnergyParams::new(alpha, beta, gamma), num_points);
    InternalEnergy::compute(config).map(InternalEnergy::into_inverse)
}

// --- Structural checks ---

/// Largest absolute element-wise difference, infinite when the shapes differ.
pub fn max_abs_deviation(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    if a.shape() != b.shape() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f64, f64::max)
}

pub fn is_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    matrix.is_square() && max_abs_deviation(matrix, &matrix.transpose()) <= tolerance
}

/// Checks that every row is the previous one rotated right by one position.
pub fn is_circulant(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if !matrix.is_square() {
        return false;
    }
    let n = matrix.nrows();
    (1..n).all(|i| {
        (0..n).all(|j| (matrix[(i, j)] - matrix[(i - 1, (j + n - 1) % n)]).abs() <= tolerance)
    })
}
