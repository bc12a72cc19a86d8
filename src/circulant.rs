//! Inversion of circulant matrices in the frequency domain.
//!
//! A circulant matrix is fully described by its first row `c`, and the product
//! of two circulant matrices is the cyclic convolution of their first rows. The
//! DFT turns that convolution into a point-wise product, so the inverse is the
//! circulant matrix whose first row is `IDFT(1 / DFT(c))`. The eigenvalues of
//! the matrix are the entries of `DFT(c)`.

use nalgebra::DMatrix;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::energy::{check_conditioning, validate_num_points, Coefficients};
use crate::error::{EnergyError, Result};

/// First row of the regularized closed-curve matrix `A + γI`.
///
/// Positions that coincide for short curves accumulate their coefficients,
/// matching `build_coefficient_matrix` with a closed boundary.
pub fn circulant_first_row(
    coefficients: &Coefficients,
    gamma: f64,
    num_points: usize,
) -> Result<Vec<f64>> {
    validate_num_points(num_points)?;
    let n = num_points;

    let mut row = vec![0.0; n];
    row[0] += coefficients.r + gamma;
    row[1 % n] += coefficients.q;
    row[(n - 1) % n] += coefficients.q;
    row[2 % n] += coefficients.p;
    row[(2 * n - 2) % n] += coefficients.p;

    Ok(row)
}

/// Eigenvalues of the circulant matrix with the given first row.
pub fn circulant_eigenvalues(first_row: &[f64]) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = first_row.iter().map(|&v| Complex::new(v, 0.0)).collect();
    if buffer.is_empty() {
        return buffer;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

pub(crate) fn invert_circulant_scaled(first_row: &[f64], scale: f64) -> Result<DMatrix<f64>> {
    let n = first_row.len();
    if n == 0 {
        return Err(EnergyError::InvalidArgument(
            "circulant matrix needs at least one element".to_string(),
        ));
    }
    if first_row.iter().any(|v| !v.is_finite()) {
        return Err(EnergyError::InvalidArgument(
            "circulant row contains non-finite entries".to_string(),
        ));
    }

    let eigenvalues = circulant_eigenvalues(first_row);
    check_conditioning(eigenvalues.iter().map(|l| l.norm()), n, scale)?;

    let mut spectrum: Vec<Complex<f64>> = eigenvalues.iter().map(|l| l.inv()).collect();
    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut spectrum);

    // rustfft leaves the inverse transform unnormalized.
    let inverse_row: Vec<f64> = spectrum.iter().map(|c| c.re / n as f64).collect();

    Ok(DMatrix::from_fn(n, n, |i, j| inverse_row[(j + n - i) % n]))
}

/// Inverts the circulant matrix with the given first row.
///
/// Each subsequent row of the matrix is the previous one rotated right by one
/// position. The matrix is reported singular when its smallest eigenvalue
/// magnitude is negligible compared to the row-sum norm.
///
/// # Arguments
/// * `first_row` - The first row of the circulant matrix.
///
/// # Returns
/// A `Result` containing the dense inverse, itself circulant.
pub fn invert_circulant(first_row: &[f64]) -> Result<DMatrix<f64>> {
    let scale = first_row.iter().map(|v| v.abs()).sum::<f64>();
    invert_circulant_scaled(first_row, scale)
}
