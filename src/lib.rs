//! # Snake Energy Library
//!
//! This library builds the internal-energy matrix used by active-contour
//! ("snake") curve fitting. The matrix encodes the discretized stretching and
//! bending energy of a curve, is regularized by a diagonal term and inverted
//! once, so that an outer evolution loop can reuse the inverse at every step.
//!
//! The main components are:
//! - `build_internal_energy_inverse`: the one-shot builder for closed curves.
//! - `EnergyConfig` / `InternalEnergy`: a configured build that keeps the
//!   coefficient matrix next to its inverse and reports diagnostics.
//! - `circulant`: inversion of circulant matrices through the FFT.
//! - `config`: plain-text defaults for the energy weights.

pub mod circulant;
pub mod config;
pub mod energy;
pub mod error;
pub mod text;

pub use energy::{
    build_coefficient_matrix, build_internal_energy_inverse, build_regularized_matrix,
    invert_dense, is_circulant, is_symmetric, max_abs_deviation, Boundary, Coefficients,
    EnergyConfig, EnergyParams, InternalEnergy, Inversion,
};
pub use error::{EnergyError, Result};
