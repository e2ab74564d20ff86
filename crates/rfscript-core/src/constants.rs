//! Numerical constants for RF calculations
//!
//! Standardized tolerance values used throughout the library.

/// Tolerance for detecting near-zero values in division and singularity checks.
pub const NEAR_ZERO: f64 = 1e-15;

/// Relative tolerance for the symmetry/reciprocity check in `half()`.
/// Measured 2xTHRU structures are never exactly symmetric.
pub const SYMMETRY_TOL: f64 = 1e-3;
