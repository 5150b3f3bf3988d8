//! Min/max scan over a spectral matrix

use super::matrix::SpectralMatrix;

/// Find the minimum and maximum element of a matrix in a single pass
///
/// Candidates start at `+inf` / `-inf`, so any finite element narrows them,
/// including grids whose values are all negative (decibel grids).
/// NaN elements compare false and never become a candidate.
///
/// # Returns
///
/// `(min, max)`. Every non-NaN element lies in `[min, max]`. A grid made
/// only of NaN returns `(inf, -inf)`.
pub fn min_max(matrix: &SpectralMatrix) -> (f32, f32) {
    let mut min_value = f32::INFINITY;
    let mut max_value = f32::NEG_INFINITY;

    for &value in matrix.as_slice() {
        if value > max_value {
            max_value = value;
        }
        if value < min_value {
            min_value = value;
        }
    }

    (min_value, max_value)
}

/// Maximum element of a matrix (see [`min_max`])
pub fn max_value(matrix: &SpectralMatrix) -> f32 {
    matrix
        .as_slice()
        .iter()
        .fold(f32::NEG_INFINITY, |acc, &v| if v > acc { v } else { acc })
}
