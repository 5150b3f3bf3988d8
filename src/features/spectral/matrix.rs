//! Dense 2-D grid of spectral values
//!
//! Rows are frequency bins, columns are time frames, storage is row-major.
//! A `SpectralMatrix` is never empty and never ragged: both are rejected at
//! construction, so the statistics and normalization code downstream can
//! assume at least one element.

use crate::error::MonitorError;
use crate::ml::model_input::FeatureShape;

/// Rectangular, non-empty grid of `f32` values (frequency bins × time frames)
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl SpectralMatrix {
    /// Build a matrix from row-major data
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidInput` if either dimension is zero or
    /// `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, MonitorError> {
        if rows == 0 || cols == 0 {
            return Err(MonitorError::InvalidInput(format!(
                "Spectral matrix must be non-empty, got {}x{}",
                rows, cols
            )));
        }

        let expected = rows.checked_mul(cols).ok_or_else(|| {
            MonitorError::InvalidInput(format!("Matrix dimensions overflow: {}x{}", rows, cols))
        })?;

        if data.len() != expected {
            return Err(MonitorError::InvalidInput(format!(
                "Matrix data length {} does not match {}x{}",
                data.len(),
                rows,
                cols
            )));
        }

        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from a vector of rows
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidInput` for an empty grid, an empty first
    /// row, or rows of differing length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, MonitorError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let row_count = rows.len();

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(MonitorError::InvalidInput(format!(
                "Ragged matrix: row {} has {} columns, expected {}",
                idx,
                row.len(),
                cols
            )));
        }

        let data = rows.into_iter().flatten().collect();
        Self::new(row_count, cols, data)
    }

    /// Matrix of the given shape with every element set to `value`
    pub fn filled(rows: usize, cols: usize, value: f32) -> Result<Self, MonitorError> {
        Self::new(rows, cols, vec![value; rows.saturating_mul(cols)])
    }

    /// Number of rows (frequency bins)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (time frames)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`
    pub fn shape(&self) -> FeatureShape {
        FeatureShape::new(self.rows, self.cols)
    }

    /// Element at `(row, col)`, `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        self.data.get(start..start + self.cols)
    }

    /// Row-major view of every element
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable row-major view; the shape itself cannot change
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the matrix and return its row-major storage
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Copy out as a vector of rows
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.data.chunks(self.cols).map(<[f32]>::to_vec).collect()
    }

    /// New matrix of identical shape with `f` applied to each element
    pub(crate) fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}
