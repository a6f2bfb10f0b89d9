//! Dense row-major matrix used for layer weights and activations.
//!
//! [`Matrix`] is intentionally small: it only provides the operations a feedforward pass
//! and weight mutation need. Every binary operation checks operand shapes up front and
//! returns [`DimensionMismatchError`] without touching either operand when they disagree.
//!
//! # Example
//!
//! ```
//! use evonet_network::matrix::Matrix;
//!
//! let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]);
//! let b = Matrix::from_column(&[1.0, 1.0]);
//! let c = a.multiply(&b).unwrap();
//! assert_eq!(c.shape(), (2, 1));
//! assert_eq!(c.as_slice(), &[3.0, 7.0]);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::DimensionMismatchError;

/// A `rows × cols` grid of `f64` values stored in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = String;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        let Some(len) = raw.rows.checked_mul(raw.cols) else {
            return Err(format!("matrix shape {}x{} is too large", raw.rows, raw.cols));
        };
        if raw.data.len() != len {
            return Err(format!(
                "matrix data has {} entries, expected {}x{}",
                raw.data.len(),
                raw.rows,
                raw.cols
            ));
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

impl Matrix {
    /// Creates a matrix filled with zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix whose entries are drawn independently and uniformly from `[lo, hi]`.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi` or either bound is not finite.
    pub fn random<R>(rows: usize, cols: usize, lo: f64, hi: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut m = Self::zeros(rows, cols);
        m.randomize_uniform(lo, hi, rng);
        m
    }

    /// Builds a matrix from fixed-width rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use evonet_network::matrix::Matrix;
    ///
    /// let m = Matrix::from_rows(&[[1.0, 2.0, 3.0]]);
    /// assert_eq!(m.shape(), (1, 3));
    /// assert_eq!(m.get(0, 2), 3.0);
    /// ```
    #[must_use]
    pub fn from_rows<const N: usize>(rows: &[[f64; N]]) -> Self {
        Self {
            rows: rows.len(),
            cols: N,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    /// Builds an `n × 1` column vector.
    #[must_use]
    pub fn from_column(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col]
    }

    /// Returns all entries in row-major order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consumes the matrix and returns its entries in row-major order.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Computes the matrix product `self * rhs`.
    ///
    /// Fails when `self.cols() != rhs.rows()`.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix, DimensionMismatchError> {
        if self.cols != rhs.rows {
            return Err(DimensionMismatchError::new("multiply", self, rhs));
        }
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            let lhs_row = &self.data[i * self.cols..(i + 1) * self.cols];
            for j in 0..rhs.cols {
                out.data[i * rhs.cols + j] = lhs_row
                    .iter()
                    .enumerate()
                    .map(|(k, a)| a * rhs.data[k * rhs.cols + j])
                    .sum();
            }
        }
        Ok(out)
    }

    /// Adds `rhs` element-wise. Shapes must match exactly.
    pub fn add_in_place(&mut self, rhs: &Matrix) -> Result<(), DimensionMismatchError> {
        if self.shape() != rhs.shape() {
            return Err(DimensionMismatchError::new("add", self, rhs));
        }
        for (a, b) in self.data.iter_mut().zip(&rhs.data) {
            *a += b;
        }
        Ok(())
    }

    /// Adds `value` to every entry.
    pub fn add_scalar_in_place(&mut self, value: f64) {
        for a in &mut self.data {
            *a += value;
        }
    }

    /// Replaces every entry `x` with `f(x)`.
    pub fn map_in_place<F>(&mut self, mut f: F)
    where
        F: FnMut(f64) -> f64,
    {
        for a in &mut self.data {
            *a = f(*a);
        }
    }

    /// Overwrites every entry with an independent uniform draw from `[lo, hi]`.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi` or either bound is not finite.
    pub fn randomize_uniform<R>(&mut self, lo: f64, hi: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for a in &mut self.data {
            *a = rng.random_range(lo..=hi);
        }
    }
}
