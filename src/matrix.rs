//! Dense row-major matrices.
//!
//! `Matrix` is the only numeric container in this crate. Column vectors are
//! `(n, 1)` matrices and row vectors are `(1, n)` matrices; the network keeps
//! activations, biases and deltas as column vectors.
//!
//! Shape-checked operations (`dot`, `checked_add`, `checked_sub`, `hadamard`, ...)
//! return [`Result`]. Raw element indexing panics on out-of-range access, like a
//! slice does.

use std::fmt;
use std::ops::{Div, Index, IndexMut, Mul, Neg};

use crate::matmul::gemm_f64;
use crate::{Error, Result};

/// Orientation used by vector conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Axis 0: a `(1, n)` row.
    Row,
    /// Axis 1: an `(n, 1)` column.
    Column,
}

impl TryFrom<usize> for Axis {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            0 => Ok(Axis::Row),
            1 => Ok(Axis::Column),
            other => Err(Error::InvalidArgument(format!(
                "axis must be 0 or 1, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    /// Row-major, `rows * cols` elements.
    data: Vec<f64>,
}

impl Matrix {
    /// Zero-filled `(rows, cols)` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix by calling `generator(rows, cols)` once per element, in row-major order.
    ///
    /// The generator is handed the matrix shape rather than the element position; it is meant
    /// for closures over a random source or a reader, e.g. `|_, _| gaussian(&mut rng)`.
    pub fn from_fn<F>(rows: usize, cols: usize, mut generator: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let len = rows * cols;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(generator(rows, cols));
        }
        Self { rows, cols, data }
    }

    /// Wraps a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidShape(format!(
                "buffer length {} does not match rows * cols ({rows} * {cols})",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from nested rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Builds a `(1, n)` row or an `(n, 1)` column from a slice.
    pub fn from_slice(values: &[f64], axis: Axis) -> Self {
        let (rows, cols) = match axis {
            Axis::Row => (1, values.len()),
            Axis::Column => (values.len(), 1),
        };
        Self {
            rows,
            cols,
            data: values.to_vec(),
        }
    }

    /// Shorthand for `from_slice(values, Axis::Column)`.
    #[inline]
    pub fn column(values: &[f64]) -> Self {
        Self::from_slice(values, Axis::Column)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                let dst = out.offset(j, i);
                out.data[dst] = self.data[self.offset(i, j)];
            }
        }
        out
    }

    /// Matrix product `self * other`.
    ///
    /// Requires `self.cols() == other.rows()`; the result is `(self.rows(), other.cols())`.
    pub fn dot(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::ShapeMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        gemm_f64(
            self.rows,
            other.cols,
            self.cols,
            &self.data,
            &other.data,
            &mut out.data,
        );
        Ok(out)
    }

    pub fn checked_add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn checked_sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    /// Elementwise product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "multiply elementwise", |a, b| a * b)
    }

    /// `self += other`, elementwise.
    pub fn add_in_place(&mut self, other: &Matrix) -> Result<()> {
        self.ensure_same_shape(other, "accumulate")?;
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }

    /// `self -= scale * other`, elementwise.
    pub fn sub_scaled_in_place(&mut self, other: &Matrix, scale: f64) -> Result<()> {
        self.ensure_same_shape(other, "subtract")?;
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a -= scale * b;
        }
        Ok(())
    }

    /// Applies `f` to every element, producing a new matrix of the same shape.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    pub fn map_in_place<F: Fn(f64) -> f64>(&mut self, f: F) {
        for x in &mut self.data {
            *x = f(*x);
        }
    }

    /// Flattens a row or column vector into its values, in order.
    ///
    /// Fails with [`Error::InvalidShape`] when both dimensions are greater than 1.
    pub fn to_vec(&self) -> Result<Vec<f64>> {
        if self.rows > 1 && self.cols > 1 {
            return Err(Error::InvalidShape(format!(
                "{}x{} matrix is not a vector",
                self.rows, self.cols
            )));
        }
        Ok(self.data.clone())
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.data.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }

    /// Copies row `k` (as `(1, cols)`) or column `k` (as `(rows, 1)`).
    pub fn get_vector(&self, k: usize, axis: Axis) -> Result<Matrix> {
        match axis {
            Axis::Row => {
                if k >= self.rows {
                    return Err(Error::IndexOutOfRange(format!(
                        "row {k} of a matrix with {} rows",
                        self.rows
                    )));
                }
                let start = self.offset(k, 0);
                Ok(Matrix::from_slice(
                    &self.data[start..start + self.cols],
                    Axis::Row,
                ))
            }
            Axis::Column => {
                if k >= self.cols {
                    return Err(Error::IndexOutOfRange(format!(
                        "column {k} of a matrix with {} columns",
                        self.cols
                    )));
                }
                let values: Vec<f64> = (0..self.rows).map(|i| self[(i, k)]).collect();
                Ok(Matrix::from_slice(&values, Axis::Column))
            }
        }
    }

    fn ensure_same_shape(&self, other: &Matrix, op: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch(format!(
                "cannot {op} {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Matrix, op: &str, f: F) -> Result<Matrix> {
        self.ensure_same_shape(other, op)?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        let idx = self.offset(row, col);
        &mut self.data[idx]
    }
}

/// Flat (row-major) element access.
impl Index<usize> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, idx: usize) -> &f64 {
        &self.data[idx]
    }
}

impl IndexMut<usize> for Matrix {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut f64 {
        &mut self.data[idx]
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f64) -> Matrix {
        self.map(|x| x * scalar)
    }
}

impl Mul<f64> for Matrix {
    type Output = Matrix;

    fn mul(mut self, scalar: f64) -> Matrix {
        self.map_in_place(|x| x * scalar);
        self
    }
}

impl Mul<&Matrix> for f64 {
    type Output = Matrix;

    fn mul(self, mat: &Matrix) -> Matrix {
        mat * self
    }
}

/// Multiplies by the reciprocal, so dividing by zero yields infinities/NaN rather than an error.
impl Div<f64> for &Matrix {
    type Output = Matrix;

    fn div(self, scalar: f64) -> Matrix {
        self * (1.0 / scalar)
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self * -1.0
    }
}

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self * -1.0
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for j in 0..self.cols {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", self[(i, j)])?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
