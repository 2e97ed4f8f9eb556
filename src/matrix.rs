//! Dense matrix algebra over GF(2^8)
//!
//! Matrices here are small (at most 256×256, usually k×k for the shard
//! count k) and live off the hot path: they are built once per codec or
//! once per reconstruction. The layout is a single contiguous row-major
//! buffer with stride `cols`, which keeps `row()` a plain subslice so the
//! coding loops can borrow matrix rows directly.

use crate::error::{CodecError, Result};
use crate::galois;

/// A matrix of GF(2^8) elements in row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Matrix {
    /// Create a zero matrix
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Matrix {
        assert!(rows >= 1 && cols >= 1, "matrix dimensions must be >= 1");
        Matrix {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Create an identity matrix
    pub fn identity(size: usize) -> Matrix {
        let mut result = Matrix::new(size, size);
        for i in 0..size {
            result.set(i, i, 1);
        }
        result
    }

    /// Create a matrix from row-major data, checking that no row is ragged
    pub fn from_rows(init: Vec<Vec<u8>>) -> Result<Matrix> {
        if init.is_empty() || init[0].is_empty() {
            return Err(CodecError::ShapeMismatch(
                "matrix must have at least one row and one column".to_string(),
            ));
        }
        let cols = init[0].len();
        let mut data = Vec::with_capacity(init.len() * cols);
        for row in &init {
            if row.len() != cols {
                return Err(CodecError::ShapeMismatch(
                    "not all rows have the same number of columns".to_string(),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix {
            rows: init.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at (r, c); panics if out of bounds
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> u8 {
        assert!(r < self.rows, "row index out of range: {}", r);
        assert!(c < self.cols, "column index out of range: {}", c);
        self.data[r * self.cols + c]
    }

    /// Set element at (r, c); panics if out of bounds
    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: u8) {
        assert!(r < self.rows, "row index out of range: {}", r);
        assert!(c < self.cols, "column index out of range: {}", c);
        self.data[r * self.cols + c] = value;
    }

    /// Borrow one row as a slice
    #[inline]
    pub fn row(&self, r: usize) -> &[u8] {
        assert!(r < self.rows, "row index out of range: {}", r);
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Copy one row out as a fresh vector
    pub fn get_row(&self, r: usize) -> Vec<u8> {
        self.row(r).to_vec()
    }

    /// Matrix product `self · rhs`
    pub fn times(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(CodecError::ShapeMismatch(format!(
                "columns on left ({}) do not match rows on right ({})",
                self.cols, rhs.rows
            )));
        }
        let table = galois::GaloisTable::get();
        let mut result = Matrix::new(self.rows, rhs.cols);
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let mut value = 0u8;
                for i in 0..self.cols {
                    value ^= table.mul(self.get(r, i), rhs.get(i, c));
                }
                result.set(r, c, value);
            }
        }
        Ok(result)
    }

    /// Horizontal concatenation `[self | rhs]`
    pub fn augment(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.rows != rhs.rows {
            return Err(CodecError::ShapeMismatch(format!(
                "row counts differ: {} vs {}",
                self.rows, rhs.rows
            )));
        }
        let mut result = Matrix::new(self.rows, self.cols + rhs.cols);
        for r in 0..self.rows {
            for c in 0..self.cols {
                result.set(r, c, self.get(r, c));
            }
            for c in 0..rhs.cols {
                result.set(r, self.cols + c, rhs.get(r, c));
            }
        }
        Ok(result)
    }

    /// The submatrix covering rows `rmin..rmax` and columns `cmin..cmax`
    ///
    /// # Panics
    ///
    /// Panics if the half-open ranges are empty or exceed the dimensions.
    pub fn submatrix(&self, rmin: usize, cmin: usize, rmax: usize, cmax: usize) -> Matrix {
        assert!(rmin < rmax && rmax <= self.rows, "bad row range");
        assert!(cmin < cmax && cmax <= self.cols, "bad column range");
        let mut result = Matrix::new(rmax - rmin, cmax - cmin);
        for r in rmin..rmax {
            for c in cmin..cmax {
                result.set(r - rmin, c - cmin, self.get(r, c));
            }
        }
        result
    }

    /// Exchange two rows in place
    pub fn swap_rows(&mut self, r1: usize, r2: usize) {
        assert!(r1 < self.rows && r2 < self.rows, "row index out of range");
        if r1 == r2 {
            return;
        }
        let (lo, hi) = (r1.min(r2), r1.max(r2));
        let (head, tail) = self.data.split_at_mut(hi * self.cols);
        head[lo * self.cols..(lo + 1) * self.cols].swap_with_slice(&mut tail[..self.cols]);
    }

    /// Invert a square matrix via Gauss-Jordan elimination
    ///
    /// Returns [`CodecError::Singular`] when the matrix has no inverse, and
    /// [`CodecError::ShapeMismatch`] when it is not square.
    pub fn invert(&self) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(CodecError::ShapeMismatch(
                "only square matrices can be inverted".to_string(),
            ));
        }

        // Work on [self | I]; reducing the left half to the identity turns
        // the right half into the inverse.
        let mut work = self.augment(&Matrix::identity(self.rows))?;
        work.gauss_jordan()?;
        Ok(work.submatrix(0, self.rows, self.rows, self.cols * 2))
    }

    /// Reduce the left square half of an `n × 2n` work matrix to the identity
    fn gauss_jordan(&mut self) -> Result<()> {
        let table = galois::GaloisTable::get();
        let n = self.rows;

        // Clear below the diagonal, scaling each pivot to 1.
        for r in 0..n {
            if self.get(r, r) == 0 {
                // The first row below with a nonzero entry becomes the pivot row.
                for row_below in r + 1..n {
                    if self.get(row_below, r) != 0 {
                        self.swap_rows(r, row_below);
                        break;
                    }
                }
            }
            if self.get(r, r) == 0 {
                return Err(CodecError::Singular);
            }
            if self.get(r, r) != 1 {
                let scale = table.div(1, self.get(r, r));
                for c in 0..self.cols {
                    self.set(r, c, table.mul(self.get(r, c), scale));
                }
            }
            for row_below in r + 1..n {
                let scale = self.get(row_below, r);
                if scale != 0 {
                    for c in 0..self.cols {
                        let v = self.get(row_below, c) ^ table.mul(scale, self.get(r, c));
                        self.set(row_below, c, v);
                    }
                }
            }
        }

        // Clear above the diagonal.
        for d in 0..n {
            for row_above in 0..d {
                let scale = self.get(row_above, d);
                if scale != 0 {
                    for c in 0..self.cols {
                        let v = self.get(row_above, c) ^ table.mul(scale, self.get(d, c));
                        self.set(row_above, c, v);
                    }
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for Matrix {
    /// Prints as nested lists, e.g. `[[1, 2], [3, 4]]`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for r in 0..self.rows {
            if r != 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for c in 0..self.cols {
                if c != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.get(r, c))?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let m = Matrix::new(3, 4);
        for r in 0..3 {
            for c in 0..4 {
                assert_eq!(m.get(r, c), 0);
            }
        }
    }

    #[test]
    fn test_identity() {
        let m = Matrix::identity(3);
        assert_eq!(m.to_string(), "[[1, 0, 0], [0, 1, 0], [0, 0, 1]]");
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Matrix::from_rows(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert!(matches!(err, CodecError::ShapeMismatch(_)));
    }

    #[test]
    fn test_get_set_row() {
        let mut m = Matrix::new(2, 3);
        m.set(1, 2, 99);
        assert_eq!(m.get(1, 2), 99);
        assert_eq!(m.row(1), &[0, 0, 99]);
        assert_eq!(m.get_row(0), vec![0, 0, 0]);
    }

    #[test]
    fn test_times_identity() {
        let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4], vec![11, 12]]).unwrap();
        assert_eq!(Matrix::identity(3).times(&m).unwrap(), m);
        assert_eq!(m.times(&Matrix::identity(2)).unwrap(), m);
    }

    #[test]
    fn test_times_shape_mismatch() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(2, 3);
        assert!(matches!(
            a.times(&b),
            Err(CodecError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_augment_and_submatrix() {
        let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let b = Matrix::from_rows(vec![vec![5], vec![6]]).unwrap();
        let ab = a.augment(&b).unwrap();
        assert_eq!(ab.to_string(), "[[1, 2, 5], [3, 4, 6]]");
        assert_eq!(ab.submatrix(0, 0, 2, a.cols()), a);
        assert_eq!(ab.submatrix(0, 2, 2, 3), b);
    }

    #[test]
    fn test_swap_rows() {
        let mut m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]]).unwrap();
        m.swap_rows(0, 2);
        assert_eq!(m.to_string(), "[[5, 6], [3, 4], [1, 2]]");
        m.swap_rows(1, 1);
        assert_eq!(m.row(1), &[3, 4]);
    }

    #[test]
    fn test_invert() {
        // Vandermonde rows for the distinct elements 1, 2, 3.
        let m = Matrix::from_rows(vec![
            vec![1, 1, 1],
            vec![1, 2, 4],
            vec![1, 3, 5],
        ])
        .unwrap();
        let inv = m.invert().unwrap();
        assert_eq!(m.times(&inv).unwrap(), Matrix::identity(3));
        assert_eq!(inv.times(&m).unwrap(), Matrix::identity(3));
    }

    #[test]
    fn test_invert_needs_row_swap() {
        // Zero pivot in the top-left forces a swap before elimination.
        let m = Matrix::from_rows(vec![
            vec![0, 1, 2],
            vec![1, 0, 3],
            vec![4, 5, 0],
        ])
        .unwrap();
        let inv = m.invert().unwrap();
        assert_eq!(m.times(&inv).unwrap(), Matrix::identity(3));
    }

    #[test]
    fn test_invert_singular() {
        // Row 2 is row 0 XOR row 1, so the rank is 2.
        let m = Matrix::from_rows(vec![
            vec![1, 2, 3],
            vec![4, 5, 6],
            vec![5, 7, 5],
        ])
        .unwrap();
        assert_eq!(m.invert().unwrap_err(), CodecError::Singular);
    }

    #[test]
    fn test_invert_non_square() {
        let m = Matrix::new(2, 3);
        assert!(matches!(m.invert(), Err(CodecError::ShapeMismatch(_))));
    }
}
