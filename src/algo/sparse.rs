//! Triplet-built sparse matrices.
//!
//! This module provides a lightweight compressed sparse row (CSR) matrix that is
//! generic over its scalar, and a [`TripletBuilder`] that collects entries and
//! finalizes into the immutable matrix exactly once.

use std::ops::{AddAssign, Mul};

use nalgebra::{DMatrix, DVector, Scalar};
use num_traits::Zero;

/// Accumulates `(row, col, value)` entries for one matrix.
///
/// Entries may be pushed in any order; duplicates are summed and exact zeros
/// are dropped when [`finish`](Self::finish) is called.
#[derive(Debug, Clone)]
pub struct TripletBuilder<T> {
    rows: usize,
    cols: usize,
    triplets: Vec<(usize, usize, T)>,
}

impl<T> TripletBuilder<T>
where
    T: Copy + Zero + AddAssign + PartialEq,
{
    /// Create an empty builder for a `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            triplets: Vec::new(),
        }
    }

    /// Add one entry. Zero values are skipped.
    ///
    /// # Panics
    /// Panics if the position is out of bounds.
    #[inline]
    pub fn push(&mut self, row: usize, col: usize, value: T) {
        assert!(
            row < self.rows && col < self.cols,
            "triplet ({}, {}) outside {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        if !value.is_zero() {
            self.triplets.push((row, col, value));
        }
    }

    /// Number of entries collected so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    /// Check if no entries were collected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Map every collected value into another scalar type.
    pub fn map<U, F>(&self, f: F) -> TripletBuilder<U>
    where
        F: Fn(T) -> U,
    {
        TripletBuilder {
            rows: self.rows,
            cols: self.cols,
            triplets: self.triplets.iter().map(|&(r, c, v)| (r, c, f(v))).collect(),
        }
    }

    /// Finalize into a CSR matrix.
    pub fn finish(self) -> CsrMatrix<T> {
        CsrMatrix::from_triplets(self.rows, self.cols, self.triplets)
    }
}

/// Compressed Sparse Row (CSR) matrix.
///
/// Stores only non-zero entries, sorted by row then column.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Row pointers: row_ptr[i] is the index in col_idx/values where row i starts.
    /// Length is rows + 1, with row_ptr[rows] = nnz.
    row_ptr: Vec<usize>,
    /// Column indices for each non-zero value.
    col_idx: Vec<usize>,
    /// Non-zero values.
    values: Vec<T>,
}

impl<T> CsrMatrix<T>
where
    T: Copy + Zero + AddAssign + PartialEq,
{
    /// Create a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries at the same (row, col) are summed; entries that sum to
    /// zero are removed.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, T)>) -> Self {
        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut merged: Vec<(usize, usize, T)> = Vec::with_capacity(triplets.len());
        for (row, col, val) in triplets {
            match merged.last_mut() {
                Some(last) if last.0 == row && last.1 == col => last.2 += val,
                _ => merged.push((row, col, val)),
            }
        }
        merged.retain(|t| !t.2.is_zero());

        let mut row_ptr = vec![0usize; rows + 1];
        for &(row, _, _) in &merged {
            row_ptr[row + 1] += 1;
        }
        for r in 0..rows {
            row_ptr[r + 1] += row_ptr[r];
        }

        let col_idx = merged.iter().map(|t| t.1).collect();
        let values = merged.iter().map(|t| t.2).collect();

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// The entry at `(row, col)`, zero if not stored.
    pub fn get(&self, row: usize, col: usize) -> T {
        let (cols, vals) = self.row(row);
        match cols.binary_search(&col) {
            Ok(k) => vals[k],
            Err(_) => T::zero(),
        }
    }

    /// Column indices and values of one row.
    #[inline]
    pub fn row(&self, row: usize) -> (&[usize], &[T]) {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        (&self.col_idx[start..end], &self.values[start..end])
    }

    /// Iterate over all stored `(row, col, value)` entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.rows).flat_map(move |r| {
            let (cols, vals) = self.row(r);
            cols.iter().zip(vals.iter()).map(move |(&c, &v)| (r, c, v))
        })
    }
}

impl<T> CsrMatrix<T>
where
    T: Scalar + Copy + Zero + AddAssign + Mul<Output = T> + PartialEq,
{
    /// Multiply matrix by vector: y = A * x.
    pub fn mul_vec(&self, x: &DVector<T>) -> DVector<T> {
        assert_eq!(x.len(), self.cols, "Vector dimension mismatch");

        let mut y = DVector::from_element(self.rows, T::zero());
        for i in 0..self.rows {
            let (cols, vals) = self.row(i);
            let mut sum = T::zero();
            for (&c, &v) in cols.iter().zip(vals) {
                sum += v * x[c];
            }
            y[i] = sum;
        }
        y
    }

    /// Expand into a dense matrix. Intended for small systems and tests.
    pub fn to_dense(&self) -> DMatrix<T> {
        let mut m = DMatrix::from_element(self.rows, self.cols, T::zero());
        for (r, c, v) in self.iter() {
            m[(r, c)] = v;
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csr_from_triplets() {
        // [ 4  1 ]
        // [ 1  3 ]
        let triplets = vec![(0, 0, 4.0_f64), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)];
        let a = CsrMatrix::from_triplets(2, 2, triplets);

        assert_eq!(a.nrows(), 2);
        assert_eq!(a.ncols(), 2);
        assert_eq!(a.nnz(), 4);
        assert_eq!(a.get(1, 0), 1.0);
    }

    #[test]
    fn test_duplicates_summed_and_cancelled() {
        let triplets = vec![(0, 0, 2), (1, 1, 5), (0, 0, 2), (0, 1, 1), (0, 1, -1)];
        let a = CsrMatrix::from_triplets(2, 2, triplets);

        assert_eq!(a.get(0, 0), 4);
        assert_eq!(a.get(0, 1), 0);
        assert_eq!(a.nnz(), 2);
    }

    #[test]
    fn test_empty_rows() {
        let a = CsrMatrix::from_triplets(4, 3, vec![(2, 1, 7)]);
        assert_eq!(a.row(0).0.len(), 0);
        assert_eq!(a.row(3).0.len(), 0);
        assert_eq!(a.row(2), (&[1usize][..], &[7][..]));
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![(2, 1, 7)]);
    }

    #[test]
    fn test_builder_skips_zeros() {
        let mut b = TripletBuilder::new(3, 3);
        b.push(0, 0, 0);
        b.push(1, 2, -1);
        assert_eq!(b.len(), 1);

        let real = b.map(|v| v as f64).finish();
        let int = b.finish();
        assert_eq!(int.nnz(), 1);
        assert_eq!(real.get(1, 2), -1.0);
    }

    #[test]
    #[should_panic]
    fn test_builder_rejects_out_of_bounds() {
        let mut b = TripletBuilder::new(2, 2);
        b.push(2, 0, 1.0);
    }

    #[test]
    fn test_mul_vec_and_dense() {
        // [ 4  1 ]   [ 1 ]   [ 5 ]
        // [ 1  3 ] * [ 1 ] = [ 4 ]
        let triplets = vec![(0, 0, 4.0_f64), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)];
        let a = CsrMatrix::from_triplets(2, 2, triplets);

        let y: DVector<f64> = a.mul_vec(&DVector::from_vec(vec![1.0, 1.0]));
        assert!((y[0] - 5.0).abs() < 1e-10);
        assert!((y[1] - 4.0).abs() < 1e-10);

        let d = a.to_dense();
        assert_eq!(d[(1, 1)], 3.0);
    }
}
