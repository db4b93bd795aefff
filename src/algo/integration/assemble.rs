//! Sparse operators of the seamless integration system.
//!
//! All operators act on block DOF spaces: every `(vertex, transition)` DOF owns
//! a block of `N` physical functions, or `n` reduced ones after symmetry
//! reduction. Every operator is collected once as integer triplets and then
//! finalized into a real and an integer CSR matrix with the same pattern.

use nalgebra::DMatrix;

use crate::algo::sparse::{CsrMatrix, TripletBuilder};

use super::holonomy::StarHolonomy;

/// One operator in both real and exact integer form.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseOperator {
    /// Real-valued matrix, for relaxed solves.
    pub real: CsrMatrix<f64>,
    /// Integer matrix, for strictly integer formulations.
    pub integer: CsrMatrix<i32>,
}

impl SparseOperator {
    /// Finalize integer triplets into both representations.
    pub fn from_builder(builder: TripletBuilder<i32>) -> Self {
        let real = builder.map(f64::from).finish();
        let integer = builder.finish();
        Self { real, integer }
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.integer.nrows()
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.integer.ncols()
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.integer.nnz()
    }
}

/// Map from `(vertex, transition)` DOFs to per-cut-vertex DOFs.
///
/// Size `N·|C| × N·(|V| + T)`.
pub fn vertex_trans_to_cut(
    stars: &[StarHolonomy],
    num_cut_vertices: usize,
    num_dofs: usize,
    n_functions: usize,
) -> SparseOperator {
    let n = n_functions;
    let mut builder = TripletBuilder::new(n * num_cut_vertices, n * num_dofs);
    for star in stars {
        for &(cut_vertex, dof, branch) in &star.cut_blocks {
            for (r, c, v) in branch.entries(n) {
                builder.push(n * cut_vertex + r, n * dof + c, v);
            }
        }
    }
    SparseOperator::from_builder(builder)
}

/// Stack the non-trivial holonomy residuals of constrained vertices.
///
/// Rows are issued in vertex order. Returns the operator and the number of
/// block rows.
pub fn constraints(
    stars: &[StarHolonomy],
    num_dofs: usize,
    n_functions: usize,
) -> (SparseOperator, usize) {
    let n = n_functions;
    let constrained: Vec<&StarHolonomy> = stars.iter().filter(|s| s.constrained).collect();

    let mut builder = TripletBuilder::new(n * constrained.len(), n * num_dofs);
    for (row, star) in constrained.iter().enumerate() {
        for (dof, sum) in &star.residual {
            for (r, c, v) in sum.entries() {
                builder.push(n * row + r, n * dof + c, v);
            }
        }
    }
    (SparseOperator::from_builder(builder), constrained.len())
}

/// Block-diagonal copy of the `N×n` symmetry descriptor, one block per DOF.
pub fn symmetry(symm_func: &DMatrix<i32>, num_dofs: usize) -> SparseOperator {
    let (big_n, n) = symm_func.shape();
    let mut builder = TripletBuilder::new(big_n * num_dofs, n * num_dofs);
    for d in 0..num_dofs {
        push_block(&mut builder, symm_func, big_n * d, n * d);
    }
    SparseOperator::from_builder(builder)
}

/// Integer spanning operator over the reduced DOFs.
///
/// Vertex blocks are the identity and transition blocks the integer-relation
/// descriptor. With `singular` given, singular vertex blocks also take the
/// descriptor. Transition blocks carry the descriptor in both variants, never
/// the identity.
pub fn integer_span(
    int_func: &DMatrix<i32>,
    num_vertices: usize,
    num_transitions: usize,
    singular: Option<&[bool]>,
) -> SparseOperator {
    let n = int_func.nrows();
    let size = n * (num_vertices + num_transitions);
    let identity = DMatrix::<i32>::identity(n, n);

    let mut builder = TripletBuilder::new(size, size);
    for v in 0..num_vertices {
        let block = match singular {
            Some(flags) if flags[v] => int_func,
            _ => &identity,
        };
        push_block(&mut builder, block, n * v, n * v);
    }
    for t in 0..num_transitions {
        let d = num_vertices + t;
        push_block(&mut builder, int_func, n * d, n * d);
    }
    SparseOperator::from_builder(builder)
}

fn push_block(builder: &mut TripletBuilder<i32>, block: &DMatrix<i32>, row: usize, col: usize) {
    for c in 0..block.ncols() {
        for r in 0..block.nrows() {
            builder.push(row + r, col + c, block[(r, c)]);
        }
    }
}

/// The `n` reduced DOFs of `vertex`.
pub fn reduced_block(vertex: usize, n_reduced: usize) -> impl Iterator<Item = usize> {
    (0..n_reduced).map(move |j| n_reduced * vertex + j)
}

/// Reduced DOFs of every singular vertex, in vertex order.
pub fn singular_indices(singular: &[bool], n_reduced: usize) -> Vec<usize> {
    singular
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s)
        .flat_map(|(v, _)| reduced_block(v, n_reduced))
        .collect()
}

/// Integer variables of the reduced system: the transition DOFs.
pub fn integer_vars(num_vertices: usize, num_transitions: usize) -> Vec<usize> {
    (num_vertices..num_vertices + num_transitions).collect()
}

/// Check that every cut vertex reads exactly one permutation block of vertex
/// DOFs; helper for tests in this crate.
#[cfg(test)]
pub(crate) fn cut_rows_are_partition(
    op: &CsrMatrix<i32>,
    num_vertices: usize,
    n_functions: usize,
) -> bool {
    let n = n_functions;
    let vertex_cols = n * num_vertices;
    (0..op.nrows() / n).all(|c| {
        let mut block: Option<usize> = None;
        for r in 0..n {
            let (cols, vals) = op.row(n * c + r);
            let hits: Vec<(usize, i32)> = cols
                .iter()
                .zip(vals)
                .filter(|&(&col, _)| col < vertex_cols)
                .map(|(&col, &v)| (col, v))
                .collect();
            if hits.len() != 1 || hits[0].1 != 1 {
                return false;
            }
            let b = hits[0].0 / n;
            if *block.get_or_insert(b) != b {
                return false;
            }
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::super::permutation::{Branch, ShiftSum};
    use super::*;

    #[test]
    fn test_symmetry_blocks() {
        // [ I; -I ] for N = 4, n = 2
        let mut s = DMatrix::<i32>::zeros(4, 2);
        s[(0, 0)] = 1;
        s[(1, 1)] = 1;
        s[(2, 0)] = -1;
        s[(3, 1)] = -1;

        let op = symmetry(&s, 3);
        assert_eq!(op.nrows(), 12);
        assert_eq!(op.ncols(), 6);
        assert_eq!(op.nnz(), 12);
        assert_eq!(op.integer.get(4 + 2, 2), -1);
        assert_eq!(op.real.get(8 + 1, 5), 1.0);
        assert!(op.integer.iter().all(|(_, _, v)| v == 1 || v == -1));
    }

    #[test]
    fn test_integer_span_substitutes_descriptor() {
        let mut int_func = DMatrix::<i32>::identity(2, 2);
        int_func[(0, 1)] = 1;

        let plain = integer_span(&int_func, 2, 1, None);
        assert_eq!(plain.nrows(), 6);
        assert_eq!(plain.integer.get(0, 1), 0);
        assert_eq!(plain.integer.get(4, 5), 1);

        let flags = [false, true];
        let singular = integer_span(&int_func, 2, 1, Some(&flags));
        assert_eq!(singular.integer.get(0, 1), 0);
        assert_eq!(singular.integer.get(2, 3), 1);
        assert_eq!(singular.integer.get(4, 5), 1);
    }

    #[test]
    fn test_constraint_rows_follow_vertex_order() {
        let n = 3;
        let mut residual = ShiftSum::zero(n);
        residual.add(Branch::IDENTITY.shifted(1, n));
        residual.sub_identity();
        let mut jump = ShiftSum::zero(n);
        jump.add(Branch::NEG_IDENTITY);

        let stars = vec![
            StarHolonomy {
                cut_blocks: vec![],
                residual: vec![(0, ShiftSum::zero(n))],
                constrained: false,
            },
            StarHolonomy {
                cut_blocks: vec![],
                residual: vec![(1, residual), (2, jump)],
                constrained: true,
            },
        ];
        let (op, rows) = constraints(&stars, 3, n);
        assert_eq!(rows, 1);
        assert_eq!(op.nrows(), 3);
        assert_eq!(op.ncols(), 9);
        // (P - I) on DOF 1, -I on DOF 2
        assert_eq!(op.integer.get(1, 3), 1);
        assert_eq!(op.integer.get(0, 3), -1);
        assert_eq!(op.integer.get(0, 6), -1);
        assert_eq!(op.real.nnz(), op.integer.nnz());
    }

    #[test]
    fn test_vertex_trans_to_cut_blocks() {
        let n = 2;
        let stars = vec![
            StarHolonomy {
                cut_blocks: vec![(0, 0, Branch::IDENTITY)],
                residual: vec![],
                constrained: false,
            },
            StarHolonomy {
                cut_blocks: vec![
                    (1, 1, Branch::IDENTITY),
                    (2, 1, Branch::IDENTITY.shifted(1, n)),
                    (2, 2, Branch::IDENTITY),
                ],
                residual: vec![],
                constrained: false,
            },
        ];
        let op = vertex_trans_to_cut(&stars, 3, 3, n);
        assert_eq!(op.nrows(), 6);
        assert_eq!(op.ncols(), 6);
        assert_eq!(op.integer.get(4, 3), 1);
        assert_eq!(op.integer.get(5, 2), 1);
        assert!(cut_rows_are_partition(&op.integer, 2, n));
    }

    #[test]
    fn test_index_lists() {
        assert_eq!(singular_indices(&[false, true, false, true], 2), vec![2, 3, 6, 7]);
        assert_eq!(integer_vars(4, 2), vec![4, 5]);
        assert_eq!(reduced_block(3, 4).collect::<Vec<_>>(), vec![12, 13, 14, 15]);
    }
}
