//! Cyclic permutation bookkeeping for field branches.
//!
//! Crossing a seam relabels the N branches of the field by a power of the unit
//! right-shift `P` (`P[(i + 1) % N, i] = 1`). Every matrix that appears while
//! walking a vertex star is `±P^k`, and every residual after merging branches is
//! an integer combination `Σ c_k P^k`. Both are stored as shift amounts and
//! coefficient vectors instead of dense N×N matrices; the dense forms are
//! available for inspection and tests.

use nalgebra::DMatrix;

use crate::mesh::{HalfEdgeTopology, MeshIndex};

/// The unit right-shift generator of the cyclic group of order `n`.
pub fn unit_shift(n: usize) -> DMatrix<i32> {
    let mut p = DMatrix::zeros(n, n);
    for i in 0..n {
        p[((i + 1) % n, i)] = 1;
    }
    p
}

/// The group element `P^k` as a dense matrix.
pub fn cyclic_matrix(n: usize, k: usize) -> DMatrix<i32> {
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        m[((i + k) % n, i)] = 1;
    }
    m
}

/// Per-half-edge matching, normalized into `[0, N)`.
///
/// The edge matching maps branch `k` of face `EF[e][0]` to branch
/// `k + matching[e]` of `EF[e][1]`; the half-edge on side 0 therefore carries
/// the inverse shift.
pub fn halfedge_matching<I: MeshIndex>(
    topo: &HalfEdgeTopology<I>,
    matching: &[i32],
    n: usize,
) -> Vec<usize> {
    let n_i = n as i32;
    topo.halfedge_ids()
        .map(|h| {
            let e = topo.edge_of(h);
            let m = matching[e.index()];
            let signed = if topo.edge_halfedge(e, 0) == h { -m } else { m };
            signed.rem_euclid(n_i) as usize
        })
        .collect()
}

/// A signed group element `sign * P^shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    /// `+1` or `-1`.
    pub sign: i32,
    /// Power of the unit shift, in `[0, N)`.
    pub shift: usize,
}

impl Branch {
    /// The identity.
    pub const IDENTITY: Branch = Branch { sign: 1, shift: 0 };

    /// The negated identity.
    pub const NEG_IDENTITY: Branch = Branch { sign: -1, shift: 0 };

    /// Left-multiply by `P^m`.
    #[inline]
    pub fn shifted(self, m: usize, n: usize) -> Branch {
        Branch {
            sign: self.sign,
            shift: (self.shift + m) % n,
        }
    }

    /// The non-zero entries `(row, col, value)` of the dense N×N block.
    pub fn entries(self, n: usize) -> impl Iterator<Item = (usize, usize, i32)> {
        (0..n).map(move |col| ((col + self.shift) % n, col, self.sign))
    }

    /// The dense N×N block.
    pub fn to_matrix(self, n: usize) -> DMatrix<i32> {
        cyclic_matrix(n, self.shift) * self.sign
    }
}

/// An integer combination of group elements, `Σ coeffs[k] * P^k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSum {
    coeffs: Vec<i32>,
}

impl ShiftSum {
    /// The zero combination for a group of order `n`.
    pub fn zero(n: usize) -> Self {
        Self { coeffs: vec![0; n] }
    }

    /// Add one signed group element.
    #[inline]
    pub fn add(&mut self, branch: Branch) {
        self.coeffs[branch.shift] += branch.sign;
    }

    /// Subtract the identity.
    #[inline]
    pub fn sub_identity(&mut self) {
        self.coeffs[0] -= 1;
    }

    /// Check if the combination is the zero matrix.
    ///
    /// Distinct powers of `P` have disjoint supports, so this holds exactly
    /// when every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    /// The non-zero entries `(row, col, value)` of the dense N×N block.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        let n = self.coeffs.len();
        self.coeffs
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != 0)
            .flat_map(move |(k, &c)| (0..n).map(move |col| ((col + k) % n, col, c)))
    }

    /// The dense N×N block.
    pub fn to_matrix(&self) -> DMatrix<i32> {
        let n = self.coeffs.len();
        let mut m = DMatrix::zeros(n, n);
        for (r, c, v) in self.entries() {
            m[(r, c)] += v;
        }
        m
    }
}
