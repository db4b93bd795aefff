//! Inputs and external collaborators of the setup stage.
//!
//! The seam marking and the combed field are produced elsewhere (a
//! singularity-aware cutting pass and a combing pass). They enter through the
//! [`SeamCutter`] and [`FieldComber`] traits; the pass-through implementations
//! here serve callers that already hold both.

use nalgebra::{DMatrix, Point3};

use crate::error::{Result, SetupError};
use crate::mesh::{EdgeTopology, HalfEdgeTopology, MeshIndex};

/// Everything the setup stage reads.
#[derive(Debug, Clone, Copy)]
pub struct SetupInput<'a> {
    /// Vertex positions.
    pub vertices: &'a [Point3<f64>],
    /// Triangles, counter-clockwise.
    pub faces: &'a [[usize; 3]],
    /// Edge incidence of `faces`.
    pub edges: &'a EdgeTopology,
    /// Raw directional field, `|F| × 3N`.
    pub raw_field: &'a DMatrix<f64>,
    /// Matching per edge, in `[0, N)` or `-1` on boundary edges.
    pub matching: &'a [i32],
    /// Singular vertices.
    pub singular_vertices: &'a [usize],
    /// Symmetry descriptor, `N × n`.
    pub symm_func: &'a DMatrix<i32>,
    /// Integer-relation descriptor, `n × n`.
    pub int_func: &'a DMatrix<i32>,
}

impl<'a> SetupInput<'a> {
    /// Number of field vectors per face, `N`.
    #[inline]
    pub fn n_functions(&self) -> usize {
        self.symm_func.nrows()
    }

    /// Number of reduced functions, `n`.
    #[inline]
    pub fn n_reduced(&self) -> usize {
        self.symm_func.ncols()
    }

    /// Check every size and value precondition before any traversal.
    pub fn validate(&self) -> Result<()> {
        let (big_n, n) = self.symm_func.shape();
        if big_n == 0 || n == 0 || big_n % n != 0 {
            return Err(SetupError::InvalidSymmetry { rows: big_n, cols: n });
        }
        if self.int_func.shape() != (n, n) {
            let (r, c) = self.int_func.shape();
            return Err(SetupError::mismatch("integer-relation descriptor size", n * n, r * c));
        }

        if self.faces.is_empty() {
            return Err(SetupError::EmptyMesh);
        }
        let num_faces = self.faces.len();
        if self.edges.fe.len() != num_faces {
            return Err(SetupError::mismatch("FE rows", num_faces, self.edges.fe.len()));
        }
        if self.edges.ef.len() != self.edges.ev.len() {
            return Err(SetupError::mismatch("EF rows", self.edges.ev.len(), self.edges.ef.len()));
        }
        if self.raw_field.nrows() != num_faces {
            return Err(SetupError::mismatch("raw field rows", num_faces, self.raw_field.nrows()));
        }
        if self.raw_field.ncols() != 3 * big_n {
            return Err(SetupError::mismatch(
                "raw field columns",
                3 * big_n,
                self.raw_field.ncols(),
            ));
        }

        validate_matching(self.edges, self.matching, big_n)?;

        let num_vertices = self.vertices.len();
        for &s in self.singular_vertices {
            if s >= num_vertices {
                return Err(SetupError::invalid_param(
                    "singular_vertices",
                    s,
                    "index exceeds vertex count",
                ));
            }
        }
        Ok(())
    }
}

fn validate_matching(edges: &EdgeTopology, matching: &[i32], n_functions: usize) -> Result<()> {
    if matching.len() != edges.num_edges() {
        return Err(SetupError::mismatch("matching length", edges.num_edges(), matching.len()));
    }
    for (e, &value) in matching.iter().enumerate() {
        let in_range = value >= 0 && (value as usize) < n_functions;
        let boundary_marker = value == -1 && edges.is_boundary_edge(e);
        if !in_range && !boundary_marker {
            return Err(SetupError::InvalidMatching { edge: e, value });
        }
    }
    Ok(())
}

/// Produces the per-face-side seam marking.
pub trait SeamCutter {
    /// Mark the face sides on the cut graph. `face2cut[f][j]` flags the side
    /// from corner `j` to corner `j + 1`.
    fn cut(
        &self,
        vertices: &[Point3<f64>],
        faces: &[[usize; 3]],
        singular_vertices: &[usize],
    ) -> Result<Vec<[bool; 3]>>;
}

/// A seam marking computed ahead of time.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedSeams {
    face2cut: Vec<[bool; 3]>,
}

impl PrecomputedSeams {
    /// Wrap an existing marking.
    pub fn new(face2cut: Vec<[bool; 3]>) -> Self {
        Self { face2cut }
    }

    /// Mark both sides of every listed undirected edge `(a, b)`.
    pub fn from_edges(faces: &[[usize; 3]], seam_edges: &[(usize, usize)]) -> Self {
        let face2cut = faces
            .iter()
            .map(|f| {
                let mut sides = [false; 3];
                for (j, side) in sides.iter_mut().enumerate() {
                    let (a, b) = (f[j], f[(j + 1) % 3]);
                    *side = seam_edges
                        .iter()
                        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a));
                }
                sides
            })
            .collect();
        Self { face2cut }
    }

    /// No seams at all.
    pub fn none(num_faces: usize) -> Self {
        Self::new(vec![[false; 3]; num_faces])
    }
}

impl SeamCutter for PrecomputedSeams {
    fn cut(
        &self,
        _vertices: &[Point3<f64>],
        faces: &[[usize; 3]],
        _singular_vertices: &[usize],
    ) -> Result<Vec<[bool; 3]>> {
        if self.face2cut.len() != faces.len() {
            return Err(SetupError::mismatch("face2cut rows", faces.len(), self.face2cut.len()));
        }
        Ok(self.face2cut.clone())
    }
}

/// A field and matching relabeled to reduce seams.
#[derive(Debug, Clone, PartialEq)]
pub struct CombedField {
    /// Combed field, `|F| × 3N`.
    pub field: DMatrix<f64>,
    /// Combed matching per edge.
    pub matching: Vec<i32>,
}

/// Combs a raw field against a seam marking.
pub trait FieldComber {
    /// Relabel branches so that the matching is zero away from `face2cut`.
    fn comb<I: MeshIndex>(
        &self,
        input: &SetupInput<'_>,
        topology: &HalfEdgeTopology<I>,
        face2cut: &[[bool; 3]],
    ) -> Result<CombedField>;
}

/// Returns the raw field and matching unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughComber;

impl FieldComber for PassThroughComber {
    fn comb<I: MeshIndex>(
        &self,
        input: &SetupInput<'_>,
        _topology: &HalfEdgeTopology<I>,
        _face2cut: &[[bool; 3]],
    ) -> Result<CombedField> {
        Ok(CombedField {
            field: input.raw_field.clone(),
            matching: input.matching.to_vec(),
        })
    }
}

/// Check a comber's output against the input sizes.
pub(crate) fn validate_combed(input: &SetupInput<'_>, combed: &CombedField) -> Result<()> {
    if combed.field.shape() != input.raw_field.shape() {
        let (r, c) = combed.field.shape();
        let (er, ec) = input.raw_field.shape();
        return Err(SetupError::mismatch("combed field size", er * ec, r * c));
    }
    validate_matching(input.edges, &combed.matching, input.n_functions())
}
