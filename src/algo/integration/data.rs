//! The setup result handed to the integration solver.

use nalgebra::DMatrix;

use super::assemble::SparseOperator;
use super::cut::CutMesh;

/// Everything a seamless integration solve consumes.
///
/// Built once by [`setup_integration`](super::setup_integration) and not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationData {
    /// Number of field vectors per face, `N`.
    pub n_functions: usize,
    /// Number of independent functions after symmetry reduction, `n`.
    pub n_reduced: usize,
    /// Symmetry descriptor, `N × n`.
    pub symm_func: DMatrix<i32>,
    /// Integer-relation descriptor, `n × n`.
    pub int_func: DMatrix<i32>,

    /// `(vertex, transition)` DOFs to cut-vertex DOFs, `N·|C| × N·(|V|+T)`.
    pub vertex_trans_to_cut: SparseOperator,
    /// Seamless constraints, `N·numConstraints × N·(|V|+T)`.
    pub constraints: SparseOperator,
    /// Symmetry reduction, `N·(|V|+T) × n·(|V|+T)`.
    pub symm: SparseOperator,
    /// Integer spanning operator over the reduced DOFs.
    pub int_span: SparseOperator,
    /// Integer spanning operator with singular vertex blocks relaxed.
    pub sing_int_span: SparseOperator,

    /// Per vertex: the vertex emitted a constraint row.
    pub constrained_vertices: Vec<bool>,
    /// Reduced DOF blocks that must be integer (the transitions).
    pub integer_vars: Vec<usize>,
    /// Reduced DOFs pinned to `fixed_values`.
    pub fixed_indices: Vec<usize>,
    /// Values of the pinned DOFs.
    pub fixed_values: Vec<f64>,
    /// Reduced DOFs of every singular vertex.
    pub singular_indices: Vec<usize>,
    /// Singular vertices that survived boundary demotion.
    pub singular_vertices: Vec<usize>,

    /// Seam marking per face side.
    pub face2cut: Vec<[bool; 3]>,
    /// The mesh cut open along its seams.
    pub cut_mesh: CutMesh,
    /// Combed field, `|F| × 3N`.
    pub combed_field: DMatrix<f64>,
    /// Combed matching per edge.
    pub combed_matching: Vec<i32>,
    /// Signed transition id per half-edge (`3f + j`), `None` off the cut graph.
    pub halfedge_transitions: Vec<Option<i32>>,
    /// Number of transition variables, `T`.
    pub num_transitions: usize,
    /// Number of constraint block rows.
    pub num_constraints: usize,

    /// Target edge length relative to the bounding box diagonal.
    pub length_ratio: f64,
    /// Round to an integer-seamless solution.
    pub integral_seamless: bool,
    /// Round the seam jumps.
    pub round_seams: bool,
    /// Solver verbosity.
    pub verbose: bool,
    /// Request a locally injective result.
    pub local_injectivity: bool,
}

impl IntegrationData {
    /// Number of `(vertex, transition)` DOF blocks, `|V| + T`.
    #[inline]
    pub fn num_dofs(&self) -> usize {
        self.constrained_vertices.len() + self.num_transitions
    }

    /// Size of the full (unreduced) DOF space, `N·(|V| + T)`.
    #[inline]
    pub fn num_full_dofs(&self) -> usize {
        self.n_functions * self.num_dofs()
    }

    /// Size of the reduced DOF space, `n·(|V| + T)`.
    #[inline]
    pub fn num_reduced_dofs(&self) -> usize {
        self.n_reduced * self.num_dofs()
    }
}
