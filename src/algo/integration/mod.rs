//! Seamless integration setup.
//!
//! Given a combed directional field on a triangle mesh, this module cuts the
//! mesh along its seams, assigns period-jump (transition) variables to the cut
//! paths, checks the field's holonomy around every vertex star, and assembles
//! the sparse operators a seamless integration solver consumes.
//!
//! # Pipeline
//!
//! 1. Half-edge topology from the face and edge arrays
//! 2. Seam marking ([`SeamCutter`]) and combing ([`FieldComber`])
//! 3. Cut mesh: one cut vertex per wedge between seams
//! 4. Transitions: one signed id per cut path
//! 5. Holonomy: one constraint block row per non-trivial interior star
//! 6. Operators: vertex-to-cut map, constraints, symmetry, integer spans
//!
//! # Example
//!
//! ```
//! use nalgebra::{DMatrix, Point3};
//! use seamless_setup::algo::integration::{
//!     default_period_jumps, identity_symmetry, setup_integration, IntegrationOptions,
//!     PassThroughComber, PrecomputedSeams, SetupInput,
//! };
//! use seamless_setup::mesh::EdgeTopology;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let edges = EdgeTopology::from_faces(4, &faces).unwrap();
//!
//! let n = 4;
//! let field = DMatrix::zeros(faces.len(), 3 * n);
//! let matching = vec![0; edges.num_edges()];
//! let symm = identity_symmetry(n);
//! let int_func = default_period_jumps(n);
//!
//! let input = SetupInput {
//!     vertices: &vertices,
//!     faces: &faces,
//!     edges: &edges,
//!     raw_field: &field,
//!     matching: &matching,
//!     singular_vertices: &[],
//!     symm_func: &symm,
//!     int_func: &int_func,
//! };
//!
//! let data = setup_integration(
//!     &input,
//!     &PrecomputedSeams::none(faces.len()),
//!     &PassThroughComber,
//!     &IntegrationOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(data.num_transitions, 0);
//! assert_eq!(data.constraints.nrows(), 0);
//! assert_eq!(data.cut_mesh.cut2whole, vec![0, 1, 2, 3]);
//! ```

mod assemble;
mod collab;
mod cut;
mod data;
mod holonomy;
mod permutation;
mod transition;

pub use assemble::SparseOperator;
pub use collab::{
    CombedField, FieldComber, PassThroughComber, PrecomputedSeams, SeamCutter, SetupInput,
};
pub use cut::{CutMesh, SeamMarking};
pub use data::IntegrationData;
pub use holonomy::StarHolonomy;
pub use permutation::{cyclic_matrix, unit_shift, Branch, ShiftSum};
pub use transition::Transitions;

use log::Level;
use nalgebra::DMatrix;

use crate::error::{Result, SetupError};
use crate::mesh::{HalfEdgeTopology, VertexId};

use super::progress::StageTicker;
use super::Progress;
use holonomy::StarContext;

/// Options for [`setup_integration`].
///
/// The solver-facing values are copied verbatim into [`IntegrationData`].
#[derive(Debug, Clone)]
pub struct IntegrationOptions {
    /// Target edge length relative to the bounding box diagonal (default: 0.02).
    pub length_ratio: f64,

    /// Ask the solver for an integer-seamless result (default: false).
    pub integral_seamless: bool,

    /// Ask the solver to round seam jumps (default: true).
    pub round_seams: bool,

    /// Log setup stages at `info` instead of `debug`, and ask the solver to be
    /// verbose (default: false).
    pub verbose: bool,

    /// Ask the solver for a locally injective result (default: false).
    pub local_injectivity: bool,

    /// Whether to walk vertex stars in parallel (default: true).
    pub parallel: bool,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            length_ratio: 0.02,
            integral_seamless: false,
            round_seams: true,
            verbose: false,
            local_injectivity: false,
            parallel: true,
        }
    }
}

impl IntegrationOptions {
    /// Set the target edge length ratio. Must be positive and finite.
    pub fn with_length_ratio(mut self, length_ratio: f64) -> Self {
        self.length_ratio = length_ratio;
        self
    }

    /// Request an integer-seamless solve.
    pub fn integral_seamless(mut self) -> Self {
        self.integral_seamless = true;
        self
    }

    /// Set whether seam jumps are rounded.
    pub fn with_round_seams(mut self, round_seams: bool) -> Self {
        self.round_seams = round_seams;
        self
    }

    /// Enable verbose logging.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Request a locally injective solve.
    pub fn local_injectivity(mut self) -> Self {
        self.local_injectivity = true;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.length_ratio > 0.0 && self.length_ratio.is_finite()) {
            return Err(SetupError::invalid_param(
                "length_ratio",
                self.length_ratio,
                "must be positive and finite",
            ));
        }
        Ok(())
    }

    fn stage_level(&self) -> Level {
        if self.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

/// Sign symmetry `[I; -I]`, an `N × N/2` descriptor for fields whose opposite
/// vectors are negations of each other.
///
/// # Errors
///
/// Fails unless `n_functions` is even and positive.
pub fn sign_symmetry(n_functions: usize) -> Result<DMatrix<i32>> {
    if n_functions == 0 || n_functions % 2 != 0 {
        return Err(SetupError::InvalidSymmetry {
            rows: n_functions,
            cols: n_functions / 2,
        });
    }
    let half = n_functions / 2;
    let mut symm = DMatrix::zeros(n_functions, half);
    for i in 0..half {
        symm[(i, i)] = 1;
        symm[(half + i, i)] = -1;
    }
    Ok(symm)
}

/// The `N × N` identity: no symmetry reduction.
pub fn identity_symmetry(n_functions: usize) -> DMatrix<i32> {
    DMatrix::identity(n_functions, n_functions)
}

/// The `n × n` identity: every reduced period jump is an independent integer.
pub fn default_period_jumps(n_reduced: usize) -> DMatrix<i32> {
    DMatrix::identity(n_reduced, n_reduced)
}

const STAGES: usize = 7;

/// Set up seamless integration of a directional field.
///
/// Runs the cutter and the comber, then builds the cut mesh, the transition
/// variables, the holonomy constraints and all sparse operators.
///
/// # Errors
///
/// Fails on inconsistent input sizes, invalid matching values, unusable
/// symmetry descriptors, non-manifold or misoriented meshes, and seam markings
/// whose walks do not close. No partial result is returned.
pub fn setup_integration<S, C>(
    input: &SetupInput<'_>,
    cutter: &S,
    comber: &C,
    options: &IntegrationOptions,
) -> Result<IntegrationData>
where
    S: SeamCutter + ?Sized,
    C: FieldComber,
{
    setup_integration_internal(input, cutter, comber, options, None)
}

/// Set up seamless integration with progress reporting.
///
/// See [`setup_integration`] for details.
pub fn setup_integration_with_progress<S, C>(
    input: &SetupInput<'_>,
    cutter: &S,
    comber: &C,
    options: &IntegrationOptions,
    progress: &Progress,
) -> Result<IntegrationData>
where
    S: SeamCutter + ?Sized,
    C: FieldComber,
{
    setup_integration_internal(input, cutter, comber, options, Some(progress))
}

fn setup_integration_internal<S, C>(
    input: &SetupInput<'_>,
    cutter: &S,
    comber: &C,
    options: &IntegrationOptions,
    progress: Option<&Progress>,
) -> Result<IntegrationData>
where
    S: SeamCutter + ?Sized,
    C: FieldComber,
{
    let report = |step: usize, message: &str| {
        if let Some(p) = progress {
            p.report(step, STAGES, message);
        }
    };
    let level = options.stage_level();

    options.validate()?;
    input.validate()?;

    let big_n = input.n_functions();
    let n = input.n_reduced();
    let num_vertices = input.vertices.len();

    report(0, "Building topology");
    let topo: HalfEdgeTopology =
        HalfEdgeTopology::from_edge_topology(num_vertices, input.faces, input.edges)?;

    let mut singular = vec![false; num_vertices];
    for &s in input.singular_vertices {
        if topo.is_boundary_vertex(VertexId::new(s)) {
            log::warn!("singular vertex {} lies on the boundary; ignoring it", s);
        } else {
            singular[s] = true;
        }
    }
    let singular_vertices: Vec<usize> = (0..num_vertices).filter(|&v| singular[v]).collect();

    report(1, "Cutting seams");
    let face2cut = cutter.cut(input.vertices, input.faces, &singular_vertices)?;
    let seams = SeamMarking::new(&topo, &face2cut)?;
    log::log!(level, "seam marking: {} seam edges", seams.num_seam_edges());

    report(2, "Combing field");
    let combed = comber.comb(input, &topo, &face2cut)?;
    collab::validate_combed(input, &combed)?;

    report(3, "Building cut mesh");
    let cut_mesh = cut::build_cut_mesh(&topo, input.vertices, &seams)?;
    log::log!(
        level,
        "cut mesh: {} cut vertices from {} vertices",
        cut_mesh.num_vertices(),
        num_vertices
    );

    report(4, "Tracing transitions");
    let transitions = transition::trace_transitions(&topo, &seams, &singular)?;
    let num_transitions = transitions.count();
    log::log!(level, "transitions: {}", num_transitions);

    report(5, "Walking vertex stars");
    let halfedge_matching = permutation::halfedge_matching(&topo, &combed.matching, big_n);
    let ctx = StarContext {
        topo: &topo,
        seams: &seams,
        transitions: &transitions,
        halfedge_matching: &halfedge_matching,
        cut_mesh: &cut_mesh,
        singular: &singular,
        n_functions: big_n,
    };
    let ticker = StageTicker::new(progress, 5, STAGES, num_vertices, "Walking vertex stars");
    let stars = ctx.evaluate_all(options.parallel, Some(&ticker))?;

    report(6, "Assembling operators");
    let num_dofs = num_vertices + num_transitions;
    let vertex_trans_to_cut =
        assemble::vertex_trans_to_cut(&stars, cut_mesh.num_vertices(), num_dofs, big_n);
    let (constraints, num_constraints) = assemble::constraints(&stars, num_dofs, big_n);
    log::log!(level, "constraints: {} block rows", num_constraints);

    let symm = assemble::symmetry(input.symm_func, num_dofs);
    let int_span = assemble::integer_span(input.int_func, num_vertices, num_transitions, None);
    let sing_int_span =
        assemble::integer_span(input.int_func, num_vertices, num_transitions, Some(&singular));

    let anchor = singular_vertices.first().copied().unwrap_or(0);
    let fixed_indices: Vec<usize> = assemble::reduced_block(anchor, n).collect();
    let fixed_values = vec![0.0; fixed_indices.len()];

    report(STAGES, "Done");
    log::info!(
        "integration setup: N = {}, n = {}, {} cut vertices, {} transitions, {} constraints",
        big_n,
        n,
        cut_mesh.num_vertices(),
        num_transitions,
        num_constraints
    );

    Ok(IntegrationData {
        n_functions: big_n,
        n_reduced: n,
        symm_func: input.symm_func.clone(),
        int_func: input.int_func.clone(),
        vertex_trans_to_cut,
        constraints,
        symm,
        int_span,
        sing_int_span,
        constrained_vertices: stars.iter().map(|s| s.constrained).collect(),
        integer_vars: assemble::integer_vars(num_vertices, num_transitions),
        fixed_indices,
        fixed_values,
        singular_indices: assemble::singular_indices(&singular, n),
        singular_vertices,
        face2cut,
        cut_mesh,
        combed_field: combed.field,
        combed_matching: combed.matching,
        halfedge_transitions: transitions.as_slice().to_vec(),
        num_transitions,
        num_constraints,
        length_ratio: options.length_ratio,
        integral_seamless: options.integral_seamless,
        round_seams: options.round_seams,
        verbose: options.verbose,
        local_injectivity: options.local_injectivity,
    })
}
