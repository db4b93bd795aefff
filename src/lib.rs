//! # Seamless Setup
//!
//! Combinatorial and algebraic setup for seamless integration of directional
//! fields on triangle meshes.
//!
//! Given a mesh, a combed N-directional field with its per-edge matching, and
//! the field's singular vertices, this crate cuts the mesh along its seams,
//! assigns one period-jump (transition) variable to every cut path, checks the
//! field's holonomy around each vertex star, and assembles the sparse operators
//! a seamless integration solver consumes. Solving is left to the caller.
//!
//! ## Features
//!
//! - **Array half-edge topology**: typed indices over flat navigation arrays,
//!   built from `EV`/`EF`/`FE` edge incidence
//! - **Cut mesh**: vertices duplicated along seams, with `cut2whole`
//! - **Transitions**: one signed id per cut path, negated on twin half-edges
//! - **Operators**: vertex-to-cut map, seamless constraints, symmetry
//!   reduction and integer spans, each in real and integer form
//! - **Parallel**: vertex stars are evaluated with rayon
//!
//! ## Quick Start
//!
//! ```
//! use seamless_setup::prelude::*;
//! use nalgebra::{DMatrix, Point3};
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//! let edges = EdgeTopology::from_faces(vertices.len(), &faces).unwrap();
//!
//! // A 4-directional field with sign symmetry: two independent functions.
//! let symm = sign_symmetry(4).unwrap();
//! let int_func = default_period_jumps(2);
//! let field = DMatrix::zeros(faces.len(), 12);
//! let matching = vec![0; edges.num_edges()];
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
//! let data = setup_integration(
//!     &input,
//!     &PrecomputedSeams::none(faces.len()),
//!     &PassThroughComber,
//!     &IntegrationOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(data.symm.ncols(), 2 * 4);
//! assert_eq!(data.fixed_indices, vec![0, 1]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use seamless_setup::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::integration::{
        default_period_jumps, identity_symmetry, setup_integration,
        setup_integration_with_progress, sign_symmetry, CombedField, CutMesh, FieldComber,
        IntegrationData, IntegrationOptions, PassThroughComber, PrecomputedSeams, SeamCutter,
        SetupInput, SparseOperator,
    };
    pub use crate::algo::sparse::{CsrMatrix, TripletBuilder};
    pub use crate::algo::Progress;
    pub use crate::error::{Result, SetupError};
    pub use crate::mesh::{
        EdgeId, EdgeTopology, FaceId, HalfEdgeId, HalfEdgeTopology, MeshIndex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
