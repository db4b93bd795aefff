//! Error types for seamless-setup.
//!
//! This module defines all error types used throughout the library. Every
//! failure aborts the setup call; no partial [`IntegrationData`] is returned.
//!
//! [`IntegrationData`]: crate::algo::integration::IntegrationData

use thiserror::Error;

/// Result type alias using [`SetupError`].
pub type Result<T> = std::result::Result<T, SetupError>;

/// Errors that can occur while building topology or setting up integration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// Two input arrays disagree on a dimension.
    #[error("dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Which array was inspected.
        what: &'static str,
        /// The size implied by the other inputs.
        expected: usize,
        /// The size actually supplied.
        found: usize,
    },

    /// The edge topology (EV/EF/FE) does not agree with the face array.
    #[error("edge topology inconsistent with face {face}, corner {corner}")]
    InconsistentEdgeTopology {
        /// The face index.
        face: usize,
        /// The corner (0..3) whose outgoing edge disagrees.
        corner: usize,
    },

    /// An edge has more than two incident faces, or is traversed twice in
    /// the same direction.
    #[error("edge ({v0}, {v1}) is non-manifold or inconsistently oriented")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A vertex is not referenced by any face.
    #[error("vertex {vertex} has no incident face")]
    IsolatedVertex {
        /// The vertex index.
        vertex: usize,
    },

    /// A matching value is outside `[-1, N)` or `-1` sits on an interior edge.
    #[error("edge {edge} has invalid matching value {value}")]
    InvalidMatching {
        /// The edge index.
        edge: usize,
        /// The offending value.
        value: i32,
    },

    /// The symmetry descriptor has an unusable shape.
    #[error("symmetry descriptor is {rows}x{cols}; need N > 0, n > 0 and n dividing N")]
    InvalidSymmetry {
        /// Number of rows (N).
        rows: usize,
        /// Number of columns (n).
        cols: usize,
    },

    /// A star walk or cut-path trace did not close; the seam marking or the
    /// connectivity is inconsistent.
    #[error("topology inconsistent at vertex {vertex}: {reason}")]
    TopologyInconsistent {
        /// The vertex where the walk failed.
        vertex: usize,
        /// What went wrong.
        reason: &'static str,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl SetupError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        SetupError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a dimension mismatch error.
    pub(crate) fn mismatch(what: &'static str, expected: usize, found: usize) -> Self {
        SetupError::DimensionMismatch {
            what,
            expected,
            found,
        }
    }

    /// Create a topology-inconsistent error.
    pub(crate) fn inconsistent(vertex: usize, reason: &'static str) -> Self {
        SetupError::TopologyInconsistent { vertex, reason }
    }
}
