//! Core mesh topology.
//!
//! This module provides the half-edge navigation arrays and the edge incidence
//! arrays consumed by the integration setup.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeTopology`], a half-edge (doubly-connected edge
//! list) view of a triangle mesh stored as flat arrays. It is built from the
//! face list and an [`EdgeTopology`] (`EV`, `EF`, `FE`), either supplied by the
//! caller or computed with [`EdgeTopology::from_faces`].
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies a full edge
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait).
//!
//! # Construction
//!
//! ```
//! use seamless_setup::mesh::{EdgeTopology, HalfEdgeTopology};
//!
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let edges = EdgeTopology::from_faces(4, &faces).unwrap();
//! let topo: HalfEdgeTopology = HalfEdgeTopology::from_edge_topology(4, &faces, &edges).unwrap();
//! assert_eq!(topo.num_halfedges(), 12);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::EdgeTopology;
pub use halfedge::{HalfEdge, HalfEdgeTopology, StarWalk};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
