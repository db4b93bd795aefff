//! Topology construction utilities.
//!
//! This module turns a face-vertex list into the edge incidence arrays
//! (`EV`, `EF`, `FE`) and those arrays into a [`HalfEdgeTopology`].
//!
//! # Conventions
//!
//! - `FE[f][j]` is the edge running from corner `j` to corner `j + 1` of face `f`.
//! - `EF[e][0]` is the face that traverses `EV[e][0] -> EV[e][1]`; `EF[e][1]`
//!   is the face on the other side, or `None` on the boundary.

use std::collections::HashMap;

use super::halfedge::{HalfEdge, HalfEdgeTopology};
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{Result, SetupError};

/// Edge incidence arrays of a triangle mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeTopology {
    /// Edge to vertices (`EV`).
    pub ev: Vec<[usize; 2]>,
    /// Edge to faces (`EF`); the second entry is `None` on the boundary.
    pub ef: Vec<[Option<usize>; 2]>,
    /// Face to edges (`FE`).
    pub fe: Vec<[usize; 3]>,
}

impl EdgeTopology {
    /// Build the edge incidence arrays of a triangle mesh.
    ///
    /// Edges are numbered in order of first appearance while scanning faces and
    /// their corners in order.
    ///
    /// # Errors
    ///
    /// Fails on empty meshes, out-of-range or repeated vertex indices, edges
    /// shared by more than two faces, and edges that two faces traverse in the
    /// same direction (inconsistent orientation).
    ///
    /// # Example
    /// ```
    /// use seamless_setup::mesh::EdgeTopology;
    ///
    /// let faces = vec![[0, 1, 2], [0, 2, 3]];
    /// let edges = EdgeTopology::from_faces(4, &faces).unwrap();
    /// assert_eq!(edges.num_edges(), 5);
    /// assert_eq!(edges.ef[edges.fe[0][2]], [Some(0), Some(1)]);
    /// ```
    pub fn from_faces(num_vertices: usize, faces: &[[usize; 3]]) -> Result<Self> {
        validate_faces(num_vertices, faces)?;

        let mut ev: Vec<[usize; 2]> = Vec::with_capacity(faces.len() * 3 / 2 + 1);
        let mut ef: Vec<[Option<usize>; 2]> = Vec::with_capacity(ev.capacity());
        let mut fe = vec![[usize::MAX; 3]; faces.len()];

        // Undirected edge (min, max) -> edge index
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::new();

        for (fi, face) in faces.iter().enumerate() {
            for j in 0..3 {
                let a = face[j];
                let b = face[(j + 1) % 3];
                let key = (a.min(b), a.max(b));

                match edge_map.get(&key) {
                    None => {
                        let e = ev.len();
                        ev.push([a, b]);
                        ef.push([Some(fi), None]);
                        edge_map.insert(key, e);
                        fe[fi][j] = e;
                    }
                    Some(&e) => {
                        // The second face must run the edge backwards.
                        if ef[e][1].is_some() || ev[e] != [b, a] {
                            return Err(SetupError::NonManifoldEdge { v0: a, v1: b });
                        }
                        ef[e][1] = Some(fi);
                        fe[fi][j] = e;
                    }
                }
            }
        }

        Ok(Self { ev, ef, fe })
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.ev.len()
    }

    /// Check if an edge has only one incident face.
    #[inline]
    pub fn is_boundary_edge(&self, e: usize) -> bool {
        self.ef[e][1].is_none()
    }
}

fn validate_faces(num_vertices: usize, faces: &[[usize; 3]]) -> Result<()> {
    if faces.is_empty() {
        return Err(SetupError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= num_vertices {
                return Err(SetupError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(SetupError::DegenerateFace { face: fi });
        }
    }

    Ok(())
}

impl<I: MeshIndex> HalfEdgeTopology<I> {
    /// Build half-edge navigation arrays from faces and edge incidence.
    ///
    /// The edge arrays are checked against the faces first, so a mismatched
    /// `EV`/`EF`/`FE` triple fails here rather than during a later traversal.
    ///
    /// # Errors
    ///
    /// Fails on dimension mismatches, edge arrays that disagree with the faces,
    /// vertices not used by any face, and index overflow of `I`.
    pub fn from_edge_topology(
        num_vertices: usize,
        faces: &[[usize; 3]],
        edges: &EdgeTopology,
    ) -> Result<Self> {
        validate_faces(num_vertices, faces)?;
        validate_edges(faces, edges)?;

        let num_halfedges = faces.len() * 3;
        if I::try_from_usize(num_halfedges).is_none() {
            return Err(SetupError::invalid_param(
                "num_halfedges",
                num_halfedges,
                "too large for the index type",
            ));
        }

        let mut halfedges = vec![HalfEdge::<I>::new(); num_halfedges];
        let mut vertex_halfedge = vec![HalfEdgeId::<I>::invalid(); num_vertices];

        // First pass: in-face connectivity
        for (fi, face) in faces.iter().enumerate() {
            for j in 0..3 {
                let h = 3 * fi + j;
                let he = &mut halfedges[h];
                he.origin = VertexId::new(face[j]);
                he.edge = EdgeId::new(edges.fe[fi][j]);
                he.face = FaceId::new(fi);
                he.next = HalfEdgeId::new(3 * fi + (j + 1) % 3);
                he.prev = HalfEdgeId::new(3 * fi + (j + 2) % 3);

                if !vertex_halfedge[face[j]].is_valid() {
                    vertex_halfedge[face[j]] = HalfEdgeId::new(h);
                }
            }
        }

        if let Some(v) = vertex_halfedge.iter().position(|h| !h.is_valid()) {
            return Err(SetupError::IsolatedVertex { vertex: v });
        }

        // Second pass: edge sides and twins
        let mut edge_halfedges = vec![[HalfEdgeId::<I>::invalid(); 2]; edges.num_edges()];
        for (fi, fe) in edges.fe.iter().enumerate() {
            for (j, &e) in fe.iter().enumerate() {
                let side = if edges.ef[e][0] == Some(fi) { 0 } else { 1 };
                edge_halfedges[e][side] = HalfEdgeId::new(3 * fi + j);
            }
        }
        for sides in &edge_halfedges {
            if sides[0].is_valid() && sides[1].is_valid() {
                halfedges[sides[0].index()].twin = sides[1];
                halfedges[sides[1].index()].twin = sides[0];
            }
        }

        // Third pass: a vertex is on the boundary if it owns a twinless half-edge
        let mut boundary_vertex = vec![false; num_vertices];
        for he in &halfedges {
            if he.is_boundary() {
                boundary_vertex[he.origin.index()] = true;
            }
        }

        Ok(Self {
            halfedges,
            vertex_halfedge,
            edge_halfedges,
            boundary_vertex,
        })
    }
}

fn validate_edges(faces: &[[usize; 3]], edges: &EdgeTopology) -> Result<()> {
    if edges.fe.len() != faces.len() {
        return Err(SetupError::mismatch("FE rows", faces.len(), edges.fe.len()));
    }
    if edges.ef.len() != edges.ev.len() {
        return Err(SetupError::mismatch("EF rows", edges.ev.len(), edges.ef.len()));
    }

    for (fi, face) in faces.iter().enumerate() {
        for j in 0..3 {
            let e = edges.fe[fi][j];
            let consistent = e < edges.num_edges() && {
                let a = face[j];
                let b = face[(j + 1) % 3];
                let [v0, v1] = edges.ev[e];
                let [f0, f1] = edges.ef[e];
                // The face runs the edge forwards on side 0, backwards on side 1.
                (f0 == Some(fi) && [v0, v1] == [a, b]) || (f1 == Some(fi) && [v1, v0] == [a, b])
            };
            if !consistent {
                return Err(SetupError::InconsistentEdgeTopology { face: fi, corner: j });
            }
        }
    }

    for (e, sides) in edges.ef.iter().enumerate() {
        if sides[0].is_none() || sides[0] == sides[1] {
            let [v0, v1] = edges.ev[e];
            return Err(SetupError::NonManifoldEdge { v0, v1 });
        }
    }

    Ok(())
}
