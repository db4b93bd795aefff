//! Array-based half-edge topology.
//!
//! This module provides a half-edge (doubly-connected edge list) view of a
//! triangle mesh given as face and edge incidence arrays. Every face corner owns
//! exactly one half-edge, so half-edge `3 * f + j` leaves corner `j` of face `f`
//! and points at corner `j + 1`.
//!
//! # Structure
//!
//! - Each interior edge is split into two **half-edges** pointing in opposite
//!   directions and linked as **twins**
//! - Each half-edge knows its **next** and **prev** around its face, its
//!   **origin vertex**, its **edge** and its **face**
//! - Each vertex stores one outgoing half-edge; each edge stores the half-edge
//!   on each of its two sides
//!
//! # Boundary Handling
//!
//! No boundary half-edges are created. A half-edge on a mesh boundary has an
//! invalid twin, and walks around a vertex stop when they reach one.

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{Result, SetupError};

/// A half-edge in the topology.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The full edge this half-edge belongs to.
    pub edge: EdgeId<I>,

    /// The face this half-edge belongs to.
    pub face: FaceId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face (clockwise).
    pub prev: HalfEdgeId<I>,

    /// The opposite half-edge. Invalid on the boundary.
    pub twin: HalfEdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            edge: EdgeId::invalid(),
            face: FaceId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            twin: HalfEdgeId::invalid(),
        }
    }

    /// Check if this half-edge lies on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.twin.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// The ordered half-edges visited while walking one vertex star.
///
/// Produced by [`HalfEdgeTopology::star_walk`]. The walk steps from a half-edge
/// `h` to `twin(prev(h))`, which is the half-edge leaving the same vertex in the
/// neighbouring face.
#[derive(Debug, Clone)]
pub struct StarWalk<I: MeshIndex = u32> {
    /// Outgoing half-edges in visiting order; the first is the start.
    pub halfedges: Vec<HalfEdgeId<I>>,

    /// `true` if the walk returned to its start, `false` if it left through
    /// the boundary.
    pub closed: bool,
}

impl<I: MeshIndex> StarWalk<I> {
    /// The half-edge crossed when leaving position `k` of the walk, if any.
    ///
    /// For a closed walk the last step crosses back into the start half-edge.
    #[inline]
    pub fn crossing_after(&self, k: usize) -> Option<HalfEdgeId<I>> {
        if k + 1 < self.halfedges.len() {
            Some(self.halfedges[k + 1])
        } else if self.closed {
            self.halfedges.first().copied()
        } else {
            None
        }
    }
}

/// Half-edge navigation arrays for a triangle mesh.
///
/// Built by [`HalfEdgeTopology::from_edge_topology`]. All queries are O(1)
/// except the star walks, which are bounded by the total half-edge count.
#[derive(Debug, Clone)]
pub struct HalfEdgeTopology<I: MeshIndex = u32> {
    /// All half-edges; half-edge `3 * f + j` leaves corner `j` of face `f`.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// One outgoing half-edge per vertex.
    pub(crate) vertex_halfedge: Vec<HalfEdgeId<I>>,

    /// The half-edge on each side of every edge, matching the `EF` ordering.
    pub(crate) edge_halfedges: Vec<[HalfEdgeId<I>; 2]>,

    /// Per-vertex boundary flag.
    pub(crate) boundary_vertex: Vec<bool>,
}

impl<I: MeshIndex> HalfEdgeTopology<I> {
    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertex_halfedge.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.halfedges.len() / 3
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edge_halfedges.len()
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// The outgoing half-edge stored for a vertex (`VH`).
    #[inline]
    pub fn vertex_halfedge(&self, v: VertexId<I>) -> HalfEdgeId<I> {
        self.vertex_halfedge[v.index()]
    }

    /// The half-edge leaving corner `corner` of face `f` (`FH`).
    #[inline]
    pub fn face_halfedge(&self, f: FaceId<I>, corner: usize) -> HalfEdgeId<I> {
        debug_assert!(corner < 3);
        HalfEdgeId::new(3 * f.index() + corner)
    }

    /// The half-edge on side `side` of an edge (`EH`); invalid for the
    /// missing side of a boundary edge.
    #[inline]
    pub fn edge_halfedge(&self, e: EdgeId<I>, side: usize) -> HalfEdgeId<I> {
        self.edge_halfedges[e.index()][side]
    }

    /// The corner position of a half-edge inside its face.
    #[inline]
    pub fn corner_of(&self, he: HalfEdgeId<I>) -> usize {
        he.index() % 3
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    ///
    /// Uses `next` rather than `twin` so it is defined on the boundary too.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.next(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Get the edge of a half-edge.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        self.halfedge(he).edge
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        self.boundary_vertex[v.index()]
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertex_halfedge.len()).map(VertexId::new)
    }

    // ==================== Star Walks ====================

    /// Pick the half-edge a star walk around `v` should start from.
    ///
    /// Boundary vertices start at their outgoing boundary half-edge, so the walk
    /// sweeps the whole fan before exiting. Interior vertices start at the
    /// first outgoing half-edge accepted by `is_seam`, or at the stored
    /// half-edge if none is.
    pub fn star_start<F>(&self, v: VertexId<I>, is_seam: F) -> Result<HalfEdgeId<I>>
    where
        F: Fn(HalfEdgeId<I>) -> bool,
    {
        let begin = self.vertex_halfedge(v);
        let boundary = self.is_boundary_vertex(v);
        let mut current = begin;

        for _ in 0..=self.num_halfedges() {
            if boundary {
                if self.is_boundary_halfedge(current) {
                    return Ok(current);
                }
            } else if is_seam(current) {
                return Ok(current);
            }

            let twin = self.twin(current);
            if !twin.is_valid() {
                return Err(SetupError::inconsistent(
                    v.index(),
                    "interior vertex star reached a boundary",
                ));
            }
            current = self.next(twin);
            if current == begin {
                if boundary {
                    return Err(SetupError::inconsistent(
                        v.index(),
                        "boundary vertex has no boundary half-edge",
                    ));
                }
                return Ok(begin);
            }
        }

        Err(SetupError::inconsistent(v.index(), "star rotation did not close"))
    }

    /// Walk the star of `v` from `start` by stepping `h -> twin(prev(h))`.
    ///
    /// Stops when the walk returns to `start` or leaves through the boundary.
    /// Fails if the walk exceeds the half-edge count, which only happens on
    /// inconsistent connectivity.
    pub fn star_walk(&self, v: VertexId<I>, start: HalfEdgeId<I>) -> Result<StarWalk<I>> {
        let mut halfedges = Vec::with_capacity(8);
        let mut current = start;

        for _ in 0..=self.num_halfedges() {
            if self.origin(current) != v {
                return Err(SetupError::inconsistent(
                    v.index(),
                    "star walk left the vertex",
                ));
            }
            halfedges.push(current);

            let next = self.twin(self.prev(current));
            if !next.is_valid() {
                return Ok(StarWalk {
                    halfedges,
                    closed: false,
                });
            }
            if next == start {
                return Ok(StarWalk {
                    halfedges,
                    closed: true,
                });
            }
            current = next;
        }

        Err(SetupError::inconsistent(v.index(), "star walk did not close"))
    }

    // ==================== Validation ====================

    /// Check if the connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for (vi, &he) in self.vertex_halfedge.iter().enumerate() {
            if !he.is_valid() || self.origin(he).index() != vi {
                return false;
            }
        }

        for heid in self.halfedge_ids() {
            let he = self.halfedge(heid);
            if he.twin.is_valid() {
                let twin = self.halfedge(he.twin);
                if twin.twin != heid || twin.edge != he.edge {
                    return false;
                }
                if self.origin(he.twin) != self.dest(heid) {
                    return false;
                }
            }
            if self.prev(he.next) != heid || self.next(he.prev) != heid {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::builder::EdgeTopology;
    use super::*;

    fn fan() -> HalfEdgeTopology {
        // Three triangles around vertex 0, open between vertices 1 and 4.
        let faces = vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]];
        let edges = EdgeTopology::from_faces(5, &faces).unwrap();
        HalfEdgeTopology::from_edge_topology(5, &faces, &edges).unwrap()
    }

    #[test]
    fn test_halfedge_layout() {
        let topo = fan();
        assert_eq!(topo.num_faces(), 3);
        assert_eq!(topo.num_halfedges(), 9);
        assert!(topo.is_valid());

        let f1: FaceId = FaceId::new(1);
        let h = topo.face_halfedge(f1, 2);
        assert_eq!(topo.origin(h).index(), 3);
        assert_eq!(topo.dest(h).index(), 0);
        assert_eq!(topo.face_of(h), f1);
        assert_eq!(topo.corner_of(h), 2);
    }

    #[test]
    fn test_boundary_flags() {
        let topo = fan();
        // Every vertex of an open fan touches the boundary.
        for v in topo.vertex_ids() {
            assert!(topo.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_star_walk_boundary_vertex_covers_fan() {
        let topo = fan();
        let v: VertexId = VertexId::new(0);
        let start = topo.star_start(v, |_| false).unwrap();
        assert!(topo.is_boundary_halfedge(start));

        let walk = topo.star_walk(v, start).unwrap();
        assert!(!walk.closed);
        assert_eq!(walk.halfedges.len(), 3);
        assert_eq!(walk.crossing_after(2), None);
    }

    #[test]
    fn test_star_walk_rejects_foreign_start() {
        let topo = fan();
        // Half-edge 1 runs 1 -> 2 and does not leave vertex 0.
        let result = topo.star_walk(VertexId::new(0), HalfEdgeId::new(1));
        assert!(matches!(
            result,
            Err(SetupError::TopologyInconsistent { vertex: 0, .. })
        ));
    }
}
