//! Transition (period jump) variables along cut paths.
//!
//! The cut graph decomposes into paths between nodes: vertices whose cut
//! valence is not two, singular vertices and boundary vertices. Every seam edge
//! of one path shares a single transition variable; the half-edge running along
//! the trace direction carries `+id`, its twin `-id`. Ids start at 1.

use crate::error::{Result, SetupError};
use crate::mesh::{HalfEdgeId, HalfEdgeTopology, MeshIndex, VertexId};

use super::cut::SeamMarking;

/// Signed transition ids per half-edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transitions {
    halfedge: Vec<Option<i32>>,
    count: usize,
}

impl Transitions {
    /// The signed transition id of a half-edge, `None` off the cut graph.
    #[inline]
    pub fn of<I: MeshIndex>(&self, h: HalfEdgeId<I>) -> Option<i32> {
        self.halfedge[h.index()]
    }

    /// Number of transition variables.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Per-half-edge ids, indexed by half-edge.
    #[inline]
    pub fn as_slice(&self) -> &[Option<i32>] {
        &self.halfedge
    }

    /// Index of a transition in the `(vertex, transition)` DOF space.
    #[inline]
    pub fn dof(num_vertices: usize, id: i32) -> usize {
        num_vertices + id.unsigned_abs() as usize - 1
    }
}

struct Tracer<'a, I: MeshIndex> {
    topo: &'a HalfEdgeTopology<I>,
    seams: &'a SeamMarking,
    singular: &'a [bool],
    halfedge: Vec<Option<i32>>,
    next_id: i32,
}

impl<'a, I: MeshIndex> Tracer<'a, I> {
    /// A vertex a cut path passes straight through.
    fn is_path_interior(&self, v: VertexId<I>) -> bool {
        self.seams.cut_valence(v) == 2
            && !self.singular[v.index()]
            && !self.topo.is_boundary_vertex(v)
    }

    fn is_unclaimed_seam(&self, h: HalfEdgeId<I>) -> bool {
        self.seams.is_cut(h) && self.halfedge[h.index()].is_none()
    }

    fn claim(&mut self, h: HalfEdgeId<I>, id: i32) -> Result<()> {
        let twin = self.topo.twin(h);
        if !twin.is_valid() {
            return Err(SetupError::inconsistent(
                self.topo.origin(h).index(),
                "cut path runs along the boundary",
            ));
        }
        self.halfedge[h.index()] = Some(id);
        self.halfedge[twin.index()] = Some(-id);
        Ok(())
    }

    /// Claim `first` and continue through path-interior vertices until a node
    /// (or `stop_at`) is reached. Issues one new transition id.
    fn trace(&mut self, first: HalfEdgeId<I>, stop_at: Option<VertexId<I>>) -> Result<()> {
        let id = self.next_id;
        self.claim(first, id)?;

        let mut v = self.topo.dest(first);
        while self.is_path_interior(v) && Some(v) != stop_at {
            let start = self.topo.vertex_halfedge(v);
            let walk = self.topo.star_walk(v, start)?;
            let h = walk
                .halfedges
                .iter()
                .copied()
                .find(|&h| self.is_unclaimed_seam(h))
                .ok_or_else(|| {
                    SetupError::inconsistent(v.index(), "cut path has no continuation")
                })?;
            self.claim(h, id)?;
            v = self.topo.dest(h);
        }

        self.next_id += 1;
        Ok(())
    }

    /// Trace every unclaimed interior seam half-edge leaving `v`.
    fn trace_from(&mut self, v: VertexId<I>, stop_at: Option<VertexId<I>>) -> Result<()> {
        let start = self.topo.star_start(v, |_| false)?;
        let walk = self.topo.star_walk(v, start)?;
        for &h in &walk.halfedges {
            if self.is_unclaimed_seam(h) && self.topo.twin(h).is_valid() {
                self.trace(h, stop_at)?;
            }
        }
        Ok(())
    }
}

/// Assign transition ids by tracing cut paths from node to node.
///
/// Nodes are visited in vertex order. Seam cycles that contain no node are
/// traced afterwards from their lowest-index vertex, so every interior seam
/// half-edge ends up with an id.
///
/// `singular` must already exclude boundary vertices.
pub fn trace_transitions<I: MeshIndex>(
    topo: &HalfEdgeTopology<I>,
    seams: &SeamMarking,
    singular: &[bool],
) -> Result<Transitions> {
    let mut tracer = Tracer {
        topo,
        seams,
        singular,
        halfedge: vec![None; topo.num_halfedges()],
        next_id: 1,
    };

    for v in topo.vertex_ids() {
        if seams.cut_valence(v) == 0 || tracer.is_path_interior(v) {
            continue;
        }
        tracer.trace_from(v, None)?;
    }

    let path_transitions = tracer.next_id - 1;
    for v in topo.vertex_ids() {
        if tracer.is_path_interior(v) {
            tracer.trace_from(v, Some(v))?;
        }
    }
    let loop_transitions = tracer.next_id - 1 - path_transitions;

    log::debug!(
        "traced {} transitions ({} on closed seam loops)",
        tracer.next_id - 1,
        loop_transitions
    );

    let count = (tracer.next_id - 1) as usize;
    Ok(Transitions {
        halfedge: tracer.halfedge,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::EdgeTopology;

    fn octahedron() -> Vec<[usize; 3]> {
        // 0 = top, 5 = bottom, 1..=4 around the equator
        vec![
            [0, 1, 2],
            [0, 2, 3],
            [0, 3, 4],
            [0, 4, 1],
            [5, 2, 1],
            [5, 3, 2],
            [5, 4, 3],
            [5, 1, 4],
        ]
    }

    fn mark(faces: &[[usize; 3]], pairs: &[(usize, usize)]) -> Vec<[bool; 3]> {
        faces
            .iter()
            .map(|f| {
                let mut sides = [false; 3];
                for j in 0..3 {
                    let (a, b) = (f[j], f[(j + 1) % 3]);
                    sides[j] = pairs.iter().any(|&(x, y)| (x, y) == (a, b) || (y, x) == (a, b));
                }
                sides
            })
            .collect()
    }

    fn setup(pairs: &[(usize, usize)], singular: &[usize]) -> (HalfEdgeTopology, Transitions) {
        let faces = octahedron();
        let edges = EdgeTopology::from_faces(6, &faces).unwrap();
        let topo = HalfEdgeTopology::from_edge_topology(6, &faces, &edges).unwrap();
        let seams = SeamMarking::new(&topo, &mark(&faces, pairs)).unwrap();
        let mut flags = vec![false; 6];
        for &s in singular {
            flags[s] = true;
        }
        let transitions = trace_transitions(&topo, &seams, &flags).unwrap();
        (topo, transitions)
    }

    fn assert_twins_negated(topo: &HalfEdgeTopology, t: &Transitions) {
        for h in topo.halfedge_ids() {
            if let Some(id) = t.of(h) {
                assert_ne!(id, 0);
                assert_eq!(t.of(topo.twin(h)), Some(-id));
            }
        }
    }

    #[test]
    fn test_no_seams() {
        let (_, t) = setup(&[], &[]);
        assert_eq!(t.count(), 0);
        assert!(t.as_slice().iter().all(Option::is_none));
    }

    #[test]
    fn test_path_through_valence_two_vertex_is_one_transition() {
        // 0 - 1 - 5: vertex 1 is path-interior, 0 and 5 are leaves.
        let (topo, t) = setup(&[(0, 1), (1, 5)], &[0]);
        assert_eq!(t.count(), 1);
        assert_twins_negated(&topo, &t);

        let claimed = t.as_slice().iter().filter(|id| id.is_some()).count();
        assert_eq!(claimed, 4);
    }

    #[test]
    fn test_branch_point_splits_paths() {
        // Star around vertex 0 with three arms: 0 is a node of valence 3.
        let (topo, t) = setup(&[(0, 1), (0, 2), (0, 3)], &[]);
        assert_eq!(t.count(), 3);
        assert_twins_negated(&topo, &t);
    }

    #[test]
    fn test_closed_loop_without_nodes() {
        // The equator 1-2-3-4 has only valence-two vertices.
        let (topo, t) = setup(&[(1, 2), (2, 3), (3, 4), (4, 1)], &[]);
        assert_eq!(t.count(), 1);
        assert_twins_negated(&topo, &t);
        assert_eq!(t.as_slice().iter().filter(|id| id.is_some()).count(), 8);
    }

    #[test]
    fn test_singular_vertex_is_a_node() {
        // 1 would be path-interior, but a singularity there ends the path.
        let (topo, t) = setup(&[(0, 1), (1, 5)], &[1]);
        assert_eq!(t.count(), 2);
        assert_twins_negated(&topo, &t);
    }

    #[test]
    fn test_dof_index() {
        assert_eq!(Transitions::dof(10, 1), 10);
        assert_eq!(Transitions::dof(10, -3), 12);
    }
}
