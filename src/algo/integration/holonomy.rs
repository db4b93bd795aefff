//! Field holonomy around vertex stars.
//!
//! Walking the star of a vertex, every crossed seam relabels the field branches
//! by its matching and may introduce a transition variable. The walk records,
//! for every cut vertex it enters, how the cut vertex's N functions are expressed
//! in the `(vertex, transition)` DOFs; after the full loop, the accumulated
//! relation minus the identity is either zero (no constraint) or one block row
//! of the seamless constraint system.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::algo::progress::StageTicker;
use crate::error::{Result, SetupError};
use crate::mesh::{HalfEdgeTopology, MeshIndex, VertexId};

use super::cut::{CutMesh, SeamMarking};
use super::permutation::{Branch, ShiftSum};
use super::transition::Transitions;

/// Read-only inputs shared by every star evaluation.
pub(crate) struct StarContext<'a, I: MeshIndex> {
    pub topo: &'a HalfEdgeTopology<I>,
    pub seams: &'a SeamMarking,
    pub transitions: &'a Transitions,
    pub halfedge_matching: &'a [usize],
    pub cut_mesh: &'a CutMesh,
    pub singular: &'a [bool],
    pub n_functions: usize,
}

/// The result of walking one vertex star.
#[derive(Debug, Clone)]
pub struct StarHolonomy {
    /// `(cut vertex, dof, branch)`: the cut vertex's functions equal
    /// `branch * x[dof]` summed over all entries with the same cut vertex.
    pub cut_blocks: Vec<(usize, usize, Branch)>,

    /// Per involved DOF, the accumulated relation around the loop with the
    /// identity removed from the vertex's own DOF.
    pub residual: Vec<(usize, ShiftSum)>,

    /// `true` if the residual is non-zero and the vertex may carry a
    /// constraint (interior and not singular).
    pub constrained: bool,
}

impl StarHolonomy {
    /// Check if the accumulated relation is the identity.
    pub fn is_trivial(&self) -> bool {
        self.residual.iter().all(|(_, s)| s.is_zero())
    }
}

impl<'a, I: MeshIndex> StarContext<'a, I> {
    /// Walk the star of `v` and compose the branch relations.
    pub fn evaluate(&self, v: VertexId<I>) -> Result<StarHolonomy> {
        let topo = self.topo;
        let n = self.n_functions;
        let num_vertices = topo.num_vertices();

        let start = topo.star_start(v, |h| self.seams.is_cut(h))?;
        let walk = topo.star_walk(v, start)?;

        let mut branches: Vec<(Branch, usize)> = vec![(Branch::IDENTITY, v.index())];
        let mut cut_blocks = Vec::new();
        let mut current_cut = usize::MAX;

        for (k, &h) in walk.halfedges.iter().enumerate() {
            let cut_vertex = self
                .cut_mesh
                .corner(topo.face_of(h).index(), topo.corner_of(h));
            if cut_vertex != current_cut {
                current_cut = cut_vertex;
                cut_blocks.extend(branches.iter().map(|&(b, dof)| (cut_vertex, dof, b)));
            }

            let Some(crossing) = walk.crossing_after(k) else {
                break;
            };
            if !self.seams.is_cut(crossing) {
                continue;
            }

            let id = self.transitions.of(crossing).ok_or_else(|| {
                SetupError::inconsistent(v.index(), "seam half-edge has no transition")
            })?;
            let m = self.halfedge_matching[crossing.index()];
            let dof = Transitions::dof(num_vertices, id);

            if id > 0 {
                // P_e * f + J_e
                for (b, _) in branches.iter_mut() {
                    *b = b.shifted(m, n);
                }
                branches.push((Branch::IDENTITY, dof));
            } else {
                // P_e * (f - J_e)
                branches.push((Branch::NEG_IDENTITY, dof));
                for (b, _) in branches.iter_mut() {
                    *b = b.shifted(m, n);
                }
            }
        }

        let mut merged: BTreeMap<usize, ShiftSum> = BTreeMap::new();
        for &(b, dof) in &branches {
            merged.entry(dof).or_insert_with(|| ShiftSum::zero(n)).add(b);
        }
        merged
            .entry(v.index())
            .or_insert_with(|| ShiftSum::zero(n))
            .sub_identity();

        let residual: Vec<(usize, ShiftSum)> = merged.into_iter().collect();
        let nontrivial = residual.iter().any(|(_, s)| !s.is_zero());
        let constrained =
            nontrivial && !topo.is_boundary_vertex(v) && !self.singular[v.index()];

        Ok(StarHolonomy {
            cut_blocks,
            residual,
            constrained,
        })
    }

    /// Evaluate every vertex star, in vertex order.
    pub fn evaluate_all(
        &self,
        parallel: bool,
        ticker: Option<&StageTicker<'_>>,
    ) -> Result<Vec<StarHolonomy>> {
        let eval = |v: VertexId<I>| {
            let star = self.evaluate(v);
            if let Some(t) = ticker {
                t.tick();
            }
            star
        };
        if parallel {
            (0..self.topo.num_vertices())
                .into_par_iter()
                .map(|v| eval(VertexId::new(v)))
                .collect()
        } else {
            self.topo.vertex_ids().map(eval).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::cut::build_cut_mesh;
    use super::super::permutation::{cyclic_matrix, halfedge_matching};
    use super::super::transition::trace_transitions;
    use super::*;
    use crate::mesh::EdgeTopology;
    use nalgebra::{DMatrix, Point3};

    fn tetrahedron() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        (vertices, faces)
    }

    /// Evaluate all stars of the tetrahedron with a single seam edge `a - b`
    /// carrying matching `m` (N = 4).
    fn slit(a: usize, b: usize, m: i32, singular: &[usize]) -> Vec<StarHolonomy> {
        let n = 4;
        let (vertices, faces) = tetrahedron();
        let edges = EdgeTopology::from_faces(4, &faces).unwrap();
        let topo: HalfEdgeTopology = HalfEdgeTopology::from_edge_topology(4, &faces, &edges).unwrap();

        let face2cut: Vec<[bool; 3]> = faces
            .iter()
            .map(|f| {
                let mut s = [false; 3];
                for j in 0..3 {
                    let (x, y) = (f[j], f[(j + 1) % 3]);
                    s[j] = (x, y) == (a, b) || (y, x) == (a, b);
                }
                s
            })
            .collect();
        let matching: Vec<i32> = edges
            .ev
            .iter()
            .map(|&[x, y]| if (x, y) == (a, b) || (y, x) == (a, b) { m } else { 0 })
            .collect();

        let mut flags = vec![false; 4];
        for &s in singular {
            flags[s] = true;
        }

        let seams = SeamMarking::new(&topo, &face2cut).unwrap();
        let cut_mesh = build_cut_mesh(&topo, &vertices, &seams).unwrap();
        let transitions = trace_transitions(&topo, &seams, &flags).unwrap();
        let hm = halfedge_matching(&topo, &matching, n);

        let ctx = StarContext {
            topo: &topo,
            seams: &seams,
            transitions: &transitions,
            halfedge_matching: &hm,
            cut_mesh: &cut_mesh,
            singular: &flags,
            n_functions: n,
        };
        ctx.evaluate_all(false, None).unwrap()
    }

    #[test]
    fn test_no_seam_vertices_are_trivial() {
        let stars = slit(2, 3, 1, &[2]);
        for v in [0, 1] {
            assert!(stars[v].is_trivial());
            assert!(!stars[v].constrained);
            assert_eq!(stars[v].cut_blocks.len(), 1);
        }
    }

    #[test]
    fn test_singular_endpoint_is_exempt() {
        let stars = slit(2, 3, 1, &[2]);
        assert!(!stars[2].is_trivial());
        assert!(!stars[2].constrained);
    }

    #[test]
    fn test_other_endpoint_is_constrained() {
        let stars = slit(2, 3, 1, &[2]);
        let leaf = &stars[3];
        assert!(leaf.constrained);

        // Residual: vertex block is P^±1 - I, transition block is -P^±1.
        let own = &leaf.residual.iter().find(|(dof, _)| *dof == 3).unwrap().1;
        let jump = &leaf.residual.iter().find(|(dof, _)| *dof == 4).unwrap().1;
        let id = DMatrix::<i32>::identity(4, 4);
        let shift = own.to_matrix() + &id;
        assert!(shift == cyclic_matrix(4, 1) || shift == cyclic_matrix(4, 3));
        assert_eq!(jump.to_matrix(), -shift);
    }

    #[test]
    fn test_matching_composes_to_holonomy() {
        // With zero matching the slit still introduces a jump, and the leaf is
        // constrained by J = 0.
        let stars = slit(2, 3, 0, &[2]);
        let leaf = &stars[3];
        assert!(leaf.constrained);
        let own = &leaf.residual.iter().find(|(dof, _)| *dof == 3).unwrap().1;
        assert!(own.is_zero());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let n = 4;
        let (vertices, faces) = tetrahedron();
        let edges = EdgeTopology::from_faces(4, &faces).unwrap();
        let topo: HalfEdgeTopology = HalfEdgeTopology::from_edge_topology(4, &faces, &edges).unwrap();
        let face2cut = vec![[false; 3]; 4];
        let seams = SeamMarking::new(&topo, &face2cut).unwrap();
        let cut_mesh = build_cut_mesh(&topo, &vertices, &seams).unwrap();
        let flags = vec![false; 4];
        let transitions = trace_transitions(&topo, &seams, &flags).unwrap();
        let hm = halfedge_matching(&topo, &vec![0; edges.num_edges()], n);
        let ctx = StarContext {
            topo: &topo,
            seams: &seams,
            transitions: &transitions,
            halfedge_matching: &hm,
            cut_mesh: &cut_mesh,
            singular: &flags,
            n_functions: n,
        };

        let seq = ctx.evaluate_all(false, None).unwrap();
        let par = ctx.evaluate_all(true, None).unwrap();
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.cut_blocks, b.cut_blocks);
            assert_eq!(a.residual, b.residual);
        }
    }
}
