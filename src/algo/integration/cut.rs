//! Cut graph and cut mesh construction.
//!
//! The seam marking (`face2cut`) flags face sides that lie on the cut graph.
//! Duplicating every vertex once per wedge of its star between seams yields the
//! cut mesh, on which a seamless parametrization is single-valued.

use nalgebra::Point3;

use crate::error::{Result, SetupError};
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeTopology, MeshIndex, VertexId};

/// Seam flags derived from a per-face-side marking.
#[derive(Debug, Clone)]
pub struct SeamMarking {
    /// Per half-edge: the face side is on the cut graph.
    halfedge_cut: Vec<bool>,
    /// Per edge: at least one side is marked.
    edge_seam: Vec<bool>,
    /// Per vertex: number of incident seam edges.
    cut_valence: Vec<usize>,
}

impl SeamMarking {
    /// Derive half-edge, edge and valence flags from `face2cut`.
    ///
    /// `face2cut[f][j]` marks the side leaving corner `j` of face `f`.
    pub fn new<I: MeshIndex>(topo: &HalfEdgeTopology<I>, face2cut: &[[bool; 3]]) -> Result<Self> {
        if face2cut.len() != topo.num_faces() {
            return Err(SetupError::mismatch(
                "face2cut rows",
                topo.num_faces(),
                face2cut.len(),
            ));
        }

        let mut halfedge_cut = vec![false; topo.num_halfedges()];
        let mut edge_seam = vec![false; topo.num_edges()];
        for (fi, sides) in face2cut.iter().enumerate() {
            for (j, &cut) in sides.iter().enumerate() {
                if cut {
                    let h = 3 * fi + j;
                    halfedge_cut[h] = true;
                    edge_seam[topo.edge_of(HalfEdgeId::new(h)).index()] = true;
                }
            }
        }

        for h in topo.halfedge_ids() {
            let t = topo.twin(h);
            if t.is_valid() && halfedge_cut[h.index()] != halfedge_cut[t.index()] {
                return Err(SetupError::inconsistent(
                    topo.origin(h).index(),
                    "seam marked on one side of an edge only",
                ));
            }
        }

        let mut cut_valence = vec![0usize; topo.num_vertices()];
        for (e, &seam) in edge_seam.iter().enumerate() {
            if seam {
                let e = EdgeId::<I>::new(e);
                let h = topo.edge_halfedge(e, 0);
                cut_valence[topo.origin(h).index()] += 1;
                cut_valence[topo.dest(h).index()] += 1;
            }
        }

        Ok(Self {
            halfedge_cut,
            edge_seam,
            cut_valence,
        })
    }

    /// Check if a half-edge is flagged as cut.
    #[inline]
    pub fn is_cut<I: MeshIndex>(&self, h: HalfEdgeId<I>) -> bool {
        self.halfedge_cut[h.index()]
    }

    /// Number of seam edges incident to a vertex.
    #[inline]
    pub fn cut_valence<I: MeshIndex>(&self, v: VertexId<I>) -> usize {
        self.cut_valence[v.index()]
    }

    /// Number of edges on the cut graph.
    pub fn num_seam_edges(&self) -> usize {
        self.edge_seam.iter().filter(|&&s| s).count()
    }
}

/// The mesh duplicated along its seams.
#[derive(Debug, Clone, PartialEq)]
pub struct CutMesh {
    /// Cut vertex positions, copied from their source vertices.
    pub vertices: Vec<Point3<f64>>,
    /// Faces over cut vertices, positionally aligned with the original faces.
    pub faces: Vec<[usize; 3]>,
    /// Source vertex of each cut vertex.
    pub cut2whole: Vec<usize>,
}

impl CutMesh {
    /// Number of cut vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.cut2whole.len()
    }

    /// The cut vertex at corner `corner` of face `f`.
    #[inline]
    pub fn corner(&self, f: usize, corner: usize) -> usize {
        self.faces[f][corner]
    }
}

/// Duplicate vertices along seams.
///
/// Each vertex star is walked from its first seam (or boundary) half-edge; a new
/// cut vertex starts at the walk's start and at every seam crossed, and every
/// face corner in between is assigned to it. Cut vertices are numbered by
/// source vertex, then by walk order.
pub fn build_cut_mesh<I: MeshIndex>(
    topo: &HalfEdgeTopology<I>,
    vertices: &[Point3<f64>],
    seams: &SeamMarking,
) -> Result<CutMesh> {
    let mut cut2whole = Vec::with_capacity(topo.num_vertices());
    let mut cut_vertices = Vec::with_capacity(topo.num_vertices());
    let mut faces = vec![[usize::MAX; 3]; topo.num_faces()];

    for v in topo.vertex_ids() {
        let start = topo.star_start(v, |h| seams.is_cut(h))?;
        let walk = topo.star_walk(v, start)?;

        for &h in &walk.halfedges {
            if h == start || seams.is_cut(h) {
                cut2whole.push(v.index());
                cut_vertices.push(vertices[v.index()]);
            }
            faces[topo.face_of(h).index()][topo.corner_of(h)] = cut2whole.len() - 1;
        }
    }

    if let Some(f) = faces.iter().position(|c| c.contains(&usize::MAX)) {
        let v = topo.origin(topo.face_halfedge(FaceId::new(f), 0));
        return Err(SetupError::inconsistent(
            v.index(),
            "star walks did not cover every face corner",
        ));
    }

    log::debug!(
        "cut mesh: {} vertices -> {} cut vertices, {} seam edges",
        topo.num_vertices(),
        cut2whole.len(),
        seams.num_seam_edges()
    );

    Ok(CutMesh {
        vertices: cut_vertices,
        faces,
        cut2whole,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::EdgeTopology;

    /// A 2x2 grid of quads split into triangles; vertex 4 is interior.
    fn grid() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let mut vertices = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..2 {
            for i in 0..2 {
                let v00 = j * 3 + i;
                faces.push([v00, v00 + 1, v00 + 4]);
                faces.push([v00, v00 + 4, v00 + 3]);
            }
        }
        (vertices, faces)
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

    fn topology(n: usize, faces: &[[usize; 3]]) -> HalfEdgeTopology {
        let edges = EdgeTopology::from_faces(n, faces).unwrap();
        HalfEdgeTopology::from_edge_topology(n, faces, &edges).unwrap()
    }

    #[test]
    fn test_no_seams_is_identity() {
        let (vertices, faces) = grid();
        let topo = topology(vertices.len(), &faces);
        let seams = SeamMarking::new(&topo, &mark(&faces, &[])).unwrap();
        let cut = build_cut_mesh(&topo, &vertices, &seams).unwrap();

        assert_eq!(cut.num_vertices(), vertices.len());
        assert_eq!(cut.cut2whole, (0..vertices.len()).collect::<Vec<_>>());
        assert_eq!(cut.faces, faces);
    }

    #[test]
    fn test_seam_through_interior_vertex_splits_it() {
        let (vertices, faces) = grid();
        let topo = topology(vertices.len(), &faces);
        // Seam 1 - 4 - 7 cuts the grid into left and right halves.
        let seams = SeamMarking::new(&topo, &mark(&faces, &[(1, 4), (4, 7)])).unwrap();
        assert_eq!(seams.cut_valence(VertexId::<u32>::new(4)), 2);
        assert_eq!(seams.num_seam_edges(), 2);

        let cut = build_cut_mesh(&topo, &vertices, &seams).unwrap();
        let copies_of = |v: usize| cut.cut2whole.iter().filter(|&&w| w == v).count();
        assert_eq!(copies_of(4), 2);
        // Boundary endpoints start at the boundary and split at the seam.
        assert_eq!(copies_of(1), 2);
        assert_eq!(copies_of(7), 2);
        assert_eq!(copies_of(0), 1);

        // Every cut face corner maps back to the original corner.
        for (f, face) in faces.iter().enumerate() {
            for j in 0..3 {
                assert_eq!(cut.cut2whole[cut.corner(f, j)], face[j]);
                assert_eq!(cut.vertices[cut.corner(f, j)], vertices[face[j]]);
            }
        }
    }

    #[test]
    fn test_one_sided_interior_seam_rejected() {
        let (vertices, faces) = grid();
        let topo = topology(vertices.len(), &faces);
        // Face 0 marks its side 1 -> 4; face 3 leaves the side 4 -> 1 unmarked.
        let mut face2cut = mark(&faces, &[]);
        face2cut[0][1] = true;

        let err = SeamMarking::new(&topo, &face2cut).unwrap_err();
        assert!(matches!(err, SetupError::TopologyInconsistent { vertex: 1, .. }));
    }

    #[test]
    fn test_boundary_seam_has_one_side() {
        let (vertices, faces) = grid();
        let topo = topology(vertices.len(), &faces);
        let seams = SeamMarking::new(&topo, &mark(&faces, &[(0, 1)])).unwrap();
        assert_eq!(seams.num_seam_edges(), 1);
        assert_eq!(seams.cut_valence(VertexId::<u32>::new(0)), 1);
    }

    #[test]
    fn test_uncovered_corner_rejected() {
        // Two triangles touching only at vertex 0: its star walk sees one fan.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 4]];
        let topo = topology(vertices.len(), &faces);
        let seams = SeamMarking::new(&topo, &mark(&faces, &[])).unwrap();

        let err = build_cut_mesh(&topo, &vertices, &seams).unwrap_err();
        assert!(matches!(err, SetupError::TopologyInconsistent { vertex: 0, .. }));
    }

    #[test]
    fn test_face2cut_shape_checked() {
        let (vertices, faces) = grid();
        let topo = topology(vertices.len(), &faces);
        let result = SeamMarking::new(&topo, &[[false; 3]]);
        assert!(matches!(result, Err(SetupError::DimensionMismatch { .. })));
    }
}
