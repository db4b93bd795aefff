//! Benchmarks for the integration setup.

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{DMatrix, Point3};
use seamless_setup::prelude::*;

fn create_grid(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    (vertices, faces)
}

/// Seam along the middle row of the grid, from the left boundary to the centre.
fn half_row_seam(n: usize) -> Vec<(usize, usize)> {
    let row = (n / 2) * (n + 1);
    (0..n / 2).map(|i| (row + i, row + i + 1)).collect()
}

fn bench_topology(c: &mut Criterion) {
    let (vertices, faces) = create_grid(50);

    c.bench_function("edge_topology_50x50", |b| {
        b.iter(|| EdgeTopology::from_faces(vertices.len(), &faces).unwrap());
    });

    let edges = EdgeTopology::from_faces(vertices.len(), &faces).unwrap();
    c.bench_function("halfedge_topology_50x50", |b| {
        b.iter(|| {
            let topo: HalfEdgeTopology =
                HalfEdgeTopology::from_edge_topology(vertices.len(), &faces, &edges).unwrap();
            topo
        });
    });
}

fn bench_setup(c: &mut Criterion) {
    let n = 50;
    let (vertices, faces) = create_grid(n);
    let edges = EdgeTopology::from_faces(vertices.len(), &faces).unwrap();

    let symm = sign_symmetry(4).unwrap();
    let int_func = default_period_jumps(2);
    let field = DMatrix::zeros(faces.len(), 12);
    let matching: Vec<i32> = (0..edges.num_edges())
        .map(|e| if edges.is_boundary_edge(e) { -1 } else { 0 })
        .collect();
    let singular = vec![(n / 2) * (n + 1) + n / 2];

    let input = SetupInput {
        vertices: &vertices,
        faces: &faces,
        edges: &edges,
        raw_field: &field,
        matching: &matching,
        singular_vertices: &singular,
        symm_func: &symm,
        int_func: &int_func,
    };
    let seams = PrecomputedSeams::from_edges(&faces, &half_row_seam(n));

    c.bench_function("setup_integration_50x50", |b| {
        let options = IntegrationOptions::default();
        b.iter(|| setup_integration(&input, &seams, &PassThroughComber, &options).unwrap());
    });

    c.bench_function("setup_integration_50x50_sequential", |b| {
        let options = IntegrationOptions::default().sequential();
        b.iter(|| setup_integration(&input, &seams, &PassThroughComber, &options).unwrap());
    });
}

criterion_group!(benches, bench_topology, bench_setup);
criterion_main!(benches);
