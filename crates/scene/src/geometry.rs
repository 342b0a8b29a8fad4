use glam::{Vec2, Vec3};
use morphsphere_shading::VertexInput;
use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

/// Immutable triangulated mesh data.
///
/// Triangles are indexed (`indices`, three per triangle); `line_indices`
/// holds each triangle edge once, for line-list wireframe drawing.
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    line_indices: Vec<u32>,
}

/// Golden-ratio icosahedron corners.
fn icosahedron() -> ([Vec3; 12], [[usize; 3]; 20]) {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let vertices = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    #[rustfmt::skip]
    let faces = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    (vertices, faces)
}

/// Spherical texture coordinates for a point on the unit sphere.
///
/// `v` runs from 0 at the south pole to 1 at the north pole.
pub fn sphere_uv(n: Vec3) -> Vec2 {
    let u = n.z.atan2(-n.x) / TAU + 0.5;
    let v = 0.5 + n.y.atan2((n.x * n.x + n.z * n.z).sqrt()) / PI;
    Vec2::new(u, v)
}

impl Geometry {
    /// Subdivided icosahedron projected onto a sphere.
    ///
    /// Each face is split into `(detail + 1)^2` triangles. Vertices are not
    /// shared between faces, so face seams carry duplicate positions.
    pub fn icosphere(radius: f32, detail: u32) -> Self {
        let (corners, faces) = icosahedron();
        let cols = detail as usize + 1;
        let per_face = (cols + 1) * (cols + 2) / 2;

        let mut positions = Vec::with_capacity(faces.len() * per_face);
        let mut normals = Vec::with_capacity(faces.len() * per_face);
        let mut uvs = Vec::with_capacity(faces.len() * per_face);
        let mut indices = Vec::with_capacity(faces.len() * cols * cols * 3);

        for face in faces {
            let a = corners[face[0]];
            let b = corners[face[1]];
            let c = corners[face[2]];
            let base = positions.len() as u32;

            // Row i has cols - i + 1 vertices, lerping from the a-c edge to the b-c edge.
            let mut row_start = Vec::with_capacity(cols + 1);
            for i in 0..=cols {
                row_start.push(positions.len() as u32 - base);
                let ai = a.lerp(c, i as f32 / cols as f32);
                let bi = b.lerp(c, i as f32 / cols as f32);
                let rows = cols - i;
                for j in 0..=rows {
                    let p = if rows == 0 {
                        ai
                    } else {
                        ai.lerp(bi, j as f32 / rows as f32)
                    };
                    let n = p.normalize();
                    positions.push(n * radius);
                    normals.push(n);
                    uvs.push(sphere_uv(n));
                }
            }

            let at = |i: usize, j: usize| base + row_start[i] + j as u32;
            for i in 0..cols {
                for j in 0..(2 * (cols - i) - 1) {
                    let k = j / 2;
                    if j % 2 == 0 {
                        indices.extend_from_slice(&[at(i, k + 1), at(i + 1, k), at(i, k)]);
                    } else {
                        indices.extend_from_slice(&[at(i, k + 1), at(i + 1, k + 1), at(i + 1, k)]);
                    }
                }
            }
        }

        let line_indices = edge_list(&indices);
        tracing::debug!(
            vertices = positions.len(),
            triangles = indices.len() / 3,
            lines = line_indices.len() / 2,
            "icosphere built"
        );

        Self {
            positions,
            normals,
            uvs,
            indices,
            line_indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn line_indices(&self) -> &[u32] {
        &self.line_indices
    }

    /// Vertex attributes in the form the displacement stage consumes.
    pub fn vertex(&self, index: usize) -> Option<VertexInput> {
        Some(VertexInput {
            position: *self.positions.get(index)?,
            normal: *self.normals.get(index)?,
            uv: *self.uvs.get(index)?,
        })
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexInput> + '_ {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((&position, &normal), &uv)| VertexInput {
                position,
                normal,
                uv,
            })
    }

    /// Index of the vertex with the largest `y`, i.e. the north pole.
    pub fn north_pole(&self) -> Option<usize> {
        self.positions
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.y.total_cmp(&b.y))
            .map(|(i, _)| i)
    }
}

/// Unique undirected edges of a triangle list, as line-list index pairs.
fn edge_list(indices: &[u32]) -> Vec<u32> {
    let mut seen = HashSet::with_capacity(indices.len());
    let mut lines = Vec::with_capacity(indices.len() * 2);
    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            if seen.insert((a.min(b), a.max(b))) {
                lines.push(a);
                lines.push(b);
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_zero_is_icosahedron() {
        let g = Geometry::icosphere(1.0, 0);
        assert_eq!(g.triangle_count(), 20);
        assert_eq!(g.vertex_count(), 60);
        // 3 edges per face, none shared since faces do not share vertices.
        assert_eq!(g.line_indices().len(), 20 * 3 * 2);
    }

    #[test]
    fn triangle_count_scales_with_detail() {
        let g = Geometry::icosphere(1.0, 3);
        assert_eq!(g.triangle_count(), 20 * 16);
        assert_eq!(g.vertex_count(), 20 * 15);
    }

    #[test]
    fn vertices_lie_on_sphere_with_outward_normals() {
        let g = Geometry::icosphere(2.0, 4);
        for v in g.vertices() {
            assert!((v.position.length() - 2.0).abs() < 1e-5);
            assert!((v.normal.length() - 1.0).abs() < 1e-5);
            assert!(v.position.normalize().dot(v.normal) > 0.9999);
        }
    }

    #[test]
    fn indices_are_in_range() {
        let g = Geometry::icosphere(1.0, 2);
        let count = g.vertex_count() as u32;
        assert!(g.indices().iter().all(|&i| i < count));
        assert!(g.line_indices().iter().all(|&i| i < count));
    }

    #[test]
    fn interior_edges_are_deduplicated() {
        let g = Geometry::icosphere(1.0, 1);
        // Per face with cols = 2: 3 * cols * (cols + 1) / 2 = 9 unique edges.
        assert_eq!(g.line_indices().len() / 2, 20 * 9);
    }

    #[test]
    fn uv_v_runs_pole_to_pole() {
        assert!((sphere_uv(Vec3::Y).y - 1.0).abs() < 1e-6);
        assert!(sphere_uv(Vec3::NEG_Y).y.abs() < 1e-6);
        assert!((sphere_uv(Vec3::X).y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn north_pole_is_found() {
        // With detail 1 the midpoint of the top edge lands exactly on +Y.
        let g = Geometry::icosphere(1.0, 1);
        let pole = g.north_pole().unwrap();
        let v = g.vertex(pole).unwrap();
        assert!((v.normal - Vec3::Y).length() < 1e-6);
    }
}
