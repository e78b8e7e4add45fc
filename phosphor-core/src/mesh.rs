//! CPU-side mesh construction.
//!
//! Meshes are emitted as indexed triangle lists with interleaved
//! position/normal/uv attributes, the layout the GL buffers upload verbatim.

/// Indexed triangle mesh with per-vertex position, normal and UV.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when every index references an existing vertex and all positions
    /// are finite.
    pub fn is_well_formed(&self) -> bool {
        let n = self.positions.len() as u32;
        self.normals.len() == self.positions.len()
            && self.uvs.len() == self.positions.len()
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| i < n)
            && self
                .positions
                .iter()
                .flatten()
                .chain(self.normals.iter().flatten())
                .all(|v| v.is_finite())
    }

    pub(crate) fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        idx
    }

    pub(crate) fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    /// Interleaves attributes as `pos.xyz normal.xyz uv.xy` per vertex.
    pub(crate) fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.positions.len() * 8);
        for i in 0..self.positions.len() {
            out.extend_from_slice(&self.positions[i]);
            out.extend_from_slice(&self.normals[i]);
            out.extend_from_slice(&self.uvs[i]);
        }
        out
    }

    /// Centered XY plane facing +Z, subdivided for smooth displacement.
    ///
    /// UVs run 0..1 with v = 0 at the bottom edge, matching GL texture
    /// orientation.
    pub fn plane(width: f32, height: f32, cols: u32, rows: u32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let mut mesh = Self::default();

        for row in 0..=rows {
            for col in 0..=cols {
                let u = col as f32 / cols as f32;
                let v = row as f32 / rows as f32;
                mesh.push_vertex(
                    [(u - 0.5) * width, (v - 0.5) * height, 0.0],
                    [0.0, 0.0, 1.0],
                    [u, v],
                );
            }
        }

        let stride = cols + 1;
        for row in 0..rows {
            for col in 0..cols {
                let a = row * stride + col;
                let b = a + 1;
                let c = a + stride + 1;
                let d = a + stride;
                mesh.push_quad(a, b, c, d);
            }
        }
        mesh
    }

    /// UV sphere centered at the origin.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut mesh = Self::default();

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for seg in 0..=segments {
                let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
                mesh.push_vertex(
                    [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                    normal,
                    [seg as f32 / segments as f32, ring as f32 / rings as f32],
                );
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + stride;
                mesh.push_quad(a, b, b + 1, a + 1);
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_has_expected_counts() {
        let mesh = MeshData::plane(2.0, 1.0, 4, 3);
        assert_eq!(mesh.vertex_count(), 5 * 4);
        assert_eq!(mesh.triangle_count(), 4 * 3 * 2);
        assert!(mesh.is_well_formed());
    }

    #[test]
    fn plane_spans_the_requested_extent() {
        let mesh = MeshData::plane(2.0, 4.0, 8, 8);
        let xs: Vec<f32> = mesh.positions.iter().map(|p| p[0]).collect();
        let ys: Vec<f32> = mesh.positions.iter().map(|p| p[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::INFINITY, f32::min), -1.0);
        assert_eq!(xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 1.0);
        assert_eq!(ys.iter().cloned().fold(f32::INFINITY, f32::min), -2.0);
        assert_eq!(ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 2.0);
    }

    #[test]
    fn degenerate_subdivision_floors_to_one() {
        let mesh = MeshData::plane(1.0, 1.0, 0, 0);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.is_well_formed());
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let mesh = MeshData::uv_sphere(0.5, 12, 8);
        assert!(mesh.is_well_formed());
        for p in &mesh.positions {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((r - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn interleaved_stride_is_eight_floats() {
        let mesh = MeshData::plane(1.0, 1.0, 1, 1);
        assert_eq!(mesh.interleaved().len(), mesh.vertex_count() * 8);
    }
}
