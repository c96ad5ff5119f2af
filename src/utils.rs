use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const STRIDE: i32 = std::mem::size_of::<Vertex>() as i32;
    pub const NORMAL_OFFSET: i32 = std::mem::size_of::<[f32; 3]>() as i32;
}

/// CPU-side triangle mesh, ready for upload
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Unit cube centered on the origin, four vertices per face so normals stay flat.
/// Scale by the mesh size in the model matrix.
pub fn create_box_mesh() -> Mesh {
    // (normal, u axis, v axis) per face; u x v == normal keeps winding counter-clockwise
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut mesh = Mesh::empty();
    for (normal, u, v) in faces {
        let base = mesh.vertices.len() as u16;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let pos = [
                normal[0] * 0.5 + u[0] * su + v[0] * sv,
                normal[1] * 0.5 + u[1] * su + v[1] * sv,
                normal[2] * 0.5 + u[2] * su + v[2] * sv,
            ];
            mesh.vertices.push(Vertex { pos, normal });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_box_mesh_shape() {
        let mesh = create_box_mesh();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert_eq!(mesh.vertex_bytes().len(), 24 * Vertex::STRIDE as usize);
        assert_eq!(mesh.index_bytes().len(), 36 * 2);

        for v in &mesh.vertices {
            let p = Vec3::from(v.pos);
            assert!((p.abs().max_element() - 0.5).abs() < 1e-6, "{p:?} not on the surface");
            // Every vertex sits on the face its normal points out of
            assert!((p.dot(Vec3::from(v.normal)) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_box_winding_is_outward() {
        let mesh = create_box_mesh();
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].pos));
            let face_normal = (b - a).cross(c - a).normalize();
            let normal = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(face_normal.abs_diff_eq(normal, 1e-5), "{face_normal:?} vs {normal:?}");
        }
    }
}
