//! Subdivided plane mesh that the depth material displaces.

/// Interleaved vertex layout uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Plane in the XY plane facing +Z, centered on the origin.
///
/// Vertices are laid out row by row from the top edge (y = +height/2) to
/// the bottom edge, left to right. `uv` uses the texture convention where
/// v = 0 is the top row of the image.
#[derive(Debug, Clone)]
pub struct PlaneGeometry {
    pub vertices: Vec<Vertex>,
    /// Triangle list
    pub indices: Vec<u32>,
    /// Line list over the triangle edges, each edge once
    pub wire_indices: Vec<u32>,
}

impl PlaneGeometry {
    /// 5x5 world units, 256x256 segments
    pub const WIDTH: f32 = 5.0;
    pub const HEIGHT: f32 = 5.0;
    pub const SEGMENTS: u32 = 256;

    pub fn standard() -> Self {
        Self::new(Self::WIDTH, Self::HEIGHT, Self::SEGMENTS, Self::SEGMENTS)
    }

    pub fn new(width: f32, height: f32, segments_x: u32, segments_y: u32) -> Self {
        let gx = segments_x.max(1);
        let gy = segments_y.max(1);
        let row = gx + 1;

        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let seg_w = width / gx as f32;
        let seg_h = height / gy as f32;

        let mut vertices = Vec::with_capacity((row * (gy + 1)) as usize);
        for iy in 0..=gy {
            let y = half_h - iy as f32 * seg_h;
            for ix in 0..=gx {
                let x = ix as f32 * seg_w - half_w;
                vertices.push(Vertex {
                    position: [x, y, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [ix as f32 / gx as f32, iy as f32 / gy as f32],
                });
            }
        }

        // a-d
        // | \|
        // b-c
        let mut indices = Vec::with_capacity((gx * gy * 6) as usize);
        let mut wire_indices = Vec::with_capacity(((gx * (gy + 1)) + (gy * (gx + 1)) + gx * gy) as usize * 2);
        for iy in 0..gy {
            for ix in 0..gx {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = (ix + 1) + row * (iy + 1);
                let d = (ix + 1) + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
                // top + left edge of each cell, plus the shared diagonal
                wire_indices.extend_from_slice(&[a, d, a, b, b, d]);
            }
        }
        // closing bottom row and right column
        for ix in 0..gx {
            wire_indices.extend_from_slice(&[ix + row * gy, ix + 1 + row * gy]);
        }
        for iy in 0..gy {
            wire_indices.extend_from_slice(&[gx + row * iy, gx + row * (iy + 1)]);
        }

        Self {
            vertices,
            indices,
            wire_indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_plane_counts() {
        let plane = PlaneGeometry::standard();
        assert_eq!(plane.vertices.len(), 257 * 257);
        assert_eq!(plane.indices.len(), 256 * 256 * 6);
        let edges = 256 * 257 * 2 + 256 * 256;
        assert_eq!(plane.wire_indices.len(), edges * 2);
    }

    #[test]
    fn corners_and_uvs() {
        let plane = PlaneGeometry::new(5.0, 5.0, 4, 4);
        let first = plane.vertices[0];
        let last = *plane.vertices.last().unwrap();
        assert_eq!(first.position, [-2.5, 2.5, 0.0]);
        assert_eq!(first.uv, [0.0, 0.0]);
        assert_eq!(last.position, [2.5, -2.5, 0.0]);
        assert_eq!(last.uv, [1.0, 1.0]);
        assert!(plane.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn triangles_face_the_camera() {
        let plane = PlaneGeometry::new(2.0, 2.0, 3, 2);
        for tri in plane.indices.chunks(3) {
            let p = |i: u32| glam::Vec3::from(plane.vertices[i as usize].position);
            let n = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(n.z > 0.0, "triangle {:?} winds clockwise", tri);
        }
    }

    #[test]
    fn wire_edges_are_unique() {
        let plane = PlaneGeometry::new(1.0, 1.0, 5, 3);
        let mut edges: Vec<(u32, u32)> = plane
            .wire_indices
            .chunks(2)
            .map(|e| (e[0].min(e[1]), e[0].max(e[1])))
            .collect();
        let total = edges.len();
        edges.sort_unstable();
        edges.dedup();
        assert_eq!(edges.len(), total);
    }
}
