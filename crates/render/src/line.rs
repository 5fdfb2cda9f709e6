//! Line geometry with per-range material groups.

use glam::Vec3;
use soundstage_core::Color;

/// Vertex uploaded for line rendering.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    /// Object-space position.
    pub position: [f32; 3],
}

impl LineVertex {
    /// Vertex at the local origin.
    pub const ORIGIN: Self = Self {
        position: [0.0, 0.0, 0.0],
    };

    /// Build a vertex from a `Vec3`.
    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
        }
    }
}

/// A contiguous vertex range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawGroup {
    /// First vertex of the range.
    pub start: usize,
    /// Number of vertices in the range.
    pub count: usize,
    /// Index into the owning object's material list.
    pub material_index: usize,
}

/// Flat-colour material for line primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMaterial {
    /// Line colour.
    pub color: Color,
    /// Whether groups using this material are drawn.
    pub visible: bool,
    disposed: bool,
}

impl LineMaterial {
    /// Visible material with the given colour.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            visible: true,
            disposed: false,
        }
    }

    /// Release the material.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// Whether [`LineMaterial::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Fixed-size vertex buffer plus its draw groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineGeometry {
    vertices: Vec<LineVertex>,
    groups: Vec<DrawGroup>,
    disposed: bool,
}

impl LineGeometry {
    /// Allocate `vertex_count` vertices, all at the origin.
    pub fn with_vertex_count(vertex_count: usize) -> Self {
        Self {
            vertices: vec![LineVertex::ORIGIN; vertex_count],
            groups: Vec::new(),
            disposed: false,
        }
    }

    /// Number of vertices in the buffer.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Vertex slice.
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    /// Flat `[x, y, z, x, y, z, ...]` view of the buffer.
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Draw groups in insertion order.
    pub fn groups(&self) -> &[DrawGroup] {
        &self.groups
    }

    /// Write vertex `index`. Out-of-range writes are ignored.
    pub fn set_xyz(&mut self, index: usize, position: Vec3) {
        if let Some(vertex) = self.vertices.get_mut(index) {
            *vertex = LineVertex::new(position);
        }
    }

    /// Reset every vertex to the origin.
    pub fn reset_positions(&mut self) {
        self.vertices.fill(LineVertex::ORIGIN);
    }

    /// Drop all groups.
    pub fn clear_groups(&mut self) {
        self.groups.clear();
    }

    /// Append a group.
    pub fn add_group(&mut self, start: usize, count: usize, material_index: usize) {
        self.groups.push(DrawGroup {
            start,
            count,
            material_index,
        });
    }

    /// Release the buffer.
    pub fn dispose(&mut self) {
        self.vertices = Vec::new();
        self.groups.clear();
        self.disposed = true;
    }

    /// Whether [`LineGeometry::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_flattened() {
        let mut geometry = LineGeometry::with_vertex_count(2);
        geometry.set_xyz(1, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(geometry.positions(), &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(geometry.as_bytes().len(), 24);
    }

    #[test]
    fn out_of_range_write_is_ignored() {
        let mut geometry = LineGeometry::with_vertex_count(1);
        geometry.set_xyz(5, Vec3::ONE);
        assert_eq!(geometry.vertices(), &[LineVertex::ORIGIN]);
    }

    #[test]
    fn dispose_releases_buffer() {
        let mut geometry = LineGeometry::with_vertex_count(4);
        geometry.add_group(0, 4, 0);
        geometry.dispose();
        assert!(geometry.is_disposed());
        assert_eq!(geometry.vertex_count(), 0);
        assert!(geometry.groups().is_empty());
    }
}
