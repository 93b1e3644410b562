use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::attributes::{
    AttributeDomain, AttributeStorage, CREASE, MATERIAL_INDEX, NORMAL, SHADE_SMOOTH, UV,
};
use crate::geometry::{Edge, Face, FaceCorner, GeometryData, Vertex};

/// Per-face values recorded alongside the triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceData {
    pub uvs: [Vec2; 3],
    pub material_index: i32,
    pub shade_smooth: bool,
}

impl Default for FaceData {
    fn default() -> Self {
        Self {
            uvs: [Vec2::ZERO; 3],
            material_index: 0,
            shade_smooth: false,
        }
    }
}

/// Incremental triangle mesh builder. Edges are shared by vertex pair and
/// their face slots are filled by winding direction, so every face ends up
/// back-referenced by its three edges.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<[f32; 3]>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    face_corners: Vec<FaceCorner>,
    edge_lookup: HashMap<(u32, u32), u32>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    material_indices: Vec<i32>,
    shade_smooth: Vec<bool>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize, faces: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            faces: Vec::with_capacity(faces),
            face_corners: Vec::with_capacity(faces * 3),
            edge_lookup: HashMap::with_capacity(edges),
            normals: Vec::with_capacity(faces),
            uvs: Vec::with_capacity(faces * 3),
            material_indices: Vec::with_capacity(faces),
            shade_smooth: Vec::with_capacity(faces),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn add_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.positions.push(position.to_array());
        self.vertices.push(Vertex::default());
        index
    }

    pub fn position(&self, vertex: u32) -> Vec3 {
        Vec3::from(self.positions[vertex as usize])
    }

    /// Returns the edge joining `a` and `b`, creating it with empty face slots
    /// when it does not exist yet.
    pub fn add_edge(&mut self, a: u32, b: u32) -> u32 {
        debug_assert_ne!(a, b, "edge endpoints must differ");
        if let Some(&index) = self.edge_lookup.get(&edge_key(a, b)) {
            return index;
        }
        let index = self.edges.len() as u32;
        self.edges.push(Edge::new(a, b));
        self.edge_lookup.insert(edge_key(a, b), index);
        self.vertices[a as usize].edges.push(index);
        self.vertices[b as usize].edges.push(index);
        index
    }

    pub fn find_edge(&self, a: u32, b: u32) -> Option<u32> {
        self.edge_lookup.get(&edge_key(a, b)).copied()
    }

    /// Adds triangle `verts`, wound `a -> b -> c`. Panics when one of its
    /// edges already carries a face walking the same direction, since that
    /// edge would bound more than two faces or flip orientation.
    pub fn add_face(&mut self, verts: [u32; 3], data: FaceData) -> u32 {
        let [a, b, c] = verts;
        debug_assert!(a != b && b != c && c != a, "degenerate face {verts:?}");
        let face = self.faces.len() as u32;

        let mut edges = [0u32; 3];
        for (slot, (from, to)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
            let edge_index = self.add_edge(from, to);
            let edge = &mut self.edges[edge_index as usize];
            let owner = if edge.vert_a == from {
                &mut edge.face_a
            } else {
                &mut edge.face_b
            };
            assert!(
                owner.is_none(),
                "edge {from}-{to} already has a face wound in this direction"
            );
            *owner = Some(face);
            edges[slot] = edge_index;
        }

        let first_corner = self.face_corners.len() as u32;
        for (offset, vert) in verts.into_iter().enumerate() {
            let corner = first_corner + offset as u32;
            self.face_corners.push(FaceCorner { face, vert });
            let vertex = &mut self.vertices[vert as usize];
            vertex.faces.push(face);
            vertex.face_corners.push(corner);
        }

        self.faces.push(Face {
            vert_a: a,
            vert_b: b,
            vert_c: c,
            face_corner_a: first_corner,
            face_corner_b: first_corner + 1,
            face_corner_c: first_corner + 2,
            edge_a: edges[0],
            edge_b: edges[1],
            edge_c: edges[2],
        });

        let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
        let normal = (pb - pa).cross(pc - pa).try_normalize().unwrap_or(Vec3::Y);
        self.normals.push(normal.to_array());
        self.uvs.extend(data.uvs.iter().map(|uv| uv.to_array()));
        self.material_indices.push(data.material_index);
        self.shade_smooth.push(data.shade_smooth);
        face
    }

    /// Finishes the mesh. Face channels are written only when faces exist;
    /// every edge gets a zero crease.
    pub fn build(self, submesh_count: usize) -> GeometryData {
        let edge_count = self.edges.len();
        let has_faces = !self.faces.is_empty();
        let mut geometry = GeometryData::from_elements(
            self.vertices,
            self.edges,
            self.faces,
            self.face_corners,
            self.positions,
            submesh_count,
        );

        let mut channels = vec![(
            AttributeDomain::Edge,
            CREASE,
            AttributeStorage::Float(vec![0.0; edge_count]),
        )];
        if has_faces {
            channels.extend([
                (AttributeDomain::Face, NORMAL, AttributeStorage::Vec3(self.normals)),
                (
                    AttributeDomain::Face,
                    MATERIAL_INDEX,
                    AttributeStorage::Int(self.material_indices),
                ),
                (
                    AttributeDomain::Face,
                    SHADE_SMOOTH,
                    AttributeStorage::Bool(self.shade_smooth),
                ),
                (AttributeDomain::FaceCorner, UV, AttributeStorage::Vec2(self.uvs)),
            ]);
        }
        for (domain, name, storage) in channels {
            let result = geometry.set_attribute(domain, name, storage);
            debug_assert!(result.is_ok(), "builder channel {name} rejected: {result:?}");
        }
        geometry
    }
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
