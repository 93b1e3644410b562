use std::fmt;

use glam::Vec3;

use crate::attributes::{
    builtin_type, AttributeDomain, AttributeError, AttributeInfo, AttributeRef, AttributeStorage,
    GeometryAttributes, CREASE, MATERIAL_INDEX, NORMAL, POSITION, SHADE_SMOOTH, UV,
};

/// Incidence lists for one vertex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vertex {
    pub edges: Vec<u32>,
    pub faces: Vec<u32>,
    pub face_corners: Vec<u32>,
}

/// Undirected edge with two face slots. `face_a` is the face whose winding
/// walks `vert_a -> vert_b`, `face_b` the one walking back. An empty slot is an
/// open side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub vert_a: u32,
    pub vert_b: u32,
    pub face_a: Option<u32>,
    pub face_b: Option<u32>,
}

impl Edge {
    pub fn new(vert_a: u32, vert_b: u32) -> Self {
        Self {
            vert_a,
            vert_b,
            face_a: None,
            face_b: None,
        }
    }

    pub fn face_count(&self) -> usize {
        usize::from(self.face_a.is_some()) + usize::from(self.face_b.is_some())
    }

    /// Exactly one owning face.
    pub fn is_boundary(&self) -> bool {
        self.face_count() == 1
    }

    pub fn has_face(&self, face: u32) -> bool {
        self.face_a == Some(face) || self.face_b == Some(face)
    }

    pub fn other_face(&self, face: u32) -> Option<u32> {
        if self.face_a == Some(face) {
            self.face_b
        } else if self.face_b == Some(face) {
            self.face_a
        } else {
            None
        }
    }

    pub fn connects(&self, a: u32, b: u32) -> bool {
        (self.vert_a == a && self.vert_b == b) || (self.vert_a == b && self.vert_b == a)
    }
}

/// Triangle. Edge `edge_a` runs `vert_a -> vert_b`, `edge_b` runs
/// `vert_b -> vert_c` and `edge_c` closes back to `vert_a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vert_a: u32,
    pub vert_b: u32,
    pub vert_c: u32,
    pub face_corner_a: u32,
    pub face_corner_b: u32,
    pub face_corner_c: u32,
    pub edge_a: u32,
    pub edge_b: u32,
    pub edge_c: u32,
}

impl Face {
    pub fn verts(&self) -> [u32; 3] {
        [self.vert_a, self.vert_b, self.vert_c]
    }

    pub fn face_corners(&self) -> [u32; 3] {
        [self.face_corner_a, self.face_corner_b, self.face_corner_c]
    }

    pub fn edges(&self) -> [u32; 3] {
        [self.edge_a, self.edge_b, self.edge_c]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub face: u32,
    pub vert: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    IndexOutOfRange {
        element: &'static str,
        index: usize,
        referenced: u32,
    },
    EdgeMissingFace {
        face: usize,
        edge: u32,
    },
    EdgeVerticesMismatch {
        face: usize,
        edge: u32,
    },
    CornerMismatch {
        face: usize,
        corner: u32,
    },
    MissingIncidence {
        vertex: u32,
        element: &'static str,
        index: usize,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::IndexOutOfRange {
                element,
                index,
                referenced,
            } => write!(f, "{element} {index} references out of range index {referenced}"),
            TopologyError::EdgeMissingFace { face, edge } => {
                write!(f, "edge {edge} does not list face {face} in a face slot")
            }
            TopologyError::EdgeVerticesMismatch { face, edge } => {
                write!(f, "edge {edge} does not join the vertices face {face} expects")
            }
            TopologyError::CornerMismatch { face, corner } => {
                write!(f, "face corner {corner} does not point back at face {face}")
            }
            TopologyError::MissingIncidence {
                vertex,
                element,
                index,
            } => write!(f, "vertex {vertex} does not list {element} {index}"),
        }
    }
}

impl std::error::Error for TopologyError {}

/// Triangle mesh with explicit edges, face corners and per-domain attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    face_corners: Vec<FaceCorner>,
    attributes: GeometryAttributes,
    submesh_count: usize,
}

impl GeometryData {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assembles a mesh from finished element lists. The vertex `position`
    /// channel is always present and sized to `vertices`.
    pub(crate) fn from_elements(
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
        faces: Vec<Face>,
        face_corners: Vec<FaceCorner>,
        positions: Vec<[f32; 3]>,
        submesh_count: usize,
    ) -> Self {
        debug_assert_eq!(vertices.len(), positions.len());
        let mut attributes = GeometryAttributes::default();
        attributes
            .map_mut(AttributeDomain::Vertex)
            .insert(POSITION.to_string(), AttributeStorage::Vec3(positions));
        Self {
            vertices,
            edges,
            faces,
            face_corners,
            attributes,
            submesh_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_corners(&self) -> &[FaceCorner] {
        &self.face_corners
    }

    pub fn submesh_count(&self) -> usize {
        self.submesh_count
    }

    pub fn attributes(&self) -> &GeometryAttributes {
        &self.attributes
    }

    pub fn attribute_domain_len(&self, domain: AttributeDomain) -> usize {
        match domain {
            AttributeDomain::Vertex => self.vertices.len(),
            AttributeDomain::Edge => self.edges.len(),
            AttributeDomain::Face => self.faces.len(),
            AttributeDomain::FaceCorner => self.face_corners.len(),
        }
    }

    pub fn list_attributes(&self) -> Vec<AttributeInfo> {
        let mut list = Vec::new();
        for domain in AttributeDomain::ALL {
            for (name, storage) in self.attributes.map(domain) {
                list.push(AttributeInfo {
                    name: name.clone(),
                    domain,
                    data_type: storage.data_type(),
                    len: storage.len(),
                });
            }
        }
        list.sort_by(|a, b| {
            (a.domain as u8, a.name.as_str()).cmp(&(b.domain as u8, b.name.as_str()))
        });
        list
    }

    pub fn attribute(&self, domain: AttributeDomain, name: &str) -> Option<AttributeRef<'_>> {
        self.attributes.get(domain, name).map(AttributeStorage::as_ref)
    }

    /// Stores a channel after checking it against the domain length and, for
    /// built-in names, the fixed channel type.
    pub fn set_attribute(
        &mut self,
        domain: AttributeDomain,
        name: impl Into<String>,
        storage: AttributeStorage,
    ) -> Result<(), AttributeError> {
        let name = name.into();
        let expected = self.attribute_domain_len(domain);
        if storage.len() != expected {
            return Err(AttributeError::InvalidLength {
                expected,
                actual: storage.len(),
            });
        }
        if let Some(expected) = builtin_type(domain, &name) {
            if storage.data_type() != expected {
                return Err(AttributeError::InvalidType {
                    expected,
                    actual: storage.data_type(),
                });
            }
        }
        self.attributes.map_mut(domain).insert(name, storage);
        Ok(())
    }

    pub fn remove_attribute(
        &mut self,
        domain: AttributeDomain,
        name: &str,
    ) -> Option<AttributeStorage> {
        if domain == AttributeDomain::Vertex && name == POSITION {
            return None;
        }
        self.attributes.remove(domain, name)
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        match self.attribute(AttributeDomain::Vertex, POSITION) {
            Some(AttributeRef::Vec3(values)) => values,
            _ => &[],
        }
    }

    pub fn position(&self, vertex: u32) -> Vec3 {
        Vec3::from(self.positions()[vertex as usize])
    }

    pub fn face_normals(&self) -> Option<&[[f32; 3]]> {
        match self.attribute(AttributeDomain::Face, NORMAL) {
            Some(AttributeRef::Vec3(values)) => Some(values),
            _ => None,
        }
    }

    pub fn uvs(&self) -> Option<&[[f32; 2]]> {
        match self.attribute(AttributeDomain::FaceCorner, UV) {
            Some(AttributeRef::Vec2(values)) => Some(values),
            _ => None,
        }
    }

    pub fn material_indices(&self) -> Option<&[i32]> {
        match self.attribute(AttributeDomain::Face, MATERIAL_INDEX) {
            Some(AttributeRef::Int(values)) => Some(values),
            _ => None,
        }
    }

    pub fn shade_smooth(&self) -> Option<&[bool]> {
        match self.attribute(AttributeDomain::Face, SHADE_SMOOTH) {
            Some(AttributeRef::Bool(values)) => Some(values),
            _ => None,
        }
    }

    pub fn creases(&self) -> Option<&[f32]> {
        match self.attribute(AttributeDomain::Edge, CREASE) {
            Some(AttributeRef::Float(values)) => Some(values),
            _ => None,
        }
    }

    /// Edges owned by exactly one face.
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|edge| edge.is_boundary()).count()
    }

    /// Empty face slots over every edge that bounds at least one face.
    pub fn open_face_slot_count(&self) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.face_count() > 0)
            .map(|edge| 2 - edge.face_count())
            .sum()
    }

    pub fn is_closed_manifold(&self) -> bool {
        !self.faces.is_empty() && self.edges.iter().all(|edge| edge.face_count() == 2)
    }

    /// Checks every cross reference between faces, edges, corners and
    /// vertices.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let vertex_count = self.vertices.len();
        let check = |element: &'static str, index: usize, referenced: u32, len: usize| {
            if referenced as usize >= len {
                Err(TopologyError::IndexOutOfRange {
                    element,
                    index,
                    referenced,
                })
            } else {
                Ok(())
            }
        };

        for (index, edge) in self.edges.iter().enumerate() {
            check("edge", index, edge.vert_a, vertex_count)?;
            check("edge", index, edge.vert_b, vertex_count)?;
            for face in [edge.face_a, edge.face_b].into_iter().flatten() {
                check("edge", index, face, self.faces.len())?;
            }
            for vertex in [edge.vert_a, edge.vert_b] {
                if !self.vertices[vertex as usize].edges.contains(&(index as u32)) {
                    return Err(TopologyError::MissingIncidence {
                        vertex,
                        element: "edge",
                        index,
                    });
                }
            }
        }

        for (index, face) in self.faces.iter().enumerate() {
            let verts = face.verts();
            for vertex in verts {
                check("face", index, vertex, vertex_count)?;
                if !self.vertices[vertex as usize].faces.contains(&(index as u32)) {
                    return Err(TopologyError::MissingIncidence {
                        vertex,
                        element: "face",
                        index,
                    });
                }
            }
            for (slot, edge_index) in face.edges().into_iter().enumerate() {
                check("face", index, edge_index, self.edges.len())?;
                let edge = &self.edges[edge_index as usize];
                if !edge.has_face(index as u32) {
                    return Err(TopologyError::EdgeMissingFace {
                        face: index,
                        edge: edge_index,
                    });
                }
                if !edge.connects(verts[slot], verts[(slot + 1) % 3]) {
                    return Err(TopologyError::EdgeVerticesMismatch {
                        face: index,
                        edge: edge_index,
                    });
                }
            }
            for (slot, corner_index) in face.face_corners().into_iter().enumerate() {
                check("face", index, corner_index, self.face_corners.len())?;
                let corner = &self.face_corners[corner_index as usize];
                if corner.face as usize != index || corner.vert != verts[slot] {
                    return Err(TopologyError::CornerMismatch {
                        face: index,
                        corner: corner_index,
                    });
                }
            }
        }

        for (index, corner) in self.face_corners.iter().enumerate() {
            check("face corner", index, corner.vert, vertex_count)?;
            if !self.vertices[corner.vert as usize]
                .face_corners
                .contains(&(index as u32))
            {
                return Err(TopologyError::MissingIncidence {
                    vertex: corner.vert,
                    element: "face corner",
                    index,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeType;

    fn single_triangle() -> GeometryData {
        let mut vertices = vec![Vertex::default(); 3];
        for (idx, vertex) in vertices.iter_mut().enumerate() {
            vertex.faces.push(0);
            vertex.face_corners.push(idx as u32);
        }
        let mut edges = vec![Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 0)];
        for (idx, edge) in edges.iter_mut().enumerate() {
            edge.face_a = Some(0);
            vertices[edge.vert_a as usize].edges.push(idx as u32);
            vertices[edge.vert_b as usize].edges.push(idx as u32);
        }
        let faces = vec![Face {
            vert_a: 0,
            vert_b: 1,
            vert_c: 2,
            face_corner_a: 0,
            face_corner_b: 1,
            face_corner_c: 2,
            edge_a: 0,
            edge_b: 1,
            edge_c: 2,
        }];
        let face_corners = (0..3).map(|vert| FaceCorner { face: 0, vert }).collect();
        GeometryData::from_elements(
            vertices,
            edges,
            faces,
            face_corners,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            1,
        )
    }

    #[test]
    fn empty_sentinel_has_nothing() {
        let geometry = GeometryData::empty();
        assert!(geometry.is_empty());
        assert!(geometry.positions().is_empty());
        assert_eq!(geometry.submesh_count(), 0);
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn triangle_is_valid_with_open_boundary() {
        let geometry = single_triangle();
        assert!(geometry.validate().is_ok());
        assert_eq!(geometry.boundary_edge_count(), 3);
        assert_eq!(geometry.open_face_slot_count(), 3);
        assert!(!geometry.is_closed_manifold());
        assert_eq!(geometry.position(1), Vec3::X);
    }

    #[test]
    fn set_attribute_checks_length_and_builtin_type() {
        let mut geometry = single_triangle();
        let short = geometry.set_attribute(
            AttributeDomain::FaceCorner,
            UV,
            AttributeStorage::Vec2(vec![[0.0, 0.0]; 2]),
        );
        assert_eq!(
            short,
            Err(AttributeError::InvalidLength {
                expected: 3,
                actual: 2
            })
        );

        let wrong_type = geometry.set_attribute(
            AttributeDomain::Face,
            MATERIAL_INDEX,
            AttributeStorage::Float(vec![0.0]),
        );
        assert_eq!(
            wrong_type,
            Err(AttributeError::InvalidType {
                expected: AttributeType::Int,
                actual: AttributeType::Float
            })
        );

        geometry
            .set_attribute(AttributeDomain::Face, MATERIAL_INDEX, AttributeStorage::Int(vec![1]))
            .expect("material");
        assert_eq!(geometry.material_indices(), Some(&[1][..]));
        geometry
            .set_attribute(AttributeDomain::Vertex, "weight", AttributeStorage::Float(vec![0.5; 3]))
            .expect("custom");
        let names: Vec<_> = geometry
            .list_attributes()
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(names, vec!["position", "weight", "material_index"]);
    }

    #[test]
    fn position_channel_cannot_be_removed() {
        let mut geometry = single_triangle();
        assert!(geometry.remove_attribute(AttributeDomain::Vertex, POSITION).is_none());
        assert_eq!(geometry.positions().len(), 3);
    }

    #[test]
    fn validate_reports_missing_face_slot() {
        let mut geometry = single_triangle();
        geometry.edges[1].face_a = None;
        assert_eq!(
            geometry.validate(),
            Err(TopologyError::EdgeMissingFace { face: 0, edge: 1 })
        );
    }

    #[test]
    fn edge_slot_helpers() {
        let mut edge = Edge::new(3, 4);
        assert_eq!(edge.face_count(), 0);
        edge.face_a = Some(2);
        edge.face_b = Some(7);
        assert_eq!(edge.other_face(2), Some(7));
        assert_eq!(edge.other_face(7), Some(2));
        assert_eq!(edge.other_face(1), None);
        assert!(edge.connects(4, 3));
        assert!(!edge.is_boundary());
    }
}
