use std::collections::HashMap;
use std::fmt;

pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const TANGENT: &str = "tangent";
pub const BINORMAL: &str = "binormal";
pub const UV: &str = "uv";
pub const MATERIAL_INDEX: &str = "material_index";
pub const SHADE_SMOOTH: &str = "shade_smooth";
pub const CREASE: &str = "crease";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeDomain {
    Vertex,
    Edge,
    Face,
    FaceCorner,
}

impl AttributeDomain {
    pub const ALL: [AttributeDomain; 4] = [
        AttributeDomain::Vertex,
        AttributeDomain::Edge,
        AttributeDomain::Face,
        AttributeDomain::FaceCorner,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeStorage {
    Bool(Vec<bool>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Vec2(Vec<[f32; 2]>),
    Vec3(Vec<[f32; 3]>),
}

impl AttributeStorage {
    pub fn len(&self) -> usize {
        match self {
            AttributeStorage::Bool(values) => values.len(),
            AttributeStorage::Int(values) => values.len(),
            AttributeStorage::Float(values) => values.len(),
            AttributeStorage::Vec2(values) => values.len(),
            AttributeStorage::Vec3(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> AttributeType {
        match self {
            AttributeStorage::Bool(_) => AttributeType::Bool,
            AttributeStorage::Int(_) => AttributeType::Int,
            AttributeStorage::Float(_) => AttributeType::Float,
            AttributeStorage::Vec2(_) => AttributeType::Vec2,
            AttributeStorage::Vec3(_) => AttributeType::Vec3,
        }
    }

    pub fn as_ref(&self) -> AttributeRef<'_> {
        match self {
            AttributeStorage::Bool(values) => AttributeRef::Bool(values.as_slice()),
            AttributeStorage::Int(values) => AttributeRef::Int(values.as_slice()),
            AttributeStorage::Float(values) => AttributeRef::Float(values.as_slice()),
            AttributeStorage::Vec2(values) => AttributeRef::Vec2(values.as_slice()),
            AttributeStorage::Vec3(values) => AttributeRef::Vec3(values.as_slice()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeError {
    InvalidLength {
        expected: usize,
        actual: usize,
    },
    InvalidType {
        expected: AttributeType,
        actual: AttributeType,
    },
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeError::InvalidLength { expected, actual } => {
                write!(f, "attribute has {actual} values, domain expects {expected}")
            }
            AttributeError::InvalidType { expected, actual } => {
                write!(f, "attribute type {actual:?} does not match built-in type {expected:?}")
            }
        }
    }
}

impl std::error::Error for AttributeError {}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    pub name: String,
    pub domain: AttributeDomain,
    pub data_type: AttributeType,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeRef<'a> {
    Bool(&'a [bool]),
    Int(&'a [i32]),
    Float(&'a [f32]),
    Vec2(&'a [[f32; 2]]),
    Vec3(&'a [[f32; 3]]),
}

impl<'a> AttributeRef<'a> {
    pub fn len(&self) -> usize {
        match self {
            AttributeRef::Bool(values) => values.len(),
            AttributeRef::Int(values) => values.len(),
            AttributeRef::Float(values) => values.len(),
            AttributeRef::Vec2(values) => values.len(),
            AttributeRef::Vec3(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> AttributeType {
        match self {
            AttributeRef::Bool(_) => AttributeType::Bool,
            AttributeRef::Int(_) => AttributeType::Int,
            AttributeRef::Float(_) => AttributeType::Float,
            AttributeRef::Vec2(_) => AttributeType::Vec2,
            AttributeRef::Vec3(_) => AttributeType::Vec3,
        }
    }
}

/// Built-in channels and the type each one must carry.
pub fn builtin_type(domain: AttributeDomain, name: &str) -> Option<AttributeType> {
    match (domain, name) {
        (AttributeDomain::Vertex, POSITION) => Some(AttributeType::Vec3),
        (AttributeDomain::Face, NORMAL) => Some(AttributeType::Vec3),
        (AttributeDomain::Face, MATERIAL_INDEX) => Some(AttributeType::Int),
        (AttributeDomain::Face, SHADE_SMOOTH) => Some(AttributeType::Bool),
        (AttributeDomain::Edge, CREASE) => Some(AttributeType::Float),
        (AttributeDomain::FaceCorner, UV) => Some(AttributeType::Vec2),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryAttributes {
    vertex: HashMap<String, AttributeStorage>,
    edge: HashMap<String, AttributeStorage>,
    face: HashMap<String, AttributeStorage>,
    face_corner: HashMap<String, AttributeStorage>,
}

impl GeometryAttributes {
    pub fn map(&self, domain: AttributeDomain) -> &HashMap<String, AttributeStorage> {
        match domain {
            AttributeDomain::Vertex => &self.vertex,
            AttributeDomain::Edge => &self.edge,
            AttributeDomain::Face => &self.face,
            AttributeDomain::FaceCorner => &self.face_corner,
        }
    }

    pub fn map_mut(&mut self, domain: AttributeDomain) -> &mut HashMap<String, AttributeStorage> {
        match domain {
            AttributeDomain::Vertex => &mut self.vertex,
            AttributeDomain::Edge => &mut self.edge,
            AttributeDomain::Face => &mut self.face,
            AttributeDomain::FaceCorner => &mut self.face_corner,
        }
    }

    pub fn get(&self, domain: AttributeDomain, name: &str) -> Option<&AttributeStorage> {
        self.map(domain).get(name)
    }

    pub fn contains(&self, domain: AttributeDomain, name: &str) -> bool {
        self.map(domain).contains_key(name)
    }

    pub fn remove(&mut self, domain: AttributeDomain, name: &str) -> Option<AttributeStorage> {
        self.map_mut(domain).remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_reports_type_and_len() {
        let storage = AttributeStorage::Vec2(vec![[0.0, 1.0], [1.0, 0.0]]);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.data_type(), AttributeType::Vec2);
        assert_eq!(storage.as_ref().data_type(), AttributeType::Vec2);
    }

    #[test]
    fn domains_are_kept_apart() {
        let mut attributes = GeometryAttributes::default();
        attributes
            .map_mut(AttributeDomain::Vertex)
            .insert(NORMAL.to_string(), AttributeStorage::Vec3(vec![[0.0, 1.0, 0.0]]));
        assert!(attributes.contains(AttributeDomain::Vertex, NORMAL));
        assert!(!attributes.contains(AttributeDomain::Face, NORMAL));
        assert!(attributes.remove(AttributeDomain::Vertex, NORMAL).is_some());
        assert!(attributes.map(AttributeDomain::Vertex).is_empty());
    }

    #[test]
    fn builtin_channels_have_fixed_types() {
        assert_eq!(builtin_type(AttributeDomain::FaceCorner, UV), Some(AttributeType::Vec2));
        assert_eq!(builtin_type(AttributeDomain::Face, SHADE_SMOOTH), Some(AttributeType::Bool));
        assert_eq!(builtin_type(AttributeDomain::Vertex, TANGENT), None);
    }
}
