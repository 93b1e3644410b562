use glam::Vec3;

use crate::geometry::GeometryData;

/// Flat render buffers with one output vertex per face corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Triangle index lists, one per submesh, selected by `material_index`.
    pub submeshes: Vec<Vec<u32>>,
}

impl ExportMesh {
    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let faces = geometry.faces();
        if faces.is_empty() {
            return Self::default();
        }

        let positions = geometry.positions();
        let face_normals = geometry
            .face_normals()
            .map(<[_]>::to_vec)
            .unwrap_or_else(|| fallback_face_normals(geometry));
        let smooth = geometry.shade_smooth();
        let materials = geometry.material_indices();
        let uvs = geometry.uvs();
        let is_smooth = |face: usize| smooth.is_some_and(|values| values[face]);

        let submesh_count = geometry.submesh_count().max(1);
        let mut out = Self {
            positions: Vec::with_capacity(faces.len() * 3),
            normals: Vec::with_capacity(faces.len() * 3),
            uvs: Vec::with_capacity(faces.len() * 3),
            submeshes: vec![Vec::new(); submesh_count],
        };

        for (face_index, face) in faces.iter().enumerate() {
            let flat = face_normals[face_index];
            let base = out.positions.len() as u32;
            for (vert, corner) in face.verts().into_iter().zip(face.face_corners()) {
                let normal = if is_smooth(face_index) {
                    // Average over the smooth faces around this vertex.
                    geometry.vertices()[vert as usize]
                        .faces
                        .iter()
                        .filter(|&&other| is_smooth(other as usize))
                        .map(|&other| Vec3::from(face_normals[other as usize]))
                        .sum::<Vec3>()
                        .try_normalize()
                        .map(|normal| normal.to_array())
                        .unwrap_or(flat)
                } else {
                    flat
                };
                out.positions.push(positions[vert as usize]);
                out.normals.push(normal);
                out.uvs
                    .push(uvs.map_or([0.0, 0.0], |values| values[corner as usize]));
            }

            let submesh = materials
                .map(|values| values[face_index])
                .unwrap_or(0)
                .clamp(0, submesh_count as i32 - 1) as usize;
            out.submeshes[submesh].extend([base, base + 1, base + 2]);
        }
        out
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|indices| indices.len() / 3).sum()
    }
}

fn fallback_face_normals(geometry: &GeometryData) -> Vec<[f32; 3]> {
    geometry
        .faces()
        .iter()
        .map(|face| {
            let [a, b, c] = face.verts().map(|v| geometry.position(v));
            (b - a)
                .cross(c - a)
                .try_normalize()
                .unwrap_or(Vec3::Y)
                .to_array()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve_primitives::{circle, line};
    use crate::curve_to_geometry::{with_profile, without_profile, CurveToGeometrySettings};

    fn tube(settings: CurveToGeometrySettings) -> GeometryData {
        with_profile(
            &line(1, Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)),
            &circle(8, 1.0),
            &settings,
        )
    }

    #[test]
    fn splits_every_corner() {
        let geometry = tube(CurveToGeometrySettings::default());
        let mesh = ExportMesh::from_geometry(&geometry);
        assert_eq!(mesh.vertex_count(), geometry.faces().len() * 3);
        assert_eq!(mesh.uvs.len(), mesh.vertex_count());
        assert_eq!(mesh.submeshes.len(), 1);
        assert_eq!(mesh.triangle_count(), geometry.faces().len());
    }

    #[test]
    fn caps_land_in_second_submesh() {
        let geometry = tube(CurveToGeometrySettings {
            close_caps: true,
            separate_material_for_caps: true,
            ..Default::default()
        });
        let mesh = ExportMesh::from_geometry(&geometry);
        assert_eq!(mesh.submeshes.len(), 2);
        assert_eq!(mesh.submeshes[0].len() / 3, 16);
        assert_eq!(mesh.submeshes[1].len() / 3, 12);
    }

    #[test]
    fn flat_faces_keep_face_normals() {
        let geometry = tube(CurveToGeometrySettings::default());
        let mesh = ExportMesh::from_geometry(&geometry);
        let face_normals = geometry.face_normals().expect("normals");
        for (corner, normal) in mesh.normals.iter().enumerate() {
            assert_eq!(*normal, face_normals[corner / 3]);
        }
    }

    #[test]
    fn smooth_faces_average_around_vertices() {
        let geometry = tube(CurveToGeometrySettings {
            shade_smooth_curve: true,
            ..Default::default()
        });
        let mesh = ExportMesh::from_geometry(&geometry);
        for (position, normal) in mesh.positions.iter().zip(&mesh.normals) {
            let radial = Vec3::new(position[0], position[1], 0.0).normalize();
            assert!(Vec3::from(*normal).dot(radial) > 0.9);
        }
    }

    #[test]
    fn wireframe_exports_nothing() {
        let mesh = ExportMesh::from_geometry(&without_profile(&circle(6, 1.0)));
        assert_eq!(mesh, ExportMesh::default());
    }
}
