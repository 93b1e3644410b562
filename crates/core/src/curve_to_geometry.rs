use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::attributes::{AttributeDomain, AttributeStorage, BINORMAL, NORMAL, TANGENT};
use crate::curve::{CurveData, FrameSample};
use crate::geometry::GeometryData;
use crate::mesh_builder::{FaceData, MeshBuilder};
use crate::parallel::for_each_indexed_mut;

/// Profile sizes above this align their ring in parallel.
pub const ALIGN_PARALLEL_THRESHOLD: usize = 8;

const CURVE_FACE_UVS: [[Vec2; 3]; 2] = [
    [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
    [Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapUvType {
    /// Normalised to the cap's own bounds.
    LocalSpace,
    /// Raw projection onto the end frame.
    #[default]
    WorldSpace,
    /// World space shifted so the smallest coordinate sits at zero.
    WorldSpaceAligned,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveToGeometrySettings {
    /// Degrees of roll applied to the ring at the first path sample.
    pub rotation_offset: f32,
    /// Degrees of roll added per path sample.
    pub incremental_rotation_offset: f32,
    pub close_caps: bool,
    pub separate_material_for_caps: bool,
    pub shade_smooth_curve: bool,
    pub shade_smooth_caps: bool,
    pub cap_uv_type: CapUvType,
}

/// Element counts a sweep produces, derived from the inputs alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepTopology {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub close_caps: bool,
}

pub fn caps_enabled(
    path: &CurveData,
    profile: &CurveData,
    settings: &CurveToGeometrySettings,
) -> bool {
    settings.close_caps
        && !path.is_closed()
        && profile.is_closed()
        && profile.curve_type().caps_supported()
        && profile.points() >= 3
}

/// Returns `None` when either curve is too short to sweep.
pub fn sweep_topology(
    path: &CurveData,
    profile: &CurveData,
    settings: &CurveToGeometrySettings,
) -> Option<SweepTopology> {
    if !is_sweepable(path) || !is_sweepable(profile) {
        return None;
    }
    let close_caps = caps_enabled(path, profile, settings);
    let ring = profile.points();
    let rings = path.points();
    let segments = profile.segment_count();
    let steps = path.segment_count();

    let cap_edges = if close_caps { 2 * (ring - 3) } else { 0 };
    let cap_faces = if close_caps { 2 * (ring - 2) } else { 0 };
    Some(SweepTopology {
        vertices: ring * rings,
        edges: segments * rings + (ring + segments) * steps + cap_edges,
        faces: 2 * segments * steps + cap_faces,
        close_caps,
    })
}

fn is_sweepable(curve: &CurveData) -> bool {
    let min = if curve.is_closed() { 3 } else { 2 };
    curve.points() >= min
}

/// One vertex per sample joined by edges, carrying the curve frame as vertex
/// channels. A closed curve also joins its last sample to the first; with two
/// samples that closing edge is the one edge already there.
pub fn without_profile(curve: &CurveData) -> GeometryData {
    if curve.is_empty() {
        return GeometryData::empty();
    }
    let count = curve.points();
    let mut builder = MeshBuilder::with_capacity(count, curve.segment_count(), 0);
    for position in curve.position() {
        builder.add_vertex(*position);
    }
    for i in 0..count.saturating_sub(1) {
        builder.add_edge(i as u32, i as u32 + 1);
    }
    if curve.is_closed() && count > 1 {
        builder.add_edge(count as u32 - 1, 0);
    }

    let mut geometry = builder.build(1);
    for (name, values) in [
        (TANGENT, curve.tangent()),
        (NORMAL, curve.normal()),
        (BINORMAL, curve.binormal()),
    ] {
        let storage = AttributeStorage::Vec3(values.iter().map(|v| v.to_array()).collect());
        if let Err(err) = geometry.set_attribute(AttributeDomain::Vertex, name, storage) {
            warn!(%err, name, "failed to store curve frame channel");
        }
    }
    geometry
}

/// Sweeps `profile` along `path`. Ring `i` is the profile placed in the frame
/// of path sample `i`; consecutive rings are stitched with two triangles per
/// profile segment, closed paths wrap the last ring onto the first, and open
/// paths may close both ends with fan caps.
pub fn with_profile(
    path: &CurveData,
    profile: &CurveData,
    settings: &CurveToGeometrySettings,
) -> GeometryData {
    let Some(topology) = sweep_topology(path, profile, settings) else {
        warn!(
            path_points = path.points(),
            profile_points = profile.points(),
            "sweep inputs too short, returning empty geometry"
        );
        return GeometryData::empty();
    };
    debug!(
        vertices = topology.vertices,
        edges = topology.edges,
        faces = topology.faces,
        close_caps = topology.close_caps,
        "sweeping profile along path"
    );

    let ring_len = profile.points();
    let profile_samples: Vec<FrameSample> = (0..ring_len).map(|i| profile.sample(i)).collect();
    let mut ring = vec![FrameSample::default(); ring_len];
    let mut builder = MeshBuilder::with_capacity(topology.vertices, topology.edges, topology.faces);
    let stitch_face = |uvs: [Vec2; 3]| FaceData {
        uvs,
        material_index: 0,
        shade_smooth: settings.shade_smooth_curve,
    };

    for step in 0..path.points() {
        let roll = settings.rotation_offset + step as f32 * settings.incremental_rotation_offset;
        align_ring(&profile_samples, path.sample(step), roll, &mut ring);
        for sample in &ring {
            builder.add_vertex(sample.position);
        }
        if step > 0 {
            stitch_rings(
                &mut builder,
                ring_start(step - 1, ring_len),
                ring_start(step, ring_len),
                ring_len,
                profile.is_closed(),
                &stitch_face,
            );
        }
    }

    if path.is_closed() {
        stitch_rings(
            &mut builder,
            ring_start(path.points() - 1, ring_len),
            0,
            ring_len,
            profile.is_closed(),
            &stitch_face,
        );
    }

    if topology.close_caps {
        let cap_face = FaceData {
            uvs: [Vec2::ZERO; 3],
            material_index: i32::from(settings.separate_material_for_caps),
            shade_smooth: settings.shade_smooth_caps,
        };
        let first = path.sample(0);
        let last = path.sample(path.points() - 1);
        add_cap(
            &mut builder,
            0,
            ring_len,
            CapEnd::Start,
            (first.normal, first.binormal),
            settings.cap_uv_type,
            cap_face,
        );
        add_cap(
            &mut builder,
            ring_start(path.points() - 1, ring_len),
            ring_len,
            CapEnd::End,
            (-last.normal, last.binormal),
            settings.cap_uv_type,
            cap_face,
        );
    }

    debug_assert_eq!(builder.vertex_count(), topology.vertices);
    debug_assert_eq!(builder.edge_count(), topology.edges);
    debug_assert_eq!(builder.face_count(), topology.faces);

    let submesh_count = if topology.close_caps && settings.separate_material_for_caps {
        2
    } else {
        1
    };
    builder.build(submesh_count)
}

fn ring_start(step: usize, ring_len: usize) -> u32 {
    (step * ring_len) as u32
}

/// Places every profile sample in the frame of `anchor`, rolled by
/// `roll_degrees` around the path tangent.
fn align_ring(profile: &[FrameSample], anchor: FrameSample, roll_degrees: f32, ring: &mut [FrameSample]) {
    let matrix = Mat4::from_cols(
        anchor.normal.extend(0.0),
        anchor.tangent.extend(0.0),
        anchor.binormal.extend(0.0),
        anchor.position.extend(1.0),
    ) * Mat4::from_rotation_y(roll_degrees.to_radians());

    for_each_indexed_mut(ring, ALIGN_PARALLEL_THRESHOLD, |idx, out| {
        let source = profile[idx];
        let direction = |v: Vec3| {
            let moved = matrix.transform_vector3(v);
            moved.try_normalize().unwrap_or(moved)
        };
        *out = FrameSample {
            position: matrix.transform_point3(source.position),
            tangent: direction(source.tangent),
            normal: direction(source.normal),
            binormal: direction(source.binormal),
        };
    });
}

fn stitch_rings(
    builder: &mut MeshBuilder,
    previous: u32,
    current: u32,
    ring_len: usize,
    profile_closed: bool,
    face: &dyn Fn([Vec2; 3]) -> FaceData,
) {
    let segments = if profile_closed { ring_len } else { ring_len - 1 };
    for i in 0..segments {
        let next = (i + 1) % ring_len;
        let (p0, p1) = (previous + i as u32, previous + next as u32);
        let (c0, c1) = (current + i as u32, current + next as u32);
        builder.add_face([c0, p0, c1], face(CURVE_FACE_UVS[0]));
        builder.add_face([p0, p1, c1], face(CURVE_FACE_UVS[1]));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapEnd {
    Start,
    End,
}

/// Fan-triangulates the ring starting at `first` from its vertex 0. The start
/// cap winds against the sweep direction and the end cap with it, so both
/// face away from the tube.
fn add_cap(
    builder: &mut MeshBuilder,
    first: u32,
    ring_len: usize,
    end: CapEnd,
    (axis_u, axis_v): (Vec3, Vec3),
    uv_type: CapUvType,
    template: FaceData,
) {
    let raw: Vec<Vec2> = (0..ring_len as u32)
        .map(|i| {
            let position = builder.position(first + i);
            Vec2::new(position.dot(axis_u), position.dot(axis_v))
        })
        .collect();
    let uvs = remap_cap_uvs(&raw, uv_type);

    for k in 0..ring_len - 2 {
        let (a, b, c) = match end {
            CapEnd::Start => (0, k + 2, k + 1),
            CapEnd::End => (k + 2, 0, k + 1),
        };
        builder.add_face(
            [first + a as u32, first + b as u32, first + c as u32],
            FaceData {
                uvs: [uvs[a], uvs[b], uvs[c]],
                ..template
            },
        );
    }
}

fn remap_cap_uvs(raw: &[Vec2], uv_type: CapUvType) -> Vec<Vec2> {
    if uv_type == CapUvType::WorldSpace {
        return raw.to_vec();
    }
    let min = raw.iter().copied().fold(Vec2::splat(f32::INFINITY), Vec2::min);
    let max = raw.iter().copied().fold(Vec2::splat(f32::NEG_INFINITY), Vec2::max);
    let extent = max - min;
    let scale = |value: f32, size: f32| if size > 0.0 { value / size } else { 0.0 };
    raw.iter()
        .map(|uv| {
            let shifted = *uv - min;
            match uv_type {
                CapUvType::LocalSpace => {
                    Vec2::new(scale(shifted.x, extent.x), scale(shifted.y, extent.y))
                }
                _ => shifted,
            }
        })
        .collect()
}
