mod attributes;
mod curve;
mod curve_ops;
mod curve_primitives;
mod curve_to_geometry;
mod export;
mod geometry;
mod mesh_builder;
mod parallel;

pub use attributes::{
    builtin_type, AttributeDomain, AttributeError, AttributeInfo, AttributeRef, AttributeStorage,
    AttributeType, GeometryAttributes, BINORMAL, CREASE, MATERIAL_INDEX, NORMAL, POSITION,
    SHADE_SMOOTH, TANGENT, UV,
};
pub use curve::{
    CurveData, CurveError, CurveType, FLOAT_TOLERANCE, MAX_CURVE_RESOLUTION,
    MIN_BEZIER_CURVE_RESOLUTION, MIN_CIRCLE_CURVE_RESOLUTION, MIN_CIRCULAR_CURVE_RADIUS,
    MIN_HELIX_CURVE_RESOLUTION, MIN_LINE_CURVE_RESOLUTION,
};
pub use curve_ops::{
    calculate_cumulative_distances, calculate_length, recalculate_direction_vectors,
    resample_curve_by_distance, resample_curve_by_points, RecalculateCurveDirectionsSettings,
    MIN_RESAMPLE_DISTANCE,
};
pub use curve_primitives::{circle, cubic_bezier, helix, line, quadratic_bezier};
pub use curve_to_geometry::{
    caps_enabled, sweep_topology, with_profile, without_profile, CapUvType,
    CurveToGeometrySettings, SweepTopology, ALIGN_PARALLEL_THRESHOLD,
};
pub use export::ExportMesh;
pub use geometry::{Edge, Face, FaceCorner, GeometryData, TopologyError, Vertex};
pub use mesh_builder::{FaceData, MeshBuilder};
pub use parallel::{for_each_indexed_mut, DEFAULT_PARALLEL_THRESHOLD};
