use std::fmt;

use glam::{Mat4, Vec3};

/// Shared tolerance for length and distance comparisons.
pub const FLOAT_TOLERANCE: f32 = 1.0e-5;

pub const MAX_CURVE_RESOLUTION: usize = 1024;
pub const MIN_LINE_CURVE_RESOLUTION: usize = 1;
pub const MIN_CIRCLE_CURVE_RESOLUTION: usize = 3;
pub const MIN_BEZIER_CURVE_RESOLUTION: usize = 1;
pub const MIN_HELIX_CURVE_RESOLUTION: usize = 1;
pub const MIN_CIRCULAR_CURVE_RADIUS: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CurveType {
    #[default]
    None,
    Line,
    Circle,
    QuadraticBezier,
    CubicBezier,
    Helix,
    Generic,
}

impl CurveType {
    /// Smallest point count a curve of this family may be resampled to.
    pub fn min_points(self) -> usize {
        match self {
            CurveType::Circle => MIN_CIRCLE_CURVE_RESOLUTION,
            CurveType::Line => MIN_LINE_CURVE_RESOLUTION + 1,
            CurveType::QuadraticBezier | CurveType::CubicBezier => MIN_BEZIER_CURVE_RESOLUTION + 1,
            CurveType::Helix => MIN_HELIX_CURVE_RESOLUTION + 1,
            CurveType::None | CurveType::Generic => 2,
        }
    }

    /// Whether a closed profile of this family can be capped with a fan.
    /// Only circles are guaranteed convex.
    pub fn caps_supported(self) -> bool {
        matches!(self, CurveType::Circle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveError {
    MismatchedLengths {
        positions: usize,
        tangents: usize,
        normals: usize,
        binormals: usize,
    },
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::MismatchedLengths {
                positions,
                tangents,
                normals,
                binormals,
            } => write!(
                f,
                "curve arrays differ in length: {positions} positions, {tangents} tangents, {normals} normals, {binormals} binormals"
            ),
        }
    }
}

impl std::error::Error for CurveError {}

/// One sample of a curve laid out together, used by the generators and the
/// sweep scratch buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FrameSample {
    pub position: Vec3,
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

/// Ordered curve samples, each with a position and an orthonormal frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveData {
    curve_type: CurveType,
    closed: bool,
    position: Vec<Vec3>,
    tangent: Vec<Vec3>,
    normal: Vec<Vec3>,
    binormal: Vec<Vec3>,
}

impl CurveData {
    pub fn new(
        curve_type: CurveType,
        closed: bool,
        position: Vec<Vec3>,
        tangent: Vec<Vec3>,
        normal: Vec<Vec3>,
        binormal: Vec<Vec3>,
    ) -> Result<Self, CurveError> {
        let count = position.len();
        if tangent.len() != count || normal.len() != count || binormal.len() != count {
            return Err(CurveError::MismatchedLengths {
                positions: count,
                tangents: tangent.len(),
                normals: normal.len(),
                binormals: binormal.len(),
            });
        }
        Ok(Self {
            curve_type,
            closed,
            position,
            tangent,
            normal,
            binormal,
        })
    }

    /// Builds a curve from arrays produced inside the crate, where the lengths
    /// are known to agree.
    pub(crate) fn from_parts(
        curve_type: CurveType,
        closed: bool,
        position: Vec<Vec3>,
        tangent: Vec<Vec3>,
        normal: Vec<Vec3>,
        binormal: Vec<Vec3>,
    ) -> Self {
        debug_assert_eq!(position.len(), tangent.len());
        debug_assert_eq!(position.len(), normal.len());
        debug_assert_eq!(position.len(), binormal.len());
        Self {
            curve_type,
            closed,
            position,
            tangent,
            normal,
            binormal,
        }
    }

    pub(crate) fn from_samples(curve_type: CurveType, closed: bool, samples: &[FrameSample]) -> Self {
        Self {
            curve_type,
            closed,
            position: samples.iter().map(|s| s.position).collect(),
            tangent: samples.iter().map(|s| s.tangent).collect(),
            normal: samples.iter().map(|s| s.normal).collect(),
            binormal: samples.iter().map(|s| s.binormal).collect(),
        }
    }

    pub(crate) fn sample(&self, index: usize) -> FrameSample {
        FrameSample {
            position: self.position[index],
            tangent: self.tangent[index],
            normal: self.normal[index],
            binormal: self.binormal[index],
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    pub fn points(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn position(&self) -> &[Vec3] {
        &self.position
    }

    pub fn tangent(&self) -> &[Vec3] {
        &self.tangent
    }

    pub fn normal(&self) -> &[Vec3] {
        &self.normal
    }

    pub fn binormal(&self) -> &[Vec3] {
        &self.binormal
    }

    pub fn segment_count(&self) -> usize {
        if self.position.len() < 2 {
            0
        } else if self.closed {
            self.position.len()
        } else {
            self.position.len() - 1
        }
    }

    pub fn with_closed(&self, closed: bool) -> Self {
        if self.is_empty() {
            return Self::empty();
        }
        let mut out = self.clone();
        out.closed = closed;
        out
    }

    /// Applies a rigid transform. Positions move as points, frame vectors as
    /// directions.
    pub fn transformed(&self, matrix: Mat4) -> Self {
        let rotate = |values: &[Vec3]| {
            values
                .iter()
                .map(|v| {
                    let out = matrix.transform_vector3(*v);
                    out.try_normalize().unwrap_or(out)
                })
                .collect::<Vec<_>>()
        };
        Self {
            curve_type: self.curve_type,
            closed: self.closed,
            position: self
                .position
                .iter()
                .map(|p| matrix.transform_point3(*p))
                .collect(),
            tangent: rotate(&self.tangent),
            normal: rotate(&self.normal),
            binormal: rotate(&self.binormal),
        }
    }

    /// Walks the samples back to front. Tangents and normals flip so the
    /// binormal stays `tangent x normal`.
    pub fn reversed(&self) -> Self {
        if self.is_empty() {
            return Self::empty();
        }
        Self {
            curve_type: self.curve_type,
            closed: self.closed,
            position: self.position.iter().rev().copied().collect(),
            tangent: self.tangent.iter().rev().map(|t| -*t).collect(),
            normal: self.normal.iter().rev().map(|n| -*n).collect(),
            binormal: self.binormal.iter().rev().copied().collect(),
        }
    }
}
