use std::path::Path;

use glam::{Mat4, Vec3};
use serde::Deserialize;
use sweep_core::{
    circle, cubic_bezier, helix, line, quadratic_bezier, recalculate_direction_vectors,
    resample_curve_by_distance, resample_curve_by_points, CapUvType, CurveData,
    CurveToGeometrySettings, RecalculateCurveDirectionsSettings,
};

#[derive(Debug, Deserialize)]
pub(crate) struct SweepPlan {
    pub path: CurvePlan,
    /// Without a profile the path is emitted as a wireframe.
    #[serde(default)]
    pub profile: Option<CurvePlan>,
    #[serde(default)]
    pub settings: CurveToGeometrySettings,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurvePlan {
    pub primitive: PrimitivePlan,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub transform: Option<TransformPlan>,
    #[serde(default)]
    pub resample: Option<ResamplePlan>,
    #[serde(default)]
    pub recalculate: Option<RecalculateCurveDirectionsSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum PrimitivePlan {
    Line {
        #[serde(default = "default_resolution")]
        resolution: usize,
        start: [f32; 3],
        end: [f32; 3],
    },
    Circle {
        #[serde(default = "default_resolution")]
        resolution: usize,
        radius: f32,
    },
    QuadraticBezier {
        #[serde(default = "default_resolution")]
        resolution: usize,
        #[serde(default)]
        closed: bool,
        start: [f32; 3],
        control: [f32; 3],
        end: [f32; 3],
    },
    CubicBezier {
        #[serde(default = "default_resolution")]
        resolution: usize,
        #[serde(default)]
        closed: bool,
        start: [f32; 3],
        control_a: [f32; 3],
        control_b: [f32; 3],
        end: [f32; 3],
    },
    Helix {
        #[serde(default = "default_resolution")]
        resolution: usize,
        rotations: f32,
        pitch: f32,
        top_radius: f32,
        bottom_radius: f32,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TransformPlan {
    pub translate: [f32; 3],
    /// Euler angles in degrees, applied X then Y then Z.
    pub rotate: [f32; 3],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub(crate) enum ResamplePlan {
    ByDistance { distance: f32 },
    ByPoints { points: usize },
}

fn default_resolution() -> usize {
    32
}

impl CurvePlan {
    /// Builds the curve, then applies closing, reversal, the transform,
    /// resampling and direction recalculation in that order.
    pub fn build(&self) -> CurveData {
        let mut curve = self.primitive.build();
        if let Some(closed) = self.closed {
            curve = curve.with_closed(closed);
        }
        if self.reverse {
            curve = curve.reversed();
        }
        if let Some(transform) = &self.transform {
            curve = curve.transformed(transform.matrix());
        }
        match self.resample {
            Some(ResamplePlan::ByDistance { distance }) => {
                curve = resample_curve_by_distance(&curve, distance);
            }
            Some(ResamplePlan::ByPoints { points }) => {
                curve = resample_curve_by_points(&curve, points);
            }
            None => {}
        }
        if let Some(settings) = self.recalculate {
            curve = recalculate_direction_vectors(&curve, settings);
        }
        curve
    }
}

impl PrimitivePlan {
    fn build(&self) -> CurveData {
        match *self {
            PrimitivePlan::Line {
                resolution,
                start,
                end,
            } => line(resolution, Vec3::from(start), Vec3::from(end)),
            PrimitivePlan::Circle { resolution, radius } => circle(resolution, radius),
            PrimitivePlan::QuadraticBezier {
                resolution,
                closed,
                start,
                control,
                end,
            } => quadratic_bezier(
                resolution,
                closed,
                Vec3::from(start),
                Vec3::from(control),
                Vec3::from(end),
            ),
            PrimitivePlan::CubicBezier {
                resolution,
                closed,
                start,
                control_a,
                control_b,
                end,
            } => cubic_bezier(
                resolution,
                closed,
                Vec3::from(start),
                Vec3::from(control_a),
                Vec3::from(control_b),
                Vec3::from(end),
            ),
            PrimitivePlan::Helix {
                resolution,
                rotations,
                pitch,
                top_radius,
                bottom_radius,
            } => helix(resolution, rotations, pitch, top_radius, bottom_radius),
        }
    }
}

impl TransformPlan {
    fn matrix(&self) -> Mat4 {
        let [x, y, z] = self.rotate.map(f32::to_radians);
        Mat4::from_translation(Vec3::from(self.translate))
            * Mat4::from_rotation_z(z)
            * Mat4::from_rotation_y(y)
            * Mat4::from_rotation_x(x)
    }
}

pub(crate) fn load_plan(path: &Path) -> Result<SweepPlan, String> {
    let data = std::fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
    serde_json::from_slice(&data).map_err(|err| format!("{}: {err}", path.display()))
}

/// A capped tube wound along a tapering helix.
pub(crate) fn default_plan() -> SweepPlan {
    SweepPlan {
        path: CurvePlan {
            primitive: PrimitivePlan::Helix {
                resolution: 96,
                rotations: 2.0,
                pitch: 1.0,
                top_radius: 1.0,
                bottom_radius: 1.5,
            },
            closed: None,
            reverse: false,
            transform: None,
            resample: Some(ResamplePlan::ByDistance { distance: 0.1 }),
            recalculate: None,
        },
        profile: Some(CurvePlan {
            primitive: PrimitivePlan::Circle {
                resolution: 16,
                radius: 0.25,
            },
            closed: None,
            reverse: false,
            transform: None,
            resample: None,
            recalculate: None,
        }),
        settings: CurveToGeometrySettings {
            close_caps: true,
            separate_material_for_caps: true,
            shade_smooth_curve: true,
            cap_uv_type: CapUvType::LocalSpace,
            ..Default::default()
        },
    }
}
