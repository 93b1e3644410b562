use std::f32::consts::TAU;

use glam::Vec3;

use crate::curve::{
    CurveData, CurveType, FrameSample, MAX_CURVE_RESOLUTION, MIN_BEZIER_CURVE_RESOLUTION,
    MIN_CIRCLE_CURVE_RESOLUTION, MIN_CIRCULAR_CURVE_RADIUS, MIN_HELIX_CURVE_RESOLUTION,
    MIN_LINE_CURVE_RESOLUTION,
};
use crate::parallel::{for_each_indexed_mut, DEFAULT_PARALLEL_THRESHOLD};

/// Straight segment with `resolution + 1` evenly spaced points.
pub fn line(resolution: usize, start: Vec3, end: Vec3) -> CurveData {
    let resolution = resolution.clamp(MIN_LINE_CURVE_RESOLUTION, MAX_CURVE_RESOLUTION);
    let tangent = (end - start).try_normalize().unwrap_or(Vec3::Z);
    let (normal, binormal) = frame_from_reference(tangent, Vec3::Y);

    let mut samples = vec![FrameSample::default(); resolution + 1];
    for_each_indexed_mut(&mut samples, DEFAULT_PARALLEL_THRESHOLD, |idx, sample| {
        let t = idx as f32 / resolution as f32;
        *sample = FrameSample {
            position: start.lerp(end, t),
            tangent,
            normal,
            binormal,
        };
    });
    CurveData::from_samples(CurveType::Line, false, &samples)
}

/// Closed circle in the XZ plane, wound counter-clockwise seen from +Y.
pub fn circle(resolution: usize, radius: f32) -> CurveData {
    let resolution = resolution.clamp(MIN_CIRCLE_CURVE_RESOLUTION, MAX_CURVE_RESOLUTION);
    let radius = radius.max(MIN_CIRCULAR_CURVE_RADIUS);

    let mut samples = vec![FrameSample::default(); resolution];
    for_each_indexed_mut(&mut samples, DEFAULT_PARALLEL_THRESHOLD, |idx, sample| {
        let angle = TAU * idx as f32 / resolution as f32;
        let (sin, cos) = angle.sin_cos();
        *sample = FrameSample {
            position: Vec3::new(radius * cos, 0.0, radius * sin),
            tangent: Vec3::new(-sin, 0.0, cos),
            normal: Vec3::new(cos, 0.0, sin),
            binormal: Vec3::Y,
        };
    });
    CurveData::from_samples(CurveType::Circle, true, &samples)
}

pub fn quadratic_bezier(
    resolution: usize,
    closed: bool,
    start: Vec3,
    control: Vec3,
    end: Vec3,
) -> CurveData {
    let resolution = resolution.clamp(MIN_BEZIER_CURVE_RESOLUTION, MAX_CURVE_RESOLUTION);

    let mut samples = vec![FrameSample::default(); resolution + 1];
    for_each_indexed_mut(&mut samples, DEFAULT_PARALLEL_THRESHOLD, |idx, sample| {
        let t = idx as f32 / resolution as f32;
        let u = 1.0 - t;
        let position = u * u * start + 2.0 * u * t * control + t * t * end;
        let first = 2.0 * u * (control - start) + 2.0 * t * (end - control);
        let second = 2.0 * (end - 2.0 * control + start);
        *sample = bezier_sample(position, first, second);
    });
    CurveData::from_samples(CurveType::QuadraticBezier, closed, &samples)
}

pub fn cubic_bezier(
    resolution: usize,
    closed: bool,
    start: Vec3,
    control_a: Vec3,
    control_b: Vec3,
    end: Vec3,
) -> CurveData {
    let resolution = resolution.clamp(MIN_BEZIER_CURVE_RESOLUTION, MAX_CURVE_RESOLUTION);

    let mut samples = vec![FrameSample::default(); resolution + 1];
    for_each_indexed_mut(&mut samples, DEFAULT_PARALLEL_THRESHOLD, |idx, sample| {
        let t = idx as f32 / resolution as f32;
        let u = 1.0 - t;
        let position = u * u * u * start
            + 3.0 * u * u * t * control_a
            + 3.0 * u * t * t * control_b
            + t * t * t * end;
        let first = 3.0 * u * u * (control_a - start)
            + 6.0 * u * t * (control_b - control_a)
            + 3.0 * t * t * (end - control_b);
        let second = 6.0 * u * (control_b - 2.0 * control_a + start)
            + 6.0 * t * (end - 2.0 * control_b + control_a);
        *sample = bezier_sample(position, first, second);
    });
    CurveData::from_samples(CurveType::CubicBezier, closed, &samples)
}

/// Conical helix around +Y. The radius blends from `bottom_radius` to
/// `top_radius`; `pitch` is the rise per full turn.
pub fn helix(
    resolution: usize,
    rotations: f32,
    pitch: f32,
    top_radius: f32,
    bottom_radius: f32,
) -> CurveData {
    let resolution = resolution.clamp(MIN_HELIX_CURVE_RESOLUTION, MAX_CURVE_RESOLUTION);
    let top_radius = top_radius.max(MIN_CIRCULAR_CURVE_RADIUS);
    let bottom_radius = bottom_radius.max(MIN_CIRCULAR_CURVE_RADIUS);
    let total_angle = rotations * TAU;
    let rise = pitch / TAU;

    let mut samples = vec![FrameSample::default(); resolution + 1];
    for_each_indexed_mut(&mut samples, DEFAULT_PARALLEL_THRESHOLD, |idx, sample| {
        let fraction = idx as f32 / resolution as f32;
        let angle = fraction * total_angle;
        let radius = bottom_radius + (top_radius - bottom_radius) * fraction;
        let (sin, cos) = angle.sin_cos();
        let tangent = Vec3::new(-radius * sin, rise, radius * cos)
            .try_normalize()
            .unwrap_or(Vec3::Z);
        let normal = Vec3::new(cos, 0.0, sin);
        *sample = FrameSample {
            position: Vec3::new(radius * cos, rise * angle, radius * sin),
            tangent,
            normal,
            binormal: tangent.cross(normal),
        };
    });
    CurveData::from_samples(CurveType::Helix, false, &samples)
}

fn bezier_sample(position: Vec3, first: Vec3, second: Vec3) -> FrameSample {
    let tangent = first.try_normalize().unwrap_or(Vec3::Z);
    let (normal, binormal) = match tangent.cross(second).try_normalize() {
        Some(normal) => (normal, tangent.cross(normal)),
        None => frame_from_reference(tangent, Vec3::Y),
    };
    FrameSample {
        position,
        tangent,
        normal,
        binormal,
    }
}

/// Returns `(normal, binormal)` with the binormal as close to `reference` as
/// the tangent allows.
pub(crate) fn frame_from_reference(tangent: Vec3, reference: Vec3) -> (Vec3, Vec3) {
    let reference = if tangent.cross(reference).length_squared() < 1.0e-6 {
        if tangent.z.abs() < 0.9 {
            Vec3::Z
        } else {
            Vec3::X
        }
    } else {
        reference
    };
    let binormal = (reference - tangent * tangent.dot(reference)).normalize();
    let normal = binormal.cross(tangent);
    (normal, binormal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(curve: &CurveData) {
        for i in 0..curve.points() {
            let t = curve.tangent()[i];
            let n = curve.normal()[i];
            let b = curve.binormal()[i];
            assert!((t.length() - 1.0).abs() < 1.0e-4, "tangent {i} not unit");
            assert!((n.length() - 1.0).abs() < 1.0e-4, "normal {i} not unit");
            assert!(t.dot(n).abs() < 1.0e-4, "tangent/normal {i} not orthogonal");
            assert!((t.cross(n) - b).length() < 1.0e-4, "binormal {i} not t x n");
        }
    }

    #[test]
    fn line_has_resolution_plus_one_points() {
        let curve = line(4, Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(curve.points(), 5);
        assert!(!curve.is_closed());
        assert_eq!(curve.position()[2], Vec3::new(0.0, 0.0, 2.0));
        assert_orthonormal(&curve);
    }

    #[test]
    fn vertical_line_still_gets_a_frame() {
        let curve = line(1, Vec3::ZERO, Vec3::Y);
        assert_orthonormal(&curve);
    }

    #[test]
    fn circle_clamps_resolution_and_radius() {
        let curve = circle(1, 0.0);
        assert_eq!(curve.points(), MIN_CIRCLE_CURVE_RESOLUTION);
        assert!(curve.is_closed());
        assert!((curve.position()[0].length() - MIN_CIRCULAR_CURVE_RADIUS).abs() < 1.0e-6);
        assert_orthonormal(&circle(32, 2.0));
    }

    #[test]
    fn bezier_endpoints_match_controls() {
        let start = Vec3::ZERO;
        let end = Vec3::new(3.0, 0.0, 0.0);
        let curve = cubic_bezier(16, false, start, Vec3::new(1.0, 2.0, 0.0), Vec3::new(2.0, -2.0, 0.0), end);
        assert_eq!(curve.points(), 17);
        assert!((curve.position()[0] - start).length() < 1.0e-6);
        assert!((curve.position()[16] - end).length() < 1.0e-5);
        assert_orthonormal(&curve);

        let quad = quadratic_bezier(8, true, start, Vec3::new(1.0, 0.0, 0.0), end);
        assert!(quad.is_closed());
        assert_orthonormal(&quad);
    }

    #[test]
    fn helix_rises_by_pitch_per_turn() {
        let curve = helix(64, 2.0, 0.5, 1.0, 1.0);
        assert_eq!(curve.points(), 65);
        assert!((curve.position()[64].y - 1.0).abs() < 1.0e-4);
        assert_orthonormal(&curve);
    }
}
