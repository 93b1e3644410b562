use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::curve::{CurveData, FrameSample, FLOAT_TOLERANCE, MAX_CURVE_RESOLUTION};

pub const MIN_RESAMPLE_DISTANCE: f32 = 0.001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecalculateCurveDirectionsSettings {
    pub flip_tangents: bool,
    pub flip_normals: bool,
    pub flip_binormals: bool,
}

/// Sum of sample-to-sample distances, including the closing segment of a
/// closed curve.
pub fn calculate_length(curve: &CurveData) -> f32 {
    let positions = curve.position();
    if positions.len() < 2 {
        return 0.0;
    }
    let mut length = positions
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum::<f32>();
    if curve.is_closed() {
        length += positions[positions.len() - 1].distance(positions[0]);
    }
    length
}

/// Arclength from sample 0 to every sample. Closed curves get one extra entry
/// holding the full loop length.
pub fn calculate_cumulative_distances(curve: &CurveData) -> Vec<f32> {
    let positions = curve.position();
    if positions.is_empty() {
        return Vec::new();
    }
    let mut distances = Vec::with_capacity(positions.len() + usize::from(curve.is_closed()));
    let mut current = 0.0f32;
    distances.push(current);
    for pair in positions.windows(2) {
        current += pair[0].distance(pair[1]);
        distances.push(current);
    }
    if curve.is_closed() {
        current += positions[positions.len() - 1].distance(positions[0]);
        distances.push(current);
    }
    distances
}

pub fn resample_curve_by_distance(curve: &CurveData, distance: f32) -> CurveData {
    let distance = distance.max(MIN_RESAMPLE_DISTANCE);
    let length = calculate_length(curve);
    if length <= distance || length.abs() < FLOAT_TOLERANCE {
        warn!(length, distance, "resample by distance collapsed to an empty curve");
        return CurveData::empty();
    }

    let open_offset = if curve.is_closed() { 0 } else { 1 };
    let estimate = (length / distance).floor() as i64 - open_offset as i64;
    let points = clamp_points(estimate, curve);
    let spacing = length / (points - open_offset) as f32;
    resample_common(curve, points, spacing)
}

pub fn resample_curve_by_points(curve: &CurveData, points: usize) -> CurveData {
    let points = clamp_points(points as i64, curve);
    let length = calculate_length(curve);
    if length.abs() < FLOAT_TOLERANCE {
        warn!("resample by points on a zero-length curve");
        return CurveData::empty();
    }

    let open_offset = if curve.is_closed() { 0 } else { 1 };
    let spacing = length / (points - open_offset) as f32;
    if length <= spacing {
        warn!(length, spacing, "resample by points collapsed to an empty curve");
        return CurveData::empty();
    }
    resample_common(curve, points, spacing)
}

fn clamp_points(points: i64, curve: &CurveData) -> usize {
    let min = curve.curve_type().min_points() as i64;
    points.clamp(min, MAX_CURVE_RESOLUTION as i64) as usize
}

fn resample_common(curve: &CurveData, points: usize, spacing: f32) -> CurveData {
    let cumulative = calculate_cumulative_distances(curve);
    let count = curve.points();
    let mut samples = Vec::with_capacity(points);

    for i in 0..points {
        let target = i as f32 * spacing;
        let index = find_segment(&cumulative, target);
        let sample = if index + 1 >= count {
            // Closing segment, last sample back to sample 0.
            let span = cumulative[cumulative.len() - 1] - cumulative[count - 1];
            let t = segment_t(target - cumulative[count - 1], span);
            lerp_sample(curve.sample(count - 1), curve.sample(0), t)
        } else {
            let span = cumulative[index + 1] - cumulative[index];
            let t = segment_t(target - cumulative[index], span);
            lerp_sample(curve.sample(index), curve.sample(index + 1), t)
        };
        samples.push(sample);
    }

    CurveData::from_samples(curve.curve_type(), curve.is_closed(), &samples)
}

/// Index of the sample that starts the segment containing `distance`. A
/// distance equal to the total length belongs to the final segment.
fn find_segment(cumulative: &[f32], distance: f32) -> usize {
    let last_segment = cumulative.len().saturating_sub(2);
    if (cumulative[cumulative.len() - 1] - distance).abs() < FLOAT_TOLERANCE {
        return last_segment;
    }
    let above = cumulative.partition_point(|&d| d <= distance);
    above.saturating_sub(1).min(last_segment)
}

fn segment_t(offset: f32, span: f32) -> f32 {
    if span.abs() < FLOAT_TOLERANCE {
        0.0
    } else {
        (offset / span).clamp(0.0, 1.0)
    }
}

fn lerp_sample(a: FrameSample, b: FrameSample, t: f32) -> FrameSample {
    let blend = |from: Vec3, to: Vec3| {
        let v = from.lerp(to, t);
        v.try_normalize().unwrap_or(v)
    };
    FrameSample {
        position: a.position.lerp(b.position, t),
        tangent: blend(a.tangent, b.tangent),
        normal: blend(a.normal, b.normal),
        binormal: blend(a.binormal, b.binormal),
    }
}

/// Rebuilds tangents from the sample positions, then re-orthogonalises the
/// normals and binormals against them. The last tangent of an open curve
/// repeats the one before it.
pub fn recalculate_direction_vectors(
    curve: &CurveData,
    settings: RecalculateCurveDirectionsSettings,
) -> CurveData {
    if curve.is_empty() {
        return CurveData::empty();
    }

    let position = curve.position().to_vec();
    let mut tangent = curve.tangent().to_vec();
    let mut normal = curve.normal().to_vec();
    let mut binormal = curve.binormal().to_vec();
    let count = position.len();

    if count > 1 {
        for i in 0..count - 1 {
            tangent[i] = (position[i + 1] - position[i])
                .try_normalize()
                .unwrap_or(tangent[i]);
        }
        tangent[count - 1] = if curve.is_closed() {
            (position[0] - position[count - 1])
                .try_normalize()
                .unwrap_or(tangent[count - 1])
        } else {
            tangent[count - 2]
        };
    }

    for i in 0..count {
        normal[i] = binormal[i]
            .cross(tangent[i])
            .try_normalize()
            .unwrap_or(normal[i]);
    }
    for i in 0..count {
        binormal[i] = tangent[i]
            .cross(normal[i])
            .try_normalize()
            .unwrap_or(binormal[i]);
    }

    let sign = |flip: bool| if flip { -1.0 } else { 1.0 };
    let (ts, ns, bs) = (
        sign(settings.flip_tangents),
        sign(settings.flip_normals),
        sign(settings.flip_binormals),
    );
    for i in 0..count {
        tangent[i] *= ts;
        normal[i] *= ns;
        binormal[i] *= bs;
    }

    CurveData::from_parts(
        curve.curve_type(),
        curve.is_closed(),
        position,
        tangent,
        normal,
        binormal,
    )
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{PI, TAU};

    use super::*;
    use crate::curve::CurveType;
    use crate::curve_primitives::{circle, cubic_bezier, line};

    #[test]
    fn empty_curve_has_zero_length() {
        assert_eq!(calculate_length(&CurveData::empty()), 0.0);
        assert!(calculate_cumulative_distances(&CurveData::empty()).is_empty());
    }

    #[test]
    fn closed_length_includes_wrap_segment() {
        let square = circle(4, 1.0);
        let side = 2.0f32.sqrt();
        assert!((calculate_length(&square) - 4.0 * side).abs() < 1.0e-4);

        let distances = calculate_cumulative_distances(&square);
        assert_eq!(distances.len(), 5);
        assert_eq!(distances[0], 0.0);
        assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!((distances[4] - calculate_length(&square)).abs() < 1.0e-5);
    }

    #[test]
    fn open_cumulative_ends_at_length() {
        let curve = line(3, Vec3::ZERO, Vec3::new(6.0, 0.0, 0.0));
        let distances = calculate_cumulative_distances(&curve);
        assert_eq!(distances.len(), 4);
        assert!((distances[3] - 6.0).abs() < 1.0e-5);
    }

    #[test]
    fn resample_by_points_hits_exact_count() {
        let curve = cubic_bezier(
            64,
            false,
            Vec3::ZERO,
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(3.0, 2.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
        );
        let original = calculate_length(&curve);
        let coarse = resample_curve_by_points(&curve, 8);
        let fine = resample_curve_by_points(&curve, 48);
        assert_eq!(coarse.points(), 8);
        assert_eq!(fine.points(), 48);
        let coarse_error = (calculate_length(&coarse) - original).abs();
        let fine_error = (calculate_length(&fine) - original).abs();
        assert!(fine_error < 0.05 * original);
        assert!(fine_error <= coarse_error + 1.0e-4);
    }

    #[test]
    fn resample_open_line_keeps_endpoints() {
        let curve = line(1, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        let resampled = resample_curve_by_points(&curve, 5);
        assert_eq!(resampled.points(), 5);
        assert!((resampled.position()[0] - Vec3::ZERO).length() < 1.0e-5);
        assert!((resampled.position()[2] - Vec3::new(5.0, 0.0, 0.0)).length() < 1.0e-4);
        assert!((resampled.position()[4] - Vec3::new(10.0, 0.0, 0.0)).length() < 1.0e-4);
    }

    #[test]
    fn resample_closed_uses_wrap_segment() {
        let square = circle(4, 1.0);
        let resampled = resample_curve_by_points(&square, 8);
        assert_eq!(resampled.points(), 8);
        assert!(resampled.is_closed());
        // Sample 7 sits halfway along the closing edge from point 3 to point 0.
        let expected = square.position()[3].lerp(square.position()[0], 0.5);
        assert!((resampled.position()[7] - expected).length() < 1.0e-4);
        assert!((calculate_length(&resampled) - calculate_length(&square)).abs() < 1.0e-4);
    }

    #[test]
    fn resample_by_distance_respects_circle_minimum() {
        let curve = circle(256, 1.0);
        assert!((calculate_length(&curve) - TAU).abs() < 1.0e-3);
        let resampled = resample_curve_by_distance(&curve, PI);
        assert_eq!(resampled.points(), CurveType::Circle.min_points());
        assert!(resampled.is_closed());
    }

    #[test]
    fn resample_by_distance_spaces_evenly() {
        let curve = line(1, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        let resampled = resample_curve_by_distance(&curve, 2.0);
        // floor(10 / 2) samples minus one for the open end.
        assert_eq!(resampled.points(), 4);
        let spacing = resampled.position()[1].distance(resampled.position()[0]);
        assert!((spacing - 10.0 / 3.0).abs() < 1.0e-4);
        assert!((resampled.position()[3] - Vec3::new(10.0, 0.0, 0.0)).length() < 1.0e-4);
    }

    #[test]
    fn degenerate_resamples_are_empty() {
        let curve = line(1, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(resample_curve_by_distance(&curve, 5.0).is_empty());
        assert!(resample_curve_by_points(&curve, 2).is_empty());

        let point = line(1, Vec3::ONE, Vec3::ONE);
        assert!(resample_curve_by_points(&point, 10).is_empty());
        assert!(resample_curve_by_distance(&CurveData::empty(), 1.0).is_empty());
    }

    #[test]
    fn find_segment_ties_to_last_segment() {
        let cumulative = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_segment(&cumulative, 3.0), 2);
        assert_eq!(find_segment(&cumulative, 0.0), 0);
        assert_eq!(find_segment(&cumulative, 1.0), 1);
        assert_eq!(find_segment(&cumulative, 1.5), 1);
        assert_eq!(find_segment(&cumulative, 7.0), 2);
    }

    #[test]
    fn recalculate_on_straight_line_is_unchanged() {
        let curve = line(4, Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0));
        let recalculated =
            recalculate_direction_vectors(&curve, RecalculateCurveDirectionsSettings::default());
        assert_eq!(recalculated.position(), curve.position());
        for i in 0..curve.points() {
            assert!((recalculated.tangent()[i] - curve.tangent()[i]).length() < 1.0e-5);
            assert!((recalculated.normal()[i] - curve.normal()[i]).length() < 1.0e-5);
            assert!((recalculated.binormal()[i] - curve.binormal()[i]).length() < 1.0e-5);
        }
    }

    #[test]
    fn recalculate_is_idempotent() {
        let curve = cubic_bezier(
            12,
            false,
            Vec3::ZERO,
            Vec3::new(0.0, 2.0, 1.0),
            Vec3::new(2.0, 2.0, 3.0),
            Vec3::new(3.0, 0.0, 4.0),
        );
        let settings = RecalculateCurveDirectionsSettings::default();
        let once = recalculate_direction_vectors(&curve, settings);
        let twice = recalculate_direction_vectors(&once, settings);
        for i in 0..once.points() {
            assert!((once.tangent()[i] - twice.tangent()[i]).length() < 1.0e-4);
            assert!((once.normal()[i] - twice.normal()[i]).length() < 1.0e-4);
            assert!((once.binormal()[i] - twice.binormal()[i]).length() < 1.0e-4);
        }
    }

    #[test]
    fn recalculate_open_end_repeats_previous_tangent() {
        let curve = cubic_bezier(
            6,
            false,
            Vec3::ZERO,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(2.0, -1.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        );
        let recalculated =
            recalculate_direction_vectors(&curve, RecalculateCurveDirectionsSettings::default());
        let last = recalculated.points() - 1;
        assert_eq!(recalculated.tangent()[last], recalculated.tangent()[last - 1]);
    }

    #[test]
    fn recalculate_closed_uses_wrap_tangent() {
        let square = circle(4, 1.0);
        let recalculated =
            recalculate_direction_vectors(&square, RecalculateCurveDirectionsSettings::default());
        let expected = (square.position()[0] - square.position()[3]).normalize();
        assert!((recalculated.tangent()[3] - expected).length() < 1.0e-5);
    }

    #[test]
    fn recalculate_applies_flips() {
        let curve = line(2, Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        let plain =
            recalculate_direction_vectors(&curve, RecalculateCurveDirectionsSettings::default());
        let flipped = recalculate_direction_vectors(
            &curve,
            RecalculateCurveDirectionsSettings {
                flip_tangents: true,
                flip_normals: false,
                flip_binormals: true,
            },
        );
        assert_eq!(flipped.tangent()[0], -plain.tangent()[0]);
        assert_eq!(flipped.normal()[0], plain.normal()[0]);
        assert_eq!(flipped.binormal()[0], -plain.binormal()[0]);
    }

    #[test]
    fn recalculate_empty_is_empty() {
        let out = recalculate_direction_vectors(
            &CurveData::empty(),
            RecalculateCurveDirectionsSettings::default(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn settings_load_from_partial_json() {
        let settings: RecalculateCurveDirectionsSettings =
            serde_json::from_str(r#"{ "flip_normals": true }"#).expect("settings");
        assert!(settings.flip_normals);
        assert!(!settings.flip_tangents);
    }
}
