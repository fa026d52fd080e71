//! Arrow geometry construction.
//!
//! Regular arrows get two short head strokes computed in planar degree space
//! at the end of the line. Wide and expanded arrows are built geodesically:
//! the line is resampled by real-world distance, flank lines are offset at
//! ±90° bearing, and a head polygon connects the flank ends to the apex.

use std::f64::consts::PI;

use dora_types::{geodesic, Coordinate, LinearRing};

use crate::error::DoraError;

/// Endpoints of the two head strokes of a regular arrow.
///
/// Each stroke runs from the returned point to the last path coordinate.
/// Returns `None` when the path has no direction to point along.
pub(crate) fn regular_head_tips(
    coordinates: &[Coordinate],
    size: f64,
    half_angle_deg: f64,
) -> Option<[Coordinate; 2]> {
    let end = coordinates.last()?;
    // The last segment with any planar extent defines the head direction.
    let anchor = coordinates
        .iter()
        .rev()
        .find(|c| c.planar_distance_to(end) > f64::EPSILON)?;

    let forward = (end.latitude - anchor.latitude).atan2(end.longitude - anchor.longitude);
    let backward = forward + PI;
    let half_angle = half_angle_deg.to_radians();

    let length: f64 = coordinates
        .windows(2)
        .map(|pair| pair[0].planar_distance_to(&pair[1]))
        .sum();
    let stroke = length / 100.0 * size;

    let tip = |angle: f64| {
        Coordinate::with_altitude(
            end.latitude + stroke * angle.sin(),
            end.longitude + stroke * angle.cos(),
            end.altitude,
        )
    };

    Some([tip(backward + half_angle), tip(backward - half_angle)])
}

/// Flank lines and head polygon of a wide or expanded arrow.
pub(crate) struct ComplexArrow {
    /// Boundary line offset to the right of the travel direction.
    pub clockwise: Vec<Coordinate>,
    /// Boundary line offset to the left of the travel direction.
    pub counter_clockwise: Vec<Coordinate>,
    /// Head polygon; its first point is the clockwise flank's end so the
    /// outline connects continuously.
    pub head: LinearRing,
}

/// Builds a wide/expanded arrow from a path of N ≥ 2 coordinates.
///
/// The final `width_m` of line length is reserved for the head. Returns
/// `Ok(None)` when the path is too short to fit one.
pub(crate) fn complex_arrow(
    coordinates: &[Coordinate],
    width_m: f64,
    expanded: bool,
) -> Result<Option<ComplexArrow>, DoraError> {
    if coordinates.len() < 2 {
        return Ok(None);
    }

    let total = geodesic::path_length_m(coordinates);
    if total <= width_m {
        return Ok(None);
    }

    let sampler = GeodesicSampler::new(coordinates);
    let body = total - width_m;
    let half = width_m / 2.0;
    let steps = 6 * coordinates.len();

    let mut clockwise = Vec::with_capacity(steps + 1);
    let mut counter_clockwise = Vec::with_capacity(steps + 1);
    for step in 0..=steps {
        let along = body * step as f64 / steps as f64;
        let (point, bearing) = sampler.at(along);
        let offset = if expanded {
            half * along / body
        } else {
            half
        };
        clockwise.push(geodesic::destination(&point, bearing + 90.0, offset));
        counter_clockwise.push(geodesic::destination(&point, bearing - 90.0, offset));
    }

    let (base, bearing) = sampler.at(body);
    let apex = coordinates[coordinates.len() - 1];
    let head = LinearRing::new(vec![
        clockwise[steps],
        geodesic::destination(&base, bearing + 90.0, width_m),
        apex,
        geodesic::destination(&base, bearing - 90.0, width_m),
        counter_clockwise[steps],
        base,
    ])?;

    Ok(Some(ComplexArrow {
        clockwise,
        counter_clockwise,
        head,
    }))
}

/// Arc-length parametrization of a path by geodesic distance.
struct GeodesicSampler<'a> {
    coordinates: &'a [Coordinate],
    cumulative: Vec<f64>,
}

impl<'a> GeodesicSampler<'a> {
    fn new(coordinates: &'a [Coordinate]) -> Self {
        let mut cumulative = Vec::with_capacity(coordinates.len());
        let mut sum = 0.0;
        cumulative.push(0.0);
        for pair in coordinates.windows(2) {
            sum += geodesic::distance_m(&pair[0], &pair[1]);
            cumulative.push(sum);
        }
        Self {
            coordinates,
            cumulative,
        }
    }

    /// The point `along` meters into the path and the travel bearing there.
    fn at(&self, along: f64) -> (Coordinate, f64) {
        let total = *self.cumulative.last().unwrap_or(&0.0);
        let along = along.clamp(0.0, total);

        let mut index = match self
            .cumulative
            .binary_search_by(|probe| probe.total_cmp(&along))
        {
            Ok(exact) => exact,
            Err(insertion) => insertion - 1,
        };
        index = index.min(self.coordinates.len() - 2);

        let start = &self.coordinates[index];
        let end = &self.coordinates[index + 1];
        let bearing = geodesic::bearing_deg(start, end);
        let point = geodesic::destination(start, bearing, along - self.cumulative[index]);
        (point, bearing)
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    fn eastward(length_deg: f64) -> Vec<Coordinate> {
        vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, length_deg)]
    }

    #[test]
    fn regular_head_points_backward_symmetrically() {
        let tips = regular_head_tips(&eastward(10.0), 2.0, 18.0).unwrap();

        // Stroke length is 10 / 100 * 2 = 0.2 degrees, angled 18° off the
        // reversed direction.
        let expected_lon = 10.0 - 0.2 * 18.0_f64.to_radians().cos();
        let expected_lat = 0.2 * 18.0_f64.to_radians().sin();
        assert_abs_diff_eq!(tips[0].longitude, expected_lon, epsilon = 1e-12);
        assert_abs_diff_eq!(tips[0].latitude, expected_lat, epsilon = 1e-12);
        assert_abs_diff_eq!(tips[1].latitude, -expected_lat, epsilon = 1e-12);
    }

    #[test]
    fn regular_head_handles_westward_lines() {
        let line = vec![Coordinate::new(0.0, 10.0), Coordinate::new(0.0, 0.0)];
        let tips = regular_head_tips(&line, 2.0, 18.0).unwrap();
        // Strokes point back east, away from the travel direction.
        assert!(tips[0].longitude > 0.0);
        assert!(tips[1].longitude > 0.0);
    }

    #[test]
    fn regular_head_needs_a_direction() {
        let stationary = vec![Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.0)];
        assert!(regular_head_tips(&stationary, 2.0, 18.0).is_none());
    }

    #[test]
    fn wide_arrow_flanks_are_parallel() {
        let line = eastward(1.0);
        let arrow = complex_arrow(&line, 1000.0, false).unwrap().unwrap();

        assert_eq!(arrow.clockwise.len(), 6 * line.len() + 1);
        assert_eq!(arrow.clockwise.len(), arrow.counter_clockwise.len());

        // Traveling east, clockwise is the southern side.
        for (cw, ccw) in arrow.clockwise.iter().zip(&arrow.counter_clockwise) {
            assert!(cw.latitude < 0.0);
            assert!(ccw.latitude > 0.0);
            assert_relative_eq!(
                geodesic::distance_m(cw, ccw),
                1000.0,
                max_relative = 1e-3
            );
        }
    }

    #[test]
    fn head_connects_to_the_flanks_and_reaches_the_apex() {
        let line = eastward(1.0);
        let arrow = complex_arrow(&line, 1000.0, false).unwrap().unwrap();

        let head = arrow.head.points();
        assert_eq!(head.len(), 7);
        assert_eq!(head[0], *arrow.clockwise.last().unwrap());
        assert_eq!(head[4], *arrow.counter_clockwise.last().unwrap());
        assert_abs_diff_eq!(head[2].longitude, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(head[2].latitude, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn expanded_arrow_tapers_toward_the_tail() {
        let line = eastward(1.0);
        let arrow = complex_arrow(&line, 1000.0, true).unwrap().unwrap();

        let tail_width =
            geodesic::distance_m(&arrow.clockwise[0], &arrow.counter_clockwise[0]);
        let head_width = geodesic::distance_m(
            arrow.clockwise.last().unwrap(),
            arrow.counter_clockwise.last().unwrap(),
        );
        assert!(tail_width < 1.0);
        assert_relative_eq!(head_width, 1000.0, max_relative = 1e-3);
    }

    #[test]
    fn short_line_has_no_complex_arrow() {
        // The whole line is shorter than the head reservation.
        let line = eastward(0.001);
        assert!(complex_arrow(&line, 1000.0, false).unwrap().is_none());
    }
}
