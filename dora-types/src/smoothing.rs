//! Curve smoothing by iterative midpoint subdivision.
//!
//! The algorithm is a 6-point interpolatory subdivision scheme with a fixed
//! tension constant. It is a direct port of tuned legacy code; the constants
//! and the handling of line ends are part of the behavioral contract and must
//! not be re-derived.

use crate::coordinate::Coordinate;

const W: f64 = 0.01;
const C1: f64 = 9.0 / 16.0 + 2.0 * W;
const C2: f64 = -(1.0 / 16.0 + 3.0 * W);
const C3: f64 = W;

/// Number of subdivision levels used by shapes when the design does not say
/// otherwise.
pub const DEFAULT_SMOOTHING_LEVELS: u32 = 4;

/// Resamples a coordinate sequence into a smooth curve.
///
/// For open lines the input is the full point sequence, and the result has
/// `(N - 1) * 2^levels + 1` points with the original points preserved as
/// anchors. For closed rings the input must not repeat the first point at the
/// end, indices wrap around, and the result has `N * 2^levels` points.
///
/// This is a pure function: the same input always produces bit-identical
/// output.
pub fn smooth_geometry(coordinates: &[Coordinate], closed: bool, levels: u32) -> Vec<Coordinate> {
    if coordinates.len() < 2 {
        return coordinates.to_vec();
    }

    let mut points = coordinates.to_vec();
    for _ in 0..levels {
        points = subdivide(&points, closed);
    }

    points
}

fn subdivide(points: &[Coordinate], closed: bool) -> Vec<Coordinate> {
    let n = points.len() as isize;
    let at = |index: isize| -> Coordinate {
        if closed {
            points[index.rem_euclid(n) as usize]
        } else if index < 0 {
            // Dummy points before the first segment, linearly extrapolated.
            extrapolate(&points[0], &points[1], (-index) as f64)
        } else if index >= n {
            // Dummy points after the last segment.
            extrapolate(
                &points[(n - 1) as usize],
                &points[(n - 2) as usize],
                (index - n + 1) as f64,
            )
        } else {
            points[index as usize]
        }
    };

    let segments = if closed { n } else { n - 1 };
    let mut result = Vec::with_capacity((points.len() + segments as usize).max(points.len()));
    for i in 0..n {
        result.push(points[i as usize]);
        if i < segments {
            result.push(midpoint(
                at(i - 2),
                at(i - 1),
                at(i),
                at(i + 1),
                at(i + 2),
                at(i + 3),
            ));
        }
    }

    result
}

fn midpoint(
    p0: Coordinate,
    p1: Coordinate,
    p2: Coordinate,
    p3: Coordinate,
    p4: Coordinate,
    p5: Coordinate,
) -> Coordinate {
    let combine = |f: fn(&Coordinate) -> f64| -> f64 {
        C1 * (f(&p2) + f(&p3)) + C2 * (f(&p1) + f(&p4)) + C3 * (f(&p0) + f(&p5))
    };

    Coordinate::with_altitude(
        combine(|c| c.latitude),
        combine(|c| c.longitude),
        combine(|c| c.altitude),
    )
}

fn extrapolate(anchor: &Coordinate, inner: &Coordinate, steps: f64) -> Coordinate {
    Coordinate::with_altitude(
        anchor.latitude + steps * (anchor.latitude - inner.latitude),
        anchor.longitude + steps * (anchor.longitude - inner.longitude),
        anchor.altitude + steps * (anchor.altitude - inner.altitude),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn open_line_point_count() {
        let line = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 2.0),
        ];
        let smoothed = smooth_geometry(&line, false, 2);
        assert_eq!(smoothed.len(), (line.len() - 1) * 4 + 1);
    }

    #[test]
    fn closed_ring_point_count() {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ];
        let smoothed = smooth_geometry(&ring, true, 3);
        assert_eq!(smoothed.len(), ring.len() * 8);
    }

    #[test]
    fn original_points_are_anchors() {
        let line = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 2.0),
        ];
        let smoothed = smooth_geometry(&line, false, 2);
        assert_eq!(smoothed[0], line[0]);
        assert_eq!(smoothed[4], line[1]);
        assert_eq!(smoothed[8], line[2]);
    }

    #[test]
    fn deterministic_output() {
        let line = vec![
            Coordinate::new(31.1, 34.2),
            Coordinate::new(31.9, 34.7),
            Coordinate::new(31.4, 35.3),
        ];
        let first = smooth_geometry(&line, false, 2);
        let second = smooth_geometry(&line, false, 2);
        assert_eq!(first.len(), 9);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.latitude.to_bits(), b.latitude.to_bits());
            assert_eq!(a.longitude.to_bits(), b.longitude.to_bits());
        }
    }

    #[test]
    fn collinear_input_stays_collinear() {
        let line = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 2.0),
        ];
        let smoothed = smooth_geometry(&line, false, 1);
        assert_eq!(smoothed.len(), 5);
        for point in &smoothed {
            assert_abs_diff_eq!(point.latitude, 0.0, epsilon = 1e-12);
        }
        // The kernel weights sum to 1/2 at a midpoint of an evenly spaced line.
        assert_abs_diff_eq!(smoothed[1].longitude, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_input_is_returned_as_is() {
        let single = vec![Coordinate::new(1.0, 2.0)];
        assert_eq!(smooth_geometry(&single, false, 3), single);
    }
}
