//! Stripe segment generation for hatched polygon fills.
//!
//! Regularly spaced parallel lines are sampled across the shape's bounding
//! square and intersected with every ring boundary. Sorting the intersection
//! points along the sweep direction and pairing consecutive ones yields the
//! stripe segments; holes split stripes naturally because their boundary
//! contributes intersection points too.

use dora_types::{Coordinate, LinearRing, ViewBounds};

/// Stripes per shape. Diagonal orientations double this so the longer sweep
/// across the square keeps the same visual density.
const STRIPE_COUNT: usize = 20;

/// Sweep direction of the stripe lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StripeOrientation {
    Horizontal,
    Vertical,
    DiagonalUp,
    DiagonalDown,
}

struct SweepLine {
    // Base point and direction in (longitude, latitude) plane coordinates.
    base: (f64, f64),
    direction: (f64, f64),
}

/// Computes the stripe segments covering the polygon described by `rings`.
pub(crate) fn generate_stripes(
    rings: &[LinearRing],
    orientation: StripeOrientation,
) -> Vec<[Coordinate; 2]> {
    let all_points = rings.iter().flat_map(|ring| ring.points().iter());
    let Some(bounds) = ViewBounds::from_coordinates(all_points) else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    for line in sweep_lines(&bounds, orientation) {
        let mut hits = intersections(rings, &line);
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-9);

        for pair in hits.chunks_exact(2) {
            segments.push([pair[0].1, pair[1].1]);
        }
    }

    segments
}

fn sweep_lines(bounds: &ViewBounds, orientation: StripeOrientation) -> Vec<SweepLine> {
    match orientation {
        StripeOrientation::Horizontal => (1..STRIPE_COUNT)
            .map(|i| {
                let latitude = bounds.south + bounds.height() * i as f64 / STRIPE_COUNT as f64;
                SweepLine {
                    base: (bounds.west, latitude),
                    direction: (1.0, 0.0),
                }
            })
            .collect(),
        StripeOrientation::Vertical => (1..STRIPE_COUNT)
            .map(|i| {
                let longitude = bounds.west + bounds.width() * i as f64 / STRIPE_COUNT as f64;
                SweepLine {
                    base: (longitude, bounds.south),
                    direction: (0.0, 1.0),
                }
            })
            .collect(),
        StripeOrientation::DiagonalUp | StripeOrientation::DiagonalDown => {
            // A margin around the square guarantees edge coverage when a
            // stripe line grazes a corner.
            let square = bounds.bounding_square();
            let square = square.expand(square.width() * 0.01);
            let count = STRIPE_COUNT * 2;
            let slope = if orientation == StripeOrientation::DiagonalUp {
                1.0
            } else {
                -1.0
            };

            // Lines satisfy lat - slope * lon = c; sweep c over the square.
            let c_of = |lon: f64, lat: f64| lat - slope * lon;
            let corners = [
                c_of(square.west, square.south),
                c_of(square.west, square.north),
                c_of(square.east, square.south),
                c_of(square.east, square.north),
            ];
            let c_min = corners.iter().copied().fold(f64::INFINITY, f64::min);
            let c_max = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            (1..count)
                .map(|i| {
                    let c = c_min + (c_max - c_min) * i as f64 / count as f64;
                    SweepLine {
                        base: (square.west, c + slope * square.west),
                        direction: (1.0, slope),
                    }
                })
                .collect()
        }
    }
}

/// Intersection points of a sweep line with every ring edge, keyed by their
/// position along the sweep direction.
fn intersections(rings: &[LinearRing], line: &SweepLine) -> Vec<(f64, Coordinate)> {
    let cross = |a: (f64, f64), b: (f64, f64)| a.0 * b.1 - a.1 * b.0;
    let mut hits = Vec::new();

    for ring in rings {
        for edge in ring.points().windows(2) {
            let a = &edge[0];
            let b = &edge[1];
            let edge_vector = (b.longitude - a.longitude, b.latitude - a.latitude);
            let denominator = cross(edge_vector, line.direction);
            if denominator.abs() < 1e-12 {
                continue;
            }

            let offset = (a.longitude - line.base.0, a.latitude - line.base.1);
            let t = cross(offset, line.direction) / -denominator;
            // Half-open so a vertex shared by two edges counts once.
            if !(0.0..1.0).contains(&t) {
                continue;
            }

            let point = Coordinate::with_altitude(
                a.latitude + edge_vector.1 * t,
                a.longitude + edge_vector.0 * t,
                a.altitude + (b.altitude - a.altitude) * t,
            );
            let along = (point.longitude - line.base.0) * line.direction.0
                + (point.latitude - line.base.1) * line.direction.1;
            hits.push((along, point));
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn ring(points: &[(f64, f64)]) -> LinearRing {
        LinearRing::new(
            points
                .iter()
                .map(|(lat, lon)| Coordinate::new(*lat, *lon))
                .collect(),
        )
        .unwrap()
    }

    fn unit_square() -> LinearRing {
        ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)])
    }

    #[test]
    fn horizontal_stripes_span_the_square() {
        let segments = generate_stripes(&[unit_square()], StripeOrientation::Horizontal);
        assert_eq!(segments.len(), STRIPE_COUNT - 1);

        for (i, segment) in segments.iter().enumerate() {
            let expected_latitude = (i + 1) as f64 / STRIPE_COUNT as f64;
            assert_abs_diff_eq!(segment[0].latitude, expected_latitude, epsilon = 1e-9);
            assert_abs_diff_eq!(segment[1].latitude, expected_latitude, epsilon = 1e-9);
            assert_abs_diff_eq!(segment[0].longitude, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(segment[1].longitude, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn vertical_stripes_are_ordered_along_latitude() {
        let segments = generate_stripes(&[unit_square()], StripeOrientation::Vertical);
        assert_eq!(segments.len(), STRIPE_COUNT - 1);
        for segment in &segments {
            assert!(segment[0].latitude < segment[1].latitude);
        }
    }

    #[test]
    fn holes_split_stripes() {
        let outer = unit_square();
        let hole = ring(&[(0.4, 0.4), (0.4, 0.6), (0.6, 0.6), (0.6, 0.4)]);
        let segments = generate_stripes(&[outer, hole], StripeOrientation::Horizontal);

        // The stripe at latitude 0.5 crosses the hole and splits in two.
        let at_half: Vec<_> = segments
            .iter()
            .filter(|s| (s[0].latitude - 0.5).abs() < 1e-9)
            .collect();
        assert_eq!(at_half.len(), 2);
        assert_abs_diff_eq!(at_half[0][1].longitude, 0.4, epsilon = 1e-9);
        assert_abs_diff_eq!(at_half[1][0].longitude, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn diagonal_stripes_cover_the_shape() {
        let segments = generate_stripes(&[unit_square()], StripeOrientation::DiagonalUp);
        assert!(!segments.is_empty());

        for segment in &segments {
            // Both ends lie on the unit square's boundary and the segment
            // runs south-west to north-east.
            for point in segment {
                assert!((-1e-9..=1.0 + 1e-9).contains(&point.latitude));
                assert!((-1e-9..=1.0 + 1e-9).contains(&point.longitude));
            }
            assert!(segment[1].longitude > segment[0].longitude);
            assert!(segment[1].latitude > segment[0].latitude);
        }
    }

    #[test]
    fn empty_input_produces_no_stripes() {
        assert!(generate_stripes(&[], StripeOrientation::Horizontal).is_empty());
    }
}
