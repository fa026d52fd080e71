//! Geodesic helpers over WGS84.
//!
//! Thin wrappers around the haversine algorithms of the `geo` crate, adapted
//! to [`Coordinate`]. Used by the arrow geometry builder which samples lines
//! by real-world distance.

use geo::{HaversineBearing, HaversineDestination, HaversineDistance};

use crate::coordinate::Coordinate;

fn to_point(c: &Coordinate) -> geo_types::Point<f64> {
    geo_types::Point::new(c.longitude, c.latitude)
}

/// Great-circle distance between two coordinates in meters.
pub fn distance_m(from: &Coordinate, to: &Coordinate) -> f64 {
    to_point(from).haversine_distance(&to_point(to))
}

/// Initial bearing from one coordinate to another, in degrees from north.
pub fn bearing_deg(from: &Coordinate, to: &Coordinate) -> f64 {
    to_point(from).haversine_bearing(to_point(to))
}

/// The point reached by traveling `distance_m` meters from `origin` along the
/// given bearing. The origin's altitude is carried over.
pub fn destination(origin: &Coordinate, bearing_deg: f64, distance_m: f64) -> Coordinate {
    let point = to_point(origin).haversine_destination(bearing_deg, distance_m);
    Coordinate::with_altitude(point.y(), point.x(), origin.altitude)
}

/// Total geodesic length of a coordinate sequence in meters.
pub fn path_length_m(coordinates: &[Coordinate]) -> f64 {
    coordinates
        .windows(2)
        .map(|pair| distance_m(&pair[0], &pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn equator_degree_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 1.0);
        // One degree of longitude at the equator is about 111 km.
        assert_relative_eq!(distance_m(&a, &b), 111_195.0, max_relative = 0.01);
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert_relative_eq!(
            bearing_deg(&origin, &Coordinate::new(1.0, 0.0)),
            0.0,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            bearing_deg(&origin, &Coordinate::new(0.0, 1.0)),
            90.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn destination_round_trip() {
        let origin = Coordinate::new(31.5, 34.75);
        let target = destination(&origin, 47.0, 25_000.0);
        assert_relative_eq!(distance_m(&origin, &target), 25_000.0, max_relative = 1e-6);
        assert_relative_eq!(bearing_deg(&origin, &target), 47.0, epsilon = 0.1);
    }

    #[test]
    fn path_length_sums_segments() {
        let path = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
        ];
        let total = path_length_m(&path);
        let first = distance_m(&path[0], &path[1]);
        let second = distance_m(&path[1], &path[2]);
        assert_relative_eq!(total, first + second, epsilon = 1e-9);
    }
}
