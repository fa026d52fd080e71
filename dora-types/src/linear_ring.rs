//! Closed coordinate rings used by polygon shapes.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::DoraTypesError;
use crate::smoothing;

/// An ordered, closed sequence of coordinates.
///
/// The first and the last points of a ring are always equal. The constructor
/// closes an open sequence by repeating the first point, so callers may pass
/// either form. Transform methods never mutate the ring; they return new
/// instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRing {
    points: Vec<Coordinate>,
}

impl LinearRing {
    /// Creates a new ring, closing the sequence if needed.
    ///
    /// Returns [`DoraTypesError::RingTooSmall`] when fewer than 3 distinct
    /// points are supplied.
    pub fn new(mut points: Vec<Coordinate>) -> Result<Self, DoraTypesError> {
        if points.len() >= 2 && is_same_position(&points[0], &points[points.len() - 1]) {
            points.pop();
        }

        if points.len() < 3 {
            return Err(DoraTypesError::RingTooSmall(points.len()));
        }

        points.push(points[0]);
        Ok(Self { points })
    }

    /// The closed point sequence, including the closing duplicate.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// The point sequence without the closing duplicate.
    pub fn open_points(&self) -> &[Coordinate] {
        &self.points[..self.points.len() - 1]
    }

    /// Number of points in the closed sequence.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the closed sequence is empty. Construction guarantees it
    /// never is.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns a new ring resampled with the subdivision smoothing algorithm.
    pub fn transform_to_smooth(&self, levels: u32) -> Self {
        let smoothed = smoothing::smooth_geometry(self.open_points(), true, levels);
        // Smoothing preserves point count lower bounds, so re-closing cannot fail.
        Self::new(smoothed).unwrap_or_else(|_| self.clone())
    }

    /// Returns a new ring with corners cut by iterative Chaikin rounding.
    pub fn transform_to_round(&self) -> Self {
        use geo::ChaikinSmoothing;

        let line: geo_types::LineString<f64> = geo_types::LineString::from(
            self.points
                .iter()
                .map(|c| (c.longitude, c.latitude))
                .collect::<Vec<_>>(),
        );
        let rounded = geo_types::Polygon::new(line, vec![]).chaikin_smoothing(2);
        let points = rounded
            .exterior()
            .coords()
            .map(|c| Coordinate::new(c.y, c.x))
            .collect();

        Self::new(points).unwrap_or_else(|_| self.clone())
    }
}

fn is_same_position(a: &Coordinate, b: &Coordinate) -> bool {
    a.latitude == b.latitude && a.longitude == b.longitude
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_square() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ]
    }

    #[test]
    fn open_sequence_is_closed() {
        let ring = LinearRing::new(open_square()).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.points()[0], ring.points()[4]);
    }

    #[test]
    fn closed_sequence_is_kept() {
        let mut points = open_square();
        points.push(points[0]);
        let ring = LinearRing::new(points).unwrap();
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn too_few_points() {
        let points = vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)];
        assert!(matches!(
            LinearRing::new(points),
            Err(DoraTypesError::RingTooSmall(2))
        ));
    }

    #[test]
    fn smooth_returns_new_ring() {
        let ring = LinearRing::new(open_square()).unwrap();
        let smoothed = ring.transform_to_smooth(2);
        // 4 distinct points, 2 levels: 4 * 2^2 = 16 plus the closing duplicate.
        assert_eq!(smoothed.len(), 17);
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn round_returns_new_ring() {
        let ring = LinearRing::new(open_square()).unwrap();
        let rounded = ring.transform_to_round();
        assert!(rounded.len() > ring.len());
        assert_eq!(ring.len(), 5);
    }
}
