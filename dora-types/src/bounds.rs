//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// A latitude/longitude aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    /// Southern edge in degrees.
    pub south: f64,
    /// Western edge in degrees.
    pub west: f64,
    /// Northern edge in degrees.
    pub north: f64,
    /// Eastern edge in degrees.
    pub east: f64,
}

impl ViewBounds {
    /// Creates new bounds from the edge values.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// The smallest bounds containing all the given coordinates.
    ///
    /// Returns `None` for an empty input.
    pub fn from_coordinates<'a>(
        coordinates: impl IntoIterator<Item = &'a Coordinate>,
    ) -> Option<Self> {
        let mut iter = coordinates.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(
            first.latitude,
            first.longitude,
            first.latitude,
            first.longitude,
        );
        for c in iter {
            bounds.south = bounds.south.min(c.latitude);
            bounds.north = bounds.north.max(c.latitude);
            bounds.west = bounds.west.min(c.longitude);
            bounds.east = bounds.east.max(c.longitude);
        }

        Some(bounds)
    }

    /// Width of the bounds in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the bounds in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center point of the bounds.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Returns bounds grown by `margin` degrees on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.south - margin,
            self.west - margin,
            self.north + margin,
            self.east + margin,
        )
    }

    /// Returns the smallest square bounds centered like self and containing it.
    ///
    /// The stripe fill generator samples parallel lines over a square so that
    /// diagonal stripes cover the whole shape.
    pub fn bounding_square(&self) -> Self {
        let side = self.width().max(self.height());
        let center = self.center();
        Self::new(
            center.latitude - side / 2.0,
            center.longitude - side / 2.0,
            center.latitude + side / 2.0,
            center.longitude + side / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_coordinates() {
        let coordinates = vec![
            Coordinate::new(1.0, -3.0),
            Coordinate::new(-2.0, 5.0),
            Coordinate::new(4.0, 0.0),
        ];
        let bounds = ViewBounds::from_coordinates(&coordinates).unwrap();
        assert_eq!(bounds, ViewBounds::new(-2.0, -3.0, 4.0, 5.0));
        assert!(ViewBounds::from_coordinates([].iter()).is_none());
    }

    #[test]
    fn bounding_square_is_square() {
        let bounds = ViewBounds::new(0.0, 0.0, 2.0, 10.0);
        let square = bounds.bounding_square();
        assert_eq!(square.width(), square.height());
        assert_eq!(square.width(), 10.0);
        assert_eq!(square.center(), bounds.center());
    }
}
