//! Geographic coordinate value type.

use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

use crate::error::DoraTypesError;

/// Altitude assigned to coordinates that were created without one.
///
/// The sentinel is high enough that engines which render altitude clamp it to
/// the ground, while engines that ignore altitude are unaffected.
pub const DEFAULT_ALTITUDE: f64 = 500_000.0;

fn default_altitude() -> f64 {
    DEFAULT_ALTITUDE
}

/// A geographic position in degrees, with an optional altitude in meters.
///
/// `Coordinate` is a plain value type. Mutating a geometry never mutates the
/// coordinates it was built from; transforms always produce new values.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in meters. Defaults to [`DEFAULT_ALTITUDE`].
    #[serde(default = "default_altitude")]
    pub altitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate with the default altitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: DEFAULT_ALTITUDE,
        }
    }

    /// Creates a new coordinate with an explicit altitude.
    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Converts a GeoJSON position (`[lon, lat]` or `[lon, lat, alt]`) into a
    /// coordinate.
    pub fn from_geojson(position: &[f64]) -> Result<Self, DoraTypesError> {
        match *position {
            [longitude, latitude] => Ok(Self::new(latitude, longitude)),
            [longitude, latitude, altitude] => Ok(Self::with_altitude(latitude, longitude, altitude)),
            _ => Err(DoraTypesError::Conversion(format!(
                "a position must have 2 or 3 ordinates, got {}",
                position.len()
            ))),
        }
    }

    /// Converts the coordinate into a GeoJSON position.
    ///
    /// The altitude is included only when it was explicitly set.
    pub fn to_geojson(&self) -> Vec<f64> {
        if self.altitude == DEFAULT_ALTITUDE {
            vec![self.longitude, self.latitude]
        } else {
            vec![self.longitude, self.latitude, self.altitude]
        }
    }

    /// Formats the coordinate as a WKT coordinate fragment (`lon lat`).
    pub fn to_wkt_fragment(&self) -> String {
        format!("{} {}", self.longitude, self.latitude)
    }

    /// Parses a WKT coordinate fragment (`lon lat`).
    pub fn from_wkt_fragment(fragment: &str) -> Result<Self, DoraTypesError> {
        let mut ordinates = fragment.split_whitespace();
        let longitude = parse_ordinate(ordinates.next(), fragment)?;
        let latitude = parse_ordinate(ordinates.next(), fragment)?;
        if ordinates.next().is_some() {
            return Err(DoraTypesError::InvalidWkt(format!(
                "too many ordinates in \"{fragment}\""
            )));
        }

        Ok(Self::new(latitude, longitude))
    }

    /// Distance to another coordinate in degree space.
    ///
    /// This is not a geodesic distance. It is used by the pattern pipeline
    /// which samples shapes in their own planar coordinate space.
    pub fn planar_distance_to(&self, other: &Coordinate) -> f64 {
        (self.latitude - other.latitude).hypot(self.longitude - other.longitude)
    }
}

fn parse_ordinate(ordinate: Option<&str>, fragment: &str) -> Result<f64, DoraTypesError> {
    ordinate
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| DoraTypesError::InvalidWkt(format!("invalid coordinate \"{fragment}\"")))
}

impl AbsDiffEq for Coordinate {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.latitude.abs_diff_eq(&other.latitude, epsilon)
            && self.longitude.abs_diff_eq(&other.longitude, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geojson_position_round_trip() {
        let coordinate = Coordinate::new(32.0, 35.5);
        assert_eq!(coordinate.to_geojson(), vec![35.5, 32.0]);
        assert_eq!(
            Coordinate::from_geojson(&coordinate.to_geojson()).unwrap(),
            coordinate
        );

        let with_altitude = Coordinate::with_altitude(32.0, 35.5, 150.0);
        assert_eq!(with_altitude.to_geojson(), vec![35.5, 32.0, 150.0]);
        assert_eq!(
            Coordinate::from_geojson(&with_altitude.to_geojson()).unwrap(),
            with_altitude
        );
    }

    #[test]
    fn invalid_position_is_rejected() {
        assert!(Coordinate::from_geojson(&[1.0]).is_err());
        assert!(Coordinate::from_geojson(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn wkt_fragment_round_trip() {
        let coordinate = Coordinate::new(-15.25, 100.125);
        let fragment = coordinate.to_wkt_fragment();
        assert_eq!(fragment, "100.125 -15.25");
        assert_eq!(Coordinate::from_wkt_fragment(&fragment).unwrap(), coordinate);
    }

    #[test]
    fn malformed_wkt_fragment() {
        assert!(Coordinate::from_wkt_fragment("10").is_err());
        assert!(Coordinate::from_wkt_fragment("10 abc").is_err());
        assert!(Coordinate::from_wkt_fragment("10 20 30 40").is_err());
    }
}
