//! Well-known text codec for the geometry kinds Dora works with.
//!
//! Only `POINT`, `LINESTRING` and `POLYGON` are supported; those are the
//! forms the geometry builder can ingest. Anything else is a parse error,
//! never a silent `None`.

use crate::coordinate::Coordinate;
use crate::error::DoraTypesError;
use crate::linear_ring::LinearRing;

/// A geometry parsed from or serializable to WKT.
#[derive(Debug, Clone, PartialEq)]
pub enum WktGeometry {
    /// `POINT(lon lat)`
    Point(Coordinate),
    /// `LINESTRING(lon lat, ...)`
    LineString(Vec<Coordinate>),
    /// `POLYGON((ring), (ring), ...)`
    Polygon(Vec<LinearRing>),
}

impl WktGeometry {
    /// Parses a WKT string.
    pub fn parse(wkt: &str) -> Result<Self, DoraTypesError> {
        let trimmed = wkt.trim();
        let open = trimmed
            .find('(')
            .ok_or_else(|| invalid(trimmed, "missing opening parenthesis"))?;
        if !trimmed.ends_with(')') {
            return Err(invalid(trimmed, "missing closing parenthesis"));
        }

        let tag = trimmed[..open].trim().to_ascii_uppercase();
        let body = &trimmed[open + 1..trimmed.len() - 1];

        match tag.as_str() {
            "POINT" => Ok(Self::Point(Coordinate::from_wkt_fragment(body)?)),
            "LINESTRING" => {
                let coordinates = parse_coordinate_list(body)?;
                if coordinates.len() < 2 {
                    return Err(invalid(trimmed, "a linestring requires at least 2 points"));
                }
                Ok(Self::LineString(coordinates))
            }
            "POLYGON" => Ok(Self::Polygon(parse_rings(body, trimmed)?)),
            _ => Err(invalid(trimmed, "unsupported geometry tag")),
        }
    }

    /// The WKT tag of this geometry kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "POINT",
            Self::LineString(_) => "LINESTRING",
            Self::Polygon(_) => "POLYGON",
        }
    }

    /// Serializes the geometry to WKT.
    pub fn to_wkt(&self) -> String {
        match self {
            Self::Point(c) => format!("POINT({})", c.to_wkt_fragment()),
            Self::LineString(coordinates) => {
                format!("LINESTRING({})", format_coordinate_list(coordinates))
            }
            Self::Polygon(rings) => {
                let rings = rings
                    .iter()
                    .map(|ring| format!("({})", format_coordinate_list(ring.points())))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("POLYGON({rings})")
            }
        }
    }
}

fn invalid(wkt: &str, reason: &str) -> DoraTypesError {
    DoraTypesError::InvalidWkt(format!("{reason} in \"{wkt}\""))
}

fn parse_coordinate_list(body: &str) -> Result<Vec<Coordinate>, DoraTypesError> {
    body.split(',')
        .map(Coordinate::from_wkt_fragment)
        .collect()
}

fn parse_rings(body: &str, wkt: &str) -> Result<Vec<LinearRing>, DoraTypesError> {
    let mut rings = Vec::new();
    let mut rest = body.trim();
    while !rest.is_empty() {
        if !rest.starts_with('(') {
            return Err(invalid(wkt, "expected a ring"));
        }
        let close = rest
            .find(')')
            .ok_or_else(|| invalid(wkt, "unterminated ring"))?;
        rings.push(LinearRing::new(parse_coordinate_list(&rest[1..close])?)?);

        rest = rest[close + 1..].trim_start();
        if let Some(tail) = rest.strip_prefix(',') {
            rest = tail.trim_start();
        } else if !rest.is_empty() {
            return Err(invalid(wkt, "expected a comma between rings"));
        }
    }

    if rings.is_empty() {
        return Err(invalid(wkt, "a polygon requires at least one ring"));
    }

    Ok(rings)
}

fn format_coordinate_list(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(Coordinate::to_wkt_fragment)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_round_trip() {
        let geometry = WktGeometry::parse("POINT(35.5 32)").unwrap();
        assert_eq!(geometry, WktGeometry::Point(Coordinate::new(32.0, 35.5)));
        assert_eq!(geometry.to_wkt(), "POINT(35.5 32)");
    }

    #[test]
    fn linestring_round_trip() {
        let wkt = "LINESTRING(30 10,10 30,40 40)";
        let geometry = WktGeometry::parse(wkt).unwrap();
        assert_eq!(geometry.to_wkt(), wkt);
        match &geometry {
            WktGeometry::LineString(coordinates) => assert_eq!(coordinates.len(), 3),
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn polygon_with_hole() {
        let wkt = "POLYGON((35 10,45 45,15 40,10 20,35 10),(20 30,35 35,30 20,20 30))";
        let geometry = WktGeometry::parse(wkt).unwrap();
        match &geometry {
            WktGeometry::Polygon(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[0].len(), 5);
            }
            other => panic!("unexpected geometry: {other:?}"),
        }
        assert_eq!(geometry.to_wkt(), wkt);
    }

    #[test]
    fn open_polygon_ring_is_closed() {
        let geometry = WktGeometry::parse("POLYGON((0 0,1 0,1 1,0 1))").unwrap();
        match geometry {
            WktGeometry::Polygon(rings) => assert_eq!(rings[0].len(), 5),
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn malformed_input() {
        assert!(WktGeometry::parse("POINT 35.5 32").is_err());
        assert!(WktGeometry::parse("CIRCLE(0 0)").is_err());
        assert!(WktGeometry::parse("LINESTRING(1 1)").is_err());
        assert!(WktGeometry::parse("POLYGON()").is_err());
        assert!(WktGeometry::parse("POLYGON((0 0,1 1))").is_err());
    }

    #[test]
    fn case_insensitive_tag_with_space() {
        let geometry = WktGeometry::parse("point (1 2)").unwrap();
        assert_eq!(geometry, WktGeometry::Point(Coordinate::new(2.0, 1.0)));
    }
}
