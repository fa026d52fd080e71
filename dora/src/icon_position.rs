//! Icon anchor calculation along a path.

use dora_types::Coordinate;
use geo::InteriorPoint;

use crate::design::IconAlignment;

/// Computes where an icon anchors on a path, per its alignment policy.
///
/// Returns `None` for an empty path.
pub fn calculate_position_on_path(
    coordinates: &[Coordinate],
    alignment: IconAlignment,
) -> Option<Coordinate> {
    if coordinates.is_empty() {
        return None;
    }

    let position = match alignment {
        IconAlignment::Center => center(coordinates),
        IconAlignment::Centroid => {
            interior_point(coordinates).unwrap_or_else(|| northern_point(coordinates))
        }
        IconAlignment::NorthernPoint => northern_point(coordinates),
        IconAlignment::FirstEdge => coordinates[0],
        IconAlignment::SecondEdge => coordinates[coordinates.len() - 1],
    };

    Some(position)
}

fn center(coordinates: &[Coordinate]) -> Coordinate {
    if coordinates.len() == 2 {
        Coordinate::with_altitude(
            (coordinates[0].latitude + coordinates[1].latitude) / 2.0,
            (coordinates[0].longitude + coordinates[1].longitude) / 2.0,
            (coordinates[0].altitude + coordinates[1].altitude) / 2.0,
        )
    } else {
        coordinates[coordinates.len() / 2]
    }
}

/// A representative point guaranteed to lie inside the polygon outlined by
/// the coordinates, so the icon never floats outside a concave shape.
fn interior_point(coordinates: &[Coordinate]) -> Option<Coordinate> {
    if coordinates.len() < 3 {
        return None;
    }

    let exterior: geo_types::LineString = coordinates
        .iter()
        .map(|c| geo_types::coord! { x: c.longitude, y: c.latitude })
        .collect();
    let polygon = geo_types::Polygon::new(exterior, vec![]);
    let point = polygon.interior_point()?;
    Some(Coordinate::new(point.y(), point.x()))
}

fn northern_point(coordinates: &[Coordinate]) -> Coordinate {
    let mut northern = coordinates[0];
    for c in &coordinates[1..] {
        if c.latitude > northern.latitude {
            northern = *c;
        }
    }
    northern
}
