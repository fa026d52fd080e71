//! Concrete geometry kinds.

mod arrow;
mod double_line;
mod line;
mod point;
mod polygon;

pub use arrow::Arrow;
pub use double_line::DoubleLine;
pub use line::Line;
pub use point::Point;
pub use polygon::Polygon;

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use dora_types::{Coordinate, LinearRing};

    use crate::design::GeometryDesign;
    use crate::error::DoraError;
    use crate::geometry::Geometry;
    use crate::test_utils::{count_calls, SpyEngine};

    use super::*;

    #[test]
    fn point_wkt_survives_a_write_back() {
        let (engine, _) = SpyEngine::create();
        let mut point = Point::new(engine, Coordinate::new(32.0, 35.5), GeometryDesign::default());

        let wkt = point.get_wkt();
        point.set_wkt(&wkt).unwrap();

        assert_eq!(point.position(), Coordinate::new(32.0, 35.5));
        assert_eq!(point.get_wkt(), wkt);
    }

    #[test]
    fn line_wkt_survives_a_write_back() {
        let (engine, _) = SpyEngine::create();
        let mut line = Line::new(
            engine,
            vec![
                Coordinate::new(10.0, 30.0),
                Coordinate::new(30.0, 10.0),
                Coordinate::new(40.0, 40.0),
            ],
            GeometryDesign::default(),
        )
        .unwrap();

        let wkt = line.get_wkt();
        line.set_wkt(&wkt).unwrap();

        assert_eq!(line.get_wkt(), wkt);
        assert_eq!(
            line.coordinates(),
            &[
                Coordinate::new(10.0, 30.0),
                Coordinate::new(30.0, 10.0),
                Coordinate::new(40.0, 40.0),
            ]
        );
    }

    #[test]
    fn polygon_wkt_survives_a_write_back() {
        let (engine, _) = SpyEngine::create();
        let outer = LinearRing::new(vec![
            Coordinate::new(10.0, 35.0),
            Coordinate::new(45.0, 45.0),
            Coordinate::new(40.0, 15.0),
            Coordinate::new(20.0, 10.0),
        ])
        .unwrap();
        let hole = LinearRing::new(vec![
            Coordinate::new(30.0, 20.0),
            Coordinate::new(35.0, 35.0),
            Coordinate::new(20.0, 30.0),
        ])
        .unwrap();
        let mut polygon = Polygon::new(
            engine,
            vec![outer.clone(), hole.clone()],
            GeometryDesign::default(),
        )
        .unwrap();

        let wkt = polygon.get_wkt();
        polygon.set_wkt(&wkt).unwrap();

        assert_eq!(polygon.get_wkt(), wkt);
        assert_eq!(polygon.rings().unwrap(), vec![outer, hole]);
    }

    #[test]
    fn set_wkt_rejects_a_mismatched_kind() {
        let (engine, _) = SpyEngine::create();
        let mut line = Line::new(
            engine,
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
            GeometryDesign::default(),
        )
        .unwrap();

        assert_matches!(
            line.set_wkt("POINT(1 1)"),
            Err(DoraError::GeometryTypeMismatch {
                expected: "LINESTRING",
                ..
            })
        );
        // The rejection leaves the coordinates untouched.
        assert_eq!(line.coordinates().len(), 2);
    }

    #[test]
    fn set_wkt_regenerates_an_attached_line() {
        let (engine, log) = SpyEngine::create();
        let mut line = Line::new(
            engine,
            vec![Coordinate::new(32.0, 35.0), Coordinate::new(33.0, 36.0)],
            GeometryDesign::default(),
        )
        .unwrap();
        line.add_to_map().unwrap();
        assert_eq!(count_calls(&log, "generate line"), 1);

        line.set_wkt("LINESTRING(35 32,36 33,37 34)").unwrap();

        assert_eq!(line.coordinates().len(), 3);
        assert_eq!(count_calls(&log, "generate line"), 2);
    }
}
