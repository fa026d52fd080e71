//! Entry point for constructing geometries against one engine.

use std::sync::Arc;

use dora_types::{Coordinate, LinearRing, WktGeometry};

use crate::design::GeometryDesign;
use crate::engines::MapEngine;
use crate::error::DoraError;
use crate::geometry::Geometry;
use crate::layer::Layer;
use crate::shapes::{Arrow, DoubleLine, Line, Point, Polygon};

/// The geometry kinds the builder can produce, used as an explicit hint when
/// deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// A marker.
    Point,
    /// An open path.
    Line,
    /// An area.
    Polygon,
    /// A directed line with a head.
    Arrow,
    /// A bordered two-stroke line.
    DoubleLine,
}

/// A geometry of any kind, as produced by the deserializing builders.
pub enum AnyGeometry {
    /// A marker.
    Point(Point),
    /// An open path.
    Line(Line),
    /// An area.
    Polygon(Polygon),
    /// A directed line with a head.
    Arrow(Arrow),
    /// A bordered two-stroke line.
    DoubleLine(DoubleLine),
}

impl std::fmt::Debug for AnyGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AnyGeometry").field(&self.kind()).finish()
    }
}

impl AnyGeometry {
    /// The kind of the wrapped geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::Line(_) => GeometryKind::Line,
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::Arrow(_) => GeometryKind::Arrow,
            Self::DoubleLine(_) => GeometryKind::DoubleLine,
        }
    }

    /// The wrapped geometry as a trait object.
    pub fn as_geometry(&self) -> &dyn Geometry {
        match self {
            Self::Point(g) => g,
            Self::Line(g) => g,
            Self::Polygon(g) => g,
            Self::Arrow(g) => g,
            Self::DoubleLine(g) => g,
        }
    }

    /// The wrapped geometry as a mutable trait object.
    pub fn as_geometry_mut(&mut self) -> &mut dyn Geometry {
        match self {
            Self::Point(g) => g,
            Self::Line(g) => g,
            Self::Polygon(g) => g,
            Self::Arrow(g) => g,
            Self::DoubleLine(g) => g,
        }
    }
}

/// Builds geometries and layers bound to one [`MapEngine`].
///
/// The engine is injected once here and flows into every geometry the
/// builder creates; nothing else in the crate holds engine state.
pub struct GeometryBuilder {
    engine: Arc<dyn MapEngine>,
}

impl GeometryBuilder {
    /// Creates a builder over an engine.
    pub fn new(engine: Arc<dyn MapEngine>) -> Self {
        Self { engine }
    }

    /// The engine geometries are built against.
    pub fn engine(&self) -> &Arc<dyn MapEngine> {
        &self.engine
    }

    /// Creates a layer on the engine.
    pub fn build_layer(&self, name: impl Into<String>) -> Layer {
        Layer::new(self.engine.as_ref(), name)
    }

    /// Creates a detached point.
    pub fn build_point(&self, position: Coordinate, design: GeometryDesign) -> Point {
        Point::new(Arc::clone(&self.engine), position, design)
    }

    /// Creates a detached line.
    pub fn build_line(
        &self,
        coordinates: Vec<Coordinate>,
        design: GeometryDesign,
    ) -> Result<Line, DoraError> {
        Line::new(Arc::clone(&self.engine), coordinates, design)
    }

    /// Creates a detached polygon.
    pub fn build_polygon(
        &self,
        rings: Vec<LinearRing>,
        design: GeometryDesign,
    ) -> Result<Polygon, DoraError> {
        Polygon::new(Arc::clone(&self.engine), rings, design)
    }

    /// Creates a detached arrow.
    pub fn build_arrow(
        &self,
        coordinates: Vec<Coordinate>,
        design: GeometryDesign,
    ) -> Result<Arrow, DoraError> {
        Arrow::new(Arc::clone(&self.engine), coordinates, design)
    }

    /// Creates a detached double line.
    pub fn build_double_line(
        &self,
        coordinates: Vec<Coordinate>,
        design: GeometryDesign,
    ) -> Result<DoubleLine, DoraError> {
        DoubleLine::new(Arc::clone(&self.engine), coordinates, design)
    }

    /// Builds a geometry from WKT.
    ///
    /// Without a `kind` hint the kind is inferred: points and polygons map
    /// directly, while a `LINESTRING` becomes a double line when the design
    /// carries a secondary stroke, an arrow when it carries an arrow
    /// configuration, and a plain line otherwise.
    pub fn build_from_wkt(
        &self,
        wkt: &str,
        design: GeometryDesign,
        kind: Option<GeometryKind>,
    ) -> Result<AnyGeometry, DoraError> {
        match WktGeometry::parse(wkt)? {
            WktGeometry::Point(position) => {
                self.checked_point(position, design, kind)
            }
            WktGeometry::LineString(coordinates) => {
                self.linear_geometry(coordinates, design, kind)
            }
            WktGeometry::Polygon(rings) => self.checked_polygon(rings, design, kind),
        }
    }

    /// Builds a geometry from a GeoJSON geometry, with the same inference
    /// rules as [`GeometryBuilder::build_from_wkt`].
    pub fn build_from_geojson(
        &self,
        geometry: &geojson::Geometry,
        design: GeometryDesign,
        kind: Option<GeometryKind>,
    ) -> Result<AnyGeometry, DoraError> {
        match &geometry.value {
            geojson::Value::Point(position) => {
                self.checked_point(Coordinate::from_geojson(position)?, design, kind)
            }
            geojson::Value::LineString(positions) => {
                let coordinates = positions
                    .iter()
                    .map(|p| Coordinate::from_geojson(p))
                    .collect::<Result<Vec<_>, _>>()?;
                self.linear_geometry(coordinates, design, kind)
            }
            geojson::Value::Polygon(json_rings) => {
                let mut rings = Vec::with_capacity(json_rings.len());
                for ring in json_rings {
                    let points = ring
                        .iter()
                        .map(|p| Coordinate::from_geojson(p))
                        .collect::<Result<Vec<_>, _>>()?;
                    rings.push(LinearRing::new(points)?);
                }
                self.checked_polygon(rings, design, kind)
            }
            other => Err(DoraError::InvalidGeometry(format!(
                "unsupported GeoJSON geometry \"{}\"",
                other.type_name()
            ))),
        }
    }

    fn checked_point(
        &self,
        position: Coordinate,
        design: GeometryDesign,
        kind: Option<GeometryKind>,
    ) -> Result<AnyGeometry, DoraError> {
        match kind {
            None | Some(GeometryKind::Point) => {
                Ok(AnyGeometry::Point(self.build_point(position, design)))
            }
            Some(other) => Err(DoraError::GeometryTypeMismatch {
                expected: "POINT",
                actual: format!("{other:?}"),
            }),
        }
    }

    fn checked_polygon(
        &self,
        rings: Vec<LinearRing>,
        design: GeometryDesign,
        kind: Option<GeometryKind>,
    ) -> Result<AnyGeometry, DoraError> {
        match kind {
            None | Some(GeometryKind::Polygon) => {
                Ok(AnyGeometry::Polygon(self.build_polygon(rings, design)?))
            }
            Some(other) => Err(DoraError::GeometryTypeMismatch {
                expected: "POLYGON",
                actual: format!("{other:?}"),
            }),
        }
    }

    /// A line string can back several kinds; the hint wins, then the design.
    fn linear_geometry(
        &self,
        coordinates: Vec<Coordinate>,
        design: GeometryDesign,
        kind: Option<GeometryKind>,
    ) -> Result<AnyGeometry, DoraError> {
        let kind = kind.unwrap_or(if design.second_line.is_some() {
            GeometryKind::DoubleLine
        } else if design.arrow.is_some() {
            GeometryKind::Arrow
        } else {
            GeometryKind::Line
        });

        match kind {
            GeometryKind::Line => Ok(AnyGeometry::Line(self.build_line(coordinates, design)?)),
            GeometryKind::Arrow => Ok(AnyGeometry::Arrow(self.build_arrow(coordinates, design)?)),
            GeometryKind::DoubleLine => Ok(AnyGeometry::DoubleLine(
                self.build_double_line(coordinates, design)?,
            )),
            other => Err(DoraError::GeometryTypeMismatch {
                expected: "LINESTRING",
                actual: format!("{other:?}"),
            }),
        }
    }
}
