//! An open path geometry.

use std::sync::Arc;

use dora_types::{Coordinate, WktGeometry};

use crate::design::{GeometryDesign, SmoothingMode};
use crate::engines::{MapEngine, ShapeDraft};
use crate::error::DoraError;
use crate::geometry::path::PathCore;
use crate::geometry::{Geometry, GeometryCore};
use crate::patterns::line_pattern;
use crate::shapes::Point;

/// A polyline drawn through the authored coordinates.
pub struct Line {
    core: GeometryCore,
    path: PathCore,
}

impl Line {
    /// Creates a detached line. Requires at least two coordinates.
    pub fn new(
        engine: Arc<dyn MapEngine>,
        coordinates: Vec<Coordinate>,
        design: GeometryDesign,
    ) -> Result<Self, DoraError> {
        if coordinates.len() < 2 {
            return Err(DoraError::InvalidGeometry(format!(
                "a line requires at least 2 coordinates, got {}",
                coordinates.len()
            )));
        }

        Ok(Self {
            core: GeometryCore::new(engine.create_line_renderer(), design),
            path: PathCore::new(engine, coordinates),
        })
    }

    /// The authored coordinates.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.path.base_coordinates
    }

    /// Replaces the authored coordinates, regenerating when on the map.
    pub fn set_coordinates(&mut self, coordinates: Vec<Coordinate>) -> Result<(), DoraError> {
        if coordinates.len() < 2 {
            return Err(DoraError::InvalidGeometry(format!(
                "a line requires at least 2 coordinates, got {}",
                coordinates.len()
            )));
        }

        self.path.base_coordinates = coordinates;
        if self.core.renderer.is_generated() {
            self.generate_on_map()?;
        }
        Ok(())
    }

    /// The coordinates after smoothing. Open paths support only the smooth
    /// transform; `Round` applies to polygon corners and passes through here.
    fn transformed(&self) -> Vec<Coordinate> {
        match self.core.design.line.smoothing {
            SmoothingMode::Smooth => self.path.smooth_open(),
            SmoothingMode::None | SmoothingMode::Round => self.path.base_coordinates.clone(),
        }
    }
}

impl Geometry for Line {
    fn core(&self) -> &GeometryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GeometryCore {
        &mut self.core
    }

    fn generate_on_map(&mut self) -> Result<(), DoraError> {
        let transformed = self.transformed();
        line_pattern(self.core.design.line.pattern).apply(&transformed, &mut self.path.drafts)?;

        self.core.renderer.generate(
            ShapeDraft::Line {
                path: &self.path.drafts,
            },
            &self.core.design,
        )?;
        self.core.sync_after_generation()?;

        let attachments = self.core.attachments();
        self.path
            .sync_icon_points(&self.core.design, &transformed, &attachments)
    }

    fn get_wkt(&self) -> String {
        WktGeometry::LineString(self.path.base_coordinates.clone()).to_wkt()
    }

    fn set_wkt(&mut self, wkt: &str) -> Result<(), DoraError> {
        match WktGeometry::parse(wkt)? {
            WktGeometry::LineString(coordinates) => self.set_coordinates(coordinates),
            other => Err(DoraError::GeometryTypeMismatch {
                expected: "LINESTRING",
                actual: other.type_name().to_string(),
            }),
        }
    }

    fn get_geojson(&self) -> geojson::Geometry {
        let positions = self
            .path
            .base_coordinates
            .iter()
            .map(Coordinate::to_geojson)
            .collect();
        geojson::Geometry::new(geojson::Value::LineString(positions))
    }

    fn set_geojson(&mut self, geometry: &geojson::Geometry) -> Result<(), DoraError> {
        match &geometry.value {
            geojson::Value::LineString(positions) => {
                let coordinates = positions
                    .iter()
                    .map(|p| Coordinate::from_geojson(p))
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_coordinates(coordinates)
            }
            other => Err(DoraError::GeometryTypeMismatch {
                expected: "LineString",
                actual: other.type_name().to_string(),
            }),
        }
    }

    fn apply_edited_coordinates(&mut self, coordinates: Vec<Coordinate>) -> Result<(), DoraError> {
        if coordinates.len() < 2 {
            return Err(DoraError::InvalidGeometry(format!(
                "a line requires at least 2 coordinates, got {}",
                coordinates.len()
            )));
        }
        self.path.base_coordinates = coordinates;
        Ok(())
    }

    fn focus_coordinates(&self) -> Vec<Coordinate> {
        self.path.base_coordinates.clone()
    }

    fn refresh_icons(&mut self) -> Result<(), DoraError> {
        let transformed = self.transformed();
        let attachments = self.core.attachments();
        self.path
            .sync_icon_points(&self.core.design, &transformed, &attachments)
    }

    fn for_each_child(&mut self, visit: &mut dyn FnMut(&mut Point)) {
        for point in &mut self.path.icon_points {
            visit(point);
        }
    }
}
