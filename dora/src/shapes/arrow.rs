//! A directed line rendered with an arrow head.

use std::sync::Arc;

use dora_types::{Coordinate, LinearRing, WktGeometry};

use crate::arrow_math::{complex_arrow, regular_head_tips};
use crate::design::{ArrowDesign, ArrowKind, DesignUpdate, GeometryDesign, SmoothingMode};
use crate::engines::{MapEngine, ShapeDraft};
use crate::error::DoraError;
use crate::geometry::path::PathCore;
use crate::geometry::{Geometry, GeometryCore};
use crate::shapes::Point;

/// An arrow along a path of coordinates, pointing at the last one.
///
/// Regular arrows are the path plus two head strokes; wide and expanded
/// arrows are a pair of flank lines with a polygon head.
pub struct Arrow {
    core: GeometryCore,
    path: PathCore,
    head: Option<LinearRing>,
}

impl Arrow {
    /// Creates a detached arrow. Requires at least two coordinates.
    pub fn new(
        engine: Arc<dyn MapEngine>,
        coordinates: Vec<Coordinate>,
        mut design: GeometryDesign,
    ) -> Result<Self, DoraError> {
        if coordinates.len() < 2 {
            return Err(DoraError::InvalidGeometry(format!(
                "an arrow requires at least 2 coordinates, got {}",
                coordinates.len()
            )));
        }
        design.arrow.get_or_insert_with(ArrowDesign::default);

        Ok(Self {
            core: GeometryCore::new(engine.create_arrow_renderer(), design),
            path: PathCore::new(engine, coordinates),
            head: None,
        })
    }

    /// The authored coordinates.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.path.base_coordinates
    }

    fn arrow_design(&self) -> ArrowDesign {
        self.core.design.arrow.clone().unwrap_or_default()
    }

    fn transformed(&self) -> Vec<Coordinate> {
        match self.core.design.line.smoothing {
            SmoothingMode::Smooth => self.path.smooth_open(),
            SmoothingMode::None | SmoothingMode::Round => self.path.base_coordinates.clone(),
        }
    }

    /// Builds the flank lines and head for the current arrow kind. Falls
    /// back to a regular head when the path is too short for a wide one.
    fn build_arrow(&mut self, transformed: &[Coordinate]) -> Result<(), DoraError> {
        let design = self.arrow_design();

        if let ArrowKind::Wide | ArrowKind::Expanded = design.kind {
            let expanded = design.kind == ArrowKind::Expanded;
            if let Some(arrow) = complex_arrow(transformed, design.gap_width_m, expanded)? {
                self.path
                    .drafts
                    .set_multiline(vec![arrow.clockwise, arrow.counter_clockwise]);
                self.head = Some(arrow.head);
                return Ok(());
            }
            log::debug!(
                "path too short for a {:?} arrow head, rendering a regular one",
                design.kind
            );
        }

        let mut lines = vec![transformed.to_vec()];
        if let Some(tips) = regular_head_tips(transformed, design.size, design.half_angle_deg) {
            let end = transformed[transformed.len() - 1];
            lines.push(vec![tips[0], end]);
            lines.push(vec![tips[1], end]);
        }
        self.path.drafts.set_multiline(lines);
        self.head = None;
        Ok(())
    }
}

impl Geometry for Arrow {
    fn core(&self) -> &GeometryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GeometryCore {
        &mut self.core
    }

    fn generate_on_map(&mut self) -> Result<(), DoraError> {
        let transformed = self.transformed();
        self.build_arrow(&transformed)?;

        self.core.renderer.generate(
            ShapeDraft::Arrow {
                flanks: &self.path.drafts,
                head: self.head.as_ref(),
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
            WktGeometry::LineString(coordinates) => {
                self.apply_edited_coordinates(coordinates)?;
                if self.core.renderer.is_generated() {
                    self.generate_on_map()?;
                }
                Ok(())
            }
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
                self.apply_edited_coordinates(coordinates)?;
                if self.core.renderer.is_generated() {
                    self.generate_on_map()?;
                }
                Ok(())
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
                "an arrow requires at least 2 coordinates, got {}",
                coordinates.len()
            )));
        }
        self.path.base_coordinates = coordinates;
        Ok(())
    }

    fn focus_coordinates(&self) -> Vec<Coordinate> {
        self.path.base_coordinates.clone()
    }

    // Arrow kind/size changes reshape the whole geometry.
    fn is_structural_change(&self, update: &DesignUpdate) -> bool {
        update.changes_line_structure(&self.core.design) || update.arrow.is_some()
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
