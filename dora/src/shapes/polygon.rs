//! An area geometry made of an outer ring and optional hole rings.

use std::sync::Arc;

use dora_types::{Coordinate, LinearRing, WktGeometry};

use crate::design::{DesignUpdate, GeometryDesign, SmoothingMode};
use crate::engines::{MapEngine, ShapeDraft};
use crate::error::DoraError;
use crate::geometry::path::{PathCore, SMOOTHING_LEVELS};
use crate::geometry::{Geometry, GeometryCore};
use crate::patterns::{fill_pattern, line_pattern, FillDraft, PathDrafts};
use crate::shapes::Point;

/// A polygon with independent outline and fill rendering.
///
/// The outline goes through the line pattern pipeline, the fill through the
/// fill pattern pipeline; the adapters compose the results with the outline
/// drawn on top.
pub struct Polygon {
    core: GeometryCore,
    path: PathCore,
    holes: Vec<LinearRing>,
    fill_draft: FillDraft,
}

impl Polygon {
    /// Creates a detached polygon from its rings. The first ring is the outer
    /// boundary; the rest are holes.
    pub fn new(
        engine: Arc<dyn MapEngine>,
        rings: Vec<LinearRing>,
        design: GeometryDesign,
    ) -> Result<Self, DoraError> {
        let mut rings = rings.into_iter();
        let outer = rings
            .next()
            .ok_or_else(|| DoraError::InvalidGeometry("a polygon requires a ring".into()))?;

        Ok(Self {
            core: GeometryCore::new(engine.create_polygon_renderer(), design),
            path: PathCore::new(engine, outer.open_points().to_vec()),
            holes: rings.collect(),
            fill_draft: FillDraft::default(),
        })
    }

    /// The polygon's rings: outer boundary first, then holes.
    pub fn rings(&self) -> Result<Vec<LinearRing>, DoraError> {
        let mut rings = vec![LinearRing::new(self.path.base_coordinates.clone())?];
        rings.extend(self.holes.iter().cloned());
        Ok(rings)
    }

    /// Replaces the polygon's rings, regenerating when on the map.
    pub fn set_rings(&mut self, rings: Vec<LinearRing>) -> Result<(), DoraError> {
        let mut rings = rings.into_iter();
        let outer = rings
            .next()
            .ok_or_else(|| DoraError::InvalidGeometry("a polygon requires a ring".into()))?;
        self.path.base_coordinates = outer.open_points().to_vec();
        self.holes = rings.collect();

        if self.core.renderer.is_generated() {
            self.generate_on_map()?;
        }
        Ok(())
    }

    /// Rings after the smoothing transform.
    fn transformed_rings(&self) -> Result<Vec<LinearRing>, DoraError> {
        let transform = |ring: &LinearRing| match self.core.design.line.smoothing {
            SmoothingMode::None => ring.clone(),
            SmoothingMode::Smooth => ring.transform_to_smooth(SMOOTHING_LEVELS),
            SmoothingMode::Round => ring.transform_to_round(),
        };

        let mut rings = vec![transform(&LinearRing::new(
            self.path.base_coordinates.clone(),
        )?)];
        rings.extend(self.holes.iter().map(transform));
        Ok(rings)
    }

    /// Runs every ring's closed point list through the line pattern and
    /// merges the results into one outline draft.
    fn outline_drafts(&self, rings: &[LinearRing]) -> Result<PathDrafts, DoraError> {
        let pattern = line_pattern(self.core.design.line.pattern);
        if rings.len() == 1 {
            let mut drafts = PathDrafts::default();
            pattern.apply(rings[0].points(), &mut drafts)?;
            return Ok(drafts);
        }

        let mut lines = Vec::new();
        let mut polygons = Vec::new();
        for ring in rings {
            let mut drafts = PathDrafts::default();
            pattern.apply(ring.points(), &mut drafts)?;
            if let Some(single) = drafts.single() {
                lines.push(single.to_vec());
            }
            if let Some(multiline) = drafts.multiline() {
                lines.extend(multiline.iter().cloned());
            }
            if let Some(multipolygon) = drafts.multipolygon() {
                polygons.extend(multipolygon.iter().cloned());
            }
        }

        let mut merged = PathDrafts::default();
        if polygons.is_empty() {
            merged.set_multiline(lines);
        } else {
            merged.set_multipolygon(polygons);
        }
        Ok(merged)
    }
}

impl Geometry for Polygon {
    fn core(&self) -> &GeometryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GeometryCore {
        &mut self.core
    }

    fn generate_on_map(&mut self) -> Result<(), DoraError> {
        let rings = self.transformed_rings()?;
        self.path.drafts = self.outline_drafts(&rings)?;
        self.fill_draft = fill_pattern(self.core.design.fill.pattern).apply(&rings);

        self.core.renderer.generate(
            ShapeDraft::Polygon {
                area: &rings,
                outline: &self.path.drafts,
                fill: &self.fill_draft,
            },
            &self.core.design,
        )?;
        self.core.sync_after_generation()?;

        let anchors = rings[0].open_points().to_vec();
        let attachments = self.core.attachments();
        self.path
            .sync_icon_points(&self.core.design, &anchors, &attachments)
    }

    fn get_wkt(&self) -> String {
        match self.rings() {
            Ok(rings) => WktGeometry::Polygon(rings).to_wkt(),
            Err(_) => String::new(),
        }
    }

    fn set_wkt(&mut self, wkt: &str) -> Result<(), DoraError> {
        match WktGeometry::parse(wkt)? {
            WktGeometry::Polygon(rings) => self.set_rings(rings),
            other => Err(DoraError::GeometryTypeMismatch {
                expected: "POLYGON",
                actual: other.type_name().to_string(),
            }),
        }
    }

    fn get_geojson(&self) -> geojson::Geometry {
        let rings = self
            .rings()
            .map(|rings| {
                rings
                    .iter()
                    .map(|ring| ring.points().iter().map(Coordinate::to_geojson).collect())
                    .collect()
            })
            .unwrap_or_default();
        geojson::Geometry::new(geojson::Value::Polygon(rings))
    }

    fn set_geojson(&mut self, geometry: &geojson::Geometry) -> Result<(), DoraError> {
        match &geometry.value {
            geojson::Value::Polygon(json_rings) => {
                let mut rings = Vec::with_capacity(json_rings.len());
                for ring in json_rings {
                    let points = ring
                        .iter()
                        .map(|p| Coordinate::from_geojson(p))
                        .collect::<Result<Vec<_>, _>>()?;
                    rings.push(LinearRing::new(points)?);
                }
                self.set_rings(rings)
            }
            other => Err(DoraError::GeometryTypeMismatch {
                expected: "Polygon",
                actual: other.type_name().to_string(),
            }),
        }
    }

    fn apply_edited_coordinates(&mut self, coordinates: Vec<Coordinate>) -> Result<(), DoraError> {
        // Editing reshapes the outer boundary; holes are preserved.
        let outer = LinearRing::new(coordinates)?;
        self.path.base_coordinates = outer.open_points().to_vec();
        Ok(())
    }

    fn focus_coordinates(&self) -> Vec<Coordinate> {
        self.path.base_coordinates.clone()
    }

    fn is_structural_change(&self, update: &DesignUpdate) -> bool {
        update.changes_line_structure(&self.core.design)
            || update.changes_fill_structure(&self.core.design)
    }

    fn refresh_icons(&mut self) -> Result<(), DoraError> {
        let rings = self.transformed_rings()?;
        let anchors = rings[0].open_points().to_vec();
        let attachments = self.core.attachments();
        self.path
            .sync_icon_points(&self.core.design, &anchors, &attachments)
    }

    fn for_each_child(&mut self, visit: &mut dyn FnMut(&mut Point)) {
        for point in &mut self.path.icon_points {
            visit(point);
        }
    }
}
