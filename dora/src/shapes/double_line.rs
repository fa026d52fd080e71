//! A two-stroke compound line.

use std::sync::Arc;

use dora_types::Coordinate;

use crate::design::{DesignUpdate, GeometryDesign, LineDesign};
use crate::engines::MapEngine;
use crate::error::DoraError;
use crate::geometry::{Geometry, GeometryCore};
use crate::layer::Layer;
use crate::shapes::{Line, Point};

/// A bordered line: two independent [`Line`] geometries sharing coordinates
/// but carrying distinct designs. The secondary (wider) stroke is kept under
/// the primary one.
pub struct DoubleLine {
    primary: Line,
    secondary: Line,
}

impl DoubleLine {
    /// Creates a detached double line. The secondary stroke takes its style
    /// from `design.second_line`, defaulting to the primary style widened
    /// enough to show as a border.
    pub fn new(
        engine: Arc<dyn MapEngine>,
        coordinates: Vec<Coordinate>,
        design: GeometryDesign,
    ) -> Result<Self, DoraError> {
        let secondary_line = design.second_line.clone().unwrap_or_else(|| LineDesign {
            width: design.line.width + 4.0,
            ..design.line.clone()
        });
        let secondary_design = GeometryDesign {
            line: secondary_line,
            ..Default::default()
        };

        Ok(Self {
            secondary: Line::new(Arc::clone(&engine), coordinates.clone(), secondary_design)?,
            primary: Line::new(engine, coordinates, design)?,
        })
    }

    /// The authored coordinates.
    pub fn coordinates(&self) -> &[Coordinate] {
        self.primary.coordinates()
    }

    /// Replaces the coordinates of both strokes.
    pub fn set_coordinates(&mut self, coordinates: Vec<Coordinate>) -> Result<(), DoraError> {
        self.secondary.set_coordinates(coordinates.clone())?;
        self.primary.set_coordinates(coordinates)
    }
}

impl Geometry for DoubleLine {
    fn core(&self) -> &GeometryCore {
        self.primary.core()
    }

    fn core_mut(&mut self) -> &mut GeometryCore {
        self.primary.core_mut()
    }

    fn generate_on_map(&mut self) -> Result<(), DoraError> {
        // Secondary first so the primary stroke draws on top.
        self.secondary.generate_on_map()?;
        self.primary.generate_on_map()
    }

    fn get_wkt(&self) -> String {
        self.primary.get_wkt()
    }

    fn set_wkt(&mut self, wkt: &str) -> Result<(), DoraError> {
        self.primary.set_wkt(wkt)?;
        self.secondary
            .set_coordinates(self.primary.coordinates().to_vec())
    }

    fn get_geojson(&self) -> geojson::Geometry {
        self.primary.get_geojson()
    }

    fn set_geojson(&mut self, geometry: &geojson::Geometry) -> Result<(), DoraError> {
        self.primary.set_geojson(geometry)?;
        self.secondary
            .set_coordinates(self.primary.coordinates().to_vec())
    }

    fn apply_edited_coordinates(&mut self, coordinates: Vec<Coordinate>) -> Result<(), DoraError> {
        self.secondary.apply_edited_coordinates(coordinates.clone())?;
        self.primary.apply_edited_coordinates(coordinates)
    }

    fn focus_coordinates(&self) -> Vec<Coordinate> {
        self.primary.focus_coordinates()
    }

    fn set_design(&mut self, update: &DesignUpdate) -> Result<(), DoraError> {
        let primary_update = DesignUpdate {
            second_line: None,
            ..update.clone()
        };
        self.primary.set_design(&primary_update)?;

        if let Some(second) = &update.second_line {
            // Record the secondary style on the primary design so callers
            // reading `get_design` see the whole compound.
            self.primary.core_mut().design.merge(&DesignUpdate {
                second_line: Some(second.clone()),
                ..Default::default()
            });
            self.secondary.set_design(&DesignUpdate {
                line: Some(second.clone()),
                ..Default::default()
            })?;
        }
        Ok(())
    }

    fn add_to_map(&mut self) -> Result<(), DoraError> {
        self.secondary.add_to_map()?;
        self.primary.add_to_map()
    }

    fn add_to_layer(&mut self, layer: &Layer) -> Result<(), DoraError> {
        self.secondary.add_to_layer(layer)?;
        self.primary.add_to_layer(layer)
    }

    fn remove(&mut self) {
        self.primary.remove();
        self.secondary.remove();
    }

    fn remove_from_layer(&mut self, layer: &Layer) {
        self.primary.remove_from_layer(layer);
        self.secondary.remove_from_layer(layer);
    }

    fn set_visibility(&mut self, visible: bool) {
        self.secondary.set_visibility(visible);
        self.primary.set_visibility(visible);
    }

    fn mark(&mut self) {
        self.secondary.mark();
        self.primary.mark();
    }

    fn un_mark(&mut self) {
        self.secondary.un_mark();
        self.primary.un_mark();
    }

    fn begin_edit(&mut self) -> Result<(), DoraError> {
        self.primary.begin_edit()?;
        self.secondary.core_mut().renderer.set_visibility(false);
        Ok(())
    }

    fn begin_drag(&mut self) -> Result<(), DoraError> {
        self.primary.begin_drag()?;
        self.secondary.core_mut().renderer.set_visibility(false);
        Ok(())
    }

    fn cancel_edit(&mut self) {
        self.primary.cancel_edit();
        let visible = self.secondary.get_visibility();
        self.secondary.core_mut().renderer.set_visibility(visible);
    }

    fn for_each_child(&mut self, visit: &mut dyn FnMut(&mut Point)) {
        self.primary.for_each_child(visit);
    }
}
