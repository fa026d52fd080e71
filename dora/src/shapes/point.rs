//! A single marker on the map.

use std::sync::Arc;

use dora_types::{Coordinate, WktGeometry};

use crate::design::{DesignUpdate, GeometryDesign, IconDesign};
use crate::engines::{MapEngine, ShapeDraft};
use crate::error::DoraError;
use crate::geometry::{Attachments, Geometry, GeometryCore};
use crate::layer::LayerId;

/// A point geometry rendered as a native marker, optionally with an icon
/// image and label.
///
/// Points also serve as the icon children owned by path shapes.
pub struct Point {
    core: GeometryCore,
    position: Coordinate,
}

impl Point {
    /// Creates a detached point at the given position.
    pub fn new(engine: Arc<dyn MapEngine>, position: Coordinate, design: GeometryDesign) -> Self {
        Self {
            core: GeometryCore::new(engine.create_point_renderer(), design),
            position,
        }
    }

    /// Creates the marker point a path shape owns for one of its icons.
    pub(crate) fn for_icon(
        engine: Arc<dyn MapEngine>,
        position: Coordinate,
        icon: IconDesign,
    ) -> Self {
        let design = GeometryDesign {
            icons: vec![icon],
            ..Default::default()
        };
        Self::new(engine, position, design)
    }

    /// The current position.
    pub fn position(&self) -> Coordinate {
        self.position
    }

    /// Moves the point, regenerating the native marker when present.
    pub fn set_position(&mut self, position: Coordinate) -> Result<(), DoraError> {
        self.position = position;
        if self.core.renderer.is_generated() {
            self.generate_on_map()?;
        }
        Ok(())
    }

    pub(crate) fn set_icon(&mut self, icon: IconDesign) -> Result<(), DoraError> {
        if self.core.design.icons.first() == Some(&icon) {
            return Ok(());
        }
        self.core.design.icons = vec![icon];
        if self.core.renderer.is_generated() {
            self.generate_on_map()?;
        }
        Ok(())
    }

    /// Brings this point's attachments in line with its owning path's.
    pub(crate) fn mirror_attachments(
        &mut self,
        attachments: &Attachments,
    ) -> Result<(), DoraError> {
        if !self.core.renderer.is_generated() {
            self.generate_on_map()?;
        }

        if attachments.added_to_map && !self.core.added_to_map {
            self.core.added_to_map = true;
            self.core.renderer.add_to_map()?;
        }
        for membership in &attachments.layers {
            if !self.core.has_membership(membership.id) {
                self.core.renderer.add_to_layer(membership.handle)?;
                self.core.layers.push(membership.clone());
            }
        }

        self.core.visible = attachments.visible;
        self.core.renderer.set_visibility(attachments.visible);
        Ok(())
    }

    /// Drops the membership mirrored from an owning path's layer.
    pub(crate) fn detach_from_layer(&mut self, layer: LayerId) {
        let Some(membership) = self.core.take_membership(layer) else {
            return;
        };
        self.core.renderer.remove_from_layer(membership.handle);
        if self.core.layers.is_empty() && !self.core.added_to_map {
            self.core.dispose();
        }
    }
}

impl Geometry for Point {
    fn core(&self) -> &GeometryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GeometryCore {
        &mut self.core
    }

    fn generate_on_map(&mut self) -> Result<(), DoraError> {
        self.core.renderer.generate(
            ShapeDraft::Point {
                position: &self.position,
            },
            &self.core.design,
        )?;
        self.core.sync_after_generation()
    }

    fn get_wkt(&self) -> String {
        WktGeometry::Point(self.position).to_wkt()
    }

    fn set_wkt(&mut self, wkt: &str) -> Result<(), DoraError> {
        match WktGeometry::parse(wkt)? {
            WktGeometry::Point(position) => self.set_position(position),
            other => Err(DoraError::GeometryTypeMismatch {
                expected: "POINT",
                actual: other.type_name().to_string(),
            }),
        }
    }

    fn get_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Point(self.position.to_geojson()))
    }

    fn set_geojson(&mut self, geometry: &geojson::Geometry) -> Result<(), DoraError> {
        match &geometry.value {
            geojson::Value::Point(position) => {
                self.set_position(Coordinate::from_geojson(position)?)
            }
            other => Err(DoraError::GeometryTypeMismatch {
                expected: "Point",
                actual: other.type_name().to_string(),
            }),
        }
    }

    fn apply_edited_coordinates(&mut self, coordinates: Vec<Coordinate>) -> Result<(), DoraError> {
        let position = coordinates
            .into_iter()
            .next()
            .ok_or_else(|| DoraError::InvalidGeometry("edited point has no position".into()))?;
        self.position = position;
        Ok(())
    }

    fn focus_coordinates(&self) -> Vec<Coordinate> {
        vec![self.position]
    }

    // A marker's icon image and label live in the native object itself.
    fn is_structural_change(&self, update: &DesignUpdate) -> bool {
        update.icons.is_some()
    }
}
