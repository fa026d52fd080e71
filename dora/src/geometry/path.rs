//! Shared state of path-like shapes (lines, polygons, arrows).

use std::sync::Arc;

use dora_types::{smoothing, Coordinate};

use crate::design::GeometryDesign;
use crate::engines::MapEngine;
use crate::error::DoraError;
use crate::icon_position::calculate_position_on_path;
use crate::patterns::PathDrafts;
use crate::shapes::Point;

use super::Attachments;

/// Subdivision depth for the smooth transform.
pub(crate) const SMOOTHING_LEVELS: u32 = 4;

/// Authored coordinates, transformation drafts and owned icon points of a
/// path-like shape.
///
/// The drafts are derived state: they are recomputed from the base
/// coordinates on every regeneration and never persisted.
pub(crate) struct PathCore {
    pub base_coordinates: Vec<Coordinate>,
    pub drafts: PathDrafts,
    pub icon_points: Vec<Point>,
    pub engine: Arc<dyn MapEngine>,
}

impl PathCore {
    pub(crate) fn new(engine: Arc<dyn MapEngine>, base_coordinates: Vec<Coordinate>) -> Self {
        Self {
            base_coordinates,
            drafts: PathDrafts::default(),
            icon_points: Vec::new(),
            engine,
        }
    }

    /// The base coordinates resampled into a smooth open curve.
    pub(crate) fn smooth_open(&self) -> Vec<Coordinate> {
        smoothing::smooth_geometry(&self.base_coordinates, false, SMOOTHING_LEVELS)
    }

    /// Reconciles the owned icon points with the design's icon list.
    ///
    /// When the icon count changed the points are rebuilt from scratch;
    /// otherwise the existing points are repositioned and restyled in place.
    /// `anchors` is the transformed path the positions are computed on.
    pub(crate) fn sync_icon_points(
        &mut self,
        design: &GeometryDesign,
        anchors: &[Coordinate],
        attachments: &Attachments,
    ) -> Result<(), DoraError> {
        use crate::geometry::Geometry;

        if design.icons.len() != self.icon_points.len() {
            for mut point in self.icon_points.drain(..) {
                point.remove();
            }
            for icon in &design.icons {
                let Some(position) = calculate_position_on_path(anchors, icon.alignment) else {
                    continue;
                };
                let mut point = Point::for_icon(Arc::clone(&self.engine), position, icon.clone());
                point.mirror_attachments(attachments)?;
                self.icon_points.push(point);
            }
        } else {
            for (point, icon) in self.icon_points.iter_mut().zip(&design.icons) {
                if let Some(position) = calculate_position_on_path(anchors, icon.alignment) {
                    point.set_position(position)?;
                }
                point.set_icon(icon.clone())?;
                point.mirror_attachments(attachments)?;
            }
        }

        Ok(())
    }
}
