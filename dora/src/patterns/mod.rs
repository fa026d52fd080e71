//! Line and fill pattern strategies.
//!
//! Patterns transform a shape's coordinates into *drafts*: intermediate
//! coordinate collections the engine adapters consume to build native
//! objects. A solid pattern passes the coordinates through as a single draft;
//! decomposing patterns (dashes, dots, stripes) write multi-part drafts.

mod fill;
mod line;
pub(crate) mod stripes;

pub use fill::fill_pattern;
pub use line::line_pattern;

use dora_types::{Coordinate, LinearRing};

/// Outline drafts of a path-like shape.
///
/// After a line pattern runs, exactly one of the three containers is
/// populated. Setting one clears the others.
#[derive(Debug, Default, Clone)]
pub struct PathDrafts {
    single: Option<Vec<Coordinate>>,
    multiline: Option<Vec<Vec<Coordinate>>>,
    multipolygon: Option<Vec<LinearRing>>,
}

impl PathDrafts {
    /// The single-path draft, when populated.
    pub fn single(&self) -> Option<&[Coordinate]> {
        self.single.as_deref()
    }

    /// The multi-line draft, when populated.
    pub fn multiline(&self) -> Option<&[Vec<Coordinate>]> {
        self.multiline.as_deref()
    }

    /// The multi-polygon draft, when populated.
    pub fn multipolygon(&self) -> Option<&[LinearRing]> {
        self.multipolygon.as_deref()
    }

    /// Whether no draft has been produced yet.
    pub fn is_empty(&self) -> bool {
        self.single.is_none() && self.multiline.is_none() && self.multipolygon.is_none()
    }

    pub(crate) fn set_single(&mut self, coordinates: Vec<Coordinate>) {
        self.single = Some(coordinates);
        self.multiline = None;
        self.multipolygon = None;
    }

    pub(crate) fn set_multiline(&mut self, lines: Vec<Vec<Coordinate>>) {
        self.multiline = Some(lines);
        self.single = None;
        self.multipolygon = None;
    }

    pub(crate) fn set_multipolygon(&mut self, polygons: Vec<LinearRing>) {
        self.multipolygon = Some(polygons);
        self.single = None;
        self.multiline = None;
    }
}

/// Fill draft of a polygon, produced independently of the outline draft.
#[derive(Debug, Clone)]
pub enum FillDraft {
    /// One solid area: the outer ring followed by hole rings.
    Solid(Vec<LinearRing>),
    /// Hatching: a list of stripe segments crossing the area.
    Stripes(Vec<[Coordinate; 2]>),
}

impl Default for FillDraft {
    fn default() -> Self {
        Self::Solid(Vec::new())
    }
}

/// A line rendering strategy selected by [`crate::design::LinePatternName`].
pub trait LinePattern: Sync {
    /// Decomposes the path into drafts. `coordinates` is the transformed
    /// (smoothed) path; for rings it is closed (first point repeated last).
    fn apply(
        &self,
        coordinates: &[Coordinate],
        drafts: &mut PathDrafts,
    ) -> Result<(), crate::error::DoraError>;
}

/// A fill rendering strategy selected by [`crate::design::FillPatternName`].
pub trait FillPattern: Sync {
    /// Produces the fill draft from the polygon's transformed rings.
    fn apply(&self, rings: &[LinearRing]) -> FillDraft;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn drafts_are_mutually_exclusive() {
        let mut drafts = PathDrafts::default();
        assert!(drafts.is_empty());

        drafts.set_single(vec![coord(0.0, 0.0), coord(1.0, 1.0)]);
        assert!(drafts.single().is_some());

        drafts.set_multiline(vec![vec![coord(0.0, 0.0), coord(1.0, 1.0)]]);
        assert!(drafts.single().is_none());
        assert!(drafts.multiline().is_some());
        assert!(drafts.multipolygon().is_none());

        drafts.set_single(vec![coord(2.0, 2.0)]);
        assert!(drafts.multiline().is_none());
        assert!(drafts.single().is_some());
    }
}
