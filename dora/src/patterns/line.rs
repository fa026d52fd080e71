//! Line pattern strategies: solid, dashed, dotted.

use dora_types::{Coordinate, LinearRing};

use crate::design::LinePatternName;
use crate::error::DoraError;

use super::{LinePattern, PathDrafts};

/// Number of dash periods a dashed path is divided into.
const DASH_SEGMENTS: usize = 60;

/// Number of dots placed along a dotted path.
const DOT_SEGMENTS: usize = 120;

/// Looks up the strategy for a named line pattern.
pub fn line_pattern(name: LinePatternName) -> &'static dyn LinePattern {
    match name {
        LinePatternName::Solid => &Solid,
        LinePatternName::Dashed => &Dashed,
        LinePatternName::Dotted => &Dotted,
    }
}

struct Solid;

impl LinePattern for Solid {
    fn apply(&self, coordinates: &[Coordinate], drafts: &mut PathDrafts) -> Result<(), DoraError> {
        drafts.set_single(coordinates.to_vec());
        Ok(())
    }
}

struct Dashed;

impl LinePattern for Dashed {
    fn apply(&self, coordinates: &[Coordinate], drafts: &mut PathDrafts) -> Result<(), DoraError> {
        let sampler = PathSampler::new(coordinates);
        let total = sampler.total();
        if total <= f64::EPSILON {
            drafts.set_single(coordinates.to_vec());
            return Ok(());
        }

        // Dash and gap share one period; a period is 1/60 of the path.
        let dash = total / DASH_SEGMENTS as f64;
        let mut lines = Vec::with_capacity(DASH_SEGMENTS / 2 + 1);
        let mut start = 0.0;
        while start < total {
            let end = (start + dash).min(total);
            lines.push(sampler.slice(start, end));
            start += dash * 2.0;
        }

        drafts.set_multiline(lines);
        Ok(())
    }
}

struct Dotted;

impl LinePattern for Dotted {
    fn apply(&self, coordinates: &[Coordinate], drafts: &mut PathDrafts) -> Result<(), DoraError> {
        let sampler = PathSampler::new(coordinates);
        let total = sampler.total();
        if total <= f64::EPSILON {
            drafts.set_single(coordinates.to_vec());
            return Ok(());
        }

        // Dots are tiny diamonds so engines without zero-length stroke
        // support can render them as filled shapes.
        let spacing = total / DOT_SEGMENTS as f64;
        let radius = spacing / 6.0;
        let mut dots = Vec::with_capacity(DOT_SEGMENTS);
        let mut along = spacing / 2.0;
        while along < total {
            let center = sampler.at(along);
            dots.push(diamond(&center, radius)?);
            along += spacing;
        }

        drafts.set_multipolygon(dots);
        Ok(())
    }
}

fn diamond(center: &Coordinate, radius: f64) -> Result<LinearRing, DoraError> {
    let ring = LinearRing::new(vec![
        Coordinate::with_altitude(center.latitude + radius, center.longitude, center.altitude),
        Coordinate::with_altitude(center.latitude, center.longitude + radius, center.altitude),
        Coordinate::with_altitude(center.latitude - radius, center.longitude, center.altitude),
        Coordinate::with_altitude(center.latitude, center.longitude - radius, center.altitude),
    ])?;
    Ok(ring)
}

/// Arc-length parametrization of a polyline in planar degree space.
pub(crate) struct PathSampler<'a> {
    coordinates: &'a [Coordinate],
    cumulative: Vec<f64>,
}

impl<'a> PathSampler<'a> {
    pub(crate) fn new(coordinates: &'a [Coordinate]) -> Self {
        let mut cumulative = Vec::with_capacity(coordinates.len());
        let mut sum = 0.0;
        cumulative.push(0.0);
        for pair in coordinates.windows(2) {
            sum += pair[0].planar_distance_to(&pair[1]);
            cumulative.push(sum);
        }
        Self {
            coordinates,
            cumulative,
        }
    }

    pub(crate) fn total(&self) -> f64 {
        *self.cumulative.last().unwrap_or(&0.0)
    }

    /// The point at arc length `along`, clamped to the path.
    pub(crate) fn at(&self, along: f64) -> Coordinate {
        let along = along.clamp(0.0, self.total());
        let index = match self
            .cumulative
            .binary_search_by(|probe| probe.partial_cmp(&along).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(exact) => return self.coordinates[exact],
            Err(insertion) => insertion.saturating_sub(1).min(self.coordinates.len() - 2),
        };

        let segment = self.cumulative[index + 1] - self.cumulative[index];
        let t = if segment <= f64::EPSILON {
            0.0
        } else {
            (along - self.cumulative[index]) / segment
        };
        interpolate(&self.coordinates[index], &self.coordinates[index + 1], t)
    }

    /// The sub-path between two arc lengths, keeping interior vertices.
    pub(crate) fn slice(&self, from: f64, to: f64) -> Vec<Coordinate> {
        let mut points = vec![self.at(from)];
        for (index, distance) in self.cumulative.iter().enumerate() {
            if *distance > from && *distance < to {
                points.push(self.coordinates[index]);
            }
        }
        points.push(self.at(to));
        points
    }
}

fn interpolate(a: &Coordinate, b: &Coordinate, t: f64) -> Coordinate {
    Coordinate::with_altitude(
        a.latitude + (b.latitude - a.latitude) * t,
        a.longitude + (b.longitude - a.longitude) * t,
        a.altitude + (b.altitude - a.altitude) * t,
    )
}
