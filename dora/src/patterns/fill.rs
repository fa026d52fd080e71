//! Fill pattern strategies: solid fill and directional hatching.

use dora_types::LinearRing;

use crate::design::FillPatternName;

use super::stripes::{generate_stripes, StripeOrientation};
use super::{FillDraft, FillPattern};

/// Looks up the strategy for a named fill pattern.
pub fn fill_pattern(name: FillPatternName) -> &'static dyn FillPattern {
    match name {
        FillPatternName::Solid => &Solid,
        FillPatternName::HorizontalStripes => &Stripes(StripeOrientation::Horizontal),
        FillPatternName::VerticalStripes => &Stripes(StripeOrientation::Vertical),
        FillPatternName::DiagonalUpStripes => &Stripes(StripeOrientation::DiagonalUp),
        FillPatternName::DiagonalDownStripes => &Stripes(StripeOrientation::DiagonalDown),
    }
}

struct Solid;

impl FillPattern for Solid {
    fn apply(&self, rings: &[LinearRing]) -> FillDraft {
        FillDraft::Solid(rings.to_vec())
    }
}

struct Stripes(StripeOrientation);

impl FillPattern for Stripes {
    fn apply(&self, rings: &[LinearRing]) -> FillDraft {
        FillDraft::Stripes(generate_stripes(rings, self.0))
    }
}

#[cfg(test)]
mod tests {
    use dora_types::Coordinate;

    use super::*;

    fn unit_square() -> LinearRing {
        LinearRing::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn solid_passes_rings_through() {
        let rings = vec![unit_square()];
        match fill_pattern(FillPatternName::Solid).apply(&rings) {
            FillDraft::Solid(out) => assert_eq!(out.len(), 1),
            FillDraft::Stripes(_) => panic!("expected solid draft"),
        }
    }

    #[test]
    fn hatching_produces_stripe_segments() {
        let rings = vec![unit_square()];
        match fill_pattern(FillPatternName::HorizontalStripes).apply(&rings) {
            FillDraft::Stripes(segments) => assert!(!segments.is_empty()),
            FillDraft::Solid(_) => panic!("expected stripe draft"),
        }
    }
}
