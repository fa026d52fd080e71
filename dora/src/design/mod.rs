//! Style and configuration model attached to geometries.
//!
//! A [`GeometryDesign`] fully describes how a shape is drawn: line style,
//! fill style and the icons placed along the shape. Mutations arrive as
//! partial [`DesignUpdate`] values; only the fields that are present are
//! applied, the rest of the design is left untouched.

mod color;

pub use color::Color;

use serde::{Deserialize, Serialize};

/// Named line rendering patterns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinePatternName {
    /// A single continuous stroke.
    #[default]
    Solid,
    /// Evenly spaced dashes.
    Dashed,
    /// Short dashes resembling dots.
    Dotted,
}

/// Named fill rendering patterns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillPatternName {
    /// A single filled area.
    #[default]
    Solid,
    /// Horizontal stripes.
    HorizontalStripes,
    /// Vertical stripes.
    VerticalStripes,
    /// Stripes running from south-west to north-east.
    DiagonalUpStripes,
    /// Stripes running from north-west to south-east.
    DiagonalDownStripes,
}

/// Coordinate transform applied to a path before rendering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingMode {
    /// Render the authored coordinates as is.
    #[default]
    None,
    /// Resample into a smooth curve by midpoint subdivision.
    Smooth,
    /// Cut polygon corners into rounded ones. Only meaningful for polygons.
    Round,
}

/// Where along a path an icon anchors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconAlignment {
    /// Midpoint of a 2-point line, middle vertex otherwise.
    #[default]
    Center,
    /// A guaranteed-interior representative point of the shape.
    Centroid,
    /// The vertex with the highest latitude.
    NorthernPoint,
    /// The first vertex.
    FirstEdge,
    /// The last vertex.
    SecondEdge,
}

/// Arrow rendering variants.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrowKind {
    /// A plain line with two head strokes at the end.
    #[default]
    Regular,
    /// Two parallel flank lines of constant width with a polygon head.
    Wide,
    /// Like [`ArrowKind::Wide`], but the width grows toward the head.
    Expanded,
}

/// Line style of a geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineDesign {
    /// Stroke color.
    pub color: Color,
    /// Stroke opacity in `[0, 1]`.
    pub opacity: f64,
    /// Stroke width in pixels.
    pub width: f64,
    /// Stroke pattern.
    pub pattern: LinePatternName,
    /// Coordinate transform applied before the pattern.
    pub smoothing: SmoothingMode,
}

impl Default for LineDesign {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            opacity: 1.0,
            width: 2.0,
            pattern: LinePatternName::default(),
            smoothing: SmoothingMode::default(),
        }
    }
}

/// Fill style of a polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillDesign {
    /// Fill color.
    pub color: Color,
    /// Fill opacity in `[0, 1]`.
    pub opacity: f64,
    /// Fill pattern.
    pub pattern: FillPatternName,
}

impl Default for FillDesign {
    fn default() -> Self {
        Self {
            color: Color::GRAY,
            opacity: 0.4,
            pattern: FillPatternName::default(),
        }
    }
}

/// One icon placed on a path.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconDesign {
    /// URL of the icon image. Engines fall back to their default marker when
    /// absent.
    pub image_url: Option<String>,
    /// Text label shown next to the icon.
    pub label: Option<String>,
    /// Position policy of the icon along the path.
    pub alignment: IconAlignment,
}

/// Arrow geometry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowDesign {
    /// Which arrow variant to render.
    pub kind: ArrowKind,
    /// Head size factor for regular arrows. The tip strokes are
    /// `length / 100 * size` long.
    pub size: f64,
    /// Half-angle of the regular head in degrees.
    pub half_angle_deg: f64,
    /// Width of wide/expanded arrows in meters. Also the length of line
    /// reserved for the head.
    pub gap_width_m: f64,
}

impl Default for ArrowDesign {
    fn default() -> Self {
        Self {
            kind: ArrowKind::default(),
            size: 2.0,
            half_angle_deg: 18.0,
            gap_width_m: 500.0,
        }
    }
}

/// Complete, engine-agnostic description of how a geometry is drawn.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryDesign {
    /// Line style.
    pub line: LineDesign,
    /// Fill style. Ignored by shapes without an area.
    pub fill: FillDesign,
    /// Icons placed along the shape.
    pub icons: Vec<IconDesign>,
    /// Arrow configuration. Present on arrow shapes.
    pub arrow: Option<ArrowDesign>,
    /// Style of the secondary stroke of a double line.
    pub second_line: Option<LineDesign>,
}

/// Partial update of a [`LineDesign`]. Absent fields are left untouched.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineDesignUpdate {
    /// New stroke color, if any.
    pub color: Option<Color>,
    /// New stroke opacity, if any.
    pub opacity: Option<f64>,
    /// New stroke width, if any.
    pub width: Option<f64>,
    /// New stroke pattern, if any.
    pub pattern: Option<LinePatternName>,
    /// New smoothing mode, if any.
    pub smoothing: Option<SmoothingMode>,
}

/// Partial update of a [`FillDesign`]. Absent fields are left untouched.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillDesignUpdate {
    /// New fill color, if any.
    pub color: Option<Color>,
    /// New fill opacity, if any.
    pub opacity: Option<f64>,
    /// New fill pattern, if any.
    pub pattern: Option<FillPatternName>,
}

/// Partial update of a [`GeometryDesign`].
///
/// Each present field is merged into the current design; absent fields are
/// left exactly as they were. The design is never replaced wholesale.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignUpdate {
    /// Line style changes.
    pub line: Option<LineDesignUpdate>,
    /// Fill style changes.
    pub fill: Option<FillDesignUpdate>,
    /// Replacement icon list.
    pub icons: Option<Vec<IconDesign>>,
    /// Replacement arrow configuration.
    pub arrow: Option<ArrowDesign>,
    /// Secondary stroke changes (double lines).
    pub second_line: Option<LineDesignUpdate>,
}

impl LineDesign {
    fn merge(&mut self, update: &LineDesignUpdate) {
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(opacity) = update.opacity {
            self.opacity = opacity;
        }
        if let Some(width) = update.width {
            self.width = width;
        }
        if let Some(pattern) = update.pattern {
            self.pattern = pattern;
        }
        if let Some(smoothing) = update.smoothing {
            self.smoothing = smoothing;
        }
    }
}

impl FillDesign {
    fn merge(&mut self, update: &FillDesignUpdate) {
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(opacity) = update.opacity {
            self.opacity = opacity;
        }
        if let Some(pattern) = update.pattern {
            self.pattern = pattern;
        }
    }
}

impl GeometryDesign {
    /// Merges a partial update into the design.
    pub fn merge(&mut self, update: &DesignUpdate) {
        if let Some(line) = &update.line {
            self.line.merge(line);
        }
        if let Some(fill) = &update.fill {
            self.fill.merge(fill);
        }
        if let Some(icons) = &update.icons {
            self.icons = icons.clone();
        }
        if let Some(arrow) = &update.arrow {
            self.arrow = Some(arrow.clone());
        }
        if let Some(second_line) = &update.second_line {
            self.second_line
                .get_or_insert_with(LineDesign::default)
                .merge(second_line);
        }
    }
}

impl DesignUpdate {
    /// Update setting only the line color.
    pub fn line_color(color: Color) -> Self {
        Self {
            line: Some(LineDesignUpdate {
                color: Some(color),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// The update applied by `mark()`: highlight line and fill colors.
    pub fn mark_highlight() -> Self {
        Self {
            line: Some(LineDesignUpdate {
                color: Some(Color::MARK_HIGHLIGHT),
                ..Default::default()
            }),
            fill: Some(FillDesignUpdate {
                color: Some(Color::MARK_HIGHLIGHT),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// An update restoring the cosmetic attributes of a design, used by
    /// `un_mark()` to push the snapshot back to the native objects.
    pub fn restore_cosmetics(design: &GeometryDesign) -> Self {
        Self {
            line: Some(LineDesignUpdate {
                color: Some(design.line.color),
                opacity: Some(design.line.opacity),
                width: Some(design.line.width),
                ..Default::default()
            }),
            fill: Some(FillDesignUpdate {
                color: Some(design.fill.color),
                opacity: Some(design.fill.opacity),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Whether this update changes the structure of a path's outline, forcing
    /// full regeneration instead of an in-place style change.
    pub fn changes_line_structure(&self, current: &GeometryDesign) -> bool {
        self.line.as_ref().is_some_and(|line| {
            line.pattern.is_some_and(|p| p != current.line.pattern)
                || line.smoothing.is_some_and(|s| s != current.line.smoothing)
        })
    }

    /// Whether this update changes the structure of a polygon's fill.
    pub fn changes_fill_structure(&self, current: &GeometryDesign) -> bool {
        self.fill
            .as_ref()
            .is_some_and(|fill| fill.pattern.is_some_and(|p| p != current.fill.pattern))
    }

    /// Whether this update changes the number of icons on a path.
    pub fn changes_icon_count(&self, current: &GeometryDesign) -> bool {
        self.icons
            .as_ref()
            .is_some_and(|icons| icons.len() != current.icons.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_touches_only_present_fields() {
        let mut design = GeometryDesign::default();
        let original_width = design.line.width;

        design.merge(&DesignUpdate::line_color(Color::WHITE));
        assert_eq!(design.line.color, Color::WHITE);
        assert_eq!(design.line.width, original_width);
        assert_eq!(design.fill, FillDesign::default());
    }

    #[test]
    fn structural_change_detection() {
        let design = GeometryDesign::default();

        let cosmetic = DesignUpdate::line_color(Color::WHITE);
        assert!(!cosmetic.changes_line_structure(&design));

        let structural = DesignUpdate {
            line: Some(LineDesignUpdate {
                pattern: Some(LinePatternName::Dashed),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(structural.changes_line_structure(&design));

        // Setting the pattern to its current value is not a structural change.
        let same_pattern = DesignUpdate {
            line: Some(LineDesignUpdate {
                pattern: Some(LinePatternName::Solid),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!same_pattern.changes_line_structure(&design));
    }

    #[test]
    fn icon_count_change_detection() {
        let mut design = GeometryDesign::default();
        design.icons.push(IconDesign::default());

        let same_count = DesignUpdate {
            icons: Some(vec![IconDesign {
                label: Some("a".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        assert!(!same_count.changes_icon_count(&design));

        let different_count = DesignUpdate {
            icons: Some(vec![]),
            ..Default::default()
        };
        assert!(different_count.changes_icon_count(&design));
    }

    #[test]
    fn partial_update_from_json() {
        let update: DesignUpdate =
            serde_json::from_str(r##"{"line": {"color": "#112233"}}"##).unwrap();
        let line = update.line.as_ref().unwrap();
        assert_eq!(line.color, Some(Color::rgba(0x11, 0x22, 0x33, 255)));
        assert_eq!(line.width, None);
        assert!(update.fill.is_none());
    }
}
