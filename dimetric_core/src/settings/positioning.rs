// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-asset positioning settings and the auto vertical-bias formula.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Size};

use super::bbox::BoundingBox;
use crate::placement::GridAnchor;
use crate::viewport::VerticalBiasMode;

/// Transparent padding on each side of a sprite's source image, in source
/// pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    /// Above the visible content.
    pub up: f64,
    /// Below the visible content.
    pub down: f64,
    /// Left of the visible content.
    pub left: f64,
    /// Right of the visible content.
    pub right: f64,
}

impl Margins {
    /// No padding.
    pub const ZERO: Self = Self::uniform(0.0);

    /// The same padding on all four sides.
    #[must_use]
    pub const fn uniform(px: f64) -> Self {
        Self {
            up: px,
            down: px,
            left: px,
            right: px,
        }
    }
}

/// Direction-agnostic offsets for walls, resolved per edge by
/// [`wall_offset`](crate::wall::wall_offset).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WallOffsets {
    /// Along the edge the wall occupies.
    pub along_edge: f64,
    /// Toward the center of the cell.
    pub toward_center: f64,
    /// Along the first screen diagonal.
    pub diagonal_a: f64,
    /// Along the second screen diagonal.
    pub diagonal_b: f64,
}

/// Where on the sprite's own canvas the pin point is measured from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SpriteAnchor {
    /// `(0.5, 0.5)`.
    Center,
    /// `(0, 0)`.
    TopLeft,
    /// `(0.5, 0)`.
    TopCenter,
    /// `(1, 0)`.
    TopRight,
    /// `(0, 0.5)`.
    CenterLeft,
    /// `(1, 0.5)`.
    CenterRight,
    /// `(0, 1)`.
    BottomLeft,
    /// `(0.5, 1)`.
    #[default]
    BottomCenter,
    /// `(1, 1)`.
    BottomRight,
    /// Arbitrary normalized coordinates, clamped to `0.0..=1.0`.
    Custom {
        /// Horizontal position, 0 = left edge.
        x: f64,
        /// Vertical position, 0 = top edge.
        y: f64,
    },
}

impl SpriteAnchor {
    /// Normalized `(x, y)` of the anchor.
    #[must_use]
    pub fn normalized(self) -> Point {
        match self {
            Self::Center => Point::new(0.5, 0.5),
            Self::TopLeft => Point::new(0.0, 0.0),
            Self::TopCenter => Point::new(0.5, 0.0),
            Self::TopRight => Point::new(1.0, 0.0),
            Self::CenterLeft => Point::new(0.0, 0.5),
            Self::CenterRight => Point::new(1.0, 0.5),
            Self::BottomLeft => Point::new(0.0, 1.0),
            Self::BottomCenter => Point::new(0.5, 1.0),
            Self::BottomRight => Point::new(1.0, 1.0),
            Self::Custom { x, y } => Point::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)),
        }
    }
}

/// Positioning configuration of one asset (or one facing of an asset).
///
/// Both vertical-bias values are retained; [`use_auto_computed`] selects
/// which one is active so toggling between them never loses the other.
///
/// [`use_auto_computed`]: Self::use_auto_computed
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct DirectionalPositioningSettings {
    /// Transparent padding of the source image.
    pub invisible_margins: Margins,
    /// Bias derived from frame size and margins.
    pub auto_computed_vertical_bias: f64,
    /// Bias entered by the user.
    pub manual_vertical_bias: f64,
    /// Selects [`auto_computed_vertical_bias`](Self::auto_computed_vertical_bias)
    /// over [`manual_vertical_bias`](Self::manual_vertical_bias).
    pub use_auto_computed: bool,
    /// Horizontal screen shift, in source pixels.
    pub manual_horizontal_offset: f64,
    /// Shift along the north-east screen diagonal (tiles).
    pub diagonal_north_east_offset: f64,
    /// Shift along the north-west screen diagonal (tiles).
    pub diagonal_north_west_offset: f64,
    /// Edge-relative shifts (walls).
    pub wall: WallOffsets,
    /// Halve the first diagonal: the north-east offset for tiles, diagonal
    /// A for walls.
    pub use_a_division_for_north_east: bool,
    /// Paint anchor on the sprite canvas.
    pub sprite_anchor: SpriteAnchor,
    /// Interpret the anchor relative to the trimmed bounding box.
    pub use_bounding_box_anchor: bool,
    /// Cached trimmed bounding box, if one has been computed.
    pub bounding_box: Option<BoundingBox>,
    /// Pin point on the diamond; `None` uses the default for the asset kind.
    pub grid_anchor: Option<GridAnchor>,
}

impl DirectionalPositioningSettings {
    /// Settings synthesized for an asset that has none: zero margins and an
    /// active auto-computed bias.
    #[must_use]
    pub fn synthesized(auto_bias: f64) -> Self {
        Self {
            auto_computed_vertical_bias: auto_bias,
            use_auto_computed: true,
            ..Self::default()
        }
    }

    /// The vertical bias currently in effect.
    #[inline]
    #[must_use]
    pub fn active_vertical_bias(&self) -> f64 {
        if self.use_auto_computed {
            self.auto_computed_vertical_bias
        } else {
            self.manual_vertical_bias
        }
    }

    /// Whether the anchor-related fields equal `other`'s.
    #[must_use]
    pub fn same_anchor(&self, other: &Self) -> bool {
        self.sprite_anchor == other.sprite_anchor
            && self.use_bounding_box_anchor == other.use_bounding_box_anchor
            && self.bounding_box == other.bounding_box
    }

    /// Resolves the sprite anchor to full-canvas normalized coordinates.
    ///
    /// With [`use_bounding_box_anchor`](Self::use_bounding_box_anchor) set
    /// and a box available, the anchor is taken as relative to the trimmed
    /// box and remapped onto the full canvas.
    #[must_use]
    pub fn resolved_anchor(&self, bbox: Option<&BoundingBox>) -> Point {
        let anchor = self.sprite_anchor.normalized();
        match (self.use_bounding_box_anchor, bbox.or(self.bounding_box.as_ref())) {
            (true, Some(b)) => b.remap_anchor(anchor),
            _ => anchor,
        }
    }
}

/// The unrounded auto vertical bias for a frame of the given size.
///
/// `bottom = (w - (down + 1)) / 2` is the projected half-width of the
/// sprite's isometric footprint and `effective = h - down - up - 1` its
/// visible height; the bias is their difference.
#[must_use]
pub fn raw_vertical_bias(frame: Size, margins: &Margins) -> f64 {
    let bottom_height = (frame.width - (margins.down + 1.0)) / 2.0;
    let effective_height = frame.height - margins.down - margins.up - 1.0;
    effective_height - bottom_height
}

impl VerticalBiasMode {
    /// Rounds a raw bias. `targets` is only consulted for
    /// [`SnapToNearest`](Self::SnapToNearest); ties go to the earlier
    /// target, and an empty list leaves the value unrounded.
    #[must_use]
    pub fn apply(self, raw: f64, targets: &[f64]) -> f64 {
        match self {
            Self::RoundDown => raw.floor(),
            Self::RoundUp => raw.ceil(),
            Self::SnapToNearest => {
                let mut best: Option<f64> = None;
                for &t in targets {
                    match best {
                        Some(b) if (b - raw).abs() <= (t - raw).abs() => {}
                        _ => best = Some(t),
                    }
                }
                best.unwrap_or(raw)
            }
        }
    }
}

/// Computes the auto vertical bias for a frame: [`raw_vertical_bias`]
/// rounded according to `mode`.
#[must_use]
pub fn auto_vertical_bias(
    frame: Size,
    margins: &Margins,
    mode: VerticalBiasMode,
    targets: &[f64],
) -> f64 {
    mode.apply(raw_vertical_bias(frame, margins), targets)
}
