// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Final screen transform of a placed instance.
//!
//! A sprite is positioned in four steps:
//!
//! 1. The instance's cell is mapped to its diamond (viewport origin plus
//!    the forward grid transform), lifted by the Z-layer's vertical offset
//!    scaled by zoom.
//! 2. A [`GridAnchor`] picks the pin point on that diamond.
//! 3. [`positioning_offset`] adds the asset's margin, bias, and diagonal or
//!    wall offsets, scaled by sprite scale and then zoom.
//! 4. [`sprite_transform`] places the sprite so its resolved anchor lands on
//!    the pin: `translate(pin - anchor * size * s) * scale(zoom) *
//!    scale(sprite_scale)`.
//!
//! # Margin rule
//!
//! Margins only compensate vertically. An elevated (`Above`) instance moves
//! down by `bias + margin_down`; a flush (`Below`) instance by `margin_down`
//! alone. Horizontal placement uses `manual_horizontal_offset` only. Tiles
//! and walls follow the same rule.

use kurbo::{Affine, Point, Size, Vec2};

use crate::direction::Direction;
use crate::grid::{AssetKind, RenderableInstance, SnapPosition};
use crate::iso::{self, DiamondCorners, GridCoord};
use crate::layers::ZLayers;
use crate::settings::DirectionalPositioningSettings;
use crate::viewport::ViewportLayout;
use crate::wall;

/// Where on the diamond a sprite is pinned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum GridAnchor {
    /// Diamond center.
    Center,
    /// Top vertex.
    TopVertex,
    /// Right vertex.
    RightVertex,
    /// Bottom vertex.
    BottomVertex,
    /// Left vertex.
    LeftVertex,
    /// Midpoint of the given edge.
    Edge(Direction),
}

impl GridAnchor {
    /// The pin used when settings do not override it: tiles pin to the
    /// bottom vertex, walls to the midpoint of their own edge.
    #[must_use]
    pub const fn default_for(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Tile => Self::BottomVertex,
            AssetKind::Wall(edge) => Self::Edge(edge),
        }
    }

    /// The pin point on `diamond`.
    #[must_use]
    pub fn point(self, diamond: &DiamondCorners) -> Point {
        match self {
            Self::Center => diamond.center(),
            Self::TopVertex => diamond.north,
            Self::RightVertex => diamond.east,
            Self::BottomVertex => diamond.south,
            Self::LeftVertex => diamond.west,
            Self::Edge(d) => diamond.edge_midpoint(d),
        }
    }
}

/// Per-pass inputs shared by every instance.
#[derive(Clone, Copy, Debug)]
pub struct PlacementContext<'a> {
    /// This pass's viewport layout.
    pub layout: &'a ViewportLayout,
    /// Z-layer table.
    pub layers: &'a ZLayers,
    /// Sprite-local scale.
    pub sprite_scale: f64,
    /// Camera zoom.
    pub zoom: f64,
}

impl PlacementContext<'_> {
    /// Screen-space diamond of `cell` on layer `z`.
    #[must_use]
    pub fn diamond(&self, cell: GridCoord, z: u32) -> DiamondCorners {
        let lift = Vec2::new(0.0, self.layers.vertical_offset(z) * self.zoom);
        let center = self.layout.cell_center(cell) - lift;
        iso::diamond_corners(center, self.layout.effective_diamond_width, 0.0)
    }
}

/// Screen delta from the pin point, in screen pixels.
///
/// See the [module docs](self) for the margin rule.
#[must_use]
pub fn positioning_offset(
    settings: &DirectionalPositioningSettings,
    snap: SnapPosition,
    kind: AssetKind,
    sprite_scale: f64,
    zoom: f64,
) -> Vec2 {
    let margin_down = settings.invisible_margins.down;
    let dy = match snap {
        SnapPosition::Above => settings.active_vertical_bias() + margin_down,
        SnapPosition::Below => margin_down,
    };
    let mut delta = Vec2::new(settings.manual_horizontal_offset, dy);
    delta += match kind {
        AssetKind::Tile => wall::diagonal_offset(
            settings.diagonal_north_east_offset,
            settings.diagonal_north_west_offset,
            settings.use_a_division_for_north_east,
        ),
        AssetKind::Wall(edge) => {
            wall::wall_offset(edge, &settings.wall, settings.use_a_division_for_north_east)
        }
    };
    // Sprite-local scale first, then camera zoom.
    delta * sprite_scale * zoom
}

/// Places a sprite of `frame` size so that the normalized `anchor` on its
/// canvas lands on `pin`.
#[must_use]
pub fn sprite_transform(
    pin: Point,
    anchor: Point,
    frame: Size,
    sprite_scale: f64,
    zoom: f64,
) -> Affine {
    let s = sprite_scale * zoom;
    let anchor_px = Vec2::new(anchor.x * frame.width * s, anchor.y * frame.height * s);
    Affine::translate(pin.to_vec2() - anchor_px) * Affine::scale(zoom) * Affine::scale(sprite_scale)
}

/// Where one instance lands on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedSprite {
    /// The instance's diamond, after the layer offset.
    pub diamond: DiamondCorners,
    /// Pin point plus positioning offset.
    pub pin: Point,
    /// Sprite transform; `None` when the frame size is unknown.
    pub transform: Option<Affine>,
}

/// Computes the screen placement of `instance`.
///
/// `anchor` is the resolved full-canvas anchor and `frame` the sprite's
/// frame size, if known.
#[must_use]
pub fn place_instance(
    ctx: &PlacementContext<'_>,
    instance: &RenderableInstance,
    settings: &DirectionalPositioningSettings,
    anchor: Point,
    frame: Option<Size>,
) -> PlacedSprite {
    let diamond = ctx.diamond(instance.cell, instance.z);
    let grid_anchor = settings
        .grid_anchor
        .unwrap_or(GridAnchor::default_for(instance.kind));
    let pin = grid_anchor.point(&diamond)
        + positioning_offset(settings, instance.snap, instance.kind, ctx.sprite_scale, ctx.zoom);
    let transform = frame.map(|f| sprite_transform(pin, anchor, f, ctx.sprite_scale, ctx.zoom));
    PlacedSprite {
        diamond,
        pin,
        transform,
    }
}
