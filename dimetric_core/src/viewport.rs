// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View parameters and the viewport layout computed from them.
//!
//! [`ViewportState`] is mutated by UI controls and read by the engine. Every
//! setter bumps the matching [`Dimension`] counter when, and only when, the
//! value changes.
//!
//! [`compute_viewport`] is the single source of truth for where grid-local
//! `(0, 0)` lands on screen. Sprites, the grid overlay and pointer picking
//! all derive their positions from the same [`ViewportLayout`], so they
//! cannot drift apart.

use alloc::collections::BTreeSet;

use kurbo::{Point, Rect, Size, Vec2};

use crate::dirty::{Dimension, VersionVector};
use crate::iso;

/// How Z-layers other than the active one are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum LayerVisibilityMode {
    /// Every layer at full opacity, untinted.
    #[default]
    Normal,
    /// Inactive layers dimmed and tinted with their layer color.
    Shadow,
    /// Only the active layer is drawn.
    Invisible,
}

/// How the auto-computed vertical bias is rounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum VerticalBiasMode {
    /// `floor(raw)`.
    #[default]
    RoundDown,
    /// `ceil(raw)`.
    RoundUp,
    /// Whichever configured snap target is numerically closest.
    SnapToNearest,
}

/// Independent show/hide toggles for the two asset kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetVisibility {
    /// Draw tiles.
    pub tiles: bool,
    /// Draw walls.
    pub walls: bool,
}

impl Default for AssetVisibility {
    fn default() -> Self {
        Self {
            tiles: true,
            walls: true,
        }
    }
}

/// Everything the user controls about how the grid is viewed.
#[derive(Clone, Debug)]
pub struct ViewportState {
    diamond_width: f64,
    sprite_scale: f64,
    zoom: f64,
    pan: Vec2,
    active_layer: u32,
    hidden_grid_layers: BTreeSet<u32>,
    layer_visibility_mode: LayerVisibilityMode,
    bias_mode: VerticalBiasMode,
    asset_visibility: AssetVisibility,
    side_panel_width: f64,
    camera_panning: bool,
    versions: VersionVector,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new()
    }
}

fn update<T: PartialEq>(
    slot: &mut T,
    value: T,
    versions: &mut VersionVector,
    dim: Dimension,
) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    versions.bump(dim);
    true
}

impl ViewportState {
    /// Default unzoomed diamond width in pixels.
    pub const DEFAULT_DIAMOND_WIDTH: f64 = 64.0;

    /// Creates the default view: 64 px diamonds, unit scale and zoom, no pan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            diamond_width: Self::DEFAULT_DIAMOND_WIDTH,
            sprite_scale: 1.0,
            zoom: 1.0,
            pan: Vec2::ZERO,
            active_layer: 0,
            hidden_grid_layers: BTreeSet::new(),
            layer_visibility_mode: LayerVisibilityMode::Normal,
            bias_mode: VerticalBiasMode::RoundDown,
            asset_visibility: AssetVisibility::default(),
            side_panel_width: 0.0,
            camera_panning: false,
            versions: VersionVector::ZERO,
        }
    }

    // -- Accessors --

    /// Unzoomed diamond width in pixels.
    #[must_use]
    pub fn diamond_width(&self) -> f64 {
        self.diamond_width
    }

    /// Sprite-local scale factor.
    #[must_use]
    pub fn sprite_scale(&self) -> f64 {
        self.sprite_scale
    }

    /// Camera zoom.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// User pan vector in screen pixels.
    #[must_use]
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// The Z-layer being edited.
    #[must_use]
    pub fn active_layer(&self) -> u32 {
        self.active_layer
    }

    /// Whether the grid overlay is drawn for layer `z`. Layers never toggled
    /// are visible.
    #[must_use]
    pub fn grid_layer_visible(&self, z: u32) -> bool {
        !self.hidden_grid_layers.contains(&z)
    }

    /// Current layer visibility mode.
    #[must_use]
    pub fn layer_visibility_mode(&self) -> LayerVisibilityMode {
        self.layer_visibility_mode
    }

    /// Current auto-bias rounding mode.
    #[must_use]
    pub fn bias_mode(&self) -> VerticalBiasMode {
        self.bias_mode
    }

    /// Tile and wall visibility toggles.
    #[must_use]
    pub fn asset_visibility(&self) -> AssetVisibility {
        self.asset_visibility
    }

    /// Width reserved on the left for the side panel.
    #[must_use]
    pub fn side_panel_width(&self) -> f64 {
        self.side_panel_width
    }

    /// Whether a pan gesture is in progress.
    #[must_use]
    pub fn camera_panning(&self) -> bool {
        self.camera_panning
    }

    /// Version counters for the dimensions this state owns.
    #[must_use]
    pub fn versions(&self) -> &VersionVector {
        &self.versions
    }

    // -- Setters --

    /// Sets the unzoomed diamond width. Non-positive or non-finite widths
    /// are ignored.
    pub fn set_diamond_width(&mut self, width: f64) -> bool {
        if !(width.is_finite() && width > 0.0) {
            return false;
        }
        update(
            &mut self.diamond_width,
            width,
            &mut self.versions,
            Dimension::DiamondWidth,
        )
    }

    /// Sets the sprite-local scale. Non-positive or non-finite values are
    /// ignored.
    pub fn set_sprite_scale(&mut self, scale: f64) -> bool {
        if !(scale.is_finite() && scale > 0.0) {
            return false;
        }
        update(
            &mut self.sprite_scale,
            scale,
            &mut self.versions,
            Dimension::SpriteScale,
        )
    }

    /// Sets the camera zoom. Non-positive or non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !(zoom.is_finite() && zoom > 0.0) {
            return false;
        }
        update(&mut self.zoom, zoom, &mut self.versions, Dimension::Zoom)
    }

    /// Sets the pan vector.
    pub fn set_pan(&mut self, pan: Vec2) -> bool {
        update(&mut self.pan, pan, &mut self.versions, Dimension::Pan)
    }

    /// Adds `delta` to the pan vector.
    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        self.set_pan(self.pan + delta)
    }

    /// Selects the Z-layer being edited.
    pub fn set_active_layer(&mut self, z: u32) -> bool {
        update(
            &mut self.active_layer,
            z,
            &mut self.versions,
            Dimension::ActiveLayer,
        )
    }

    /// Shows or hides the grid overlay for layer `z`.
    pub fn set_grid_layer_visible(&mut self, z: u32, visible: bool) -> bool {
        let changed = if visible {
            self.hidden_grid_layers.remove(&z)
        } else {
            self.hidden_grid_layers.insert(z)
        };
        if changed {
            self.versions.bump(Dimension::GridLayerVisibility);
        }
        changed
    }

    /// Selects how inactive layers are drawn.
    pub fn set_layer_visibility_mode(&mut self, mode: LayerVisibilityMode) -> bool {
        update(
            &mut self.layer_visibility_mode,
            mode,
            &mut self.versions,
            Dimension::LayerVisibilityMode,
        )
    }

    /// Selects how auto-computed vertical biases are rounded.
    pub fn set_bias_mode(&mut self, mode: VerticalBiasMode) -> bool {
        update(
            &mut self.bias_mode,
            mode,
            &mut self.versions,
            Dimension::BiasMode,
        )
    }

    /// Sets the tile and wall visibility toggles.
    pub fn set_asset_visibility(&mut self, visibility: AssetVisibility) -> bool {
        update(
            &mut self.asset_visibility,
            visibility,
            &mut self.versions,
            Dimension::AssetVisibility,
        )
    }

    /// Sets the side-panel width. Negative values are clamped to zero.
    pub fn set_side_panel_width(&mut self, width: f64) -> bool {
        update(
            &mut self.side_panel_width,
            width.max(0.0),
            &mut self.versions,
            Dimension::SidePanel,
        )
    }

    /// Marks a pan gesture as started or finished.
    ///
    /// While set, every [`render`](crate::engine::Engine::render) redraws.
    /// The flag itself is not a versioned dimension.
    pub fn set_camera_panning(&mut self, panning: bool) {
        self.camera_panning = panning;
    }

    /// Returns the layout for a given container and grid size.
    #[must_use]
    pub fn layout(&self, container: Size, grid_width: u32, grid_height: u32) -> ViewportLayout {
        compute_viewport(&ViewportInputs {
            container,
            grid_width,
            grid_height,
            diamond_width: self.diamond_width,
            pan: self.pan,
            side_panel_width: self.side_panel_width,
            zoom: self.zoom,
        })
    }
}

/// Inputs to [`compute_viewport`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportInputs {
    /// Host container size in device pixels.
    pub container: Size,
    /// Grid width in cells.
    pub grid_width: u32,
    /// Grid height in cells.
    pub grid_height: u32,
    /// Unzoomed diamond width.
    pub diamond_width: f64,
    /// User pan vector.
    pub pan: Vec2,
    /// Width reserved on the left of the container.
    pub side_panel_width: f64,
    /// Camera zoom.
    pub zoom: f64,
}

/// Result of [`compute_viewport`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportLayout {
    /// Screen position of grid-local `(0, 0)` (the center of cell `(0, 0)`).
    pub origin: Point,
    /// On-screen diamond width (`diamond_width * zoom`).
    pub effective_diamond_width: f64,
    /// Pixel footprint of the whole grid.
    pub scaled_grid_size: Size,
    /// Screen rectangle covered by the footprint.
    pub grid_bounds: Rect,
}

impl ViewportLayout {
    /// On-screen diamond height.
    #[must_use]
    pub fn tile_height(&self) -> f64 {
        iso::tile_height(self.effective_diamond_width)
    }

    /// Screen position of the center of `cell`'s diamond, before any
    /// Z-layer offset.
    #[must_use]
    pub fn cell_center(&self, cell: iso::GridCoord) -> Point {
        self.origin + iso::cell_to_screen(cell, self.effective_diamond_width).to_vec2()
    }
}

/// Computes the screen origin that centers the grid in the container.
///
/// The four extreme cells are transformed with the zoomed diamond width and
/// their bounding box, widened by one diamond, is the grid's pixel
/// footprint. The footprint is centered in the container area right of the
/// side panel, then the pan vector is added.
#[must_use]
pub fn compute_viewport(inputs: &ViewportInputs) -> ViewportLayout {
    let d = inputs.diamond_width * inputs.zoom;
    let tile_h = iso::tile_height(d);
    let last_x = f64::from(inputs.grid_width.max(1) - 1);
    let last_y = f64::from(inputs.grid_height.max(1) - 1);

    let corners = [
        iso::grid_to_screen(0.0, 0.0, d),
        iso::grid_to_screen(last_x, 0.0, d),
        iso::grid_to_screen(0.0, last_y, d),
        iso::grid_to_screen(last_x, last_y, d),
    ];
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in corners {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let footprint = Size::new(max_x - min_x + d, max_y - min_y + tile_h);
    let avail_w = inputs.container.width - inputs.side_panel_width;
    let left = inputs.side_panel_width + (avail_w - footprint.width) / 2.0;
    let top = (inputs.container.height - footprint.height) / 2.0;

    let origin = Point::new(left - min_x + d / 2.0, top - min_y + tile_h / 2.0) + inputs.pan;
    ViewportLayout {
        origin,
        effective_diamond_width: d,
        scaled_grid_size: footprint,
        grid_bounds: Rect::from_origin_size((left, top), footprint) + inputs.pan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> ViewportInputs {
        ViewportInputs {
            container: Size::new(1200.0, 800.0),
            grid_width: 30,
            grid_height: 20,
            diamond_width: 64.0,
            pan: Vec2::ZERO,
            side_panel_width: 0.0,
            zoom: 1.0,
        }
    }

    #[test]
    fn grid_is_centered_in_container() {
        let layout = compute_viewport(&inputs());
        // Extremes: x in [-19*32, 29*32], y in [0, 48*16]. Footprint widens by
        // one diamond.
        assert_eq!(layout.scaled_grid_size, Size::new(48.0 * 32.0 + 64.0, 48.0 * 16.0 + 32.0));
        let b = layout.grid_bounds;
        assert!((b.center() - Point::new(600.0, 400.0)).hypot() < 1e-9, "{b:?}");
        // Cell (0, 0) is the top extreme, so its diamond touches the top edge.
        assert!((layout.origin.y - 16.0 - b.y0).abs() < 1e-9);
    }

    #[test]
    fn side_panel_shifts_center_right() {
        let mut i = inputs();
        i.side_panel_width = 300.0;
        let layout = compute_viewport(&i);
        let expected = 300.0 + (1200.0 - 300.0) / 2.0;
        assert!((layout.grid_bounds.center().x - expected).abs() < 1e-9);
    }

    #[test]
    fn pan_translates_origin_only() {
        let base = compute_viewport(&inputs());
        let mut i = inputs();
        i.pan = Vec2::new(15.0, -7.0);
        let panned = compute_viewport(&i);
        assert_eq!(panned.origin, base.origin + Vec2::new(15.0, -7.0));
        assert_eq!(panned.scaled_grid_size, base.scaled_grid_size);
    }

    #[test]
    fn zoom_scales_diamond_and_footprint() {
        let mut i = inputs();
        i.zoom = 2.0;
        let layout = compute_viewport(&i);
        assert_eq!(layout.effective_diamond_width, 128.0);
        let base = compute_viewport(&inputs());
        assert_eq!(layout.scaled_grid_size.width, base.scaled_grid_size.width * 2.0);
    }

    #[test]
    fn setters_bump_only_on_change() {
        let mut vp = ViewportState::new();
        assert!(!vp.set_zoom(1.0));
        assert_eq!(vp.versions().get(Dimension::Zoom), 0);
        assert!(vp.set_zoom(1.5));
        assert_eq!(vp.versions().get(Dimension::Zoom), 1);
        assert!(!vp.set_zoom(0.0), "non-positive zoom ignored");
        assert!(!vp.set_diamond_width(f64::NAN));

        assert!(vp.grid_layer_visible(3), "untouched layers are visible");
        assert!(vp.set_grid_layer_visible(3, false));
        assert!(!vp.grid_layer_visible(3));
        assert!(vp.grid_layer_visible(2));
        assert!(!vp.set_grid_layer_visible(3, false));
        assert_eq!(vp.versions().get(Dimension::GridLayerVisibility), 1);

        assert!(vp.set_grid_layer_visible(u32::MAX, false));
        assert!(!vp.grid_layer_visible(u32::MAX));
        assert!(vp.set_grid_layer_visible(u32::MAX, true));
        assert!(vp.grid_layer_visible(u32::MAX));
        assert_eq!(vp.versions().get(Dimension::GridLayerVisibility), 3);

        vp.set_camera_panning(true);
        assert!(vp.camera_panning());
        assert_eq!(vp.versions().get(Dimension::Pan), 0, "panning flag is unversioned");
    }

    #[test]
    fn single_cell_grid() {
        let mut i = inputs();
        i.grid_width = 1;
        i.grid_height = 1;
        let layout = compute_viewport(&i);
        assert_eq!(layout.origin, Point::new(600.0, 400.0));
    }
}
