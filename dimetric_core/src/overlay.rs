// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid overlay: one diamond outline per cell per visible Z-layer.
//!
//! The overlay follows the per-layer grid-visibility toggles only. Sprite
//! visibility (layer mode, asset toggles) never affects it, and the overlay
//! never affects sprites.

use alloc::vec::Vec;

use kurbo::{Rect, Vec2};

use crate::iso::{self, DiamondCorners, GridCoord};
use crate::layers::{Rgba8, ZLayers};
use crate::viewport::{ViewportLayout, ViewportState};

/// One stroked diamond.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outline {
    /// Z-layer the outline belongs to.
    pub layer: u32,
    /// The cell.
    pub cell: GridCoord,
    /// Vertices, pulled inward by the stroke inset.
    pub corners: DiamondCorners,
    /// Stroke color.
    pub color: Rgba8,
}

/// Parameters for [`GridOverlay::rebuild`].
#[derive(Clone, Copy, Debug)]
pub struct OverlayParams<'a> {
    /// This pass's viewport layout.
    pub layout: &'a ViewportLayout,
    /// Grid width in cells.
    pub grid_width: u32,
    /// Grid height in cells.
    pub grid_height: u32,
    /// View state (zoom, active layer, toggles).
    pub viewport: &'a ViewportState,
    /// Z-layer table.
    pub layers: &'a ZLayers,
    /// Inset applied to every vertex.
    pub stroke_inset: f64,
    /// Alpha factor for layers other than the active one.
    pub inactive_alpha: f32,
    /// When set, outlines entirely outside this rectangle are skipped.
    pub clip: Option<Rect>,
}

/// Outlines for the current pass, grouped by layer from the ground up.
#[derive(Clone, Debug, Default)]
pub struct GridOverlay {
    outlines: Vec<Outline>,
}

impl GridOverlay {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerates every outline, reusing the buffer.
    pub fn rebuild(&mut self, params: &OverlayParams<'_>) {
        self.outlines.clear();
        let d = params.layout.effective_diamond_width;
        let zoom = params.viewport.zoom();
        let active = params.viewport.active_layer();
        let cols = i32::try_from(params.grid_width).unwrap_or(i32::MAX);
        let rows = i32::try_from(params.grid_height).unwrap_or(i32::MAX);
        for (z, layer) in params.layers.iter() {
            if !params.viewport.grid_layer_visible(z) {
                continue;
            }
            let color = if z == active {
                layer.color
            } else {
                layer.color.with_alpha_factor(params.inactive_alpha)
            };
            let lift = Vec2::new(0.0, layer.vertical_offset * zoom);
            for y in 0..rows {
                for x in 0..cols {
                    let cell = GridCoord::new(x, y);
                    let center = params.layout.cell_center(cell) - lift;
                    let corners = iso::diamond_corners(center, d, params.stroke_inset);
                    if let Some(clip) = params.clip {
                        if clip.intersect(corners.bounds()).is_zero_area() {
                            continue;
                        }
                    }
                    self.outlines.push(Outline {
                        layer: z,
                        cell,
                        corners,
                        color,
                    });
                }
            }
        }
    }

    /// Removes every outline.
    pub fn clear(&mut self) {
        self.outlines.clear();
    }

    /// All outlines, ground layer first.
    #[must_use]
    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    /// Number of outlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outlines.len()
    }

    /// Whether there are no outlines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Size;

    use super::*;
    use crate::layers::ZLayerConfig;

    fn layers() -> ZLayers {
        ZLayers::from_layers(vec![
            ZLayerConfig::new("Ground", Rgba8::opaque(76, 175, 80), 0.0),
            ZLayerConfig::new("Upper", Rgba8::opaque(33, 150, 243), 64.0),
        ])
    }

    fn rebuild(vp: &ViewportState, clip: Option<Rect>) -> GridOverlay {
        let layers = layers();
        let layout = vp.layout(Size::new(800.0, 600.0), 4, 3);
        let mut overlay = GridOverlay::new();
        overlay.rebuild(&OverlayParams {
            layout: &layout,
            grid_width: 4,
            grid_height: 3,
            viewport: vp,
            layers: &layers,
            stroke_inset: 0.5,
            inactive_alpha: 0.5,
            clip,
        });
        overlay
    }

    #[test]
    fn one_outline_per_cell_per_visible_layer() {
        let mut vp = ViewportState::new();
        assert_eq!(rebuild(&vp, None).len(), 2 * 4 * 3);
        vp.set_grid_layer_visible(0, false);
        let overlay = rebuild(&vp, None);
        assert_eq!(overlay.len(), 4 * 3);
        assert!(overlay.outlines().iter().all(|o| o.layer == 1));
    }

    #[test]
    fn inactive_layers_are_dimmed() {
        let mut vp = ViewportState::new();
        vp.set_active_layer(1);
        let overlay = rebuild(&vp, None);
        let ground = overlay.outlines().iter().find(|o| o.layer == 0).unwrap();
        let upper = overlay.outlines().iter().find(|o| o.layer == 1).unwrap();
        assert_eq!(ground.color.a, 128);
        assert_eq!(upper.color.a, 255);
    }

    #[test]
    fn upper_layer_outlines_are_lifted() {
        let vp = ViewportState::new();
        let overlay = rebuild(&vp, None);
        let find = |z| {
            overlay
                .outlines()
                .iter()
                .find(|o| o.layer == z && o.cell == GridCoord::new(1, 1))
                .unwrap()
                .corners
        };
        let dy = find(0).south.y - find(1).south.y;
        assert!((dy - 64.0).abs() < 1e-9);
    }

    #[test]
    fn clip_skips_offscreen_cells() {
        let vp = ViewportState::new();
        let overlay = rebuild(&vp, Some(Rect::new(-10.0, -10.0, 0.0, 0.0)));
        assert!(overlay.is_empty());
    }
}
