// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine tuning knobs.

use crate::layers::Rgba8;

/// Tunable constants of the rendering engine.
///
/// Use [`EngineConfig::editor`] (also the [`Default`]) for the values the
/// map editor ships with.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct EngineConfig {
    /// Alpha applied to inactive layers in shadow mode.
    pub shadow_alpha: f32,
    /// Candidate biases for snap-to-nearest rounding. Ties go to the first.
    pub snap_targets: [f64; 2],
    /// Fill of the diamond drawn when a texture is missing.
    pub fallback_color: Rgba8,
    /// How far overlay outlines are pulled inside each diamond, in pixels.
    pub overlay_stroke_inset: f64,
    /// Alpha factor for overlay outlines on inactive layers.
    pub overlay_inactive_alpha: f32,
    /// Skip instances whose diamond lies entirely outside the container.
    pub cull_offscreen: bool,
    /// Pixels with alpha at or below this are treated as transparent when
    /// trimming bounding boxes.
    pub trim_alpha_threshold: u8,
}

impl EngineConfig {
    /// Defaults used by the editor.
    #[must_use]
    pub const fn editor() -> Self {
        Self {
            shadow_alpha: 0.6,
            snap_targets: [36.0, 196.0],
            fallback_color: Rgba8 {
                r: 200,
                g: 80,
                b: 200,
                a: 255,
            },
            overlay_stroke_inset: 0.5,
            overlay_inactive_alpha: 0.35,
            cull_offscreen: false,
            trim_alpha_threshold: 0,
        }
    }

    /// Editor defaults with off-screen culling enabled.
    #[must_use]
    pub const fn culled() -> Self {
        Self {
            cull_offscreen: true,
            ..Self::editor()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::editor()
    }
}
