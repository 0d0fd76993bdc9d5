// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-layer table.
//!
//! Layers are totally ordered by index; index 0 is the ground layer. Each
//! layer shifts everything placed on it upward by its vertical offset and
//! owns a display color used for shadow tinting and the grid overlay.

use alloc::string::String;
use alloc::vec::Vec;

/// A straight (non-premultiplied) 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// Creates an opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Returns the color with its alpha scaled by `factor` (clamped to
    /// `0.0..=1.0`).
    #[must_use]
    pub fn with_alpha_factor(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "value is clamped to 0.0..=255.0 before the cast"
        )]
        let a = (f32::from(self.a) * f + 0.5).min(255.0) as u8;
        Self { a, ..self }
    }
}

/// Configuration of one Z-layer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ZLayerConfig {
    /// Display name.
    pub name: String,
    /// Tint for shadow mode and overlay stroke color.
    pub color: Rgba8,
    /// Screen-space upward shift, in unzoomed pixels.
    pub vertical_offset: f64,
}

impl ZLayerConfig {
    /// Creates a layer.
    #[must_use]
    pub fn new(name: impl Into<String>, color: Rgba8, vertical_offset: f64) -> Self {
        Self {
            name: name.into(),
            color,
            vertical_offset,
        }
    }
}

/// Ordered list of Z-layers with change tracking.
#[derive(Clone, Debug)]
pub struct ZLayers {
    layers: Vec<ZLayerConfig>,
    version: u32,
}

impl Default for ZLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl ZLayers {
    /// Color used for a layer index with no configuration.
    pub const UNCONFIGURED_COLOR: Rgba8 = Rgba8::opaque(128, 128, 128);

    /// Creates a table holding only a ground layer with no offset.
    #[must_use]
    pub fn new() -> Self {
        Self::from_layers(alloc::vec![ZLayerConfig::new(
            "Ground",
            Rgba8::opaque(76, 175, 80),
            0.0
        )])
    }

    /// Creates a table from an explicit list.
    ///
    /// # Panics
    ///
    /// Panics if `layers` is empty; the ground layer always exists.
    #[must_use]
    pub fn from_layers(layers: Vec<ZLayerConfig>) -> Self {
        assert!(!layers.is_empty(), "layer table needs a ground layer");
        Self { layers, version: 0 }
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the layer at `z`, if configured.
    #[must_use]
    pub fn get(&self, z: u32) -> Option<&ZLayerConfig> {
        self.layers.get(z as usize)
    }

    /// Iterates layers from the ground up.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &ZLayerConfig)> {
        (0_u32..).zip(self.layers.iter())
    }

    /// Vertical offset of layer `z` in unzoomed pixels (0 if unconfigured).
    #[must_use]
    pub fn vertical_offset(&self, z: u32) -> f64 {
        self.get(z).map_or(0.0, |l| l.vertical_offset)
    }

    /// Display color of layer `z`.
    #[must_use]
    pub fn color(&self, z: u32) -> Rgba8 {
        self.get(z).map_or(Self::UNCONFIGURED_COLOR, |l| l.color)
    }

    /// Appends a layer above the current top and returns its index.
    pub fn push(&mut self, layer: ZLayerConfig) -> u32 {
        self.layers.push(layer);
        self.bump();
        u32::try_from(self.layers.len() - 1).unwrap_or(u32::MAX)
    }

    /// Changes the vertical offset of layer `z`. Returns `false` if the
    /// layer does not exist.
    pub fn set_vertical_offset(&mut self, z: u32, offset: f64) -> bool {
        match self.layers.get_mut(z as usize) {
            Some(l) => {
                if l.vertical_offset != offset {
                    l.vertical_offset = offset;
                    self.bump();
                }
                true
            }
            None => false,
        }
    }

    /// Changes the display color of layer `z`. Returns `false` if the layer
    /// does not exist.
    pub fn set_color(&mut self, z: u32, color: Rgba8) -> bool {
        match self.layers.get_mut(z as usize) {
            Some(l) => {
                if l.color != color {
                    l.color = color;
                    self.bump();
                }
                true
            }
            None => false,
        }
    }

    /// Change counter for the layer table.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
