// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized per-sprite derived data.
//!
//! Three values are expensive enough (or change rarely enough) to keep
//! between passes, each keyed by `(AssetId, Direction)`:
//!
//! - the trimmed [`BoundingBox`], from a scan of the sprite's pixels;
//! - the resolved full-canvas sprite anchor;
//! - the auto-computed vertical bias.
//!
//! Anchor and bias entries store the inputs they were computed from. A lookup
//! with different inputs recomputes the value and reports
//! [`CacheStatus::Stale`], which the engine surfaces as a
//! [`RenderFault::StaleCache`](crate::error::RenderFault::StaleCache) trace
//! event. Stale entries are never an error: the cache can be cleared at any
//! time and only costs recomputation.

use alloc::collections::BTreeMap;

use kurbo::{Point, Size};

use crate::backend::TextureProvider;
use crate::direction::Direction;
use crate::grid::AssetId;
use crate::settings::{BoundingBox, DirectionalPositioningSettings, Margins, SpriteAnchor};
use crate::viewport::VerticalBiasMode;

/// How a cache lookup was served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// The stored value matched the inputs.
    Hit,
    /// Nothing was stored; the value was computed.
    Computed,
    /// A value was stored under different inputs and was recomputed.
    Stale,
}

/// A cached value plus how it was obtained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lookup<T> {
    /// The value.
    pub value: T,
    /// How the lookup was served.
    pub status: CacheStatus,
}

/// An auto vertical bias before and after rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoBias {
    /// [`raw_vertical_bias`](crate::settings::raw_vertical_bias).
    pub raw: f64,
    /// The rounded bias.
    pub bias: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct AnchorInputs {
    sprite_anchor: SpriteAnchor,
    use_bounding_box: bool,
    bounding_box: Option<BoundingBox>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BiasInputs {
    frame: Size,
    margins: Margins,
    mode: VerticalBiasMode,
    targets: [f64; 2],
}

#[derive(Clone, Copy, Debug, Default)]
struct Entry {
    // `Some(None)` records a fully transparent frame.
    bounding_box: Option<Option<BoundingBox>>,
    anchor: Option<(AnchorInputs, Point)>,
    bias: Option<(BiasInputs, AutoBias)>,
}

/// Derived-data cache keyed by asset and facing.
#[derive(Clone, Debug, Default)]
pub struct DerivedCache {
    entries: BTreeMap<(AssetId, Direction), Entry>,
}

impl DerivedCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed bounding box of `asset` facing `direction`.
    ///
    /// Pixels are scanned once per key. When the provider has no pixels
    /// the result is `None` and nothing is stored, so a later lookup retries.
    pub fn bounding_box(
        &mut self,
        asset: AssetId,
        direction: Direction,
        textures: &dyn TextureProvider,
        alpha_threshold: u8,
    ) -> Option<BoundingBox> {
        if let Some(entry) = self.entries.get(&(asset, direction)) {
            if let Some(bbox) = entry.bounding_box {
                return bbox;
            }
        }
        let pixels = textures.pixels(asset, direction)?;
        let bbox = BoundingBox::trim(pixels.rgba, pixels.width, pixels.height, alpha_threshold);
        self.entries
            .entry((asset, direction))
            .or_default()
            .bounding_box = Some(bbox);
        bbox
    }

    /// Returns the resolved full-canvas anchor for `settings`.
    ///
    /// `bbox` is the trimmed box to use when the settings carry none.
    pub fn anchor(
        &mut self,
        asset: AssetId,
        direction: Direction,
        settings: &DirectionalPositioningSettings,
        bbox: Option<BoundingBox>,
    ) -> Lookup<Point> {
        let inputs = AnchorInputs {
            sprite_anchor: settings.sprite_anchor,
            use_bounding_box: settings.use_bounding_box_anchor,
            bounding_box: settings.bounding_box.or(bbox),
        };
        let entry = self.entries.entry((asset, direction)).or_default();
        let status = match entry.anchor {
            Some((stored, value)) if stored == inputs => {
                return Lookup {
                    value,
                    status: CacheStatus::Hit,
                };
            }
            Some(_) => CacheStatus::Stale,
            None => CacheStatus::Computed,
        };
        let value = settings.resolved_anchor(inputs.bounding_box.as_ref());
        entry.anchor = Some((inputs, value));
        Lookup { value, status }
    }

    /// Returns the auto vertical bias of a `frame` with `margins`.
    pub fn auto_bias(
        &mut self,
        asset: AssetId,
        direction: Direction,
        frame: Size,
        margins: &Margins,
        mode: VerticalBiasMode,
        targets: [f64; 2],
    ) -> Lookup<AutoBias> {
        let inputs = BiasInputs {
            frame,
            margins: *margins,
            mode,
            targets,
        };
        let entry = self.entries.entry((asset, direction)).or_default();
        let status = match entry.bias {
            Some((stored, value)) if stored == inputs => {
                return Lookup {
                    value,
                    status: CacheStatus::Hit,
                };
            }
            Some(_) => CacheStatus::Stale,
            None => CacheStatus::Computed,
        };
        let raw = crate::settings::raw_vertical_bias(frame, margins);
        let value = AutoBias {
            raw,
            bias: mode.apply(raw, &targets),
        };
        entry.bias = Some((inputs, value));
        Lookup { value, status }
    }

    /// Drops the resolved anchors of `asset`, keeping its bounding boxes.
    pub fn forget_anchor(&mut self, asset: AssetId) {
        for d in Direction::ALL {
            if let Some(e) = self.entries.get_mut(&(asset, d)) {
                e.anchor = None;
            }
        }
    }

    /// Drops the auto biases of `asset`, keeping its bounding boxes.
    pub fn forget_bias(&mut self, asset: AssetId) {
        for d in Direction::ALL {
            if let Some(e) = self.entries.get_mut(&(asset, d)) {
                e.bias = None;
            }
        }
    }

    /// Drops everything cached for `asset`.
    pub fn evict(&mut self, asset: AssetId) {
        for d in Direction::ALL {
            self.entries.remove(&(asset, d));
        }
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of `(asset, direction)` keys with any cached value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;

    use super::*;
    use crate::backend::{SpritePixels, TextureId};

    const TARGETS: [f64; 2] = [36.0, 196.0];
    const ROCK: AssetId = AssetId(5);

    struct Pixels {
        rgba: Vec<u8>,
        scans: Cell<u32>,
    }

    impl Pixels {
        // 4x4 frame with an opaque 2x2 block at (1, 2).
        fn block() -> Self {
            let mut rgba = vec![0_u8; 4 * 4 * 4];
            for (x, y) in [(1, 2), (2, 2), (1, 3), (2, 3)] {
                rgba[(y * 4 + x) * 4 + 3] = 255;
            }
            Self {
                rgba,
                scans: Cell::new(0),
            }
        }
    }

    impl TextureProvider for Pixels {
        fn texture(&self, _: AssetId, _: Direction) -> Option<TextureId> {
            Some(TextureId(0))
        }

        fn frame_size(&self, _: AssetId) -> Option<Size> {
            Some(Size::new(4.0, 4.0))
        }

        fn pixels(&self, _: AssetId, _: Direction) -> Option<SpritePixels<'_>> {
            self.scans.set(self.scans.get() + 1);
            Some(SpritePixels {
                rgba: &self.rgba,
                width: 4,
                height: 4,
            })
        }
    }

    struct NoPixels;

    impl TextureProvider for NoPixels {
        fn texture(&self, _: AssetId, _: Direction) -> Option<TextureId> {
            None
        }

        fn frame_size(&self, _: AssetId) -> Option<Size> {
            None
        }
    }

    #[test]
    fn bounding_box_is_scanned_once() {
        let tex = Pixels::block();
        let mut cache = DerivedCache::new();
        let a = cache.bounding_box(ROCK, Direction::North, &tex, 0).unwrap();
        let b = cache.bounding_box(ROCK, Direction::North, &tex, 0).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.x, a.y, a.width, a.height), (1, 2, 2, 2));
        assert_eq!(tex.scans.get(), 1, "second lookup served from cache");

        cache.bounding_box(ROCK, Direction::East, &tex, 0);
        assert_eq!(tex.scans.get(), 2, "keyed per direction");
    }

    #[test]
    fn missing_pixels_are_not_memoized() {
        let mut cache = DerivedCache::new();
        assert_eq!(cache.bounding_box(ROCK, Direction::North, &NoPixels, 0), None);
        assert!(cache.is_empty());
    }

    fn reference_bias(cache: &mut DerivedCache, mode: VerticalBiasMode) -> Lookup<AutoBias> {
        let frame = Size::new(128.0, 160.0);
        cache.auto_bias(ROCK, Direction::North, frame, &Margins::uniform(8.0), mode, TARGETS)
    }

    #[test]
    fn auto_bias_reports_stale_inputs() {
        let mut cache = DerivedCache::new();
        let first = reference_bias(&mut cache, VerticalBiasMode::RoundDown);
        assert_eq!(first.status, CacheStatus::Computed);
        assert_eq!(first.value, AutoBias { raw: 83.5, bias: 83.0 });

        let again = reference_bias(&mut cache, VerticalBiasMode::RoundDown);
        assert_eq!(again.status, CacheStatus::Hit);

        let snapped = reference_bias(&mut cache, VerticalBiasMode::SnapToNearest);
        assert_eq!(snapped.status, CacheStatus::Stale, "mode is an input");
        assert_eq!(snapped.value.bias, 36.0);

        cache.forget_bias(ROCK);
        let fresh = reference_bias(&mut cache, VerticalBiasMode::RoundUp);
        assert_eq!(fresh.status, CacheStatus::Computed, "forgotten, not stale");
        assert_eq!(fresh.value.bias, 84.0);
    }

    #[test]
    fn anchor_follows_bounding_box_mode() {
        let tex = Pixels::block();
        let mut cache = DerivedCache::new();
        let bbox = cache.bounding_box(ROCK, Direction::North, &tex, 0);
        let mut s = DirectionalPositioningSettings::default();

        let full = cache.anchor(ROCK, Direction::North, &s, bbox);
        assert_eq!(full.value, Point::new(0.5, 1.0));
        assert_eq!(full.status, CacheStatus::Computed);

        s.use_bounding_box_anchor = true;
        let trimmed = cache.anchor(ROCK, Direction::North, &s, bbox);
        assert_eq!(trimmed.status, CacheStatus::Stale);
        // Bottom-center of the 2x2 block at (1, 2) on a 4x4 canvas.
        assert_eq!(trimmed.value, Point::new(0.5, 1.0));

        s.sprite_anchor = SpriteAnchor::TopLeft;
        let corner = cache.anchor(ROCK, Direction::North, &s, bbox);
        assert_eq!(corner.value, Point::new(0.25, 0.5));

        cache.forget_anchor(ROCK);
        assert_eq!(
            cache.anchor(ROCK, Direction::North, &s, bbox).status,
            CacheStatus::Computed
        );
    }

    #[test]
    fn evict_and_clear() {
        let tex = Pixels::block();
        let mut cache = DerivedCache::new();
        for d in Direction::ALL {
            cache.bounding_box(ROCK, d, &tex, 0);
        }
        cache.bounding_box(AssetId(6), Direction::North, &tex, 0);
        assert_eq!(cache.len(), 5);
        cache.evict(ROCK);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
