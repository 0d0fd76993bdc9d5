// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change tracking: per-dimension version counters and per-asset channels.
//!
//! Two mechanisms cooperate:
//!
//! - **Version counters**: every state container owns a small counter per
//!   [`Dimension`] it is responsible for and bumps it whenever a setter
//!   actually changes a value. The
//!   [`RenderScheduler`](crate::scheduler::RenderScheduler) compares a
//!   [`VersionVector`] against the one it saw on the previous pass; any
//!   difference makes the frame dirty. Comparison costs one integer compare
//!   per dimension regardless of how much state there is.
//!
//! - **Per-asset channels**: the
//!   [`AssetSettingsStore`](crate::settings::AssetSettingsStore) marks the
//!   affected asset on an [`understory_dirty`] channel for every edit. The
//!   engine drains these before a pass to evict derived-cache entries
//!   ([`POSITIONING`], [`ANCHOR`]) and to recompute auto-computed vertical
//!   biases ([`MARGINS`]). All three channels are local-only: assets do not
//!   depend on each other.

use core::fmt;

use understory_dirty::Channel;

/// Any positioning field of the asset changed.
pub const POSITIONING: Channel = Channel::new(0);

/// Invisible margins changed; the auto-computed vertical bias is stale.
pub const MARGINS: Channel = Channel::new(1);

/// Anchor point or bounding-box anchoring changed; the resolved anchor is
/// stale.
pub const ANCHOR: Channel = Channel::new(2);

/// A tracked dimension of editor state.
///
/// A change in any of these since the last pass makes the next
/// [`render`](crate::engine::Engine::render) redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    /// User pan vector.
    Pan,
    /// Unzoomed diamond width.
    DiamondWidth,
    /// Sprite-local scale factor.
    SpriteScale,
    /// Camera zoom.
    Zoom,
    /// Tile / wall visibility toggles.
    AssetVisibility,
    /// Per-layer grid overlay visibility.
    GridLayerVisibility,
    /// Normal / shadow / invisible layer mode.
    LayerVisibilityMode,
    /// The Z-layer being edited.
    ActiveLayer,
    /// How auto-computed vertical bias is rounded.
    BiasMode,
    /// Width reserved for the side panel.
    SidePanel,
    /// Any per-asset positioning settings.
    Settings,
    /// The set of placed instances.
    Instances,
    /// Grid width or height.
    GridSize,
    /// The Z-layer table (offsets, colors, count).
    Layers,
    /// Host container size.
    Container,
}

impl Dimension {
    /// Number of dimensions.
    pub const COUNT: usize = 15;

    /// All dimensions in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Pan,
        Self::DiamondWidth,
        Self::SpriteScale,
        Self::Zoom,
        Self::AssetVisibility,
        Self::GridLayerVisibility,
        Self::LayerVisibilityMode,
        Self::ActiveLayer,
        Self::BiasMode,
        Self::SidePanel,
        Self::Settings,
        Self::Instances,
        Self::GridSize,
        Self::Layers,
        Self::Container,
    ];

    #[inline]
    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Whether a change in this dimension invalidates the viewport layout.
    #[must_use]
    pub const fn affects_layout(self) -> bool {
        matches!(
            self,
            Self::Pan
                | Self::DiamondWidth
                | Self::Zoom
                | Self::SidePanel
                | Self::GridSize
                | Self::Container
        )
    }
}

/// One version counter per [`Dimension`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VersionVector {
    counters: [u32; Dimension::COUNT],
}

impl VersionVector {
    /// All counters at zero.
    pub const ZERO: Self = Self {
        counters: [0; Dimension::COUNT],
    };

    /// Returns the counter for `dim`.
    #[inline]
    #[must_use]
    pub const fn get(&self, dim: Dimension) -> u32 {
        self.counters[dim as usize]
    }

    /// Increments the counter for `dim`, wrapping on overflow.
    #[inline]
    pub fn bump(&mut self, dim: Dimension) {
        let c = &mut self.counters[dim as usize];
        *c = c.wrapping_add(1);
    }

    /// Overwrites the counter for `dim`.
    #[inline]
    pub fn set(&mut self, dim: Dimension, value: u32) {
        self.counters[dim as usize] = value;
    }

    /// Returns the dimensions whose counters differ between `self` and
    /// `other`.
    #[must_use]
    pub fn diff(&self, other: &Self) -> DimensionSet {
        let mut set = DimensionSet::EMPTY;
        for dim in Dimension::ALL {
            if self.get(dim) != other.get(dim) {
                set.insert(dim);
            }
        }
        set
    }
}

impl fmt::Debug for VersionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for dim in Dimension::ALL {
            map.entry(&dim, &self.get(dim));
        }
        map.finish()
    }
}

/// A set of [`Dimension`]s, stored as a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DimensionSet(u32);

impl DimensionSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Every dimension.
    pub const ALL: Self = Self((1 << Dimension::COUNT) - 1);

    /// Adds a dimension.
    #[inline]
    pub fn insert(&mut self, dim: Dimension) {
        self.0 |= dim.bit();
    }

    /// Whether `dim` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, dim: Dimension) -> bool {
        self.0 & dim.bit() != 0
    }

    /// Whether the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of dimensions in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Raw bitmask (bit `n` is the `n`th variant of [`Dimension`]).
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Rebuilds a set from a raw bitmask, dropping unknown bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Whether any member invalidates the viewport layout.
    #[must_use]
    pub fn affects_layout(self) -> bool {
        self.iter().any(Dimension::affects_layout)
    }

    /// Iterates the members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Dimension> {
        Dimension::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl fmt::Debug for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Dimension> for DimensionSet {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for dim in iter {
            set.insert(dim);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_variant_once() {
        let set: DimensionSet = Dimension::ALL.into_iter().collect();
        assert_eq!(set, DimensionSet::ALL);
        assert_eq!(set.len() as usize, Dimension::COUNT, "no duplicates");
    }

    #[test]
    fn diff_reports_only_bumped_dimensions() {
        let before = VersionVector::ZERO;
        let mut after = before;
        after.bump(Dimension::Zoom);
        after.bump(Dimension::Instances);
        after.bump(Dimension::Instances);

        let changed = after.diff(&before);
        assert!(changed.contains(Dimension::Zoom));
        assert!(changed.contains(Dimension::Instances));
        assert_eq!(changed.len(), 2, "exactly two dimensions changed");
        assert!(before.diff(&before).is_empty());
    }

    #[test]
    fn bump_wraps() {
        let mut v = VersionVector::ZERO;
        v.set(Dimension::Pan, u32::MAX);
        v.bump(Dimension::Pan);
        assert_eq!(v.get(Dimension::Pan), 0);
    }

    #[test]
    fn layout_dimensions() {
        let mut s = DimensionSet::EMPTY;
        s.insert(Dimension::Settings);
        assert!(!s.affects_layout());
        s.insert(Dimension::Container);
        assert!(s.affects_layout());
    }

    #[test]
    fn bits_round_trip_drops_unknown_bits() {
        let mut s = DimensionSet::EMPTY;
        s.insert(Dimension::ActiveLayer);
        assert_eq!(DimensionSet::from_bits(s.bits() | 1 << 31), s);
    }
}
