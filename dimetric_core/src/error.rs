// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable conditions met during a render pass.
//!
//! None of these abort a pass. Each one is reported through the
//! [`TraceSink`](crate::trace::TraceSink) and counted in the
//! [`PassSummary`](crate::trace::PassSummary); the engine always produces a
//! sprite or a fallback diamond for every placed instance it draws.
//!
//! Off-grid positions are not faults: picking reports them through
//! [`ScreenHit::in_bounds`](crate::engine::ScreenHit::in_bounds) and
//! placement rejects them with
//! [`GridError::OutOfBounds`](crate::grid::GridError::OutOfBounds).

use crate::direction::Direction;
use crate::grid::AssetId;

/// A recoverable rendering condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RenderFault {
    /// No texture for the asset's facing; a flat diamond was drawn instead.
    #[error("no texture for asset {} facing {direction}", .asset.0)]
    MissingTexture {
        /// The asset.
        asset: AssetId,
        /// The requested facing.
        direction: Direction,
    },
    /// The asset had no positioning settings; defaults were synthesized.
    #[error("asset {} had no positioning settings", .asset.0)]
    InvalidSettings {
        /// The asset.
        asset: AssetId,
    },
    /// A derived value was computed from outdated inputs and was recomputed.
    #[error("derived data for asset {} facing {direction} was stale", .asset.0)]
    StaleCache {
        /// The asset.
        asset: AssetId,
        /// The facing whose entry was recomputed.
        direction: Direction,
    },
}

impl RenderFault {
    /// Stable numeric code, used by binary trace recorders.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::MissingTexture { .. } => 1,
            Self::InvalidSettings { .. } => 2,
            Self::StaleCache { .. } => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_asset() {
        let f = RenderFault::MissingTexture {
            asset: AssetId(12),
            direction: Direction::West,
        };
        assert_eq!(f.to_string(), "no texture for asset 12 facing W");
        let f = RenderFault::InvalidSettings { asset: AssetId(4) };
        assert_eq!(f.to_string(), "asset 4 had no positioning settings");
    }

    #[test]
    fn codes_are_distinct() {
        let faults = [
            RenderFault::MissingTexture {
                asset: AssetId(0),
                direction: Direction::North,
            },
            RenderFault::InvalidSettings { asset: AssetId(0) },
            RenderFault::StaleCache {
                asset: AssetId(0),
                direction: Direction::North,
            },
        ];
        for (i, a) in faults.iter().enumerate() {
            for b in &faults[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }
}
