// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directional positioning model.
//!
//! Every asset owns a [`PositioningEntry`]: either one
//! [`DirectionalPositioningSettings`] shared by all four facings, or one
//! record per facing. Consumers never match on the shape; they call
//! [`PositioningEntry::resolve`] with the instance's facing.
//!
//! The record describes how a sprite is nudged from its pin point on the
//! diamond:
//!
//! - **Invisible margins** compensate for transparent padding in the source
//!   image.
//! - **Vertical bias** lifts the sprite so its visual base meets the
//!   diamond. Auto and manual values are both kept; one is active.
//! - **Diagonal offsets** (tiles) and **wall offsets** (walls) shift along
//!   screen diagonals or edge-relative axes.
//! - **Anchoring** picks the point on the sprite canvas that lands on the
//!   pin, optionally measured within the trimmed [`BoundingBox`].
//!
//! [`AssetSettingsStore`] holds all entries, bumps a version on every change,
//! and marks per-asset invalidation channels so derived caches can be
//! evicted precisely.

mod bbox;
mod positioning;
mod store;

pub use bbox::BoundingBox;
pub use positioning::{
    DirectionalPositioningSettings, Margins, SpriteAnchor, WallOffsets, auto_vertical_bias,
    raw_vertical_bias,
};
pub use store::{
    AssetSettingsStore, ChangeKind, PositioningEntry, SettingsChange, SettingsInvalidation,
    SubscriptionId,
};
