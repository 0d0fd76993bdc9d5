// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contracts.
//!
//! The engine never loads images or draws pixels itself. A host provides
//! two pieces:
//!
//! - **Textures**: implements [`TextureProvider`] so the engine can look
//!   up a texture per asset and facing, the frame size used for
//!   auto-bias and anchoring, and optionally raw pixels for bounding-box
//!   trimming. Loading is the host's business; a texture that is not ready
//!   is simply absent and the engine draws a fallback diamond.
//!
//! - **Presenter**: implements [`Presenter`] to push the pool's sprites and
//!   the grid overlay into a native scene (canvas, GPU batch, DOM).
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_state_changed(engine: &mut Engine, state: &mut EditorState) {
//!     // Cheap when nothing changed: one version compare per dimension.
//!     let outcome = engine.render(state, &textures);
//!     if outcome.redrawn() {
//!         presenter.apply(engine.sprites(), engine.overlay());
//!     }
//! }
//! ```

use core::fmt;

use kurbo::Size;

use crate::direction::Direction;
use crate::grid::AssetId;
use crate::overlay::GridOverlay;
use crate::pool::SpritePool;

/// An opaque reference to a host texture.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({})", self.0)
    }
}

/// Borrowed straight RGBA8 pixels of one sprite frame.
#[derive(Clone, Copy, Debug)]
pub struct SpritePixels<'a> {
    /// Row-major pixels, 4 bytes each.
    pub rgba: &'a [u8],
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// Supplies textures and frame metadata.
pub trait TextureProvider {
    /// The texture for `asset` facing `direction`, if loaded.
    fn texture(&self, asset: AssetId, direction: Direction) -> Option<TextureId>;

    /// The frame size of `asset` in source pixels, if known.
    fn frame_size(&self, asset: AssetId) -> Option<Size>;

    /// Raw pixels of `asset` facing `direction`, for bounding-box trimming.
    ///
    /// Hosts that do not keep pixels in memory can rely on the default,
    /// which disables trimming.
    fn pixels(&self, asset: AssetId, direction: Direction) -> Option<SpritePixels<'_>> {
        _ = (asset, direction);
        None
    }
}

/// Applies a finished pass to a native presentation tree.
pub trait Presenter {
    /// Reads the active sprites (in paint order) and overlay outlines.
    fn apply(&mut self, sprites: &SpritePool, overlay: &GridOverlay);
}
