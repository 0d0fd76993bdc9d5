// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editor state the engine reads.

use crate::dirty::{Dimension, VersionVector};
use crate::grid::{GridError, GridState, InstanceId, Placement};
use crate::layers::ZLayers;
use crate::settings::AssetSettingsStore;
use crate::viewport::ViewportState;

/// The four state containers behind one editor view.
///
/// Fields are public: UI code mutates them directly through their own
/// setters, each of which tracks its own versions. The engine only needs
/// [`versions`](Self::versions) to decide whether to redraw.
#[derive(Debug)]
pub struct EditorState {
    /// Grid size and placed instances.
    pub grid: GridState,
    /// Z-layer table.
    pub layers: ZLayers,
    /// View parameters.
    pub viewport: ViewportState,
    /// Per-asset positioning settings.
    pub settings: AssetSettingsStore,
}

impl EditorState {
    /// Creates an empty `width` x `height` grid with only the ground layer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: GridState::new(width, height),
            layers: ZLayers::new(),
            viewport: ViewportState::new(),
            settings: AssetSettingsStore::new(),
        }
    }

    /// Places an instance after checking its Z-layer exists.
    ///
    /// # Errors
    ///
    /// [`GridError::UnknownLayer`] for an unconfigured layer, otherwise
    /// whatever [`GridState::place`] returns.
    pub fn place(&mut self, placement: Placement) -> Result<InstanceId, GridError> {
        if self.layers.get(placement.z).is_none() {
            return Err(GridError::UnknownLayer { z: placement.z });
        }
        self.grid.place(placement)
    }

    /// Current versions of every tracked dimension except
    /// [`Dimension::Container`], which the engine owns.
    #[must_use]
    pub fn versions(&self) -> VersionVector {
        let mut v = *self.viewport.versions();
        v.set(Dimension::Instances, self.grid.instances_version());
        v.set(Dimension::GridSize, self.grid.size_version());
        v.set(Dimension::Layers, self.layers.version());
        v.set(Dimension::Settings, self.settings.version());
        v
    }
}
