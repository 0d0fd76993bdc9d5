// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clean/dirty render scheduling and the redraw pass.
//!
//! The [`RenderScheduler`] is a two-state machine. [`evaluate`] compares the
//! current [`VersionVector`] with the baseline recorded at the end of the
//! previous redraw; any difference, a pending forced redraw, or an active
//! camera pan makes it [`Dirty`](SchedulerState::Dirty). A dirty evaluation
//! is followed by [`draw`] and [`finish_pass`], which stores the new baseline
//! and returns to [`Clean`](SchedulerState::Clean).
//!
//! # Pass
//!
//! A redraw is a full rebuild:
//!
//! 1. Compute the viewport layout.
//! 2. Release every sprite drawn last time back to the pool.
//! 3. Filter (asset toggles, layer mode, optional culling) and depth-sort the
//!    instances.
//! 4. For each, acquire a sprite and set its texture, transform and
//!    appearance. A missing texture or frame size draws a flat diamond
//!    instead and reports a fault; the pass continues.
//! 5. Rebuild the grid overlay.
//!
//! The pool is owned here exclusively. Nothing else acquires or releases
//! sprites.
//!
//! [`evaluate`]: RenderScheduler::evaluate
//! [`draw`]: RenderScheduler::draw
//! [`finish_pass`]: RenderScheduler::finish_pass

use kurbo::{Rect, Size};

use crate::backend::TextureProvider;
use crate::cache::{CacheStatus, DerivedCache};
use crate::compositor::{self, CompositeList, CompositeParams};
use crate::config::EngineConfig;
use crate::dirty::{DimensionSet, VersionVector};
use crate::error::RenderFault;
use crate::grid::RenderableInstance;
use crate::overlay::{GridOverlay, OverlayParams};
use crate::placement::{self, PlacementContext};
use crate::pool::{SpriteContent, SpritePool};
use crate::settings::DirectionalPositioningSettings;
use crate::state::EditorState;
use crate::trace::{FaultEvent, PassSummary, Tracer};

/// Scheduler state between render calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Nothing changed since the last redraw.
    Clean,
    /// The next render call redraws.
    #[default]
    Dirty,
}

/// Result of one render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Nothing changed; the pool and overlay are untouched.
    Skipped,
    /// A full redraw ran.
    Redrawn(PassSummary),
}

impl PassOutcome {
    /// Whether the pool and overlay were rebuilt.
    #[must_use]
    pub const fn redrawn(&self) -> bool {
        matches!(self, Self::Redrawn(_))
    }

    /// The pass statistics, if a redraw ran.
    #[must_use]
    pub const fn summary(&self) -> Option<&PassSummary> {
        match self {
            Self::Redrawn(s) => Some(s),
            Self::Skipped => None,
        }
    }
}

/// Everything a pass reads.
#[derive(Clone, Copy)]
pub struct PassInputs<'a> {
    /// Editor state.
    pub state: &'a EditorState,
    /// Texture lookup.
    pub textures: &'a dyn TextureProvider,
    /// Engine tuning.
    pub config: &'a EngineConfig,
    /// Host container size.
    pub container: Size,
}

impl core::fmt::Debug for PassInputs<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PassInputs")
            .field("config", self.config)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

/// Decides when to redraw and owns the sprites a redraw produces.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    state: SchedulerState,
    seen: VersionVector,
    pending: DimensionSet,
    force: bool,
    forced: bool,
    passes: u64,
    pool: SpritePool,
    overlay: GridOverlay,
    list: CompositeList,
}

impl RenderScheduler {
    /// Creates a scheduler whose first evaluation is dirty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    // -- State machine --

    /// Compares `versions` with the last baseline.
    ///
    /// `camera_panning` forces a redraw regardless of versions.
    pub fn evaluate(&mut self, versions: &VersionVector, camera_panning: bool) -> SchedulerState {
        self.pending = versions.diff(&self.seen);
        self.forced = self.force || camera_panning;
        self.state = if self.forced || !self.pending.is_empty() {
            SchedulerState::Dirty
        } else {
            SchedulerState::Clean
        };
        self.state
    }

    /// Forces the next evaluation to be dirty.
    pub fn invalidate(&mut self) {
        self.force = true;
        self.state = SchedulerState::Dirty;
    }

    /// Records `baseline` as seen and returns to clean.
    pub fn finish_pass(&mut self, baseline: VersionVector) {
        self.seen = baseline;
        self.pending = DimensionSet::EMPTY;
        self.force = false;
        self.forced = false;
        self.state = SchedulerState::Clean;
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Dimensions found changed by the last evaluation.
    #[must_use]
    pub fn pending(&self) -> DimensionSet {
        self.pending
    }

    /// Whether the last evaluation was forced.
    #[must_use]
    pub fn forced(&self) -> bool {
        self.forced
    }

    /// Number of redraws started so far.
    #[must_use]
    pub fn pass_index(&self) -> u64 {
        self.passes
    }

    /// Starts a redraw and returns its index.
    pub fn begin_pass(&mut self) -> u64 {
        self.passes += 1;
        self.passes
    }

    // -- Outputs --

    /// The sprite pool.
    #[must_use]
    pub fn sprites(&self) -> &SpritePool {
        &self.pool
    }

    /// The grid overlay.
    #[must_use]
    pub fn overlay(&self) -> &GridOverlay {
        &self.overlay
    }

    // -- Pass --

    /// Rebuilds every sprite and the overlay.
    ///
    /// Call after [`begin_pass`](Self::begin_pass). Faults are traced and
    /// counted; none aborts the pass.
    pub fn draw(
        &mut self,
        inputs: &PassInputs<'_>,
        cache: &mut DerivedCache,
        tracer: &mut Tracer<'_>,
    ) -> PassSummary {
        let pass_index = self.passes;
        let state = inputs.state;
        let config = inputs.config;
        let grid = &state.grid;
        let viewport = &state.viewport;
        let layout = viewport.layout(inputs.container, grid.width(), grid.height());
        let ctx = PlacementContext {
            layout: &layout,
            layers: &state.layers,
            sprite_scale: viewport.sprite_scale(),
            zoom: viewport.zoom(),
        };

        let mut summary = PassSummary {
            pass_index,
            changed: self.pending,
            ..PassSummary::default()
        };
        let mut fault = |summary: &mut PassSummary, instance: &RenderableInstance, f| {
            summary.faults += 1;
            tracer.fault(&FaultEvent {
                pass_index,
                instance: Some(instance.id),
                fault: f,
            });
        };

        // Culling keeps a one-tile margin so sprites overhanging their
        // diamond are not clipped at the container edge.
        let clip = config.cull_offscreen.then(|| {
            Rect::from_origin_size((0.0, 0.0), inputs.container)
                .inflate(layout.effective_diamond_width, layout.tile_height())
        });
        let mut culled = 0_u32;
        let visible = grid.iter().filter(|inst| match clip {
            Some(clip) => {
                let bounds = ctx.diamond(inst.cell, inst.z).bounds();
                let keep = !clip.intersect(bounds).is_zero_area();
                if !keep {
                    culled += 1;
                }
                keep
            }
            None => true,
        });
        compositor::compose_into(
            visible,
            &CompositeParams {
                mode: viewport.layer_visibility_mode(),
                active_layer: viewport.active_layer(),
                asset_visibility: viewport.asset_visibility(),
                shadow_alpha: config.shadow_alpha,
                layers: &state.layers,
            },
            &mut self.list,
        );
        summary.culled = culled;
        summary.hidden = self.list.hidden;

        let created_before = self.pool.allocations();
        self.pool.release_all();

        let fallback_settings = DirectionalPositioningSettings::default();
        for item in &self.list.items {
            let inst = &item.instance;
            let (asset, facing) = (inst.asset, inst.direction);
            let settings = match state.settings.resolve(asset, facing) {
                Some(s) => s,
                None => {
                    fault(&mut summary, inst, RenderFault::InvalidSettings { asset });
                    &fallback_settings
                }
            };
            let bbox = if settings.use_bounding_box_anchor && settings.bounding_box.is_none() {
                cache.bounding_box(asset, facing, inputs.textures, config.trim_alpha_threshold)
            } else {
                None
            };
            let anchor = cache.anchor(asset, facing, settings, bbox);
            if anchor.status == CacheStatus::Stale {
                fault(
                    &mut summary,
                    inst,
                    RenderFault::StaleCache {
                        asset,
                        direction: facing,
                    },
                );
            }
            let frame = inputs.textures.frame_size(asset);
            let placed = placement::place_instance(&ctx, inst, settings, anchor.value, frame);

            let handle = self.pool.acquire();
            self.pool.set_instance(handle, inst.id);
            self.pool
                .set_appearance(handle, item.appearance.alpha, item.appearance.tint);
            match (inputs.textures.texture(asset, facing), placed.transform) {
                (Some(texture), Some(transform)) => {
                    self.pool.set_content(handle, SpriteContent::Texture(texture));
                    self.pool.set_transform(handle, transform);
                }
                _ => {
                    self.pool.set_content(
                        handle,
                        SpriteContent::Diamond {
                            corners: placed.diamond,
                            color: config.fallback_color,
                        },
                    );
                    summary.fallbacks += 1;
                    fault(
                        &mut summary,
                        inst,
                        RenderFault::MissingTexture {
                            asset,
                            direction: facing,
                        },
                    );
                }
            }
            self.pool.set_visible(handle, true);
        }

        self.overlay.rebuild(&OverlayParams {
            layout: &layout,
            grid_width: grid.width(),
            grid_height: grid.height(),
            viewport,
            layers: &state.layers,
            stroke_inset: config.overlay_stroke_inset,
            inactive_alpha: config.overlay_inactive_alpha,
            clip,
        });

        summary.sprites = saturating_u32(self.pool.active_len());
        summary.outlines = saturating_u32(self.overlay.len());
        summary.pool_capacity = self.pool.capacity();
        summary.pool_grown =
            u32::try_from(self.pool.allocations() - created_before).unwrap_or(u32::MAX);
        summary
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
