// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering engine: change detection, settings reconciliation, and
//! the redraw pass behind one [`render`](Engine::render) call.
//!
//! # Render call
//!
//! 1. Merge the editor's [`VersionVector`] with the container version and
//!    let the [`RenderScheduler`] decide. Clean means return
//!    [`PassOutcome::Skipped`] without touching anything.
//! 2. Reconcile settings: drain the per-asset invalidation channels, evict
//!    derived-cache entries they name, synthesize default settings for
//!    placed assets that have none, and refresh auto-computed vertical
//!    biases.
//! 3. Run the pass (see [`scheduler`](crate::scheduler)).
//! 4. Re-read the versions as the new baseline. Reconciliation may have
//!    bumped the settings version; reading the baseline afterwards keeps
//!    that from triggering another redraw.
//!
//! Reconciliation only scans every placed asset when instances, the bias
//! mode, textures or the configuration changed. Otherwise it only visits
//! the assets whose settings were edited.

use alloc::collections::BTreeSet;

use kurbo::{Point, Size, Vec2};

use crate::backend::{Presenter, TextureProvider};
use crate::cache::{CacheStatus, DerivedCache};
use crate::config::EngineConfig;
use crate::direction::Direction;
use crate::dirty::{Dimension, DimensionSet, VersionVector};
use crate::error::RenderFault;
use crate::grid::AssetId;
use crate::iso;
use crate::overlay::GridOverlay;
use crate::pool::SpritePool;
use crate::scheduler::{PassInputs, PassOutcome, RenderScheduler, SchedulerState};
use crate::settings::Margins;
use crate::state::EditorState;
use crate::trace::{
    AutoBiasEvent, FaultEvent, PassBeginEvent, SettingsSynthesizedEvent, SkipEvent, Tracer,
};

/// Result of [`Engine::screen_to_grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScreenHit {
    /// Column under the point.
    pub grid_x: i32,
    /// Row under the point.
    pub grid_y: i32,
    /// Whether the cell lies on the grid.
    pub in_bounds: bool,
}

/// Positions and draws the editor grid.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    scheduler: RenderScheduler,
    cache: DerivedCache,
    container: Size,
    container_version: u32,
    reconcile_all: bool,
}

impl Engine {
    /// Creates an engine for a container of the given size.
    #[must_use]
    pub fn new(config: EngineConfig, container: Size) -> Self {
        Self {
            config,
            scheduler: RenderScheduler::new(),
            cache: DerivedCache::new(),
            container,
            container_version: 0,
            reconcile_all: true,
        }
    }

    // -- Configuration --

    /// Current tuning.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the tuning. Any change clears derived data and forces a
    /// redraw.
    pub fn set_config(&mut self, config: EngineConfig) {
        if self.config == config {
            return;
        }
        self.config = config;
        self.invalidate_textures();
    }

    /// Host container size.
    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }

    /// Records a new container size. Returns `false` if unchanged.
    ///
    /// Only the viewport layout depends on it; the next render recomputes
    /// it and redraws.
    pub fn resize(&mut self, container: Size) -> bool {
        if self.container == container {
            return false;
        }
        self.container = container;
        self.container_version = self.container_version.wrapping_add(1);
        true
    }

    /// Drops every cached bounding box, anchor and bias and forces a redraw.
    ///
    /// Call when textures finished loading or were replaced.
    pub fn invalidate_textures(&mut self) {
        self.cache.clear();
        self.reconcile_all = true;
        self.scheduler.invalidate();
    }

    // -- Render --

    /// Redraws if anything changed since the last redraw.
    ///
    /// Cheap and side-effect free when nothing changed, so it can be called
    /// on every tick or state notification.
    pub fn render(
        &mut self,
        state: &mut EditorState,
        textures: &dyn TextureProvider,
    ) -> PassOutcome {
        self.render_traced(state, textures, &mut Tracer::none())
    }

    /// Like [`render`](Self::render), reporting to `tracer`.
    pub fn render_traced(
        &mut self,
        state: &mut EditorState,
        textures: &dyn TextureProvider,
        tracer: &mut Tracer<'_>,
    ) -> PassOutcome {
        let versions = self.versions(state);
        let panning = state.viewport.camera_panning();
        if self.scheduler.evaluate(&versions, panning) == SchedulerState::Clean {
            tracer.skip(&SkipEvent {
                last_pass_index: self.scheduler.pass_index(),
            });
            return PassOutcome::Skipped;
        }

        let changed = self.scheduler.pending();
        let pass_index = self.scheduler.begin_pass();
        tracer.pass_begin(&PassBeginEvent {
            pass_index,
            changed,
            forced: self.scheduler.forced(),
        });

        let faults = self.reconcile(state, textures, changed, pass_index, tracer);
        let inputs = PassInputs {
            state,
            textures,
            config: &self.config,
            container: self.container,
        };
        let mut summary = self.scheduler.draw(&inputs, &mut self.cache, tracer);
        summary.faults += faults;

        let baseline = self.versions(state);
        self.scheduler.finish_pass(baseline);
        tracer.pass_end(&summary);
        PassOutcome::Redrawn(summary)
    }

    /// Renders and, if a redraw ran, hands the result to `presenter`.
    pub fn render_to(
        &mut self,
        state: &mut EditorState,
        textures: &dyn TextureProvider,
        presenter: &mut dyn Presenter,
    ) -> PassOutcome {
        let outcome = self.render(state, textures);
        if outcome.redrawn() {
            presenter.apply(self.scheduler.sprites(), self.scheduler.overlay());
        }
        outcome
    }

    // -- Queries --

    /// Maps a container-space point to the cell under it on the active
    /// layer.
    ///
    /// Uses the same layout as the last redraw would for the current state,
    /// so picking always agrees with what is drawn.
    #[must_use]
    pub fn screen_to_grid(&self, state: &EditorState, point: Point) -> ScreenHit {
        let grid = &state.grid;
        let viewport = &state.viewport;
        let layout = viewport.layout(self.container, grid.width(), grid.height());
        let lift = state.layers.vertical_offset(viewport.active_layer()) * viewport.zoom();
        let local = point - layout.origin.to_vec2() + Vec2::new(0.0, lift);
        let cell = iso::screen_to_grid(local, layout.effective_diamond_width);
        ScreenHit {
            grid_x: cell.x,
            grid_y: cell.y,
            in_bounds: grid.contains(cell),
        }
    }

    /// Versions of every tracked dimension, container included.
    #[must_use]
    pub fn versions(&self, state: &EditorState) -> VersionVector {
        let mut v = state.versions();
        v.set(Dimension::Container, self.container_version);
        v
    }

    /// Scheduler state after the last render call.
    #[must_use]
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Number of redraws so far.
    #[must_use]
    pub fn pass_index(&self) -> u64 {
        self.scheduler.pass_index()
    }

    /// Sprites of the last redraw, in paint order via
    /// [`SpritePool::iter_active`].
    #[must_use]
    pub fn sprites(&self) -> &SpritePool {
        self.scheduler.sprites()
    }

    /// Grid overlay of the last redraw.
    #[must_use]
    pub fn overlay(&self) -> &GridOverlay {
        self.scheduler.overlay()
    }

    /// Derived-data cache.
    #[must_use]
    pub fn cache(&self) -> &DerivedCache {
        &self.cache
    }

    // -- Internals --

    fn reconcile(
        &mut self,
        state: &mut EditorState,
        textures: &dyn TextureProvider,
        changed: DimensionSet,
        pass_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> u32 {
        let invalidation = state.settings.drain_changes();
        for &asset in &invalidation.anchor {
            self.cache.forget_anchor(asset);
        }
        for &asset in &invalidation.margins {
            self.cache.forget_bias(asset);
        }

        let full = self.reconcile_all
            || changed.contains(Dimension::Instances)
            || changed.contains(Dimension::BiasMode);
        self.reconcile_all = false;

        let placed: BTreeSet<AssetId> = state.grid.iter().map(|i| i.asset).collect();
        let assets: BTreeSet<AssetId> = if full {
            placed.clone()
        } else {
            invalidation
                .positioning
                .iter()
                .copied()
                .filter(|a| placed.contains(a) || state.settings.contains(*a))
                .collect()
        };

        let mode = state.viewport.bias_mode();
        let targets = self.config.snap_targets;
        let mut faults = 0;

        for asset in assets {
            let frame = textures.frame_size(asset);
            if !state.settings.contains(asset) {
                if !placed.contains(&asset) {
                    continue;
                }
                let auto_bias = frame.map_or(0.0, |f| {
                    self.cache
                        .auto_bias(asset, Direction::North, f, &Margins::ZERO, mode, targets)
                        .value
                        .bias
                });
                state.settings.ensure_default(asset, auto_bias);
                report(tracer, &mut faults, pass_index, RenderFault::InvalidSettings { asset });
                tracer.settings_synthesized(&SettingsSynthesizedEvent { asset, auto_bias });
            }
            let Some(frame) = frame else {
                continue;
            };
            let Some(entry) = state.settings.get(asset) else {
                continue;
            };
            let records = if entry.is_per_direction() { 4 } else { 1 };
            for &direction in &Direction::ALL[..records] {
                let Some(margins) = state
                    .settings
                    .resolve(asset, direction)
                    .map(|s| s.invisible_margins)
                else {
                    continue;
                };
                let lookup = self
                    .cache
                    .auto_bias(asset, direction, frame, &margins, mode, targets);
                if lookup.status == CacheStatus::Stale {
                    report(
                        tracer,
                        &mut faults,
                        pass_index,
                        RenderFault::StaleCache { asset, direction },
                    );
                }
                if state
                    .settings
                    .set_auto_bias(asset, direction, lookup.value.bias)
                {
                    tracer.auto_bias(&AutoBiasEvent {
                        asset,
                        direction,
                        raw: lookup.value.raw,
                        bias: lookup.value.bias,
                        mode,
                    });
                }
            }
        }
        faults
    }
}

fn report(tracer: &mut Tracer<'_>, faults: &mut u32, pass_index: u64, fault: RenderFault) {
    *faults += 1;
    tracer.fault(&FaultEvent {
        pass_index,
        instance: None,
        fault,
    });
}
