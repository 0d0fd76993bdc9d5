// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Isometric positioning, depth compositing and render scheduling for
//! tile/wall map editors.
//!
//! `dimetric_core` turns an editor's grid of placed tiles and walls into a
//! depth-ordered list of positioned sprites plus a grid overlay, and does it
//! only when something actually changed. It is `no_std` compatible (with
//! `alloc`), performs no I/O, and never draws pixels itself: textures come
//! from a [`TextureProvider`](backend::TextureProvider) and results go to a
//! [`Presenter`](backend::Presenter).
//!
//! # Architecture
//!
//! ```text
//!   UI controls ──► EditorState (grid, layers, viewport, settings)
//!                        │  version counters
//!                        ▼
//!   Engine::render() ──► RenderScheduler::evaluate() ── Clean ──► Skipped
//!                        │ Dirty
//!                        ▼
//!   reconcile settings (synthesize defaults, auto bias, cache eviction)
//!                        │
//!                        ▼
//!   compute_viewport ──► compose (filter + depth sort) ──► place_instance
//!                        │
//!                        ▼
//!   SpritePool + GridOverlay ──► Presenter::apply()
//! ```
//!
//! **[`iso`]**: Forward and inverse dimetric (2:1) grid transforms and
//! diamond geometry.
//!
//! **[`viewport`]**: View state set by the UI and the layout that centers
//! the grid in the container.
//!
//! **[`settings`]**: Per-asset positioning settings, shared or per facing,
//! with change notification, plus the auto vertical-bias formula and
//! bounding-box trimming.
//!
//! **[`wall`]**: Resolution of direction-agnostic wall offsets into screen
//! deltas for each edge.
//!
//! **[`placement`]**: Grid anchors and the final sprite transform.
//!
//! **[`compositor`]**: Painter's-algorithm ordering and layer visibility
//! modes.
//!
//! **[`dirty`]**: Version counters per tracked dimension and per-asset
//! invalidation channels via `understory_dirty`.
//!
//! **[`scheduler`]**: The clean/dirty state machine and the redraw pass.
//!
//! **[`pool`]**: Struct-of-arrays sprite pool with generational handles.
//!
//! **[`engine`]**: The [`Engine`](engine::Engine) tying the above together,
//! plus pointer picking.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pass instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `serde` (disabled by default): Derives `Serialize`/`Deserialize` for
//!   settings, layers, placements and configuration.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod cache;
pub mod compositor;
pub mod config;
pub mod direction;
pub mod dirty;
pub mod engine;
pub mod error;
pub mod grid;
pub mod iso;
pub mod layers;
pub mod overlay;
pub mod placement;
pub mod pool;
pub mod scheduler;
pub mod settings;
pub mod state;
pub mod trace;
pub mod viewport;
pub mod wall;
