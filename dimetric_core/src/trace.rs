// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for render passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the engine calls while evaluating and running passes. All method bodies
//! default to no-ops, so implementing only the events you care about is
//! fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing. When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Ready-made sinks (pretty printing, binary recording, JSON export) live in
//! the `dimetric_debug` crate.

use crate::direction::Direction;
use crate::dirty::DimensionSet;
use crate::error::RenderFault;
use crate::grid::{AssetId, InstanceId};
use crate::viewport::VerticalBiasMode;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a pass starts redrawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassBeginEvent {
    /// Monotonic pass counter (counts redraws, not skips).
    pub pass_index: u64,
    /// Dimensions that changed since the previous redraw.
    pub changed: DimensionSet,
    /// Whether the redraw was forced (camera panning, first pass, or an
    /// explicit invalidation) rather than caused by a change.
    pub forced: bool,
}

/// Per-pass statistics, emitted when a redraw finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Pass counter.
    pub pass_index: u64,
    /// Dimensions that changed since the previous redraw.
    pub changed: DimensionSet,
    /// Sprites drawn (textured and fallback).
    pub sprites: u32,
    /// Sprites drawn as fallback diamonds.
    pub fallbacks: u32,
    /// Instances excluded by visibility toggles or layer mode.
    pub hidden: u32,
    /// Instances skipped by off-screen culling.
    pub culled: u32,
    /// Grid overlay outlines produced.
    pub outlines: u32,
    /// Pool slots after the pass.
    pub pool_capacity: u32,
    /// Pool slots created during this pass.
    pub pool_grown: u32,
    /// Faults reported during this pass.
    pub faults: u32,
}

/// Emitted for every [`RenderFault`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// The instance being drawn, if the fault is tied to one.
    pub instance: Option<InstanceId>,
    /// What happened.
    pub fault: RenderFault,
}

/// Emitted when default settings are created for an asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettingsSynthesizedEvent {
    /// The asset.
    pub asset: AssetId,
    /// Auto bias stored in the synthesized record.
    pub auto_bias: f64,
}

/// Emitted when an auto vertical bias is recomputed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoBiasEvent {
    /// The asset.
    pub asset: AssetId,
    /// The facing whose record was updated.
    pub direction: Direction,
    /// Unrounded bias.
    pub raw: f64,
    /// Bias after rounding.
    pub bias: f64,
    /// Rounding mode used.
    pub mode: VerticalBiasMode,
}

/// Emitted when a render call finds nothing to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkipEvent {
    /// Index of the most recent redraw.
    pub last_pass_index: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a redraw starts.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called when a redraw finishes.
    fn on_pass_end(&mut self, s: &PassSummary) {
        _ = s;
    }

    /// Called for every recoverable fault.
    fn on_fault(&mut self, e: &FaultEvent) {
        _ = e;
    }

    /// Called when default settings are created for an asset.
    fn on_settings_synthesized(&mut self, e: &SettingsSynthesizedEvent) {
        _ = e;
    }

    /// Called when an auto vertical bias is recomputed.
    fn on_auto_bias(&mut self, e: &AutoBiasEvent) {
        _ = e;
    }

    /// Called when a render call is skipped because nothing changed.
    fn on_skip(&mut self, e: &SkipEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassSummary`].
    #[inline]
    pub fn pass_end(&mut self, s: &PassSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_pass_end(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`FaultEvent`].
    #[inline]
    pub fn fault(&mut self, e: &FaultEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fault(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SettingsSynthesizedEvent`].
    #[inline]
    pub fn settings_synthesized(&mut self, e: &SettingsSynthesizedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_settings_synthesized(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AutoBiasEvent`].
    #[inline]
    pub fn auto_bias(&mut self, e: &AutoBiasEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_auto_bias(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SkipEvent`].
    #[inline]
    pub fn skip(&mut self, e: &SkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_skip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fault() -> FaultEvent {
        FaultEvent {
            pass_index: 3,
            instance: Some(InstanceId(9)),
            fault: RenderFault::MissingTexture {
                asset: AssetId(1),
                direction: Direction::South,
            },
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_pass_begin(&PassBeginEvent {
            pass_index: 0,
            changed: DimensionSet::EMPTY,
            forced: true,
        });
        sink.on_fault(&sample_fault());
        sink.on_pass_end(&PassSummary::default());
        sink.on_skip(&SkipEvent { last_pass_index: 0 });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.fault(&sample_fault());
        tracer.pass_end(&PassSummary::default());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            faults: Vec<u64>,
            skips: u32,
        }
        impl TraceSink for RecordingSink {
            fn on_fault(&mut self, e: &FaultEvent) {
                self.faults.push(e.pass_index);
            }
            fn on_skip(&mut self, _: &SkipEvent) {
                self.skips += 1;
            }
        }

        let mut sink = RecordingSink {
            faults: Vec::new(),
            skips: 0,
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.fault(&sample_fault());
        tracer.skip(&SkipEvent { last_pass_index: 3 });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.faults, &[3]);
        assert_eq!(sink.skips, 1);
    }
}
