// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use dimetric_core::dirty::DimensionSet;
use dimetric_core::trace::{
    AutoBiasEvent, FaultEvent, PassBeginEvent, PassSummary, SettingsSynthesizedEvent, SkipEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    print_skips: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("print_skips", &self.print_skips)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            print_skips: false,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            print_skips: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            print_skips: false,
        }
    }

    /// Also print a line for render calls that found nothing to do.
    ///
    /// Off by default: hosts typically render every tick.
    #[must_use]
    pub fn with_skips(mut self, print_skips: bool) -> Self {
        self.print_skips = print_skips;
        self
    }
}

fn dimensions(set: DimensionSet) -> String {
    if set.is_empty() {
        return "-".into();
    }
    let names: Vec<String> = set.iter().map(|d| format!("{d:?}")).collect();
    names.join("|")
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] pass={} changed={} forced={}",
            e.pass_index,
            dimensions(e.changed),
            e.forced,
        );
    }

    fn on_pass_end(&mut self, s: &PassSummary) {
        let _ = writeln!(
            self.writer,
            "[pass:end] pass={} sprites={} fallbacks={} hidden={} culled={} \
             outlines={} pool={} (+{}) faults={}",
            s.pass_index,
            s.sprites,
            s.fallbacks,
            s.hidden,
            s.culled,
            s.outlines,
            s.pool_capacity,
            s.pool_grown,
            s.faults,
        );
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        let instance = e
            .instance
            .map_or_else(|| "-".to_owned(), |id| id.0.to_string());
        let _ = writeln!(
            self.writer,
            "[fault] pass={} instance={instance} {}",
            e.pass_index, e.fault,
        );
    }

    fn on_settings_synthesized(&mut self, e: &SettingsSynthesizedEvent) {
        let _ = writeln!(
            self.writer,
            "[settings] asset={} synthesized auto_bias={}",
            e.asset.0, e.auto_bias,
        );
    }

    fn on_auto_bias(&mut self, e: &AutoBiasEvent) {
        let _ = writeln!(
            self.writer,
            "[bias] asset={} facing={} raw={:.2} bias={} mode={:?}",
            e.asset.0, e.direction, e.raw, e.bias, e.mode,
        );
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        if self.print_skips {
            let _ = writeln!(self.writer, "[skip] last={}", e.last_pass_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use dimetric_core::direction::Direction;
    use dimetric_core::dirty::Dimension;
    use dimetric_core::error::RenderFault;
    use dimetric_core::grid::{AssetId, InstanceId};

    use super::*;

    fn lines(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.writer).unwrap()
    }

    #[test]
    fn pass_begin_lists_changed_dimensions() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        let changed: DimensionSet = [Dimension::Pan, Dimension::Zoom].into_iter().collect();
        sink.on_pass_begin(&PassBeginEvent {
            pass_index: 4,
            changed,
            forced: false,
        });
        let output = lines(sink);
        assert!(output.contains("[pass:begin]"), "got: {output}");
        assert!(output.contains("pass=4"), "got: {output}");
        assert!(output.contains("changed=Pan|Zoom"), "got: {output}");
    }

    #[test]
    fn fault_uses_display_message() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_fault(&FaultEvent {
            pass_index: 2,
            instance: Some(InstanceId(11)),
            fault: RenderFault::MissingTexture {
                asset: AssetId(8),
                direction: Direction::West,
            },
        });
        let output = lines(sink);
        assert!(output.contains("instance=11"), "got: {output}");
        assert!(output.contains("asset 8"), "got: {output}");
    }

    #[test]
    fn skips_are_quiet_by_default() {
        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_skip(&SkipEvent { last_pass_index: 1 });
        assert!(lines(quiet).is_empty(), "skip printed without opt-in");

        let mut loud = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_skips(true);
        loud.on_skip(&SkipEvent { last_pass_index: 1 });
        assert_eq!(lines(loud), "[skip] last=1\n");
    }
}
