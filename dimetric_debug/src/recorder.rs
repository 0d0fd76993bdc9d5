// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Faults share one record layout: a code byte followed by the asset and a
//! facing byte (`0xFF` when the fault has none).

use dimetric_core::direction::Direction;
use dimetric_core::dirty::DimensionSet;
use dimetric_core::error::RenderFault;
use dimetric_core::grid::{AssetId, InstanceId};
use dimetric_core::trace::{
    AutoBiasEvent, FaultEvent, PassBeginEvent, PassSummary, SettingsSynthesizedEvent, SkipEvent,
    TraceSink,
};
use dimetric_core::viewport::VerticalBiasMode;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_PASS_END: u8 = 2;
const TAG_FAULT: u8 = 3;
const TAG_SETTINGS_SYNTHESIZED: u8 = 4;
const TAG_AUTO_BIAS: u8 = 5;
const TAG_SKIP: u8 = 6;

const NO_DIRECTION: u8 = 0xFF;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_direction(&mut self, d: Option<Direction>) {
        let byte = d.map_or(NO_DIRECTION, |d| {
            u8::try_from(d.index()).unwrap_or(NO_DIRECTION)
        });
        self.write_u8(byte);
    }

    fn write_mode(&mut self, m: VerticalBiasMode) {
        self.write_u8(match m {
            VerticalBiasMode::RoundDown => 0,
            VerticalBiasMode::RoundUp => 1,
            VerticalBiasMode::SnapToNearest => 2,
        });
    }

    fn write_fault(&mut self, f: &RenderFault) {
        let (asset, direction) = match *f {
            RenderFault::MissingTexture { asset, direction }
            | RenderFault::StaleCache { asset, direction } => (asset, Some(direction)),
            RenderFault::InvalidSettings { asset } => (asset, None),
        };
        self.write_u8(f.code());
        self.write_u32(asset.0);
        self.write_direction(direction);
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_u64(e.pass_index);
        self.write_u32(e.changed.bits());
        self.write_u8(u8::from(e.forced));
    }

    fn on_pass_end(&mut self, s: &PassSummary) {
        self.write_u8(TAG_PASS_END);
        self.write_u64(s.pass_index);
        self.write_u32(s.changed.bits());
        self.write_u32(s.sprites);
        self.write_u32(s.fallbacks);
        self.write_u32(s.hidden);
        self.write_u32(s.culled);
        self.write_u32(s.outlines);
        self.write_u32(s.pool_capacity);
        self.write_u32(s.pool_grown);
        self.write_u32(s.faults);
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        self.write_u8(TAG_FAULT);
        self.write_u64(e.pass_index);
        self.write_option_u64(e.instance.map(|id| id.0));
        self.write_fault(&e.fault);
    }

    fn on_settings_synthesized(&mut self, e: &SettingsSynthesizedEvent) {
        self.write_u8(TAG_SETTINGS_SYNTHESIZED);
        self.write_u32(e.asset.0);
        self.write_f64(e.auto_bias);
    }

    fn on_auto_bias(&mut self, e: &AutoBiasEvent) {
        self.write_u8(TAG_AUTO_BIAS);
        self.write_u32(e.asset.0);
        self.write_direction(Some(e.direction));
        self.write_f64(e.raw);
        self.write_f64(e.bias);
        self.write_mode(e.mode);
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        self.write_u8(TAG_SKIP);
        self.write_u64(e.last_pass_index);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PassSummary`].
    PassEnd(PassSummary),
    /// A [`FaultEvent`].
    Fault(FaultEvent),
    /// A [`SettingsSynthesizedEvent`].
    SettingsSynthesized(SettingsSynthesizedEvent),
    /// An [`AutoBiasEvent`].
    AutoBias(AutoBiasEvent),
    /// A [`SkipEvent`].
    Skip(SkipEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes: [u8; N] = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_direction(&mut self) -> Option<Option<Direction>> {
        let byte = self.read_u8()?;
        Some(Direction::ALL.get(usize::from(byte)).copied())
    }

    fn read_mode(&mut self) -> Option<VerticalBiasMode> {
        Some(match self.read_u8()? {
            0 => VerticalBiasMode::RoundDown,
            1 => VerticalBiasMode::RoundUp,
            _ => VerticalBiasMode::SnapToNearest,
        })
    }

    fn read_fault(&mut self) -> Option<RenderFault> {
        let code = self.read_u8()?;
        let asset = AssetId(self.read_u32()?);
        let direction = self.read_direction()?;
        match code {
            1 => Some(RenderFault::MissingTexture {
                asset,
                direction: direction?,
            }),
            2 => Some(RenderFault::InvalidSettings { asset }),
            3 => Some(RenderFault::StaleCache {
                asset,
                direction: direction?,
            }),
            _ => None,
        }
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            pass_index: self.read_u64()?,
            changed: DimensionSet::from_bits(self.read_u32()?),
            forced: self.read_u8()? != 0,
        }))
    }

    fn decode_pass_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassEnd(PassSummary {
            pass_index: self.read_u64()?,
            changed: DimensionSet::from_bits(self.read_u32()?),
            sprites: self.read_u32()?,
            fallbacks: self.read_u32()?,
            hidden: self.read_u32()?,
            culled: self.read_u32()?,
            outlines: self.read_u32()?,
            pool_capacity: self.read_u32()?,
            pool_grown: self.read_u32()?,
            faults: self.read_u32()?,
        }))
    }

    fn decode_fault(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Fault(FaultEvent {
            pass_index: self.read_u64()?,
            instance: self.read_option_u64()?.map(InstanceId),
            fault: self.read_fault()?,
        }))
    }

    fn decode_settings_synthesized(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SettingsSynthesized(SettingsSynthesizedEvent {
            asset: AssetId(self.read_u32()?),
            auto_bias: self.read_f64()?,
        }))
    }

    fn decode_auto_bias(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AutoBias(AutoBiasEvent {
            asset: AssetId(self.read_u32()?),
            direction: self.read_direction()??,
            raw: self.read_f64()?,
            bias: self.read_f64()?,
            mode: self.read_mode()?,
        }))
    }

    fn decode_skip(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Skip(SkipEvent {
            last_pass_index: self.read_u64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<RecordedEvent> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_PASS_END => self.decode_pass_end(),
            TAG_FAULT => self.decode_fault(),
            TAG_SETTINGS_SYNTHESIZED => self.decode_settings_synthesized(),
            TAG_AUTO_BIAS => self.decode_auto_bias(),
            TAG_SKIP => self.decode_skip(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use dimetric_core::dirty::Dimension;

    use super::*;

    #[test]
    fn pass_events_decode_in_order() {
        let mut rec = RecorderSink::new();
        let changed: DimensionSet = [Dimension::Zoom, Dimension::Settings].into_iter().collect();
        rec.on_pass_begin(&PassBeginEvent {
            pass_index: 3,
            changed,
            forced: true,
        });
        let summary = PassSummary {
            pass_index: 3,
            changed,
            sprites: 12,
            fallbacks: 1,
            hidden: 2,
            culled: 4,
            outlines: 64,
            pool_capacity: 16,
            pool_grown: 3,
            faults: 1,
        };
        rec.on_pass_end(&summary);
        rec.on_skip(&SkipEvent { last_pass_index: 3 });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3, "expected three events");
        match &events[0] {
            RecordedEvent::PassBegin(e) => {
                assert_eq!(e.pass_index, 3);
                assert_eq!(e.changed, changed);
                assert!(e.forced, "forced flag lost");
            }
            other => panic!("expected PassBegin, got {other:?}"),
        }
        assert_eq!(events[1], RecordedEvent::PassEnd(summary));
        assert_eq!(
            events[2],
            RecordedEvent::Skip(SkipEvent { last_pass_index: 3 })
        );
    }

    #[test]
    fn every_fault_kind_survives_recording() {
        let faults = [
            RenderFault::MissingTexture {
                asset: AssetId(5),
                direction: Direction::South,
            },
            RenderFault::InvalidSettings { asset: AssetId(9) },
            RenderFault::StaleCache {
                asset: AssetId(2),
                direction: Direction::North,
            },
        ];
        let mut rec = RecorderSink::new();
        for (i, fault) in faults.into_iter().enumerate() {
            rec.on_fault(&FaultEvent {
                pass_index: 7,
                instance: (i % 2 == 0).then_some(InstanceId(100)),
                fault,
            });
        }

        let decoded: Vec<_> = decode(&rec.into_bytes())
            .map(|ev| match ev {
                RecordedEvent::Fault(f) => f,
                other => panic!("expected Fault, got {other:?}"),
            })
            .collect();
        let kinds: Vec<_> = decoded.iter().map(|f| f.fault).collect();
        assert_eq!(kinds, faults);
        assert_eq!(decoded[0].instance, Some(InstanceId(100)));
        assert_eq!(decoded[1].instance, None);
    }

    #[test]
    fn auto_bias_keeps_exact_floats() {
        let mut rec = RecorderSink::new();
        let event = AutoBiasEvent {
            asset: AssetId(1),
            direction: Direction::East,
            raw: 95.5,
            bias: 95.0,
            mode: VerticalBiasMode::SnapToNearest,
        };
        rec.on_auto_bias(&event);
        rec.on_settings_synthesized(&SettingsSynthesizedEvent {
            asset: AssetId(1),
            auto_bias: 95.0,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events[0], RecordedEvent::AutoBias(event));
        match &events[1] {
            RecordedEvent::SettingsSynthesized(e) => assert_eq!(e.auto_bias, 95.0),
            other => panic!("expected SettingsSynthesized, got {other:?}"),
        }
    }

    #[test]
    fn truncated_or_unknown_input_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_skip(&SkipEvent { last_pass_index: 1 });
        let mut bytes = rec.into_bytes();
        bytes.push(0xEE);
        assert_eq!(decode(&bytes).count(), 1, "unknown tag should stop decoding");

        bytes.truncate(5);
        assert_eq!(decode(&bytes).count(), 0, "truncated record should not decode");
        assert_eq!(decode(&[]).count(), 0);
    }
}
