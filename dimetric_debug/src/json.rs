// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter for recorded passes.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes a JSON array with one object per event. Every object carries an
//! `"event"` name; the remaining keys depend on the event.

use std::io::{self, Write};

use serde_json::{Value, json};

use dimetric_core::dirty::DimensionSet;
use dimetric_core::error::RenderFault;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|e| to_value(&e)).collect();
    serde_json::to_writer_pretty(&mut *writer, &events)?;
    writeln!(writer)
}

fn dimensions(set: DimensionSet) -> Value {
    set.iter().map(|d| format!("{d:?}")).collect()
}

fn fault(f: &RenderFault) -> Value {
    let mut obj = match *f {
        RenderFault::MissingTexture { asset, direction }
        | RenderFault::StaleCache { asset, direction } => json!({
            "asset": asset.0,
            "direction": direction.to_string(),
        }),
        RenderFault::InvalidSettings { asset } => json!({ "asset": asset.0 }),
    };
    let kind = match f {
        RenderFault::MissingTexture { .. } => "MissingTexture",
        RenderFault::InvalidSettings { .. } => "InvalidSettings",
        RenderFault::StaleCache { .. } => "StaleCache",
    };
    obj["kind"] = json!(kind);
    obj["message"] = json!(f.to_string());
    obj
}

fn to_value(recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::PassBegin(e) => json!({
            "event": "PassBegin",
            "pass": e.pass_index,
            "changed": dimensions(e.changed),
            "forced": e.forced,
        }),
        RecordedEvent::PassEnd(s) => json!({
            "event": "PassEnd",
            "pass": s.pass_index,
            "changed": dimensions(s.changed),
            "sprites": s.sprites,
            "fallbacks": s.fallbacks,
            "hidden": s.hidden,
            "culled": s.culled,
            "outlines": s.outlines,
            "pool_capacity": s.pool_capacity,
            "pool_grown": s.pool_grown,
            "faults": s.faults,
        }),
        RecordedEvent::Fault(e) => json!({
            "event": "Fault",
            "pass": e.pass_index,
            "instance": e.instance.map(|id| id.0),
            "fault": fault(&e.fault),
        }),
        RecordedEvent::SettingsSynthesized(e) => json!({
            "event": "SettingsSynthesized",
            "asset": e.asset.0,
            "auto_bias": e.auto_bias,
        }),
        RecordedEvent::AutoBias(e) => json!({
            "event": "AutoBias",
            "asset": e.asset.0,
            "direction": e.direction.to_string(),
            "raw": e.raw,
            "bias": e.bias,
            "mode": format!("{:?}", e.mode),
        }),
        RecordedEvent::Skip(e) => json!({
            "event": "Skip",
            "last_pass": e.last_pass_index,
        }),
    }
}

#[cfg(test)]
mod tests {
    use dimetric_core::direction::Direction;
    use dimetric_core::dirty::Dimension;
    use dimetric_core::grid::{AssetId, InstanceId};
    use dimetric_core::trace::{FaultEvent, PassBeginEvent, PassSummary, TraceSink};

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        let changed: DimensionSet = [Dimension::Instances].into_iter().collect();
        rec.on_pass_begin(&PassBeginEvent {
            pass_index: 0,
            changed,
            forced: true,
        });
        rec.on_fault(&FaultEvent {
            pass_index: 0,
            instance: Some(InstanceId(4)),
            fault: RenderFault::MissingTexture {
                asset: AssetId(3),
                direction: Direction::North,
            },
        });
        rec.on_pass_end(&PassSummary {
            pass_index: 0,
            changed,
            sprites: 1,
            fallbacks: 1,
            faults: 1,
            ..PassSummary::default()
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["event"], "PassBegin");
        assert_eq!(parsed[0]["changed"], json!(["Instances"]));
        assert_eq!(parsed[1]["instance"], 4);
        assert_eq!(parsed[1]["fault"]["kind"], "MissingTexture");
        assert_eq!(parsed[1]["fault"]["asset"], 3);
        assert_eq!(parsed[2]["event"], "PassEnd");
        assert_eq!(parsed[2]["fallbacks"], 1);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty(), "no events should export as []");
    }
}
