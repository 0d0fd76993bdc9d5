// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asset id → positioning settings, with change notification.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use super::positioning::DirectionalPositioningSettings;
use crate::direction::Direction;
use crate::dirty;
use crate::grid::AssetId;

/// Settings of one asset: shared by all facings, or one record per facing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum PositioningEntry {
    /// One record for every facing.
    Shared(DirectionalPositioningSettings),
    /// Records indexed by [`Direction::index`].
    PerDirection(Box<[DirectionalPositioningSettings; 4]>),
}

impl PositioningEntry {
    /// The settings that apply to `direction`.
    #[inline]
    #[must_use]
    pub fn resolve(&self, direction: Direction) -> &DirectionalPositioningSettings {
        match self {
            Self::Shared(s) => s,
            Self::PerDirection(all) => &all[direction.index()],
        }
    }

    /// Mutable access to the settings that apply to `direction`.
    ///
    /// For a shared entry this is the shared record.
    #[inline]
    pub fn resolve_mut(&mut self, direction: Direction) -> &mut DirectionalPositioningSettings {
        match self {
            Self::Shared(s) => s,
            Self::PerDirection(all) => &mut all[direction.index()],
        }
    }

    /// Whether each facing has its own record.
    #[must_use]
    pub fn is_per_direction(&self) -> bool {
        matches!(self, Self::PerDirection(_))
    }

    fn records_mut(&mut self) -> &mut [DirectionalPositioningSettings] {
        match self {
            Self::Shared(s) => core::slice::from_mut(s),
            Self::PerDirection(all) => &mut all[..],
        }
    }
}

/// What happened to an asset's settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A record was inserted or replaced.
    Inserted,
    /// Fields were edited.
    Updated,
    /// Switched between shared and per-direction storage.
    ModeChanged,
    /// A default record was created for an asset that had none.
    Synthesized,
    /// The auto-computed vertical bias was recomputed.
    AutoBias,
    /// The record was removed.
    Removed,
}

/// Notification passed to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SettingsChange {
    /// Affected asset.
    pub asset: AssetId,
    /// What happened.
    pub kind: ChangeKind,
}

/// Handle returned by [`AssetSettingsStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

/// Assets whose settings changed since the last
/// [`drain_changes`](AssetSettingsStore::drain_changes), by channel.
///
/// Each list is sorted by asset id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsInvalidation {
    /// Any positioning field changed.
    pub positioning: Vec<AssetId>,
    /// Margins changed; auto biases are stale.
    pub margins: Vec<AssetId>,
    /// Anchor fields changed; resolved anchors are stale.
    pub anchor: Vec<AssetId>,
}

impl SettingsInvalidation {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positioning.is_empty() && self.margins.is_empty() && self.anchor.is_empty()
    }
}

type Callback = Box<dyn FnMut(&SettingsChange)>;

/// Positioning settings for every asset.
///
/// Every mutation bumps [`version`](Self::version), marks the affected asset
/// on the channels of [`crate::dirty`] it touches, and notifies
/// subscribers.
pub struct AssetSettingsStore {
    entries: BTreeMap<AssetId, PositioningEntry>,
    dirty: DirtyTracker<u32>,
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_subscription: u32,
    version: u32,
}

impl fmt::Debug for AssetSettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetSettingsStore")
            .field("entries", &self.entries)
            .field("subscribers", &self.subscribers.len())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl Default for AssetSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSettingsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            subscribers: Vec::new(),
            next_subscription: 0,
            version: 0,
        }
    }

    // -- Lookup --

    /// Returns the entry for `asset`.
    #[must_use]
    pub fn get(&self, asset: AssetId) -> Option<&PositioningEntry> {
        self.entries.get(&asset)
    }

    /// Returns the settings for `asset` facing `direction`.
    #[must_use]
    pub fn resolve(
        &self,
        asset: AssetId,
        direction: Direction,
    ) -> Option<&DirectionalPositioningSettings> {
        self.entries.get(&asset).map(|e| e.resolve(direction))
    }

    /// Whether `asset` has settings.
    #[must_use]
    pub fn contains(&self, asset: AssetId) -> bool {
        self.entries.contains_key(&asset)
    }

    /// Number of assets with settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no asset has settings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in asset order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetId, &PositioningEntry)> {
        self.entries.iter().map(|(&a, e)| (a, e))
    }

    /// Change counter for the whole store.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    // -- Mutation --

    /// Inserts or replaces the entry for `asset`.
    pub fn insert(&mut self, asset: AssetId, entry: PositioningEntry) {
        self.entries.insert(asset, entry);
        self.mark_all(asset);
        self.commit(asset, ChangeKind::Inserted);
    }

    /// Edits the settings of `asset`.
    ///
    /// With `Some(direction)`, only the record resolving for that facing is
    /// edited (for a shared entry, the shared record). With `None`, every
    /// record of the entry is edited.
    ///
    /// Returns `false` if the asset has no settings or the edit changed
    /// nothing.
    pub fn update(
        &mut self,
        asset: AssetId,
        direction: Option<Direction>,
        mut edit: impl FnMut(&mut DirectionalPositioningSettings),
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&asset) else {
            return false;
        };
        let (mut changed, mut margins, mut anchor) = (false, false, false);
        let mut apply = |record: &mut DirectionalPositioningSettings| {
            let before = record.clone();
            edit(record);
            if *record != before {
                changed = true;
                margins |= record.invisible_margins != before.invisible_margins;
                anchor |= !record.same_anchor(&before);
            }
        };
        match direction {
            Some(d) => apply(entry.resolve_mut(d)),
            None => entry.records_mut().iter_mut().for_each(&mut apply),
        }
        if !changed {
            return false;
        }
        let key = asset.0;
        self.dirty.mark(key, dirty::POSITIONING);
        if margins {
            self.dirty.mark(key, dirty::MARGINS);
        }
        if anchor {
            self.dirty.mark(key, dirty::ANCHOR);
        }
        self.commit(asset, ChangeKind::Updated);
        true
    }

    /// Switches `asset` between shared and per-direction storage.
    ///
    /// Enabling copies the shared record to all four facings. Disabling
    /// keeps the record of `keep` as the shared one and discards the rest.
    /// Returns `false` if the asset has no settings or is already in the
    /// requested mode.
    pub fn set_per_direction(&mut self, asset: AssetId, enabled: bool, keep: Direction) -> bool {
        let Some(entry) = self.entries.get_mut(&asset) else {
            return false;
        };
        if entry.is_per_direction() == enabled {
            return false;
        }
        let next = if enabled {
            let s = entry.resolve(keep).clone();
            PositioningEntry::PerDirection(Box::new([s.clone(), s.clone(), s.clone(), s]))
        } else {
            PositioningEntry::Shared(entry.resolve(keep).clone())
        };
        *entry = next;
        self.mark_all(asset);
        self.commit(asset, ChangeKind::ModeChanged);
        true
    }

    /// Creates shared default settings for `asset` if it has none.
    ///
    /// The default record has zero margins and the given auto bias active.
    /// Returns `true` if a record was synthesized.
    pub fn ensure_default(&mut self, asset: AssetId, auto_bias: f64) -> bool {
        if self.entries.contains_key(&asset) {
            return false;
        }
        self.entries.insert(
            asset,
            PositioningEntry::Shared(DirectionalPositioningSettings::synthesized(auto_bias)),
        );
        self.mark_all(asset);
        self.commit(asset, ChangeKind::Synthesized);
        true
    }

    /// Stores a recomputed auto vertical bias.
    ///
    /// The bias is derived data, so no invalidation channel is marked; the
    /// version still advances so the next pass redraws. Returns `false` if
    /// the asset has no settings or the value is unchanged.
    pub fn set_auto_bias(&mut self, asset: AssetId, direction: Direction, bias: f64) -> bool {
        let Some(entry) = self.entries.get_mut(&asset) else {
            return false;
        };
        let record = entry.resolve_mut(direction);
        if record.auto_computed_vertical_bias == bias {
            return false;
        }
        record.auto_computed_vertical_bias = bias;
        self.commit(asset, ChangeKind::AutoBias);
        true
    }

    /// Removes the settings of `asset`.
    pub fn remove(&mut self, asset: AssetId) -> Option<PositioningEntry> {
        let removed = self.entries.remove(&asset)?;
        self.mark_all(asset);
        self.commit(asset, ChangeKind::Removed);
        Some(removed)
    }

    // -- Notification --

    /// Registers a callback invoked after every change.
    pub fn subscribe(&mut self, callback: impl FnMut(&SettingsChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _)| *s != id);
        self.subscribers.len() != before
    }

    /// Drains the per-asset invalidation channels.
    pub fn drain_changes(&mut self) -> SettingsInvalidation {
        let mut drain = |ch: Channel| -> Vec<AssetId> {
            self.dirty
                .drain(ch)
                .deterministic()
                .run()
                .map(AssetId)
                .collect()
        };
        SettingsInvalidation {
            positioning: drain(dirty::POSITIONING),
            margins: drain(dirty::MARGINS),
            anchor: drain(dirty::ANCHOR),
        }
    }

    fn mark_all(&mut self, asset: AssetId) {
        self.dirty.mark(asset.0, dirty::POSITIONING);
        self.dirty.mark(asset.0, dirty::MARGINS);
        self.dirty.mark(asset.0, dirty::ANCHOR);
    }

    fn commit(&mut self, asset: AssetId, kind: ChangeKind) {
        self.version = self.version.wrapping_add(1);
        let change = SettingsChange { asset, kind };
        for (_, cb) in &mut self.subscribers {
            cb(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::*;
    use crate::settings::positioning::{Margins, SpriteAnchor};

    const CRATE: AssetId = AssetId(7);
    const DOOR: AssetId = AssetId(3);

    fn shared(bias: f64) -> PositioningEntry {
        PositioningEntry::Shared(DirectionalPositioningSettings {
            manual_vertical_bias: bias,
            ..DirectionalPositioningSettings::default()
        })
    }

    #[test]
    fn resolve_uniformly_for_both_shapes() {
        let s = shared(36.0);
        for d in Direction::ALL {
            assert_eq!(s.resolve(d).manual_vertical_bias, 36.0);
        }
        let mut per = [
            DirectionalPositioningSettings::default(),
            DirectionalPositioningSettings::default(),
            DirectionalPositioningSettings::default(),
            DirectionalPositioningSettings::default(),
        ];
        per[Direction::West.index()].manual_vertical_bias = 12.0;
        let per = PositioningEntry::PerDirection(Box::new(per));
        assert_eq!(per.resolve(Direction::West).manual_vertical_bias, 12.0);
        assert_eq!(per.resolve(Direction::North).manual_vertical_bias, 0.0);
    }

    #[test]
    fn update_marks_only_touched_channels() {
        let mut store = AssetSettingsStore::new();
        store.insert(CRATE, shared(0.0));
        let _ = store.drain_changes();

        assert!(store.update(CRATE, None, |s| s.manual_horizontal_offset = 4.0));
        let inv = store.drain_changes();
        assert_eq!(inv.positioning, [CRATE]);
        assert!(inv.margins.is_empty());
        assert!(inv.anchor.is_empty());

        assert!(store.update(CRATE, None, |s| s.invisible_margins = Margins::uniform(8.0)));
        assert!(store.update(CRATE, None, |s| s.sprite_anchor = SpriteAnchor::Center));
        let inv = store.drain_changes();
        assert_eq!(inv.margins, [CRATE]);
        assert_eq!(inv.anchor, [CRATE]);

        assert!(store.drain_changes().is_empty(), "drained");
    }

    #[test]
    fn no_op_update_is_not_a_change() {
        let mut store = AssetSettingsStore::new();
        store.insert(CRATE, shared(36.0));
        let v = store.version();
        assert!(!store.update(CRATE, None, |s| s.manual_vertical_bias = 36.0));
        assert_eq!(store.version(), v);
        assert!(!store.update(DOOR, None, |s| s.manual_vertical_bias = 1.0), "missing");
    }

    #[test]
    fn per_direction_edits_stay_local() {
        let mut store = AssetSettingsStore::new();
        store.insert(CRATE, shared(36.0));
        assert!(store.set_per_direction(CRATE, true, Direction::North));
        assert!(!store.set_per_direction(CRATE, true, Direction::North), "already per-direction");

        store.update(CRATE, Some(Direction::East), |s| s.manual_vertical_bias = 50.0);
        let bias = |d| store.resolve(CRATE, d).unwrap().manual_vertical_bias;
        assert_eq!(bias(Direction::East), 50.0);
        assert_eq!(bias(Direction::South), 36.0);

        assert!(store.set_per_direction(CRATE, false, Direction::East));
        assert_eq!(store.resolve(CRATE, Direction::West).unwrap().manual_vertical_bias, 50.0);
    }

    #[test]
    fn ensure_default_synthesizes_once() {
        let mut store = AssetSettingsStore::new();
        assert!(store.ensure_default(DOOR, 83.0));
        assert!(!store.ensure_default(DOOR, 12.0));
        let s = store.resolve(DOOR, Direction::South).unwrap();
        assert!(s.use_auto_computed);
        assert_eq!(s.active_vertical_bias(), 83.0);
    }

    #[test]
    fn auto_bias_bumps_version_without_marking() {
        let mut store = AssetSettingsStore::new();
        store.ensure_default(DOOR, 0.0);
        let _ = store.drain_changes();
        let v = store.version();
        assert!(store.set_auto_bias(DOOR, Direction::North, 84.0));
        assert!(!store.set_auto_bias(DOOR, Direction::North, 84.0));
        assert_eq!(store.version(), v.wrapping_add(1));
        assert!(store.drain_changes().is_empty());
    }

    #[test]
    fn subscribers_see_changes_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = AssetSettingsStore::new();
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |c| sink.borrow_mut().push(*c));

        store.insert(CRATE, shared(0.0));
        store.update(CRATE, None, |s| s.use_auto_computed = true);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.remove(CRATE);

        let seen = seen.borrow();
        assert_eq!(
            *seen,
            [
                SettingsChange { asset: CRATE, kind: ChangeKind::Inserted },
                SettingsChange { asset: CRATE, kind: ChangeKind::Updated },
            ]
        );
    }
}
