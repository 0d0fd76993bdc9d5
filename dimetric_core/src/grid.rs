// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placed instances and the grid that owns them.
//!
//! A cell on a given Z-layer can hold one tile and up to four walls, one per
//! edge. Placements are keyed by [`PlacementKey`]: the cell (`x,y,z`) plus the
//! slot the asset occupies. Placing into an occupied slot replaces the
//! previous instance.

use alloc::collections::BTreeMap;
use core::fmt;
use core::str::FromStr;

use crate::direction::Direction;
use crate::iso::GridCoord;

/// Identifies an asset (sprite sheet) managed by the host.
///
/// Assets are loaded and named externally; the engine only needs a stable
/// key for settings lookup and texture requests.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AssetId(pub u32);

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

/// Identifies one placed instance. Assigned by [`GridState::place`] and never
/// reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct InstanceId(pub u64);

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

/// Whether an instance is a floor tile or a wall on one edge of its cell.
///
/// Orders tiles before walls, and walls by edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum AssetKind {
    /// Occupies the whole diamond.
    Tile,
    /// Occupies the given edge of the diamond.
    Wall(Direction),
}

/// Whether a placed instance sits elevated on the grid plane or flush with
/// the diamond's bottom edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SnapPosition {
    /// Vertical bias applied.
    #[default]
    Above,
    /// Vertical bias ignored.
    Below,
}

/// A cell on a Z-layer. Displays and parses as `x,y,z`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellKey {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Z-layer index.
    pub z: u32,
}

impl CellKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// The planar cell.
    #[must_use]
    pub const fn coord(self) -> GridCoord {
        GridCoord::new(self.x, self.y)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Error returned when a [`CellKey`] or [`PlacementKey`] fails to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed placement key")]
pub struct ParseKeyError;

impl FromStr for CellKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let mut next = || parts.next().map(str::trim).ok_or(ParseKeyError);
        let x = next()?.parse().map_err(|_| ParseKeyError)?;
        let y = next()?.parse().map_err(|_| ParseKeyError)?;
        let z = next()?.parse().map_err(|_| ParseKeyError)?;
        if parts.next().is_some() {
            return Err(ParseKeyError);
        }
        Ok(Self { x, y, z })
    }
}

/// Unique slot of a placement: a cell plus tile-or-wall-edge.
///
/// Displays as `x,y,z` for tiles and `x,y,z:E` for walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlacementKey {
    /// The cell.
    pub cell: CellKey,
    /// Which slot of the cell.
    pub slot: AssetKind,
}

impl fmt::Display for PlacementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            AssetKind::Tile => write!(f, "{}", self.cell),
            AssetKind::Wall(d) => write!(f, "{}:{d}", self.cell),
        }
    }
}

impl FromStr for PlacementKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None => Ok(Self {
                cell: s.parse()?,
                slot: AssetKind::Tile,
            }),
            Some((cell, edge)) => Ok(Self {
                cell: cell.parse()?,
                slot: AssetKind::Wall(edge.trim().parse().map_err(|_| ParseKeyError)?),
            }),
        }
    }
}

/// Everything needed to place an asset.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Placement {
    /// Which asset to draw.
    pub asset: AssetId,
    /// Target cell.
    pub cell: GridCoord,
    /// Target Z-layer.
    pub z: u32,
    /// Facing.
    pub direction: Direction,
    /// Elevated or flush.
    pub snap: SnapPosition,
    /// Tile or wall edge.
    pub kind: AssetKind,
}

impl Placement {
    /// A north-facing, elevated tile on the ground layer.
    #[must_use]
    pub const fn tile(asset: AssetId, cell: GridCoord) -> Self {
        Self {
            asset,
            cell,
            z: 0,
            direction: Direction::North,
            snap: SnapPosition::Above,
            kind: AssetKind::Tile,
        }
    }

    /// An elevated wall on `edge` of the cell on the ground layer.
    #[must_use]
    pub const fn wall(asset: AssetId, cell: GridCoord, edge: Direction) -> Self {
        Self {
            asset,
            cell,
            z: 0,
            direction: edge,
            snap: SnapPosition::Above,
            kind: AssetKind::Wall(edge),
        }
    }

    /// Returns the placement moved to layer `z`.
    #[must_use]
    pub const fn on_layer(mut self, z: u32) -> Self {
        self.z = z;
        self
    }

    /// Returns the placement with the given snap position.
    #[must_use]
    pub const fn with_snap(mut self, snap: SnapPosition) -> Self {
        self.snap = snap;
        self
    }

    /// Returns the placement with the given facing.
    #[must_use]
    pub const fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// The slot this placement occupies.
    #[must_use]
    pub const fn key(&self) -> PlacementKey {
        PlacementKey {
            cell: CellKey::new(self.cell.x, self.cell.y, self.z),
            slot: self.kind,
        }
    }
}

/// A placed asset.
///
/// Immutable once placed except for facing and snap position, which are
/// edited through [`GridState`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RenderableInstance {
    /// Unique id.
    pub id: InstanceId,
    /// Which asset to draw.
    pub asset: AssetId,
    /// Cell position.
    pub cell: GridCoord,
    /// Z-layer index.
    pub z: u32,
    /// Facing.
    pub direction: Direction,
    /// Elevated or flush.
    pub snap: SnapPosition,
    /// Tile or wall edge.
    pub kind: AssetKind,
}

impl RenderableInstance {
    /// The slot this instance occupies.
    #[must_use]
    pub const fn key(&self) -> PlacementKey {
        PlacementKey {
            cell: CellKey::new(self.cell.x, self.cell.y, self.z),
            slot: self.kind,
        }
    }
}

/// Errors from grid mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The cell lies outside the grid.
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
    },
    /// The Z-layer is not configured.
    #[error("z-layer {z} does not exist")]
    UnknownLayer {
        /// Requested layer.
        z: u32,
    },
}

/// Grid dimensions plus every placed instance.
#[derive(Clone, Debug)]
pub struct GridState {
    width: u32,
    height: u32,
    placements: BTreeMap<PlacementKey, RenderableInstance>,
    next_instance: u64,
    instances_version: u32,
    size_version: u32,
}

impl GridState {
    /// Creates an empty grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            placements: BTreeMap::new(),
            next_instance: 1,
            instances_version: 0,
            size_version: 0,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `cell` lies on the grid.
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        cell.in_bounds(self.width, self.height)
    }

    /// Places an asset, replacing whatever occupied the same slot.
    ///
    /// Returns the new instance id.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] if the cell is off the grid.
    pub fn place(&mut self, placement: Placement) -> Result<InstanceId, GridError> {
        if !self.contains(placement.cell) {
            return Err(GridError::OutOfBounds {
                x: placement.cell.x,
                y: placement.cell.y,
            });
        }
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        let instance = RenderableInstance {
            id,
            asset: placement.asset,
            cell: placement.cell,
            z: placement.z,
            direction: placement.direction,
            snap: placement.snap,
            kind: placement.kind,
        };
        self.placements.insert(placement.key(), instance);
        self.bump_instances();
        Ok(id)
    }

    /// Removes the instance in `key`'s slot.
    pub fn erase(&mut self, key: PlacementKey) -> Option<RenderableInstance> {
        let removed = self.placements.remove(&key);
        if removed.is_some() {
            self.bump_instances();
        }
        removed
    }

    /// Removes everything in a cell (tile and walls).
    pub fn erase_cell(&mut self, cell: CellKey) -> usize {
        let before = self.placements.len();
        self.placements.retain(|k, _| k.cell != cell);
        let removed = before - self.placements.len();
        if removed > 0 {
            self.bump_instances();
        }
        removed
    }

    /// Returns the instance in `key`'s slot.
    #[must_use]
    pub fn get(&self, key: PlacementKey) -> Option<&RenderableInstance> {
        self.placements.get(&key)
    }

    /// Changes the facing of a placed instance. Returns `false` if the slot
    /// is empty.
    pub fn set_direction(&mut self, key: PlacementKey, direction: Direction) -> bool {
        let Some(inst) = self.placements.get_mut(&key) else {
            return false;
        };
        if inst.direction != direction {
            inst.direction = direction;
            self.bump_instances();
        }
        true
    }

    /// Changes the snap position of a placed instance. Returns `false` if the
    /// slot is empty.
    pub fn set_snap(&mut self, key: PlacementKey, snap: SnapPosition) -> bool {
        let Some(inst) = self.placements.get_mut(&key) else {
            return false;
        };
        if inst.snap != snap {
            inst.snap = snap;
            self.bump_instances();
        }
        true
    }

    /// Changes the grid size, dropping instances that fall outside.
    ///
    /// Returns the number of instances dropped.
    pub fn resize(&mut self, width: u32, height: u32) -> usize {
        if (width, height) == (self.width, self.height) {
            return 0;
        }
        self.width = width;
        self.height = height;
        self.size_version = self.size_version.wrapping_add(1);
        let before = self.placements.len();
        self.placements
            .retain(|k, _| k.cell.coord().in_bounds(width, height));
        let dropped = before - self.placements.len();
        if dropped > 0 {
            self.bump_instances();
        }
        dropped
    }

    /// Removes every instance.
    pub fn clear(&mut self) {
        if !self.placements.is_empty() {
            self.placements.clear();
            self.bump_instances();
        }
    }

    /// Number of placed instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Iterates instances in key order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderableInstance> {
        self.placements.values()
    }

    /// Change counter for the instance set.
    #[must_use]
    pub fn instances_version(&self) -> u32 {
        self.instances_version
    }

    /// Change counter for the grid size.
    #[must_use]
    pub fn size_version(&self) -> u32 {
        self.size_version
    }

    fn bump_instances(&mut self) {
        self.instances_version = self.instances_version.wrapping_add(1);
    }
}
