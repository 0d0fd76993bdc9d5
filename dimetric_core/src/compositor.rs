// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth ordering and per-layer appearance.
//!
//! Instances are painted back to front. The order is total and
//! deterministic:
//!
//! 1. Z-layer ascending, so every instance on a lower layer is behind every
//!    instance on a higher one regardless of grid position.
//! 2. Grid row (`y`) ascending, then column (`x`) ascending.
//! 3. Tiles before walls in the same cell; walls by edge (`N < E < S < W`).
//! 4. Instance id, which only matters for duplicate input.
//!
//! The layer visibility mode then decides whether each instance is drawn
//! and how: see [`appearance`].

use alloc::vec::Vec;

use crate::grid::{AssetKind, InstanceId, RenderableInstance};
use crate::layers::{Rgba8, ZLayers};
use crate::viewport::{AssetVisibility, LayerVisibilityMode};

/// Painter's-algorithm sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepthKey {
    /// Z-layer.
    pub z: u32,
    /// Grid row.
    pub y: i32,
    /// Grid column.
    pub x: i32,
    /// Tile, then walls by edge.
    pub kind: AssetKind,
    /// Final tie-break.
    pub id: InstanceId,
}

impl DepthKey {
    /// The key of `instance`.
    #[inline]
    #[must_use]
    pub const fn of(instance: &RenderableInstance) -> Self {
        Self {
            z: instance.z,
            y: instance.cell.y,
            x: instance.cell.x,
            kind: instance.kind,
            id: instance.id,
        }
    }
}

/// How a drawn instance is blended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
    /// Color multiplied into the sprite, if any.
    pub tint: Option<Rgba8>,
}

impl Appearance {
    /// Full opacity, no tint.
    pub const OPAQUE: Self = Self {
        alpha: 1.0,
        tint: None,
    };
}

/// Decides whether and how an instance on layer `z` is drawn.
///
/// - [`Normal`](LayerVisibilityMode::Normal): everything opaque, untinted.
/// - [`Shadow`](LayerVisibilityMode::Shadow): the active layer opaque;
///   other layers at `shadow_alpha`, tinted with their layer color.
/// - [`Invisible`](LayerVisibilityMode::Invisible): only the active layer;
///   `None` for everything else.
#[must_use]
pub fn appearance(
    mode: LayerVisibilityMode,
    active_layer: u32,
    z: u32,
    layers: &ZLayers,
    shadow_alpha: f32,
) -> Option<Appearance> {
    match mode {
        LayerVisibilityMode::Normal => Some(Appearance::OPAQUE),
        _ if z == active_layer => Some(Appearance::OPAQUE),
        LayerVisibilityMode::Shadow => Some(Appearance {
            alpha: shadow_alpha,
            tint: Some(layers.color(z)),
        }),
        LayerVisibilityMode::Invisible => None,
    }
}

/// Inputs to [`compose`].
#[derive(Clone, Copy, Debug)]
pub struct CompositeParams<'a> {
    /// Layer visibility mode.
    pub mode: LayerVisibilityMode,
    /// The Z-layer being edited.
    pub active_layer: u32,
    /// Tile and wall toggles.
    pub asset_visibility: AssetVisibility,
    /// Alpha for inactive layers in shadow mode.
    pub shadow_alpha: f32,
    /// Z-layer table (for tint colors).
    pub layers: &'a ZLayers,
}

/// An instance accepted for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Composited {
    /// The instance.
    pub instance: RenderableInstance,
    /// How to blend it.
    pub appearance: Appearance,
}

/// Output of [`compose_into`].
#[derive(Clone, Debug, Default)]
pub struct CompositeList {
    /// Accepted instances in paint order.
    pub items: Vec<Composited>,
    /// Instances excluded by toggles or layer mode.
    pub hidden: u32,
}

/// Filters and orders instances for painting.
///
/// Exclusion (asset toggles, invisible layers) happens before sorting.
#[must_use]
pub fn compose<'i>(
    instances: impl IntoIterator<Item = &'i RenderableInstance>,
    params: &CompositeParams<'_>,
) -> CompositeList {
    let mut out = CompositeList::default();
    compose_into(instances, params, &mut out);
    out
}

/// Like [`compose`], but reuses a caller-provided buffer.
pub fn compose_into<'i>(
    instances: impl IntoIterator<Item = &'i RenderableInstance>,
    params: &CompositeParams<'_>,
    out: &mut CompositeList,
) {
    out.items.clear();
    out.hidden = 0;
    for inst in instances {
        let shown = match inst.kind {
            AssetKind::Tile => params.asset_visibility.tiles,
            AssetKind::Wall(_) => params.asset_visibility.walls,
        };
        let look = if shown {
            appearance(
                params.mode,
                params.active_layer,
                inst.z,
                params.layers,
                params.shadow_alpha,
            )
        } else {
            None
        };
        match look {
            Some(appearance) => out.items.push(Composited {
                instance: *inst,
                appearance,
            }),
            None => out.hidden += 1,
        }
    }
    out.items
        .sort_unstable_by_key(|c| DepthKey::of(&c.instance));
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::direction::Direction;
    use crate::grid::{AssetId, SnapPosition};
    use crate::iso::GridCoord;
    use crate::layers::ZLayerConfig;

    fn inst(id: u64, x: i32, y: i32, z: u32, kind: AssetKind) -> RenderableInstance {
        RenderableInstance {
            id: InstanceId(id),
            asset: AssetId(1),
            cell: GridCoord::new(x, y),
            z,
            direction: Direction::North,
            snap: SnapPosition::Above,
            kind,
        }
    }

    fn two_layers() -> ZLayers {
        ZLayers::from_layers(vec![
            ZLayerConfig::new("Ground", Rgba8::opaque(76, 175, 80), 0.0),
            ZLayerConfig::new("Upper", Rgba8::opaque(33, 150, 243), 96.0),
        ])
    }

    fn params(mode: LayerVisibilityMode, active: u32, layers: &ZLayers) -> CompositeParams<'_> {
        CompositeParams {
            mode,
            active_layer: active,
            asset_visibility: AssetVisibility::default(),
            shadow_alpha: 0.6,
            layers,
        }
    }

    fn ids(list: &CompositeList) -> alloc::vec::Vec<u64> {
        list.items.iter().map(|c| c.instance.id.0).collect()
    }

    #[test]
    fn lower_layers_always_paint_first() {
        let layers = two_layers();
        let grid = [
            inst(1, 29, 19, 0, AssetKind::Tile),
            inst(2, 0, 0, 1, AssetKind::Tile),
            inst(3, 15, 3, 0, AssetKind::Wall(Direction::South)),
            inst(4, 0, 0, 0, AssetKind::Tile),
        ];
        let list = compose(&grid, &params(LayerVisibilityMode::Normal, 0, &layers));
        let order = ids(&list);
        let pos = |id| order.iter().position(|&i| i == id).unwrap();
        for low in [1, 3, 4] {
            assert!(pos(low) < pos(2), "z=0 instance {low} before z=1");
        }
    }

    #[test]
    fn rows_then_columns_then_tiles_before_walls() {
        let layers = two_layers();
        let grid = [
            inst(1, 2, 1, 0, AssetKind::Tile),
            inst(2, 0, 2, 0, AssetKind::Tile),
            inst(3, 1, 1, 0, AssetKind::Wall(Direction::West)),
            inst(4, 1, 1, 0, AssetKind::Wall(Direction::North)),
            inst(5, 1, 1, 0, AssetKind::Tile),
        ];
        let list = compose(&grid, &params(LayerVisibilityMode::Normal, 0, &layers));
        assert_eq!(ids(&list), [5, 4, 3, 1, 2]);
    }

    #[test]
    fn shadow_dims_and_tints_inactive_layers() {
        let layers = two_layers();
        let a = appearance(LayerVisibilityMode::Shadow, 1, 0, &layers, 0.6).unwrap();
        assert_eq!(a.alpha, 0.6);
        assert_eq!(a.tint, Some(Rgba8::opaque(76, 175, 80)));
        let b = appearance(LayerVisibilityMode::Shadow, 1, 1, &layers, 0.6).unwrap();
        assert_eq!(b, Appearance::OPAQUE);
        let n = appearance(LayerVisibilityMode::Normal, 1, 0, &layers, 0.6).unwrap();
        assert_eq!(n, Appearance::OPAQUE);
    }

    #[test]
    fn invisible_mode_keeps_only_active_layer() {
        let layers = two_layers();
        let grid = [
            inst(1, 0, 0, 0, AssetKind::Tile),
            inst(2, 0, 0, 1, AssetKind::Tile),
            inst(3, 4, 4, 1, AssetKind::Wall(Direction::East)),
            inst(4, 5, 5, 0, AssetKind::Tile),
        ];
        let normal = compose(&grid, &params(LayerVisibilityMode::Normal, 1, &layers));
        let invisible = compose(&grid, &params(LayerVisibilityMode::Invisible, 1, &layers));

        assert_eq!(ids(&invisible), [2, 3]);
        assert_eq!(invisible.hidden, 2);
        let on_active: alloc::vec::Vec<_> = normal
            .items
            .iter()
            .filter(|c| c.instance.z == 1)
            .copied()
            .collect();
        assert_eq!(invisible.items, on_active, "active layer untouched");
    }

    #[test]
    fn asset_toggles_hide_by_kind() {
        let layers = two_layers();
        let grid = [
            inst(1, 0, 0, 0, AssetKind::Tile),
            inst(2, 0, 0, 0, AssetKind::Wall(Direction::North)),
        ];
        let mut p = params(LayerVisibilityMode::Normal, 0, &layers);
        p.asset_visibility.walls = false;
        let list = compose(&grid, &p);
        assert_eq!(ids(&list), [1]);
        assert_eq!(list.hidden, 1);
    }
}
