// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid ⇄ isometric screen-space transforms.
//!
//! Cells are drawn as 2:1 diamonds: a diamond `w` pixels wide is `w / 2`
//! pixels tall. The forward transform maps a cell to the center of its
//! diamond relative to the grid origin:
//!
//! ```text
//! iso_x = (gx - gy) * w / 2
//! iso_y = (gx + gy) * (w / 2) / 2
//! ```
//!
//! [`screen_to_grid`] is the algebraic inverse followed by rounding to the
//! nearest integer, which absorbs floating-point drift so that
//! `screen_to_grid(grid_to_screen(c)) == c` holds exactly for every integer
//! cell.

use kurbo::{Point, Rect, Vec2};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::direction::Direction;

/// An integer cell position on the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCoord {
    /// Column, growing toward the lower right of the screen.
    pub x: i32,
    /// Row, growing toward the lower left of the screen.
    pub y: i32,
}

impl GridCoord {
    /// Creates a coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the cell lies inside `[0, width) × [0, height)`.
    #[inline]
    #[must_use]
    pub fn in_bounds(self, width: u32, height: u32) -> bool {
        (0..i64::from(width)).contains(&i64::from(self.x))
            && (0..i64::from(height)).contains(&i64::from(self.y))
    }
}

/// Height of a diamond for the given width (fixed 2:1 aspect ratio).
#[inline]
#[must_use]
pub fn tile_height(diamond_width: f64) -> f64 {
    diamond_width / 2.0
}

/// Maps a grid position to the center of its diamond, relative to the grid
/// origin.
///
/// `diamond_width` is the on-screen width of one cell, already scaled by
/// zoom. Fractional grid positions are accepted so callers can place points
/// between cell centers.
#[inline]
#[must_use]
pub fn grid_to_screen(gx: f64, gy: f64, diamond_width: f64) -> Point {
    let tile_h = tile_height(diamond_width);
    Point::new(
        (gx - gy) * diamond_width / 2.0,
        (gx + gy) * tile_h / 2.0,
    )
}

/// Maps a grid cell to the center of its diamond.
#[inline]
#[must_use]
pub fn cell_to_screen(cell: GridCoord, diamond_width: f64) -> Point {
    grid_to_screen(f64::from(cell.x), f64::from(cell.y), diamond_width)
}

/// Inverse of [`grid_to_screen`] for unrounded results.
#[must_use]
pub fn screen_to_grid_exact(iso: Point, diamond_width: f64) -> (f64, f64) {
    let a = diamond_width / 2.0;
    let b = diamond_width / 4.0;
    let gx = (iso.x / a + iso.y / b) / 2.0;
    let gy = (iso.y / b - iso.x / a) / 2.0;
    (gx, gy)
}

/// Maps a point relative to the grid origin back to the cell whose center is
/// nearest in grid space.
///
/// Rounds half away from zero. The result is not bounds-checked.
#[must_use]
pub fn screen_to_grid(iso: Point, diamond_width: f64) -> GridCoord {
    let (gx, gy) = screen_to_grid_exact(iso, diamond_width);
    GridCoord::new(round_to_i32(gx), round_to_i32(gy))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "grid coordinates are far inside i32 range; `as` saturates otherwise"
)]
fn round_to_i32(v: f64) -> i32 {
    v.round() as i32
}

/// The four vertices of a diamond.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiamondCorners {
    /// Top vertex.
    pub north: Point,
    /// Right vertex.
    pub east: Point,
    /// Bottom vertex.
    pub south: Point,
    /// Left vertex.
    pub west: Point,
}

impl DiamondCorners {
    /// Returns the vertices clockwise from the top.
    #[must_use]
    pub const fn points(&self) -> [Point; 4] {
        [self.north, self.east, self.south, self.west]
    }

    /// Center of the diamond.
    #[must_use]
    pub fn center(&self) -> Point {
        self.north.midpoint(self.south)
    }

    /// Axis-aligned bounds of the diamond.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.west.x, self.north.y, self.east.x, self.south.y)
    }

    /// Midpoint of the edge shared with the neighbor in `direction`.
    #[must_use]
    pub fn edge_midpoint(&self, direction: Direction) -> Point {
        match direction {
            Direction::North => self.north.midpoint(self.east),
            Direction::East => self.east.midpoint(self.south),
            Direction::South => self.south.midpoint(self.west),
            Direction::West => self.west.midpoint(self.north),
        }
    }
}

/// Returns the vertices of the diamond centered on `center`.
///
/// Vertices sit half a width away horizontally and a quarter width away
/// vertically, each pulled toward the center by `stroke_inset` so an outline
/// stroked on them stays inside the cell.
#[must_use]
pub fn diamond_corners(center: Point, diamond_width: f64, stroke_inset: f64) -> DiamondCorners {
    let half_w = diamond_width / 2.0 - stroke_inset;
    let half_h = diamond_width / 4.0 - stroke_inset;
    DiamondCorners {
        north: Point::new(center.x, center.y - half_h),
        east: Point::new(center.x + half_w, center.y),
        south: Point::new(center.x, center.y + half_h),
        west: Point::new(center.x - half_w, center.y),
    }
}
