// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge-relative offsets.
//!
//! A wall's positioning inputs are entered once, without reference to which
//! edge the wall sits on: *along the edge*, *toward the cell center*, and
//! along two screen diagonals *A* and *B*. [`wall_offset`] rotates and signs
//! them per edge so one set of numbers aligns a wall sprite on all four
//! edges.
//!
//! | edge | along   | toward  | A sign | B sign |
//! |------|---------|---------|--------|--------|
//! | N    | (1, 0)  | (0, 1)  | -1     | -1     |
//! | E    | (0, 1)  | (-1, 0) | -1     | +1     |
//! | S    | (-1, 0) | (0, -1) | +1     | +1     |
//! | W    | (0, -1) | (1, 0)  | +1     | -1     |
//!
//! Diagonal A runs down-right `(√½, √½)` and diagonal B down-left
//! `(-√½, √½)`. Opposite edges carry opposite vectors and signs, so the
//! offset of a wall on one edge is the point reflection, through the cell
//! center, of the offset on the opposite edge. With A-division enabled,
//! the A term is halved on every edge, which keeps that reflection intact.

use core::f64::consts::FRAC_1_SQRT_2;

use kurbo::Vec2;

use crate::direction::Direction;
use crate::settings::WallOffsets;

/// Down-right screen diagonal.
pub const DIAGONAL_A: Vec2 = Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2);

/// Down-left screen diagonal.
pub const DIAGONAL_B: Vec2 = Vec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2);

/// Up-right screen diagonal, used for tile north-east offsets.
pub const NORTH_EAST: Vec2 = Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2);

/// Up-left screen diagonal, used for tile north-west offsets.
pub const NORTH_WEST: Vec2 = Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2);

/// Axes and signs for one wall edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeFrame {
    /// Unit vector along the edge.
    pub along: Vec2,
    /// Unit vector toward the cell center.
    pub toward_center: Vec2,
    /// Multiplier for the A diagonal before any division.
    pub sign_a: f64,
    /// Multiplier for the B diagonal.
    pub sign_b: f64,
}

impl EdgeFrame {
    /// The frame for walls on `edge`.
    #[must_use]
    pub const fn for_edge(edge: Direction) -> Self {
        match edge {
            Direction::North => Self {
                along: Vec2::new(1.0, 0.0),
                toward_center: Vec2::new(0.0, 1.0),
                sign_a: -1.0,
                sign_b: -1.0,
            },
            Direction::East => Self {
                along: Vec2::new(0.0, 1.0),
                toward_center: Vec2::new(-1.0, 0.0),
                sign_a: -1.0,
                sign_b: 1.0,
            },
            Direction::South => Self {
                along: Vec2::new(-1.0, 0.0),
                toward_center: Vec2::new(0.0, -1.0),
                sign_a: 1.0,
                sign_b: 1.0,
            },
            Direction::West => Self {
                along: Vec2::new(0.0, -1.0),
                toward_center: Vec2::new(1.0, 0.0),
                sign_a: 1.0,
                sign_b: -1.0,
            },
        }
    }
}

/// Resolves edge-relative inputs into an unscaled screen delta for a wall
/// on `edge`.
///
/// With `use_a_division`, the diagonal A term is halved on all four edges,
/// not only on north and east. Halving on two edges alone would break the
/// point reflection between opposite edges.
///
/// Callers multiply the result by `sprite_scale * zoom`.
#[must_use]
pub fn wall_offset(edge: Direction, offsets: &WallOffsets, use_a_division: bool) -> Vec2 {
    let frame = EdgeFrame::for_edge(edge);
    let a_div = if use_a_division { 0.5 } else { 1.0 };
    frame.along * offsets.along_edge
        + frame.toward_center * offsets.toward_center
        + DIAGONAL_A * (offsets.diagonal_a * frame.sign_a * a_div)
        + DIAGONAL_B * (offsets.diagonal_b * frame.sign_b)
}

/// Resolves tile diagonal inputs into an unscaled screen delta.
///
/// With `use_a_division`, the north-east term is halved.
#[must_use]
pub fn diagonal_offset(north_east: f64, north_west: f64, use_a_division: bool) -> Vec2 {
    let ne = if use_a_division {
        north_east * 0.5
    } else {
        north_east
    };
    NORTH_EAST * ne + NORTH_WEST * north_west
}
