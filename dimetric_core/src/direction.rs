// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compass directions for sprite facing and wall edges.

use core::fmt;
use core::str::FromStr;

/// One of the four grid directions.
///
/// Used both as the facing of a placed instance and as the cell edge a wall
/// occupies. The declaration order (`North < East < South < West`) is the
/// tie-break order for walls sharing a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Direction {
    /// Toward `y - 1`; the upper-right edge of the diamond.
    #[default]
    North,
    /// Toward `x + 1`; the lower-right edge of the diamond.
    East,
    /// Toward `y + 1`; the lower-left edge of the diamond.
    South,
    /// Toward `x - 1`; the upper-left edge of the diamond.
    West,
}

impl Direction {
    /// All directions in sort order.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Returns the array index of this direction (`North = 0` … `West = 3`).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Single-letter label used in placement keys.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::North => 'N',
            Self::East => 'E',
            Self::South => 'S',
            Self::West => 'W',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Error returned when parsing a [`Direction`] from text fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized direction")]
pub struct ParseDirectionError;

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" | "n" | "NORTH" | "north" => Ok(Self::North),
            "E" | "e" | "EAST" | "east" => Ok(Self::East),
            "S" | "s" | "SOUTH" | "south" => Ok(Self::South),
            "W" | "w" | "WEST" | "west" => Ok(Self::West),
            _ => Err(ParseDirectionError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_declaration_order() {
        for (i, d) in Direction::ALL.into_iter().enumerate() {
            assert_eq!(d.index(), i, "index of {d}");
        }
        assert!(Direction::North < Direction::West, "north sorts first");
    }

    #[test]
    fn parses_letters_and_names() {
        assert_eq!("E".parse::<Direction>(), Ok(Direction::East));
        assert_eq!("south".parse::<Direction>(), Ok(Direction::South));
        assert_eq!("up".parse::<Direction>(), Err(ParseDirectionError));
    }
}
