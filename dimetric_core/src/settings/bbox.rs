// Copyright 2026 the Dimetric Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding-box trimming of sprite frames.

use kurbo::{Point, Rect};

/// The tight rectangle of visible pixels within a sprite frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BoundingBox {
    /// Full frame width.
    pub original_width: u32,
    /// Full frame height.
    pub original_height: u32,
    /// Left edge of the visible content.
    #[cfg_attr(feature = "serde", serde(rename = "boundingX"))]
    pub x: u32,
    /// Top edge of the visible content.
    #[cfg_attr(feature = "serde", serde(rename = "boundingY"))]
    pub y: u32,
    /// Width of the visible content.
    #[cfg_attr(feature = "serde", serde(rename = "boundingWidth"))]
    pub width: u32,
    /// Height of the visible content.
    #[cfg_attr(feature = "serde", serde(rename = "boundingHeight"))]
    pub height: u32,
}

impl BoundingBox {
    /// Scans straight RGBA8 pixels (row-major, 4 bytes each) for the tightest
    /// rectangle containing every pixel whose alpha exceeds `alpha_threshold`.
    ///
    /// Returns `None` when no pixel qualifies or when `rgba` is shorter than
    /// `width * height * 4`.
    #[must_use]
    pub fn trim(rgba: &[u8], width: u32, height: u32, alpha_threshold: u8) -> Option<Self> {
        let w = width as usize;
        let h = height as usize;
        if w == 0 || h == 0 || rgba.len() < w * h * 4 {
            return None;
        }

        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0_usize, 0_usize);
        for (y, row) in rgba.chunks_exact(w * 4).take(h).enumerate() {
            for (x, px) in row.chunks_exact(4).enumerate() {
                if px[3] > alpha_threshold {
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    min_y = min_y.min(y);
                    max_y = max_y.max(y);
                }
            }
        }
        if min_x == usize::MAX {
            return None;
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "all indices are below width/height, which are u32"
        )]
        let (x, y, w, h) = (
            min_x as u32,
            min_y as u32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        );
        Some(Self {
            original_width: width,
            original_height: height,
            x,
            y,
            width: w,
            height: h,
        })
    }

    /// The visible rectangle in frame pixels.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x + self.width),
            f64::from(self.y + self.height),
        )
    }

    /// Maps a normalized anchor relative to the trimmed box onto the full
    /// frame: `(x + ax * w) / original_w`, likewise for `y`.
    #[must_use]
    pub fn remap_anchor(&self, anchor: Point) -> Point {
        let ow = f64::from(self.original_width.max(1));
        let oh = f64::from(self.original_height.max(1));
        Point::new(
            (f64::from(self.x) + anchor.x * f64::from(self.width)) / ow,
            (f64::from(self.y) + anchor.y * f64::from(self.height)) / oh,
        )
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn frame(w: u32, h: u32, opaque: &[(u32, u32)]) -> alloc::vec::Vec<u8> {
        let mut px = vec![0_u8; (w * h * 4) as usize];
        for &(x, y) in opaque {
            px[((y * w + x) * 4 + 3) as usize] = 255;
        }
        px
    }

    #[test]
    fn trims_to_visible_pixels() {
        let px = frame(8, 6, &[(2, 1), (5, 4), (3, 2)]);
        let b = BoundingBox::trim(&px, 8, 6, 0).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (2, 1, 4, 4));
        assert_eq!((b.original_width, b.original_height), (8, 6));
        assert_eq!(b.rect(), Rect::new(2.0, 1.0, 6.0, 5.0));
    }

    #[test]
    fn threshold_ignores_faint_pixels() {
        let mut px = frame(4, 4, &[(1, 1)]);
        // A faint pixel in the corner.
        px[3] = 10;
        let b = BoundingBox::trim(&px, 4, 4, 16).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (1, 1, 1, 1));
        let b = BoundingBox::trim(&px, 4, 4, 0).unwrap();
        assert_eq!((b.x, b.y), (0, 0));
    }

    #[test]
    fn transparent_or_short_input_yields_none() {
        let px = frame(4, 4, &[]);
        assert_eq!(BoundingBox::trim(&px, 4, 4, 0), None);
        assert_eq!(BoundingBox::trim(&px[..10], 4, 4, 0), None);
        assert_eq!(BoundingBox::trim(&[], 0, 0, 0), None);
    }
}
