// SPDX-License-Identifier: MIT
//! # Slice Geometry Primitives
//!
//! Plain-data types shared by the planner and the per-block register
//! derivation layers: image sizes, crop rectangles, slice positions and
//! overlaps, and the cumulative output accumulator used to tile per-slice
//! output exactly onto a frame buffer.
//!
//! Everything here is pixel-coordinate arithmetic; nothing knows about
//! register layouts or byte addresses.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageSize {
    pub w: u32,
    pub h: u32,
}

/// Crop rectangle: start offset plus size, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Trim {
    pub start_x: u32,
    pub start_y: u32,
    pub size_x: u32,
    pub size_y: u32,
}

impl Trim {
    /// Last column covered by the trim (inclusive).
    pub fn end_x(&self) -> u32 {
        self.start_x + self.size_x - 1
    }

    /// Last row covered by the trim (inclusive).
    pub fn end_y(&self) -> u32 {
        self.start_y + self.size_y - 1
    }
}

/// Slice rectangle in frame coordinates. Ends are inclusive, matching the
/// convention the hardware size registers expect (`end - start + 1` pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlicePos {
    pub start_col: u32,
    pub start_row: u32,
    pub end_col: u32,
    pub end_row: u32,
}

impl SlicePos {
    pub fn width(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> u32 {
        self.end_row - self.start_row + 1
    }
}

/// Per-edge overlap margins in pixels. Margins facing a frame boundary are
/// zero; interior edges carry the format-family margin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceOverlap {
    pub up: u32,
    pub down: u32,
    pub left: u32,
    pub right: u32,
}

/// Position of a slice along one axis of the grid.
///
/// Derived once from grid coordinates so downstream derivation can branch on
/// the role instead of re-comparing indices against the grid extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceRole {
    /// The single slice covering the whole axis.
    Only,
    /// Leftmost/topmost of several.
    First,
    /// Interior slice with neighbours on both sides.
    Middle,
    /// Rightmost/bottommost of several.
    Last,
}

impl SliceRole {
    /// Role of slice `index` on an axis split into `count` slices.
    pub fn of(index: u32, count: u32) -> Self {
        if count <= 1 {
            SliceRole::Only
        } else if index == 0 {
            SliceRole::First
        } else if index == count - 1 {
            SliceRole::Last
        } else {
            SliceRole::Middle
        }
    }

    pub fn is_first(self) -> bool {
        matches!(self, SliceRole::Only | SliceRole::First)
    }

    pub fn is_last(self) -> bool {
        matches!(self, SliceRole::Only | SliceRole::Last)
    }
}

/// One slice of the planned grid.
#[derive(Clone, Copy, Debug)]
pub struct SliceDescriptor {
    /// Cleared when every output path falls outside this slice.
    pub valid: bool,
    /// Grid row (top to bottom).
    pub row: u32,
    /// Grid column (left to right).
    pub col: u32,
    pub role_x: SliceRole,
    pub role_y: SliceRole,
    /// Nominal slice rectangle before overlap expansion.
    pub pos_orig: SlicePos,
    /// Overlap-expanded rectangle actually fed through the pipeline.
    pub pos: SlicePos,
    /// `pos` shifted by the frame input-crop origin; what fetch addresses.
    pub pos_fetch: SlicePos,
    pub overlap: SliceOverlap,
}

/// Alignment applied to planned slice dimensions.
pub const SLICE_ALIGN: u32 = 2;

/// Round `v` down to the slice alignment.
pub fn aligned(v: u32) -> u32 {
    v & !(SLICE_ALIGN - 1)
}

/// Cumulative per-axis output starts, indexed by slice column/row.
///
/// Each output path owns one accumulator per concern (scaler trim and store
/// addressing track separate sums). Column `c + 1` starts where column `c`
/// ended; the planner resets accumulators whenever a new plan is built.
#[derive(Clone, Debug, Default)]
pub struct OutputAccumulator {
    cols: [u32; crate::planner::MAX_SLICE_COLS as usize],
    rows: [u32; crate::planner::MAX_SLICE_ROWS as usize],
}

impl OutputAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn col_start(&self, col: u32) -> u32 {
        self.cols[col as usize]
    }

    pub fn row_start(&self, row: u32) -> u32 {
        self.rows[row as usize]
    }

    /// Record that the slice in `col` emitted `width` output columns.
    pub fn advance_col(&mut self, col: u32, width: u32) {
        if col + 1 < crate::planner::MAX_SLICE_COLS {
            self.cols[(col + 1) as usize] = self.cols[col as usize] + width;
        }
    }

    /// Record that the slice in `row` emitted `height` output rows.
    pub fn advance_row(&mut self, row: u32, height: u32) {
        if row + 1 < crate::planner::MAX_SLICE_ROWS {
            self.rows[(row + 1) as usize] = self.rows[row as usize] + height;
        }
    }

    /// Pin the absolute start column for `col` (scaler-bypass stores address
    /// the frame buffer in input coordinates).
    pub fn set_col_start(&mut self, col: u32, start: u32) {
        self.cols[col as usize] = start;
    }

    pub fn set_row_start(&mut self, row: u32, start: u32) {
        self.rows[row as usize] = start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_of_axis() {
        assert_eq!(SliceRole::of(0, 1), SliceRole::Only);
        assert_eq!(SliceRole::of(0, 3), SliceRole::First);
        assert_eq!(SliceRole::of(1, 3), SliceRole::Middle);
        assert_eq!(SliceRole::of(2, 3), SliceRole::Last);
        assert!(SliceRole::Only.is_first() && SliceRole::Only.is_last());
    }

    #[test]
    fn trim_ends_inclusive() {
        let t = Trim { start_x: 10, start_y: 4, size_x: 100, size_y: 50 };
        assert_eq!(t.end_x(), 109);
        assert_eq!(t.end_y(), 53);
    }

    #[test]
    fn accumulator_chains_columns() {
        let mut acc = OutputAccumulator::new();
        acc.advance_col(0, 640);
        acc.advance_col(1, 632);
        assert_eq!(acc.col_start(0), 0);
        assert_eq!(acc.col_start(1), 640);
        assert_eq!(acc.col_start(2), 1272);
    }

    #[test]
    fn aligned_rounds_down_to_two() {
        assert_eq!(aligned(2001), 2000);
        assert_eq!(aligned(2000), 2000);
    }
}
