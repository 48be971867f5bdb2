// SPDX-License-Identifier: MIT
//! # Slice Planner
//!
//! Splits a frame into a grid of overlapping slices sized to the ISP line
//! buffer. Two independent limits apply:
//!
//! 1. **Input limit**: an expanded slice (payload + worst-case overlap) must
//!    fit the line buffer, so the payload may use at most
//!    `line_buffer_len - SLICE_OVERLAP_W_MAX` columns.
//! 2. **Output limit**: the widest output path must also fit the line buffer;
//!    the slice count that satisfies it is translated back into input
//!    columns, because slices are cut in input space.
//!
//! The final slice width is the smaller of the two, aligned down to
//! [`SLICE_ALIGN`](crate::geom::SLICE_ALIGN). Slice height is the frame
//! height aligned down; when alignment leaves a remainder line, a second
//! slice row absorbs it. Planning is pure: the same inputs always produce
//! the same plan.

use std::fmt;

use log::debug;

use crate::geom::{
    aligned, ImageSize, SliceDescriptor, SliceOverlap, SlicePos, SliceRole, SLICE_ALIGN,
};
use crate::overlap::{overlap_for, FetchFormat, SLICE_OVERLAP_W_MAX};

/// Capacity of the per-frame slice table.
pub const MAX_SLICES: u32 = 16;
/// Widest supported grid.
pub const MAX_SLICE_COLS: u32 = 16;
/// Tallest supported grid; a second row only appears when height alignment
/// leaves a remainder line.
pub const MAX_SLICE_ROWS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Zero-sized frame.
    EmptyFrame,
    /// Line buffer cannot hold even one overlap-expanded slice.
    LineBufferTooSmall { line_buffer_len: u32, min: u32 },
    /// Frame would need a bigger grid than the hardware slice table holds.
    GridTooLarge { cols: u32, rows: u32 },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::EmptyFrame => write!(f, "frame has zero size"),
            PlanError::LineBufferTooSmall { line_buffer_len, min } => write!(
                f,
                "line buffer of {} px cannot hold one slice (need > {})",
                line_buffer_len, min
            ),
            PlanError::GridTooLarge { cols, rows } => write!(
                f,
                "frame needs a {}x{} slice grid, hardware supports {} columns, {} rows, {} slices",
                cols, rows, MAX_SLICE_COLS, MAX_SLICE_ROWS, MAX_SLICES
            ),
        }
    }
}

impl std::error::Error for PlanError {}

/// A planned grid of slices, row-major.
#[derive(Clone, Debug)]
pub struct SlicePlan {
    pub slices: Vec<SliceDescriptor>,
    pub cols: u32,
    pub rows: u32,
    /// Nominal (pre-overlap) slice payload size.
    pub slice_width: u32,
    pub slice_height: u32,
    pub img: ImageSize,
    /// Frame-level overlap margins (interior edges).
    pub overlap: SliceOverlap,
}

impl SlicePlan {
    /// Slices still carrying work; adapters may invalidate slices later.
    pub fn valid_slices(&self) -> impl Iterator<Item = &SliceDescriptor> {
        self.slices.iter().filter(|s| s.valid)
    }

    pub fn valid_count(&self) -> usize {
        self.valid_slices().count()
    }
}

/// Slice payload width satisfying both the input and output limits.
fn slice_size(
    frame_in: ImageSize,
    out_widths: &[u32],
    line_buffer_len: u32,
) -> Result<(u32, u32), PlanError> {
    if frame_in.w == 0 || frame_in.h == 0 {
        return Err(PlanError::EmptyFrame);
    }
    if line_buffer_len <= SLICE_OVERLAP_W_MAX {
        return Err(PlanError::LineBufferTooSmall {
            line_buffer_len,
            min: SLICE_OVERLAP_W_MAX,
        });
    }

    // Input-based limit: payload plus worst-case overlap fits the line buffer.
    let slice_max_w = line_buffer_len - SLICE_OVERLAP_W_MAX;
    let mut slice_w = frame_in.w;
    if frame_in.w > line_buffer_len {
        let mut num = 1;
        loop {
            num += 1;
            slice_w = frame_in.w.div_ceil(num);
            if slice_w < slice_max_w {
                break;
            }
        }
    }
    debug!("input limit: w {} -> slice_w {}", frame_in.w, slice_w);

    // Output-based limit, translated back to input columns.
    let max_out = out_widths.iter().copied().max().unwrap_or(0);
    let slice_w_out = if max_out > 0 {
        let mut num = 1;
        if max_out > line_buffer_len {
            let mut w_out;
            loop {
                num += 1;
                w_out = max_out.div_ceil(num);
                if w_out < line_buffer_len {
                    break;
                }
            }
        }
        frame_in.w.div_ceil(num)
    } else {
        slice_w
    };
    debug!("output limit: max_out {} -> slice_w {}", max_out, slice_w_out);

    let w = aligned(slice_w.min(slice_w_out));
    // Height is not line-buffer bound; a second slice row only picks up the
    // remainder line left by alignment.
    let h = aligned(frame_in.h).max(SLICE_ALIGN);
    Ok((w, h))
}

/// Build the slice grid for one frame.
///
/// `fetch_origin` is the frame input-crop start; slice fetch rectangles are
/// shifted by it so fetch addressing works in source-buffer coordinates.
pub fn plan(
    frame_in: ImageSize,
    fetch_origin: (u32, u32),
    out_widths: &[u32],
    format: FetchFormat,
    line_buffer_len: u32,
) -> Result<SlicePlan, PlanError> {
    let (slice_width, slice_height) = slice_size(frame_in, out_widths, line_buffer_len)?;
    let overlap = overlap_for(format);

    let rows = frame_in.h.div_ceil(slice_height);
    let cols = frame_in.w.div_ceil(slice_width);
    if cols > MAX_SLICE_COLS || rows > MAX_SLICE_ROWS || cols * rows > MAX_SLICES {
        return Err(PlanError::GridTooLarge { cols, rows });
    }

    debug!(
        "img {}x{}, slice {}x{}, grid {}x{}",
        frame_in.w, frame_in.h, slice_width, slice_height, cols, rows
    );

    let mut slices = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let role_x = SliceRole::of(col, cols);
            let role_y = SliceRole::of(row, rows);

            let start_col = col * slice_width;
            let start_row = row * slice_height;
            let mut end_col = start_col + slice_width - 1;
            let mut end_row = start_row + slice_height - 1;

            let mut ov = SliceOverlap::default();
            if !role_y.is_first() {
                ov.up = overlap.up;
            }
            if !role_x.is_first() {
                ov.left = overlap.left;
            }
            if role_y.is_last() {
                end_row = frame_in.h - 1;
            } else {
                ov.down = overlap.down;
            }
            if role_x.is_last() {
                end_col = frame_in.w - 1;
            } else {
                ov.right = overlap.right;
            }

            let pos_orig = SlicePos { start_col, start_row, end_col, end_row };
            let pos = SlicePos {
                start_col: start_col - ov.left,
                start_row: start_row - ov.up,
                end_col: end_col + ov.right,
                end_row: end_row + ov.down,
            };
            let pos_fetch = SlicePos {
                start_col: pos.start_col + fetch_origin.0,
                start_row: pos.start_row + fetch_origin.1,
                end_col: pos.end_col + fetch_origin.0,
                end_row: pos.end_row + fetch_origin.1,
            };

            slices.push(SliceDescriptor {
                valid: true,
                row,
                col,
                role_x,
                role_y,
                pos_orig,
                pos,
                pos_fetch,
                overlap: ov,
            });
        }
    }

    Ok(SlicePlan {
        slices,
        cols,
        rows,
        slice_width,
        slice_height,
        img: frame_in,
        overlap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINEBUF: u32 = 2592;

    #[test]
    fn single_slice_when_frame_fits() {
        let plan = plan(
            ImageSize { w: 1920, h: 1080 },
            (0, 0),
            &[1920],
            FetchFormat::Yuv420_2Frame,
            LINEBUF,
        )
        .unwrap();
        assert_eq!(plan.cols, 1);
        assert_eq!(plan.rows, 1);
        assert_eq!(plan.slices.len(), 1);
        let s = &plan.slices[0];
        assert_eq!(s.overlap, SliceOverlap::default());
        assert_eq!(s.pos, s.pos_orig);
        assert_eq!(s.pos.end_col, 1919);
    }

    #[test]
    fn wide_frame_splits_on_input_limit() {
        let plan = plan(
            ImageSize { w: 4000, h: 3000 },
            (0, 0),
            &[4000],
            FetchFormat::Csi2Raw10,
            LINEBUF,
        )
        .unwrap();
        assert_eq!(plan.cols, 2);
        assert_eq!(plan.slice_width, 2000);
        let left = &plan.slices[0];
        let right = &plan.slices[1];
        // Interior edges carry the raw margins, frame edges carry none.
        assert_eq!(left.overlap.left, 0);
        assert_eq!(left.overlap.right, 142);
        assert_eq!(right.overlap.left, 90);
        assert_eq!(right.overlap.right, 0);
        // Expanded rectangles stay inside the frame at the outer edges.
        assert_eq!(left.pos.start_col, 0);
        assert_eq!(right.pos.end_col, 3999);
        // Nominal payloads tile the frame exactly.
        assert_eq!(left.pos_orig.end_col + 1, right.pos_orig.start_col);
    }

    #[test]
    fn output_limit_can_dominate() {
        // Input fits the line buffer but the widest output does not.
        let plan = plan(
            ImageSize { w: 2400, h: 1800 },
            (0, 0),
            &[4800],
            FetchFormat::Yuv420_2Frame,
            LINEBUF,
        )
        .unwrap();
        assert_eq!(plan.cols, 2);
        assert_eq!(plan.slice_width, 1200);
    }

    #[test]
    fn fetch_origin_shifts_fetch_pos_only() {
        let plan = plan(
            ImageSize { w: 1280, h: 720 },
            (64, 32),
            &[1280],
            FetchFormat::Yuv422_2Frame,
            LINEBUF,
        )
        .unwrap();
        let s = &plan.slices[0];
        assert_eq!(s.pos.start_col, 0);
        assert_eq!(s.pos_fetch.start_col, 64);
        assert_eq!(s.pos_fetch.start_row, 32);
        assert_eq!(s.pos_fetch.end_col, 64 + 1279);
    }

    #[test]
    fn replanning_is_deterministic() {
        let a = plan(
            ImageSize { w: 6000, h: 4000 },
            (0, 0),
            &[6000, 1920],
            FetchFormat::Csi2Raw10,
            LINEBUF,
        )
        .unwrap();
        let b = plan(
            ImageSize { w: 6000, h: 4000 },
            (0, 0),
            &[6000, 1920],
            FetchFormat::Csi2Raw10,
            LINEBUF,
        )
        .unwrap();
        assert_eq!(a.cols, b.cols);
        assert_eq!(a.slice_width, b.slice_width);
        for (x, y) in a.slices.iter().zip(b.slices.iter()) {
            assert_eq!(x.pos, y.pos);
        }
    }

    #[test]
    fn tiny_line_buffer_rejected() {
        let err = plan(
            ImageSize { w: 4000, h: 3000 },
            (0, 0),
            &[],
            FetchFormat::Csi2Raw10,
            SLICE_OVERLAP_W_MAX,
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::LineBufferTooSmall { .. }));
    }

    #[test]
    fn odd_height_splits_a_remainder_row() {
        // Height aligns down to 1080; a second slice row absorbs the last line.
        let plan = plan(
            ImageSize { w: 1920, h: 1081 },
            (0, 0),
            &[1920],
            FetchFormat::Yuv420_2Frame,
            LINEBUF,
        )
        .unwrap();
        assert_eq!(plan.rows, 2);
        assert_eq!(plan.slice_height, 1080);
        let top = &plan.slices[0];
        let bottom = &plan.slices[1];
        // Interior horizontal edges carry the vertical margins.
        assert_eq!(top.overlap.down, 68);
        assert_eq!(bottom.overlap.up, 46);
        assert_eq!(top.pos.end_row, 1079 + 68);
        assert_eq!(bottom.pos.start_row, 1080 - 46);
        assert_eq!(bottom.pos.end_row, 1080);
        // Payloads tile the frame height exactly.
        assert_eq!(top.pos_orig.height() + bottom.pos_orig.height(), 1081);
        assert_eq!(plan.valid_count(), 2);
    }

    #[test]
    fn oversized_grid_rejected() {
        // 16 columns over two rows exceeds the 16-entry slice table.
        let err = plan(
            ImageSize { w: 36000, h: 1081 },
            (0, 0),
            &[1920],
            FetchFormat::Csi2Raw10,
            LINEBUF,
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::GridTooLarge { .. }));
    }
}
