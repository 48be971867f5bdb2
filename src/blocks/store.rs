//! Store unit: per-slice output window and plane addresses.
//!
//! The store window depends on what feeds the path: the thumbnail scaler
//! output, the main scaler's trim1 window, or (scaler bypassed) the slice
//! payload with the overlap cropped off by the store borders.
//!
//! Output addressing is cumulative: each slice starts where the previous
//! one ended, tracked per path in an explicit [`StoreWalk`] accumulator.

use slice_core::{ImageSize, OutputAccumulator, SliceDescriptor};

use crate::blocks::scaler::SliceScaler;
use crate::blocks::thumbscaler::SliceThumbScaler;
use crate::config::{StoreConfig, StoreFormat};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreBorder {
    pub up: u32,
    pub down: u32,
    pub left: u32,
    pub right: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceStore {
    pub size: ImageSize,
    pub border: StoreBorder,
    pub addr: [u32; 3],
}

/// What feeds the store unit for this slice.
pub enum StoreSource<'a> {
    Thumb(&'a SliceThumbScaler),
    Scaler(&'a SliceScaler),
}

/// Cumulative output-start state of one path across the slice walk.
#[derive(Clone, Debug, Default)]
pub struct StoreWalk {
    out_start: OutputAccumulator,
}

impl StoreWalk {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn derive(
    cfg: &StoreConfig,
    source: StoreSource<'_>,
    slice: &SliceDescriptor,
    walk: &mut StoreWalk,
) -> SliceStore {
    let mut out = SliceStore::default();

    match source {
        StoreSource::Thumb(thumb) => {
            out.size = thumb.y_dst_after_scaler;
            if slice.row == 0 {
                walk.out_start.advance_col(slice.col, out.size.w);
            }
            if slice.col == 0 {
                walk.out_start.advance_row(slice.row, out.size.h);
            }
        }
        StoreSource::Scaler(scaler) if !scaler.bypass => {
            out.size = ImageSize { w: scaler.trim1.size_x, h: scaler.trim1.size_y };
            if slice.row == 0 {
                walk.out_start.advance_col(slice.col, out.size.w);
            }
            if slice.col == 0 {
                walk.out_start.advance_row(slice.row, out.size.h);
            }
        }
        StoreSource::Scaler(_) => {
            // Scaler bypassed: store the slice payload; the borders crop the
            // overlap margins and the output lands at the payload's absolute
            // position in the frame buffer.
            let ov = slice.overlap;
            out.size = ImageSize {
                w: slice.pos.width() - ov.left - ov.right,
                h: slice.pos.height() - ov.up - ov.down,
            };
            out.border = StoreBorder { up: ov.up, down: ov.down, left: ov.left, right: ov.right };
            if slice.row == 0 {
                walk.out_start.set_col_start(slice.col, slice.pos.start_col + ov.left);
            }
            if slice.col == 0 {
                walk.out_start.set_row_start(slice.row, slice.pos.start_row + ov.up);
            }
        }
    }

    let col_out = walk.out_start.col_start(slice.col);
    let row_out = walk.out_start.row_start(slice.row);

    let mut ch_offset = [0u32; 3];
    match cfg.format {
        StoreFormat::Uyvy => {
            ch_offset[0] = col_out * 2 + row_out * cfg.pitch[0];
        }
        StoreFormat::Yuv422_2Frame => {
            ch_offset[0] = col_out + row_out * cfg.pitch[0];
            ch_offset[1] = col_out + row_out * cfg.pitch[1];
        }
        StoreFormat::Yuv422_3Frame => {
            ch_offset[0] = col_out + row_out * cfg.pitch[0];
            ch_offset[1] = (col_out >> 1) + row_out * cfg.pitch[1];
            ch_offset[2] = (col_out >> 1) + row_out * cfg.pitch[2];
        }
        StoreFormat::Yuv420_2Frame | StoreFormat::Yvu420_2Frame => {
            ch_offset[0] = col_out + row_out * cfg.pitch[0];
            ch_offset[1] = col_out + row_out * cfg.pitch[1] / 2;
        }
        StoreFormat::Yuv420_3Frame => {
            ch_offset[0] = col_out + row_out * cfg.pitch[0];
            ch_offset[1] = (col_out >> 1) + row_out * cfg.pitch[1] / 2;
            ch_offset[2] = (col_out >> 1) + row_out * cfg.pitch[2] / 2;
        }
    }
    out.addr[0] = cfg.addr[0] + ch_offset[0];
    out.addr[1] = cfg.addr[1] + ch_offset[1];
    out.addr[2] = cfg.addr[2] + ch_offset[2];
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::minimal_config;
    use slice_core::{plan, FetchFormat, Trim};

    #[test]
    fn scaler_fed_slices_pack_left_to_right() {
        let cfg = minimal_config().paths[0].clone().unwrap().store;
        let mut walk = StoreWalk::new();
        let plan = plan(
            ImageSize { w: 4000, h: 2992 },
            (0, 0),
            &[2000],
            FetchFormat::Csi2Raw10,
            2592,
        )
        .unwrap();

        let s0 = SliceScaler {
            trim1: Trim { start_x: 0, start_y: 0, size_x: 1032, size_y: 1496 },
            ..Default::default()
        };
        let st0 = derive(&cfg, StoreSource::Scaler(&s0), &plan.slices[0], &mut walk);
        assert_eq!(st0.addr[0], cfg.addr[0]);
        assert_eq!(st0.size.w, 1032);

        let s1 = SliceScaler {
            trim1: Trim { start_x: 54, start_y: 0, size_x: 968, size_y: 1496 },
            ..Default::default()
        };
        let st1 = derive(&cfg, StoreSource::Scaler(&s1), &plan.slices[1], &mut walk);
        // second slice lands right after the first slice's columns
        assert_eq!(st1.addr[0], cfg.addr[0] + 1032);
        assert_eq!(st1.addr[1], cfg.addr[1] + 1032);
        assert_eq!(st1.size.w, 968);
    }

    #[test]
    fn bypass_crops_overlap_with_borders() {
        let cfg = minimal_config().paths[0].clone().unwrap().store;
        let mut walk = StoreWalk::new();
        let plan = plan(
            ImageSize { w: 4000, h: 2992 },
            (0, 0),
            &[4000],
            FetchFormat::Csi2Raw10,
            2592,
        )
        .unwrap();

        let bypass = SliceScaler { bypass: true, ..Default::default() };
        let st1 = derive(&cfg, StoreSource::Scaler(&bypass), &plan.slices[1], &mut walk);
        let s = &plan.slices[1];
        assert_eq!(st1.size.w, s.pos.width() - s.overlap.left);
        assert_eq!(st1.border.left, s.overlap.left);
        assert_eq!(st1.border.right, 0);
        // absolute payload start in the frame buffer
        assert_eq!(st1.addr[0], cfg.addr[0] + (s.pos.start_col + s.overlap.left));
    }

    #[test]
    fn uyvy_offsets_double_columns() {
        let mut cfg = minimal_config().paths[0].clone().unwrap().store;
        cfg.format = StoreFormat::Uyvy;
        cfg.addr = [0, 0, 0];
        let mut walk = StoreWalk::new();
        walk.out_start.set_col_start(0, 100);
        walk.out_start.set_row_start(0, 10);
        let plan = plan(
            ImageSize { w: 1920, h: 1080 },
            (0, 0),
            &[1920],
            FetchFormat::Yuv420_2Frame,
            2592,
        )
        .unwrap();
        let thumb = SliceThumbScaler::default();
        let st = derive(&cfg, StoreSource::Thumb(&thumb), &plan.slices[0], &mut walk);
        assert_eq!(st.addr[0], 100 * 2 + 10 * cfg.pitch[0]);
    }
}
