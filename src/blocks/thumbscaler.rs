//! Thumbnail scaler: per-slice trims and proportional scale factors.
//!
//! The thumbnail path has no phase continuation. Each slice trims the
//! intersection of the path window with its nominal rectangle and scales the
//! frame in/out factor pair down proportionally (round half up), so the
//! per-slice outputs concatenate to the frame thumbnail.

use slice_core::{ImageSize, SliceDescriptor, Trim};

use crate::config::ThumbScalerConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceThumbScaler {
    /// Overlap-expanded slice rectangle entering the path.
    pub src0: ImageSize,
    /// Luma window inside `src0`, slice-local.
    pub y_trim: Trim,
    pub uv_trim: Trim,
    pub y_factor_in: ImageSize,
    pub y_factor_out: ImageSize,
    pub uv_factor_in: ImageSize,
    pub uv_factor_out: ImageSize,
    pub y_src_after_deci: ImageSize,
    pub y_dst_after_scaler: ImageSize,
    pub uv_src_after_deci: ImageSize,
    pub uv_dst_after_scaler: ImageSize,
    pub y_init_phase: ImageSize,
    pub uv_init_phase: ImageSize,
}

/// Scale `v` by the frame out/in ratio, rounding half up.
fn rescale(v: u32, frm_out: u32, frm_in: u32) -> u32 {
    (v * frm_out + (frm_out + 1) / 2) / frm_in
}

/// Derive one slice of the thumbnail path; `None` when the path window does
/// not intersect this slice.
pub fn derive(cfg: &ThumbScalerConfig, slice: &SliceDescriptor) -> Option<SliceThumbScaler> {
    let frm_start_col = cfg.trim0.start_x;
    let frm_end_col = cfg.trim0.end_x();
    let frm_start_row = cfg.trim0.start_y;
    let frm_end_row = cfg.trim0.end_y();

    if slice.pos_orig.end_col < frm_start_col || slice.pos_orig.start_col > frm_end_col {
        return None;
    }

    let mut out = SliceThumbScaler {
        src0: ImageSize { w: slice.pos.width(), h: slice.pos.height() },
        ..Default::default()
    };

    let slc_start_col = slice.pos_orig.start_col.max(frm_start_col);
    let slc_start_row = slice.pos_orig.start_row.max(frm_start_row);
    let slc_end_col = slice.pos_orig.end_col.min(frm_end_col);
    let slc_end_row = slice.pos_orig.end_row.min(frm_end_row);
    let trim_w = slc_end_col - slc_start_col + 1;
    let trim_h = slc_end_row - slc_start_row + 1;

    out.y_trim = Trim {
        start_x: slc_start_col - slice.pos.start_col,
        start_y: slc_start_row - slice.pos.start_row,
        size_x: trim_w,
        size_y: trim_h,
    };
    out.uv_trim = Trim {
        start_x: out.y_trim.start_x / 2,
        start_y: out.y_trim.start_y,
        size_x: trim_w / 2,
        size_y: trim_h,
    };

    out.y_factor_in = ImageSize { w: trim_w / cfg.deci_x, h: trim_h / cfg.deci_y };
    out.y_factor_out = ImageSize {
        w: rescale(out.y_factor_in.w, cfg.y_factor_out.w, cfg.y_factor_in.w),
        h: rescale(out.y_factor_in.h, cfg.y_factor_out.h, cfg.y_factor_in.h),
    };
    out.y_src_after_deci = out.y_factor_in;
    out.y_dst_after_scaler = out.y_factor_out;

    out.uv_factor_in = ImageSize { w: trim_w / cfg.deci_x / 2, h: trim_h / cfg.deci_y };
    out.uv_factor_out = ImageSize {
        w: rescale(out.uv_factor_in.w, cfg.uv_factor_out.w, cfg.uv_factor_in.w),
        h: rescale(out.uv_factor_in.h, cfg.uv_factor_out.h, cfg.uv_factor_in.h),
    };
    out.uv_src_after_deci = out.uv_factor_in;
    out.uv_dst_after_scaler = out.uv_factor_out;

    Some(out)
}
