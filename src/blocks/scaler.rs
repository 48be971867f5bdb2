//! Scaler path: per-slice trim, decimation, phase and output trim.
//!
//! The chain per slice is trim0 (cut the path's input window out of the
//! overlap-expanded slice) -> decimation alignment -> scaler phase
//! continuation -> trim1 (cut the exact output columns this slice owns).
//!
//! Phase continuity across slices is the delicate part: each slice's initial
//! phase is derived from the frame-global phase ramp so that the seams
//! between slices land on the same sample grid the unsliced frame would use.
//! Horizontal math runs on half-width (chroma pair) units, vertical on whole
//! lines.
//!
//! trim1 bookkeeping is cumulative: slice N+1's output start is the sum of
//! trim1 widths emitted so far, tracked in an explicit [`PathWalk`]
//! accumulator instead of hidden static state.

use slice_core::{
    scaler_bad_overlap, ImageSize, OutputAccumulator, SliceDescriptor, SliceOverlap, SlicePlan,
    Trim,
};

use crate::config::{OutputDataMode, PathConfig};
use crate::error::{IspError, IspResult};

/// Output-pixel alignment of trim1 cuts.
const TRIM1_PIX_ALIGN: u32 = 8;
/// Horizontal filter taps.
const TAP_HOR: u32 = 8;

/// Derived scaler programming for one slice of one path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceScaler {
    pub bypass: bool,
    /// Input window in slice-local coordinates.
    pub trim0: Trim,
    /// Window after decimation, fed to the scaler core.
    pub scaler_in: ImageSize,
    pub scaler_out: ImageSize,
    /// Output window this slice owns, in scaler-output coordinates.
    pub trim1: Trim,
    pub ip_int: u32,
    pub ip_rmd: u32,
    pub cip_int: u32,
    pub cip_rmd: u32,
    pub ip_int_ver: u32,
    pub ip_rmd_ver: u32,
    pub cip_int_ver: u32,
    pub cip_rmd_ver: u32,
    /// Full slice rectangle entering the path.
    pub src: ImageSize,
}

/// Cumulative trim1 state of one path across the slice walk.
#[derive(Clone, Debug, Default)]
pub struct PathWalk {
    trim1_sum: OutputAccumulator,
}

impl PathWalk {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Working state shared by the derivation stages; mirrors the per-slice
/// geometry plus the frame-constant margins.
struct Stage {
    col: u32,
    cols: u32,
    row: u32,
    rows: u32,
    start_col: u32,
    end_col: u32,
    start_row: u32,
    end_row: u32,
    bad: SliceOverlap,
    trim0_end_x: u32,
    trim0_end_y: u32,
    deci_x: u32,
    deci_y: u32,
    deci_x_align: u32,
    deci_y_align: u32,
    trim0_start_adjust_x: u32,
    trim0_start_adjust_y: u32,
    out_width_temp: u32,
    out_height_temp: u32,
}

fn calc_phase(phase: u32, factor: u32) -> (u32, u32) {
    let int = phase / factor;
    (int, phase - factor * int)
}

/// Derive one slice of one scaler path. Returns `None` when the path's input
/// window does not intersect this slice (path disabled for the slice).
pub fn derive(
    path: &PathConfig,
    plan: &SlicePlan,
    slice: &SliceDescriptor,
    walk: &mut PathWalk,
) -> IspResult<Option<SliceScaler>> {
    let bad = scaler_bad_overlap(plan.overlap);
    let t0 = &path.trim0;

    let mut st = Stage {
        col: slice.col,
        cols: plan.cols,
        row: slice.row,
        rows: plan.rows,
        start_col: slice.pos.start_col,
        end_col: slice.pos.end_col,
        start_row: slice.pos.start_row,
        end_row: slice.pos.end_row,
        bad,
        trim0_end_x: t0.start_x + t0.size_x,
        trim0_end_y: t0.start_y + t0.size_y,
        deci_x: path.deci_x,
        deci_y: path.deci_y,
        deci_x_align: path.deci_x * 2,
        deci_y_align: match path.odata {
            OutputDataMode::Yuv422 => path.deci_y,
            OutputDataMode::Yuv420 => path.deci_y * 2,
        },
        trim0_start_adjust_x: 0,
        trim0_start_adjust_y: 0,
        out_width_temp: 0,
        out_height_temp: 0,
    };

    let mut out = SliceScaler { bypass: path.scaler_bypass, ..Default::default() };
    if !trim0(&st, t0, slice, &mut out) {
        return Ok(None);
    }
    deci(&mut st, t0, &mut out);
    phases(&mut st, t0, path, slice, &mut out)?;
    trim1(&st, t0, path, slice, walk, &mut out);

    // Output starts accumulate along the top row / left column only; the
    // grid is separable so that covers every slice.
    if slice.row == 0 {
        walk.trim1_sum.advance_col(slice.col, out.trim1.size_x);
    }
    if slice.col == 0 {
        walk.trim1_sum.advance_row(slice.row, out.trim1.size_y);
    }

    out.src = ImageSize {
        w: st.end_col - st.start_col + 1,
        h: st.end_row - st.start_row + 1,
    };
    Ok(Some(out))
}

/// Cut the path input window out of the slice. False means no overlap at all.
fn trim0(st: &Stage, t0: &Trim, slice: &SliceDescriptor, out: &mut SliceScaler) -> bool {
    let start = st.start_col + st.bad.left;
    let end = st.end_col + 1 - st.bad.right;

    if st.cols == 1 {
        out.trim0.start_x = t0.start_x;
        out.trim0.size_x = t0.size_x;
    } else {
        if slice.pos_orig.end_col < t0.start_x
            || slice.pos_orig.start_col > t0.start_x + t0.size_x - 1
        {
            return false;
        }
        if st.col == 0 {
            out.trim0.start_x = t0.start_x;
            out.trim0.size_x = if st.trim0_end_x < end {
                t0.size_x
            } else {
                end - t0.start_x
            };
        } else if st.col == st.cols - 1 {
            if t0.start_x > start {
                out.trim0.start_x = t0.start_x - st.start_col;
                out.trim0.size_x = t0.size_x;
            } else {
                out.trim0.start_x = st.bad.left;
                out.trim0.size_x = st.trim0_end_x - start;
            }
        } else if t0.start_x < start {
            out.trim0.start_x = st.bad.left;
            out.trim0.size_x = if st.trim0_end_x < end {
                st.trim0_end_x - start
            } else {
                end - start
            };
        } else {
            out.trim0.start_x = t0.start_x - st.start_col;
            out.trim0.size_x = if st.trim0_end_x < end {
                t0.size_x
            } else {
                end - t0.start_x
            };
        }
    }

    let start = st.start_row + st.bad.up;
    let end = st.end_row + 1 - st.bad.down;

    if st.rows == 1 {
        out.trim0.start_y = t0.start_y;
        out.trim0.size_y = t0.size_y;
    } else {
        if slice.pos_orig.end_row < t0.start_y
            || slice.pos_orig.start_row > t0.start_y + t0.size_y - 1
        {
            return false;
        }
        if st.row == 0 {
            out.trim0.start_y = t0.start_y;
            out.trim0.size_y = if st.trim0_end_y < end {
                t0.size_y
            } else {
                end - t0.start_y
            };
        } else if st.row == st.rows - 1 {
            if t0.start_y > start {
                out.trim0.start_y = t0.start_y - st.start_row;
                out.trim0.size_y = t0.size_y;
            } else {
                out.trim0.start_y = st.bad.up;
                out.trim0.size_y = st.trim0_end_y - start;
            }
        } else if t0.start_y < start {
            out.trim0.start_y = st.bad.up;
            out.trim0.size_y = if st.trim0_end_y < end {
                st.trim0_end_y - start
            } else {
                end - start
            };
        } else {
            out.trim0.start_y = t0.start_y - st.start_row;
            out.trim0.size_y = if st.trim0_end_y < end {
                t0.size_y
            } else {
                end - t0.start_y
            };
        }
    }
    true
}

/// Align the trimmed window to the decimation grid.
fn deci(st: &mut Stage, t0: &Trim, out: &mut SliceScaler) {
    let start = st.start_col + st.bad.left;
    if t0.start_x >= st.start_col && t0.start_x <= st.end_col + 1 {
        out.trim0.size_x = out.trim0.size_x / st.deci_x_align * st.deci_x_align;
    } else {
        st.trim0_start_adjust_x =
            start.div_ceil(st.deci_x_align) * st.deci_x_align - start;
        out.trim0.start_x += st.trim0_start_adjust_x;
        out.trim0.size_x -= st.trim0_start_adjust_x;
        out.trim0.size_x = out.trim0.size_x / st.deci_x_align * st.deci_x_align;
    }

    let start = st.start_row + st.bad.up;
    if t0.start_y >= st.start_row && t0.start_y <= st.end_row + 1 {
        out.trim0.size_y = out.trim0.size_y / st.deci_y_align * st.deci_y_align;
    } else {
        st.trim0_start_adjust_y =
            start.div_ceil(st.deci_y_align) * st.deci_y_align - start;
        out.trim0.start_y += st.trim0_start_adjust_y;
        out.trim0.size_y -= st.trim0_start_adjust_y;
        out.trim0.size_y = out.trim0.size_y / st.deci_y_align * st.deci_y_align;
    }

    out.scaler_in = ImageSize {
        w: out.trim0.size_x / st.deci_x,
        h: out.trim0.size_y / st.deci_y,
    };
}

/// Scaler output size and initial phase continuation.
fn phases(
    st: &mut Stage,
    t0: &Trim,
    path: &PathConfig,
    slice: &SliceDescriptor,
    out: &mut SliceScaler,
) -> IspResult<()> {
    if path.scaler_bypass {
        out.scaler_out = out.scaler_in;
        let start =
            st.start_col + st.bad.left + st.trim0_start_adjust_x + st.deci_x_align - 1;
        st.out_width_temp =
            (t0.size_x - (start / st.deci_x_align * st.deci_x_align - t0.start_x)) / st.deci_x;
        let start = st.start_row + st.bad.up + st.trim0_start_adjust_y + st.deci_y_align - 1;
        st.out_height_temp =
            (t0.size_y - (start / st.deci_y_align * st.deci_y_align - t0.start_y)) / st.deci_y;
        return Ok(());
    }

    let (factor_in, factor_out) = path.factors_hor();
    // horizontal math runs on chroma pairs
    let f_in = factor_in / 2;
    let f_out = factor_out / 2;
    let last_phase = f_in * (path.dst.w / 2 - 1);
    let tap_uv = TAP_HOR / 2;

    let start = st.start_col + st.bad.left + st.deci_x_align - 1;
    let end = st.end_col + 1 - st.bad.right + st.deci_x_align - 1;

    let phase_in;
    if t0.start_x >= st.start_col && t0.start_x <= st.end_col + 1 {
        let phase_tmp = if out.scaler_in.w == t0.size_x / st.deci_x {
            last_phase
        } else {
            (out.scaler_in.w / 2 - tap_uv / 2) * f_out - f_in / 2 - 1
        };
        let out_tmp = phase_tmp / f_in + 1;
        out.scaler_out.w = out_tmp * 2;
        phase_in = 0;
    } else {
        let mut phase = (tap_uv / 2) * f_out;
        if st.col == st.cols - 1
            || (st.trim0_end_x >= st.start_col
                && st.trim0_end_x <= st.end_col + 1 - st.bad.right)
        {
            let phase_tmp =
                last_phase - ((t0.size_x / 2) / st.deci_x - out.scaler_in.w / 2) * f_out;
            let out_tmp = (phase_tmp - phase) / f_in + 1;
            out.scaler_out.w = out_tmp * 2;
            phase = phase_tmp - (out_tmp - 1) * f_in;
        } else {
            // interior slice: extrapolate the frame phase ramp onto the
            // slice's deci-aligned start, then re-anchor at its end
            let start_aligned = start / st.deci_x_align * st.deci_x_align;
            let initial_phase = (((start_aligned - t0.start_x) / st.deci_x / 2 + tap_uv / 2)
                * f_out
                + (f_in - 1))
                / f_in
                * f_in;
            st.out_width_temp = ((last_phase - initial_phase) / f_in + 1) * 2;

            let scl_temp = ((end / st.deci_x_align * st.deci_x_align - t0.start_x)
                / st.deci_x)
                / 2;
            let last = ((scl_temp - tap_uv / 2) * f_out - f_in / 2 - 1) / f_in * f_in;
            let out_tmp = (last - initial_phase) / f_in + 1;
            out.scaler_out.w = out_tmp * 2;
            phase = initial_phase - ((start_aligned - t0.start_x) / st.deci_x / 2) * f_out;
        }
        phase_in = phase;
    }

    (out.ip_int, out.ip_rmd) = calc_phase(phase_in * 4, f_out * 2);
    (out.cip_int, out.cip_rmd) = calc_phase(phase_in, f_out);

    // vertical: whole-line units, taps from the loaded coefficients
    let (f_in, f_out) = path.factors_ver();
    let last_phase = f_in * (path.dst.h - 1);
    let tap_ver = path.y_ver_tap.max(path.uv_ver_tap) + 2;

    let start = st.start_row + st.bad.up + st.deci_y_align - 1;
    let end = st.end_row + 1 - st.bad.down + st.deci_y_align - 1;

    let mut phase_in;
    if t0.start_y >= st.start_row && t0.start_y <= st.end_row + 1 {
        let phase_tmp = if out.scaler_in.h == t0.size_y / st.deci_y {
            last_phase
        } else {
            (out.scaler_in.h - tap_ver / 2) * f_out - 1
        };
        let mut out_tmp = phase_tmp / f_in + 1;
        if out_tmp % 2 == 1 {
            out_tmp -= 1;
        }
        out.scaler_out.h = out_tmp;
        phase_in = 0;
    } else {
        phase_in = (tap_ver / 2) * f_out;
        if st.row == st.rows - 1
            || (st.trim0_end_y >= st.start_row
                && st.trim0_end_y <= st.end_row + 1 - st.bad.down)
        {
            let phase_tmp = last_phase - (t0.size_y / st.deci_y - out.scaler_in.h) * f_out;
            let mut out_tmp = (phase_tmp - phase_in) / f_in + 1;
            if out_tmp % 2 == 1 {
                out_tmp -= 1;
            }
            if path.odata == OutputDataMode::Yuv420 && out_tmp % 4 != 0 {
                out_tmp = out_tmp / 4 * 4;
            }
            out.scaler_out.h = out_tmp;
            phase_in = phase_tmp - (out_tmp - 1) * f_in;
        } else {
            let start_aligned = start / st.deci_y_align * st.deci_y_align;
            let initial_phase = (((start_aligned - t0.start_y) / st.deci_y + tap_ver / 2)
                * f_out
                + (f_in - 1))
                / (f_in * 2)
                * (f_in * 2);
            st.out_height_temp = (last_phase - initial_phase) / f_in + 1;
            let scl_temp = (end / st.deci_y_align * st.deci_y_align - t0.start_y) / st.deci_y;
            let last = ((scl_temp - tap_ver / 2) * f_out - 1) / f_in * f_in;
            let mut out_tmp = (last - initial_phase) / f_in + 1;
            if out_tmp % 2 == 1 {
                out_tmp -= 1;
            }
            if path.odata == OutputDataMode::Yuv420 && out_tmp % 4 != 0 {
                out_tmp = out_tmp / 4 * 4;
            }
            out.scaler_out.h = out_tmp;
            phase_in =
                initial_phase - (start_aligned - t0.start_y) / st.deci_y * f_out;
        }
    }

    (out.ip_int_ver, out.ip_rmd_ver) = calc_phase(phase_in, f_out);
    let (mut cphase, mut cf_out) = (phase_in, f_out);
    if path.odata == OutputDataMode::Yuv420 {
        cphase /= 2;
        cf_out /= 2;
    }
    (out.cip_int_ver, out.cip_rmd_ver) = calc_phase(cphase, cf_out);

    // The phase integer field is 4 bits; fold excess whole taps back into
    // trim0 in units of 8 input pixels.
    if out.ip_int >= 16 {
        let n = (out.ip_int >> 3) - 1;
        out.trim0.start_x += 8 * n * st.deci_x;
        out.trim0.size_x -= 8 * n * st.deci_x;
        out.ip_int -= 8 * n;
        out.cip_int -= 4 * n;
    }
    if out.ip_int >= 16 {
        return Err(IspError::phase_overflow("horizontal", slice.col, out.ip_int));
    }
    if out.ip_int_ver >= 16 {
        let n = (out.ip_int_ver >> 3) - 1;
        out.trim0.start_y += 8 * n * st.deci_y;
        out.trim0.size_y -= 8 * n * st.deci_y;
        out.ip_int_ver -= 8 * n;
        out.cip_int_ver -= 8 * n;
    }
    if out.ip_int_ver >= 16 {
        return Err(IspError::phase_overflow("vertical", slice.col, out.ip_int_ver));
    }
    Ok(())
}

/// Cut the output columns/rows this slice owns out of its scaler output.
fn trim1(
    st: &Stage,
    t0: &Trim,
    path: &PathConfig,
    slice: &SliceDescriptor,
    walk: &PathWalk,
    out: &mut SliceScaler,
) {
    let trim_sum_x = walk.trim1_sum.col_start(slice.col);
    let trim_sum_y = walk.trim1_sum.row_start(slice.row);
    let frame_out = if path.scaler_bypass {
        ImageSize { w: t0.size_x / path.deci_x, h: t0.size_y / path.deci_y }
    } else {
        path.dst
    };

    if t0.start_x >= st.start_col && t0.start_x <= st.end_col + 1 {
        out.trim1.start_x = 0;
        out.trim1.size_x = if out.scaler_in.w == t0.size_x {
            out.scaler_out.w
        } else {
            out.scaler_out.w & !(TRIM1_PIX_ALIGN - 1)
        };
    } else if st.col == st.cols - 1
        || (st.trim0_end_x >= st.start_col && st.trim0_end_x <= st.end_col + 1 - st.bad.right)
    {
        out.trim1.size_x = frame_out.w - trim_sum_x;
        out.trim1.start_x = out.scaler_out.w - out.trim1.size_x;
    } else {
        out.trim1.start_x = st.out_width_temp - (frame_out.w - trim_sum_x);
        out.trim1.size_x = (out.scaler_out.w - out.trim1.start_x) & !(TRIM1_PIX_ALIGN - 1);
    }

    if t0.start_y >= st.start_row && t0.start_y <= st.end_row + 1 {
        out.trim1.start_y = 0;
        out.trim1.size_y = if out.scaler_in.h == t0.size_y {
            out.scaler_out.h
        } else {
            out.scaler_out.h & !(TRIM1_PIX_ALIGN - 1)
        };
    } else if st.row == st.rows - 1
        || (st.trim0_end_y >= st.start_row && st.trim0_end_y <= st.end_row + 1 - st.bad.down)
    {
        out.trim1.size_y = frame_out.h - trim_sum_y;
        out.trim1.start_y = out.scaler_out.h - out.trim1.size_y;
    } else {
        out.trim1.start_y = st.out_height_temp - (frame_out.h - trim_sum_y);
        out.trim1.size_y = (out.scaler_out.h - out.trim1.start_y) & !(TRIM1_PIX_ALIGN - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::minimal_config;
    use slice_core::{plan, FetchFormat};

    fn scaled_path(frame_w: u32, frame_h: u32, out_w: u32, out_h: u32) -> PathConfig {
        let mut p = minimal_config().paths[0].clone().unwrap();
        p.trim0 = Trim { start_x: 0, start_y: 0, size_x: frame_w, size_y: frame_h };
        p.dst = ImageSize { w: out_w, h: out_h };
        p.scaler_bypass = false;
        p
    }

    #[test]
    fn single_slice_passes_frame_through() {
        let path = scaled_path(1920, 1080, 960, 540);
        let plan = plan(
            ImageSize { w: 1920, h: 1080 },
            (0, 0),
            &[960],
            FetchFormat::Yuv420_2Frame,
            2592,
        )
        .unwrap();
        let mut walk = PathWalk::new();
        let s = derive(&path, &plan, &plan.slices[0], &mut walk).unwrap().unwrap();
        assert_eq!(s.scaler_in, ImageSize { w: 1920, h: 1080 });
        assert_eq!(s.scaler_out, ImageSize { w: 960, h: 540 });
        assert_eq!(s.trim1, Trim { start_x: 0, start_y: 0, size_x: 960, size_y: 540 });
        assert_eq!((s.ip_int, s.ip_rmd, s.cip_int, s.cip_rmd), (0, 0, 0, 0));
    }

    #[test]
    fn two_slices_tile_the_output_exactly() {
        // 4000 -> 2000 over two raw slices
        let path = scaled_path(4000, 2992, 2000, 1496);
        let plan = plan(
            ImageSize { w: 4000, h: 2992 },
            (0, 0),
            &[2000],
            FetchFormat::Csi2Raw10,
            2592,
        )
        .unwrap();
        assert_eq!(plan.cols, 2);
        let mut walk = PathWalk::new();

        let s0 = derive(&path, &plan, &plan.slices[0], &mut walk).unwrap().unwrap();
        assert_eq!(s0.trim0.size_x, 2068);
        assert_eq!(s0.scaler_out.w, 1032);
        assert_eq!(s0.trim1, Trim { start_x: 0, start_y: 0, size_x: 1032, size_y: 1496 });

        let s1 = derive(&path, &plan, &plan.slices[1], &mut walk).unwrap().unwrap();
        assert_eq!(s1.trim0.start_x, 42);
        assert_eq!(s1.trim0.size_x, 2048);
        assert_eq!(s1.scaler_out.w, 1022);
        assert_eq!((s1.ip_int, s1.cip_int), (4, 2));
        assert_eq!(s1.trim1.start_x, 54);
        assert_eq!(s1.trim1.size_x, 968);

        assert_eq!(s0.trim1.size_x + s1.trim1.size_x, 2000);
    }

    #[test]
    fn path_outside_slice_is_dropped() {
        // path input confined to the left slice
        let mut path = scaled_path(4000, 2992, 800, 598);
        path.trim0 = Trim { start_x: 0, start_y: 0, size_x: 1800, size_y: 2992 };
        let plan = plan(
            ImageSize { w: 4000, h: 2992 },
            (0, 0),
            &[800],
            FetchFormat::Csi2Raw10,
            2592,
        )
        .unwrap();
        let mut walk = PathWalk::new();
        assert!(derive(&path, &plan, &plan.slices[0], &mut walk).unwrap().is_some());
        assert!(derive(&path, &plan, &plan.slices[1], &mut walk).unwrap().is_none());
    }

    #[test]
    fn remainder_row_tiles_the_output_height() {
        // 1081 lines align down to a 1080-line slice; a second slice row
        // carries the last line.
        let mut path = scaled_path(1920, 1081, 1920, 1081);
        path.scaler_bypass = true;
        let plan = plan(
            ImageSize { w: 1920, h: 1081 },
            (0, 0),
            &[1920],
            FetchFormat::Yuv420_2Frame,
            2592,
        )
        .unwrap();
        assert_eq!(plan.rows, 2);
        let mut walk = PathWalk::new();

        let top = derive(&path, &plan, &plan.slices[0], &mut walk).unwrap().unwrap();
        assert_eq!(top.trim1.size_y, 1080);

        let bottom = derive(&path, &plan, &plan.slices[1], &mut walk).unwrap().unwrap();
        // the bottom slice trims its up-overlap and keeps one output line
        assert_eq!(bottom.trim0.start_y, 14);
        assert_eq!(bottom.scaler_in.h, 32);
        assert_eq!(bottom.trim1.start_y, 31);
        assert_eq!(bottom.trim1.size_y, 1);

        assert_eq!(top.trim1.size_y + bottom.trim1.size_y, 1081);
    }

    #[test]
    fn bypass_keeps_input_size() {
        let mut path = scaled_path(1920, 1080, 1920, 1080);
        path.scaler_bypass = true;
        let plan = plan(
            ImageSize { w: 1920, h: 1080 },
            (0, 0),
            &[1920],
            FetchFormat::Yuv420_2Frame,
            2592,
        )
        .unwrap();
        let mut walk = PathWalk::new();
        let s = derive(&path, &plan, &plan.slices[0], &mut walk).unwrap().unwrap();
        assert!(s.bypass);
        assert_eq!(s.scaler_out, s.scaler_in);
    }
}
