//! Per-slice register walk.
//!
//! One pass over the derived slice state, in hardware programming order:
//! spatial NR windows, fetch (linear or compressed), 3DNR, tone mapping,
//! grain seeds, the scaler paths with their stores, then the slice trigger
//! followed by the shadow-done and all-done tokens. The all-done token is
//! the last entry of every slice so the command unit knows to advance to
//! the next one.

use slice_core::SliceDescriptor;

use crate::blocks::fbc_store::SliceFbcStore;
use crate::blocks::fbd_raw::SliceFbdRaw;
use crate::blocks::fetch::SliceFetch;
use crate::blocks::ltm::SliceLtm;
use crate::blocks::noisefilter::SliceNoiseFilter;
use crate::blocks::nr::SliceNr;
use crate::blocks::nr3::{SliceNr3, SliceNr3FbdFetch};
use crate::blocks::scaler::SliceScaler;
use crate::blocks::store::SliceStore;
use crate::blocks::thumbscaler::SliceThumbScaler;
use crate::emit::{regs, RegSink};

/// How each slice is kicked off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// Config-buffer operation: arm the CFG copy before the slice and raise
    /// capture readiness after it.
    Cfg,
    /// Software starts the fetch unit directly.
    Fetch,
}

/// Derived state of one output path for one slice. `None` members mean the
/// unit sits out this slice; a fully empty path state emits the disable
/// words so stale programming from the previous slice cannot leak.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlicePathState {
    pub scaler: Option<SliceScaler>,
    pub thumb: Option<SliceThumbScaler>,
    pub store: Option<SliceStore>,
    pub fbc: Option<SliceFbcStore>,
}

/// Everything derived for one slice, ready for emission.
#[derive(Clone, Debug)]
pub struct SliceState {
    pub desc: SliceDescriptor,
    pub nr: SliceNr,
    pub fetch: Option<SliceFetch>,
    pub fbd_raw: Option<SliceFbdRaw>,
    pub nr3: Option<SliceNr3>,
    pub ltm_rgb: Option<SliceLtm>,
    pub ltm_yuv: Option<SliceLtm>,
    pub noise_filter: Option<SliceNoiseFilter>,
    /// Indexed by [`PathId`](crate::config::PathId); `None` means the path
    /// is disabled for the whole frame.
    pub paths: [Option<SlicePathState>; 3],
}

fn pack_wh(w: u32, h: u32, mask: u32) -> u32 {
    ((h & mask) << 16) | (w & mask)
}

fn pack_xy(x: u32, y: u32, mask: u32) -> u32 {
    ((y & mask) << 16) | (x & mask)
}

fn emit_nr(nr: &SliceNr, sink: &mut impl RegSink) {
    sink.push(regs::NLM_CENTER, pack_xy(nr.nlm_center_x_rel, nr.nlm_center_y_rel, 0x3fff));
    sink.push(regs::POSTCDN_SLICE_CTRL, nr.postcdn_start_row_mod4);
    sink.push(
        regs::YNR_CFG31,
        pack_xy(nr.ynr_center_offset_x as u32, nr.ynr_center_offset_y as u32, 0xffff),
    );
    sink.push(regs::YNR_CFG33, pack_wh(nr.ynr_slice_width, nr.ynr_slice_height, 0xffff));
}

fn emit_fetch(fetch: &SliceFetch, sink: &mut impl RegSink) {
    let size = pack_wh(fetch.size.w, fetch.size.h, 0xffff);
    sink.push(regs::FETCH_MEM_SLICE_SIZE, size);
    sink.push(regs::FETCH_SLICE_Y_ADDR, fetch.addr[0]);
    sink.push(regs::FETCH_SLICE_U_ADDR, fetch.addr[1]);
    sink.push(regs::FETCH_SLICE_V_ADDR, fetch.addr[2]);
    sink.push(
        regs::FETCH_MIPI_INFO,
        fetch.mipi_word_num | (fetch.mipi_byte_rel_pos << 16),
    );
    sink.push(regs::DISPATCH_CH0_SIZE, size);
}

fn emit_fbd_raw(f: &SliceFbdRaw, sink: &mut impl RegSink) {
    sink.push(regs::FBD_RAW_SLICE_SIZE, pack_wh(f.width, f.height, 0x1fff));
    sink.push(regs::FBD_RAW_TILE_NUM, pack_wh(f.tiles_num_in_hor, f.tiles_num_in_ver, 0xffff));
    sink.push(
        regs::FBD_RAW_PIXEL_START,
        (f.tiles_start_odd << 28) | pack_wh(f.pixel_start_in_hor, f.pixel_start_in_ver, 0xff),
    );
    sink.push(regs::FBD_RAW_TILE_PITCH, f.tiles_num_pitch);
    sink.push(regs::FBD_RAW_TILE_ADDR, f.tile_addr_init_x256);
    sink.push(regs::FBD_RAW_HEADER_ADDR, f.header_addr_init);
    sink.push(regs::FBD_RAW_LOWBIT_ADDR, f.low_bit_addr_init);
    sink.push(regs::DISPATCH_CH0_SIZE, pack_wh(f.width, f.height, 0xffff));
}

fn emit_nr3_fbd(f: &SliceNr3FbdFetch, sink: &mut impl RegSink) {
    sink.push(
        regs::NR3_FBD_Y_SLICE_SIZE,
        pack_wh(f.y_pixel_size_in_hor, f.y_pixel_size_in_ver, 0x1fff),
    );
    sink.push(
        regs::NR3_FBD_C_SLICE_SIZE,
        pack_wh(f.c_pixel_size_in_hor, f.c_pixel_size_in_ver, 0x1fff),
    );
    sink.push(
        regs::NR3_FBD_Y_PIXEL_START,
        (f.y_tiles_start_odd << 28) | pack_wh(f.y_pixel_start_in_hor, f.y_pixel_start_in_ver, 0xff),
    );
    sink.push(
        regs::NR3_FBD_C_PIXEL_START,
        (f.c_tiles_start_odd << 28) | pack_wh(f.c_pixel_start_in_hor, f.c_pixel_start_in_ver, 0xff),
    );
    sink.push(regs::NR3_FBD_Y_TILE_NUM, pack_wh(f.y_tiles_num_in_hor, f.y_tiles_num_in_ver, 0xffff));
    sink.push(regs::NR3_FBD_C_TILE_NUM, pack_wh(f.c_tiles_num_in_hor, f.c_tiles_num_in_ver, 0xffff));
    sink.push(regs::NR3_FBD_TILE_PITCH, f.y_tiles_num_pitch);
    sink.push(regs::NR3_FBD_Y_TILE_ADDR, f.y_tile_addr_init_x256);
    sink.push(regs::NR3_FBD_C_TILE_ADDR, f.c_tile_addr_init_x256);
    sink.push(regs::NR3_FBD_Y_HEADER_ADDR, f.y_header_addr_init);
    sink.push(regs::NR3_FBD_C_HEADER_ADDR, f.c_header_addr_init);
}

fn emit_nr3(nr3: &SliceNr3, sink: &mut impl RegSink) {
    let m = &nr3.memctrl;
    sink.push(regs::NR3_MEM_CTRL_PARAM1, ((m.start_col & 0x1fff) << 16) | (m.start_row & 0x1fff));
    sink.push(regs::NR3_MEM_CTRL_PARAM3, pack_wh(m.src.w, m.src.h, 0x1fff));
    sink.push(regs::NR3_MEM_CTRL_PARAM4, pack_wh(m.ft_y.w, m.ft_y.h, 0x1fff));
    sink.push(regs::NR3_MEM_CTRL_PARAM5, pack_wh(m.ft_uv.w, m.ft_uv.h, 0x1fff));
    if let Some(fbd) = &nr3.fbd_fetch {
        emit_nr3_fbd(fbd, sink);
    } else {
        sink.push(regs::NR3_MEM_CTRL_FT_LUMA_ADDR, m.addr[0]);
        sink.push(regs::NR3_MEM_CTRL_FT_CHROMA_ADDR, m.addr[1]);
    }
    sink.push(regs::NR3_MEM_CTRL_LINE_MODE, (m.last_line_mode << 1) | m.first_line_mode);

    if let Some(fbc) = &nr3.fbc_store {
        let b = &fbc.border;
        sink.push(
            regs::NR3_FBC_STORE_BORDER,
            (b.up & 0xff) | ((b.down & 0xff) << 8) | ((b.left & 0xff) << 16) | ((b.right & 0xff) << 24),
        );
        sink.push(regs::NR3_FBC_STORE_SLICE_SIZE, pack_wh(fbc.size_in_hor, fbc.size_in_ver, 0x1fff));
        sink.push(regs::NR3_FBC_STORE_TILE_NUM, fbc.tile_number);
        sink.push(regs::NR3_FBC_STORE_Y_TILE_ADDR, fbc.y_tile_addr_init_x256);
        sink.push(regs::NR3_FBC_STORE_C_TILE_ADDR, fbc.c_tile_addr_init_x256);
        sink.push(regs::NR3_FBC_STORE_Y_HEADER_ADDR, fbc.y_header_addr_init);
        sink.push(regs::NR3_FBC_STORE_C_HEADER_ADDR, fbc.c_header_addr_init);
    } else {
        sink.push(regs::NR3_STORE_SIZE, pack_wh(nr3.store.size.w, nr3.store.size.h, 0xffff));
        sink.push(regs::NR3_STORE_LUMA_ADDR, nr3.store.addr[0]);
        sink.push(regs::NR3_STORE_CHROMA_ADDR, nr3.store.addr[1]);
    }

    let c = &nr3.crop;
    sink.push(regs::NR3_CROP_PARAM0, c.bypass as u32);
    sink.push(regs::NR3_CROP_PARAM1, pack_wh(c.src.w, c.src.h, 0xffff));
    sink.push(regs::NR3_CROP_PARAM2, pack_wh(c.dst.w, c.dst.h, 0xffff));
    sink.push(regs::NR3_CROP_PARAM3, ((c.start_x & 0xffff) << 16) | (c.start_y & 0xffff));
}

fn emit_ltm(base: u32, ltm: &SliceLtm, sink: &mut impl RegSink) {
    let flags = ltm.tile_left_flag as u32
        | (ltm.tile_right_flag as u32) << 1
        | (ltm.tile_up_flag as u32) << 2
        | (ltm.tile_down_flag as u32) << 3;
    sink.push(base + regs::LTM_PARAM0_OFF, flags);
    sink.push(
        base + regs::LTM_PARAM1_OFF,
        ((ltm.tile_num_y & 0xff) << 24)
            | ((ltm.tile_num_x & 0xff) << 16)
            | ((ltm.tile_index_ys & 0xff) << 8)
            | (ltm.tile_index_xs & 0xff),
    );
    sink.push(base + regs::LTM_PARAM2_OFF, pack_xy(ltm.tile_start_x, ltm.tile_start_y, 0x1fff));
    sink.push(base + regs::LTM_MEM_ADDR_OFF, ltm.mem_addr);
}

fn emit_store(base: u32, store: Option<&SliceStore>, sink: &mut impl RegSink) {
    let Some(s) = store else {
        sink.push(base + regs::STORE_PARAM_OFF, 1);
        return;
    };
    sink.push(base + regs::STORE_PARAM_OFF, 0);
    sink.push(base + regs::STORE_SLICE_SIZE_OFF, pack_wh(s.size.w, s.size.h, 0xffff));
    let b = &s.border;
    sink.push(
        base + regs::STORE_BORDER_OFF,
        (b.up & 0xff) | ((b.down & 0xff) << 8) | ((b.left & 0xff) << 16) | ((b.right & 0xff) << 24),
    );
    sink.push(base + regs::STORE_Y_ADDR_OFF, s.addr[0]);
    sink.push(base + regs::STORE_U_ADDR_OFF, s.addr[1]);
    sink.push(base + regs::STORE_V_ADDR_OFF, s.addr[2]);
    sink.push(base + regs::STORE_SHADOW_CLR_OFF, 1);
}

fn emit_fbc_store(base: u32, fbc: &SliceFbcStore, sink: &mut impl RegSink) {
    let b = &fbc.border;
    sink.push(
        base + regs::FBC_STORE_BORDER_OFF,
        (b.up & 0xff) | ((b.down & 0xff) << 8) | ((b.left & 0xff) << 16) | ((b.right & 0xff) << 24),
    );
    sink.push(base + regs::FBC_STORE_SLICE_SIZE_OFF, pack_wh(fbc.size_in_hor, fbc.size_in_ver, 0x1fff));
    sink.push(base + regs::FBC_STORE_TILE_NUM_OFF, fbc.tile_number);
    sink.push(base + regs::FBC_STORE_Y_TILE_ADDR_OFF, fbc.y_tile_addr_init_x256);
    sink.push(base + regs::FBC_STORE_C_TILE_ADDR_OFF, fbc.c_tile_addr_init_x256);
    sink.push(base + regs::FBC_STORE_Y_HEADER_ADDR_OFF, fbc.y_header_addr_init);
    sink.push(base + regs::FBC_STORE_C_HEADER_ADDR_OFF, fbc.c_header_addr_init);
}

fn emit_scaler_path(idx: usize, path: &SlicePathState, sink: &mut impl RegSink) {
    let base = regs::SCL_BASE[idx];
    let store_base = regs::STORE_BASE[idx];
    match &path.scaler {
        None => {
            // path sits this slice out
            sink.push(
                base + regs::SCL_CFG_OFF,
                regs::SCL_CFG_BYPASS_TRIM | regs::SCL_CFG_BYPASS_DECI,
            );
            emit_store(store_base, None, sink);
            return;
        }
        Some(s) => {
            sink.push(base + regs::SCL_CFG_OFF, regs::SCL_CFG_PATH_EN);
            sink.push(base + regs::SCL_SRC_SIZE_OFF, pack_wh(s.src.w, s.src.h, 0x3fff));
            sink.push(base + regs::SCL_DES_SIZE_OFF, pack_wh(s.scaler_out.w, s.scaler_out.h, 0x3fff));
            sink.push(base + regs::SCL_TRIM0_START_OFF, pack_xy(s.trim0.start_x, s.trim0.start_y, 0x1fff));
            sink.push(base + regs::SCL_TRIM0_SIZE_OFF, pack_wh(s.trim0.size_x, s.trim0.size_y, 0x1fff));
            sink.push(base + regs::SCL_HOR_IP_OFF, ((s.ip_int & 0xf) << 16) | (s.ip_rmd & 0x1fff));
            sink.push(base + regs::SCL_HOR_CIP_OFF, ((s.cip_int & 0xf) << 16) | (s.cip_rmd & 0x1fff));
            sink.push(base + regs::SCL_TRIM1_START_OFF, pack_xy(s.trim1.start_x, s.trim1.start_y, 0x1fff));
            sink.push(base + regs::SCL_TRIM1_SIZE_OFF, pack_wh(s.trim1.size_x, s.trim1.size_y, 0x1fff));
            sink.push(base + regs::SCL_VER_IP_OFF, ((s.ip_int_ver & 0xf) << 16) | (s.ip_rmd_ver & 0x1fff));
            sink.push(base + regs::SCL_VER_CIP_OFF, ((s.cip_int_ver & 0xf) << 16) | (s.cip_rmd_ver & 0x1fff));
        }
    }
    emit_store(store_base, path.store.as_ref(), sink);
    if let Some(fbc) = &path.fbc {
        emit_fbc_store(store_base, fbc, sink);
    }
}

fn emit_thumb_path(path: &SlicePathState, sink: &mut impl RegSink) {
    let base = regs::SCL_BASE[2];
    let store_base = regs::STORE_BASE[2];
    let Some(t) = &path.thumb else {
        emit_store(store_base, None, sink);
        return;
    };
    sink.push(base + regs::THUMB_SRC0_SIZE_OFF, pack_wh(t.src0.w, t.src0.h, 0x1fff));
    sink.push(base + regs::THUMB_Y_TRIM0_START_OFF, pack_xy(t.y_trim.start_x, t.y_trim.start_y, 0x1fff));
    sink.push(base + regs::THUMB_Y_TRIM0_SIZE_OFF, pack_wh(t.y_trim.size_x, t.y_trim.size_y, 0x1fff));
    sink.push(base + regs::THUMB_UV_TRIM0_START_OFF, pack_xy(t.uv_trim.start_x, t.uv_trim.start_y, 0x1fff));
    sink.push(base + regs::THUMB_UV_TRIM0_SIZE_OFF, pack_wh(t.uv_trim.size_x, t.uv_trim.size_y, 0x1fff));
    sink.push(base + regs::THUMB_Y_FACTOR_IN_OFF, pack_wh(t.y_factor_in.w, t.y_factor_in.h, 0x1fff));
    sink.push(base + regs::THUMB_Y_FACTOR_OUT_OFF, pack_wh(t.y_factor_out.w, t.y_factor_out.h, 0x3ff));
    sink.push(base + regs::THUMB_UV_FACTOR_IN_OFF, pack_wh(t.uv_factor_in.w, t.uv_factor_in.h, 0x1fff));
    sink.push(base + regs::THUMB_UV_FACTOR_OUT_OFF, pack_wh(t.uv_factor_out.w, t.uv_factor_out.h, 0x3ff));
    sink.push(base + regs::THUMB_Y_SRC_AFTER_DECI_OFF, pack_wh(t.y_src_after_deci.w, t.y_src_after_deci.h, 0x1fff));
    sink.push(base + regs::THUMB_Y_DST_AFTER_SCALER_OFF, pack_wh(t.y_dst_after_scaler.w, t.y_dst_after_scaler.h, 0x3ff));
    sink.push(base + regs::THUMB_UV_SRC_AFTER_DECI_OFF, pack_wh(t.uv_src_after_deci.w, t.uv_src_after_deci.h, 0x1fff));
    sink.push(base + regs::THUMB_UV_DST_AFTER_SCALER_OFF, pack_wh(t.uv_dst_after_scaler.w, t.uv_dst_after_scaler.h, 0x3ff));
    sink.push(base + regs::THUMB_Y_INIT_PHASE_OFF, pack_xy(t.y_init_phase.w, t.y_init_phase.h, 0x3ff));
    sink.push(base + regs::THUMB_UV_INIT_PHASE_OFF, pack_xy(t.uv_init_phase.w, t.uv_init_phase.h, 0x3ff));
    emit_store(store_base, path.store.as_ref(), sink);
    if let Some(fbc) = &path.fbc {
        emit_fbc_store(store_base, fbc, sink);
    }
}

/// Emit every register write for one slice, ending with its trigger and
/// the shadow-done and all-done tokens.
pub fn emit_slice(state: &SliceState, ctx: usize, mode: TriggerMode, sink: &mut impl RegSink) {
    if mode == TriggerMode::Cfg {
        sink.push(regs::CFG_START, 1);
        sink.push(regs::FMCU_CMD, regs::CFG_TRIGGER_PULSE);
    }

    emit_nr(&state.nr, sink);

    if let Some(fbd) = &state.fbd_raw {
        emit_fbd_raw(fbd, sink);
    } else if let Some(fetch) = &state.fetch {
        emit_fetch(fetch, sink);
    }

    if let Some(nr3) = &state.nr3 {
        emit_nr3(nr3, sink);
    }
    if let Some(ltm) = &state.ltm_rgb {
        emit_ltm(regs::LTM_RGB_BASE, ltm, sink);
    }
    if let Some(ltm) = &state.ltm_yuv {
        emit_ltm(regs::LTM_YUV_BASE, ltm, sink);
    }
    if let Some(nf) = &state.noise_filter {
        for (reg, seed) in regs::NF_SEED.iter().zip(nf.seeds) {
            sink.push(*reg, seed);
        }
    }

    for idx in 0..2 {
        if let Some(path) = &state.paths[idx] {
            emit_scaler_path(idx, path, sink);
        }
    }
    if let Some(path) = &state.paths[2] {
        emit_thumb_path(path, sink);
    }

    match mode {
        TriggerMode::Cfg => sink.push(regs::CFG_CAP_FMCU_RDY, 1),
        TriggerMode::Fetch => sink.push(regs::FETCH_START, 1),
    }
    sink.push(regs::FMCU_CMD, regs::SHADOW_DONE_CMD[ctx]);
    sink.push(regs::FMCU_CMD, regs::ALL_DONE_CMD[ctx]);
}

/// Emit a whole frame, one slice after another.
pub fn emit_frame(states: &[SliceState], ctx: usize, mode: TriggerMode, sink: &mut impl RegSink) {
    for state in states {
        emit_slice(state, ctx, mode, sink);
    }
}
