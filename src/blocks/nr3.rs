//! 3DNR temporal denoise: per-slice reference fetch, blend window and store.
//!
//! The block blends the current slice against the previous output frame,
//! shifted by the frame's global motion vector. The reference fetch window
//! therefore moves with the vector and clamps at the frame edges; chroma is
//! kept pair-aligned, which makes odd vectors asymmetric between Y and UV.

use slice_core::{ImageSize, SliceDescriptor};

use crate::blocks::fbc_store::{self, SliceFbcStore};
use crate::config::Nr3Config;

pub const FBC_NR3_Y_WIDTH: u32 = 32;
pub const FBC_NR3_Y_HEIGHT: u32 = 8;
pub const FBC_NR3_BASE_ALIGN: u32 = 256;

/// Reference-frame fetch and blend control for one slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceNr3Memctrl {
    pub addr: [u32; 2],
    pub first_line_mode: u32,
    pub last_line_mode: u32,
    pub start_col: u32,
    pub start_row: u32,
    pub src: ImageSize,
    pub ft_y: ImageSize,
    pub ft_uv: ImageSize,
}

/// Blended-output store window for one slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceNr3Store {
    pub addr: [u32; 2],
    pub size: ImageSize,
}

/// Crop dropping the overlap margins before the blend output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceNr3Crop {
    pub bypass: bool,
    pub src: ImageSize,
    pub dst: ImageSize,
    pub start_x: u32,
    pub start_y: u32,
}

/// Compressed reference fetch window for one slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceNr3FbdFetch {
    pub y_pixel_size_in_hor: u32,
    pub y_pixel_size_in_ver: u32,
    pub c_pixel_size_in_hor: u32,
    pub c_pixel_size_in_ver: u32,
    pub y_pixel_start_in_hor: u32,
    pub y_pixel_start_in_ver: u32,
    pub c_pixel_start_in_hor: u32,
    pub c_pixel_start_in_ver: u32,
    pub y_tiles_num_in_hor: u32,
    pub y_tiles_num_in_ver: u32,
    pub c_tiles_num_in_hor: u32,
    pub c_tiles_num_in_ver: u32,
    pub y_tiles_start_odd: u32,
    pub c_tiles_start_odd: u32,
    pub y_tiles_num_pitch: u32,
    pub y_header_addr_init: u32,
    pub y_tile_addr_init_x256: u32,
    pub c_header_addr_init: u32,
    pub c_tile_addr_init_x256: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceNr3 {
    pub memctrl: SliceNr3Memctrl,
    pub store: SliceNr3Store,
    pub crop: SliceNr3Crop,
    pub fbc_store: Option<SliceFbcStore>,
    pub fbd_fetch: Option<SliceNr3FbdFetch>,
}

/// Y and UV column shifts for a horizontal motion vector. Chroma pairs keep
/// even alignment, so odd vectors round the UV start toward the pair.
fn column_shift(mv_x: i32, start_col: u32) -> (i32, i32) {
    let odd = mv_x & 1 != 0;
    if mv_x < 0 {
        if start_col == 0 {
            (0, if odd { 2 } else { 0 })
        } else if odd {
            (mv_x, mv_x + 1)
        } else {
            (mv_x, mv_x)
        }
    } else if mv_x > 0 {
        if odd {
            (mv_x, mv_x - 1)
        } else {
            (mv_x, mv_x)
        }
    } else {
        (0, 0)
    }
}

/// Shift the reference window by the motion vector and clamp it to the
/// frame, shrinking the fetch sizes where the shifted window runs off an
/// edge. Odd vertical vectors flip into the half-line blend modes.
fn update_memctrl(m: &mut SliceNr3Memctrl, frame: ImageSize, pitch: u32, mv_x: i32, mv_y: i32) {
    let (y_dx, uv_dx) = column_shift(mv_x, m.start_col);
    m.addr[0] = m.addr[0].wrapping_add(y_dx as u32);
    m.addr[1] = m.addr[1].wrapping_add(uv_dx as u32);

    if mv_x < 0 && m.start_col == 0 {
        let cut = (-mv_x) as u32;
        m.ft_y.w = m.ft_y.w.saturating_sub(cut);
        m.ft_uv.w = m.ft_uv.w.saturating_sub(cut);
    } else if mv_x > 0 {
        let end = m.start_col + m.src.w + mv_x as u32;
        if end > frame.w {
            let cut = end - frame.w;
            m.ft_y.w = m.ft_y.w.saturating_sub(cut);
            m.ft_uv.w = m.ft_uv.w.saturating_sub(cut);
        }
    }

    let odd_y = mv_y & 1 != 0;
    if mv_y < 0 && m.start_row == 0 {
        if odd_y {
            m.first_line_mode = 1;
        }
        let cut = (-mv_y) as u32;
        m.ft_y.h = m.ft_y.h.saturating_sub(cut);
        m.ft_uv.h = m.ft_uv.h.saturating_sub((cut + 1) / 2);
    } else if mv_y > 0 {
        m.addr[0] = m.addr[0].wrapping_add(mv_y as u32 * pitch);
        m.addr[1] = m.addr[1].wrapping_add((mv_y / 2) as u32 * pitch);
        let end = m.start_row + m.src.h + mv_y as u32;
        if end > frame.h {
            if odd_y {
                m.last_line_mode = 1;
            }
            let cut = end - frame.h;
            m.ft_y.h = m.ft_y.h.saturating_sub(cut);
            m.ft_uv.h = m.ft_uv.h.saturating_sub((cut + 1) / 2);
        }
    }
}

fn derive_memctrl(cfg: &Nr3Config, frame: ImageSize, slice: &SliceDescriptor) -> SliceNr3Memctrl {
    let pitch = frame.w;
    let start_col = slice.pos.start_col;
    let start_row = slice.pos.start_row;
    let w = slice.pos.width();
    let h = slice.pos.height();

    let ch0_offset = start_row * pitch + start_col;
    let ch1_offset = ((start_row * pitch + 1) >> 1) + start_col;

    let mut m = SliceNr3Memctrl {
        addr: [cfg.fetch_addr[0] + ch0_offset, cfg.fetch_addr[1] + ch1_offset],
        first_line_mode: 0,
        last_line_mode: 0,
        start_col,
        start_row,
        src: ImageSize { w, h },
        ft_y: ImageSize { w, h },
        ft_uv: ImageSize { w, h: h >> 1 },
    };
    update_memctrl(&mut m, frame, pitch, cfg.mv_x, cfg.mv_y);
    m
}

fn derive_store(cfg: &Nr3Config, frame: ImageSize, slice: &SliceDescriptor) -> SliceNr3Store {
    let pitch = frame.w;
    let s_col = slice.pos_orig.start_col;
    let s_row = slice.pos_orig.start_row;
    let ch0_offset = s_row * pitch + s_col;
    let ch1_offset = ((s_row * pitch + 1) >> 1) + s_col;
    SliceNr3Store {
        addr: [cfg.store_addr[0] + ch0_offset, cfg.store_addr[1] + ch1_offset],
        size: ImageSize { w: slice.pos_orig.width(), h: slice.pos_orig.height() },
    }
}

fn derive_fbd_fetch(
    cfg: &Nr3Config,
    frame: ImageSize,
    slice: &SliceDescriptor,
) -> Option<SliceNr3FbdFetch> {
    const W: u32 = FBC_NR3_Y_WIDTH;
    const H: u32 = FBC_NR3_Y_HEIGHT;
    let fbd = cfg.compressed_fetch.as_ref()?;
    let tiles_num_pitch = frame.w.div_ceil(W);

    let start_col = slice.pos.start_col;
    let start_row = slice.pos.start_row;
    let slice_width = slice.pos.width();
    let slice_height = slice.pos.height();

    let mut out = SliceNr3FbdFetch {
        y_pixel_size_in_hor: slice_width,
        y_pixel_size_in_ver: slice_height,
        c_pixel_size_in_hor: slice_width,
        c_pixel_size_in_ver: slice_height / 2,
        y_tiles_num_pitch: tiles_num_pitch,
        ..Default::default()
    };

    let fetch_start_x = if cfg.mv_x < 0 { start_col } else { start_col + cfg.mv_x as u32 };
    let fetch_start_y = if cfg.mv_y < 0 { start_row } else { start_row + cfg.mv_y as u32 };
    let uv_fetch_start_y =
        if cfg.mv_y < 0 { start_row } else { start_row + (cfg.mv_y / 2) as u32 };

    let (y_dx, uv_dx) = if cfg.mv_x < 0 {
        column_shift(cfg.mv_x, start_col)
    } else {
        let (y, uv) = column_shift(cfg.mv_x, start_col);
        // fetch_start already includes the positive shift
        (y - cfg.mv_x, uv - cfg.mv_x)
    };
    let y_start_x = fetch_start_x.wrapping_add(y_dx as u32);
    let uv_start_x = fetch_start_x.wrapping_add(uv_dx as u32);
    let y_end_x = slice_width + y_start_x - 1;
    let uv_end_x = slice_width + uv_start_x - 1;

    // horizontal Y tiles
    let y_left_tiles = y_start_x / W;
    let (left_num, left_size) = if y_start_x % W == 0 { (0, 0) } else { (1, W - y_start_x % W) };
    let right_num = if (y_end_x + 1) % W == 0
        || ((y_end_x + 1) > frame.w && (y_end_x + 1) % W == 1)
    {
        0
    } else {
        1
    };
    let right_size = (y_end_x + 1) % W;
    out.y_pixel_start_in_hor = y_start_x % W;
    out.y_tiles_num_in_hor = left_num + right_num + (slice_width - left_size - right_size) / W;
    out.y_tiles_start_odd = y_left_tiles % 2;

    // horizontal UV tiles
    let uv_left_tiles = uv_start_x / W;
    let (left_num, left_size) =
        if uv_start_x % W == 0 { (0, 0) } else { (1, W - uv_start_x % W) };
    let right_num = if (uv_end_x + 1) % W == 0 { 0 } else { 1 };
    let right_size = (uv_end_x + 1) % W;
    out.c_pixel_start_in_hor = uv_start_x % W;
    out.c_tiles_num_in_hor = left_num + right_num + (slice_width - left_size - right_size) / W;
    out.c_tiles_start_odd = uv_left_tiles % 2;

    // vertical Y tiles
    let y_start_y = fetch_start_y;
    let uv_start_y = uv_fetch_start_y;
    let y_end_y = slice_height + y_start_y - 1;
    let uv_end_y = slice_height / 2 + uv_start_y - 1;

    let y_up_tiles = y_start_y / H;
    let (up_num, up_size) = if y_start_y % H == 0 { (0, 0) } else { (1, H - y_start_y % H) };
    let down_num = if (y_end_y + 1) % H == 0 { 0 } else { 1 };
    let down_size = (y_end_y + 1) % H;
    out.y_pixel_start_in_ver = y_start_y % H;
    out.y_tiles_num_in_ver = up_num + down_num + (slice_height - up_size - down_size) / H;
    out.y_header_addr_init =
        fbd.y_header_addr_init - (y_left_tiles + y_up_tiles * tiles_num_pitch) / 2;
    out.y_tile_addr_init_x256 = fbd.y_tile_addr_init_x256
        + (y_left_tiles + y_up_tiles * tiles_num_pitch) * FBC_NR3_BASE_ALIGN;

    // vertical UV tiles
    let uv_up_tiles = uv_start_y / H;
    let (up_num, up_size) = if uv_start_y % H == 0 { (0, 0) } else { (1, H - uv_start_y % H) };
    let down_num = if (uv_end_y + 1) % H == 0 { 0 } else { 1 };
    let down_size = (uv_end_y + 1) % H;
    out.c_pixel_start_in_ver = uv_start_y % H;
    out.c_tiles_num_in_ver =
        up_num + down_num + (slice_height / 2 - up_size - down_size) / H;
    out.c_header_addr_init =
        fbd.c_header_addr_init - (uv_left_tiles + uv_up_tiles * tiles_num_pitch) / 2;
    out.c_tile_addr_init_x256 = fbd.c_tile_addr_init_x256
        + (uv_left_tiles + uv_up_tiles * tiles_num_pitch) * FBC_NR3_BASE_ALIGN;

    Some(out)
}

pub fn derive(cfg: &Nr3Config, frame: ImageSize, slice: &SliceDescriptor) -> SliceNr3 {
    let memctrl = derive_memctrl(cfg, frame, slice);
    let store = derive_store(cfg, frame, slice);
    let ov = slice.overlap;
    let crop = SliceNr3Crop {
        bypass: ov.left == 0 && ov.up == 0 && ov.right == 0 && ov.down == 0,
        src: memctrl.src,
        dst: store.size,
        start_x: ov.left,
        start_y: ov.up,
    };
    SliceNr3 {
        memctrl,
        store,
        crop,
        fbc_store: cfg.compressed_store.as_ref().map(|f| fbc_store::derive(f, slice)),
        fbd_fetch: derive_fbd_fetch(cfg, frame, slice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slice_core::{plan, FetchFormat};

    fn nr3_cfg(mv_x: i32, mv_y: i32) -> Nr3Config {
        Nr3Config {
            mv_x,
            mv_y,
            fetch_addr: [0x6000_0000, 0x6100_0000],
            store_addr: [0x6200_0000, 0x6300_0000],
            compressed_fetch: None,
            compressed_store: None,
        }
    }

    fn two_col_plan() -> slice_core::SlicePlan {
        plan(
            ImageSize { w: 4000, h: 2992 },
            (0, 0),
            &[4000],
            FetchFormat::Yuv420_2Frame,
            2592,
        )
        .unwrap()
    }

    #[test]
    fn zero_vector_keeps_plain_offsets() {
        let frame = ImageSize { w: 4000, h: 2992 };
        let plan = two_col_plan();
        let s = derive(&nr3_cfg(0, 0), frame, &plan.slices[0]);
        assert_eq!(s.memctrl.addr[0], 0x6000_0000);
        assert_eq!(s.memctrl.ft_y, ImageSize { w: plan.slices[0].pos.width(), h: 2992 });
        assert_eq!(s.memctrl.ft_uv.h, 1496);
        assert_eq!(s.store.size.w, plan.slices[0].pos_orig.width());
        assert!(!s.crop.bypass);
        assert_eq!(s.crop.start_x, 0);
    }

    #[test]
    fn negative_odd_mv_x_shifts_chroma_apart_from_luma() {
        let frame = ImageSize { w: 4000, h: 2992 };
        let plan = two_col_plan();
        let cfg = nr3_cfg(-3, 0);

        // first column clamps luma, bumps chroma to the next pair
        let s0 = derive(&cfg, frame, &plan.slices[0]);
        assert_eq!(s0.memctrl.addr[0], 0x6000_0000);
        assert_eq!(s0.memctrl.addr[1], 0x6100_0000 + 2);
        assert_eq!(s0.memctrl.ft_y.w, plan.slices[0].pos.width() - 3);

        // interior column takes the vector, chroma rounded to the pair
        let s1 = derive(&cfg, frame, &plan.slices[1]);
        let base_y = 0x6000_0000u32 + plan.slices[1].pos.start_col;
        let base_uv = 0x6100_0000u32 + plan.slices[1].pos.start_col;
        assert_eq!(s1.memctrl.addr[0], base_y.wrapping_sub(3));
        assert_eq!(s1.memctrl.addr[1], base_uv.wrapping_sub(2));
        assert_eq!(s1.memctrl.ft_y.w, plan.slices[1].pos.width());
    }

    #[test]
    fn positive_mv_y_clamps_bottom_and_shifts_rows() {
        let frame = ImageSize { w: 4000, h: 2992 };
        let plan = two_col_plan();
        let s = derive(&nr3_cfg(0, 2), frame, &plan.slices[0]);
        assert_eq!(s.memctrl.addr[0], 0x6000_0000 + 2 * 4000);
        assert_eq!(s.memctrl.addr[1], 0x6100_0000 + 4000);
        assert_eq!(s.memctrl.ft_y.h, 2990);
        assert_eq!(s.memctrl.ft_uv.h, 1495);
        assert_eq!(s.memctrl.last_line_mode, 0);
    }

    #[test]
    fn odd_positive_mv_y_sets_last_line_mode() {
        let frame = ImageSize { w: 4000, h: 2992 };
        let plan = two_col_plan();
        let s = derive(&nr3_cfg(0, 3), frame, &plan.slices[0]);
        assert_eq!(s.memctrl.last_line_mode, 1);
        assert_eq!(s.memctrl.first_line_mode, 0);
    }

    #[test]
    fn crop_drops_the_overlap() {
        let frame = ImageSize { w: 4000, h: 2992 };
        let plan = two_col_plan();
        let s = derive(&nr3_cfg(0, 0), frame, &plan.slices[1]);
        let sl = &plan.slices[1];
        assert_eq!(s.crop.start_x, sl.overlap.left);
        assert_eq!(s.crop.src.w, sl.pos.width());
        assert_eq!(s.crop.dst.w, sl.pos_orig.width());
    }

    #[test]
    fn fbd_fetch_tiles_track_the_shifted_window() {
        let frame = ImageSize { w: 4000, h: 2992 };
        let plan = two_col_plan();
        let mut cfg = nr3_cfg(0, 0);
        cfg.compressed_fetch = Some(crate::config::FbcStoreConfig {
            pad_w: FBC_NR3_Y_WIDTH,
            pad_h: FBC_NR3_Y_HEIGHT,
            base_align: FBC_NR3_BASE_ALIGN,
            y_tile_addr_init_x256: 0x1_0000,
            c_tile_addr_init_x256: 0x2_0000,
            y_header_addr_init: 0x3_0000,
            c_header_addr_init: 0x4_0000,
        });
        let s = derive(&cfg, frame, &plan.slices[1]);
        let f = s.fbd_fetch.unwrap();
        let start = plan.slices[1].pos.start_col;
        assert_eq!(f.y_pixel_start_in_hor, start % 32);
        assert_eq!(f.y_tiles_start_odd, (start / 32) % 2);
        assert_eq!(f.y_tiles_num_pitch, 125);
        assert_eq!(f.y_tile_addr_init_x256, 0x1_0000 + (start / 32) * 256);
    }
}
