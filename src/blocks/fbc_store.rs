//! Compressed (FBC) store: per-slice tile counts and addresses.
//!
//! The compressed writer works in pad-sized tiles: chroma tiles cover the
//! half-height plane, luma rides the same grid at twice the tile rows. The
//! slice's horizontal position translates to a whole-tile offset into the
//! frame's payload and header areas.

use slice_core::SliceDescriptor;

use crate::blocks::store::StoreBorder;
use crate::config::FbcStoreConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceFbcStore {
    pub border: StoreBorder,
    pub tile_number: u32,
    pub size_in_hor: u32,
    pub size_in_ver: u32,
    pub y_tile_addr_init_x256: u32,
    pub c_tile_addr_init_x256: u32,
    pub y_header_addr_init: u32,
    pub c_header_addr_init: u32,
}

pub fn derive(cfg: &FbcStoreConfig, slice: &SliceDescriptor) -> SliceFbcStore {
    let ov = slice.overlap;
    let store_w = slice.pos.width() - ov.left - ov.right;
    let store_h = slice.pos.height() - ov.up - ov.down;

    let left_offset_tiles = (slice.pos.start_col + ov.left) / cfg.pad_w;

    let mut uv_tile_w = store_w.div_ceil(cfg.pad_w);
    uv_tile_w = uv_tile_w.div_ceil(2) * 2;
    let uv_tile_h = (store_h / 2).div_ceil(cfg.pad_h);
    let y_tile_w = uv_tile_w;
    let y_tile_h = 2 * uv_tile_h;

    SliceFbcStore {
        border: StoreBorder { up: ov.up, down: ov.down, left: ov.left, right: ov.right },
        tile_number: uv_tile_w * uv_tile_h + y_tile_w * y_tile_h,
        size_in_hor: store_w,
        size_in_ver: store_h,
        y_tile_addr_init_x256: cfg.y_tile_addr_init_x256 + left_offset_tiles * cfg.base_align,
        c_tile_addr_init_x256: cfg.c_tile_addr_init_x256 + left_offset_tiles * cfg.base_align,
        y_header_addr_init: cfg.y_header_addr_init - left_offset_tiles / 2,
        c_header_addr_init: cfg.c_header_addr_init - left_offset_tiles / 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slice_core::{plan, FetchFormat, ImageSize};

    fn cfg() -> FbcStoreConfig {
        FbcStoreConfig {
            pad_w: 32,
            pad_h: 8,
            base_align: 256,
            y_tile_addr_init_x256: 0x1000,
            c_tile_addr_init_x256: 0x2000,
            y_header_addr_init: 0x9000,
            c_header_addr_init: 0xa000,
        }
    }

    #[test]
    fn tile_grid_covers_cropped_payload() {
        let plan = plan(
            ImageSize { w: 4000, h: 2992 },
            (0, 0),
            &[4000],
            FetchFormat::Csi2Raw10,
            2592,
        )
        .unwrap();
        let s = derive(&cfg(), &plan.slices[1]);
        let sl = &plan.slices[1];
        let w = sl.pos.width() - sl.overlap.left;
        assert_eq!(s.size_in_hor, w);
        let uv_w = w.div_ceil(32).div_ceil(2) * 2;
        let uv_h = (s.size_in_ver / 2).div_ceil(8);
        assert_eq!(s.tile_number, uv_w * uv_h * 3);
        // payload starts at the slice's first owned tile column
        let off = (sl.pos.start_col + sl.overlap.left) / 32;
        assert_eq!(s.y_tile_addr_init_x256, 0x1000 + off * 256);
        assert_eq!(s.y_header_addr_init, 0x9000 - off / 2);
    }
}
