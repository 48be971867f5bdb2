//! Compressed raw fetch (FBD): per-slice tile window and addresses.
//!
//! The compressed buffer is tiled; a slice starts mid-tile, so the decoder
//! gets the pixel offset inside the first tile plus the tile counts of the
//! fetched region. Tile ids are linear, row-major over the whole buffer.

use slice_core::SliceDescriptor;

use crate::config::FbdRawConfig;

pub const DCAM_FBC_TILE_WIDTH: u32 = 64;
pub const DCAM_FBC_TILE_HEIGHT: u32 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceFbdRaw {
    pub width: u32,
    pub height: u32,
    pub pixel_start_in_hor: u32,
    pub pixel_start_in_ver: u32,
    pub tiles_num_in_hor: u32,
    pub tiles_num_in_ver: u32,
    pub tiles_start_odd: u32,
    pub tiles_num_pitch: u32,
    pub header_addr_init: u32,
    pub tile_addr_init_x256: u32,
    pub low_bit_addr_init: u32,
}

pub fn derive(cfg: &FbdRawConfig, slice: &SliceDescriptor) -> SliceFbdRaw {
    let sx = slice.pos_fetch.start_col;
    let sy = slice.pos_fetch.start_row;
    let ex = slice.pos_fetch.end_col;
    let ey = slice.pos_fetch.end_row;

    let tsx = sx / DCAM_FBC_TILE_WIDTH;
    let tsy = sy / DCAM_FBC_TILE_HEIGHT;
    let tex = ex / DCAM_FBC_TILE_WIDTH;
    let tey = ey / DCAM_FBC_TILE_HEIGHT;
    // linear id of the first touched tile
    let tid = tsy * cfg.tiles_num_pitch + tsx;

    SliceFbdRaw {
        width: ex - sx + 1,
        height: ey - sy + 1,
        pixel_start_in_hor: sx & (DCAM_FBC_TILE_WIDTH - 1),
        pixel_start_in_ver: sy & (DCAM_FBC_TILE_HEIGHT - 1),
        tiles_num_in_hor: tex - tsx + 1,
        tiles_num_in_ver: tey - tsy + 1,
        tiles_start_odd: tid & 0x1,
        tiles_num_pitch: cfg.tiles_num_pitch,
        header_addr_init: cfg.header_addr_init - (tid >> 1),
        tile_addr_init_x256: cfg.tile_addr_init_x256 + (tid << 8),
        low_bit_addr_init: cfg.low_bit_addr_init + (sx >> 1) + ((sy * cfg.width0) >> 2),
    }
}
