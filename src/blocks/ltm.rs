//! Local tone mapping: per-slice tile-grid window into the frame map.
//!
//! The statistics and map memories are laid out as a frame-wide tile grid;
//! a slice covers the tile columns and rows its pixels touch, with edge
//! flags for the tiles it only partially covers.

use slice_core::SliceDescriptor;

use crate::config::LtmConfig;

/// Bytes per tile record in the histogram/map memory.
const LTM_TILE_RECORD_BYTES: u32 = 128 * 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceLtm {
    pub tile_num_x: u32,
    pub tile_num_y: u32,
    /// First covered tile column/row.
    pub tile_index_xs: u32,
    pub tile_index_ys: u32,
    /// Slice start offset inside the first tile, in pixels.
    pub tile_start_x: u32,
    pub tile_start_y: u32,
    /// Slice cuts into its first/last tile instead of covering it whole.
    pub tile_left_flag: bool,
    pub tile_right_flag: bool,
    pub tile_up_flag: bool,
    pub tile_down_flag: bool,
    pub mem_addr: u32,
}

pub fn derive(cfg: &LtmConfig, slice: &SliceDescriptor) -> SliceLtm {
    let start_col = slice.pos.start_col;
    let end_col = slice.pos.end_col;
    let start_row = slice.pos.start_row;
    let end_row = slice.pos.end_row;

    let xs = start_col / cfg.tile_width;
    let xe = end_col / cfg.tile_width;
    let ys = start_row / cfg.tile_height;
    let ye = end_row / cfg.tile_height;

    SliceLtm {
        tile_num_x: xe - xs + 1,
        tile_num_y: ye - ys + 1,
        tile_index_xs: xs,
        tile_index_ys: ys,
        tile_start_x: start_col - xs * cfg.tile_width,
        tile_start_y: start_row - ys * cfg.tile_height,
        tile_left_flag: start_col % cfg.tile_width != 0,
        tile_right_flag: (end_col + 1) % cfg.tile_width != 0,
        tile_up_flag: start_row % cfg.tile_height != 0,
        tile_down_flag: (end_row + 1) % cfg.tile_height != 0,
        mem_addr: cfg.mem_init_addr + xs * LTM_TILE_RECORD_BYTES,
    }
}
