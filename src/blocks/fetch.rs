//! Linear fetch: per-slice read window and plane addresses.
//!
//! The fetch unit reads the overlap-expanded slice rectangle from the source
//! buffer, so addressing uses `pos_fetch` (slice position shifted by the
//! frame input-crop origin). Packed MIPI raw additionally needs the byte
//! position inside the first 16-pixel group and the word count of one line.

use slice_core::{FetchFormat, ImageSize, SliceDescriptor};

use crate::config::FetchConfig;

/// Word index of the first pixel inside a 16-pixel MIPI group.
const MIPI_WORD_NUM_START: [u32; 16] = [0, 1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5];
/// Word index of the last pixel inside a 16-pixel MIPI group.
const MIPI_WORD_NUM_END: [u32; 16] = [0, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5];

/// Fetch window of one slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceFetch {
    pub size: ImageSize,
    /// Absolute per-plane addresses for this slice.
    pub addr: [u32; 3],
    pub mipi_byte_rel_pos: u32,
    pub mipi_word_num: u32,
}

pub fn derive(cfg: &FetchConfig, slice: &SliceDescriptor) -> SliceFetch {
    let start_col = slice.pos_fetch.start_col;
    let start_row = slice.pos_fetch.start_row;
    let end_col = slice.pos_fetch.end_col;
    let end_row = slice.pos_fetch.end_row;

    let pitch = &cfg.pitch;
    let mut ch_offset = [0u32; 3];
    let mut out = SliceFetch::default();

    match cfg.format {
        FetchFormat::Yuv422_3Frame => {
            ch_offset[0] = start_row * pitch[0] + start_col;
            ch_offset[1] = start_row * pitch[1] + (start_col >> 1);
            ch_offset[2] = start_row * pitch[2] + (start_col >> 1);
        }
        FetchFormat::Yuv422_2Frame | FetchFormat::Yvu422_2Frame => {
            ch_offset[0] = start_row * pitch[0] + start_col;
            ch_offset[1] = start_row * pitch[1] + start_col;
        }
        FetchFormat::Yuv420_2Frame | FetchFormat::Yvu420_2Frame => {
            ch_offset[0] = start_row * pitch[0] + start_col;
            ch_offset[1] = (start_row >> 1) * pitch[1] + start_col;
        }
        FetchFormat::Csi2Raw10 => {
            // 5 bytes per 4 pixels.
            ch_offset[0] = start_row * pitch[0] + (start_col >> 2) * 5 + (start_col & 0x3);
            out.mipi_byte_rel_pos = start_col & 0x0f;
            out.mipi_word_num = (((end_col + 1) >> 4) * 5
                + MIPI_WORD_NUM_END[((end_col + 1) & 0x0f) as usize])
                - (((start_col + 1) >> 4) * 5
                    + MIPI_WORD_NUM_START[((start_col + 1) & 0x0f) as usize])
                + 1;
        }
        FetchFormat::Raw10 => {
            // unpacked, 2 bytes per pixel
            ch_offset[0] = start_row * pitch[0] + start_col * 2;
        }
    }

    out.addr[0] = cfg.addr[0] + ch_offset[0];
    out.addr[1] = cfg.addr[1] + ch_offset[1];
    out.addr[2] = cfg.addr[2] + ch_offset[2];
    out.size = ImageSize {
        w: end_col - start_col + 1,
        h: end_row - start_row + 1,
    };
    out
}
