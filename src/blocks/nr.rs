//! Spatial NR windows: per-slice center adjustment.
//!
//! NLM and YNR carry frame-absolute window centers; each slice rewrites them
//! relative to its own origin. Post-CDN only needs the slice's starting row
//! phase modulo its 4-line kernel.

use slice_core::SliceDescriptor;

use crate::config::NrCenters;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceNr {
    /// NLM radial center relative to the slice origin. May go negative for
    /// slices right of the center; the register packing truncates it.
    pub nlm_center_x_rel: u32,
    pub nlm_center_y_rel: u32,
    pub postcdn_start_row_mod4: u32,
    pub ynr_center_offset_x: i32,
    pub ynr_center_offset_y: i32,
    pub ynr_slice_width: u32,
    pub ynr_slice_height: u32,
}

pub fn derive(nr: &NrCenters, slice: &SliceDescriptor) -> SliceNr {
    let start_col = slice.pos.start_col;
    let start_row = slice.pos.start_row;
    SliceNr {
        nlm_center_x_rel: nr.nlm_center_x.wrapping_sub(start_col),
        nlm_center_y_rel: nr.nlm_center_y.wrapping_sub(start_row),
        postcdn_start_row_mod4: start_row & 0x3,
        ynr_center_offset_x: nr.ynr_center_x as i32 - start_col as i32,
        ynr_center_offset_y: nr.ynr_center_y as i32 - start_row as i32,
        ynr_slice_width: slice.pos.width(),
        ynr_slice_height: slice.pos.height(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slice_core::{SliceOverlap, SlicePos, SliceRole};

    #[test]
    fn centers_go_slice_relative() {
        let pos = SlicePos { start_col: 1910, start_row: 0, end_col: 3999, end_row: 2999 };
        let slice = SliceDescriptor {
            valid: true,
            row: 0,
            col: 1,
            role_x: SliceRole::Last,
            role_y: SliceRole::Only,
            pos_orig: pos,
            pos,
            pos_fetch: pos,
            overlap: SliceOverlap::default(),
        };
        let nr = NrCenters {
            nlm_center_x: 2000,
            nlm_center_y: 1500,
            ynr_center_x: 1000,
            ynr_center_y: 1500,
        };
        let s = derive(&nr, &slice);
        assert_eq!(s.nlm_center_x_rel, 90);
        assert_eq!(s.nlm_center_y_rel, 1500);
        // YNR center left of this slice: negative offset survives as i32
        assert_eq!(s.ynr_center_offset_x, -910);
        assert_eq!(s.ynr_slice_width, 2090);
        assert_eq!(s.postcdn_start_row_mod4, 0);
    }
}
