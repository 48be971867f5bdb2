// SPDX-License-Identifier: MIT
//! # Overlap Policy
//!
//! Per-format-family overlap margins. Raw bayer input runs the full
//! demosaic/NR chain and needs wider margins than YUV input; the YUV scaler
//! itself only consumes the "safe" part of the margin, so scaler-facing code
//! works with the difference (the "bad" overlap it must skip).

use crate::geom::SliceOverlap;

/// Input pixel layouts the fetch unit understands. The family (raw vs YUV)
/// decides the overlap margins; the exact variant decides byte addressing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FetchFormat {
    /// Unpacked 10-bit bayer, 2 bytes per pixel.
    #[clap(name = "raw10")]
    Raw10,
    /// MIPI CSI-2 packed 10-bit bayer, 5 bytes per 4 pixels.
    #[clap(name = "csi2-raw10")]
    Csi2Raw10,
    #[clap(name = "yuv422-3frame")]
    Yuv422_3Frame,
    #[clap(name = "yuv422-2frame")]
    Yuv422_2Frame,
    #[clap(name = "yvu422-2frame")]
    Yvu422_2Frame,
    #[clap(name = "yuv420-2frame")]
    Yuv420_2Frame,
    #[clap(name = "yvu420-2frame")]
    Yvu420_2Frame,
}

impl FetchFormat {
    pub fn is_raw(self) -> bool {
        matches!(self, FetchFormat::Raw10 | FetchFormat::Csi2Raw10)
    }
}

/// Margins for raw bayer input.
pub const RAW_OVERLAP: SliceOverlap = SliceOverlap { up: 62, down: 82, left: 90, right: 142 };

/// Margins for YUV input.
pub const YUV_OVERLAP: SliceOverlap = SliceOverlap { up: 46, down: 68, left: 74, right: 126 };

/// The part of the margin the YUV scaler is allowed to consume.
pub const SCALER_SAFE_OVERLAP: SliceOverlap = SliceOverlap { up: 32, down: 52, left: 48, right: 68 };

/// Worst-case horizontal overlap cost of one slice; reserved out of the
/// line buffer when sizing slices.
pub const SLICE_OVERLAP_W_MAX: u32 = RAW_OVERLAP.left + RAW_OVERLAP.right;

/// Full overlap margins for an input format.
pub fn overlap_for(format: FetchFormat) -> SliceOverlap {
    if format.is_raw() { RAW_OVERLAP } else { YUV_OVERLAP }
}

/// The margin the scaler must skip past: full overlap minus the scaler-safe
/// part. The constants keep this non-negative for both families.
pub fn scaler_bad_overlap(full: SliceOverlap) -> SliceOverlap {
    SliceOverlap {
        up: full.up - SCALER_SAFE_OVERLAP.up,
        down: full.down - SCALER_SAFE_OVERLAP.down,
        left: full.left - SCALER_SAFE_OVERLAP.left,
        right: full.right - SCALER_SAFE_OVERLAP.right,
    }
}
