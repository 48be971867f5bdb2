// SPDX-License-Identifier: MIT
//! # slice-core
//!
//! Pure slice-planning geometry for line-buffer limited camera ISPs.
//!
//! A frame wider than the ISP line buffer is processed as a row of
//! overlapping vertical slices. This crate decides how many slices to cut,
//! where each one sits, and how much overlap each interior edge carries —
//! and nothing else. Byte addresses, register layouts and per-block
//! derivation live with the pipeline crate on top.
//!
//! ## Modules
//!
//! - [`geom`]: sizes, trims, slice rectangles, roles, output accumulator
//! - [`overlap`]: per-format-family overlap margins
//! - [`planner`]: the slice grid planner

pub mod geom;
pub mod overlap;
pub mod planner;

pub use geom::{
    aligned, ImageSize, OutputAccumulator, SliceDescriptor, SliceOverlap, SlicePos, SliceRole,
    Trim, SLICE_ALIGN,
};
pub use overlap::{
    overlap_for, scaler_bad_overlap, FetchFormat, RAW_OVERLAP, SCALER_SAFE_OVERLAP,
    SLICE_OVERLAP_W_MAX, YUV_OVERLAP,
};
pub use planner::{plan, PlanError, SlicePlan, MAX_SLICES, MAX_SLICE_COLS, MAX_SLICE_ROWS};
