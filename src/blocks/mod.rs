//! # Per-Block Slice Adapters
//!
//! One module per hardware block. Each adapter takes the frame-level block
//! config plus one [`SliceDescriptor`](slice_core::SliceDescriptor) and
//! derives the named-field register values for that slice. Bit packing
//! happens later, at the register-write boundary in [`crate::emit`].

pub mod fbc_store;
pub mod fbd_raw;
pub mod fetch;
pub mod ltm;
pub mod noisefilter;
pub mod nr;
pub mod nr3;
pub mod scaler;
pub mod store;
pub mod thumbscaler;
