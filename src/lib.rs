//! # ISP Slice Pipeline
//!
//! Per-slice register derivation for line-buffer limited camera ISPs.
//!
//! A frame wider than the ISP line buffer is processed as overlapping
//! vertical slices. Planning the slice grid lives in the `slice-core` crate;
//! this crate derives what each hardware block needs per slice and emits the
//! register writes in programming order.
//!
//! ## Architecture
//!
//! - `config`: per-frame configuration and validation
//! - `blocks`: per-block slice adapters (fetch, scaler, store, 3DNR, ...)
//! - `emit`: the register map and the sink-agnostic emission walk
//! - `orchestrator`: validate -> plan -> derive -> emit for one frame
//!
//! ## Example
//!
//! ```rust,no_run
//! use isp_pipeline::{FrameOrchestrator, TriggerMode};
//! # fn example(config: isp_pipeline::config::FrameConfig)
//! #     -> Result<(), isp_pipeline::IspError> {
//! let orch = FrameOrchestrator::new(config)?;
//! let queue = orch.emit_sequenced(0, TriggerMode::Cfg)?;
//! for cmd in queue.commands() {
//!     println!("{:#06x} <- {:#010x}", cmd.addr, cmd.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod blocks;
pub mod config;
pub mod emit;
pub mod error;
pub mod orchestrator;

#[cfg(test)]
pub mod testutil;

pub use config::{FrameConfig, LineBufferMode, PathId};
pub use emit::{CommandQueue, MockBus, RegCommand, RegSink, RegisterBus, TriggerMode};
pub use error::{IspError, IspResult};
pub use orchestrator::{FrameOrchestrator, SliceDone, SLICE_DONE_TIMEOUT_MS};

pub use slice_core;
