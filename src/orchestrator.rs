//! Frame orchestration: validate, plan, derive, emit.
//!
//! [`FrameOrchestrator`] owns one frame's configuration and its slice plan.
//! Derivation walks the plan once, threading the per-path accumulators in
//! slice order so output addressing stays cumulative. Emission then replays
//! the derived states into either a command queue (the hardware command unit
//! triggers and paces the slices) or straight onto a register bus, where
//! software paces the slices itself against a done signal.

use log::debug;

use slice_core::{plan, SlicePlan};

use crate::blocks::scaler::PathWalk;
use crate::blocks::store::{StoreSource, StoreWalk};
use crate::blocks::{fbc_store, fbd_raw, fetch, ltm, noisefilter, nr, nr3, scaler, store, thumbscaler};
use crate::config::{FrameConfig, PathId};
use crate::emit::{
    emit_frame, emit_slice, regs, CommandQueue, DirectWriter, RegisterBus, SlicePathState,
    SliceState, TriggerMode,
};
use crate::error::{IspError, IspResult};

/// How long to wait for one slice in direct mode.
pub const SLICE_DONE_TIMEOUT_MS: u64 = 500;

/// Per-slice completion signal for direct-mode pacing. Returns `false` on
/// timeout.
pub trait SliceDone {
    fn wait(&mut self, timeout_ms: u64) -> bool;
}

pub struct FrameOrchestrator {
    config: FrameConfig,
    plan: SlicePlan,
}

impl FrameOrchestrator {
    pub fn new(config: FrameConfig) -> IspResult<Self> {
        config.validate()?;
        let origin = (config.fetch.in_trim.start_x, config.fetch.in_trim.start_y);
        let plan = plan(
            config.frame_in,
            origin,
            &config.out_widths(),
            config.fetch.format,
            config.line_buffer_len,
        )?;
        Ok(Self { config, plan })
    }

    pub fn plan(&self) -> &SlicePlan {
        &self.plan
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Derive the register state of every slice, in walk order. Slices where
    /// no output path produces anything are dropped.
    pub fn derive_states(&self) -> IspResult<Vec<SliceState>> {
        let mut path_walks = [PathWalk::new(), PathWalk::new()];
        let mut store_walks = [StoreWalk::new(), StoreWalk::new(), StoreWalk::new()];
        let mut states = Vec::with_capacity(self.plan.valid_count());

        for slice in self.plan.valid_slices() {
            let mut paths: [Option<SlicePathState>; 3] = [None, None, None];
            let mut any_output = false;

            for (i, path_cfg) in self.config.paths.iter().enumerate() {
                let Some(p) = path_cfg else { continue };
                let mut ps = SlicePathState::default();
                if let Some(s) = scaler::derive(p, &self.plan, slice, &mut path_walks[i])? {
                    let st =
                        store::derive(&p.store, StoreSource::Scaler(&s), slice, &mut store_walks[i]);
                    ps.fbc = p.store.fbc.as_ref().map(|f| fbc_store::derive(f, slice));
                    ps.scaler = Some(s);
                    ps.store = Some(st);
                    any_output = true;
                } else {
                    debug!(
                        "slice ({},{}): {} path outside its input window",
                        slice.row,
                        slice.col,
                        PathId::ALL[i].name()
                    );
                }
                paths[i] = Some(ps);
            }

            if let Some(t) = &self.config.thumb {
                let mut ps = SlicePathState::default();
                if let Some(th) = thumbscaler::derive(t, slice) {
                    let st =
                        store::derive(&t.store, StoreSource::Thumb(&th), slice, &mut store_walks[2]);
                    ps.fbc = t.store.fbc.as_ref().map(|f| fbc_store::derive(f, slice));
                    ps.thumb = Some(th);
                    ps.store = Some(st);
                    any_output = true;
                }
                paths[PathId::Thumbnail.index()] = Some(ps);
            }

            if !any_output {
                debug!("slice ({},{}): no output path active, dropped", slice.row, slice.col);
                continue;
            }

            // grain seeds stride by the first path's output width
            let seed_width = paths[PathId::PreCapture.index()]
                .as_ref()
                .and_then(|p| p.scaler.as_ref())
                .map(|s| s.trim1.size_x)
                .unwrap_or_else(|| slice.pos_orig.width());

            states.push(SliceState {
                desc: *slice,
                nr: nr::derive(&self.config.nr, slice),
                fetch: if self.config.fbd_raw.is_some() {
                    None
                } else {
                    Some(fetch::derive(&self.config.fetch, slice))
                },
                fbd_raw: self.config.fbd_raw.as_ref().map(|f| fbd_raw::derive(f, slice)),
                nr3: self
                    .config
                    .nr3
                    .as_ref()
                    .map(|n| nr3::derive(n, self.config.frame_in, slice)),
                ltm_rgb: self.config.ltm_rgb.as_ref().map(|l| ltm::derive(l, slice)),
                ltm_yuv: self.config.ltm_yuv.as_ref().map(|l| ltm::derive(l, slice)),
                noise_filter: self
                    .config
                    .noise_filter
                    .as_ref()
                    .and_then(|nf| noisefilter::derive(nf, seed_width)),
                paths,
            });
        }
        Ok(states)
    }

    /// Derive and buffer the whole frame for the hardware command unit.
    pub fn emit_sequenced(&self, ctx: usize, mode: TriggerMode) -> IspResult<CommandQueue> {
        check_ctx(ctx)?;
        let states = self.derive_states()?;
        let mut queue = CommandQueue::new();
        emit_frame(&states, ctx, mode, &mut queue);
        debug!("frame queued: {} slices, {} writes", states.len(), queue.len());
        Ok(queue)
    }

    /// Derive and program the frame slice by slice over a live bus, waiting
    /// for `done` between slices.
    pub fn emit_direct<B: RegisterBus>(
        &self,
        ctx: usize,
        bus: &mut B,
        done: &mut dyn SliceDone,
    ) -> IspResult<()> {
        check_ctx(ctx)?;
        if self.config.nr3.is_some() {
            return Err(IspError::capability(
                "3dnr in direct mode",
                "temporal blend requires command-unit pacing",
            ));
        }
        let states = self.derive_states()?;
        for state in &states {
            let mut sink = DirectWriter::new(bus);
            emit_slice(state, ctx, TriggerMode::Fetch, &mut sink);
            if !done.wait(SLICE_DONE_TIMEOUT_MS) {
                return Err(IspError::timeout(
                    format!("slice ({},{}) done", state.desc.row, state.desc.col),
                    SLICE_DONE_TIMEOUT_MS,
                ));
            }
        }
        Ok(())
    }
}

fn check_ctx(ctx: usize) -> IspResult<()> {
    if ctx >= regs::SHADOW_DONE_CMD.len() {
        return Err(IspError::config(
            "ctx",
            ctx.to_string(),
            "hardware context id out of range",
        ));
    }
    Ok(())
}
