//! Noise filter (grain) seeds.
//!
//! In seed mode 1 the hardware free-runs a 24-bit LFSR across the line; each
//! slice needs the generator pre-wound to where it would be had the whole
//! line been produced in one pass, so the grain pattern is seamless across
//! slice joins. The stride is the slice's scaler output width.

use crate::config::NoiseFilterConfig;

/// Per-slice grain generator seeds, one per pipeline lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceNoiseFilter {
    pub seeds: [u32; 4],
}

/// One step of the 24-bit grain LFSR.
fn lfsr_step(s: u32) -> u32 {
    let bit = (s ^ (s >> 1) ^ (s >> 2) ^ (s >> 7)) & 1;
    ((s >> 1) | (bit << 23)) & 0x00ff_ffff
}

fn advance(mut s: u32, n: u32) -> u32 {
    for _ in 0..n {
        s = lfsr_step(s);
    }
    s
}

/// Derive the seeds for one slice; `None` when the frame uses the static
/// seed mode and slices need no adjustment. `slice_width` is the slice's
/// output width on the first scaler path.
pub fn derive(cfg: &NoiseFilterConfig, slice_width: u32) -> Option<SliceNoiseFilter> {
    if cfg.yrandom_mode != 1 {
        return None;
    }
    let seed0 = cfg.seed0 & 0x00ff_ffff;
    let seed1 = advance(seed0, slice_width);
    let seed2 = advance(seed1, slice_width);
    let seed3 = advance(seed2, slice_width);
    Some(SliceNoiseFilter { seeds: [seed0, seed1, seed2, seed3] })
}
