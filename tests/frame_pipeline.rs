//! End-to-end derivation over a three-column frame.
//!
//! A 6000 px frame on the full line-buffer bin needs three slices; the
//! middle slice exercises the phase-extrapolation branch of the scaler, the
//! outer two the frame-edge branches. The numbers below are worked out by
//! hand from a 2:1 downscale of a 6000x2996 frame.

use isp_pipeline::config::{
    FetchConfig, FrameConfig, NrCenters, OutputDataMode, PathConfig, StoreConfig, StoreFormat,
};
use isp_pipeline::FrameOrchestrator;
use slice_core::{FetchFormat, ImageSize, Trim};

fn three_col_config() -> FrameConfig {
    let frame = ImageSize { w: 6000, h: 2996 };
    let full = Trim { start_x: 0, start_y: 0, size_x: frame.w, size_y: frame.h };
    FrameConfig {
        frame_in: frame,
        line_buffer_len: 2592,
        fetch: FetchConfig {
            format: FetchFormat::Csi2Raw10,
            src: frame,
            in_trim: full,
            pitch: [7500, 0, 0],
            addr: [0x1000_0000, 0, 0],
        },
        fbd_raw: None,
        paths: [
            Some(PathConfig {
                dst: ImageSize { w: 3000, h: 1498 },
                odata: OutputDataMode::Yuv420,
                trim0: full,
                deci_x: 1,
                deci_y: 1,
                scaler_bypass: false,
                y_ver_tap: 4,
                uv_ver_tap: 4,
                store: StoreConfig {
                    format: StoreFormat::Yuv420_2Frame,
                    pitch: [3000, 3000, 0],
                    addr: [0x2000_0000, 0x2100_0000, 0],
                    fbc: None,
                },
            }),
            None,
        ],
        thumb: None,
        nr: NrCenters::default(),
        nr3: None,
        ltm_rgb: None,
        ltm_yuv: None,
        noise_filter: None,
    }
}

#[test]
fn three_columns_planned() {
    let orch = FrameOrchestrator::new(three_col_config()).unwrap();
    let plan = orch.plan();
    assert_eq!(plan.cols, 3);
    assert_eq!(plan.slice_width, 2000);
    assert_eq!(plan.rows, 1);
}

#[test]
fn scaler_outputs_tile_the_downscaled_frame() {
    let orch = FrameOrchestrator::new(three_col_config()).unwrap();
    let states = orch.derive_states().unwrap();
    assert_eq!(states.len(), 3);

    let scalers: Vec<_> = states
        .iter()
        .map(|s| s.paths[0].as_ref().unwrap().scaler.unwrap())
        .collect();

    // first slice: phase ramp starts at zero
    assert_eq!(scalers[0].trim0.start_x, 0);
    assert_eq!(scalers[0].trim0.size_x, 2068);
    assert_eq!(scalers[0].ip_int, 0);
    assert_eq!(scalers[0].cip_rmd, 0);
    assert_eq!(scalers[0].trim1.start_x, 0);
    assert_eq!(scalers[0].trim1.size_x, 1032);

    // middle slice: extrapolated initial phase
    assert_eq!(scalers[1].trim0.start_x, 42);
    assert_eq!(scalers[1].trim0.size_x, 2116);
    assert_eq!(scalers[1].scaler_in.w, 2116);
    assert_eq!(scalers[1].scaler_out.w, 1054);
    assert_eq!(scalers[1].ip_int, 4);
    assert_eq!(scalers[1].cip_int, 2);
    assert_eq!(scalers[1].trim1.start_x, 54);
    assert_eq!(scalers[1].trim1.size_x, 1000);

    // last slice: anchored to the frame-end phase
    assert_eq!(scalers[2].trim0.start_x, 42);
    assert_eq!(scalers[2].trim0.size_x, 2048);
    assert_eq!(scalers[2].scaler_out.w, 1022);
    assert_eq!(scalers[2].ip_int, 4);
    assert_eq!(scalers[2].cip_int, 2);
    assert_eq!(scalers[2].trim1.start_x, 54);
    assert_eq!(scalers[2].trim1.size_x, 968);

    let total: u32 = scalers.iter().map(|s| s.trim1.size_x).sum();
    assert_eq!(total, 3000);

    // vertical: single row, whole ramp in one slice, no initial phase
    for s in &scalers {
        assert_eq!(s.trim1.size_y, 1498);
        assert_eq!(s.ip_int_ver, 0);
        assert_eq!(s.ip_rmd_ver, 0);
    }
}

#[test]
fn store_addresses_pack_output_columns() {
    let orch = FrameOrchestrator::new(three_col_config()).unwrap();
    let states = orch.derive_states().unwrap();
    let addrs: Vec<u32> = states
        .iter()
        .map(|s| s.paths[0].as_ref().unwrap().store.unwrap().addr[0])
        .collect();
    assert_eq!(addrs[0], 0x2000_0000);
    assert_eq!(addrs[1], 0x2000_0000 + 1032);
    assert_eq!(addrs[2], 0x2000_0000 + 2032);
}

#[test]
fn fetch_windows_cover_the_expanded_slices() {
    let orch = FrameOrchestrator::new(three_col_config()).unwrap();
    let plan = orch.plan().clone();
    let states = orch.derive_states().unwrap();
    for (state, slice) in states.iter().zip(&plan.slices) {
        let f = state.fetch.unwrap();
        assert_eq!(f.size.w, slice.pos.width());
        assert_eq!(f.size.h, 2996);
    }
    // interior slices carry a mid-group MIPI byte position
    let f1 = states[1].fetch.unwrap();
    assert_eq!(f1.mipi_byte_rel_pos, plan.slices[1].pos.start_col & 0xf);
}
