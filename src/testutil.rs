//! Shared unit-test fixtures.

use slice_core::{FetchFormat, ImageSize, Trim};

use crate::config::{
    FetchConfig, FrameConfig, LineBufferMode, NrCenters, OutputDataMode, PathConfig, StoreConfig,
    StoreFormat,
};

/// 1080p YUV420 passthrough: one enabled path, scaler bypassed, nothing
/// optional. Tests mutate it toward the shape they need.
pub fn minimal_config() -> FrameConfig {
    FrameConfig {
        frame_in: ImageSize { w: 1920, h: 1080 },
        line_buffer_len: LineBufferMode::Full.len(),
        fetch: FetchConfig {
            format: FetchFormat::Yuv420_2Frame,
            src: ImageSize { w: 1920, h: 1080 },
            in_trim: Trim { start_x: 0, start_y: 0, size_x: 1920, size_y: 1080 },
            pitch: [1920, 1920, 0],
            addr: [0x1000_0000, 0x1020_0000, 0],
        },
        fbd_raw: None,
        paths: [
            Some(PathConfig {
                dst: ImageSize { w: 1920, h: 1080 },
                odata: OutputDataMode::Yuv420,
                trim0: Trim { start_x: 0, start_y: 0, size_x: 1920, size_y: 1080 },
                deci_x: 1,
                deci_y: 1,
                scaler_bypass: true,
                y_ver_tap: 4,
                uv_ver_tap: 4,
                store: StoreConfig {
                    format: StoreFormat::Yuv420_2Frame,
                    pitch: [1920, 1920, 0],
                    addr: [0x2000_0000, 0x2020_0000, 0],
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
