//! # Frame Configuration
//!
//! Everything the register-derivation layer needs to know about one frame:
//! input geometry and format, per-path output geometry, and the optional
//! block configs (compressed raw fetch, 3DNR, LTM, noise filter).
//!
//! Validation happens once, up front, in [`FrameConfig::validate`]; the
//! adapters assume a validated config and only report errors the validation
//! cannot see (per-slice phase overflow, out-of-range paths).

use slice_core::{FetchFormat, ImageSize, Trim};

use crate::error::{IspError, IspResult};

/// Line-buffer capacity presets, selectable per hardware bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LineBufferMode {
    /// Full-size pipeline.
    Full,
    /// Cost-reduced bin.
    Half,
    /// Smallest bin.
    Quarter,
}

impl LineBufferMode {
    pub fn len(self) -> u32 {
        match self {
            LineBufferMode::Full => 2592,
            LineBufferMode::Half => 2048,
            LineBufferMode::Quarter => 1280,
        }
    }
}

/// Output pixel layouts the store units write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreFormat {
    /// Interleaved UYVY, one plane, 2 bytes per pixel.
    Uyvy,
    Yuv422_2Frame,
    Yuv422_3Frame,
    Yuv420_2Frame,
    Yvu420_2Frame,
    Yuv420_3Frame,
}

/// Chroma layout of a scaler path's output data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputDataMode {
    Yuv422,
    Yuv420,
}

/// The three output paths, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathId {
    PreCapture,
    Video,
    Thumbnail,
}

impl PathId {
    pub const ALL: [PathId; 3] = [PathId::PreCapture, PathId::Video, PathId::Thumbnail];

    pub fn index(self) -> usize {
        match self {
            PathId::PreCapture => 0,
            PathId::Video => 1,
            PathId::Thumbnail => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PathId::PreCapture => "pre-capture",
            PathId::Video => "video",
            PathId::Thumbnail => "thumbnail",
        }
    }
}

/// Fetch unit configuration: where the source frame lives and how it is laid
/// out in memory.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub format: FetchFormat,
    /// Full source buffer size, before input crop.
    pub src: ImageSize,
    /// Input crop applied to the source buffer.
    pub in_trim: Trim,
    /// Per-plane line pitch in bytes.
    pub pitch: [u32; 3],
    /// Per-plane base addresses.
    pub addr: [u32; 3],
}

/// Compressed (FBD) raw fetch configuration. When present it replaces the
/// linear fetch unit for the input frame.
#[derive(Clone, Debug)]
pub struct FbdRawConfig {
    /// Tile-row pitch of the compressed buffer, in tiles.
    pub tiles_num_pitch: u32,
    /// Frame-level payload tile address, pre-shifted by 8.
    pub tile_addr_init_x256: u32,
    /// Frame-level header address.
    pub header_addr_init: u32,
    /// Frame-level low-bit plane address.
    pub low_bit_addr_init: u32,
    /// Width of plane 0 in pixels, used for low-bit addressing.
    pub width0: u32,
}

/// Store unit configuration for one path.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub format: StoreFormat,
    pub pitch: [u32; 3],
    pub addr: [u32; 3],
    /// Compressed output; replaces linear store addressing when present.
    pub fbc: Option<FbcStoreConfig>,
}

/// Compressed (FBC) store configuration for one path.
#[derive(Clone, Debug)]
pub struct FbcStoreConfig {
    /// Tile pad width/height in pixels.
    pub pad_w: u32,
    pub pad_h: u32,
    /// Byte alignment of one tile's payload.
    pub base_align: u32,
    pub y_tile_addr_init_x256: u32,
    pub c_tile_addr_init_x256: u32,
    pub y_header_addr_init: u32,
    pub c_header_addr_init: u32,
}

/// One scaler path: frame-level trim, decimation, scaling and store.
#[derive(Clone, Debug)]
pub struct PathConfig {
    /// Frame output size after scaling.
    pub dst: ImageSize,
    pub odata: OutputDataMode,
    /// Pre-scaler trim in input coordinates.
    pub trim0: Trim,
    /// Decimation factors applied after trim0 (1 = none).
    pub deci_x: u32,
    pub deci_y: u32,
    /// Scaler engaged; when false the path stores the trimmed input as-is.
    pub scaler_bypass: bool,
    /// Vertical filter taps, from the loaded coefficient set.
    pub y_ver_tap: u32,
    pub uv_ver_tap: u32,
    pub store: StoreConfig,
}

impl PathConfig {
    /// Horizontal scale factors in luma pixels (input, output).
    pub fn factors_hor(&self) -> (u32, u32) {
        (self.trim0.size_x / self.deci_x, self.dst.w)
    }

    /// Vertical scale factors in lines (input, output).
    pub fn factors_ver(&self) -> (u32, u32) {
        (self.trim0.size_y / self.deci_y, self.dst.h)
    }
}

/// Thumbnail scaler configuration. The thumbnail path bypasses the main
/// scaler and uses a fixed-function downscaler whose luma and chroma ratios
/// are programmed as frame in/out pairs; slices scale those pairs down
/// proportionally.
#[derive(Clone, Debug)]
pub struct ThumbScalerConfig {
    pub odata: OutputDataMode,
    /// Frame-level trim in input coordinates.
    pub trim0: Trim,
    pub deci_x: u32,
    pub deci_y: u32,
    pub y_factor_in: ImageSize,
    pub y_factor_out: ImageSize,
    pub uv_factor_in: ImageSize,
    pub uv_factor_out: ImageSize,
    pub store: StoreConfig,
}

/// 3DNR temporal denoise configuration.
#[derive(Clone, Debug)]
pub struct Nr3Config {
    /// Global motion vector for the frame, in pixels.
    pub mv_x: i32,
    pub mv_y: i32,
    /// Reference-frame plane addresses (fetch side).
    pub fetch_addr: [u32; 2],
    /// Output-frame plane addresses (store side).
    pub store_addr: [u32; 2],
    /// Reference frame is FBD-compressed.
    pub compressed_fetch: Option<FbcStoreConfig>,
    /// Output frame is FBC-compressed.
    pub compressed_store: Option<FbcStoreConfig>,
}

/// Local tone mapping statistics/map configuration for one domain.
#[derive(Clone, Debug)]
pub struct LtmConfig {
    /// Tile size of the tone map grid, in pixels.
    pub tile_width: u32,
    pub tile_height: u32,
    /// Base address of the per-tile histogram buffer.
    pub mem_init_addr: u32,
}

/// Noise filter (grain) configuration.
#[derive(Clone, Debug)]
pub struct NoiseFilterConfig {
    /// Seed mode 1 re-derives per-slice seeds from `seed0`.
    pub yrandom_mode: u32,
    pub seed0: u32,
}

/// Spatial NR windows that need per-slice center adjustment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NrCenters {
    pub nlm_center_x: u32,
    pub nlm_center_y: u32,
    pub ynr_center_x: u32,
    pub ynr_center_y: u32,
}

/// Complete per-frame configuration.
#[derive(Clone, Debug)]
pub struct FrameConfig {
    /// Frame fed to the pipeline (post input-crop).
    pub frame_in: ImageSize,
    pub line_buffer_len: u32,
    pub fetch: FetchConfig,
    pub fbd_raw: Option<FbdRawConfig>,
    /// Pre-capture and video scaler paths.
    pub paths: [Option<PathConfig>; 2],
    pub thumb: Option<ThumbScalerConfig>,
    pub nr: NrCenters,
    pub nr3: Option<Nr3Config>,
    pub ltm_rgb: Option<LtmConfig>,
    pub ltm_yuv: Option<LtmConfig>,
    pub noise_filter: Option<NoiseFilterConfig>,
}

impl FrameConfig {
    /// Frame output widths across all enabled paths, for slice sizing.
    pub fn out_widths(&self) -> Vec<u32> {
        let mut widths: Vec<u32> = self.paths.iter().flatten().map(|p| p.dst.w).collect();
        if let Some(t) = &self.thumb {
            widths.push(t.y_factor_out.w);
        }
        widths
    }

    pub fn validate(&self) -> IspResult<()> {
        if self.frame_in.w == 0 || self.frame_in.h == 0 {
            return Err(IspError::config(
                "frame_in",
                format!("{}x{}", self.frame_in.w, self.frame_in.h),
                "frame must be non-empty",
            ));
        }
        if self.line_buffer_len == 0 {
            return Err(IspError::config(
                "line_buffer_len",
                "0",
                "line buffer length must be non-zero",
            ));
        }
        if self.fetch.in_trim.start_x + self.fetch.in_trim.size_x > self.fetch.src.w
            || self.fetch.in_trim.start_y + self.fetch.in_trim.size_y > self.fetch.src.h
        {
            return Err(IspError::config(
                "fetch.in_trim",
                format!(
                    "{}+{} x {}+{}",
                    self.fetch.in_trim.start_x,
                    self.fetch.in_trim.size_x,
                    self.fetch.in_trim.start_y,
                    self.fetch.in_trim.size_y
                ),
                "input crop exceeds source buffer",
            ));
        }
        if self.fetch.in_trim.size_x != self.frame_in.w
            || self.fetch.in_trim.size_y != self.frame_in.h
        {
            return Err(IspError::config(
                "fetch.in_trim",
                format!("{}x{}", self.fetch.in_trim.size_x, self.fetch.in_trim.size_y),
                "input crop size must match the pipeline frame size",
            ));
        }
        if self.fbd_raw.is_some() && !self.fetch.format.is_raw() {
            return Err(IspError::config(
                "fbd_raw",
                "enabled",
                "compressed fetch requires a raw input format",
            ));
        }
        for (i, path) in self.paths.iter().enumerate() {
            let Some(p) = path else { continue };
            let name = PathId::ALL[i].name();
            if p.deci_x == 0 || p.deci_y == 0 {
                return Err(IspError::config(
                    format!("paths[{}].deci", name),
                    format!("{}x{}", p.deci_x, p.deci_y),
                    "decimation factors start at 1",
                ));
            }
            if p.dst.w == 0 || p.dst.h == 0 {
                return Err(IspError::config(
                    format!("paths[{}].dst", name),
                    format!("{}x{}", p.dst.w, p.dst.h),
                    "output size must be non-empty",
                ));
            }
            if p.trim0.start_x + p.trim0.size_x > self.frame_in.w
                || p.trim0.start_y + p.trim0.size_y > self.frame_in.h
            {
                return Err(IspError::config(
                    format!("paths[{}].trim0", name),
                    format!("{}x{}", p.trim0.size_x, p.trim0.size_y),
                    "path trim exceeds the input frame",
                ));
            }
            if !p.scaler_bypass {
                let (f_in, f_out) = p.factors_hor();
                if f_out > f_in {
                    return Err(IspError::capability(
                        format!("{} path upscale", name),
                        "the scaler only downscales",
                    ));
                }
            }
        }
        if let Some(t) = &self.thumb {
            if t.trim0.start_x + t.trim0.size_x > self.frame_in.w
                || t.trim0.start_y + t.trim0.size_y > self.frame_in.h
            {
                return Err(IspError::config(
                    "thumb.trim0",
                    format!("{}x{}", t.trim0.size_x, t.trim0.size_y),
                    "thumbnail trim exceeds the input frame",
                ));
            }
            if t.y_factor_in.w == 0
                || t.y_factor_in.h == 0
                || t.y_factor_out.w == 0
                || t.y_factor_out.h == 0
                || t.deci_x == 0
                || t.deci_y == 0
            {
                return Err(IspError::config(
                    "thumb",
                    format!("{}x{} -> {}x{}", t.y_factor_in.w, t.y_factor_in.h,
                        t.y_factor_out.w, t.y_factor_out.h),
                    "thumbnail factors and decimation must be non-zero",
                ));
            }
        }
        if let Some(nf) = &self.noise_filter {
            if nf.yrandom_mode > 1 {
                return Err(IspError::config(
                    "noise_filter.yrandom_mode",
                    nf.yrandom_mode.to_string(),
                    "only modes 0 and 1 exist",
                ));
            }
        }
        Ok(())
    }
}
