//! Register map of the slice-programmable units.
//!
//! Only registers the per-slice walk rewrites live here; static frame
//! configuration is programmed once elsewhere and never touched between
//! slices. Multi-instance units (scaler paths, stores, tone mapping) are
//! addressed as a base plus fixed offsets.

// command / config unit
pub const CFG_START: u32 = 0x0010;
pub const CFG_CAP_FMCU_RDY: u32 = 0x0014;
pub const FMCU_CMD: u32 = 0x0f10;

/// Value written to [`FMCU_CMD`] to pulse the CFG copy.
pub const CFG_TRIGGER_PULSE: u32 = 0x2;
/// Shadow-done token per hardware context.
pub const SHADOW_DONE_CMD: [u32; 4] = [0x10, 0x12, 0x14, 0x16];
/// All-done token per hardware context.
pub const ALL_DONE_CMD: [u32; 4] = [0x11, 0x13, 0x15, 0x17];

// fetch unit
pub const FETCH_START: u32 = 0x0c04;
pub const FETCH_MEM_SLICE_SIZE: u32 = 0x0c14;
pub const FETCH_SLICE_Y_ADDR: u32 = 0x0c18;
pub const FETCH_SLICE_U_ADDR: u32 = 0x0c1c;
pub const FETCH_SLICE_V_ADDR: u32 = 0x0c20;
pub const FETCH_MIPI_INFO: u32 = 0x0c24;

// compressed raw fetch
pub const FBD_RAW_SLICE_SIZE: u32 = 0x0c44;
pub const FBD_RAW_TILE_NUM: u32 = 0x0c48;
pub const FBD_RAW_PIXEL_START: u32 = 0x0c4c;
pub const FBD_RAW_TILE_PITCH: u32 = 0x0c50;
pub const FBD_RAW_TILE_ADDR: u32 = 0x0c54;
pub const FBD_RAW_HEADER_ADDR: u32 = 0x0c58;
pub const FBD_RAW_LOWBIT_ADDR: u32 = 0x0c5c;

// dispatch
pub const DISPATCH_CH0_SIZE: u32 = 0x0d14;

// spatial NR
pub const NLM_CENTER: u32 = 0x1a10;
pub const POSTCDN_SLICE_CTRL: u32 = 0x1b10;
pub const YNR_CFG31: u32 = 0x1c7c;
pub const YNR_CFG33: u32 = 0x1c84;

// local tone mapping, one instance per domain
pub const LTM_RGB_BASE: u32 = 0x1500;
pub const LTM_YUV_BASE: u32 = 0x1d00;
pub const LTM_PARAM0_OFF: u32 = 0x10;
pub const LTM_PARAM1_OFF: u32 = 0x14;
pub const LTM_PARAM2_OFF: u32 = 0x18;
pub const LTM_MEM_ADDR_OFF: u32 = 0x1c;

// noise filter grain seeds
pub const NF_SEED: [u32; 4] = [0x1e10, 0x1e14, 0x1e18, 0x1e1c];

// 3DNR blend controller
pub const NR3_MEM_CTRL_PARAM1: u32 = 0x2110;
pub const NR3_MEM_CTRL_PARAM3: u32 = 0x2118;
pub const NR3_MEM_CTRL_PARAM4: u32 = 0x211c;
pub const NR3_MEM_CTRL_PARAM5: u32 = 0x2120;
pub const NR3_MEM_CTRL_FT_LUMA_ADDR: u32 = 0x2124;
pub const NR3_MEM_CTRL_FT_CHROMA_ADDR: u32 = 0x2128;
pub const NR3_MEM_CTRL_LINE_MODE: u32 = 0x212c;

// 3DNR store
pub const NR3_STORE_SIZE: u32 = 0x2214;
pub const NR3_STORE_LUMA_ADDR: u32 = 0x2218;
pub const NR3_STORE_CHROMA_ADDR: u32 = 0x221c;

// 3DNR crop
pub const NR3_CROP_PARAM0: u32 = 0x2310;
pub const NR3_CROP_PARAM1: u32 = 0x2314;
pub const NR3_CROP_PARAM2: u32 = 0x2318;
pub const NR3_CROP_PARAM3: u32 = 0x231c;

// 3DNR compressed store
pub const NR3_FBC_STORE_BORDER: u32 = 0x2410;
pub const NR3_FBC_STORE_SLICE_SIZE: u32 = 0x2414;
pub const NR3_FBC_STORE_TILE_NUM: u32 = 0x2418;
pub const NR3_FBC_STORE_Y_TILE_ADDR: u32 = 0x241c;
pub const NR3_FBC_STORE_C_TILE_ADDR: u32 = 0x2420;
pub const NR3_FBC_STORE_Y_HEADER_ADDR: u32 = 0x2424;
pub const NR3_FBC_STORE_C_HEADER_ADDR: u32 = 0x2428;

// 3DNR compressed reference fetch
pub const NR3_FBD_Y_SLICE_SIZE: u32 = 0x2510;
pub const NR3_FBD_C_SLICE_SIZE: u32 = 0x2514;
pub const NR3_FBD_Y_PIXEL_START: u32 = 0x2518;
pub const NR3_FBD_C_PIXEL_START: u32 = 0x251c;
pub const NR3_FBD_Y_TILE_NUM: u32 = 0x2520;
pub const NR3_FBD_C_TILE_NUM: u32 = 0x2524;
pub const NR3_FBD_TILE_PITCH: u32 = 0x2528;
pub const NR3_FBD_Y_TILE_ADDR: u32 = 0x252c;
pub const NR3_FBD_C_TILE_ADDR: u32 = 0x2530;
pub const NR3_FBD_Y_HEADER_ADDR: u32 = 0x2534;
pub const NR3_FBD_C_HEADER_ADDR: u32 = 0x2538;

// scaler paths: pre-capture, video, thumbnail
pub const SCL_BASE: [u32; 3] = [0x3100, 0x3200, 0x3300];
pub const SCL_CFG_OFF: u32 = 0x00;
pub const SCL_SRC_SIZE_OFF: u32 = 0x04;
pub const SCL_DES_SIZE_OFF: u32 = 0x08;
pub const SCL_TRIM0_START_OFF: u32 = 0x0c;
pub const SCL_TRIM0_SIZE_OFF: u32 = 0x10;
pub const SCL_HOR_IP_OFF: u32 = 0x14;
pub const SCL_HOR_CIP_OFF: u32 = 0x18;
pub const SCL_TRIM1_START_OFF: u32 = 0x1c;
pub const SCL_TRIM1_SIZE_OFF: u32 = 0x20;
pub const SCL_VER_IP_OFF: u32 = 0x24;
pub const SCL_VER_CIP_OFF: u32 = 0x28;

/// Path enable, written as a full computed word.
pub const SCL_CFG_PATH_EN: u32 = 1 << 31;
/// Trim and decimation bypass bits of a disabled path.
pub const SCL_CFG_BYPASS_TRIM: u32 = 1 << 8;
pub const SCL_CFG_BYPASS_DECI: u32 = 1 << 9;

// thumbnail scaler, within the third path's register window
pub const THUMB_SRC0_SIZE_OFF: u32 = 0x04;
pub const THUMB_Y_TRIM0_START_OFF: u32 = 0x08;
pub const THUMB_Y_TRIM0_SIZE_OFF: u32 = 0x0c;
pub const THUMB_UV_TRIM0_START_OFF: u32 = 0x10;
pub const THUMB_UV_TRIM0_SIZE_OFF: u32 = 0x14;
pub const THUMB_Y_FACTOR_IN_OFF: u32 = 0x18;
pub const THUMB_Y_FACTOR_OUT_OFF: u32 = 0x1c;
pub const THUMB_UV_FACTOR_IN_OFF: u32 = 0x20;
pub const THUMB_UV_FACTOR_OUT_OFF: u32 = 0x24;
pub const THUMB_Y_SRC_AFTER_DECI_OFF: u32 = 0x28;
pub const THUMB_Y_DST_AFTER_SCALER_OFF: u32 = 0x2c;
pub const THUMB_UV_SRC_AFTER_DECI_OFF: u32 = 0x30;
pub const THUMB_UV_DST_AFTER_SCALER_OFF: u32 = 0x34;
pub const THUMB_Y_INIT_PHASE_OFF: u32 = 0x38;
pub const THUMB_UV_INIT_PHASE_OFF: u32 = 0x3c;

// per-path store units
pub const STORE_BASE: [u32; 3] = [0x3400, 0x3500, 0x3600];
pub const STORE_PARAM_OFF: u32 = 0x00;
pub const STORE_SLICE_SIZE_OFF: u32 = 0x04;
pub const STORE_BORDER_OFF: u32 = 0x08;
pub const STORE_Y_ADDR_OFF: u32 = 0x0c;
pub const STORE_U_ADDR_OFF: u32 = 0x10;
pub const STORE_V_ADDR_OFF: u32 = 0x14;
pub const STORE_SHADOW_CLR_OFF: u32 = 0x18;

// per-path compressed store, within the store register window
pub const FBC_STORE_BORDER_OFF: u32 = 0x40;
pub const FBC_STORE_SLICE_SIZE_OFF: u32 = 0x44;
pub const FBC_STORE_TILE_NUM_OFF: u32 = 0x48;
pub const FBC_STORE_Y_TILE_ADDR_OFF: u32 = 0x4c;
pub const FBC_STORE_C_TILE_ADDR_OFF: u32 = 0x50;
pub const FBC_STORE_Y_HEADER_ADDR_OFF: u32 = 0x54;
pub const FBC_STORE_C_HEADER_ADDR_OFF: u32 = 0x58;
