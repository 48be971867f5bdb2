use anyhow::{bail, Context, Result};
use clap::Parser;

use isp_pipeline::config::{
    FetchConfig, FrameConfig, LineBufferMode, NrCenters, OutputDataMode, PathConfig, StoreConfig,
    StoreFormat, ThumbScalerConfig,
};
use isp_pipeline::{FrameOrchestrator, TriggerMode};
use slice_core::{FetchFormat, ImageSize, Trim};

/// Plan ISP slices and derive the per-slice register programming.
#[derive(Parser, Debug)]
#[command(name = "ispcfg")]
#[command(about = "Slice a camera frame for a line-buffer limited ISP and derive registers")]
struct Args {
    /// Input frame size as WxH, e.g. 4000x3000
    #[arg(long, value_parser = parse_size)]
    frame: ImageSize,

    /// Input pixel format
    #[arg(long, value_enum, default_value = "csi2-raw10")]
    format: FetchFormat,

    /// Line buffer bin of the target hardware
    #[arg(long, value_enum, default_value = "full")]
    line_buffer: LineBufferMode,

    /// Scaler path output size as WxH; repeat for a second path
    #[arg(long = "out", value_parser = parse_size)]
    out: Vec<ImageSize>,

    /// Store the first path unscaled (scaler bypass)
    #[arg(long)]
    bypass: bool,

    /// Thumbnail output size as WxH
    #[arg(long, value_parser = parse_size)]
    thumb: Option<ImageSize>,

    /// Hardware context id (0-3)
    #[arg(long, default_value_t = 0)]
    ctx: usize,

    /// Slice trigger mode
    #[arg(long, value_enum, default_value = "cfg")]
    trigger: TriggerArg,

    /// Print the derived register command stream
    #[arg(long)]
    commands: bool,

    /// Emit machine-readable JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum TriggerArg {
    /// Command unit arms the CFG copy per slice
    Cfg,
    /// Software starts the fetch unit per slice
    Fetch,
}

impl From<TriggerArg> for TriggerMode {
    fn from(t: TriggerArg) -> Self {
        match t {
            TriggerArg::Cfg => TriggerMode::Cfg,
            TriggerArg::Fetch => TriggerMode::Fetch,
        }
    }
}

fn parse_size(s: &str) -> Result<ImageSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
    let w = w.parse().map_err(|_| format!("bad width '{}'", w))?;
    let h = h.parse().map_err(|_| format!("bad height '{}'", h))?;
    Ok(ImageSize { w, h })
}

/// Line pitch of plane 0 for a format, in bytes.
fn pitch_for(format: FetchFormat, width: u32) -> u32 {
    match format {
        FetchFormat::Csi2Raw10 => width / 4 * 5,
        FetchFormat::Raw10 => width * 2,
        _ => width,
    }
}

fn build_config(args: &Args) -> Result<FrameConfig> {
    if args.out.is_empty() && args.thumb.is_none() {
        bail!("at least one --out or --thumb output is required");
    }
    if args.out.len() > 2 {
        bail!("at most two scaler paths exist, got {} --out values", args.out.len());
    }

    let frame = args.frame;
    let full_trim = Trim { start_x: 0, start_y: 0, size_x: frame.w, size_y: frame.h };

    let mut paths: [Option<PathConfig>; 2] = [None, None];
    for (i, dst) in args.out.iter().enumerate() {
        paths[i] = Some(PathConfig {
            dst: *dst,
            odata: OutputDataMode::Yuv420,
            trim0: full_trim,
            deci_x: 1,
            deci_y: 1,
            scaler_bypass: args.bypass && i == 0,
            y_ver_tap: 4,
            uv_ver_tap: 4,
            store: StoreConfig {
                format: StoreFormat::Yuv420_2Frame,
                pitch: [dst.w, dst.w, 0],
                addr: [
                    0x2000_0000 + (i as u32) * 0x0100_0000,
                    0x2080_0000 + (i as u32) * 0x0100_0000,
                    0,
                ],
                fbc: None,
            },
        });
    }

    let thumb = args.thumb.map(|dst| ThumbScalerConfig {
        odata: OutputDataMode::Yuv420,
        trim0: full_trim,
        deci_x: 1,
        deci_y: 1,
        y_factor_in: frame,
        y_factor_out: dst,
        uv_factor_in: ImageSize { w: frame.w / 2, h: frame.h },
        uv_factor_out: ImageSize { w: dst.w / 2, h: dst.h },
        store: StoreConfig {
            format: StoreFormat::Yuv420_2Frame,
            pitch: [dst.w, dst.w, 0],
            addr: [0x2800_0000, 0x2880_0000, 0],
            fbc: None,
        },
    });

    Ok(FrameConfig {
        frame_in: frame,
        line_buffer_len: args.line_buffer.len(),
        fetch: FetchConfig {
            format: args.format,
            src: frame,
            in_trim: full_trim,
            pitch: [pitch_for(args.format, frame.w), frame.w, 0],
            addr: [0x1000_0000, 0x1080_0000, 0],
        },
        fbd_raw: None,
        paths,
        thumb,
        nr: NrCenters {
            nlm_center_x: frame.w / 2,
            nlm_center_y: frame.h / 2,
            ynr_center_x: frame.w / 2,
            ynr_center_y: frame.h / 2,
        },
        nr3: None,
        ltm_rgb: None,
        ltm_yuv: None,
        noise_filter: None,
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let orch = FrameOrchestrator::new(config).context("frame configuration rejected")?;
    let plan = orch.plan();

    let queue = if args.commands || args.json {
        Some(orch.emit_sequenced(args.ctx, args.trigger.into())?)
    } else {
        None
    };

    if args.json {
        let slices: Vec<_> = plan
            .slices
            .iter()
            .map(|s| {
                serde_json::json!({
                    "col": s.col,
                    "start_col": s.pos.start_col,
                    "end_col": s.pos.end_col,
                    "payload_start": s.pos_orig.start_col,
                    "payload_width": s.pos_orig.width(),
                    "overlap_left": s.overlap.left,
                    "overlap_right": s.overlap.right,
                })
            })
            .collect();
        let mut doc = serde_json::json!({
            "frame": { "w": plan.img.w, "h": plan.img.h },
            "cols": plan.cols,
            "slice_width": plan.slice_width,
            "slices": slices,
        });
        if let Some(q) = &queue {
            doc["commands"] = q
                .commands()
                .iter()
                .map(|c| serde_json::json!({ "addr": c.addr, "value": c.value }))
                .collect();
        }
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!(
        "frame {}x{}, {} slice column(s) of {} px",
        plan.img.w, plan.img.h, plan.cols, plan.slice_width
    );
    for s in &plan.slices {
        println!(
            "  slice {}: cols {}..={} (payload {}..={}, overlap l{} r{})",
            s.col,
            s.pos.start_col,
            s.pos.end_col,
            s.pos_orig.start_col,
            s.pos_orig.end_col,
            s.overlap.left,
            s.overlap.right
        );
    }
    if let Some(q) = queue {
        println!("{} register writes:", q.len());
        for c in q.commands() {
            println!("  {:#06x} <- {:#010x}", c.addr, c.value);
        }
    }
    Ok(())
}
