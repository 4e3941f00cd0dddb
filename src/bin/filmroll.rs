use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use filmroll::{
    CanvasKind, DirFetcher, Dispatch, FrameFetcher, FrameIndex, FrameRGBA, FrameTimeline, Host,
    ReelConfig, ScrollReel, Viewport, ViewportClass, create_canvas,
};

const TICK_SECS: f64 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "filmroll", version)]
struct Cli {
    /// Log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Reel config JSON; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the asset paths requested for one viewport class.
    Paths(PathsArgs),
    /// Render the canvas at one scroll position as a PNG.
    Frame(FrameArgs),
    /// Scroll from top to bottom and write one PNG per step.
    Scrub(ScrubArgs),
    /// Print the presentation state at a scroll position as JSON, without loading frames.
    Inspect(InspectArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ClassArg {
    Compact,
    Wide,
}

impl From<ClassArg> for ViewportClass {
    fn from(value: ClassArg) -> Self {
        match value {
            ClassArg::Compact => ViewportClass::Compact,
            ClassArg::Wide => ViewportClass::Wide,
        }
    }
}

#[derive(Parser, Debug)]
struct PathsArgs {
    #[arg(long, value_enum)]
    class: ClassArg,
}

#[derive(Parser, Debug)]
struct PageArgs {
    /// Directory served as the site root (holds `frames/` and `frames-mobile/`).
    #[arg(long)]
    root: PathBuf,

    /// Viewport width in CSS pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in CSS pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Loader worker threads; rayon's default when omitted.
    #[arg(long)]
    threads: Option<usize>,

    /// Give up waiting for frame loads after this many seconds.
    #[arg(long, default_value_t = 30)]
    load_timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Scroll from the top and run this many 60 Hz ticks instead of settling the spring.
    #[arg(long)]
    ticks: Option<usize>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ScrubArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Number of scroll steps between top and bottom.
    #[arg(long, default_value_t = 60)]
    steps: u32,

    /// Output directory for `step-NNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Smoothed frame position; defaults to the settled position for `progress`.
    #[arg(long)]
    frame_position: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => ReelConfig::from_path(path)?,
        None => ReelConfig::default(),
    };
    match cli.cmd {
        Command::Paths(args) => cmd_paths(&config, args),
        Command::Frame(args) => cmd_frame(config, args),
        Command::Scrub(args) => cmd_scrub(config, args),
        Command::Inspect(args) => cmd_inspect(&config, args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn cmd_paths(config: &ReelConfig, args: PathsArgs) -> anyhow::Result<()> {
    let paths = config
        .conventions
        .request_paths(args.class.into(), config.frame_count);
    for path in paths {
        println!("{path}");
    }
    Ok(())
}

fn mount_page(config: ReelConfig, page: &PageArgs, host: &Host) -> anyhow::Result<ScrollReel> {
    let fetcher: Arc<dyn FrameFetcher> = Arc::new(DirFetcher::new(&page.root));
    let dispatch = Dispatch::pool(page.threads)?;
    let canvas = create_canvas(CanvasKind::Cpu)?;
    let mut reel = ScrollReel::mount(host, config, fetcher, dispatch, Some(canvas))?;

    let events = reel.wait_for_frames(Duration::from_secs(page.load_timeout_secs));
    let load = reel.state().load;
    tracing::info!(
        events = events.len(),
        loaded = load.loaded,
        total = load.total,
        "frame loading finished"
    );
    if load.loaded == 0 {
        anyhow::bail!(
            "no frames could be loaded from '{}' for the {} viewport",
            page.root.display(),
            reel.class()
        );
    }
    Ok(reel)
}

fn page_viewport(page: &PageArgs) -> anyhow::Result<Viewport> {
    Ok(Viewport::new(page.width, page.height, page.dpr)?)
}

fn cmd_frame(config: ReelConfig, args: FrameArgs) -> anyhow::Result<()> {
    let host = Host::new(page_viewport(&args.page)?);
    if args.ticks.is_none() {
        // Page opened already scrolled: the spring starts on its target.
        host.scroll_to(args.progress);
    }
    let mut reel = mount_page(config, &args.page, &host)?;

    match args.ticks {
        Some(ticks) => {
            host.scroll_to(args.progress);
            for _ in 0..ticks.max(1) {
                reel.tick(TICK_SECS)?;
            }
        }
        None => {
            reel.settle(TICK_SECS, 60 * 60)?;
        }
    }

    let state = reel.state();
    eprintln!(
        "frame {} (position {:.3}, canvas opacity {:.3})",
        FrameIndex(state.frame_index).ordinal(),
        state.frame_position,
        state.canvas_opacity
    );
    let out = reel
        .composite()
        .context("reel has no canvas to read back")?;
    write_png(&args.out, &out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_scrub(config: ReelConfig, args: ScrubArgs) -> anyhow::Result<()> {
    if args.steps == 0 {
        anyhow::bail!("--steps must be >= 1");
    }
    let host = Host::new(page_viewport(&args.page)?);
    let mut reel = mount_page(config, &args.page, &host)?;
    reel.tick(TICK_SECS)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    for step in 1..=args.steps {
        host.scroll_to(f64::from(step) / f64::from(args.steps));
        reel.tick(TICK_SECS)?;

        let state = reel.state();
        println!("{}", serde_json::to_string(&state)?);
        let out = reel
            .composite()
            .context("reel has no canvas to read back")?;
        write_png(&args.out_dir.join(format!("step-{step:04}.png")), &out)?;
    }
    eprintln!("wrote {} frames to {}", args.steps, args.out_dir.display());
    Ok(())
}

fn cmd_inspect(config: &ReelConfig, args: InspectArgs) -> anyhow::Result<()> {
    let timeline = FrameTimeline::from_config(config);
    let progress = args.progress.clamp(0.0, 1.0);
    let raw_frame = timeline.raw_frame(progress);
    let frame_position = args.frame_position.unwrap_or(raw_frame);
    let index = FrameIndex::clamp_position(frame_position, config.frame_count);

    let state = serde_json::json!({
        "progress": progress,
        "raw_frame": raw_frame,
        "frame_position": frame_position,
        "frame_index": index.0,
        "canvas_opacity": timeline.canvas_opacity(progress),
        "overlays": timeline.overlays(progress),
        "paths": {
            "compact": config.conventions.frame_path(ViewportClass::Compact, index),
            "wide": config.conventions.frame_path(ViewportClass::Wide, index),
        },
    });
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn write_png(path: &Path, frame: &FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
