use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use motiongram::{
    BackendKind, Canvas, Document, GifOpts, HostClock, PngSequenceSink, RenderSettings, Session,
    SessionOpts, SystemClock, TickOutcome, VirtualClock, create_backend, parse_color,
};

#[derive(Parser, Debug)]
#[command(name = "motiongram", version, about = "Animated vector diagrams from YAML/JSON")]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw the diagram at its start positions to a PNG.
    Frame(FrameArgs),
    /// Run the full animation and write an animated GIF.
    Animate(AnimateArgs),
    /// Print one element with every default applied, as YAML.
    Defaults(DefaultsArgs),
}

#[derive(Parser, Debug)]
struct CanvasArgs {
    /// Canvas width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Background color (name, #hex or rgb()/rgba()).
    #[arg(long, default_value = "white")]
    background: String,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,

    /// Extra directory with .ttf/.otf label fonts.
    #[arg(long)]
    font_dir: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input document (YAML, or JSON by extension).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Input document (YAML, or JSON by extension).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    canvas: CanvasArgs,

    /// Run length in milliseconds.
    #[arg(long, default_value_t = 10_000.0)]
    duration_ms: f64,

    /// Milliseconds between ticks.
    #[arg(long = "tick-ms", default_value_t = 20.0)]
    tick_ms: f64,

    /// Drive the run with the wall clock instead of virtual time.
    #[arg(long)]
    realtime: bool,

    /// Also write every frame as a numbered PNG into this directory.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// GIF frame delay in milliseconds.
    #[arg(long, default_value_t = 20)]
    delay_ms: u32,

    /// GIF quantization speed (1 best .. 30 fastest).
    #[arg(long, default_value_t = 10)]
    speed: i32,
}

#[derive(Parser, Debug)]
struct DefaultsArgs {
    /// Input document (YAML, or JSON by extension).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Element name.
    #[arg(long)]
    name: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Animate(args) => cmd_animate(args),
        Command::Defaults(args) => cmd_defaults(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn session_opts(
    canvas: &CanvasArgs,
    duration_ms: f64,
    tick_ms: f64,
) -> anyhow::Result<SessionOpts> {
    let background = parse_color(&canvas.background)
        .with_context(|| format!("unrecognized background color '{}'", canvas.background))?;
    Ok(SessionOpts {
        canvas: Canvas::new(canvas.width, canvas.height)?,
        background,
        duration_ms,
        tick_interval_ms: tick_ms,
    })
}

fn backend(canvas: &CanvasArgs) -> Box<dyn motiongram::ShapeRenderer> {
    let kind = match canvas.backend {
        BackendChoice::Cpu => BackendKind::Cpu,
    };
    let settings = RenderSettings {
        font_dirs: canvas.font_dir.clone(),
        ..RenderSettings::default()
    };
    create_backend(kind, &settings)
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let doc = Document::from_path(&args.in_path)?;
    let opts = session_opts(&args.canvas, 0.0, 20.0)?;
    let mut sess = Session::new(opts, backend(&args.canvas), SystemClock::new())?;
    sess.load(doc);
    let frame = sess.draw()?;

    ensure_parent_dir(&args.out)?;
    motiongram::save_png(&frame, &args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_animate(args: AnimateArgs) -> anyhow::Result<()> {
    if args.realtime {
        animate_with(SystemClock::new(), &args)
    } else {
        animate_with(VirtualClock::new(), &args)
    }
}

fn animate_with<C: HostClock>(host: C, args: &AnimateArgs) -> anyhow::Result<()> {
    let doc = Document::from_path(&args.in_path)?;
    let opts = session_opts(&args.canvas, args.duration_ms, args.tick_ms)?;
    let mut sess = Session::new(opts, backend(&args.canvas), host)?;
    sess.load(doc);

    // Frames captured before a failure are still written out.
    let run = sess.run_to_completion();
    match &run {
        Ok(TickOutcome::Finished { frames }) => tracing::info!(frames, "animation complete"),
        Ok(other) => tracing::warn!(outcome = ?other, "animation did not finish"),
        Err(e) => tracing::warn!(error = %e, frames = sess.frames().len(), "animation halted"),
    }

    if !sess.frames().is_empty() {
        let gif = GifOpts {
            delay_ms: args.delay_ms,
            speed: args.speed,
            ..GifOpts::default()
        };
        motiongram::write_gif(sess.frames(), &args.out, gif)
            .with_context(|| format!("write gif '{}'", args.out.display()))?;
        eprintln!("wrote {} ({} frames)", args.out.display(), sess.frames().len());

        if let Some(dir) = &args.frames_dir {
            let mut sink = PngSequenceSink::new(dir);
            sess.export(&mut sink)
                .with_context(|| format!("write frames to '{}'", dir.display()))?;
            eprintln!("wrote {} frames to {}", sink.written(), dir.display());
        }
    }

    run?;
    Ok(())
}

fn cmd_defaults(args: DefaultsArgs) -> anyhow::Result<()> {
    let doc = Document::from_path(&args.in_path)?;
    let yaml = doc.describe_element(&args.name)?;
    print!("{yaml}");
    Ok(())
}
