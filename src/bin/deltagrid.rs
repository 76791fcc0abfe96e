use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "deltagrid", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a video (or a directory of stills) into a delta-grid module.
    Convert(ConvertArgs),
    /// Print statistics about an existing module.
    Inspect(InspectArgs),
    /// List the built-in presets.
    Presets,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input video file (decoded with `ffmpeg`).
    #[arg(long = "in", required_unless_present = "frames_dir", conflicts_with = "frames_dir")]
    in_path: Option<PathBuf>,

    /// Directory of extracted still frames, one per sample, ordered by name.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Output module path.
    #[arg(long, default_value = deltagrid::DEFAULT_OUTPUT_NAME)]
    out: PathBuf,

    /// Keep an existing output file instead of replacing it.
    #[arg(long)]
    no_overwrite: bool,

    /// Average tile rows in parallel.
    #[arg(long)]
    parallel: bool,

    #[command(flatten)]
    job: JobArgs,
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Starting settings; individual flags below override them.
    #[arg(long, value_enum, conflicts_with = "config")]
    preset: Option<deltagrid::Preset>,

    /// JSON job file (`fps`, `width`, `height`, `block`, `quantStep`, `maxSeconds`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Working width before block truncation.
    #[arg(long)]
    width: Option<u32>,

    /// Working height before block truncation.
    #[arg(long)]
    height: Option<u32>,

    /// Tile edge length in pixels.
    #[arg(long)]
    block: Option<u32>,

    /// Channel quantization step.
    #[arg(long)]
    quant_step: Option<u32>,

    /// Maximum seconds of video to convert.
    #[arg(long)]
    max_seconds: Option<f64>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Module file to read.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Presets => cmd_presets(),
    }
}

fn resolve_job(args: &JobArgs) -> anyhow::Result<deltagrid::ConversionJob> {
    let mut job = match (&args.config, args.preset) {
        (Some(path), _) => deltagrid::ConversionJob::from_json_file(path)
            .with_context(|| format!("load job file '{}'", path.display()))?,
        (None, Some(preset)) => preset.job(),
        (None, None) => deltagrid::ConversionJob::default(),
    };
    if let Some(v) = args.fps {
        job.fps = v;
    }
    if let Some(v) = args.width {
        job.width = v;
    }
    if let Some(v) = args.height {
        job.height = v;
    }
    if let Some(v) = args.block {
        job.block = v;
    }
    if let Some(v) = args.quant_step {
        job.quant_step = v;
    }
    if let Some(v) = args.max_seconds {
        job.max_seconds = v;
    }
    job.validate()?;
    Ok(job)
}

fn open_source(args: &ConvertArgs, fps: u32) -> anyhow::Result<Box<dyn deltagrid::FrameSource>> {
    if let Some(dir) = &args.frames_dir {
        let src = deltagrid::ImageSequenceSource::open(dir, fps)?;
        return Ok(Box::new(src));
    }
    let path = args
        .in_path
        .as_deref()
        .context("either --in or --frames-dir is required")?;
    Ok(Box::new(deltagrid::FfmpegFrameSource::open(path)?))
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let job = resolve_job(&args.job)?;
    eprintln!(
        "grid {}x{} ({} cells) @ {} fps, load {}",
        job.grid_width(),
        job.grid_height(),
        job.grid_size(),
        job.fps,
        job.playback_load().label()
    );

    let mut source = open_source(&args, job.fps)?;
    let opts = deltagrid::ConvertOpts {
        parallel_tiles: args.parallel,
        ..deltagrid::ConvertOpts::default()
    };
    let mut progress = |event: deltagrid::ProgressEvent| {
        if let deltagrid::ProgressEvent::Frame(s) = event {
            eprint!(
                "\r{}/{} ({}%) eta {}",
                s.done,
                s.total,
                s.percent(),
                deltagrid::format_eta(s.eta_secs)
            );
            let _ = std::io::stderr().flush();
        }
    };
    let conversion = deltagrid::convert(
        &job,
        source.as_mut(),
        &mut progress,
        &deltagrid::CancelToken::new(),
        &opts,
    );
    eprintln!();
    let conversion = conversion.context("convert video")?;

    let text = conversion.to_module_string()?;
    deltagrid::write_module_file(&args.out, &text, !args.no_overwrite)?;
    eprintln!(
        "wrote {} ({} frames, {} changed cells)",
        args.out.display(),
        conversion.stats.frames_done,
        conversion.stats.cells_changed
    );
    Ok(())
}

fn read_module(path: &Path) -> anyhow::Result<deltagrid::VideoModule> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read module '{}'", path.display()))?;
    Ok(deltagrid::parse_module(&text).with_context(|| "parse module text")?)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let module = read_module(&args.in_path)?;
    let grids = module.replay()?;
    let h = module.header;
    let cells = h.width as usize * h.height as usize;
    let deltas = module.frames.len().saturating_sub(1);

    println!("grid:           {}x{} ({cells} cells)", h.width, h.height);
    println!("fps:            {}", h.fps);
    println!("frames:         {}", module.frames.len());
    println!(
        "duration:       {:.2}s",
        module.frames.len() as f64 / f64::from(h.fps.max(1))
    );
    println!(
        "keyframe ints:  {}",
        module.frames.first().map_or(0, Vec::len)
    );
    println!("changed cells:  {}", module.changed_cells());
    if deltas > 0 && cells > 0 {
        let ratio = module.changed_cells() as f64 / (deltas * cells) as f64;
        println!("change ratio:   {:.1}%", ratio * 100.0);
    }
    println!("replayed:       {} grids", grids.len());
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    for preset in deltagrid::Preset::ALL {
        let job = preset.job();
        println!(
            "{:<9} {:>3} fps  {:>3}x{:<3} block {:<2} step {:<2} max {:>3}s  grid {}x{}  load {}",
            preset.name(),
            job.fps,
            job.width,
            job.height,
            job.block,
            job.quant_step,
            job.max_seconds,
            job.grid_width(),
            job.grid_height(),
            job.playback_load().label()
        );
    }
    Ok(())
}
