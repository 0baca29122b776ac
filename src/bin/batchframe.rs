use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use batchframe::{
    Batch, BatchConfig, InputFile, ItemOutcome, LoggingConfig, ProgressEvent, logging,
};

#[derive(Parser, Debug)]
#[command(name = "batchframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Log filter (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Frame every photo and write a zip archive of the results.
    Run(RunArgs),
    /// Print the effective batch configuration as JSON.
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
struct ConfigOverrides {
    /// JSON file with `prefix`, `quality` and `max_dimension`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prefix for output file names and the archive name.
    #[arg(long)]
    prefix: Option<String>,

    /// JPEG quality in [0, 1].
    #[arg(long)]
    quality: Option<f32>,

    /// Photos larger than this on either side are scaled down.
    #[arg(long)]
    max_dimension: Option<u32>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Frame image (PNG with a transparent middle works best).
    #[arg(long)]
    frame: PathBuf,

    /// Directory the archive is written to.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Photos to frame. Files that are not images are skipped.
    #[arg(required = true)]
    photos: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    #[command(flatten)]
    overrides: ConfigOverrides,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn resolve_config(overrides: &ConfigOverrides) -> anyhow::Result<BatchConfig> {
    let mut cfg = match &overrides.config {
        Some(path) => BatchConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => BatchConfig::default(),
    };
    if let Some(prefix) = &overrides.prefix {
        cfg.prefix = prefix.clone();
    }
    if let Some(quality) = overrides.quality {
        cfg.quality = quality;
    }
    if let Some(max_dimension) = overrides.max_dimension {
        cfg.max_dimension = max_dimension;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args.overrides)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &cfg).context("write config JSON")?;
    writeln!(out)?;
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<InputFile> {
    InputFile::from_path(path).with_context(|| format!("open '{}'", path.display()))
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args.overrides)?;
    let mut batch = Batch::new(cfg)?;

    batch.set_frame(read_input(&args.frame)?)?;

    let photos = args
        .photos
        .iter()
        .map(|p| read_input(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let offered = photos.len();
    let accepted = batch.add_images(photos);
    if accepted < offered {
        eprintln!("skipped {} non-image file(s)", offered - accepted);
    }

    let mut sink = |event: &ProgressEvent| match event {
        ProgressEvent::ItemStarted { name, .. } => eprint!("framing {name} ... "),
        ProgressEvent::ItemFinished {
            outcome, percent, ..
        } => match outcome {
            ItemOutcome::Completed { width, height } => {
                eprintln!("ok {width}x{height} [{percent}%]")
            }
            ItemOutcome::Failed { cause } => eprintln!("failed: {cause} [{percent}%]"),
            ItemOutcome::Skipped => {}
        },
        ProgressEvent::RunStarted { .. } | ProgressEvent::RunFinished { .. } => {}
    };

    let Some(report) = batch.run(&mut sink)? else {
        anyhow::bail!("nothing to do: a frame and at least one photo are required");
    };
    eprintln!(
        "{} framed, {} failed of {}",
        report.completed, report.failed, report.total
    );

    if report.completed == 0 {
        anyhow::bail!("every photo failed; no archive written");
    }

    let path = batchframe::write_archive(&batch, &args.out)
        .with_context(|| format!("write archive into '{}'", args.out.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
