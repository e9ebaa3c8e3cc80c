use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

/// Caption a still image, transform it, and turn it into a short video with background audio.
///
/// `ffmpeg` must sit in the same folder as this program (or in `--program-dir`).
#[derive(Parser, Debug)]
#[command(name = "stillreel", version)]
struct Cli {
    /// JSON job file; relative paths inside resolve against its directory.
    /// Without it the stock job runs against files in the program directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the `ffmpeg` executable (defaults to this program's directory).
    #[arg(long)]
    program_dir: Option<PathBuf>,

    /// Print the resolved job as JSON and exit without running it.
    #[arg(long)]
    print_config: bool,

    /// Increase log verbosity (-v debug, -vv trace). ffmpeg diagnostics log at info.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let program_dir = match cli.program_dir {
        Some(dir) => dir,
        None => stillreel::program_dir()?,
    };

    // Nothing is read or written before the tool check.
    let ffmpeg = stillreel::locate_ffmpeg(&program_dir)?;

    let cfg = match &cli.config {
        Some(path) => stillreel::PipelineConfig::load(path)?,
        None => stillreel::PipelineConfig::default().resolve(&program_dir),
    };
    cfg.validate()?;

    if cli.print_config {
        println!("{}", cfg.to_json_pretty()?);
        return Ok(());
    }

    let mut transcoder = stillreel::FfmpegTranscoder::new(ffmpeg);
    let report = stillreel::run_pipeline(&cfg, &mut transcoder)
        .with_context(|| format!("processing '{}'", cfg.input_image.display()))?;

    if let stillreel::TransformOutcome::PassedThrough = report.transform {
        eprintln!(
            "note: transformation '{}' is not one of grayscale/rotate/resize; image left unchanged",
            cfg.transformation
        );
    }
    if let Some(
        stillreel::FontOrigin::SystemFallback { family } | stillreel::FontOrigin::Builtin { family },
    ) = &report.overlay.font
    {
        eprintln!(
            "note: font '{}' unavailable, caption drawn with '{family}'",
            cfg.font.display()
        );
    }

    eprintln!("wrote {}", report.synthesis.encode.output.display());
    eprintln!("wrote {}", report.synthesis.mux.output.display());

    if let Some(ffprobe) = stillreel::locate_ffprobe(&program_dir) {
        match stillreel::probe_media(&ffprobe, &report.synthesis.mux.output) {
            Ok(info) => eprintln!(
                "  {}x{} @ {:.2} fps, {:.2}s, audio: {}",
                info.width,
                info.height,
                info.fps(),
                info.duration_sec,
                if info.has_audio { "yes" } else { "no" }
            ),
            Err(e) => tracing::warn!(error = %e, "could not probe final video"),
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
