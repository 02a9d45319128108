use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use pixelwall::config::SceneConfig;
use pixelwall::params::{Params, DEFAULT_TEXT};
use pixelwall::renderer::Renderer;
use pixelwall::session::Session;

const DEFAULT_FONT: &str = "assets/fonts/Orbitron-Bold.ttf";

#[derive(Debug, Parser)]
#[command(name = "pixelwall")]
#[command(about = "Headless generative pixel-wall renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Bold display font used for the text overlay.
    #[arg(long, global = true, default_value = DEFAULT_FONT)]
    font: PathBuf,

    /// Optional YAML overrides for the scene layout constants.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for noise and animation jitter; omit for a fresh run every time.
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a fragment and print its canonical, resolved form.
    Check {
        /// Fragment string, e.g. "color=1&interval=5&text=hello".
        fragment: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Render a single frame.
    Still {
        fragment: Option<String>,
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
        /// Timeline position of the frame, in milliseconds.
        #[arg(long = "at-ms", default_value_t = 0)]
        at_ms: u64,
    },
    /// Simulate the session over a time span and write one PNG per frame.
    Render {
        fragment: Option<String>,
        /// Output directory for frame_NNNNN.png files.
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
        #[arg(long, default_value_t = 10.0)]
        seconds: f32,
        #[arg(long, default_value_t = 30)]
        fps: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Check { fragment, json } => run_check(fragment.as_deref().unwrap_or(""), json),
        Commands::Still {
            fragment,
            output,
            at_ms,
        } => run_still(
            fragment.as_deref().unwrap_or(""),
            &output,
            at_ms,
            cfg,
            &cli.font,
            cli.seed,
        ),
        Commands::Render {
            fragment,
            output,
            seconds,
            fps,
        } => run_render(
            fragment.as_deref().unwrap_or(""),
            &output,
            seconds,
            fps,
            cfg,
            &cli.font,
            cli.seed,
        ),
    }
}

fn run_check(fragment: &str, json: bool) -> Result<()> {
    let params = Params::parse(fragment, DEFAULT_TEXT);
    let canonical = params.canonical_fragment();

    if json {
        let value = serde_json::json!({
            "color": params.palette,
            "interval": params.interval_secs,
            "text": params.text,
            "canonical": canonical,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "OK: color={} interval={}s text={:?}",
            params.palette, params.interval_secs, params.text
        );
        println!("canonical: {canonical}");
    }
    Ok(())
}

fn start_session(
    fragment: &str,
    cfg: SceneConfig,
    font: &Path,
    seed: Option<u64>,
) -> Result<Session> {
    let mut session = Session::new(cfg, font, seed)?;
    let applied = session.apply_fragment(fragment);
    if let Some(request) = applied.load_request {
        // A failed font load logs and keeps the (empty) previous overlay.
        session.perform_text_load(request);
    }
    Ok(session)
}

fn run_still(
    fragment: &str,
    output: &Path,
    at_ms: u64,
    cfg: SceneConfig,
    font: &Path,
    seed: Option<u64>,
) -> Result<()> {
    let mut session = start_session(fragment, cfg, font, seed)?;
    session.advance_to(at_ms);

    let mut renderer = Renderer::for_session(&session)?;
    renderer.render(&session)?;
    renderer.save_png(output)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn run_render(
    fragment: &str,
    output: &Path,
    seconds: f32,
    fps: u32,
    cfg: SceneConfig,
    font: &Path,
    seed: Option<u64>,
) -> Result<()> {
    if fps == 0 {
        bail!("fps must be > 0");
    }
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("seconds must be > 0");
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;

    let mut session = start_session(fragment, cfg, font, seed)?;
    let mut renderer = Renderer::for_session(&session)?;

    let total_frames = (seconds * fps as f32).ceil().max(1.0) as u64;
    for frame_index in 0..total_frames {
        session.advance_to(frame_index * 1000 / u64::from(fps));
        renderer.render(&session)?;
        renderer.save_png(&output.join(format!("frame_{frame_index:05}.png")))?;

        if frame_index % u64::from(fps) == 0 {
            eprintln!("rendered frame {}/{}", frame_index + 1, total_frames);
        }
    }

    println!("Wrote {} frames to {}", total_frames, output.display());
    Ok(())
}
