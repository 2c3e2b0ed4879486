use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rostro_core::NearestNeighborMatcher;
use rostro_hw::{Camera, Frame};
use rostro_store::FaceStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod config;
mod pipeline;
mod session;

use config::Config;
use session::Session;

#[derive(Parser)]
#[command(name = "rostro", about = "Webcam face enrollment and recognition demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture one face from the camera and store it under a name
    Enroll {
        /// Name to store the captured face under
        #[arg(short, long)]
        name: String,
    },
    /// Recognize faces live against the stored set
    Recognize {
        /// Stop after this many video ticks (0 = run until interrupted)
        #[arg(long, default_value_t = 0)]
        frames: u64,
        /// Write the last annotated frame to this PNG path on exit
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Menu-driven combined demo (enrollment + recognition)
    Demo,
    /// Show configuration, enrolled faces, and discovered cameras
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Enroll { name } => run_enroll(&config, &name),
        Commands::Recognize { frames, snapshot } => {
            run_recognition(&config, frames, snapshot.as_deref())
        }
        Commands::Demo => run_demo(&config),
        Commands::Status => run_status(&config),
    }
}

/// One capture attempt: single frame in, one stored face out (or a
/// user-facing error and no state change).
fn run_enroll(config: &Config, name: &str) -> Result<()> {
    let mut session = Session::open(config)?;

    let mut frame = session.camera.capture_frame()?;
    frame.mirror_horizontal();

    let id = pipeline::capture_face(&mut session.detector, &session.store, &frame, name)?;
    println!("face of {name} captured and stored (id {id})");
    Ok(())
}

/// Timer-driven recognition loop. The gallery is loaded once at session
/// start; faces enrolled while the loop runs stay invisible until the next
/// session. A missed camera read skips the tick and never ends the loop.
fn run_recognition(config: &Config, max_ticks: u64, snapshot: Option<&Path>) -> Result<()> {
    let mut session = Session::open(config)?;

    let gallery = session.store.load_all()?;
    if gallery.is_empty() {
        println!("no faces enrolled; every face will read as unknown");
    }

    let matcher = NearestNeighborMatcher {
        max_distance: config.max_distance,
    };
    let tick = Duration::from_millis(config.tick_interval_ms);

    let mut last_status: Option<String> = None;
    let mut last_frame: Option<Frame> = None;
    let mut ticks = 0u64;

    loop {
        if max_ticks != 0 && ticks >= max_ticks {
            break;
        }
        ticks += 1;

        match session.camera.capture_frame() {
            Ok(mut frame) => {
                frame.mirror_horizontal();
                let annotations = pipeline::recognize_frame(
                    &mut session.detector,
                    &matcher,
                    &gallery,
                    &mut frame,
                );
                if let Some(annotation) = annotations.last() {
                    let name = annotation.outcome.display_name().to_string();
                    if last_status.as_deref() != Some(name.as_str()) {
                        println!("recognized: {name}");
                    }
                    last_status = Some(name);
                }
                last_frame = Some(frame);
            }
            Err(err) => {
                tracing::debug!(error = %err, "no frame this tick");
            }
        }

        std::thread::sleep(tick);
    }

    match &last_status {
        Some(name) => println!("last recognized: {name}"),
        None => println!("no faces seen"),
    }

    if let (Some(path), Some(frame)) = (snapshot, last_frame) {
        save_snapshot(&frame, path)?;
        println!("annotated frame written to {}", path.display());
    }

    Ok(())
}

/// Combined demo: a stdin menu looping between enrollment and recognition.
/// Each mode opens its own Session, so the camera is released on every
/// return to the menu.
fn run_demo(config: &Config) -> Result<()> {
    loop {
        println!();
        println!("1) enroll a face");
        println!("2) start recognition");
        println!("3) quit");
        let choice = prompt("> ")?;

        match choice.trim() {
            "1" => {
                let name = prompt("name: ")?;
                if let Err(err) = run_enroll(config, name.trim()) {
                    eprintln!("error: {err:#}");
                }
            }
            "2" => {
                if let Err(err) = run_recognition(config, config.demo_frames, None) {
                    eprintln!("error: {err:#}");
                }
            }
            "3" | "q" | "quit" => break,
            other => println!("unrecognized option: {other}"),
        }
    }
    Ok(())
}

fn run_status(config: &Config) -> Result<()> {
    let store = FaceStore::open(&config.db_path)?;

    let status = serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "db_path": config.db_path.display().to_string(),
        "faces_enrolled": store.count()?,
        "model_path": config.model_path.display().to_string(),
        "model_present": config.model_path.exists(),
        "cameras": Camera::list_devices(),
    });
    println!("{status}");
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    if read == 0 {
        // EOF on stdin quits the menu.
        return Ok("quit".to_string());
    }
    Ok(line)
}

fn save_snapshot(frame: &Frame, path: &Path) -> Result<()> {
    let img = image::GrayImage::from_raw(frame.width, frame.height, frame.data.clone())
        .context("frame buffer does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
    Ok(())
}
