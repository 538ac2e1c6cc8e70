//! Gridbank demo binary
//!
//! Runs the surface console over the simulated model: a REPL stands in for
//! the hardware while the full classifier -> command -> bank -> observer
//! path runs underneath, including real long-press timing.

use anyhow::Result;
use clap::Parser;
use gridbank::console::{ConsoleOutcome, SurfaceConsole};
use gridbank::{ControllerProfile, SurfaceSettings};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Gridbank - simulated grid control surface over a demo model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "gridbank.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Force the simple controller profile (latch-only function buttons)
    #[arg(long)]
    simple: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("Starting gridbank surface console...");

    let mut settings = SurfaceSettings::load_or_default(&args.config)?;
    if args.simple {
        settings.profile = ControllerProfile::Simple;
    }
    info!(
        "Bank window: {} tracks x {} scenes x {} sends, profile {:?}",
        settings.bank.num_tracks, settings.bank.num_scenes, settings.bank.num_sends,
        settings.profile
    );

    // Long-press timers deliver their LONG events here
    let (long_press_tx, mut long_press_rx) = mpsc::unbounded_channel();
    let mut console = SurfaceConsole::new(&settings, long_press_tx)?;

    // rustyline blocks, so it runs on its own thread and feeds the loop
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                warn!("Failed to start line editor: {}", e);
                return;
            }
        };
        loop {
            match editor.readline("gridbank> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(&line);
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    println!("Type 'help' for commands, 'quit' to exit.");

    loop {
        tokio::select! {
            Some(line) = line_rx.recv() => {
                match console.handle_line(&line) {
                    Ok(ConsoleOutcome::Quit) => break,
                    Ok(ConsoleOutcome::Continue) => {}
                    Err(e) => warn!("command failed: {:#}", e),
                }
            }

            Some((button, event)) = long_press_rx.recv() => {
                info!("{} long press", button);
                if let Err(e) = console.handle_button_event(button, event) {
                    warn!("long press handling failed: {:#}", e);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Gridbank shutdown complete");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
