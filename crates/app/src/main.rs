mod headless;

use std::{io::BufRead, path::PathBuf};

use clap::{Parser, Subcommand};
use headless::TraceRenderer;
use monkey_eyes_core::{channel, AppConfig, CommandSender, EyesApp, Script};
use tracing_subscriber::EnvFilter;

fn main() -> monkey_eyes_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            no_stdin,
        } => run_live(config.as_ref(), ticks, no_stdin),
        Commands::Demo { config, script } => run_demo(config.as_ref(), script.as_ref()),
        Commands::CheckConfig { path } => check_config(&path),
    }
}

fn load_config(path: Option<&PathBuf>) -> monkey_eyes_core::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    }
}

fn run_live(
    config: Option<&PathBuf>,
    ticks: Option<u64>,
    no_stdin: bool,
) -> monkey_eyes_core::Result<()> {
    let config = load_config(config)?;
    tracing::info!(tick_hz = config.display.tick_hz, "starting live mode");

    let (tx, rx) = channel();
    if !no_stdin {
        spawn_stdin_reader(tx);
    }

    let mut app = EyesApp::new(&config, TraceRenderer::new(), rx);
    if let Some(ticks) = ticks {
        app = app.with_tick_limit(ticks);
    }
    let summary = app.run()?;
    tracing::info!(
        ticks = summary.ticks,
        frames = app.renderer().frames(),
        final_state = summary.final_state.as_str(),
        "live mode finished"
    );
    Ok(())
}

fn run_demo(
    config: Option<&PathBuf>,
    script: Option<&PathBuf>,
) -> monkey_eyes_core::Result<()> {
    let config = load_config(config)?;
    let script = match script {
        Some(path) => Script::load(path)?,
        None => Script::demo(),
    };
    tracing::info!(events = script.events.len(), "running demo script");

    // Sender stays alive for the whole run so the queue never disconnects.
    let (_tx, rx) = channel();
    let mut app = EyesApp::new(&config, TraceRenderer::new(), rx).with_script(script);
    let summary = app.run()?;
    tracing::info!(ticks = summary.ticks, "demo finished");
    Ok(())
}

fn check_config(path: &PathBuf) -> monkey_eyes_core::Result<()> {
    let config = AppConfig::load(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Forwards each stdin line (a command string or a single-key shortcut) to
/// the render loop.
fn spawn_stdin_reader(tx: CommandSender) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(error = %err, "stdin closed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if tx.send_raw(line).is_err() {
                break;
            }
        }
        tracing::debug!("stdin reader finished");
    });
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Animated monkey eyes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the eyes, reading commands (`laugh`, `smile:1500`, `l`, `q`, ...)
    /// from stdin.
    Run {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stop after this many ticks.
        #[arg(long)]
        ticks: Option<u64>,
        /// Do not read commands from stdin.
        #[arg(long)]
        no_stdin: bool,
    },
    /// Replay a scripted sequence of expressions, then quit.
    Demo {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON script file. Defaults to the built-in tour of every expression.
        #[arg(short, long)]
        script: Option<PathBuf>,
    },
    /// Load a configuration file, validate it and print the effective values.
    CheckConfig {
        /// Path to the configuration file.
        path: PathBuf,
    },
}
