//! Stepline CLI Tool
//!
//! Command-line interface for inspecting and playing stepwise timelines.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use stepline_core::{Catalog, Module, StepStatus, TimelineState};
use stepline_player::{Player, PlayerConfig, SystemClock, SPEED_PRESETS};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stepline")]
#[command(about = "Stepline - stepwise timeline playback for conceptual animations")]
#[command(version)]
struct Cli {
    /// Log playback internals (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in modules
    Modules,

    /// Show the steps and fault modes of a catalog
    Info {
        #[command(flatten)]
        source: CatalogSource,

        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a timeline in real time
    Play {
        #[command(flatten)]
        source: CatalogSource,

        /// Speed multiplier (0.5, 1 and 2 match the product controls)
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Fault mode to depict while playing
        #[arg(long)]
        failure_mode: Option<String>,

        /// Step index to start from
        #[arg(long)]
        from_step: Option<i64>,

        /// Print one JSON snapshot per state change
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct CatalogSource {
    /// Module identifier (unknown ids fall back to the default module)
    #[arg(default_value = "http-request")]
    module: String,

    /// Load the catalog from a JSON file instead of a built-in module
    #[arg(long)]
    catalog: Option<PathBuf>,
}

impl CatalogSource {
    fn load(&self) -> Result<(String, Catalog)> {
        if let Some(path) = &self.catalog {
            let file = File::open(path)
                .with_context(|| format!("Failed to open catalog {}", path.display()))?;
            let catalog = Catalog::from_json_reader(BufReader::new(file))
                .with_context(|| format!("Failed to read catalog {}", path.display()))?;
            return Ok((path.display().to_string(), catalog));
        }

        if Module::lookup(&self.module).is_none() {
            warn!(module = %self.module, fallback = %Module::default(), "unknown module");
        }
        let module = Module::select(&self.module);
        Ok((module.id().to_string(), module.catalog()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Modules => list_modules(),
        Commands::Info { source, json } => show_info(&source, json)?,
        Commands::Play {
            source,
            speed,
            failure_mode,
            from_step,
            json,
        } => play(&source, speed, failure_mode, from_step, json)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_modules() {
    for module in Module::ALL {
        let catalog = module.catalog();
        println!(
            "{:<14} {} ({} steps)",
            module.id(),
            module.title(),
            catalog.len()
        );
    }
}

fn show_info(source: &CatalogSource, json: bool) -> Result<()> {
    let (name, catalog) = source.load()?;

    if json {
        let stdout = std::io::stdout();
        catalog
            .to_json_writer(stdout.lock())
            .context("Failed to write catalog")?;
        println!();
        return Ok(());
    }

    println!("=== Catalog: {} ===", name);
    println!("Steps: {}", catalog.len());
    println!(
        "Total duration at 1x: {} ms ({:.1} seconds)",
        catalog.total_duration_ms(),
        catalog.total_duration_ms() as f64 / 1000.0
    );

    println!("\n=== Steps ===");
    for (i, step) in catalog.steps().iter().enumerate() {
        println!(
            "  [{}] {:<16} {:<20} {} ms",
            i, step.id, step.label, step.duration_ms
        );
        if let Some(description) = &step.description {
            println!("      {}", description);
        }
    }

    println!("\n=== Fault modes ===");
    if catalog.fault_modes().is_empty() {
        println!("  (none)");
    }
    for mode in catalog.fault_modes() {
        println!("  {:<20} {}", mode.id, mode.label);
    }

    Ok(())
}

fn play(
    source: &CatalogSource,
    speed: f64,
    failure_mode: Option<String>,
    from_step: Option<i64>,
    json: bool,
) -> Result<()> {
    let (name, catalog) = source.load()?;
    if catalog.is_empty() {
        println!("Catalog {} has no steps", name);
        return Ok(());
    }
    if !SPEED_PRESETS.contains(&speed) {
        warn!(speed, "speed is outside the product presets");
    }

    let config = PlayerConfig {
        speed,
        failure_mode,
        autoplay: false,
    };
    let mut player = Player::with_config(catalog, SystemClock::new(), &config)
        .context("Failed to set up player")?;
    if let Some(index) = from_step {
        player.set_step(index);
    }
    player.toggle_play();

    info!(catalog = %name, speed, "playing");
    let mut out = std::io::stdout().lock();
    print_state(&mut out, player.state(), json)?;

    let mut result = Ok(());
    player.run_blocking(|state| {
        if result.is_ok() {
            result = print_state(&mut out, state, json);
        }
    });
    result?;

    if !json {
        writeln!(out, "Finished {}", name)?;
    }
    Ok(())
}

fn print_state<W: Write>(out: &mut W, state: &TimelineState, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, state).context("Failed to serialize state")?;
        writeln!(out)?;
        return Ok(());
    }

    let bar: String = state
        .steps()
        .iter()
        .map(|s| match s.status {
            StepStatus::Idle => '.',
            StepStatus::Active => '>',
            StepStatus::Done => '#',
            StepStatus::Error => '!',
        })
        .collect();

    let label = state
        .current_step()
        .map(|s| s.step.label.as_str())
        .unwrap_or_default();
    let fault = state
        .failure_mode()
        .map(|m| format!(" [fault: {}]", m))
        .unwrap_or_default();

    writeln!(
        out,
        "[{:>3}%] {} {}/{} {}{}",
        state.progress(),
        bar,
        state.step_index() + 1,
        state.total_steps(),
        label,
        fault
    )?;
    out.flush()?;
    Ok(())
}
