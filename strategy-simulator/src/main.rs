//! Strategy Simulator
//!
//! Loads the game described by a configuration file and plays it once.
//!
//! ```text
//! strategy-simulator <game-configuration>
//! ```
//!
//! Exit codes: 0 on success, 1 on a usage error, -1 when loading or
//! playing the game failed.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use strategy_simulator::{games, Simulator, VERSION};

const E_OK: i32 = 0;
const E_USER: i32 = 1;
const E_INTERNAL: i32 = -1;

#[derive(Parser)]
#[command(name = "strategy-simulator")]
#[command(about = "Turn-based strategy simulation host")]
#[command(version)]
struct Cli {
    /// Game configuration file
    config: PathBuf,
}

fn main() {
    println!("Strategy Simulator {}", VERSION);

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() { E_USER } else { E_OK };
            let _ = e.print();
            process::exit(code);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run(&cli.config) {
        Ok(()) => {
            info!("Simulation finished. Exiting with code {}.", E_OK);
            process::exit(E_OK);
        }
        Err(e) => {
            error!("{:#}", e);
            process::exit(E_INTERNAL);
        }
    }
}

fn run(config_file: &Path) -> anyhow::Result<()> {
    let mut simulator = Simulator::new(games::bundled_registry());
    debug!(
        "Simulator constructed with {} exports, starting simulation.",
        simulator.registry().len()
    );

    simulator
        .load_game(config_file)
        .with_context(|| format!("Could not load game from '{}'", config_file.display()))?;
    simulator.play_game().context("Simulation failed")?;
    Ok(())
}
