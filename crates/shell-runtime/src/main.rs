//! # Pulse Shell
//!
//! Entry point of the FitLog host application.
//!
//! ```text
//! pulse-shell                                   # run until Ctrl+C
//! pulse-shell --config pulse.toml               # explicit configuration
//! pulse-shell -n /workout/new/Squats/3/10 -n /analytics
//! ```
//!
//! With `--navigate` the shell walks the given paths, prints each view and
//! exits. Without it the shell shows the home view and waits for Ctrl+C.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use pulse_telemetry::{init_telemetry, TelemetryConfig};
use shared_types::StateAction;
use shell_runtime::{ShellConfig, ShellRuntime};

#[derive(Debug, Parser)]
#[command(name = "pulse-shell", version, about = "FitLog micro-frontend shell")]
struct Args {
    /// Configuration file (falls back to $PULSE_CONFIG, then ./pulse.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to navigate to; repeat to walk several routes.
    #[arg(short, long = "navigate", value_name = "PATH")]
    navigate: Vec<String>,

    /// Toggle the theme before the first navigation.
    #[arg(long)]
    toggle_theme: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("failed to initialise telemetry")?;

    let config = match ShellConfig::resolve(args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid shell configuration");
            return Err(e).context("failed to load shell configuration");
        }
    };

    let runtime = ShellRuntime::new(config).context("failed to wire shell")?;
    println!("{}", runtime.start().await);

    if args.toggle_theme {
        info!(change = ?runtime.dispatch(StateAction::ToggleTheme), "Theme toggled");
    }

    if args.navigate.is_empty() {
        info!("Shell is running. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c().await?;
    } else {
        for path in &args.navigate {
            let view = runtime.navigate(path).await;
            println!("{path} => {view}");
        }
    }

    runtime.shutdown();

    Ok(())
}
