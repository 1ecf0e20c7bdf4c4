use anyhow::{Context, Result};
use aquaforge_core::calibration::{load_calibration, CalibratedServices};
use aquaforge_schemas::calibration::FarmCalibration;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::fs::File;
use tracing_subscriber::EnvFilter;

mod config;
mod workflow;

#[derive(Parser, Debug)]
#[command(name = "aquaforge", version, about = "Production metrics for aquaculture farms")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend a bioremediation dose for a rectangular pond.
    Dose {
        #[arg(long)]
        length: f64,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        depth: f64,
        /// Calibration YAML overriding the standard dose table and pricing.
        #[arg(long)]
        calibration: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Confirm a CSV sheet of field observations against a farm directory.
    Replay {
        #[arg(long)]
        farm: String,
        #[arg(long)]
        observations: String,
        /// Write every confirmed observation to this CSV file.
        #[arg(long)]
        log: Option<String>,
        /// Timestamp for raised alerts (RFC 3339). Defaults to now.
        #[arg(long)]
        recorded_at: Option<String>,
    },
    /// Summarize treatment revenue and effectiveness for a farm directory.
    Costs {
        #[arg(long)]
        farm: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Dose {
            length,
            width,
            depth,
            calibration,
            json,
        } => {
            let calibration = match calibration {
                Some(path) => load_calibration(&path)
                    .with_context(|| format!("Failed to load calibration {}", path))?,
                None => FarmCalibration::default(),
            };
            let services = CalibratedServices::from_calibration(&calibration)?;
            workflow::run_dose(&services, length, width, depth, json)?;
        }
        Command::Replay {
            farm,
            observations,
            log,
            recorded_at,
        } => {
            let recorded_at = match recorded_at {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)
                    .with_context(|| format!("Invalid --recorded-at timestamp: {}", raw))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let kb = config::FarmKnowledgeBase::load(&farm)?;
            let services = CalibratedServices::from_calibration(&kb.calibration)?;
            let sheet = File::open(&observations)
                .with_context(|| format!("Failed to open {}", observations))?;
            workflow::run_replay(&kb, &services, sheet, log.as_deref(), recorded_at)?;
        }
        Command::Costs { farm } => {
            let kb = config::FarmKnowledgeBase::load(&farm)?;
            let services = CalibratedServices::from_calibration(&kb.calibration)?;
            workflow::run_costs(&kb, &services)?;
        }
    }

    Ok(())
}
