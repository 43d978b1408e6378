#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line interface for flu risk scores.
//!
//! Every command scores the same CSV observation file the server reads.
//! `--date` pins the reference date and `--seed` makes the forecast jitter
//! reproducible.

mod output;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use flu_risk_observation_models::Province;
use flu_risk_scoring::{NoJitter, ScoringEngine};
use flu_risk_scoring_models::Scope;
use flu_risk_server::{ServerConfig, engine_from_config, run_server};
use flu_risk_server_models::{ApiCityRisk, ApiProvinceRisk, ApiRiskSnapshot};

#[derive(Parser)]
#[command(name = "flu_risk_cli", about = "Flu risk scoring tool")]
struct Cli {
    /// CSV observation file (overrides `FLU_RISK_DATA`)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// TOML scoring configuration (overrides `FLU_RISK_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Reference date as `YYYY-MM-DD` (defaults to today)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,
    /// Seed for the forecast jitter (overrides `FLU_RISK_SEED`)
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print national, provincial, and city risk with forecasts as JSON
    Snapshot,
    /// Print a city's current risk and forecast as JSON
    Risk {
        /// City name (case-insensitive)
        location: String,
    },
    /// Print a province's risk as JSON
    Province {
        /// Two-letter province or territory code (e.g., "ON")
        code: String,
    },
    /// Print a city's forecast as a table
    Forecast {
        /// City name (case-insensitive)
        city: String,
        /// Number of days, including today (defaults to the configured horizon)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Print the intermediate metrics behind a city's risk as JSON
    Metrics {
        /// City name (case-insensitive)
        city: String,
    },
    /// List known cities
    Locations,
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind_addr: Option<String>,
        /// Port to listen on (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env();
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    if let Some(path) = cli.config {
        config.config_path = Some(path);
    }
    if cli.seed.is_some() {
        config.jitter_seed = cli.seed;
    }

    let engine = engine_from_config(&config)?;
    let now = cli.date.unwrap_or_else(|| Local::now().date_naive());
    log::debug!("Scoring as of {now}");

    match cli.command {
        Commands::Snapshot => {
            let snapshot = engine.full_snapshot(now, &mut engine.new_jitter())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&ApiRiskSnapshot::from(&snapshot))?
            );
        }
        Commands::Risk { location } => {
            let days = engine.config().horizon_days.max(1);
            let series = engine.cached_forecast(&location, now, days)?;
            let current = series
                .first()
                .ok_or_else(|| format!("Empty forecast for {location}"))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&ApiCityRisk::new(current, &series))?
            );
        }
        Commands::Province { code } => {
            let province = Province::from_code(&code)?;
            let estimate =
                engine.current_risk(Scope::Province, province.as_ref(), now, &mut NoJitter)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&ApiProvinceRisk::new(province, &estimate))?
            );
        }
        Commands::Forecast { city, days } => {
            let days = days.unwrap_or(engine.config().horizon_days);
            let series = engine.forecast(&city, now, days, &mut engine.new_jitter())?;
            print!("{}", output::forecast_table(&series));
        }
        Commands::Metrics { city } => {
            let metrics = engine.metrics(&city, now)?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Commands::Locations => {
            print!("{}", output::location_list(&engine.locations()?));
        }
        Commands::Serve { bind_addr, port } => {
            if let Some(bind_addr) = bind_addr {
                config.bind_addr = bind_addr;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(engine, &config, cli.date)?;
        }
    }

    Ok(())
}

fn serve(
    engine: ScoringEngine,
    config: &ServerConfig,
    fixed_date: Option<NaiveDate>,
) -> std::io::Result<()> {
    actix_web::rt::System::new().block_on(run_server(engine, config, fixed_date))
}
