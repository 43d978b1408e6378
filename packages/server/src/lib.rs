#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for flu risk scores.
//!
//! Serves the national, provincial, and city risk indices computed by
//! [`ScoringEngine`] over a CSV observation file. The file is re-read on
//! every request, so replacing it updates the scores without a restart;
//! the full snapshot is memoized per day and data fingerprint.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use chrono::{Local, NaiveDate};
use flu_risk_observation::CsvFileStore;
use flu_risk_scoring::config::load_scoring_config;
use flu_risk_scoring::{ScoringEngine, ScoringError};
use flu_risk_scoring_models::ScoringConfig;

/// Default CSV path when `FLU_RISK_DATA` is unset.
pub const DEFAULT_DATA_PATH: &str = "data/sales_data.csv";

/// Shared application state.
pub struct AppState {
    /// Engine over the observation store.
    pub engine: Arc<ScoringEngine>,
    /// Reference date used instead of today, if set.
    pub fixed_date: Option<NaiveDate>,
}

impl AppState {
    /// The reference date for scoring: `fixed_date` or today's local date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.fixed_date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Where the server listens and what it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// CSV observation file.
    pub data_path: PathBuf,
    /// Optional TOML scoring configuration.
    pub config_path: Option<PathBuf>,
    /// Overrides `jitter_seed` from the scoring configuration.
    pub jitter_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            config_path: None,
            jitter_seed: None,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `FLU_RISK_DATA`, `FLU_RISK_CONFIG`, and
    /// `FLU_RISK_SEED`, falling back to the defaults for anything unset or
    /// unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            data_path: std::env::var_os("FLU_RISK_DATA").map_or(defaults.data_path, PathBuf::from),
            config_path: std::env::var_os("FLU_RISK_CONFIG").map(PathBuf::from),
            jitter_seed: std::env::var("FLU_RISK_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}

/// Builds an engine over the configured CSV file and scoring configuration.
///
/// # Errors
///
/// Returns [`ScoringError::Config`] if the configuration file cannot be
/// read or is invalid.
pub fn engine_from_config(config: &ServerConfig) -> Result<ScoringEngine, ScoringError> {
    let mut scoring = match &config.config_path {
        Some(path) => load_scoring_config(path)?,
        None => ScoringConfig::default(),
    };
    if config.jitter_seed.is_some() {
        scoring.jitter_seed = config.jitter_seed;
    }
    log::info!("Reading observations from {}", config.data_path.display());
    ScoringEngine::new(Arc::new(CsvFileStore::new(&config.data_path)), scoring)
}

/// Registers the `/api` routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/locations", web::get().to(handlers::locations))
            .route("/flu-risk", web::get().to(handlers::snapshot))
            .route(
                "/flu-risk/province/{code}",
                web::get().to(handlers::province_risk),
            )
            .route("/flu-risk/{location}", web::get().to(handlers::city_risk)),
    );
}

/// Starts the flu risk API server.
///
/// This is a regular async function; the caller provides the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(
    engine: ScoringEngine,
    config: &ServerConfig,
    fixed_date: Option<NaiveDate>,
) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        engine: Arc::new(engine),
        fixed_date,
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
