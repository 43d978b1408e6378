#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for flu risk scores.

use flu_risk_server::{ServerConfig, engine_from_config, run_server};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();
    let engine = engine_from_config(&config)?;

    run_server(engine, &config, None).await?;

    Ok(())
}
