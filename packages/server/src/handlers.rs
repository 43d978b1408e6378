//! HTTP handler functions for the flu risk API.
//!
//! Scoring reads the observation file, so every computation runs on the
//! blocking thread pool via [`web::block`].

use actix_web::{HttpResponse, web};
use flu_risk_observation_models::Province;
use flu_risk_scoring::{NoJitter, ScoringError};
use flu_risk_scoring_models::Scope;
use flu_risk_server_models::{
    ApiCityRisk, ApiError, ApiHealth, ApiProvinceRisk, ApiRiskSnapshot, ForecastQueryParams,
};

use crate::AppState;

/// Longest forecast a client may request.
const MAX_FORECAST_DAYS: u32 = 90;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/flu-risk`
///
/// Returns national, provincial, and city risk plus every city's forecast,
/// all computed from the same window.
pub async fn snapshot(state: web::Data<AppState>) -> HttpResponse {
    let now = state.today();
    let engine = state.engine.clone();
    match web::block(move || engine.cached_snapshot(now)).await {
        Ok(Ok(snapshot)) => HttpResponse::Ok().json(ApiRiskSnapshot::from(snapshot.as_ref())),
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_failed(&e),
    }
}

/// `GET /api/flu-risk/{location}`
///
/// Returns a city's current risk and its forecast. The current risk is the
/// forecast's first day, so the two always agree. At the configured
/// horizon the forecast comes from the same memoized snapshot as
/// `GET /api/flu-risk`.
pub async fn city_risk(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<ForecastQueryParams>,
) -> HttpResponse {
    let location = path.into_inner();
    let now = state.today();
    let engine = state.engine.clone();
    let days = params
        .days
        .unwrap_or(engine.config().horizon_days)
        .clamp(1, MAX_FORECAST_DAYS);

    let result = web::block(move || engine.cached_forecast(&location, now, days)).await;

    match result {
        Ok(Ok(series)) => match series.first() {
            Some(current) => HttpResponse::Ok().json(ApiCityRisk::new(current, &series)),
            None => HttpResponse::InternalServerError().json(ApiError::new("Empty forecast")),
        },
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_failed(&e),
    }
}

/// `GET /api/flu-risk/province/{code}`
pub async fn province_risk(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Ok(province) = Province::from_code(&path) else {
        return HttpResponse::NotFound().json(ApiError::new("Location not found"));
    };
    let now = state.today();
    let engine = state.engine.clone();

    let result = web::block(move || {
        engine.current_risk(Scope::Province, province.as_ref(), now, &mut NoJitter)
    })
    .await;

    match result {
        Ok(Ok(estimate)) => HttpResponse::Ok().json(ApiProvinceRisk::new(province, &estimate)),
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_failed(&e),
    }
}

/// `GET /api/locations`
///
/// Lists the known city identifiers, lower-cased and sorted.
pub async fn locations(state: web::Data<AppState>) -> HttpResponse {
    let engine = state.engine.clone();
    match web::block(move || engine.locations()).await {
        Ok(Ok(cities)) => HttpResponse::Ok().json(cities),
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_failed(&e),
    }
}

fn error_response(e: &ScoringError) -> HttpResponse {
    match e {
        ScoringError::EmptyDataset => {
            HttpResponse::ServiceUnavailable().json(ApiError::new("no data available"))
        }
        ScoringError::UnknownLocation { .. } => {
            HttpResponse::NotFound().json(ApiError::new("Location not found"))
        }
        ScoringError::Store(_) | ScoringError::Config { .. } => {
            log::error!("Failed to compute flu risk: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to compute flu risk"))
        }
    }
}

fn blocking_failed(e: &actix_web::error::BlockingError) -> HttpResponse {
    log::error!("Scoring task failed: {e}");
    HttpResponse::InternalServerError().json(ApiError::new("Failed to compute flu risk"))
}
