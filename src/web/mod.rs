use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

use crate::{
    error::Error,
    grant::{parse_area, GrantBreakdown, GrantRequest},
    model::{CropType, ProgramType, WateringMethod},
    plan::{FarmPlan, FarmProfile, Quote},
    rates::RateCard,
};

struct AppState {
    rate_card: RateCard,
}

pub struct WebServerConfig {
    pub rate_card: RateCard,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        rate_card,
        host,
        port,
    } = config;

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    let addr = listener.local_addr()?;
    log::info!("grant calculator API live at http://{addr} (Ctrl+C to stop)");

    axum::serve(listener, router(rate_card))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn router(rate_card: RateCard) -> Router {
    let state = Arc::new(AppState { rate_card });
    Router::new()
        .route("/health", get(health))
        .route("/api/rates", get(rates))
        .route("/api/rate", get(rate))
        .route("/api/grant", post(grant))
        .route("/api/quote", post(quote))
        .route("/api/compare", post(compare))
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    log::info!("shutting down grant calculator API");
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::warn!("rejected request: {}", self.message);
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn rates(State(state): State<Arc<AppState>>) -> Json<RateCard> {
    Json(state.rate_card.clone())
}

#[derive(Debug, Deserialize)]
struct RateQuery {
    crop: String,
    #[serde(default)]
    area: Option<String>,
    program: String,
    #[serde(default)]
    watering: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RateResponse {
    crop: CropType,
    area: f64,
    program: ProgramType,
    watering_method: WateringMethod,
    rate_per_ha: f64,
    base_amount: f64,
}

async fn rate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RateQuery>,
) -> Result<Json<RateResponse>, ApiError> {
    let crop: CropType = query.crop.parse()?;
    let program: ProgramType = query.program.parse()?;
    let watering_method = match query.watering.as_deref() {
        Some(text) => text.parse()?,
        None => WateringMethod::default(),
    };
    let area = query.area.as_deref().map(parse_area).unwrap_or(0.0);
    let rate_per_ha = state.rate_card.rate(crop, area, program, watering_method);
    Ok(Json(RateResponse {
        crop,
        area,
        program,
        watering_method,
        rate_per_ha,
        base_amount: rate_per_ha * area,
    }))
}

async fn grant(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GrantRequest>, JsonRejection>,
) -> Result<Json<GrantBreakdown>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.rate_card.grant(&request)))
}

#[derive(Debug, Serialize, Deserialize)]
struct QuoteResponse {
    quote: Quote,
    profile: FarmProfile,
}

async fn quote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FarmPlan>, JsonRejection>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let Json(plan) = payload?;
    Ok(Json(QuoteResponse {
        quote: plan.quote(&state.rate_card),
        profile: plan.profile(),
    }))
}

async fn compare(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FarmPlan>, JsonRejection>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let Json(plan) = payload?;
    Ok(Json(plan.compare(&state.rate_card)))
}
