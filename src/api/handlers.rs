use anyhow::{anyhow, Context};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use std::time::Instant;

use super::raised::StatusSignal;
use super::users::UserStore;
use crate::errors::{Failure, GenericFailure};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: UserStore,
    pub instance_id: String,
    pub development_mode: bool,
}

impl AppStateInner {
    pub fn new(instance_id: impl Into<String>, development_mode: bool) -> Self {
        Self {
            users: UserStore::new(),
            instance_id: instance_id.into(),
            development_mode,
        }
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "api-error-contract",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "development_mode": state.development_mode,
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Raise a generic failure with the requested status
pub async fn demo_generic(
    status: Result<Path<u16>, PathRejection>,
) -> Result<StatusCode, GenericFailure> {
    let Path(status) = status?;
    Err(GenericFailure::new(status, "Requested failure")
        .with_code("DEMO_FAILURE")
        .with_detail(format!("The caller asked for status {}", status)))
}

/// Raise an unexpected failure whose message must stay private outside
/// development mode
pub async fn demo_unstructured() -> Result<StatusCode, Failure> {
    let storage: anyhow::Result<()> = Err(anyhow!("connection refused by 10.0.0.7:5432"));
    storage.context("loading demo data")?;
    Ok(StatusCode::OK)
}

/// Crash mid-request
pub async fn demo_panic() -> StatusCode {
    panic!("no replica available for demo data");
}

/// Answer with a bare status and no body
pub async fn demo_status(
    status: Result<Path<u16>, PathRejection>,
) -> Result<StatusSignal, GenericFailure> {
    let Path(status) = status?;
    Ok(StatusSignal(
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    ))
}

pub async fn not_found() -> impl IntoResponse {
    StatusSignal(StatusCode::NOT_FOUND)
}
