//! Health endpoint.

use actix_web::{get, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ApiResult;

use super::state::HttpState;

/// Health report payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` when the process answers.
    pub status: &'static str,
    /// Human-readable liveness message.
    pub message: &'static str,
    /// Report timestamp.
    pub timestamp: chrono::DateTime<Utc>,
    /// `connected` or the storage error message.
    pub database_status: String,
}

/// Liveness and storage connectivity report.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Health report", body = HealthResponse)),
    tags = ["health"]
)]
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> ApiResult<web::Json<HealthResponse>> {
    let database_status = match state.health.ping().await {
        Ok(()) => "connected".to_owned(),
        Err(err) => format!("error: {err}"),
    };
    Ok(web::Json(HealthResponse {
        status: "ok",
        message: "Server is running",
        timestamp: Utc::now(),
        database_status,
    }))
}
