//! Liveness endpoint.
//!
//! Answers as long as the process can serve HTTP. The database is not
//! consulted, so an unreachable database does not fail the probe.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
