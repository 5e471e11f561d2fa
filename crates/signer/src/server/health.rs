use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::response::ApiResponse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub uptime: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

pub async fn health(State(state): State<AppState>) -> ApiResponse {
    let report = HealthReport {
        status: "UP".to_string(),
        uptime: format!("{}s", state.started_at.elapsed().as_secs()),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    ApiResponse::success(serde_json::json!(report))
}
