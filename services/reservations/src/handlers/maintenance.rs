use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use slotbook_core::health::readiness;

use crate::domain::repository::MaintenanceRepository;
use crate::error::ReservationsServiceError;
use crate::state::AppState;
use crate::usecase::maintenance::InitializeUseCase;

// ── POST /initialize ─────────────────────────────────────────────────────────

pub async fn initialize(
    State(state): State<AppState>,
) -> Result<Json<Value>, ReservationsServiceError> {
    let usecase = InitializeUseCase {
        repo: state.maintenance_repo(),
        seed: state.seed_staff.clone(),
    };
    usecase.execute().await?;
    Ok(Json(json!({ "language": "rust" })))
}

// ── GET /readyz ──────────────────────────────────────────────────────────────

pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.maintenance_repo().ping().await)
}
