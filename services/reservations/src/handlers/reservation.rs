use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use slotbook_domain::reservation::Reservation;

use crate::domain::types::ReservationView;
use crate::error::ReservationsServiceError;
use crate::handlers::form::FormBody;
use crate::handlers::schedule::parse_schedule_id;
use crate::handlers::session::CurrentUser;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::admission::{ReserveInput, ReserveUseCase};

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: String,
    pub schedule_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    #[serde(serialize_with = "slotbook_core::serde::to_rfc3339_micros")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id.to_string(),
            schedule_id: r.schedule_id.to_string(),
            user_id: r.user_id.to_string(),
            user: None,
            created_at: r.created_at,
        }
    }
}

impl From<ReservationView> for ReservationResponse {
    fn from(view: ReservationView) -> Self {
        Self {
            user: Some(view.user.into()),
            ..Self::from(view.reservation)
        }
    }
}

// ── POST /api/reservations ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateReservationRequest {
    pub schedule_id: Option<String>,
}

pub async fn create_reservation(
    current: CurrentUser,
    State(state): State<AppState>,
    FormBody(body): FormBody<CreateReservationRequest>,
) -> Result<Json<ReservationResponse>, ReservationsServiceError> {
    let user = current.require()?;
    let raw_id = body
        .schedule_id
        .ok_or(ReservationsServiceError::MissingData)?;
    let schedule_id = parse_schedule_id(&raw_id)?;

    let usecase = ReserveUseCase {
        store: state.capacity_store(),
    };
    let reservation = usecase
        .execute(ReserveInput {
            schedule_id,
            user_id: user.id,
        })
        .await?;
    Ok(Json(reservation.into()))
}
