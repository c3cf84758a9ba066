use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use slotbook_domain::id::ScheduleId;
use slotbook_domain::schedule::Schedule;

use crate::domain::types::{ScheduleSummary, ScheduleView};
use crate::error::ReservationsServiceError;
use crate::handlers::form::FormBody;
use crate::handlers::reservation::ReservationResponse;
use crate::handlers::session::CurrentUser;
use crate::state::AppState;
use crate::usecase::schedule::{
    CreateScheduleInput, CreateScheduleUseCase, GetScheduleUseCase, ListSchedulesUseCase,
};

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub id: String,
    pub title: String,
    pub capacity: u32,
    pub reserved: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservations: Option<Vec<ReservationResponse>>,
    #[serde(serialize_with = "slotbook_core::serde::to_rfc3339_micros")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ScheduleResponse {
    fn new(schedule: Schedule, reserved: u32) -> Self {
        Self {
            id: schedule.id.to_string(),
            title: schedule.title,
            capacity: schedule.capacity,
            reserved,
            reservations: None,
            created_at: schedule.created_at,
        }
    }
}

impl From<ScheduleSummary> for ScheduleResponse {
    fn from(summary: ScheduleSummary) -> Self {
        Self::new(summary.schedule, summary.reserved)
    }
}

impl From<ScheduleView> for ScheduleResponse {
    fn from(view: ScheduleView) -> Self {
        Self {
            reservations: Some(view.reservations.into_iter().map(Into::into).collect()),
            ..Self::new(view.schedule, view.reserved)
        }
    }
}

/// Surrounding whitespace is ignored. An id that does not parse cannot name
/// an existing schedule.
pub(crate) fn parse_schedule_id(raw: &str) -> Result<ScheduleId, ReservationsServiceError> {
    raw.trim()
        .parse()
        .map_err(|_| ReservationsServiceError::ScheduleNotFound)
}

// ── POST /api/schedules ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    pub title: Option<String>,
    pub capacity: Option<String>,
}

pub async fn create_schedule(
    current: CurrentUser,
    State(state): State<AppState>,
    FormBody(body): FormBody<CreateScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ReservationsServiceError> {
    let user = current.require()?;
    if !user.staff {
        return Err(ReservationsServiceError::Forbidden);
    }
    let (Some(title), Some(capacity)) = (body.title, body.capacity) else {
        return Err(ReservationsServiceError::MissingData);
    };
    let capacity: u32 = capacity
        .trim()
        .parse()
        .map_err(|_| ReservationsServiceError::InvalidCapacity)?;
    // Storage keeps capacity as a signed 32-bit column.
    if i32::try_from(capacity).is_err() {
        return Err(ReservationsServiceError::InvalidCapacity);
    }

    let usecase = CreateScheduleUseCase {
        repo: state.schedule_repo(),
    };
    let schedule = usecase
        .execute(CreateScheduleInput { title, capacity })
        .await?;
    Ok(Json(ScheduleResponse::new(schedule, 0)))
}

// ── GET /api/schedules ───────────────────────────────────────────────────────

pub async fn list_schedules(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleResponse>>, ReservationsServiceError> {
    let usecase = ListSchedulesUseCase {
        query: state.schedule_query(),
    };
    let summaries = usecase.execute(current.viewer()).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

// ── GET /api/schedules/{id} ──────────────────────────────────────────────────

pub async fn get_schedule(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleResponse>, ReservationsServiceError> {
    let id = parse_schedule_id(&id)?;
    let usecase = GetScheduleUseCase {
        query: state.schedule_query(),
    };
    let view = usecase.execute(id, current.viewer()).await?;
    Ok(Json(view.into()))
}
