use chrono::Utc;

use slotbook_domain::id::ScheduleId;
use slotbook_domain::schedule::Schedule;

use crate::domain::repository::{ScheduleQuery, ScheduleRepository};
use crate::domain::types::{ScheduleSummary, ScheduleView, Viewer};
use crate::error::ReservationsServiceError;

// ── CreateSchedule ───────────────────────────────────────────────────────────

pub struct CreateScheduleInput {
    pub title: String,
    pub capacity: u32,
}

pub struct CreateScheduleUseCase<R: ScheduleRepository> {
    pub repo: R,
}

impl<R: ScheduleRepository> CreateScheduleUseCase<R> {
    pub async fn execute(
        &self,
        input: CreateScheduleInput,
    ) -> Result<Schedule, ReservationsServiceError> {
        if input.title.trim().is_empty() {
            return Err(ReservationsServiceError::MissingData);
        }
        let schedule = Schedule {
            id: ScheduleId::new(),
            title: input.title,
            capacity: input.capacity,
            created_at: Utc::now(),
        };
        self.repo.create(&schedule).await?;
        tracing::info!(schedule_id = %schedule.id, capacity = schedule.capacity, "schedule created");
        Ok(schedule)
    }
}

// ── ListSchedules ────────────────────────────────────────────────────────────

pub struct ListSchedulesUseCase<Q: ScheduleQuery> {
    pub query: Q,
}

impl<Q: ScheduleQuery> ListSchedulesUseCase<Q> {
    /// Newest first. Non-staff viewers only see schedules with a free seat.
    pub async fn execute(
        &self,
        viewer: Viewer,
    ) -> Result<Vec<ScheduleSummary>, ReservationsServiceError> {
        let summaries = self.query.list_summaries().await?;
        if viewer.staff {
            return Ok(summaries);
        }
        Ok(summaries.into_iter().filter(|s| !s.is_full()).collect())
    }
}

// ── GetSchedule ──────────────────────────────────────────────────────────────

pub struct GetScheduleUseCase<Q: ScheduleQuery> {
    pub query: Q,
}

impl<Q: ScheduleQuery> GetScheduleUseCase<Q> {
    pub async fn execute(
        &self,
        id: ScheduleId,
        viewer: Viewer,
    ) -> Result<ScheduleView, ReservationsServiceError> {
        let detail = self
            .query
            .find_detail(id)
            .await?
            .ok_or(ReservationsServiceError::ScheduleNotFound)?;
        Ok(ScheduleView::project(detail, viewer))
    }
}
