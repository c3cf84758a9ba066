//! Reservations: one user's claim on one seat of a schedule.

use chrono::{DateTime, Utc};

use crate::id::{ReservationId, ScheduleId, UserId};

/// A committed seat. Created once by an admission decision; never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub schedule_id: ScheduleId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
