//! Capacity-limited schedules.

use chrono::{DateTime, Utc};

use crate::id::ScheduleId;

/// A bookable slot with a fixed number of seats.
///
/// The reserved count is never stored on the schedule; it is derived from the
/// reservations that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub id: ScheduleId,
    pub title: String,
    pub capacity: u32,
    pub created_at: DateTime<Utc>,
}
