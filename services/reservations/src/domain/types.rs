use chrono::{DateTime, Utc};

use slotbook_domain::id::UserId;
use slotbook_domain::reservation::Reservation;
use slotbook_domain::schedule::Schedule;
use slotbook_domain::user::User;

/// Who is looking at a read model. Anonymous viewers see what non-staff
/// users see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewer {
    pub staff: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self { staff: false }
    }

    pub fn staff() -> Self {
        Self { staff: true }
    }
}

impl From<Option<&User>> for Viewer {
    fn from(user: Option<&User>) -> Self {
        Self {
            staff: user.is_some_and(|u| u.staff),
        }
    }
}

/// A schedule with its derived reserved count, as read from one snapshot.
#[derive(Debug, Clone)]
pub struct ScheduleSummary {
    pub schedule: Schedule,
    pub reserved: u32,
}

impl ScheduleSummary {
    pub fn is_full(&self) -> bool {
        self.reserved >= self.schedule.capacity
    }
}

/// A reservation joined with its holder, as stored.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub reservation: Reservation,
    pub user: User,
}

/// A schedule and its full roster, read from one snapshot.
#[derive(Debug, Clone)]
pub struct ScheduleDetail {
    pub schedule: Schedule,
    pub roster: Vec<RosterEntry>,
}

/// User as shown to a particular viewer. `email` is `None` when redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub id: UserId,
    pub email: Option<String>,
    pub nickname: String,
    pub staff: bool,
    pub created_at: DateTime<Utc>,
}

impl UserView {
    /// Staff viewers see email addresses; everyone else gets them redacted.
    pub fn project(user: &User, viewer: Viewer) -> Self {
        Self {
            id: user.id,
            email: viewer.staff.then(|| user.email.clone()),
            nickname: user.nickname.clone(),
            staff: user.staff,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReservationView {
    pub reservation: Reservation,
    pub user: UserView,
}

/// Query-side projection of a schedule with its roster.
#[derive(Debug, Clone)]
pub struct ScheduleView {
    pub schedule: Schedule,
    pub reserved: u32,
    pub reservations: Vec<ReservationView>,
}

impl ScheduleView {
    pub fn project(detail: ScheduleDetail, viewer: Viewer) -> Self {
        let reservations: Vec<ReservationView> = detail
            .roster
            .into_iter()
            .map(|entry| ReservationView {
                user: UserView::project(&entry.user, viewer),
                reservation: entry.reservation,
            })
            .collect();
        Self {
            schedule: detail.schedule,
            reserved: u32::try_from(reservations.len()).unwrap_or(u32::MAX),
            reservations,
        }
    }
}

/// Staff account (re)created by `POST /initialize`.
#[derive(Debug, Clone)]
pub struct SeedStaff {
    pub email: String,
    pub nickname: String,
}
