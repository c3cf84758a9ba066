#![allow(async_fn_in_trait)]

use slotbook_domain::id::{ScheduleId, UserId};
use slotbook_domain::reservation::Reservation;
use slotbook_domain::schedule::Schedule;
use slotbook_domain::user::User;

use crate::domain::types::{ScheduleDetail, ScheduleSummary};
use crate::error::ReservationsServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ReservationsServiceError>;
    async fn find_by_email(&self, email: &str)
    -> Result<Option<User>, ReservationsServiceError>;
    /// Fails with `UserAlreadyExists` when the email is taken.
    async fn create(&self, user: &User) -> Result<(), ReservationsServiceError>;
}

/// Repository for schedule definitions.
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, schedule: &Schedule) -> Result<(), ReservationsServiceError>;
}

/// Read side: counts and rosters, each call answered from one consistent
/// snapshot. Never blocks admission transactions.
pub trait ScheduleQuery: Send + Sync {
    /// All schedules, newest first, with their reserved counts.
    async fn list_summaries(&self) -> Result<Vec<ScheduleSummary>, ReservationsServiceError>;
    async fn find_detail(
        &self,
        id: ScheduleId,
    ) -> Result<Option<ScheduleDetail>, ReservationsServiceError>;
}

/// Write side of reservations: hands out admission transactions.
pub trait CapacityStore: Send + Sync {
    type Tx: AdmissionTransaction;

    async fn begin_admission(&self) -> Result<Self::Tx, ReservationsServiceError>;
}

/// One reservation attempt.
///
/// `lock_schedule` takes an exclusive per-schedule lock held until `commit`
/// or `abort`; while it is held no other admission on the same schedule can
/// read its holders or insert. Inserting into a schedule whose lock is not
/// held is an error. Dropping the transaction without committing discards
/// every buffered insert and releases the lock.
pub trait AdmissionTransaction: Send {
    /// `Ok(None)` when the schedule does not exist. Waiting longer than the
    /// configured lock timeout fails with `TransientStorage`.
    async fn lock_schedule(
        &mut self,
        id: ScheduleId,
    ) -> Result<Option<Schedule>, ReservationsServiceError>;

    /// Users holding a reservation on the schedule, including inserts made
    /// earlier in this transaction.
    async fn list_reserved_user_ids(
        &mut self,
        id: ScheduleId,
    ) -> Result<Vec<UserId>, ReservationsServiceError>;

    async fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), ReservationsServiceError>;

    async fn commit(self) -> Result<(), ReservationsServiceError>;

    async fn abort(self) -> Result<(), ReservationsServiceError>;
}

/// Store-wide maintenance used by `/initialize` and readiness checks.
pub trait MaintenanceRepository: Send + Sync {
    /// Delete every reservation, schedule and user, then insert `seed`.
    async fn reset(&self, seed: &User) -> Result<(), ReservationsServiceError>;
    async fn ping(&self) -> Result<(), ReservationsServiceError>;
}
