use chrono::Utc;
use tracing::Instrument as _;

use slotbook_domain::id::{ReservationId, ScheduleId, UserId};
use slotbook_domain::reservation::Reservation;
use slotbook_domain::schedule::Schedule;

use crate::domain::repository::{AdmissionTransaction, CapacityStore};
use crate::error::ReservationsServiceError;

/// Decide whether `user_id` may take a seat given the current holders.
/// A repeat request is reported as a duplicate even when the schedule is
/// also full.
pub fn admit(
    schedule: &Schedule,
    holders: &[UserId],
    user_id: UserId,
) -> Result<(), ReservationsServiceError> {
    if holders.contains(&user_id) {
        return Err(ReservationsServiceError::DuplicateReservation);
    }
    if holders.len() as u64 >= u64::from(schedule.capacity) {
        return Err(ReservationsServiceError::CapacityExceeded);
    }
    Ok(())
}

// ── Reserve ──────────────────────────────────────────────────────────────────

pub struct ReserveInput {
    pub schedule_id: ScheduleId,
    pub user_id: UserId,
}

pub struct ReserveUseCase<S: CapacityStore> {
    pub store: S,
}

impl<S: CapacityStore> ReserveUseCase<S> {
    /// Lock the schedule, check holders and capacity, insert, commit. Every
    /// failure aborts the transaction.
    pub async fn execute(&self, input: ReserveInput) -> Result<Reservation, ReservationsServiceError> {
        let span = tracing::info_span!(
            "reserve",
            schedule_id = %input.schedule_id,
            user_id = %input.user_id
        );
        self.run(input).instrument(span).await
    }

    async fn run(&self, input: ReserveInput) -> Result<Reservation, ReservationsServiceError> {
        let mut tx = self.store.begin_admission().await?;
        tracing::debug!("admission started");

        match decide(&mut tx, &input).await {
            Ok(reservation) => {
                tx.commit().await.map_err(commit_failure)?;
                tracing::debug!(reservation_id = %reservation.id, "admission committed");
                Ok(reservation)
            }
            Err(e) => {
                if let Err(abort_err) = tx.abort().await {
                    tracing::warn!(error = %abort_err, "abort failed");
                }
                tracing::debug!(reason = e.kind(), "admission aborted");
                Err(e)
            }
        }
    }
}

async fn decide<T: AdmissionTransaction>(
    tx: &mut T,
    input: &ReserveInput,
) -> Result<Reservation, ReservationsServiceError> {
    let schedule = tx
        .lock_schedule(input.schedule_id)
        .await?
        .ok_or(ReservationsServiceError::ScheduleNotFound)?;
    tracing::debug!(capacity = schedule.capacity, "schedule locked");

    let holders = tx.list_reserved_user_ids(schedule.id).await?;
    tracing::debug!(reserved = holders.len(), "holders read");
    admit(&schedule, &holders, input.user_id)?;

    let reservation = Reservation {
        id: ReservationId::new(),
        schedule_id: schedule.id,
        user_id: input.user_id,
        created_at: Utc::now(),
    };
    tx.insert_reservation(&reservation).await?;
    Ok(reservation)
}

/// Outcome of a failed commit is unknown to the caller; report it as
/// retryable unless the store named a business reason.
fn commit_failure(err: ReservationsServiceError) -> ReservationsServiceError {
    match err {
        ReservationsServiceError::Internal(e) => ReservationsServiceError::TransientStorage(e),
        other => other,
    }
}
