//! Process-local store for development and tests.
//!
//! Tables live behind one `RwLock`. Admission serializes per schedule with a
//! `tokio::sync::Mutex` taken as an owned guard, so the guard can live inside
//! the transaction across await points. Inserts are buffered in the
//! transaction and applied under the table write lock at commit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use slotbook_domain::id::{ScheduleId, UserId};
use slotbook_domain::reservation::Reservation;
use slotbook_domain::schedule::Schedule;
use slotbook_domain::user::User;

use crate::domain::repository::{
    AdmissionTransaction, CapacityStore, MaintenanceRepository, ScheduleQuery, ScheduleRepository,
    UserRepository,
};
use crate::domain::types::{RosterEntry, ScheduleDetail, ScheduleSummary};
use crate::error::ReservationsServiceError;

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    schedules: HashMap<ScheduleId, Schedule>,
    /// Commit order.
    reservations: Vec<Reservation>,
}

impl Tables {
    fn holders(&self, schedule_id: ScheduleId) -> impl Iterator<Item = UserId> + '_ {
        self.reservations
            .iter()
            .filter(move |r| r.schedule_id == schedule_id)
            .map(|r| r.user_id)
    }
}

struct Inner {
    tables: RwLock<Tables>,
    schedule_locks: Mutex<HashMap<ScheduleId, Arc<Mutex<()>>>>,
    lock_timeout: Option<Duration>,
}

impl Inner {
    async fn lock_handle(&self, id: ScheduleId) -> Arc<Mutex<()>> {
        self.schedule_locks
            .lock()
            .await
            .entry(id)
            .or_default()
            .clone()
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// `lock_timeout` bounds the wait for a schedule lock; `None` waits forever.
    pub fn new(lock_timeout: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(Tables::default()),
                schedule_locks: Mutex::new(HashMap::new()),
                lock_timeout,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(None)
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ReservationsServiceError> {
        Ok(self.inner.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, ReservationsServiceError> {
        let tables = self.inner.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), ReservationsServiceError> {
        let mut tables = self.inner.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(ReservationsServiceError::UserAlreadyExists);
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }
}

// ── Schedules ────────────────────────────────────────────────────────────────

impl ScheduleRepository for MemoryStore {
    async fn create(&self, schedule: &Schedule) -> Result<(), ReservationsServiceError> {
        self.inner
            .tables
            .write()
            .await
            .schedules
            .insert(schedule.id, schedule.clone());
        Ok(())
    }
}

impl ScheduleQuery for MemoryStore {
    async fn list_summaries(&self) -> Result<Vec<ScheduleSummary>, ReservationsServiceError> {
        let tables = self.inner.tables.read().await;
        let mut counts: HashMap<ScheduleId, u32> = HashMap::new();
        for r in &tables.reservations {
            *counts.entry(r.schedule_id).or_default() += 1;
        }
        let mut summaries: Vec<ScheduleSummary> = tables
            .schedules
            .values()
            .map(|s| ScheduleSummary {
                reserved: counts.get(&s.id).copied().unwrap_or(0),
                schedule: s.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| b.schedule.id.0.cmp(&a.schedule.id.0));
        Ok(summaries)
    }

    async fn find_detail(
        &self,
        id: ScheduleId,
    ) -> Result<Option<ScheduleDetail>, ReservationsServiceError> {
        let tables = self.inner.tables.read().await;
        let Some(schedule) = tables.schedules.get(&id).cloned() else {
            return Ok(None);
        };
        let roster = tables
            .reservations
            .iter()
            .filter(|r| r.schedule_id == id)
            .filter_map(|r| {
                tables.users.get(&r.user_id).map(|user| RosterEntry {
                    reservation: r.clone(),
                    user: user.clone(),
                })
            })
            .collect();
        Ok(Some(ScheduleDetail { schedule, roster }))
    }
}

// ── Admission ────────────────────────────────────────────────────────────────

pub struct MemoryAdmissionTx {
    inner: Arc<Inner>,
    held: HashMap<ScheduleId, OwnedMutexGuard<()>>,
    pending: Vec<Reservation>,
}

impl CapacityStore for MemoryStore {
    type Tx = MemoryAdmissionTx;

    async fn begin_admission(&self) -> Result<MemoryAdmissionTx, ReservationsServiceError> {
        Ok(MemoryAdmissionTx {
            inner: Arc::clone(&self.inner),
            held: HashMap::new(),
            pending: Vec::new(),
        })
    }
}

impl AdmissionTransaction for MemoryAdmissionTx {
    async fn lock_schedule(
        &mut self,
        id: ScheduleId,
    ) -> Result<Option<Schedule>, ReservationsServiceError> {
        if !self.held.contains_key(&id) {
            // Unknown ids never get a lock entry.
            if !self.inner.tables.read().await.schedules.contains_key(&id) {
                return Ok(None);
            }
            let lock = self.inner.lock_handle(id).await;
            let guard = match self.inner.lock_timeout {
                Some(limit) => tokio::time::timeout(limit, lock.lock_owned())
                    .await
                    .map_err(|_| {
                        ReservationsServiceError::TransientStorage(anyhow!(
                            "timed out after {limit:?} waiting for lock on schedule {id}"
                        ))
                    })?,
                None => lock.lock_owned().await,
            };
            self.held.insert(id, guard);
        }
        Ok(self.inner.tables.read().await.schedules.get(&id).cloned())
    }

    async fn list_reserved_user_ids(
        &mut self,
        id: ScheduleId,
    ) -> Result<Vec<UserId>, ReservationsServiceError> {
        let tables = self.inner.tables.read().await;
        let pending = self
            .pending
            .iter()
            .filter(|r| r.schedule_id == id)
            .map(|r| r.user_id);
        Ok(tables.holders(id).chain(pending).collect())
    }

    async fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), ReservationsServiceError> {
        if !self.held.contains_key(&reservation.schedule_id) {
            return Err(anyhow!(
                "insert into schedule {} without holding its lock",
                reservation.schedule_id
            )
            .into());
        }
        self.pending.push(reservation.clone());
        Ok(())
    }

    async fn commit(self) -> Result<(), ReservationsServiceError> {
        let MemoryAdmissionTx {
            inner,
            held,
            pending,
        } = self;
        let mut tables = inner.tables.write().await;
        for r in &pending {
            if !tables.schedules.contains_key(&r.schedule_id) {
                return Err(ReservationsServiceError::ScheduleNotFound);
            }
            if tables.holders(r.schedule_id).any(|u| u == r.user_id) {
                return Err(ReservationsServiceError::DuplicateReservation);
            }
        }
        tables.reservations.extend(pending);
        drop(tables);
        drop(held);
        Ok(())
    }

    async fn abort(self) -> Result<(), ReservationsServiceError> {
        Ok(())
    }
}

// ── Maintenance ──────────────────────────────────────────────────────────────

impl MaintenanceRepository for MemoryStore {
    async fn reset(&self, seed: &User) -> Result<(), ReservationsServiceError> {
        let mut tables = self.inner.tables.write().await;
        *tables = Tables::default();
        tables.users.insert(seed.id, seed.clone());
        drop(tables);
        self.inner.schedule_locks.lock().await.clear();
        Ok(())
    }

    async fn ping(&self) -> Result<(), ReservationsServiceError> {
        Ok(())
    }
}
