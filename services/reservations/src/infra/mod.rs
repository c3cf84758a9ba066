//! Storage backends and the runtime switch between them.
//!
//! Handlers work against the concrete [`Store`] so their futures stay `Send`
//! for axum; the enum forwards every repository call to the chosen backend.

pub mod db;
pub mod memory;

use slotbook_domain::id::{ScheduleId, UserId};
use slotbook_domain::reservation::Reservation;
use slotbook_domain::schedule::Schedule;
use slotbook_domain::user::User;

use crate::domain::repository::{
    AdmissionTransaction, CapacityStore, MaintenanceRepository, ScheduleQuery, ScheduleRepository,
    UserRepository,
};
use crate::domain::types::{ScheduleDetail, ScheduleSummary};
use crate::error::ReservationsServiceError;

use self::db::{DbAdmissionTx, DbStore};
use self::memory::{MemoryAdmissionTx, MemoryStore};

#[derive(Clone)]
pub enum Store {
    Db(DbStore),
    Memory(MemoryStore),
}

pub enum StoreTx {
    Db(DbAdmissionTx),
    Memory(MemoryAdmissionTx),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $call:expr) => {
        match $self {
            Store::Db($inner) => $call,
            Store::Memory($inner) => $call,
        }
    };
}

macro_rules! dispatch_tx {
    ($self:expr, $inner:ident => $call:expr) => {
        match $self {
            StoreTx::Db($inner) => $call,
            StoreTx::Memory($inner) => $call,
        }
    };
}

impl UserRepository for Store {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ReservationsServiceError> {
        dispatch!(self, s => UserRepository::find_by_id(s, id).await)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, ReservationsServiceError> {
        dispatch!(self, s => s.find_by_email(email).await)
    }

    async fn create(&self, user: &User) -> Result<(), ReservationsServiceError> {
        dispatch!(self, s => UserRepository::create(s, user).await)
    }
}

impl ScheduleRepository for Store {
    async fn create(&self, schedule: &Schedule) -> Result<(), ReservationsServiceError> {
        dispatch!(self, s => ScheduleRepository::create(s, schedule).await)
    }
}

impl ScheduleQuery for Store {
    async fn list_summaries(&self) -> Result<Vec<ScheduleSummary>, ReservationsServiceError> {
        dispatch!(self, s => s.list_summaries().await)
    }

    async fn find_detail(
        &self,
        id: ScheduleId,
    ) -> Result<Option<ScheduleDetail>, ReservationsServiceError> {
        dispatch!(self, s => s.find_detail(id).await)
    }
}

impl CapacityStore for Store {
    type Tx = StoreTx;

    async fn begin_admission(&self) -> Result<StoreTx, ReservationsServiceError> {
        match self {
            Store::Db(s) => s.begin_admission().await.map(StoreTx::Db),
            Store::Memory(s) => s.begin_admission().await.map(StoreTx::Memory),
        }
    }
}

impl AdmissionTransaction for StoreTx {
    async fn lock_schedule(
        &mut self,
        id: ScheduleId,
    ) -> Result<Option<Schedule>, ReservationsServiceError> {
        dispatch_tx!(self, tx => tx.lock_schedule(id).await)
    }

    async fn list_reserved_user_ids(
        &mut self,
        id: ScheduleId,
    ) -> Result<Vec<UserId>, ReservationsServiceError> {
        dispatch_tx!(self, tx => tx.list_reserved_user_ids(id).await)
    }

    async fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), ReservationsServiceError> {
        dispatch_tx!(self, tx => tx.insert_reservation(reservation).await)
    }

    async fn commit(self) -> Result<(), ReservationsServiceError> {
        dispatch_tx!(self, tx => tx.commit().await)
    }

    async fn abort(self) -> Result<(), ReservationsServiceError> {
        dispatch_tx!(self, tx => tx.abort().await)
    }
}

impl MaintenanceRepository for Store {
    async fn reset(&self, seed: &User) -> Result<(), ReservationsServiceError> {
        dispatch!(self, s => s.reset(seed).await)
    }

    async fn ping(&self) -> Result<(), ReservationsServiceError> {
        dispatch!(self, s => s.ping().await)
    }
}
