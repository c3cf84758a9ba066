use std::time::Duration;

use anyhow::Context as _;
use sea_orm::{
    AccessMode, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, FromQueryResult, IsolationLevel,
    QueryFilter, QuerySelect, Statement, TransactionTrait,
};
use uuid::Uuid;

use slotbook_core::sea_ext::{is_transient, is_unique_violation, set_local_lock_timeout};
use slotbook_domain::id::{ReservationId, ScheduleId, UserId};
use slotbook_domain::reservation::Reservation;
use slotbook_domain::schedule::Schedule;
use slotbook_domain::user::User;
use slotbook_reservations_schema::{reservations, schedules, users};

use crate::domain::repository::{
    AdmissionTransaction, CapacityStore, MaintenanceRepository, ScheduleQuery, ScheduleRepository,
    UserRepository,
};
use crate::domain::types::{RosterEntry, ScheduleDetail, ScheduleSummary};
use crate::error::ReservationsServiceError;

/// Postgres-backed store. Admission serializes on the schedule row with
/// `SELECT ... FOR UPDATE`.
#[derive(Clone)]
pub struct DbStore {
    pub db: DatabaseConnection,
    /// Applied as `SET LOCAL lock_timeout` in every admission transaction.
    pub lock_timeout: Option<Duration>,
}

/// Classify a driver error: lock timeouts, serialization failures and lost
/// connections become `TransientStorage`, everything else `Internal`.
fn storage_error(err: DbErr, context: &'static str) -> ReservationsServiceError {
    let transient = is_transient(&err);
    let err = anyhow::Error::new(err).context(context);
    if transient {
        ReservationsServiceError::TransientStorage(err)
    } else {
        ReservationsServiceError::Internal(err)
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

impl UserRepository for DbStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ReservationsServiceError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find user by id"))?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, ReservationsServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| storage_error(e, "find user by email"))?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), ReservationsServiceError> {
        user_active_model(user)
            .insert(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ReservationsServiceError::UserAlreadyExists
                } else {
                    storage_error(e, "create user")
                }
            })?;
        Ok(())
    }
}

fn user_active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id.0),
        email: Set(user.email.clone()),
        nickname: Set(user.nickname.clone()),
        staff: Set(user.staff),
        created_at: Set(user.created_at),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: UserId(model.id),
        email: model.email,
        nickname: model.nickname,
        staff: model.staff,
        created_at: model.created_at,
    }
}

// ── Schedules ────────────────────────────────────────────────────────────────

impl ScheduleRepository for DbStore {
    async fn create(&self, schedule: &Schedule) -> Result<(), ReservationsServiceError> {
        let capacity = i32::try_from(schedule.capacity)
            .map_err(|_| ReservationsServiceError::InvalidCapacity)?;
        schedules::ActiveModel {
            id: Set(schedule.id.0),
            title: Set(schedule.title.clone()),
            capacity: Set(capacity),
            created_at: Set(schedule.created_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| storage_error(e, "create schedule"))?;
        Ok(())
    }
}

fn schedule_from_model(model: schedules::Model) -> Result<Schedule, ReservationsServiceError> {
    let capacity = u32::try_from(model.capacity)
        .with_context(|| format!("schedule {} has negative capacity", model.id))?;
    Ok(Schedule {
        id: ScheduleId(model.id),
        title: model.title,
        capacity,
        created_at: model.created_at,
    })
}

const LIST_SUMMARIES_SQL: &str = r#"
    SELECT s.id, s.title, s.capacity, s.created_at, COUNT(r.id) AS reserved
        FROM schedules s
        LEFT JOIN reservations r ON r.schedule_id = s.id
        GROUP BY s.id
        ORDER BY s.id DESC
"#;

const ROSTER_SQL: &str = r#"
    SELECT r.id, r.user_id, r.created_at,
           u.email, u.nickname, u.staff, u.created_at AS user_created_at
        FROM reservations r
        JOIN users u ON u.id = r.user_id
        WHERE r.schedule_id = $1
        ORDER BY r.created_at, r.id
"#;

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    id: Uuid,
    title: String,
    capacity: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    reserved: i64,
}

#[derive(Debug, FromQueryResult)]
struct RosterRow {
    id: Uuid,
    user_id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    email: String,
    nickname: String,
    staff: bool,
    user_created_at: chrono::DateTime<chrono::Utc>,
}

impl ScheduleQuery for DbStore {
    async fn list_summaries(&self) -> Result<Vec<ScheduleSummary>, ReservationsServiceError> {
        // A single statement sees a single snapshot.
        let rows = SummaryRow::find_by_statement(Statement::from_string(
            self.db.get_database_backend(),
            LIST_SUMMARIES_SQL,
        ))
        .all(&self.db)
        .await
        .map_err(|e| storage_error(e, "list schedule summaries"))?;

        rows.into_iter()
            .map(|row| {
                let schedule = schedule_from_model(schedules::Model {
                    id: row.id,
                    title: row.title,
                    capacity: row.capacity,
                    created_at: row.created_at,
                })?;
                Ok(ScheduleSummary {
                    schedule,
                    reserved: u32::try_from(row.reserved).unwrap_or(u32::MAX),
                })
            })
            .collect()
    }

    async fn find_detail(
        &self,
        id: ScheduleId,
    ) -> Result<Option<ScheduleDetail>, ReservationsServiceError> {
        // Schedule and roster come from one REPEATABLE READ snapshot; plain
        // reads take no row locks, so admissions are never blocked.
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
            .map_err(|e| storage_error(e, "begin schedule detail read"))?;

        let Some(model) = schedules::Entity::find_by_id(id.0)
            .one(&txn)
            .await
            .map_err(|e| storage_error(e, "find schedule"))?
        else {
            return Ok(None);
        };
        let schedule = schedule_from_model(model)?;

        let rows = RosterRow::find_by_statement(Statement::from_sql_and_values(
            txn.get_database_backend(),
            ROSTER_SQL,
            [id.0.into()],
        ))
        .all(&txn)
        .await
        .map_err(|e| storage_error(e, "list schedule roster"))?;

        txn.commit()
            .await
            .map_err(|e| storage_error(e, "end schedule detail read"))?;

        let roster = rows
            .into_iter()
            .map(|row| RosterEntry {
                reservation: Reservation {
                    id: ReservationId(row.id),
                    schedule_id: id,
                    user_id: UserId(row.user_id),
                    created_at: row.created_at,
                },
                user: User {
                    id: UserId(row.user_id),
                    email: row.email,
                    nickname: row.nickname,
                    staff: row.staff,
                    created_at: row.user_created_at,
                },
            })
            .collect();
        Ok(Some(ScheduleDetail { schedule, roster }))
    }
}

// ── Admission ────────────────────────────────────────────────────────────────

pub struct DbAdmissionTx {
    txn: DatabaseTransaction,
    locked: Vec<ScheduleId>,
}

impl CapacityStore for DbStore {
    type Tx = DbAdmissionTx;

    async fn begin_admission(&self) -> Result<DbAdmissionTx, ReservationsServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| storage_error(e, "begin admission"))?;
        if let Some(limit) = self.lock_timeout {
            set_local_lock_timeout(&txn, limit)
                .await
                .map_err(|e| storage_error(e, "set lock timeout"))?;
        }
        Ok(DbAdmissionTx {
            txn,
            locked: Vec::new(),
        })
    }
}

impl AdmissionTransaction for DbAdmissionTx {
    async fn lock_schedule(
        &mut self,
        id: ScheduleId,
    ) -> Result<Option<Schedule>, ReservationsServiceError> {
        let model = schedules::Entity::find_by_id(id.0)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(|e| storage_error(e, "lock schedule"))?;
        let Some(model) = model else {
            return Ok(None);
        };
        if !self.locked.contains(&id) {
            self.locked.push(id);
        }
        schedule_from_model(model).map(Some)
    }

    async fn list_reserved_user_ids(
        &mut self,
        id: ScheduleId,
    ) -> Result<Vec<UserId>, ReservationsServiceError> {
        let ids: Vec<Uuid> = reservations::Entity::find()
            .select_only()
            .column(reservations::Column::UserId)
            .filter(reservations::Column::ScheduleId.eq(id.0))
            .into_tuple()
            .all(&self.txn)
            .await
            .map_err(|e| storage_error(e, "list reserved user ids"))?;
        Ok(ids.into_iter().map(UserId).collect())
    }

    async fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), ReservationsServiceError> {
        if !self.locked.contains(&reservation.schedule_id) {
            return Err(anyhow::anyhow!(
                "insert into schedule {} without holding its lock",
                reservation.schedule_id
            )
            .into());
        }
        reservations::ActiveModel {
            id: Set(reservation.id.0),
            schedule_id: Set(reservation.schedule_id.0),
            user_id: Set(reservation.user_id.0),
            created_at: Set(reservation.created_at),
        }
        .insert(&self.txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ReservationsServiceError::DuplicateReservation
            } else {
                storage_error(e, "insert reservation")
            }
        })?;
        Ok(())
    }

    async fn commit(self) -> Result<(), ReservationsServiceError> {
        self.txn.commit().await.map_err(|e| {
            ReservationsServiceError::TransientStorage(
                anyhow::Error::new(e).context("commit admission"),
            )
        })
    }

    async fn abort(self) -> Result<(), ReservationsServiceError> {
        self.txn
            .rollback()
            .await
            .context("roll back admission")?;
        Ok(())
    }
}

// ── Maintenance ──────────────────────────────────────────────────────────────

impl MaintenanceRepository for DbStore {
    async fn reset(&self, seed: &User) -> Result<(), ReservationsServiceError> {
        let seed = seed.clone();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    txn.execute_unprepared("TRUNCATE reservations, schedules, users")
                        .await?;
                    user_active_model(&seed).insert(txn).await?;
                    Ok(())
                })
            })
            .await
            .context("reset tables")?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), ReservationsServiceError> {
        self.db
            .ping()
            .await
            .map_err(|e| storage_error(e, "ping database"))
    }
}
