//! Postgres-backed store checks. Ignored by default; run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored` against a scratch
//! database. Every test works on its own users and schedules so they can
//! share one database.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait as _;
use tokio::sync::OnceCell;

use slotbook_domain::id::{ScheduleId, UserId};
use slotbook_domain::schedule::Schedule;
use slotbook_domain::user::User;
use slotbook_reservations::domain::repository::{
    AdmissionTransaction as _, CapacityStore as _, ScheduleQuery as _, ScheduleRepository,
    UserRepository,
};
use slotbook_reservations::error::ReservationsServiceError;
use slotbook_reservations::infra::db::DbStore;
use slotbook_reservations::usecase::admission::{ReserveInput, ReserveUseCase};
use slotbook_reservations_migration::Migrator;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn db_store(lock_timeout: Duration) -> DbStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL is set");
    let db = Database::connect(&url).await.unwrap();
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None).await.unwrap();
        })
        .await;
    DbStore {
        db,
        lock_timeout: Some(lock_timeout),
    }
}

async fn seed_user(store: &DbStore, nickname: &str) -> User {
    let id = UserId::new();
    let user = User {
        id,
        email: format!("{nickname}-{id}@example.com"),
        nickname: nickname.to_owned(),
        staff: false,
        created_at: Utc::now(),
    };
    UserRepository::create(store, &user).await.unwrap();
    user
}

async fn seed_schedule(store: &DbStore, title: &str, capacity: u32) -> Schedule {
    let schedule = Schedule {
        id: ScheduleId::new(),
        title: title.to_owned(),
        capacity,
        created_at: Utc::now(),
    };
    ScheduleRepository::create(store, &schedule).await.unwrap();
    schedule
}

async fn reserve(
    store: &DbStore,
    schedule: &Schedule,
    user: &User,
) -> Result<(), ReservationsServiceError> {
    ReserveUseCase {
        store: store.clone(),
    }
    .execute(ReserveInput {
        schedule_id: schedule.id,
        user_id: user.id,
    })
    .await
    .map(|_| ())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn should_count_reservations_in_summaries_and_roster() {
    let store = db_store(Duration::from_secs(5)).await;
    let schedule = seed_schedule(&store, "rowing", 3).await;
    let first = seed_user(&store, "first").await;
    let second = seed_user(&store, "second").await;
    reserve(&store, &schedule, &first).await.unwrap();
    reserve(&store, &schedule, &second).await.unwrap();

    let summaries = store.list_summaries().await.unwrap();
    let summary = summaries
        .iter()
        .find(|s| s.schedule.id == schedule.id)
        .unwrap();
    assert_eq!(summary.reserved, 2);
    assert_eq!(summary.schedule.capacity, 3);

    let detail = store.find_detail(schedule.id).await.unwrap().unwrap();
    let roster: Vec<UserId> = detail.roster.iter().map(|e| e.user.id).collect();
    assert_eq!(roster, vec![first.id, second.id]);
    assert_eq!(detail.roster[0].user.email, first.email);
    assert!(detail.roster.iter().all(|e| e.reservation.schedule_id == schedule.id));

    assert!(store.find_detail(ScheduleId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn should_reject_duplicate_and_overflow() {
    let store = db_store(Duration::from_secs(5)).await;
    let schedule = seed_schedule(&store, "boxing", 1).await;
    let holder = seed_user(&store, "holder").await;
    let late = seed_user(&store, "late").await;

    reserve(&store, &schedule, &holder).await.unwrap();
    assert!(matches!(
        reserve(&store, &schedule, &holder).await,
        Err(ReservationsServiceError::DuplicateReservation)
    ));
    assert!(matches!(
        reserve(&store, &schedule, &late).await,
        Err(ReservationsServiceError::CapacityExceeded)
    ));
    assert!(matches!(
        reserve(&store, &Schedule { id: ScheduleId::new(), ..schedule }, &late).await,
        Err(ReservationsServiceError::ScheduleNotFound)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs DATABASE_URL"]
async fn should_not_overbook_under_row_lock() {
    let store = db_store(Duration::from_secs(5)).await;
    let schedule = seed_schedule(&store, "climbing", 3).await;
    let mut users = Vec::new();
    for i in 0..10 {
        users.push(seed_user(&store, &format!("climber{i}")).await);
    }

    let attempts = users.iter().map(|user| {
        let store = store.clone();
        let schedule = schedule.clone();
        let user = user.clone();
        tokio::spawn(async move { reserve(&store, &schedule, &user).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert!(results.iter().all(|r| matches!(
        r,
        Ok(()) | Err(ReservationsServiceError::CapacityExceeded)
    )));
    let detail = store.find_detail(schedule.id).await.unwrap().unwrap();
    assert_eq!(detail.roster.len(), 3);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn should_report_lock_timeout_as_transient() {
    let holder_store = db_store(Duration::from_secs(5)).await;
    let schedule = seed_schedule(&holder_store, "sauna", 2).await;
    let user = seed_user(&holder_store, "waiter").await;

    let mut held = holder_store.begin_admission().await.unwrap();
    held.lock_schedule(schedule.id).await.unwrap().unwrap();

    let impatient = DbStore {
        db: holder_store.db.clone(),
        lock_timeout: Some(Duration::from_millis(100)),
    };
    let result = reserve(&impatient, &schedule, &user).await;
    assert!(matches!(
        result,
        Err(ReservationsServiceError::TransientStorage(_))
    ));

    held.abort().await.unwrap();
    reserve(&impatient, &schedule, &user).await.unwrap();
}
