//! sea-orm helpers for lock-based transactions on Postgres.

use std::time::Duration;

use sea_orm::{ConnectionTrait, DbErr, RuntimeErr, SqlErr};

/// SQLSTATE codes that mean "try the whole transaction again".
const TRANSIENT_SQLSTATES: &[&str] = &[
    "55P03", // lock_not_available (lock_timeout expired)
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "57014", // query_canceled (statement_timeout)
];

/// Bound how long statements in the current transaction may wait for a row
/// lock. Must be called inside a transaction; the setting ends with it.
pub async fn set_local_lock_timeout<C>(conn: &C, timeout: Duration) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let millis = timeout.as_millis().max(1);
    conn.execute_unprepared(&format!("SET LOCAL lock_timeout = '{millis}ms'"))
        .await?;
    Ok(())
}

/// Postgres SQLSTATE carried by a query error, if any.
pub fn sqlstate(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Query(e) | DbErr::Exec(e) | DbErr::Conn(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(e) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

/// Whether the error is safe to retry from the start of the transaction:
/// lock timeouts, serialization conflicts, deadlocks and lost connections.
pub fn is_transient(err: &DbErr) -> bool {
    if matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_)) {
        return true;
    }
    sqlstate(err).is_some_and(|code| TRANSIENT_SQLSTATES.contains(&code.as_str()))
}

/// Whether the error is a unique-constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
