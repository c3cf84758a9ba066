//! User accounts.

use chrono::{DateTime, Utc};

use crate::id::UserId;

/// A registered user as stored.
///
/// The email is always present here; redaction for non-staff viewers is a
/// presentation concern and never mutates this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub nickname: String,
    pub staff: bool,
    pub created_at: DateTime<Utc>,
}
