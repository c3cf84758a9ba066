//! Session helpers for integration tests.
//!
//! Real clients obtain the `user_id` cookie from `POST /api/login`. Tests that
//! are not about login attach it directly.

use axum::http::HeaderValue;
use slotbook_auth_types::cookie::SESSION_COOKIE;
use slotbook_domain::id::UserId;

/// A session cookie for a given user.
#[derive(Debug, Clone, Copy)]
pub struct MockSession {
    pub user_id: UserId,
}

impl MockSession {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The `Cookie` header value a logged-in browser would send.
    pub fn cookie(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", self.user_id))
            .expect("uuid is a valid header value")
    }
}
