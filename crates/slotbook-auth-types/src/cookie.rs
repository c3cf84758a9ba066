//! Session cookie builders.
//!
//! The session is a single HttpOnly cookie carrying the user id, as set by
//! `POST /api/login`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use slotbook_domain::id::UserId;
use time::Duration;

/// Cookie name for the session.
pub const SESSION_COOKIE: &str = "user_id";

/// Cookie Max-Age in seconds (1 day).
pub const SESSION_MAX_AGE: i64 = 86400;

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use slotbook_auth_types::cookie::{set_session_cookie, SESSION_COOKIE};
/// use slotbook_domain::id::UserId;
///
/// let user_id = UserId::new();
/// let jar = set_session_cookie(CookieJar::new(), user_id);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.value(), user_id.to_string());
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, user_id: UserId) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .max_age(Duration::seconds(SESSION_MAX_AGE))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

