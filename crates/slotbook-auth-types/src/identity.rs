//! Session cookie extractor.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum_extra::extract::cookie::CookieJar;
use http::HeaderMap;
use http::request::Parts;
use slotbook_domain::id::UserId;

use crate::cookie::SESSION_COOKIE;

/// User id carried by the `user_id` session cookie, if any.
///
/// Never rejects: a missing or malformed cookie yields an anonymous session.
/// Resolving the id to a stored user (and rejecting unknown ids) is the
/// service's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookie(pub Option<UserId>);

impl SessionCookie {
    pub fn user_id(&self) -> Option<UserId> {
        self.0
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_id = CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .and_then(|c| c.value().parse::<UserId>().ok());

        if user_id.is_none() && headers.contains_key(http::header::COOKIE) {
            tracing::trace!("request carries cookies but no valid session");
        }
        Self(user_id)
    }
}

impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    // Extract synchronously and return a 'static future; `async fn` here trips
    // E0195 against axum-core's `impl Future + Send` signature.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let session = Self::from_headers(&parts.headers);
        async move { Ok(session) }
    }
}
