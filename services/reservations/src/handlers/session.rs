use axum::{Json, extract::FromRequestParts, http::request::Parts};

use slotbook_auth_types::identity::SessionCookie;
use slotbook_domain::user::User;

use crate::domain::types::Viewer;
use crate::error::ReservationsServiceError;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::user::ResolveSessionUseCase;

/// The stored user behind the request's session cookie, if any.
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn viewer(&self) -> Viewer {
        Viewer::from(self.0.as_ref())
    }

    pub fn require(self) -> Result<User, ReservationsServiceError> {
        self.0.ok_or(ReservationsServiceError::Unauthenticated)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ReservationsServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let session = SessionCookie::from_headers(&parts.headers);
        let usecase = ResolveSessionUseCase {
            repo: state.user_repo(),
        };
        async move { usecase.execute(session.user_id()).await.map(Self) }
    }
}

// ── GET /api/session ─────────────────────────────────────────────────────────

pub async fn get_session(current: CurrentUser) -> Json<Option<UserResponse>> {
    Json(current.0.map(UserResponse::from))
}
