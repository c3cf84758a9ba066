use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use slotbook_auth_types::cookie::set_session_cookie;
use slotbook_domain::user::User;

use crate::domain::types::UserView;
use crate::error::ReservationsServiceError;
use crate::handlers::form::FormBody;
use crate::state::AppState;
use crate::usecase::user::{LoginUseCase, SignupInput, SignupUseCase};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    /// Empty when hidden from the viewer.
    pub email: String,
    pub nickname: String,
    pub staff: bool,
    #[serde(serialize_with = "slotbook_core::serde::to_rfc3339_micros")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            nickname: user.nickname,
            staff: user.staff,
            created_at: user.created_at,
        }
    }
}

impl From<UserView> for UserResponse {
    fn from(view: UserView) -> Self {
        Self {
            id: view.id.to_string(),
            email: view.email.unwrap_or_default(),
            nickname: view.nickname,
            staff: view.staff,
            created_at: view.created_at,
        }
    }
}

// ── POST /api/signup ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub nickname: Option<String>,
}

pub async fn signup(
    State(state): State<AppState>,
    FormBody(body): FormBody<SignupRequest>,
) -> Result<Json<UserResponse>, ReservationsServiceError> {
    let (Some(email), Some(nickname)) = (body.email, body.nickname) else {
        return Err(ReservationsServiceError::MissingData);
    };
    let usecase = SignupUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(SignupInput { email, nickname }).await?;
    Ok(Json(user.into()))
}

// ── POST /api/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    FormBody(body): FormBody<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), ReservationsServiceError> {
    let email = body.email.ok_or(ReservationsServiceError::MissingData)?;
    let usecase = LoginUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(&email).await?;
    let jar = set_session_cookie(jar, user.id);
    Ok((jar, Json(user.into())))
}
