use chrono::Utc;

use slotbook_domain::id::UserId;
use slotbook_domain::user::User;

use crate::domain::repository::UserRepository;
use crate::error::ReservationsServiceError;

// ── Signup ───────────────────────────────────────────────────────────────────

pub struct SignupInput {
    pub email: String,
    pub nickname: String,
}

pub struct SignupUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> SignupUseCase<R> {
    pub async fn execute(&self, input: SignupInput) -> Result<User, ReservationsServiceError> {
        let email = input.email.trim();
        let nickname = input.nickname.trim();
        if email.is_empty() || nickname.is_empty() {
            return Err(ReservationsServiceError::MissingData);
        }
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(ReservationsServiceError::UserAlreadyExists);
        }
        let user = User {
            id: UserId::new(),
            email: email.to_owned(),
            nickname: nickname.to_owned(),
            staff: false,
            created_at: Utc::now(),
        };
        self.repo.create(&user).await?;
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(&self, email: &str) -> Result<User, ReservationsServiceError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ReservationsServiceError::MissingData);
        }
        self.repo
            .find_by_email(email)
            .await?
            .ok_or(ReservationsServiceError::LoginFailed)
    }
}

// ── ResolveSession ───────────────────────────────────────────────────────────

pub struct ResolveSessionUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ResolveSessionUseCase<R> {
    /// Map a session cookie's user id to the stored user. Ids that no longer
    /// exist (for example after `/initialize`) resolve to no user.
    pub async fn execute(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Option<User>, ReservationsServiceError> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        let user = self.repo.find_by_id(user_id).await?;
        if user.is_none() {
            tracing::debug!(%user_id, "session refers to unknown user");
        }
        Ok(user)
    }
}
