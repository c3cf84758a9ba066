use chrono::Utc;

use slotbook_domain::id::UserId;
use slotbook_domain::user::User;

use crate::domain::repository::MaintenanceRepository;
use crate::domain::types::SeedStaff;
use crate::error::ReservationsServiceError;

/// Wipe all data and recreate the staff account.
pub struct InitializeUseCase<R: MaintenanceRepository> {
    pub repo: R,
    pub seed: SeedStaff,
}

impl<R: MaintenanceRepository> InitializeUseCase<R> {
    pub async fn execute(&self) -> Result<User, ReservationsServiceError> {
        let staff = User {
            id: UserId::new(),
            email: self.seed.email.clone(),
            nickname: self.seed.nickname.clone(),
            staff: true,
            created_at: Utc::now(),
        };
        self.repo.reset(&staff).await?;
        tracing::warn!(staff_email = %staff.email, "store reset");
        Ok(staff)
    }
}
