use std::time::Duration;

use serde::Deserialize;

use slotbook_core::config::Config;
use slotbook_core::tracing::LogFormat;

use crate::domain::types::SeedStaff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

/// Reservations service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct ReservationsConfig {
    /// `postgres` (default) or `memory`. Env var: `STORE_BACKEND`.
    #[serde(default)]
    pub store_backend: StoreBackend,
    /// PostgreSQL connection URL; required for the `postgres` backend.
    pub database_url: Option<String>,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// TCP port for the HTTP server (default 9292). Env var: `RESERVATIONS_PORT`.
    #[serde(default = "default_port")]
    pub reservations_port: u16,
    /// Upper bound on waiting for a schedule lock; `0` waits forever.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    #[serde(default)]
    pub enable_initialize: bool,
    #[serde(default = "default_seed_staff_email")]
    pub seed_staff_email: String,
    #[serde(default = "default_seed_staff_nickname")]
    pub seed_staff_nickname: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Config for ReservationsConfig {}

fn default_bind() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    9292
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_seed_staff_email() -> String {
    "staff@slotbook.local".to_owned()
}

fn default_seed_staff_nickname() -> String {
    "staff".to_owned()
}

impl ReservationsConfig {
    pub fn lock_timeout(&self) -> Option<Duration> {
        (self.lock_timeout_ms > 0).then(|| Duration::from_millis(self.lock_timeout_ms))
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.reservations_port)
    }

    pub fn seed_staff(&self) -> SeedStaff {
        SeedStaff {
            email: self.seed_staff_email.clone(),
            nickname: self.seed_staff_nickname.clone(),
        }
    }
}
