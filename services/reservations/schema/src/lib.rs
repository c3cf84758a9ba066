//! sea-orm entities for the reservations service tables.

pub mod reservations;
pub mod schedules;
pub mod users;
