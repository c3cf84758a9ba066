pub mod admission;
pub mod maintenance;
pub mod schedule;
pub mod user;
