pub mod form;
pub mod maintenance;
pub mod reservation;
pub mod schedule;
pub mod session;
pub mod user;
