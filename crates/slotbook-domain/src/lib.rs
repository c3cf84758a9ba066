//! Entity types shared across Slotbook crates.
//!
//! This crate contains only plain data with no framework dependencies.
//! Storage and presentation concerns live in the service crates.

pub mod id;
pub mod reservation;
pub mod schedule;
pub mod user;
