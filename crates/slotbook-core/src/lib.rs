//! Shared service plumbing: configuration loading, tracing setup, the JSON
//! error body, HTTP middleware and sea-orm helpers.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
