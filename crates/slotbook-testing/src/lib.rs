//! Test utilities for Slotbook services.
//!
//! Provides `MockSession` and the in-process `TestApp` driver.
//! Import from tests only — never in production code.

pub mod app;
pub mod session;
