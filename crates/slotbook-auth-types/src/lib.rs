//! Session types shared across Slotbook services.
//!
//! Provides the session cookie builder and the `SessionCookie` extractor.

pub mod cookie;
pub mod identity;
