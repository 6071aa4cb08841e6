//! Test utilities for YaMDb crates.
//!
//! Import from `[dev-dependencies]` only.

pub mod auth;
