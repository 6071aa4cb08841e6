//! Auth types shared across YaMDb crates.
//!
//! Provides JWT issuing/validation and the `BearerIdentity` extractor.

pub mod identity;
pub mod token;
