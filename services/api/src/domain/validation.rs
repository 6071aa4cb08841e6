//! Field validators plugged into `#[validate(custom(...))]`.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use validator::ValidationError;

pub const USERNAME_MAX_LEN: u64 = 150;
pub const EMAIL_MAX_LEN: u64 = 254;
pub const NAME_MAX_LEN: u64 = 256;
pub const SLUG_MAX_LEN: u64 = 50;

pub const DUPLICATE_REVIEW: &str = "you have already reviewed this title";

/// Reserved: collides with the `users/me` route.
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username == RESERVED_USERNAME {
        return Err(invalid(
            "reserved_username",
            "username \"me\" is not allowed",
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(invalid(
            "invalid_username",
            "username may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(invalid(
            "invalid_slug",
            "slug may contain only latin letters, digits, hyphens and underscores",
        ))
    }
}

/// Rejects years after the current calendar year.
pub fn validate_year(year: impl std::borrow::Borrow<i32>) -> Result<(), ValidationError> {
    if *year.borrow() > Utc::now().year() {
        Err(invalid("future_year", "year cannot be in the future"))
    } else {
        Ok(())
    }
}
