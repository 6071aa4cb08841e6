//! `Authorization: Bearer` identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;

use crate::token::{AuthError, TokenInfo, validate_access_token};

/// HMAC secret used to validate access tokens. Provide it from the router state
/// via `FromRef`.
#[derive(Clone)]
pub struct JwtSecret(Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

/// Identity carried by a valid bearer token.
#[derive(Debug, Clone)]
pub struct BearerIdentity(pub TokenInfo);

/// Why [`BearerIdentity`] extraction failed.
#[derive(Debug, thiserror::Error)]
pub enum IdentityRejection {
    /// No `Authorization: Bearer` header on the request.
    #[error("missing bearer token")]
    Missing,
    /// A bearer token was present but did not validate.
    #[error("invalid bearer token: {0}")]
    Invalid(#[from] AuthError),
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

impl<S> FromRequestParts<S> for BearerIdentity
where
    S: Send + Sync,
    JwtSecret: FromRef<S>,
{
    type Rejection = IdentityRejection;

    // Extract synchronously and return a 'static future so the returned
    // future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let header = parts.headers.typed_get::<Authorization<Bearer>>();

        async move {
            let header = header.ok_or(IdentityRejection::Missing)?;
            let info = validate_access_token(header.token(), secret.as_str()).inspect_err(|e| {
                tracing::debug!(error = %e, "bearer token rejected");
            })?;
            Ok(Self(info))
        }
    }
}
