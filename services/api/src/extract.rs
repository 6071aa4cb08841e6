use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;

use yamdb_auth_types::identity::{BearerIdentity, IdentityRejection};
use yamdb_domain::permission::Capability;

use crate::domain::repository::UserRepository;
use crate::domain::types::{Actor, require};
use crate::error::ApiError;
use crate::state::AppState;

/// The caller behind the bearer token, or `None` for anonymous requests.
///
/// The user is reloaded on every request so role changes apply at once.
/// A token whose user no longer exists is rejected as invalid.
#[derive(Debug, Clone)]
pub struct MaybeActor(pub Option<Actor>);

impl MaybeActor {
    /// Role-level gate for handlers that must refuse before reading the body.
    pub fn require(&self, required: Capability) -> Result<(), ApiError> {
        require(self.0.as_ref(), required).map_err(Into::into)
    }
}

impl FromRequestParts<AppState> for MaybeActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let info = match BearerIdentity::from_request_parts(parts, state).await {
            Ok(BearerIdentity(info)) => info,
            Err(IdentityRejection::Missing) => return Ok(Self(None)),
            Err(rejection) => return Err(rejection.into()),
        };
        let user = state
            .user_repo()
            .find_by_id(info.user_id)
            .await?
            .ok_or(ApiError::InvalidToken)?;
        Ok(Self(Some(user.into())))
    }
}

/// JSON request body. Missing or mistyped fields become validation errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters. A segment of the wrong type becomes a validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
