use anyhow::Context as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use yamdb_auth_types::token::issue_access_token;

use crate::domain::repository::{MailPort, SignupRepository, UserRepository};
use crate::domain::types::{MailMessage, NewUser, PendingSignup};
use crate::domain::validation::{EMAIL_MAX_LEN, USERNAME_MAX_LEN, validate_username};
use crate::error::{ApiError, FieldErrors};

fn confirmation_mail(pending: &PendingSignup) -> MailMessage {
    MailMessage {
        to: pending.email.clone(),
        subject: "YaMDb confirmation code".to_owned(),
        body: format!(
            "Hello, {}!\n\nYour confirmation code: {}\n\nExchange it for an access token at POST /api/v1/auth/token.\n",
            pending.username, pending.code
        ),
    }
}

// ── Signup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct SignupInput {
    #[validate(email(message = "enter a valid email address"), length(max = EMAIL_MAX_LEN))]
    pub email: String,
    #[validate(
        length(min = 1, max = USERNAME_MAX_LEN),
        custom(function = "validate_username")
    )]
    pub username: String,
}

pub struct SignupUseCase<U, S, M>
where
    U: UserRepository,
    S: SignupRepository,
    M: MailPort,
{
    pub users: U,
    pub signups: S,
    pub mailer: M,
}

impl<U, S, M> SignupUseCase<U, S, M>
where
    U: UserRepository,
    S: SignupRepository,
    M: MailPort,
{
    /// Register (or re-register) and mail the confirmation code. Echoes the input.
    pub async fn execute(&self, input: SignupInput) -> Result<SignupInput, ApiError> {
        input.validate()?;

        let by_username = self.users.find_by_username(&input.username).await?;
        let by_email = self.users.find_by_email(&input.email).await?;

        let pending = match (by_username, by_email) {
            // Same account signing up again: refresh the code and re-send it.
            (Some(user), Some(other)) if user.id == other.id => {
                let pending = PendingSignup::issue(&user, Utc::now());
                self.signups.upsert(&pending).await?;
                pending
            }
            (None, None) => {
                let user = NewUser {
                    username: input.username.clone(),
                    email: input.email.clone(),
                    ..Default::default()
                };
                self.signups
                    .register(&user, &PendingSignup::code_for(&input.username))
                    .await?
            }
            (by_username, by_email) => {
                let mut errors = FieldErrors::new();
                if by_username.is_some() {
                    errors.add("username", "a user with this username already exists");
                }
                if by_email.is_some() {
                    errors.add("email", "a user with this email already exists");
                }
                return Err(ApiError::Validation(errors));
            }
        };
        tracing::info!(user_id = pending.user_id, "confirmation code issued");

        self.mailer
            .send(&confirmation_mail(&pending))
            .await
            .inspect_err(|e| {
                tracing::warn!(user_id = pending.user_id, error = ?e, "confirmation mail not delivered");
            })?;
        Ok(input)
    }
}

// ── Token ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenInput {
    #[validate(
        length(min = 1, max = USERNAME_MAX_LEN),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(min = 1, message = "confirmation code is required"))]
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenOutput {
    pub token: String,
}

pub struct CreateTokenUseCase<U, S>
where
    U: UserRepository,
    S: SignupRepository,
{
    pub users: U,
    pub signups: S,
    pub jwt_secret: String,
    pub ttl_secs: u64,
}

impl<U, S> CreateTokenUseCase<U, S>
where
    U: UserRepository,
    S: SignupRepository,
{
    pub async fn execute(&self, input: TokenInput) -> Result<TokenOutput, ApiError> {
        input.validate()?;

        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let pending = self
            .signups
            .find_by_user(user.id)
            .await?
            .ok_or(ApiError::InvalidConfirmationCode)?;
        if !pending.matches(&input.confirmation_code) {
            return Err(ApiError::InvalidConfirmationCode);
        }

        let (token, _exp) =
            issue_access_token(user.id, user.role, self.ttl_secs, &self.jwt_secret)
                .context("issue access token")?;
        tracing::info!(user_id = user.id, role = %user.role, "access token issued");
        Ok(TokenOutput { token })
    }
}
