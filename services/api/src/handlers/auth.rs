use axum::{Json, extract::State};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::usecase::auth::{
    CreateTokenUseCase, SignupInput, SignupUseCase, TokenInput, TokenOutput,
};

// ── POST /auth/signup ────────────────────────────────────────────────────────

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupInput>,
) -> Result<Json<SignupInput>, ApiError> {
    let usecase = SignupUseCase {
        users: state.user_repo(),
        signups: state.signup_repo(),
        mailer: state.mailer(),
    };
    let echo = usecase.execute(body).await?;
    Ok(Json(echo))
}

// ── POST /auth/token ─────────────────────────────────────────────────────────

pub async fn create_token(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TokenInput>,
) -> Result<Json<TokenOutput>, ApiError> {
    let usecase = CreateTokenUseCase {
        users: state.user_repo(),
        signups: state.signup_repo(),
        jwt_secret: state.jwt_secret.as_str().to_owned(),
        ttl_secs: state.access_token_ttl_secs,
    };
    let output = usecase.execute(body).await?;
    Ok(Json(output))
}
