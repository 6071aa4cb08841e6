use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use serde::Serialize;

use yamdb_domain::permission::Capability;
use yamdb_domain::role::Role;

use crate::domain::types::User;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, MaybeActor};
use crate::handlers::{ListQuery, parse_query};
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserUseCase, DeleteUserUseCase, GetMeUseCase, GetUserUseCase, ListUsersUseCase,
    UpdateMeUseCase, UpdateUserUseCase, UserInput, UserPatch,
};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn list_users(
    actor: MaybeActor,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let query: ListQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase
        .execute(
            actor.0.as_ref(),
            query.search.as_deref(),
            query.page_request(),
        )
        .await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

// ── POST /users ──────────────────────────────────────────────────────────────

pub async fn create_user(
    actor: MaybeActor,
    State(state): State<AppState>,
    body: Result<ApiJson<UserInput>, ApiError>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    actor.require(Capability::ManageUsers)?;
    let ApiJson(body) = body?;
    let usecase = CreateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(actor.0.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users/{username} ────────────────────────────────────────────────────

pub async fn get_user(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(actor.0.as_ref(), &username).await?;
    Ok(Json(user.into()))
}

// ── PATCH /users/{username} ──────────────────────────────────────────────────

pub async fn update_user(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
    body: Result<ApiJson<UserPatch>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    actor.require(Capability::ManageUsers)?;
    let ApiJson(body) = body?;
    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(actor.0.as_ref(), &username, body).await?;
    Ok(Json(user.into()))
}

// ── DELETE /users/{username} ─────────────────────────────────────────────────

pub async fn delete_user(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    usecase.execute(actor.0.as_ref(), &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /users/me ────────────────────────────────────────────────────────────

pub async fn get_me(
    actor: MaybeActor,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = GetMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(actor.0.as_ref()).await?;
    Ok(Json(user.into()))
}

// ── PATCH /users/me ──────────────────────────────────────────────────────────

pub async fn update_me(
    actor: MaybeActor,
    State(state): State<AppState>,
    body: Result<ApiJson<UserPatch>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    actor.require(Capability::EditProfile)?;
    let ApiJson(body) = body?;
    let usecase = UpdateMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(actor.0.as_ref(), body).await?;
    Ok(Json(user.into()))
}
