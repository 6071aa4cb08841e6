use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use serde::Serialize;

use yamdb_domain::permission::Capability;

use crate::domain::types::Comment;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, MaybeActor};
use crate::handlers::{ListQuery, parse_query};
use crate::infra::db::{DbReviewRepository, DbTitleRepository};
use crate::state::AppState;
use crate::usecase::comment::{
    CommentInput, CommentPatch, CommentScope, CreateCommentUseCase, DeleteCommentUseCase,
    GetCommentUseCase, ListCommentsUseCase, UpdateCommentUseCase,
};

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i32,
    pub text: String,
    pub author: String,
    #[serde(serialize_with = "yamdb_core::serde::to_rfc3339_micros")]
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author: comment.author,
            pub_date: comment.pub_date,
        }
    }
}

fn scope(state: &AppState) -> CommentScope<DbTitleRepository, DbReviewRepository> {
    CommentScope {
        titles: state.title_repo(),
        reviews: state.review_repo(),
    }
}

// ── GET .../reviews/{review_id}/comments ─────────────────────────────────────

pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let query: ListQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListCommentsUseCase {
        scope: scope(&state),
        comments: state.comment_repo(),
    };
    let comments = usecase
        .execute(title_id, review_id, query.page_request())
        .await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

// ── POST .../reviews/{review_id}/comments ────────────────────────────────────

pub async fn create_comment(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    body: Result<ApiJson<CommentInput>, ApiError>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    actor.require(Capability::Publish)?;
    let ApiJson(body) = body?;
    let usecase = CreateCommentUseCase {
        scope: scope(&state),
        comments: state.comment_repo(),
    };
    let comment = usecase
        .execute(actor.0.as_ref(), title_id, review_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

// ── GET .../comments/{comment_id} ────────────────────────────────────────────

pub async fn get_comment(
    State(state): State<AppState>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(i32, i32, i32)>,
) -> Result<Json<CommentResponse>, ApiError> {
    let usecase = GetCommentUseCase {
        scope: scope(&state),
        comments: state.comment_repo(),
    };
    let comment = usecase.execute(title_id, review_id, comment_id).await?;
    Ok(Json(comment.into()))
}

// ── PATCH .../comments/{comment_id} ──────────────────────────────────────────

pub async fn update_comment(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(i32, i32, i32)>,
    body: Result<ApiJson<CommentPatch>, ApiError>,
) -> Result<Json<CommentResponse>, ApiError> {
    actor.require(Capability::Publish)?;
    let ApiJson(body) = body?;
    let usecase = UpdateCommentUseCase {
        scope: scope(&state),
        comments: state.comment_repo(),
    };
    let comment = usecase
        .execute(actor.0.as_ref(), title_id, review_id, comment_id, body)
        .await?;
    Ok(Json(comment.into()))
}

// ── DELETE .../comments/{comment_id} ─────────────────────────────────────────

pub async fn delete_comment(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteCommentUseCase {
        scope: scope(&state),
        comments: state.comment_repo(),
    };
    usecase
        .execute(actor.0.as_ref(), title_id, review_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
