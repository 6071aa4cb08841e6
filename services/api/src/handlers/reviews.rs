use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use serde::Serialize;

use yamdb_domain::permission::Capability;

use crate::domain::types::Review;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, MaybeActor};
use crate::handlers::{ListQuery, parse_query};
use crate::state::AppState;
use crate::usecase::review::{
    CreateReviewUseCase, DeleteReviewUseCase, GetReviewUseCase, ListReviewsUseCase, ReviewInput,
    ReviewPatch, UpdateReviewUseCase,
};

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i32,
    pub text: String,
    /// Author's username.
    pub author: String,
    pub score: i16,
    #[serde(serialize_with = "yamdb_core::serde::to_rfc3339_micros")]
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            text: review.text,
            author: review.author,
            score: review.score,
            pub_date: review.pub_date,
        }
    }
}

// ── GET /titles/{title_id}/reviews ───────────────────────────────────────────

pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<i32>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let query: ListQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListReviewsUseCase {
        titles: state.title_repo(),
        reviews: state.review_repo(),
    };
    let reviews = usecase.execute(title_id, query.page_request()).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

// ── POST /titles/{title_id}/reviews ──────────────────────────────────────────

pub async fn create_review(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<i32>,
    body: Result<ApiJson<ReviewInput>, ApiError>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    actor.require(Capability::Publish)?;
    let ApiJson(body) = body?;
    let usecase = CreateReviewUseCase {
        titles: state.title_repo(),
        reviews: state.review_repo(),
    };
    let review = usecase.execute(actor.0.as_ref(), title_id, body).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

// ── GET /titles/{title_id}/reviews/{review_id} ───────────────────────────────

pub async fn get_review(
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let usecase = GetReviewUseCase {
        titles: state.title_repo(),
        reviews: state.review_repo(),
    };
    let review = usecase.execute(title_id, review_id).await?;
    Ok(Json(review.into()))
}

// ── PATCH /titles/{title_id}/reviews/{review_id} ─────────────────────────────

pub async fn update_review(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    body: Result<ApiJson<ReviewPatch>, ApiError>,
) -> Result<Json<ReviewResponse>, ApiError> {
    actor.require(Capability::Publish)?;
    let ApiJson(body) = body?;
    let usecase = UpdateReviewUseCase {
        titles: state.title_repo(),
        reviews: state.review_repo(),
    };
    let review = usecase
        .execute(actor.0.as_ref(), title_id, review_id, body)
        .await?;
    Ok(Json(review.into()))
}

// ── DELETE /titles/{title_id}/reviews/{review_id} ────────────────────────────

pub async fn delete_review(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteReviewUseCase {
        titles: state.title_repo(),
        reviews: state.review_repo(),
    };
    usecase.execute(actor.0.as_ref(), title_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
