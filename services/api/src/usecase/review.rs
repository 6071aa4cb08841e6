use serde::Deserialize;
use validator::Validate;

use yamdb_domain::pagination::PageRequest;
use yamdb_domain::permission::Capability;

use crate::domain::repository::{ReviewRepository, TitleRepository};
use crate::domain::types::{
    Actor, NewReview, Review, ReviewChanges, require, require_on_content,
};
use crate::domain::validation::DUPLICATE_REVIEW;
use crate::error::{ApiError, FieldErrors};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewInput {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[validate(range(min = 1, max = 10, message = "score must be between 1 and 10"))]
    pub score: i16,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewPatch {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10, message = "score must be between 1 and 10"))]
    pub score: Option<i16>,
}

async fn ensure_title<T: TitleRepository>(titles: &T, title_id: i32) -> Result<(), ApiError> {
    if titles.exists(title_id).await? {
        Ok(())
    } else {
        Err(ApiError::TitleNotFound)
    }
}

async fn load_review<T, R>(
    titles: &T,
    reviews: &R,
    title_id: i32,
    review_id: i32,
) -> Result<Review, ApiError>
where
    T: TitleRepository,
    R: ReviewRepository,
{
    ensure_title(titles, title_id).await?;
    reviews
        .find(title_id, review_id)
        .await?
        .ok_or(ApiError::ReviewNotFound)
}

pub struct ListReviewsUseCase<T: TitleRepository, R: ReviewRepository> {
    pub titles: T,
    pub reviews: R,
}

impl<T: TitleRepository, R: ReviewRepository> ListReviewsUseCase<T, R> {
    pub async fn execute(&self, title_id: i32, page: PageRequest) -> Result<Vec<Review>, ApiError> {
        ensure_title(&self.titles, title_id).await?;
        self.reviews.list_by_title(title_id, page).await
    }
}

pub struct GetReviewUseCase<T: TitleRepository, R: ReviewRepository> {
    pub titles: T,
    pub reviews: R,
}

impl<T: TitleRepository, R: ReviewRepository> GetReviewUseCase<T, R> {
    pub async fn execute(&self, title_id: i32, review_id: i32) -> Result<Review, ApiError> {
        load_review(&self.titles, &self.reviews, title_id, review_id).await
    }
}

pub struct CreateReviewUseCase<T: TitleRepository, R: ReviewRepository> {
    pub titles: T,
    pub reviews: R,
}

impl<T: TitleRepository, R: ReviewRepository> CreateReviewUseCase<T, R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        input: ReviewInput,
    ) -> Result<Review, ApiError> {
        require(actor, Capability::Publish)?;
        let author_id = actor.map(|a| a.id).ok_or(ApiError::Unauthenticated)?;
        ensure_title(&self.titles, title_id).await?;
        input.validate()?;

        // The unique index still catches a concurrent duplicate.
        if self.reviews.exists_for_author(title_id, author_id).await? {
            return Err(ApiError::Validation(FieldErrors::non_field(DUPLICATE_REVIEW)));
        }
        let review = self
            .reviews
            .create(&NewReview {
                title_id,
                author_id,
                text: input.text,
                score: input.score,
            })
            .await?;
        tracing::info!(review_id = review.id, title_id, author_id, "review created");
        Ok(review)
    }
}

pub struct UpdateReviewUseCase<T: TitleRepository, R: ReviewRepository> {
    pub titles: T,
    pub reviews: R,
}

impl<T: TitleRepository, R: ReviewRepository> UpdateReviewUseCase<T, R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        patch: ReviewPatch,
    ) -> Result<Review, ApiError> {
        let review = load_review(&self.titles, &self.reviews, title_id, review_id).await?;
        require_on_content(actor, review.author_id, Capability::EditContent)?;
        patch.validate()?;

        let changes = ReviewChanges {
            text: patch.text,
            score: patch.score,
        };
        self.reviews
            .update(review.id, &changes)
            .await?
            .ok_or(ApiError::ReviewNotFound)
    }
}

pub struct DeleteReviewUseCase<T: TitleRepository, R: ReviewRepository> {
    pub titles: T,
    pub reviews: R,
}

impl<T: TitleRepository, R: ReviewRepository> DeleteReviewUseCase<T, R> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
    ) -> Result<(), ApiError> {
        let review = load_review(&self.titles, &self.reviews, title_id, review_id).await?;
        require_on_content(actor, review.author_id, Capability::EditContent)?;
        if self.reviews.delete(review.id).await? {
            Ok(())
        } else {
            Err(ApiError::ReviewNotFound)
        }
    }
}
