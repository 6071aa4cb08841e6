use serde::Deserialize;
use validator::Validate;

use yamdb_domain::pagination::PageRequest;
use yamdb_domain::permission::Capability;

use crate::domain::repository::{CommentRepository, ReviewRepository, TitleRepository};
use crate::domain::types::{Actor, Comment, NewComment, Review, require, require_on_content};
use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentPatch {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: Option<String>,
}

/// Comment routes address `/titles/{title_id}/reviews/{review_id}`; the review
/// must belong to that title.
pub struct CommentScope<T, R>
where
    T: TitleRepository,
    R: ReviewRepository,
{
    pub titles: T,
    pub reviews: R,
}

impl<T, R> CommentScope<T, R>
where
    T: TitleRepository,
    R: ReviewRepository,
{
    async fn review(&self, title_id: i32, review_id: i32) -> Result<Review, ApiError> {
        if !self.titles.exists(title_id).await? {
            return Err(ApiError::TitleNotFound);
        }
        self.reviews
            .find(title_id, review_id)
            .await?
            .ok_or(ApiError::ReviewNotFound)
    }
}

pub struct ListCommentsUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub scope: CommentScope<T, R>,
    pub comments: C,
}

impl<T, R, C> ListCommentsUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub async fn execute(
        &self,
        title_id: i32,
        review_id: i32,
        page: PageRequest,
    ) -> Result<Vec<Comment>, ApiError> {
        let review = self.scope.review(title_id, review_id).await?;
        self.comments.list_by_review(review.id, page).await
    }
}

pub struct GetCommentUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub scope: CommentScope<T, R>,
    pub comments: C,
}

impl<T, R, C> GetCommentUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub async fn execute(
        &self,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<Comment, ApiError> {
        let review = self.scope.review(title_id, review_id).await?;
        self.comments
            .find(review.id, comment_id)
            .await?
            .ok_or(ApiError::CommentNotFound)
    }
}

pub struct CreateCommentUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub scope: CommentScope<T, R>,
    pub comments: C,
}

impl<T, R, C> CreateCommentUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        input: CommentInput,
    ) -> Result<Comment, ApiError> {
        require(actor, Capability::Publish)?;
        let author_id = actor.map(|a| a.id).ok_or(ApiError::Unauthenticated)?;
        let review = self.scope.review(title_id, review_id).await?;
        input.validate()?;

        self.comments
            .create(&NewComment {
                review_id: review.id,
                author_id,
                text: input.text,
            })
            .await
    }
}

pub struct UpdateCommentUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub scope: CommentScope<T, R>,
    pub comments: C,
}

impl<T, R, C> UpdateCommentUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
        patch: CommentPatch,
    ) -> Result<Comment, ApiError> {
        let review = self.scope.review(title_id, review_id).await?;
        let comment = self
            .comments
            .find(review.id, comment_id)
            .await?
            .ok_or(ApiError::CommentNotFound)?;
        require_on_content(actor, comment.author_id, Capability::EditContent)?;
        patch.validate()?;

        let Some(text) = patch.text else {
            return Ok(comment);
        };
        self.comments
            .update_text(comment.id, &text)
            .await?
            .ok_or(ApiError::CommentNotFound)
    }
}

pub struct DeleteCommentUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub scope: CommentScope<T, R>,
    pub comments: C,
}

impl<T, R, C> DeleteCommentUseCase<T, R, C>
where
    T: TitleRepository,
    R: ReviewRepository,
    C: CommentRepository,
{
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> Result<(), ApiError> {
        let review = self.scope.review(title_id, review_id).await?;
        let comment = self
            .comments
            .find(review.id, comment_id)
            .await?
            .ok_or(ApiError::CommentNotFound)?;
        require_on_content(actor, comment.author_id, Capability::EditContent)?;
        if self.comments.delete(comment.id).await? {
            Ok(())
        } else {
            Err(ApiError::CommentNotFound)
        }
    }
}
