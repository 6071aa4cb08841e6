#![allow(async_fn_in_trait)]

use yamdb_domain::pagination::PageRequest;

use crate::domain::types::{
    CatalogEntry, Comment, MailMessage, NewComment, NewReview, NewUser, PendingSignup, Review,
    ReviewChanges, Title, TitleFilter, TitleRecord, User, UserChanges,
};
use crate::error::ApiError;

pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Users ordered by username; `search` is a case-insensitive substring of the username.
    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<Vec<User>, ApiError>;

    /// Unique violations surface as `ApiError::Validation`.
    async fn create(&self, user: &NewUser) -> Result<User, ApiError>;

    /// Returns `None` if the user does not exist.
    async fn update(&self, id: i32, changes: &UserChanges) -> Result<Option<User>, ApiError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
}

/// Pending confirmation codes, one per user.
pub trait SignupRepository: Send + Sync {
    /// Insert a new user and its pending code in one transaction.
    async fn register(
        &self,
        user: &NewUser,
        code: &str,
    ) -> Result<PendingSignup, ApiError>;

    /// Insert or replace the pending code for an existing user.
    async fn upsert(&self, pending: &PendingSignup) -> Result<(), ApiError>;

    async fn find_by_user(&self, user_id: i32) -> Result<Option<PendingSignup>, ApiError>;
}

/// Categories or genres, depending on the implementation's catalog kind.
pub trait CatalogRepository: Send + Sync {
    /// Entries ordered by name; `search` is a case-insensitive substring of the name.
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<CatalogEntry>, ApiError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CatalogEntry>, ApiError>;

    /// Entries for the slugs that exist; unknown slugs are skipped.
    async fn find_by_slugs(&self, slugs: &[String]) -> Result<Vec<CatalogEntry>, ApiError>;

    async fn create(&self, name: &str, slug: &str) -> Result<CatalogEntry, ApiError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete_by_slug(&self, slug: &str) -> Result<bool, ApiError>;
}

pub trait TitleRepository: Send + Sync {
    /// Titles ordered by id, with rating, category and genres resolved.
    async fn list(&self, filter: &TitleFilter, page: PageRequest) -> Result<Vec<Title>, ApiError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Title>, ApiError>;

    async fn exists(&self, id: i32) -> Result<bool, ApiError>;

    /// Insert the title and its genre links in one transaction. Returns the new id.
    async fn create(&self, record: &TitleRecord) -> Result<i32, ApiError>;

    /// Replace all columns and genre links. Returns `false` if the title does not exist.
    async fn replace(&self, id: i32, record: &TitleRecord) -> Result<bool, ApiError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
}

pub trait ReviewRepository: Send + Sync {
    /// Reviews of a title, newest first.
    async fn list_by_title(
        &self,
        title_id: i32,
        page: PageRequest,
    ) -> Result<Vec<Review>, ApiError>;

    /// Find a review only if it belongs to `title_id`.
    async fn find(&self, title_id: i32, review_id: i32) -> Result<Option<Review>, ApiError>;

    async fn exists_for_author(&self, title_id: i32, author_id: i32) -> Result<bool, ApiError>;

    /// A second review by the same author on the same title surfaces as `ApiError::Validation`.
    async fn create(&self, review: &NewReview) -> Result<Review, ApiError>;

    async fn update(&self, id: i32, changes: &ReviewChanges) -> Result<Option<Review>, ApiError>;

    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
}

pub trait CommentRepository: Send + Sync {
    /// Comments of a review, newest first.
    async fn list_by_review(
        &self,
        review_id: i32,
        page: PageRequest,
    ) -> Result<Vec<Comment>, ApiError>;

    /// Find a comment only if it belongs to `review_id`.
    async fn find(&self, review_id: i32, comment_id: i32) -> Result<Option<Comment>, ApiError>;

    async fn create(&self, comment: &NewComment) -> Result<Comment, ApiError>;

    async fn update_text(&self, id: i32, text: &str) -> Result<Option<Comment>, ApiError>;

    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
}

/// Outbound email.
pub trait MailPort: Send + Sync {
    /// Failures are reported as `ApiError::MailDelivery`.
    async fn send(&self, message: &MailMessage) -> Result<(), ApiError>;
}
