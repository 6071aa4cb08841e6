use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use yamdb_api::domain::repository::{
    CatalogRepository, CommentRepository, MailPort, ReviewRepository, SignupRepository,
    TitleRepository, UserRepository,
};
use yamdb_api::domain::types::{
    Actor, CatalogEntry, Comment, MailMessage, NewComment, NewReview, NewUser, PendingSignup,
    Review, ReviewChanges, Title, TitleFilter, TitleRecord, User, UserChanges,
};
use yamdb_api::error::ApiError;
use yamdb_domain::pagination::PageRequest;
use yamdb_domain::rating::mean_score;
use yamdb_domain::role::Role;

fn paged<T: Clone>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns a shared handle to the user list for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

fn insert_user(users: &Mutex<Vec<User>>, user: &NewUser) -> User {
    let mut users = users.lock().unwrap();
    let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
    let created = User {
        id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        bio: user.bio.clone(),
        role: user.role,
    };
    users.push(created.clone());
    created
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<Vec<User>, ApiError> {
        let mut users: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| search.is_none_or(|s| u.username.to_lowercase().contains(&s.to_lowercase())))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paged(users, page))
    }

    async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        Ok(insert_user(&self.users, user))
    }

    async fn update(&self, id: i32, changes: &UserChanges) -> Result<Option<User>, ApiError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(bio) = &changes.bio {
            user.bio = bio.clone();
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

// ── MockSignupRepo ───────────────────────────────────────────────────────────

/// Shares its user list with a [`MockUserRepo`] so `register` is visible to lookups.
pub struct MockSignupRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub pending: Arc<Mutex<Vec<PendingSignup>>>,
}

impl MockSignupRepo {
    pub fn new(users: &MockUserRepo, pending: Vec<PendingSignup>) -> Self {
        Self {
            users: users.users_handle(),
            pending: Arc::new(Mutex::new(pending)),
        }
    }

    pub fn pending_handle(&self) -> Arc<Mutex<Vec<PendingSignup>>> {
        Arc::clone(&self.pending)
    }
}

impl SignupRepository for MockSignupRepo {
    async fn register(&self, user: &NewUser, code: &str) -> Result<PendingSignup, ApiError> {
        let created = insert_user(&self.users, user);
        let pending = PendingSignup {
            code: code.to_owned(),
            ..PendingSignup::issue(&created, Utc::now())
        };
        self.pending.lock().unwrap().push(pending.clone());
        Ok(pending)
    }

    async fn upsert(&self, pending: &PendingSignup) -> Result<(), ApiError> {
        let mut codes = self.pending.lock().unwrap();
        codes.retain(|p| p.user_id != pending.user_id);
        codes.push(pending.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Option<PendingSignup>, ApiError> {
        Ok(self
            .pending
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<MailMessage>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<MailMessage>>> {
        Arc::clone(&self.sent)
    }
}

impl MailPort for MockMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), ApiError> {
        if self.fail {
            return Err(ApiError::MailDelivery(anyhow::anyhow!("relay unavailable")));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ── MockCatalogRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockCatalogRepo {
    pub entries: Arc<Mutex<Vec<CatalogEntry>>>,
}

impl MockCatalogRepo {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl CatalogRepository for MockCatalogRepo {
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<CatalogEntry>, ApiError> {
        let mut entries: Vec<CatalogEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| search.is_none_or(|s| e.name.to_lowercase().contains(&s.to_lowercase())))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paged(entries, page))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CatalogEntry>, ApiError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.slug == slug)
            .cloned())
    }

    async fn find_by_slugs(&self, slugs: &[String]) -> Result<Vec<CatalogEntry>, ApiError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| slugs.contains(&e.slug))
            .cloned()
            .collect())
    }

    async fn create(&self, name: &str, slug: &str) -> Result<CatalogEntry, ApiError> {
        let mut entries = self.entries.lock().unwrap();
        let entry = CatalogEntry {
            id: entries.iter().map(|e| e.id).max().unwrap_or(0) + 1,
            name: name.to_owned(),
            slug: slug.to_owned(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, ApiError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.slug != slug);
        Ok(entries.len() < before)
    }
}

// ── MockTitleRepo ────────────────────────────────────────────────────────────

/// Titles plus the catalog used to resolve record ids back into entries.
pub struct MockTitleRepo {
    pub titles: Arc<Mutex<Vec<Title>>>,
    pub categories: Vec<CatalogEntry>,
    pub genres: Vec<CatalogEntry>,
}

impl MockTitleRepo {
    pub fn new(titles: Vec<Title>) -> Self {
        Self {
            titles: Arc::new(Mutex::new(titles)),
            categories: vec![test_category()],
            genres: test_genres(),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn titles_handle(&self) -> Arc<Mutex<Vec<Title>>> {
        Arc::clone(&self.titles)
    }

    fn resolve(&self, id: i32, record: &TitleRecord, rating: Option<f64>) -> Title {
        Title {
            id,
            name: record.name.clone(),
            year: record.year,
            description: record.description.clone(),
            category: record
                .category_id
                .and_then(|cid| self.categories.iter().find(|c| c.id == cid).cloned()),
            genres: self
                .genres
                .iter()
                .filter(|g| record.genre_ids.contains(&g.id))
                .cloned()
                .collect(),
            rating,
        }
    }
}

impl TitleRepository for MockTitleRepo {
    async fn list(&self, filter: &TitleFilter, page: PageRequest) -> Result<Vec<Title>, ApiError> {
        let titles: Vec<Title> = self
            .titles
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|slug| t.category.as_ref().is_some_and(|c| &c.slug == slug))
            })
            .filter(|t| {
                filter
                    .genre
                    .as_ref()
                    .is_none_or(|slug| t.genres.iter().any(|g| &g.slug == slug))
            })
            .filter(|t| {
                filter
                    .name
                    .as_ref()
                    .is_none_or(|n| t.name.to_lowercase().contains(&n.to_lowercase()))
            })
            .filter(|t| filter.year.is_none_or(|y| t.year == y))
            .cloned()
            .collect();
        Ok(paged(titles, page))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Title>, ApiError> {
        Ok(self
            .titles
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn exists(&self, id: i32) -> Result<bool, ApiError> {
        Ok(self.titles.lock().unwrap().iter().any(|t| t.id == id))
    }

    async fn create(&self, record: &TitleRecord) -> Result<i32, ApiError> {
        let mut titles = self.titles.lock().unwrap();
        let id = titles.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        titles.push(self.resolve(id, record, None));
        Ok(id)
    }

    async fn replace(&self, id: i32, record: &TitleRecord) -> Result<bool, ApiError> {
        let mut titles = self.titles.lock().unwrap();
        let Some(title) = titles.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        *title = self.resolve(id, record, title.rating);
        Ok(true)
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut titles = self.titles.lock().unwrap();
        let before = titles.len();
        titles.retain(|t| t.id != id);
        Ok(titles.len() < before)
    }
}

// ── MockReviewRepo ───────────────────────────────────────────────────────────

pub struct MockReviewRepo {
    pub reviews: Arc<Mutex<Vec<Review>>>,
}

impl MockReviewRepo {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self {
            reviews: Arc::new(Mutex::new(reviews)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn reviews_handle(&self) -> Arc<Mutex<Vec<Review>>> {
        Arc::clone(&self.reviews)
    }

    /// Mean score of a title's reviews, as the title listing computes it.
    pub fn rating(&self, title_id: i32) -> Option<f64> {
        let reviews = self.reviews.lock().unwrap();
        let scores: Vec<i64> = reviews
            .iter()
            .filter(|r| r.title_id == title_id)
            .map(|r| i64::from(r.score))
            .collect();
        mean_score(scores.iter().sum(), scores.len() as i64)
    }
}

impl ReviewRepository for MockReviewRepo {
    async fn list_by_title(
        &self,
        title_id: i32,
        page: PageRequest,
    ) -> Result<Vec<Review>, ApiError> {
        let mut reviews: Vec<Review> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.title_id == title_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        Ok(paged(reviews, page))
    }

    async fn find(&self, title_id: i32, review_id: i32) -> Result<Option<Review>, ApiError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.title_id == title_id && r.id == review_id)
            .cloned())
    }

    async fn exists_for_author(&self, title_id: i32, author_id: i32) -> Result<bool, ApiError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.title_id == title_id && r.author_id == author_id))
    }

    async fn create(&self, review: &NewReview) -> Result<Review, ApiError> {
        let mut reviews = self.reviews.lock().unwrap();
        let created = Review {
            id: reviews.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            title_id: review.title_id,
            author_id: review.author_id,
            author: format!("user{}", review.author_id),
            text: review.text.clone(),
            score: review.score,
            pub_date: Utc::now(),
        };
        reviews.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, changes: &ReviewChanges) -> Result<Option<Review>, ApiError> {
        let mut reviews = self.reviews.lock().unwrap();
        let Some(review) = reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(text) = &changes.text {
            review.text = text.clone();
        }
        if let Some(score) = changes.score {
            review.score = score;
        }
        Ok(Some(review.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut reviews = self.reviews.lock().unwrap();
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        Ok(reviews.len() < before)
    }
}

// ── MockCommentRepo ──────────────────────────────────────────────────────────

pub struct MockCommentRepo {
    pub comments: Arc<Mutex<Vec<Comment>>>,
}

impl MockCommentRepo {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self {
            comments: Arc::new(Mutex::new(comments)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn comments_handle(&self) -> Arc<Mutex<Vec<Comment>>> {
        Arc::clone(&self.comments)
    }
}

impl CommentRepository for MockCommentRepo {
    async fn list_by_review(
        &self,
        review_id: i32,
        page: PageRequest,
    ) -> Result<Vec<Comment>, ApiError> {
        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.review_id == review_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        Ok(paged(comments, page))
    }

    async fn find(&self, review_id: i32, comment_id: i32) -> Result<Option<Comment>, ApiError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.review_id == review_id && c.id == comment_id)
            .cloned())
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, ApiError> {
        let mut comments = self.comments.lock().unwrap();
        let created = Comment {
            id: comments.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            review_id: comment.review_id,
            author_id: comment.author_id,
            author: format!("user{}", comment.author_id),
            text: comment.text.clone(),
            pub_date: Utc::now(),
        };
        comments.push(created.clone());
        Ok(created)
    }

    async fn update_text(&self, id: i32, text: &str) -> Result<Option<Comment>, ApiError> {
        let mut comments = self.comments.lock().unwrap();
        let Some(comment) = comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        comment.text = text.to_owned();
        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != id);
        Ok(comments.len() < before)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_user(id: i32, role: Role) -> User {
    User {
        id,
        username: format!("user{id}"),
        email: format!("user{id}@yamdb.fake"),
        first_name: String::new(),
        last_name: String::new(),
        bio: String::new(),
        role,
    }
}

pub fn test_actor(id: i32, role: Role) -> Actor {
    test_user(id, role).into()
}

pub fn test_category() -> CatalogEntry {
    CatalogEntry {
        id: 1,
        name: "Movie".to_owned(),
        slug: "movie".to_owned(),
    }
}

pub fn test_genres() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            id: 1,
            name: "Drama".to_owned(),
            slug: "drama".to_owned(),
        },
        CatalogEntry {
            id: 2,
            name: "Comedy".to_owned(),
            slug: "comedy".to_owned(),
        },
    ]
}

pub fn test_title(id: i32) -> Title {
    Title {
        id,
        name: format!("Title {id}"),
        year: 1994,
        description: None,
        category: Some(test_category()),
        genres: vec![test_genres()[0].clone()],
        rating: None,
    }
}

pub fn test_review(id: i32, title_id: i32, author_id: i32, score: i16) -> Review {
    Review {
        id,
        title_id,
        author_id,
        author: format!("user{author_id}"),
        text: format!("review {id}"),
        score,
        pub_date: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, id as u32 % 60).unwrap(),
    }
}

pub fn test_comment(id: i32, review_id: i32, author_id: i32) -> Comment {
    Comment {
        id,
        review_id,
        author_id,
        author: format!("user{author_id}"),
        text: format!("comment {id}"),
        pub_date: Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, id as u32 % 60).unwrap(),
    }
}
