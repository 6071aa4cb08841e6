use chrono::{DateTime, Utc};
use uuid::Uuid;

use yamdb_domain::permission::{Capability, CapabilitySet, Denied, authorize};
use yamdb_domain::role::Role;

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

/// Fields for a user that does not exist yet.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

/// Partial update of a user; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// The authenticated caller, reloaded from storage for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl From<User> for Actor {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Check `required` against what `actor` (or an anonymous caller) holds.
pub fn require(actor: Option<&Actor>, required: Capability) -> Result<(), Denied> {
    let granted = CapabilitySet::for_role(actor.map(|a| a.role));
    authorize(granted, required, actor.is_some())
}

/// Like [`require`], with authorship of the target review/comment taken into account.
pub fn require_on_content(
    actor: Option<&Actor>,
    author_id: i32,
    required: Capability,
) -> Result<(), Denied> {
    let granted = CapabilitySet::for_role(actor.map(|a| a.role))
        .on_content(actor.is_some_and(|a| a.id == author_id));
    authorize(granted, required, actor.is_some())
}

/// A user who signed up and has not yet exchanged the code for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignup {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

impl PendingSignup {
    /// Confirmation code for `username`: name-based UUIDv3 in the DNS namespace.
    /// The same username always yields the same code.
    pub fn code_for(username: &str) -> String {
        Uuid::new_v3(&Uuid::NAMESPACE_DNS, username.as_bytes()).to_string()
    }

    pub fn issue(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            code: Self::code_for(&user.username),
            issued_at: now,
        }
    }

    pub fn matches(&self, code: &str) -> bool {
        self.code == code
    }
}

/// Which of the two slug-addressed catalogs an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Category,
    Genre,
}

/// A category or a genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

/// A title with its resolved category, genres and rating.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: i32,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<CatalogEntry>,
    pub genres: Vec<CatalogEntry>,
    pub rating: Option<f64>,
}

/// Stored columns of a title plus its genre links, written as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRecord {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub genre_ids: Vec<i32>,
}

impl TitleRecord {
    pub fn from_title(title: &Title) -> Self {
        Self {
            name: title.name.clone(),
            year: title.year,
            description: title.description.clone(),
            category_id: title.category.as_ref().map(|c| c.id),
            genre_ids: title.genres.iter().map(|g| g.id).collect(),
        }
    }
}

/// Title list filters, all optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    /// Category slug, exact.
    pub category: Option<String>,
    /// Genre slug, exact.
    pub genre: Option<String>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: i32,
    pub title_id: i32,
    pub author_id: i32,
    /// Author's username.
    pub author: String,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub title_id: i32,
    pub author_id: i32,
    pub text: String,
    pub score: i16,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub text: Option<String>,
    pub score: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i32,
    pub review_id: i32,
    pub author_id: i32,
    pub author: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub review_id: i32,
    pub author_id: i32,
    pub text: String,
}

/// Plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}
