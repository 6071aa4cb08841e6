use serde::Deserialize;
use validator::Validate;

use yamdb_domain::pagination::PageRequest;
use yamdb_domain::permission::Capability;
use yamdb_domain::role::Role;

use crate::domain::repository::UserRepository;
use crate::domain::types::{Actor, NewUser, User, UserChanges, require};
use crate::domain::validation::{EMAIL_MAX_LEN, USERNAME_MAX_LEN, validate_username};
use crate::error::{ApiError, FieldErrors};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserInput {
    #[validate(
        length(min = 1, max = USERNAME_MAX_LEN),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(email(message = "enter a valid email address"), length(max = EMAIL_MAX_LEN))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(
        length(min = 1, max = USERNAME_MAX_LEN),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,
    #[validate(email(message = "enter a valid email address"), length(max = EMAIL_MAX_LEN))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl UserPatch {
    fn into_changes(self) -> UserChanges {
        UserChanges {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: self.role,
        }
    }
}

/// Field errors for a username/email already held by someone other than `except`.
async fn check_unique<U: UserRepository>(
    users: &U,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<i32>,
) -> Result<(), ApiError> {
    let taken = |user: Option<User>| user.is_some_and(|u| Some(u.id) != except);
    let mut errors = FieldErrors::new();
    if let Some(username) = username {
        if taken(users.find_by_username(username).await?) {
            errors.add("username", "a user with this username already exists");
        }
    }
    if let Some(email) = email {
        if taken(users.find_by_email(email).await?) {
            errors.add("email", "a user with this email already exists");
        }
    }
    errors.into_result()
}

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<User>, ApiError> {
        require(actor, Capability::ManageUsers)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.users.list(search, page).await
    }
}

pub struct CreateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CreateUserUseCase<U> {
    pub async fn execute(&self, actor: Option<&Actor>, input: UserInput) -> Result<User, ApiError> {
        require(actor, Capability::ManageUsers)?;
        input.validate()?;
        check_unique(
            &self.users,
            Some(&input.username),
            Some(&input.email),
            None,
        )
        .await?;

        let user = self
            .users
            .create(&NewUser {
                username: input.username,
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                bio: input.bio,
                role: input.role,
            })
            .await?;
        tracing::info!(user_id = user.id, role = %user.role, "user created by admin");
        Ok(user)
    }
}

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, actor: Option<&Actor>, username: &str) -> Result<User, ApiError> {
        require(actor, Capability::ManageUsers)?;
        self.users
            .find_by_username(username)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

pub struct UpdateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateUserUseCase<U> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        username: &str,
        patch: UserPatch,
    ) -> Result<User, ApiError> {
        require(actor, Capability::ManageUsers)?;
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        patch.validate()?;
        check_unique(
            &self.users,
            patch.username.as_deref(),
            patch.email.as_deref(),
            Some(user.id),
        )
        .await?;

        self.users
            .update(user.id, &patch.into_changes())
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    pub async fn execute(&self, actor: Option<&Actor>, username: &str) -> Result<(), ApiError> {
        require(actor, Capability::ManageUsers)?;
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if self.users.delete(user.id).await? {
            Ok(())
        } else {
            Err(ApiError::UserNotFound)
        }
    }
}

// ── users/me ─────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, actor: Option<&Actor>) -> Result<User, ApiError> {
        require(actor, Capability::EditProfile)?;
        let id = actor.map(|a| a.id).ok_or(ApiError::Unauthenticated)?;
        self.users
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

pub struct UpdateMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateMeUseCase<U> {
    /// `role` in the payload is ignored; the stored role is kept.
    pub async fn execute(&self, actor: Option<&Actor>, patch: UserPatch) -> Result<User, ApiError> {
        require(actor, Capability::EditProfile)?;
        let id = actor.map(|a| a.id).ok_or(ApiError::Unauthenticated)?;
        patch.validate()?;
        check_unique(
            &self.users,
            patch.username.as_deref(),
            patch.email.as_deref(),
            Some(id),
        )
        .await?;

        let changes = UserChanges {
            role: None,
            ..patch.into_changes()
        };
        self.users
            .update(id, &changes)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}
