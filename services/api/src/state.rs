use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use yamdb_auth_types::identity::JwtSecret;

use crate::domain::types::CatalogKind;
use crate::infra::db::{
    DbCatalogRepository, DbCommentRepository, DbReviewRepository, DbSignupRepository,
    DbTitleRepository, DbUserRepository,
};
use crate::infra::mail::MailTransport;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: JwtSecret,
    pub access_token_ttl_secs: u64,
    pub mailer: MailTransport,
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn signup_repo(&self) -> DbSignupRepository {
        DbSignupRepository {
            db: self.db.clone(),
        }
    }

    pub fn catalog_repo(&self, kind: CatalogKind) -> DbCatalogRepository {
        DbCatalogRepository {
            db: self.db.clone(),
            kind,
        }
    }

    pub fn title_repo(&self) -> DbTitleRepository {
        DbTitleRepository {
            db: self.db.clone(),
        }
    }

    pub fn review_repo(&self) -> DbReviewRepository {
        DbReviewRepository {
            db: self.db.clone(),
        }
    }

    pub fn comment_repo(&self) -> DbCommentRepository {
        DbCommentRepository {
            db: self.db.clone(),
        }
    }

    pub fn mailer(&self) -> MailTransport {
        self.mailer.clone()
    }
}
