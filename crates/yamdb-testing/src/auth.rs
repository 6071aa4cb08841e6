//! Bearer-token helpers for tests.
//!
//! `MockAuth` signs a real access token with a test secret so requests pass
//! through the same `BearerIdentity` extractor production traffic does.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

use yamdb_auth_types::identity::JwtSecret;
use yamdb_auth_types::token::issue_access_token;
use yamdb_domain::role::Role;

/// Secret shared by [`MockAuth`] and [`test_secret`].
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// The [`JwtSecret`] matching tokens produced by [`MockAuth`].
pub fn test_secret() -> JwtSecret {
    JwtSecret::new(TEST_JWT_SECRET)
}

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: i32,
    pub role: Role,
}

impl MockAuth {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    /// A signed access token for this identity, valid for one hour.
    pub fn token(&self) -> String {
        issue_access_token(self.user_id, self.role, 3600, TEST_JWT_SECRET)
            .expect("sign test token")
            .0
    }

    /// Return `Authorization: Bearer <token>` headers.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token())).unwrap(),
        );
        map
    }
}
