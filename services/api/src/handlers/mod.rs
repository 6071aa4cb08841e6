pub mod auth;
pub mod catalog;
pub mod comments;
pub mod health;
pub mod reviews;
pub mod titles;
pub mod users;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use yamdb_domain::pagination::PageRequest;

use crate::error::ApiError;

/// Parse the raw query string with `serde_qs`; an absent query yields `T::default()`.
pub(crate) fn parse_query<T>(raw: Option<&str>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    match raw {
        None => Ok(T::default()),
        Some(raw) => serde_qs::from_str(raw).map_err(|e| ApiError::field("query", e.to_string())),
    }
}

/// `?page=&per-page=&search=` accepted by the plain list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page, self.per_page)
    }
}
