use serde::Deserialize;
use validator::Validate;

use yamdb_domain::pagination::PageRequest;
use yamdb_domain::permission::Capability;

use crate::domain::repository::CatalogRepository;
use crate::domain::types::{Actor, CatalogEntry, CatalogKind, require};
use crate::domain::validation::{NAME_MAX_LEN, SLUG_MAX_LEN, validate_slug};
use crate::error::ApiError;

fn not_found(kind: CatalogKind) -> ApiError {
    match kind {
        CatalogKind::Category => ApiError::CategoryNotFound,
        CatalogKind::Genre => ApiError::GenreNotFound,
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CatalogEntryInput {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(min = 1, max = SLUG_MAX_LEN), custom(function = "validate_slug"))]
    pub slug: String,
}

pub struct ListCatalogUseCase<C: CatalogRepository> {
    pub entries: C,
}

impl<C: CatalogRepository> ListCatalogUseCase<C> {
    pub async fn execute(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<CatalogEntry>, ApiError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.entries.list(search, page).await
    }
}

pub struct CreateCatalogEntryUseCase<C: CatalogRepository> {
    pub entries: C,
}

impl<C: CatalogRepository> CreateCatalogEntryUseCase<C> {
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        input: CatalogEntryInput,
    ) -> Result<CatalogEntry, ApiError> {
        require(actor, Capability::ManageCatalog)?;
        input.validate()?;
        if self.entries.find_by_slug(&input.slug).await?.is_some() {
            return Err(ApiError::field(
                "slug",
                "an entry with this slug already exists",
            ));
        }
        self.entries.create(&input.name, &input.slug).await
    }
}

pub struct DeleteCatalogEntryUseCase<C: CatalogRepository> {
    pub entries: C,
    pub kind: CatalogKind,
}

impl<C: CatalogRepository> DeleteCatalogEntryUseCase<C> {
    pub async fn execute(&self, actor: Option<&Actor>, slug: &str) -> Result<(), ApiError> {
        require(actor, Capability::ManageCatalog)?;
        if self.entries.delete_by_slug(slug).await? {
            Ok(())
        } else {
            Err(not_found(self.kind))
        }
    }
}
