use anyhow::Context as _;
use serde::Deserialize;
use validator::Validate;

use yamdb_domain::pagination::PageRequest;
use yamdb_domain::permission::Capability;

use crate::domain::repository::{CatalogRepository, TitleRepository};
use crate::domain::types::{Actor, Title, TitleFilter, TitleRecord, require};
use crate::domain::validation::{NAME_MAX_LEN, validate_year};
use crate::error::ApiError;

/// Full title payload (`POST`, `PUT`). `genre` and `category` are slugs.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TitleInput {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(
        range(min = 0, message = "year cannot be negative"),
        custom(function = "validate_year")
    )]
    pub year: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Partial title payload (`PATCH`); absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TitlePatch {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: Option<String>,
    #[validate(
        range(min = 0, message = "year cannot be negative"),
        custom(function = "validate_year")
    )]
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TitleUpdate {
    Replace(TitleInput),
    Patch(TitlePatch),
}

/// Resolves category and genre slugs into ids.
struct SlugResolver<'a, C, G> {
    categories: &'a C,
    genres: &'a G,
}

impl<C, G> SlugResolver<'_, C, G>
where
    C: CatalogRepository,
    G: CatalogRepository,
{
    /// Unknown category slug is a 404.
    async fn category(&self, slug: Option<&str>) -> Result<Option<i32>, ApiError> {
        let Some(slug) = slug else {
            return Ok(None);
        };
        let entry = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or(ApiError::CategoryNotFound)?;
        Ok(Some(entry.id))
    }

    /// Unknown genre slugs are dropped.
    async fn genres(&self, slugs: &[String]) -> Result<Vec<i32>, ApiError> {
        let entries = self.genres.find_by_slugs(slugs).await?;
        Ok(entries.into_iter().map(|g| g.id).collect())
    }
}

pub struct ListTitlesUseCase<T: TitleRepository> {
    pub titles: T,
}

impl<T: TitleRepository> ListTitlesUseCase<T> {
    pub async fn execute(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> Result<Vec<Title>, ApiError> {
        self.titles.list(&filter, page).await
    }
}

pub struct GetTitleUseCase<T: TitleRepository> {
    pub titles: T,
}

impl<T: TitleRepository> GetTitleUseCase<T> {
    pub async fn execute(&self, id: i32) -> Result<Title, ApiError> {
        self.titles
            .find_by_id(id)
            .await?
            .ok_or(ApiError::TitleNotFound)
    }
}

pub struct CreateTitleUseCase<T, C, G>
where
    T: TitleRepository,
    C: CatalogRepository,
    G: CatalogRepository,
{
    pub titles: T,
    pub categories: C,
    pub genres: G,
}

impl<T, C, G> CreateTitleUseCase<T, C, G>
where
    T: TitleRepository,
    C: CatalogRepository,
    G: CatalogRepository,
{
    pub async fn execute(&self, actor: Option<&Actor>, input: TitleInput) -> Result<Title, ApiError> {
        require(actor, Capability::ManageCatalog)?;
        input.validate()?;

        let resolver = SlugResolver {
            categories: &self.categories,
            genres: &self.genres,
        };
        let record = TitleRecord {
            category_id: resolver.category(input.category.as_deref()).await?,
            genre_ids: resolver.genres(&input.genre).await?,
            name: input.name,
            year: input.year,
            description: input.description,
        };
        let id = self.titles.create(&record).await?;
        let title = self
            .titles
            .find_by_id(id)
            .await?
            .context("title missing after insert")?;
        Ok(title)
    }
}

pub struct UpdateTitleUseCase<T, C, G>
where
    T: TitleRepository,
    C: CatalogRepository,
    G: CatalogRepository,
{
    pub titles: T,
    pub categories: C,
    pub genres: G,
}

impl<T, C, G> UpdateTitleUseCase<T, C, G>
where
    T: TitleRepository,
    C: CatalogRepository,
    G: CatalogRepository,
{
    pub async fn execute(
        &self,
        actor: Option<&Actor>,
        id: i32,
        update: TitleUpdate,
    ) -> Result<Title, ApiError> {
        require(actor, Capability::ManageCatalog)?;
        let existing = self
            .titles
            .find_by_id(id)
            .await?
            .ok_or(ApiError::TitleNotFound)?;

        let resolver = SlugResolver {
            categories: &self.categories,
            genres: &self.genres,
        };
        let record = match update {
            TitleUpdate::Replace(input) => {
                input.validate()?;
                TitleRecord {
                    category_id: resolver.category(input.category.as_deref()).await?,
                    genre_ids: resolver.genres(&input.genre).await?,
                    name: input.name,
                    year: input.year,
                    description: input.description,
                }
            }
            TitleUpdate::Patch(patch) => {
                patch.validate()?;
                let mut record = TitleRecord::from_title(&existing);
                if let Some(name) = patch.name {
                    record.name = name;
                }
                if let Some(year) = patch.year {
                    record.year = year;
                }
                if patch.description.is_some() {
                    record.description = patch.description;
                }
                if patch.category.is_some() {
                    record.category_id = resolver.category(patch.category.as_deref()).await?;
                }
                if let Some(slugs) = patch.genre {
                    record.genre_ids = resolver.genres(&slugs).await?;
                }
                record
            }
        };

        if !self.titles.replace(id, &record).await? {
            return Err(ApiError::TitleNotFound);
        }
        self.titles
            .find_by_id(id)
            .await?
            .ok_or(ApiError::TitleNotFound)
    }
}

pub struct DeleteTitleUseCase<T: TitleRepository> {
    pub titles: T,
}

impl<T: TitleRepository> DeleteTitleUseCase<T> {
    pub async fn execute(&self, actor: Option<&Actor>, id: i32) -> Result<(), ApiError> {
        require(actor, Capability::ManageCatalog)?;
        if self.titles.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::TitleNotFound)
        }
    }
}
