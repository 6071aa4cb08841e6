use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use yamdb_domain::pagination::PageRequest;
use yamdb_domain::permission::Capability;

use crate::domain::types::{CatalogKind, Title, TitleFilter};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, MaybeActor};
use crate::handlers::catalog::CatalogEntryResponse;
use crate::handlers::parse_query;
use crate::infra::db::{DbCatalogRepository, DbTitleRepository};
use crate::state::AppState;
use crate::usecase::title::{
    CreateTitleUseCase, DeleteTitleUseCase, GetTitleUseCase, ListTitlesUseCase, TitleInput,
    TitlePatch, TitleUpdate, UpdateTitleUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub id: i32,
    pub name: String,
    pub year: i32,
    /// Mean review score; `null` while the title has no reviews.
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<CatalogEntryResponse>,
    pub category: Option<CatalogEntryResponse>,
}

impl From<Title> for TitleResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.id,
            name: title.name,
            year: title.year,
            rating: title.rating,
            description: title.description,
            genre: title.genres.into_iter().map(Into::into).collect(),
            category: title.category.map(Into::into),
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TitleListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
}

impl TitleListQuery {
    fn into_parts(self) -> (TitleFilter, PageRequest) {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let page = PageRequest::from_query(self.page, self.per_page);
        let filter = TitleFilter {
            category: non_empty(self.category),
            genre: non_empty(self.genre),
            name: non_empty(self.name),
            year: self.year,
        };
        (filter, page)
    }
}

fn update_usecase(
    state: &AppState,
) -> UpdateTitleUseCase<DbTitleRepository, DbCatalogRepository, DbCatalogRepository> {
    UpdateTitleUseCase {
        titles: state.title_repo(),
        categories: state.catalog_repo(CatalogKind::Category),
        genres: state.catalog_repo(CatalogKind::Genre),
    }
}

// ── GET /titles ──────────────────────────────────────────────────────────────

pub async fn list_titles(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<TitleResponse>>, ApiError> {
    let query: TitleListQuery = parse_query(raw_query.as_deref())?;
    let (filter, page) = query.into_parts();
    let usecase = ListTitlesUseCase {
        titles: state.title_repo(),
    };
    let titles = usecase.execute(filter, page).await?;
    Ok(Json(titles.into_iter().map(Into::into).collect()))
}

// ── POST /titles ─────────────────────────────────────────────────────────────

pub async fn create_title(
    actor: MaybeActor,
    State(state): State<AppState>,
    body: Result<ApiJson<TitleInput>, ApiError>,
) -> Result<(StatusCode, Json<TitleResponse>), ApiError> {
    actor.require(Capability::ManageCatalog)?;
    let ApiJson(body) = body?;
    let usecase = CreateTitleUseCase {
        titles: state.title_repo(),
        categories: state.catalog_repo(CatalogKind::Category),
        genres: state.catalog_repo(CatalogKind::Genre),
    };
    let title = usecase.execute(actor.0.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(title.into())))
}

// ── GET /titles/{title_id} ───────────────────────────────────────────────────

pub async fn get_title(
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<i32>,
) -> Result<Json<TitleResponse>, ApiError> {
    let usecase = GetTitleUseCase {
        titles: state.title_repo(),
    };
    let title = usecase.execute(title_id).await?;
    Ok(Json(title.into()))
}

// ── PUT /titles/{title_id} ───────────────────────────────────────────────────

pub async fn replace_title(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<i32>,
    body: Result<ApiJson<TitleInput>, ApiError>,
) -> Result<Json<TitleResponse>, ApiError> {
    actor.require(Capability::ManageCatalog)?;
    let ApiJson(body) = body?;
    let title = update_usecase(&state)
        .execute(actor.0.as_ref(), title_id, TitleUpdate::Replace(body))
        .await?;
    Ok(Json(title.into()))
}

// ── PATCH /titles/{title_id} ─────────────────────────────────────────────────

pub async fn patch_title(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<i32>,
    body: Result<ApiJson<TitlePatch>, ApiError>,
) -> Result<Json<TitleResponse>, ApiError> {
    actor.require(Capability::ManageCatalog)?;
    let ApiJson(body) = body?;
    let title = update_usecase(&state)
        .execute(actor.0.as_ref(), title_id, TitleUpdate::Patch(body))
        .await?;
    Ok(Json(title.into()))
}

// ── DELETE /titles/{title_id} ────────────────────────────────────────────────

pub async fn delete_title(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteTitleUseCase {
        titles: state.title_repo(),
    };
    usecase.execute(actor.0.as_ref(), title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
