use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use serde::Serialize;

use yamdb_domain::permission::Capability;

use crate::domain::types::{CatalogEntry, CatalogKind};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, MaybeActor};
use crate::handlers::{ListQuery, parse_query};
use crate::state::AppState;
use crate::usecase::catalog::{
    CatalogEntryInput, CreateCatalogEntryUseCase, DeleteCatalogEntryUseCase, ListCatalogUseCase,
};

/// Category or genre as rendered to clients, also nested inside titles.
#[derive(Debug, Serialize)]
pub struct CatalogEntryResponse {
    pub name: String,
    pub slug: String,
}

impl From<CatalogEntry> for CatalogEntryResponse {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            name: entry.name,
            slug: entry.slug,
        }
    }
}

async fn list(
    state: &AppState,
    kind: CatalogKind,
    raw_query: Option<String>,
) -> Result<Json<Vec<CatalogEntryResponse>>, ApiError> {
    let query: ListQuery = parse_query(raw_query.as_deref())?;
    let usecase = ListCatalogUseCase {
        entries: state.catalog_repo(kind),
    };
    let entries = usecase
        .execute(query.search.as_deref(), query.page_request())
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

async fn create(
    state: &AppState,
    kind: CatalogKind,
    actor: MaybeActor,
    body: CatalogEntryInput,
) -> Result<(StatusCode, Json<CatalogEntryResponse>), ApiError> {
    let usecase = CreateCatalogEntryUseCase {
        entries: state.catalog_repo(kind),
    };
    let entry = usecase.execute(actor.0.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

async fn delete(
    state: &AppState,
    kind: CatalogKind,
    actor: MaybeActor,
    slug: &str,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteCatalogEntryUseCase {
        entries: state.catalog_repo(kind),
        kind,
    };
    usecase.execute(actor.0.as_ref(), slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── /categories ──────────────────────────────────────────────────────────────

pub async fn list_categories(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<CatalogEntryResponse>>, ApiError> {
    list(&state, CatalogKind::Category, raw_query).await
}

pub async fn create_category(
    actor: MaybeActor,
    State(state): State<AppState>,
    body: Result<ApiJson<CatalogEntryInput>, ApiError>,
) -> Result<(StatusCode, Json<CatalogEntryResponse>), ApiError> {
    actor.require(Capability::ManageCatalog)?;
    let ApiJson(body) = body?;
    create(&state, CatalogKind::Category, actor, body).await
}

pub async fn delete_category(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    delete(&state, CatalogKind::Category, actor, &slug).await
}

// ── /genres ──────────────────────────────────────────────────────────────────

pub async fn list_genres(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<CatalogEntryResponse>>, ApiError> {
    list(&state, CatalogKind::Genre, raw_query).await
}

pub async fn create_genre(
    actor: MaybeActor,
    State(state): State<AppState>,
    body: Result<ApiJson<CatalogEntryInput>, ApiError>,
) -> Result<(StatusCode, Json<CatalogEntryResponse>), ApiError> {
    actor.require(Capability::ManageCatalog)?;
    let ApiJson(body) = body?;
    create(&state, CatalogKind::Genre, actor, body).await
}

pub async fn delete_genre(
    actor: MaybeActor,
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    delete(&state, CatalogKind::Genre, actor, &slug).await
}
