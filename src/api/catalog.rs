//! External catalog search and import endpoints (admin)

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    services::openlibrary::{CatalogSearchResult, ImportOutcome},
};

use super::{ApiJson, AuthenticatedUser};

/// Query parameters for catalog search
#[derive(Deserialize, IntoParams)]
pub struct CatalogSearchQuery {
    /// Free-text query
    pub q: String,
}

/// Catalog search response
#[derive(Serialize, ToSchema)]
pub struct CatalogSearchResponse {
    pub success: bool,
    pub query: String,
    pub count: usize,
    pub results: Vec<CatalogSearchResult>,
    /// External-service failures are reported here, not as errors
    pub warnings: Vec<String>,
}

/// Import request
#[derive(Deserialize, ToSchema)]
pub struct CatalogImportRequest {
    /// Open Library record key, e.g. "/works/OL262758W"
    pub key: String,
}

/// Import response
#[derive(Serialize, ToSchema)]
pub struct CatalogImportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ImportOutcome,
}

/// Search the external catalog
#[utoipa::path(
    get,
    path = "/catalog/search",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(CatalogSearchQuery),
    responses(
        (status = 200, description = "Search results (failures surface as warnings)", body = CatalogSearchResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn search(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<CatalogSearchQuery>,
) -> AppResult<Json<CatalogSearchResponse>> {
    let (results, warnings) = state.services.openlibrary.search(&query.q).await;

    Ok(Json(CatalogSearchResponse {
        success: true,
        query: query.q,
        count: results.len(),
        results,
        warnings,
    }))
}

/// Import a book from the external catalog
#[utoipa::path(
    post,
    path = "/catalog/import",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CatalogImportRequest,
    responses(
        (status = 200, description = "Import outcome (failures surface as warnings)", body = CatalogImportResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse)
    )
)]
pub async fn import_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CatalogImportRequest>,
) -> AppResult<Json<CatalogImportResponse>> {
    claims.require_admin()?;

    let outcome = state.services.openlibrary.import(&request.key).await?;

    Ok(Json(CatalogImportResponse {
        success: true,
        outcome,
    }))
}
