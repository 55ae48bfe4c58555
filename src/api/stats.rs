//! Statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

/// Library-wide counters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Statistics {
    /// Distinct titles in the catalog
    pub total_books: i64,
    /// Sum of copies owned across all titles
    pub total_copies: i64,
    /// Titles with at least one available copy
    pub available_books: i64,
    pub total_students: i64,
    pub active_borrowings: i64,
    /// Active borrowings past their due date
    pub overdue_books: i64,
}

/// One entry of the most-borrowed ranking
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MostBorrowedEntry {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub borrow_count: i64,
}

/// Borrow totals for one school
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SchoolBorrowsEntry {
    pub school: String,
    pub borrow_count: i64,
}

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatisticsResponse {
    pub success: bool,
    pub statistics: Statistics,
}

/// Get library statistics
#[utoipa::path(
    get,
    path = "/statistics",
    tag = "stats",
    responses(
        (status = 200, description = "Library statistics", body = StatisticsResponse)
    )
)]
pub async fn get_statistics(
    State(state): State<crate::AppState>,
) -> AppResult<Json<StatisticsResponse>> {
    let statistics = state.services.stats.statistics().await?;

    Ok(Json(StatisticsResponse {
        success: true,
        statistics,
    }))
}
