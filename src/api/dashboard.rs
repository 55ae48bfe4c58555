//! Dashboard endpoint: the principal decides which view is rendered

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::Book, borrowing::BorrowingDetails},
};

use super::AuthenticatedUser;
use crate::api::stats::{MostBorrowedEntry, Statistics};

/// Admin dashboard: library-wide counters and recent activity
#[derive(Serialize, ToSchema)]
pub struct AdminDashboardResponse {
    pub success: bool,
    pub role: String,
    pub statistics: Statistics,
    pub recent_borrowings: Vec<BorrowingDetails>,
}

/// Student dashboard: what can be borrowed, what is out, what came back
#[derive(Serialize, ToSchema)]
pub struct StudentDashboardResponse {
    pub success: bool,
    pub role: String,
    pub available_books: Vec<Book>,
    pub borrowed: Vec<BorrowingDetails>,
    pub history: Vec<BorrowingDetails>,
    pub recommendations: Vec<MostBorrowedEntry>,
}

/// Get the dashboard for the current principal
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard data (admin or student shape)"),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Response> {
    if claims.is_admin {
        let statistics = state.services.stats.statistics().await?;
        let recent_borrowings = state.services.stats.recent_borrowings(10).await?;

        return Ok(Json(AdminDashboardResponse {
            success: true,
            role: "admin".to_string(),
            statistics,
            recent_borrowings,
        })
        .into_response());
    }

    let available_books = state
        .services
        .catalog
        .list_books(&crate::models::book::BookQuery {
            available_only: Some(true),
            ..Default::default()
        })
        .await?;

    let own = crate::models::borrowing::BorrowingQuery {
        student_id: Some(claims.student_id),
        status: Some(crate::models::borrowing::BorrowStatus::Borrowed),
        book_id: None,
    };
    let borrowed = state.services.circulation.list(&own).await?;

    let history = state
        .services
        .circulation
        .list(&crate::models::borrowing::BorrowingQuery {
            student_id: Some(claims.student_id),
            status: Some(crate::models::borrowing::BorrowStatus::Returned),
            book_id: None,
        })
        .await?;

    let recommendations = state.services.stats.most_borrowed(5).await?;

    Ok(Json(StudentDashboardResponse {
        success: true,
        role: "student".to_string(),
        available_books,
        borrowed,
        history,
        recommendations,
    })
    .into_response())
}
