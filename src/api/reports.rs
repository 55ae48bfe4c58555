//! CSV export endpoints (admin)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::Response,
};

use crate::error::{AppError, AppResult};

use super::AuthenticatedUser;

fn csv_attachment(filename: &str, body: String) -> AppResult<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", filename),
        )
        .body(body.into())
        .map_err(|e| AppError::Internal(format!("Failed to build CSV response: {}", e)))
}

/// Most-borrowed books report
#[utoipa::path(
    get,
    path = "/reports/popular-books.csv",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse)
    )
)]
pub async fn export_popular_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Response> {
    claims.require_admin()?;

    let csv = state.services.reports.popular_books_csv().await?;
    csv_attachment("popular_books_report.csv", csv)
}

/// Borrow totals per school report
#[utoipa::path(
    get,
    path = "/reports/school-borrows.csv",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse)
    )
)]
pub async fn export_school_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Response> {
    claims.require_admin()?;

    let csv = state.services.reports.school_borrows_csv().await?;
    csv_attachment("school_books_report.csv", csv)
}

/// Full borrowing log report
#[utoipa::path(
    get,
    path = "/reports/borrowings.csv",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse)
    )
)]
pub async fn export_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Response> {
    claims.require_admin()?;

    let csv = state.services.reports.borrowings_csv().await?;
    csv_attachment("all_borrowings_report.csv", csv)
}
