//! Borrowing lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrowing::{BorrowingDetails, BorrowingQuery, CreateBorrowing},
};

use super::{ApiJson, MessageResponse};

/// Borrowing list response
#[derive(Serialize, ToSchema)]
pub struct BorrowingListResponse {
    pub success: bool,
    pub count: usize,
    pub borrowings: Vec<BorrowingDetails>,
}

/// Single borrowing response
#[derive(Serialize, ToSchema)]
pub struct BorrowingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub borrowing: BorrowingDetails,
}

#[derive(Deserialize)]
pub struct DeleteBorrowingParams {
    pub force: Option<bool>,
}

/// List borrowings with optional filters
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    params(BorrowingQuery),
    responses(
        (status = 200, description = "List of borrowings", body = BorrowingListResponse)
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<BorrowingListResponse>> {
    let borrowings = state.services.circulation.list(&query).await?;

    Ok(Json(BorrowingListResponse {
        success: true,
        count: borrowings.len(),
        borrowings,
    }))
}

/// Get a specific borrowing by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "borrowings",
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Borrowing details", body = BorrowingResponse),
        (status = 404, description = "Borrowing not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingResponse>> {
    let borrowing = state.services.circulation.get_by_id(id).await?;

    Ok(Json(BorrowingResponse {
        success: true,
        message: None,
        borrowing,
    }))
}

/// Borrow a book (create a borrowing record)
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    request_body = CreateBorrowing,
    responses(
        (status = 201, description = "Borrowing created", body = BorrowingResponse),
        (status = 404, description = "Student or book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "No copies available", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<CreateBorrowing>,
) -> AppResult<(StatusCode, Json<BorrowingResponse>)> {
    let borrowing = state.services.circulation.borrow(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowingResponse {
            success: true,
            message: Some("Borrowing record created successfully".to_string()),
            borrowing,
        }),
    ))
}

/// Return a borrowed book. A second call for the same borrowing is a conflict.
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowingResponse),
        (status = 404, description = "Borrowing not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingResponse>> {
    let borrowing = state.services.circulation.return_borrowing(id).await?;

    Ok(Json(BorrowingResponse {
        success: true,
        message: Some("Book returned successfully".to_string()),
        borrowing,
    }))
}

/// Delete a borrowing record. Active borrowings are rejected unless
/// `force=true`, which puts the copy back without recording a return.
#[utoipa::path(
    delete,
    path = "/borrowings/{id}",
    tag = "borrowings",
    params(
        ("id" = i32, Path, description = "Borrowing ID"),
        ("force" = Option<bool>, Query, description = "Delete an active borrowing, releasing its copy")
    ),
    responses(
        (status = 200, description = "Borrowing deleted", body = MessageResponse),
        (status = 404, description = "Borrowing not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Borrowing still active", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteBorrowingParams>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .circulation
        .delete(id, params.force.unwrap_or(false))
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Borrowing record deleted successfully".to_string(),
    }))
}
