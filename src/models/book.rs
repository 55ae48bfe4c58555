//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    /// ISBN; absent for records imported without one
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    /// Total copies owned
    pub quantity: i32,
    /// Copies not currently lent
    pub available_quantity: i32,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 32, message = "isbn must be 1-32 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: String,
    pub genre: Option<String>,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
}

/// Update book request. ISBN is immutable; availability is recomputed from the
/// live borrowed count whenever `quantity` changes.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: Option<String>,
    pub genre: Option<String>,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i32>,
}

/// Query parameters for listing books
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Only books with available copies
    pub available_only: Option<bool>,
    /// Exact genre match
    pub genre: Option<String>,
    /// Substring match on title or author
    pub search: Option<String>,
    /// Sort order: "title" (default) or "genre"
    pub sort: Option<String>,
}
