//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrowings, catalog, dashboard, health, reports, stats, students};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Schoolib API",
        version = "0.1.0",
        description = "School library management REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::signup,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Students
        students::list_students,
        students::get_student,
        students::create_student,
        students::update_student,
        students::delete_student,
        // Borrowings
        borrowings::list_borrowings,
        borrowings::get_borrowing,
        borrowings::create_borrowing,
        borrowings::return_borrowing,
        borrowings::delete_borrowing,
        // Statistics
        stats::get_statistics,
        // Dashboard
        dashboard::get_dashboard,
        // Catalog
        catalog::search,
        catalog::import_book,
        // Reports
        reports::export_popular_books,
        reports::export_school_borrows,
        reports::export_borrowings,
    ),
    components(
        schemas(
            // Auth
            auth::SignupRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SignupResponse,
            auth::MeResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::BookListResponse,
            books::BookResponse,
            // Students
            crate::models::student::Student,
            crate::models::student::CreateStudent,
            crate::models::student::UpdateStudent,
            students::StudentListResponse,
            students::StudentResponse,
            // Borrowings
            crate::models::borrowing::BorrowStatus,
            crate::models::borrowing::BorrowingDetails,
            crate::models::borrowing::CreateBorrowing,
            borrowings::BorrowingListResponse,
            borrowings::BorrowingResponse,
            // Statistics
            stats::Statistics,
            stats::StatisticsResponse,
            stats::MostBorrowedEntry,
            stats::SchoolBorrowsEntry,
            // Dashboard
            dashboard::AdminDashboardResponse,
            dashboard::StudentDashboardResponse,
            // Catalog
            crate::services::openlibrary::CatalogSearchResult,
            crate::services::openlibrary::ImportAction,
            crate::services::openlibrary::ImportOutcome,
            catalog::CatalogSearchResponse,
            catalog::CatalogImportRequest,
            catalog::CatalogImportResponse,
            // Health
            health::HealthResponse,
            // Shared
            crate::api::MessageResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "students", description = "Student record management"),
        (name = "borrowings", description = "Borrowing lifecycle"),
        (name = "stats", description = "Statistics"),
        (name = "dashboard", description = "Dashboards"),
        (name = "catalog", description = "External catalog search and import"),
        (name = "reports", description = "CSV report exports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
