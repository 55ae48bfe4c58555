//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student},
};

use super::{ApiJson, AuthenticatedUser};

/// Signup request
#[derive(Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "full_name must be 1-100 characters"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 50, message = "class_name must be 1-50 characters"))]
    pub class_name: String,
    #[validate(length(min = 1, max = 100, message = "school must be 1-100 characters"))]
    pub school: String,
    pub contact: Option<String>,
}

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub token_type: String,
    pub student: Student,
}

/// Current principal response
#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub success: bool,
    pub student: Student,
}

/// Signup response
#[derive(Serialize, ToSchema)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub student: Student,
}

/// Create a student account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let student = CreateStudent {
        email: request.email,
        full_name: request.full_name,
        class_name: request.class_name,
        school: request.school,
        contact: request.contact,
        password: Some(request.password),
    };

    let created = state.services.students.signup(student).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "Account created successfully! Please log in.".to_string(),
            student: created,
        }),
    ))
}

/// Authenticate and receive a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, student) = state
        .services
        .students
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        token_type: "Bearer".to_string(),
        student,
    }))
}

/// Get the current authenticated student
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current student", body = MeResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<MeResponse>> {
    let student = state.services.students.get_by_id(claims.student_id).await?;

    Ok(Json(MeResponse {
        success: true,
        student,
    }))
}
