//! Student record endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student, UpdateStudent},
};

use super::{ApiJson, MessageResponse};

/// Student list response
#[derive(Serialize, ToSchema)]
pub struct StudentListResponse {
    pub success: bool,
    pub count: usize,
    pub students: Vec<Student>,
}

/// Single student response
#[derive(Serialize, ToSchema)]
pub struct StudentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub student: Student,
}

/// List all students
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    responses(
        (status = 200, description = "List of students", body = StudentListResponse)
    )
)]
pub async fn list_students(
    State(state): State<crate::AppState>,
) -> AppResult<Json<StudentListResponse>> {
    let students = state.services.students.list().await?;

    Ok(Json(StudentListResponse {
        success: true,
        count: students.len(),
        students,
    }))
}

/// Get a specific student by ID
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student details", body = StudentResponse),
        (status = 404, description = "Student not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_student(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<StudentResponse>> {
    let student = state.services.students.get_by_id(id).await?;

    Ok(Json(StudentResponse {
        success: true,
        message: None,
        student,
    }))
}

/// Create a new student
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Duplicate email", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_student(
    State(state): State<crate::AppState>,
    ApiJson(student): ApiJson<CreateStudent>,
) -> AppResult<(StatusCode, Json<StudentResponse>)> {
    student
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.students.create_student(student, false).await?;

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse {
            success: true,
            message: Some("Student created successfully".to_string()),
            student: created,
        }),
    ))
}

/// Update an existing student
#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "students",
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 404, description = "Student not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_student(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    ApiJson(update): ApiJson<UpdateStudent>,
) -> AppResult<Json<StudentResponse>> {
    update
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state.services.students.update_student(id, update).await?;

    Ok(Json(StudentResponse {
        success: true,
        message: Some("Student updated successfully".to_string()),
        student: updated,
    }))
}

/// Delete a student
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "students",
    params(
        ("id" = i32, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 404, description = "Student not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Student has active borrowings", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_student(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.students.delete_student(id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Student deleted successfully".to_string(),
    }))
}
