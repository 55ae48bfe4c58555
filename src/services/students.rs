//! Student accounts service: management, credentials and token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student, StudentClaims, StudentRow, UpdateStudent},
    repository::Repository,
};

#[derive(Clone)]
pub struct StudentsService {
    repository: Repository,
    config: AuthConfig,
}

impl StudentsService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password, returning a JWT token and the
    /// student
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, Student)> {
        let row = self
            .repository
            .students
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&row, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token(&row)?;
        Ok((token, row.into()))
    }

    /// Create a JWT token for a student
    fn create_token(&self, student: &StudentRow) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = StudentClaims {
            sub: student.email.clone(),
            student_id: student.id,
            is_admin: student.is_admin,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a student's password
    fn verify_password(&self, student: &StudentRow, password: &str) -> AppResult<bool> {
        if let Some(ref hash) = student.password_hash {
            let parsed_hash = PasswordHash::new(hash)
                .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok());
        }

        Ok(false)
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Self-service signup: a non-admin account with a required password
    pub async fn signup(&self, mut student: CreateStudent) -> AppResult<Student> {
        let password = student
            .password
            .take()
            .ok_or_else(|| AppError::Validation("password is required".to_string()))?;

        if self
            .repository
            .students
            .email_exists(&student.email, None)
            .await?
        {
            return Err(AppError::Conflict(
                "A student with this email already exists".to_string(),
            ));
        }

        let hash = self.hash_password(&password)?;
        self.repository
            .students
            .create(&student, Some(hash), false)
            .await
    }

    /// Get student by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Student> {
        self.repository.students.get_by_id(id).await
    }

    /// List all students
    pub async fn list(&self) -> AppResult<Vec<Student>> {
        self.repository.students.list().await
    }

    /// Create a new student (admin path; password optional)
    pub async fn create_student(
        &self,
        mut student: CreateStudent,
        is_admin: bool,
    ) -> AppResult<Student> {
        if self
            .repository
            .students
            .email_exists(&student.email, None)
            .await?
        {
            return Err(AppError::Conflict(
                "A student with this email already exists".to_string(),
            ));
        }

        let password_hash = match student.password.take() {
            Some(ref password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository
            .students
            .create(&student, password_hash, is_admin)
            .await
    }

    /// Update an existing student
    pub async fn update_student(&self, id: i32, update: UpdateStudent) -> AppResult<Student> {
        self.repository.students.update(id, &update).await
    }

    /// Delete a student (blocked while active borrowings exist)
    pub async fn delete_student(&self, id: i32) -> AppResult<()> {
        self.repository.students.delete(id).await
    }
}
