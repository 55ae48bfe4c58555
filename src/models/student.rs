//! Student model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Internal row structure for database queries (carries the credential hash)
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: i32,
    pub email: String,
    pub password_hash: Option<String>,
    pub full_name: String,
    pub class_name: String,
    pub school: String,
    pub contact: Option<String>,
    pub is_admin: bool,
}

/// Student as exposed by the API (never serializes the credential)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Student {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub class_name: String,
    pub school: String,
    pub contact: Option<String>,
    pub is_admin: bool,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            class_name: row.class_name,
            school: row.school,
            contact: row.contact,
            is_admin: row.is_admin,
        }
    }
}

/// Create student request (admin creation; password optional until the
/// student signs in for the first time)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudent {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "full_name must be 1-100 characters"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 50, message = "class_name must be 1-50 characters"))]
    pub class_name: String,
    #[validate(length(min = 1, max = 100, message = "school must be 1-100 characters"))]
    pub school: String,
    pub contact: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Update student request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudent {
    #[validate(length(min = 1, max = 100, message = "full_name must be 1-100 characters"))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "class_name must be 1-50 characters"))]
    pub class_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "school must be 1-100 characters"))]
    pub school: Option<String>,
    pub contact: Option<String>,
}

/// JWT claims for authenticated students
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentClaims {
    /// Email of the authenticated student
    pub sub: String,
    pub student_id: i32,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl StudentClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(is_admin: bool) -> StudentClaims {
        StudentClaims {
            sub: "alice@example.org".to_string(),
            student_id: 7,
            is_admin,
            iat: 1_700_000_000,
            // far in the future so Validation's expiry check passes
            exp: 4_102_444_800,
        }
    }

    #[test]
    fn token_round_trip() {
        let original = claims(true);
        let token = original.create_token("test-secret").unwrap();
        let parsed = StudentClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(parsed.sub, original.sub);
        assert_eq!(parsed.student_id, original.student_id);
        assert!(parsed.is_admin);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let token = claims(false).create_token("test-secret").unwrap();
        assert!(StudentClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn require_admin_gates_non_admins() {
        assert!(claims(true).require_admin().is_ok());
        assert!(claims(false).require_admin().is_err());
    }
}
