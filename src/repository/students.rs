//! Students repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student, StudentRow, UpdateStudent},
};

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Postgres>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get student by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Student> {
        let row = sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Get student by email, including the credential hash (authentication)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<StudentRow>> {
        let row = sqlx::query_as::<_, StudentRow>(
            "SELECT * FROM students WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM students WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM students WHERE LOWER(email) = LOWER($1))",
            )
            .bind(email)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// List all students
    pub async fn list(&self) -> AppResult<Vec<Student>> {
        let rows = sqlx::query_as::<_, StudentRow>("SELECT * FROM students ORDER BY full_name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    /// Create a new student
    pub async fn create(
        &self,
        student: &CreateStudent,
        password_hash: Option<String>,
        is_admin: bool,
    ) -> AppResult<Student> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            INSERT INTO students (email, password_hash, full_name, class_name, school, contact, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&student.email)
        .bind(password_hash)
        .bind(&student.full_name)
        .bind(&student.class_name)
        .bind(&student.school)
        .bind(&student.contact)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update an existing student
    pub async fn update(&self, id: i32, update: &UpdateStudent) -> AppResult<Student> {
        let current = sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))?;

        let full_name = update.full_name.as_ref().unwrap_or(&current.full_name);
        let class_name = update.class_name.as_ref().unwrap_or(&current.class_name);
        let school = update.school.as_ref().unwrap_or(&current.school);
        let contact = update.contact.as_ref().or(current.contact.as_ref());

        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            UPDATE students
            SET full_name = $2, class_name = $3, school = $4, contact = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(class_name)
        .bind(school)
        .bind(contact)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete a student. Blocked while the student has an active borrowing;
    /// returned history rows are removed along with the account.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if !exists {
            return Err(AppError::NotFound(format!(
                "Student with id {} not found",
                id
            )));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE student_id = $1 AND status = 'borrowed'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if active > 0 {
            return Err(AppError::Conflict(
                "Cannot delete student with active borrowings".to_string(),
            ));
        }

        sqlx::query("DELETE FROM borrowings WHERE student_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
