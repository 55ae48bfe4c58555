//! Borrowings repository: the circulation core.
//!
//! Every mutating flow runs in a transaction. Availability checks are folded
//! into conditional UPDATEs so two racing requests can never both take the
//! last copy or both return the same borrowing.

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::borrowing::{BorrowingDetails, BorrowingQuery, BorrowStatus, CreateBorrowing},
};

const DETAILS_SELECT: &str = r#"
    SELECT b.id, b.student_id, s.full_name AS student_name,
           b.book_id, k.title AS book_title,
           b.borrow_date, b.due_date, b.return_date, b.status
    FROM borrowings b
    JOIN students s ON b.student_id = s.id
    JOIN books k ON b.book_id = k.id
"#;

fn details_from_row(row: &sqlx::postgres::PgRow) -> BorrowingDetails {
    let status: BorrowStatus = row.get("status");
    let due_date = row.get("due_date");

    BorrowingDetails {
        id: row.get("id"),
        student_id: row.get("student_id"),
        student_name: row.get("student_name"),
        book_id: row.get("book_id"),
        book_title: row.get("book_title"),
        borrow_date: row.get("borrow_date"),
        due_date,
        return_date: row.get("return_date"),
        status,
        is_overdue: status == BorrowStatus::Borrowed && due_date < Utc::now(),
    }
}

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrowing with student/book names
    pub async fn get_details_by_id(&self, id: i32) -> AppResult<BorrowingDetails> {
        let sql = format!("{} WHERE b.id = $1", DETAILS_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// List borrowings with optional filters, newest first
    pub async fn list(&self, query: &BorrowingQuery) -> AppResult<Vec<BorrowingDetails>> {
        let mut conditions = Vec::new();

        if let Some(status) = query.status {
            conditions.push(format!("b.status = '{}'", status.as_str()));
        }
        if let Some(student_id) = query.student_id {
            conditions.push(format!("b.student_id = {}", student_id));
        }
        if let Some(book_id) = query.book_id {
            conditions.push(format!("b.book_id = {}", book_id));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "{}{} ORDER BY b.borrow_date DESC",
            DETAILS_SELECT, where_clause
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Most recent borrowings (admin dashboard)
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<BorrowingDetails>> {
        let sql = format!("{} ORDER BY b.borrow_date DESC LIMIT $1", DETAILS_SELECT);
        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Create a new borrowing.
    ///
    /// The availability check and the decrement are a single conditional
    /// UPDATE: it only applies while copies remain, so concurrent requests for
    /// the last copy resolve to exactly one success.
    pub async fn create(
        &self,
        borrowing: &CreateBorrowing,
        loan_days: i64,
    ) -> AppResult<BorrowingDetails> {
        let now = Utc::now();
        let due_date = now + Duration::days(loan_days);

        let mut tx = self.pool.begin().await?;

        let student_name: String =
            sqlx::query_scalar("SELECT full_name FROM students WHERE id = $1")
                .bind(borrowing.student_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Student with id {} not found",
                        borrowing.student_id
                    ))
                })?;

        let book_title: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE books
            SET available_quantity = available_quantity - 1
            WHERE id = $1 AND available_quantity > 0
            RETURNING title
            "#,
        )
        .bind(borrowing.book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let book_title = match book_title {
            Some(title) => title,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                        .bind(borrowing.book_id)
                        .fetch_one(&mut *tx)
                        .await?;

                return Err(if exists {
                    AppError::Conflict("No copies available for this book".to_string())
                } else {
                    AppError::NotFound(format!("Book with id {} not found", borrowing.book_id))
                });
            }
        };

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO borrowings (student_id, book_id, borrow_date, due_date, status)
            VALUES ($1, $2, $3, $4, 'borrowed')
            RETURNING id
            "#,
        )
        .bind(borrowing.student_id)
        .bind(borrowing.book_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BorrowingDetails {
            id,
            student_id: borrowing.student_id,
            student_name,
            book_id: borrowing.book_id,
            book_title,
            borrow_date: now,
            due_date,
            return_date: None,
            status: BorrowStatus::Borrowed,
            is_overdue: false,
        })
    }

    /// Return a borrowing. The status flip is conditional on the row still
    /// being active, which makes a second return a clean conflict instead of a
    /// double increment.
    pub async fn return_borrowing(&self, id: i32) -> AppResult<BorrowingDetails> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let book_id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE borrowings
            SET status = 'returned', return_date = $2
            WHERE id = $1 AND status = 'borrowed'
            RETURNING book_id
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let book_id = match book_id {
            Some(book_id) => book_id,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrowings WHERE id = $1)")
                        .bind(id)
                        .fetch_one(&mut *tx)
                        .await?;

                return Err(if exists {
                    AppError::Conflict("Book has already been returned".to_string())
                } else {
                    AppError::NotFound(format!("Borrowing with id {} not found", id))
                });
            }
        };

        sqlx::query("UPDATE books SET available_quantity = available_quantity + 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_details_by_id(id).await
    }

    /// Delete a borrowing. An active borrowing is rejected unless `force` is
    /// set, in which case the copy is put back in circulation without a
    /// recorded return.
    pub async fn delete(&self, id: i32, force: bool) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT book_id, status FROM borrowings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        let book_id: i32 = row.get("book_id");
        let status: BorrowStatus = row.get("status");

        if status == BorrowStatus::Borrowed {
            if !force {
                return Err(AppError::Conflict(
                    "Cannot delete an active borrowing; return it first or pass force=true"
                        .to_string(),
                ));
            }

            sqlx::query(
                "UPDATE books SET available_quantity = available_quantity + 1 WHERE id = $1",
            )
            .bind(book_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM borrowings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Count active borrowings
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrowings WHERE status = 'borrowed'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count overdue borrowings
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE status = 'borrowed' AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
