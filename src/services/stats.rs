//! Statistics service

use sqlx::Row;

use crate::{
    api::stats::{MostBorrowedEntry, SchoolBorrowsEntry, Statistics},
    error::AppResult,
    models::borrowing::BorrowingDetails,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Library-wide counters, recomputed per request from the live tables
    pub async fn statistics(&self) -> AppResult<Statistics> {
        let pool = &self.repository.pool;

        let total_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;

        let total_copies: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM books")
            .fetch_one(pool)
            .await?;

        let available_books: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE available_quantity > 0")
                .fetch_one(pool)
                .await?;

        let total_students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(pool)
            .await?;

        let active_borrowings = self.repository.borrowings.count_active().await?;
        let overdue_books = self.repository.borrowings.count_overdue().await?;

        Ok(Statistics {
            total_books,
            total_copies,
            available_books,
            total_students,
            active_borrowings,
            overdue_books,
        })
    }

    /// Books ranked by all-time borrow count, descending
    pub async fn most_borrowed(&self, limit: i64) -> AppResult<Vec<MostBorrowedEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT k.id AS book_id, k.title, k.author, COUNT(b.id) AS borrow_count
            FROM books k
            JOIN borrowings b ON b.book_id = k.id
            GROUP BY k.id, k.title, k.author
            ORDER BY borrow_count DESC, k.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MostBorrowedEntry {
                book_id: row.get("book_id"),
                title: row.get("title"),
                author: row.get("author"),
                borrow_count: row.get("borrow_count"),
            })
            .collect())
    }

    /// Borrow totals grouped by the borrowing student's school
    pub async fn borrows_per_school(&self) -> AppResult<Vec<SchoolBorrowsEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT s.school, COUNT(b.id) AS borrow_count
            FROM students s
            JOIN borrowings b ON b.student_id = s.id
            GROUP BY s.school
            ORDER BY borrow_count DESC, s.school
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SchoolBorrowsEntry {
                school: row.get("school"),
                borrow_count: row.get("borrow_count"),
            })
            .collect())
    }

    /// Most recent borrowings (admin dashboard)
    pub async fn recent_borrowings(&self, limit: i64) -> AppResult<Vec<BorrowingDetails>> {
        self.repository.borrowings.recent(limit).await
    }
}
