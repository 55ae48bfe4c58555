//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books with optional filters
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if query.available_only.unwrap_or(false) {
            conditions.push("available_quantity > 0".to_string());
        }
        if let Some(ref genre) = query.genre {
            params.push(genre.clone());
            conditions.push(format!("genre = ${}", params.len()));
        }
        if let Some(ref search) = query.search {
            params.push(format!("%{}%", search));
            conditions.push(format!(
                "(title ILIKE ${n} OR author ILIKE ${n})",
                n = params.len()
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let order_by = match query.sort.as_deref() {
            Some("genre") => "genre, title",
            _ => "title",
        };

        let sql = format!("SELECT * FROM books{} ORDER BY {}", where_clause, order_by);

        let mut q = sqlx::query_as::<_, Book>(&sql);
        for param in &params {
            q = q.bind(param);
        }

        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Check if ISBN already exists
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Find a book by its (title, author) pair, used by catalog import dedup
    pub async fn find_by_title_author(&self, title: &str, author: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE title = $1 AND author = $2",
        )
        .bind(title)
        .bind(author)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Create a new book. All copies start available.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, author, genre, quantity, available_quantity)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(book.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Create a book imported from the external catalog (single copy, ISBN may
    /// be absent)
    pub async fn create_imported(
        &self,
        isbn: Option<&str>,
        title: &str,
        author: &str,
        genre: Option<&str>,
    ) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, author, genre, quantity, available_quantity)
            VALUES ($1, $2, $3, $4, 1, 1)
            RETURNING *
            "#,
        )
        .bind(isbn)
        .bind(title)
        .bind(author)
        .bind(genre)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book. A quantity change recomputes `available_quantity` from a
    /// live count of borrowed rows so the stored counter cannot drift; an edit
    /// that would leave fewer copies than are currently lent is rejected.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let title = update.title.as_ref().unwrap_or(&current.title);
        let author = update.author.as_ref().unwrap_or(&current.author);
        let genre = update.genre.as_ref().or(current.genre.as_ref());
        let quantity = update.quantity.unwrap_or(current.quantity);

        let available_quantity = if quantity == current.quantity {
            current.available_quantity
        } else {
            let borrowed: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM borrowings WHERE book_id = $1 AND status = 'borrowed'",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if (quantity as i64) < borrowed {
                return Err(AppError::Conflict(format!(
                    "Cannot set quantity to {}: {} copies are currently borrowed",
                    quantity, borrowed
                )));
            }

            quantity - borrowed as i32
        };

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author = $3, genre = $4, quantity = $5, available_quantity = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(author)
        .bind(genre)
        .bind(quantity)
        .bind(available_quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a book. Blocked while any borrowing of it is still active;
    /// returned history rows are removed along with the book.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if !exists {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE book_id = $1 AND status = 'borrowed'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if active > 0 {
            return Err(AppError::Conflict(
                "Cannot delete book with active borrowings".to_string(),
            ));
        }

        sqlx::query("DELETE FROM borrowings WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
