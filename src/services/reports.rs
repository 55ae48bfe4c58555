//! CSV report rendering

use sqlx::Row;

use crate::{error::AppResult, repository::Repository};

/// Quote a CSV field when it contains a separator, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Most-borrowed books, all time
    pub async fn popular_books_csv(&self) -> AppResult<String> {
        let rows = sqlx::query(
            r#"
            SELECT k.title, COUNT(b.id) AS borrow_count
            FROM books k
            JOIN borrowings b ON b.book_id = k.id
            GROUP BY k.id, k.title
            ORDER BY borrow_count DESC, k.id
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        let mut out = String::from("Book Title,Borrow Count\n");
        for row in rows {
            let title: String = row.get("title");
            let count: i64 = row.get("borrow_count");
            out.push_str(&csv_row(&[&title, &count.to_string()]));
            out.push('\n');
        }

        Ok(out)
    }

    /// Borrow totals per school
    pub async fn school_borrows_csv(&self) -> AppResult<String> {
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

        let mut out = String::from("School,Total Borrows\n");
        for row in rows {
            let school: String = row.get("school");
            let count: i64 = row.get("borrow_count");
            out.push_str(&csv_row(&[&school, &count.to_string()]));
            out.push('\n');
        }

        Ok(out)
    }

    /// Full borrowing log with student and book context
    pub async fn borrowings_csv(&self) -> AppResult<String> {
        let rows = sqlx::query(
            r#"
            SELECT s.full_name, s.school, k.title, k.isbn,
                   b.borrow_date, b.due_date, b.return_date, b.status
            FROM borrowings b
            JOIN students s ON b.student_id = s.id
            JOIN books k ON b.book_id = k.id
            ORDER BY b.borrow_date DESC
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        let mut out =
            String::from("Student Name,Book Title,ISBN,Borrow Date,Due Date,Return Date,Status,School\n");
        for row in rows {
            let full_name: String = row.get("full_name");
            let school: String = row.get("school");
            let title: String = row.get("title");
            let isbn: Option<String> = row.get("isbn");
            let borrow_date: chrono::DateTime<chrono::Utc> = row.get("borrow_date");
            let due_date: chrono::DateTime<chrono::Utc> = row.get("due_date");
            let return_date: Option<chrono::DateTime<chrono::Utc>> = row.get("return_date");
            let status: String = row.get("status");

            let return_date = return_date
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "Not Returned".to_string());

            out.push_str(&csv_row(&[
                &full_name,
                &title,
                isbn.as_deref().unwrap_or(""),
                &borrow_date.format("%Y-%m-%d %H:%M:%S").to_string(),
                &due_date.format("%Y-%m-%d").to_string(),
                &return_date,
                &status,
                &school,
            ]));
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(csv_field("The Hobbit"), "The Hobbit");
        assert_eq!(csv_row(&["a", "b", "c"]), "a,b,c");
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        assert_eq!(
            csv_field("Tolkien, J. R. R."),
            "\"Tolkien, J. R. R.\""
        );
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(
            csv_row(&["a,b", "plain"]),
            "\"a,b\",plain"
        );
    }
}
