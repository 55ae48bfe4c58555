//! Sample data population for first run

use sqlx::{Pool, Postgres};

use crate::{
    config::SeedConfig,
    error::AppResult,
    models::{book::CreateBook, borrowing::CreateBorrowing, student::CreateStudent},
    services::Services,
};

/// Populate sample rows when the database is empty. A database with any
/// existing book or student is left untouched.
pub async fn run_if_empty(
    pool: &Pool<Postgres>,
    services: &Services,
    config: &SeedConfig,
) -> AppResult<()> {
    let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await?;
    let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await?;

    if books > 0 || students > 0 {
        return Ok(());
    }

    tracing::info!("Empty database, populating sample data");

    services
        .students
        .create_student(
            CreateStudent {
                email: config.admin_email.clone(),
                full_name: "Library Admin".to_string(),
                class_name: "Staff".to_string(),
                school: "Central High School".to_string(),
                contact: None,
                password: Some(config.admin_password.clone()),
            },
            true,
        )
        .await?;

    let sample_books = [
        ("9780261103344", "The Hobbit", "J. R. R. Tolkien", "Fantasy", 3),
        ("9780141439518", "Pride and Prejudice", "Jane Austen", "Classic", 2),
        ("9780451524935", "1984", "George Orwell", "Dystopia", 4),
        ("9780061120084", "To Kill a Mockingbird", "Harper Lee", "Classic", 2),
        ("9780140449136", "Crime and Punishment", "Fyodor Dostoevsky", "Classic", 1),
        ("9780747532699", "Harry Potter and the Philosopher's Stone", "J. K. Rowling", "Fantasy", 5),
    ];

    let mut book_ids = Vec::new();
    for (isbn, title, author, genre, quantity) in sample_books {
        let book = services
            .catalog
            .create_book(CreateBook {
                isbn: isbn.to_string(),
                title: title.to_string(),
                author: author.to_string(),
                genre: Some(genre.to_string()),
                quantity,
            })
            .await?;
        book_ids.push(book.id);
    }

    let sample_students = [
        ("alice@students.example", "Alice Johnson", "10A", "Central High School"),
        ("bruno@students.example", "Bruno Martins", "10B", "Central High School"),
        ("chloe@students.example", "Chloe Dubois", "9C", "Riverside Academy"),
    ];

    let mut student_ids = Vec::new();
    for (email, full_name, class_name, school) in sample_students {
        let student = services
            .students
            .create_student(
                CreateStudent {
                    email: email.to_string(),
                    full_name: full_name.to_string(),
                    class_name: class_name.to_string(),
                    school: school.to_string(),
                    contact: None,
                    password: Some("password".to_string()),
                },
                false,
            )
            .await?;
        student_ids.push(student.id);
    }

    // A few open loans so the dashboards have something to show
    for (student_idx, book_idx) in [(0, 0), (1, 2), (2, 5)] {
        services
            .circulation
            .borrow(CreateBorrowing {
                student_id: student_ids[student_idx],
                book_id: book_ids[book_idx],
                loan_days: None,
            })
            .await?;
    }

    tracing::info!(
        "Seeded {} books, {} students and 3 borrowings",
        sample_books.len(),
        sample_students.len() + 1
    );

    Ok(())
}
