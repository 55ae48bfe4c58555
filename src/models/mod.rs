//! Data models

pub mod book;
pub mod borrowing;
pub mod student;

pub use book::{Book, BookQuery, CreateBook, UpdateBook};
pub use borrowing::{BorrowingDetails, BorrowingQuery, BorrowStatus, CreateBorrowing};
pub use student::{CreateStudent, Student, StudentClaims, UpdateStudent};
