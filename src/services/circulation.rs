//! Circulation service: borrow, return and delete borrowings

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::borrowing::{BorrowingDetails, BorrowingQuery, CreateBorrowing},
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    config: LoansConfig,
}

impl CirculationService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// List borrowings with filters
    pub async fn list(&self, query: &BorrowingQuery) -> AppResult<Vec<BorrowingDetails>> {
        self.repository.borrowings.list(query).await
    }

    /// Get borrowing by ID with details
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowingDetails> {
        self.repository.borrowings.get_details_by_id(id).await
    }

    /// Borrow a book. The due date is fixed at creation and never recomputed.
    pub async fn borrow(&self, borrowing: CreateBorrowing) -> AppResult<BorrowingDetails> {
        let loan_days = borrowing.loan_days.unwrap_or(self.config.period_days);
        if loan_days <= 0 {
            return Err(AppError::Validation(
                "loan_days must be positive".to_string(),
            ));
        }

        self.repository.borrowings.create(&borrowing, loan_days).await
    }

    /// Return a borrowed book
    pub async fn return_borrowing(&self, id: i32) -> AppResult<BorrowingDetails> {
        self.repository.borrowings.return_borrowing(id).await
    }

    /// Delete a borrowing record
    pub async fn delete(&self, id: i32, force: bool) -> AppResult<()> {
        self.repository.borrowings.delete(id, force).await
    }
}
