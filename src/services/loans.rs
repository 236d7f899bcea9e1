//! Borrowing workflow: loan listings, renewal and return

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::book_instance::{
        today, BookInstanceDetails, LoanStatus, RenewBookForm, RenewalFormView,
    },
    repository::Repository,
};

/// Result of a renewal submission
#[derive(Debug, Clone)]
pub enum RenewalOutcome {
    /// Due date moved; the copy as now stored
    Renewed(BookInstanceDetails),
    /// Form rejected; re-render it with the errors
    Invalid(RenewalFormView),
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Copies currently on loan to `user_id`, earliest due first
    pub async fn borrowed_by(&self, user_id: i64) -> AppResult<Vec<BookInstanceDetails>> {
        self.repository
            .book_instances
            .list_on_loan_for_borrower(user_id)
            .await
    }

    /// Every copy currently on loan, earliest due first
    pub async fn all_on_loan(&self) -> AppResult<Vec<BookInstanceDetails>> {
        self.repository.book_instances.list_on_loan().await
    }

    pub fn proposed_renewal_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.config.default_renewal_days)
    }

    /// Initial render of the renewal form
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<RenewalFormView> {
        let book_instance = self.repository.book_instances.get_by_id(id).await?;
        Ok(RenewalFormView {
            book_instance,
            renewal_date: Some(self.proposed_renewal_date(today()).format("%Y-%m-%d").to_string()),
            errors: Default::default(),
        })
    }

    /// Validate a submitted renewal and move the due date when it passes
    pub async fn renew(&self, id: Uuid, form: RenewBookForm) -> AppResult<RenewalOutcome> {
        let book_instance = self.repository.book_instances.get_by_id(id).await?;

        match form.clean(today(), self.config.max_renewal_days) {
            Ok(renewal_date) => {
                self.repository
                    .book_instances
                    .set_due_back(id, renewal_date)
                    .await?;
                tracing::info!("Loan renewed: book instance {} due back {}", id, renewal_date);
                let renewed = self.repository.book_instances.get_by_id(id).await?;
                Ok(RenewalOutcome::Renewed(renewed))
            }
            Err(errors) => {
                tracing::debug!("Renewal rejected for book instance {}: {:?}", id, errors);
                Ok(RenewalOutcome::Invalid(RenewalFormView {
                    book_instance,
                    renewal_date: form.renewal_date,
                    errors,
                }))
            }
        }
    }

    /// Mark a copy on loan as returned: available again, no borrower, no due date
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        let details = self.repository.book_instances.get_by_id(id).await?;
        if details.status != LoanStatus::OnLoan {
            return Err(AppError::Conflict(format!(
                "Book instance {} is not on loan (status: {})",
                id, details.status
            )));
        }

        let mut instance = details.instance();
        instance.status = LoanStatus::Available;
        instance.due_back = None;
        instance.borrower_id = None;

        let returned = self.repository.book_instances.update(&instance).await?;
        tracing::info!("Loan returned: book instance {}", id);
        Ok(returned)
    }
}
