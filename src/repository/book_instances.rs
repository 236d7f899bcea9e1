//! Book instances repository

use chrono::NaiveDate;
use sqlx::{Pool, QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        BookInstance, BookInstanceDetails, BookInstanceQuery, BookInstanceRow, LoanStatus,
    },
};

const INSTANCE_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, bi.borrower_id,
           b.title AS book_title, u.username AS borrower_username
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

/// Default ordering: by due date, undated copies last
const ORDER_BY_DUE_BACK: &str = " ORDER BY bi.due_back IS NULL, bi.due_back, bi.imprint";

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Sqlite>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List copies, optionally filtered by status and book
    pub async fn list(&self, query: &BookInstanceQuery) -> AppResult<Vec<BookInstanceDetails>> {
        let mut builder = QueryBuilder::<Sqlite>::new(INSTANCE_SELECT);
        builder.push(" WHERE 1=1");
        if let Some(status) = query.status {
            builder.push(" AND bi.status = ").push_bind(status.code());
        }
        if let Some(book_id) = query.book_id {
            builder.push(" AND bi.book_id = ").push_bind(book_id);
        }
        builder.push(ORDER_BY_DUE_BACK);

        let rows = builder
            .build_query_as::<BookInstanceRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BookInstanceDetails::from).collect())
    }

    /// Get a copy by its UUID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        sqlx::query_as::<_, BookInstanceRow>(&format!("{} WHERE bi.id = ?", INSTANCE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookInstanceDetails::from)
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Copies of one book
    pub async fn list_for_book(&self, book_id: i64) -> AppResult<Vec<BookInstanceDetails>> {
        self.list(&BookInstanceQuery {
            status: None,
            book_id: Some(book_id),
        })
        .await
    }

    /// Copies on loan to one borrower, earliest due first
    pub async fn list_on_loan_for_borrower(&self, user_id: i64) -> AppResult<Vec<BookInstanceDetails>> {
        let rows = sqlx::query_as::<_, BookInstanceRow>(&format!(
            "{} WHERE bi.borrower_id = ? AND bi.status = ?{}",
            INSTANCE_SELECT, ORDER_BY_DUE_BACK
        ))
        .bind(user_id)
        .bind(LoanStatus::OnLoan.code())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BookInstanceDetails::from).collect())
    }

    /// Every copy on loan, earliest due first
    pub async fn list_on_loan(&self) -> AppResult<Vec<BookInstanceDetails>> {
        self.list(&BookInstanceQuery {
            status: Some(LoanStatus::OnLoan),
            book_id: None,
        })
        .await
    }

    pub async fn create(&self, instance: &BookInstance) -> AppResult<BookInstanceDetails> {
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(instance.id)
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.due_back)
        .bind(instance.status.code())
        .bind(instance.borrower_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(instance.id).await
    }

    /// Persist every writable column of `instance`
    pub async fn update(&self, instance: &BookInstance) -> AppResult<BookInstanceDetails> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET book_id = ?, imprint = ?, due_back = ?, status = ?, borrower_id = ?
            WHERE id = ?
            "#,
        )
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.due_back)
        .bind(instance.status.code())
        .bind(instance.borrower_id)
        .bind(instance.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", instance.id)));
        }
        self.get_by_id(instance.id).await
    }

    /// Move the due date; status and borrower are untouched
    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = ? WHERE id = ?")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = ?")
            .bind(status.code())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
