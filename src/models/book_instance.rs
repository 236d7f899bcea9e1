//! Book instance (physical copy) model, loan status and the renewal form

use std::collections::BTreeMap;

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const RENEWAL_REQUIRED: &str = "This field is required.";
pub const RENEWAL_INVALID: &str = "Enter a valid date.";
pub const RENEWAL_IN_PAST: &str = "Invalid date - renewal in past";
pub const RENEWAL_TOO_FAR: &str = "Invalid date - renewal more than 4 weeks ahead";

/// Today's date in the server's local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Availability of a physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    /// Single letter code stored in the database
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Internal row structure for book instance queries (status as stored)
#[derive(Debug, Clone, FromRow)]
pub struct BookInstanceRow {
    id: Uuid,
    book_id: Option<i64>,
    imprint: String,
    due_back: Option<NaiveDate>,
    status: String,
    borrower_id: Option<i64>,
    book_title: Option<String>,
    borrower_username: Option<String>,
}

/// A specific physical, borrowable copy of a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i64>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i64>,
}

impl BookInstance {
    /// True iff a due date is set and lies strictly before `today`
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        matches!(self.due_back, Some(due) if due < today)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(today())
    }
}

impl From<&BookInstanceRow> for BookInstance {
    fn from(row: &BookInstanceRow) -> Self {
        BookInstance {
            id: row.id,
            book_id: row.book_id,
            imprint: row.imprint.clone(),
            due_back: row.due_back,
            status: row.status.parse().unwrap_or_default(),
            borrower_id: row.borrower_id,
        }
    }
}

/// Book instance as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookInstanceDetails {
    pub id: Uuid,
    pub book_id: Option<i64>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i64>,
    pub borrower_username: Option<String>,
    pub is_overdue: bool,
}

impl BookInstanceDetails {
    pub fn instance(&self) -> BookInstance {
        BookInstance {
            id: self.id,
            book_id: self.book_id,
            imprint: self.imprint.clone(),
            due_back: self.due_back,
            status: self.status,
            borrower_id: self.borrower_id,
        }
    }
}

impl From<BookInstanceRow> for BookInstanceDetails {
    fn from(row: BookInstanceRow) -> Self {
        let instance = BookInstance::from(&row);
        BookInstanceDetails {
            is_overdue: instance.is_overdue(),
            id: instance.id,
            book_id: instance.book_id,
            book_title: row.book_title,
            imprint: instance.imprint,
            due_back: instance.due_back,
            status: instance.status,
            borrower_id: instance.borrower_id,
            borrower_username: row.borrower_username,
        }
    }
}

impl std::fmt::Display for BookInstanceDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.book_title.as_deref().unwrap_or("-"))
    }
}

/// Book instance list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookInstanceQuery {
    pub status: Option<LoanStatus>,
    pub book_id: Option<i64>,
}

/// Create book instance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBookInstance {
    pub book_id: Option<i64>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
    pub borrower_id: Option<i64>,
}

/// Update book instance request. The identifier is never writable.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBookInstance {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub book_id: Option<Option<i64>>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_back: Option<Option<NaiveDate>>,
    pub status: Option<LoanStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub borrower_id: Option<Option<i64>>,
}

impl UpdateBookInstance {
    pub fn apply(&self, instance: &mut BookInstance) {
        if let Some(book_id) = self.book_id {
            instance.book_id = book_id;
        }
        if let Some(ref imprint) = self.imprint {
            instance.imprint = imprint.clone();
        }
        if let Some(due_back) = self.due_back {
            instance.due_back = due_back;
        }
        if let Some(status) = self.status {
            instance.status = status;
        }
        if let Some(borrower_id) = self.borrower_id {
            instance.borrower_id = borrower_id;
        }
    }
}

/// Field name to error messages
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// Renewal form as submitted
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// Proposed new due date (YYYY-MM-DD)
    pub renewal_date: Option<String>,
}

impl RenewBookForm {
    /// Read a submitted body leniently so that any payload ends up as a form
    /// error instead of an extractor rejection. A missing or `null` date is
    /// left unset; any other non-string value is kept as its JSON text, which
    /// then fails date parsing.
    pub fn from_body(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        let renewal_date = match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(fields)) => match fields.get("renewal_date") {
                None | Some(serde_json::Value::Null) => None,
                Some(serde_json::Value::String(date)) => Some(date.clone()),
                Some(other) => Some(other.to_string()),
            },
            Ok(other) => Some(other.to_string()),
            Err(_) => Some(String::from_utf8_lossy(body).into_owned()),
        };
        Self { renewal_date }
    }

    /// Validate the submitted date against `[today, today + max_days]`
    pub fn clean(&self, today: NaiveDate, max_days: i64) -> Result<NaiveDate, FormErrors> {
        let message = match self.renewal_date.as_deref().map(str::trim) {
            None | Some("") => RENEWAL_REQUIRED,
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Err(_) => RENEWAL_INVALID,
                Ok(date) if date < today => RENEWAL_IN_PAST,
                Ok(date) if date > today + Duration::days(max_days) => RENEWAL_TOO_FAR,
                Ok(date) => return Ok(date),
            },
        };

        let mut errors = FormErrors::new();
        errors.insert("renewal_date".to_string(), vec![message.to_string()]);
        Err(errors)
    }
}

/// Renewal form as rendered back to the librarian
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalFormView {
    pub book_instance: BookInstanceDetails,
    /// Proposed date on first render, submitted value after a failed submit
    pub renewal_date: Option<String>,
    #[schema(value_type = Object)]
    pub errors: FormErrors,
}
