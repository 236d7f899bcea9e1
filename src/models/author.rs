//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookShort;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Died
    pub date_of_death: Option<NaiveDate>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.first_name, self.last_name)
    }
}

/// Short author representation embedded in book payloads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorShort {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<Author> for AuthorShort {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
        }
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request.
///
/// Only these fields are writable. Absent keys are left untouched, an explicit
/// `null` clears a date.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_death: Option<Option<NaiveDate>>,
}

impl UpdateAuthor {
    /// Apply the allowed changes onto an existing author
    pub fn apply(self, author: &mut Author) {
        if let Some(first_name) = self.first_name {
            author.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            author.last_name = last_name;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            author.date_of_birth = date_of_birth;
        }
        if let Some(date_of_death) = self.date_of_death {
            author.date_of_death = date_of_death;
        }
    }
}
