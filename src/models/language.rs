//! Language model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Natural language a book is written in
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

/// Create or update language request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LanguageForm {
    /// Language name (e.g. English, French, Japanese)
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
}
