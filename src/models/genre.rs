//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A categorical tag applicable to many books
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i64,
    /// Unique under case-insensitive comparison
    pub name: String,
}

/// Create or update genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct GenreForm {
    /// Genre name (e.g. Science Fiction, French Poetry)
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
}
