//! User accounts, permissions and token claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Local account record a borrower reference points at
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Short user representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserShort {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserShort {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Permissions gating catalog actions, named after their codenames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    AddAuthor,
    ChangeAuthor,
    DeleteAuthor,
    AddBook,
    ChangeBook,
    DeleteBook,
    AddGenre,
    ChangeGenre,
    DeleteGenre,
    AddLanguage,
    ChangeLanguage,
    DeleteLanguage,
    AddBookInstance,
    ChangeBookInstance,
    DeleteBookInstance,
    /// Librarian permission: see all loans, renew and return copies
    CanMarkReturned,
    AddUser,
    DeleteUser,
}

impl Permission {
    pub fn codename(&self) -> &'static str {
        match self {
            Permission::AddAuthor => "catalog.add_author",
            Permission::ChangeAuthor => "catalog.change_author",
            Permission::DeleteAuthor => "catalog.delete_author",
            Permission::AddBook => "catalog.add_book",
            Permission::ChangeBook => "catalog.change_book",
            Permission::DeleteBook => "catalog.delete_book",
            Permission::AddGenre => "catalog.add_genre",
            Permission::ChangeGenre => "catalog.change_genre",
            Permission::DeleteGenre => "catalog.delete_genre",
            Permission::AddLanguage => "catalog.add_language",
            Permission::ChangeLanguage => "catalog.change_language",
            Permission::DeleteLanguage => "catalog.delete_language",
            Permission::AddBookInstance => "catalog.add_bookinstance",
            Permission::ChangeBookInstance => "catalog.change_bookinstance",
            Permission::DeleteBookInstance => "catalog.delete_bookinstance",
            Permission::CanMarkReturned => "catalog.can_mark_returned",
            Permission::AddUser => "auth.add_user",
            Permission::DeleteUser => "auth.delete_user",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.codename())
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Username
    pub sub: String,
    pub user_id: i64,
    /// Permission codenames held by the user
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_superuser: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Claims valid for `ttl_hours` from now
    pub fn new(user_id: i64, username: &str, permissions: &[Permission], ttl_hours: u64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: username.to_string(),
            user_id,
            permissions: permissions.iter().map(|p| p.codename().to_string()).collect(),
            is_superuser: false,
            exp: now + (ttl_hours as i64) * 3600,
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_perm(&self, permission: Permission) -> bool {
        self.is_superuser || self.permissions.iter().any(|p| p == permission.codename())
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_perm(permission) {
            Ok(())
        } else {
            tracing::warn!(user = %self.sub, permission = %permission, "Permission denied");
            Err(AppError::Authorization(format!(
                "Permission {} required",
                permission
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip_keeps_permissions() {
        let claims = UserClaims::new(7, "librarian", &[Permission::CanMarkReturned], 1);
        let token = claims.create_token(SECRET).unwrap();
        let parsed = UserClaims::from_token(&token, SECRET).unwrap();

        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.sub, "librarian");
        assert!(parsed.has_perm(Permission::CanMarkReturned));
        assert!(!parsed.has_perm(Permission::DeleteBook));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = UserClaims::new(1, "reader", &[], 1).create_token("other").unwrap();
        assert!(UserClaims::from_token(&token, SECRET).is_err());
    }

    #[test]
    fn superuser_holds_every_permission() {
        let mut claims = UserClaims::new(1, "admin", &[], 1);
        claims.is_superuser = true;
        assert!(claims.require(Permission::DeleteAuthor).is_ok());
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let claims = UserClaims::new(1, "reader", &[Permission::AddBook], 1);
        assert!(matches!(
            claims.require(Permission::CanMarkReturned),
            Err(AppError::Authorization(_))
        ));
    }
}
