//! API handlers for the catalog REST endpoints

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod health;
pub mod index;
pub mod languages;
pub mod loans;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Landing page
        .route("/", get(index::index))
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/create", get(books::create_book_form))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Genres
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genres/:id",
            get(genres::get_genre).put(genres::update_genre).delete(genres::delete_genre),
        )
        // Languages
        .route("/languages", get(languages::list_languages).post(languages::create_language))
        .route(
            "/languages/:id",
            get(languages::get_language)
                .put(languages::update_language)
                .delete(languages::delete_language),
        )
        // Book instances
        .route(
            "/bookinstances",
            get(book_instances::list_book_instances).post(book_instances::create_book_instance),
        )
        .route(
            "/bookinstances/:id",
            get(book_instances::get_book_instance)
                .put(book_instances::update_book_instance)
                .delete(book_instances::delete_book_instance),
        )
        .route(
            "/bookinstances/:id/renew",
            get(loans::renewal_form).post(loans::renew_book_instance),
        )
        .route("/bookinstances/:id/return", post(loans::return_book_instance))
        // Loans
        .route("/mybooks", get(loans::my_books))
        .route("/borrowed", get(loans::all_borrowed))
        // Users
        .route("/users", post(users::create_user))
        .route("/users/:id", get(users::get_user).delete(users::delete_user))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
