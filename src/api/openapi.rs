//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, book_instances, books, genres, health, index, languages, loans, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "1.0.0",
        description = "Local library catalog and borrowing REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Landing
        index::index,
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book_form,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Languages
        languages::list_languages,
        languages::get_language,
        languages::create_language,
        languages::update_language,
        languages::delete_language,
        // Book instances
        book_instances::list_book_instances,
        book_instances::get_book_instance,
        book_instances::create_book_instance,
        book_instances::update_book_instance,
        book_instances::delete_book_instance,
        // Loans
        loans::my_books,
        loans::all_borrowed,
        loans::renewal_form,
        loans::renew_book_instance,
        loans::return_book_instance,
        // Users
        users::get_user,
        users::create_user,
        users::delete_user,
    ),
    components(
        schemas(
            // Landing
            index::IndexResponse,
            crate::services::stats::CatalogCounts,
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::BookInitial,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorShort,
            crate::models::author::AuthorDetails,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Genres and languages
            crate::models::genre::Genre,
            crate::models::genre::GenreForm,
            crate::models::language::Language,
            crate::models::language::LanguageForm,
            // Book instances
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::BookInstanceDetails,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::UpdateBookInstance,
            crate::models::book_instance::RenewBookForm,
            crate::models::book_instance::RenewalFormView,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "catalog", description = "Landing page"),
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "authors", description = "Authors"),
        (name = "genres", description = "Genres"),
        (name = "languages", description = "Languages"),
        (name = "bookinstances", description = "Physical copies"),
        (name = "loans", description = "Borrowing, renewal and return"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
