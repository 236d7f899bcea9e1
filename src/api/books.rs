//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        book::{BookDetails, BookInitial, BookShort, CreateBook, UpdateBook},
        user::Permission,
    },
    services::catalog::PageNumber,
    AppState,
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Items on this page
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number starting at 1, or `last`
    pub page: Option<String>,
}

/// List books, one page at a time
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of books", body = PaginatedResponse<BookShort>),
        (status = 404, description = "Page out of range or not a number")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    let page = PageNumber::parse(query.page.as_deref())?;
    let (books, info) = state.services.catalog.list_books(page).await?;

    Ok(Json(PaginatedResponse {
        items: books,
        total: info.total,
        page: info.page,
        per_page: info.per_page,
        num_pages: info.num_pages,
        has_next: info.has_next(),
        has_previous: info.has_previous(),
    }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Initial values of the book creation form
#[utoipa::path(
    get,
    path = "/books/create",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form values", body = BookInitial),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.add_book")
    )
)]
pub async fn create_book_form(
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<BookInitial>> {
    claims.require(Permission::AddBook)?;
    Ok(Json(BookInitial::default()))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "ISBN already used")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    claims.require(Permission::AddBook)?;

    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(book): Json<UpdateBook>,
) -> AppResult<Json<BookDetails>> {
    claims.require(Permission::ChangeBook)?;

    let updated = state.services.catalog.update_book(id, book).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies still reference the book")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require(Permission::DeleteBook)?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
