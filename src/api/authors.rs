//! Author endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, CreateAuthor, UpdateAuthor},
        user::Permission,
    },
    AppState,
};

use super::AuthenticatedUser;

/// List all authors, by last then first name
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "All authors", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.authors.list().await?;
    Ok(Json(authors))
}

/// Get an author and their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AuthorDetails>> {
    let author = state.services.authors.get(id).await?;
    Ok(Json(author))
}

#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(author): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require(Permission::AddAuthor)?;

    let created = state.services.authors.create(author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(author): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    claims.require(Permission::ChangeAuthor)?;

    let updated = state.services.authors.update(id, author).await?;
    Ok(Json(updated))
}

/// Delete an author. Refused while books are attributed to them.
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require(Permission::DeleteAuthor)?;

    state.services.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
