//! Book instance (physical copy) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceDetails, BookInstanceQuery, CreateBookInstance, UpdateBookInstance},
        user::Permission,
    },
    AppState,
};

use super::AuthenticatedUser;

/// List copies, optionally filtered by status or book
#[utoipa::path(
    get,
    path = "/bookinstances",
    tag = "bookinstances",
    params(BookInstanceQuery),
    responses(
        (status = 200, description = "Matching copies", body = Vec<BookInstanceDetails>)
    )
)]
pub async fn list_book_instances(
    State(state): State<AppState>,
    Query(query): Query<BookInstanceQuery>,
) -> AppResult<Json<Vec<BookInstanceDetails>>> {
    Ok(Json(state.services.instances.list(&query).await?))
}

#[utoipa::path(
    get,
    path = "/bookinstances/{id}",
    tag = "bookinstances",
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Copy details", body = BookInstanceDetails),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_book_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    Ok(Json(state.services.instances.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/bookinstances",
    tag = "bookinstances",
    security(("bearer_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstanceDetails),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstanceDetails>)> {
    claims.require(Permission::AddBookInstance)?;

    let created = state.services.instances.create(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a copy. The id itself is not writable.
#[utoipa::path(
    put,
    path = "/bookinstances/{id}",
    tag = "bookinstances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Copy updated", body = BookInstanceDetails),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require(Permission::ChangeBookInstance)?;

    Ok(Json(state.services.instances.update(id, form).await?))
}

#[utoipa::path(
    delete,
    path = "/bookinstances/{id}",
    tag = "bookinstances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require(Permission::DeleteBookInstance)?;

    state.services.instances.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
