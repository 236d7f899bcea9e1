//! Genre endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        genre::{Genre, GenreForm},
        user::Permission,
    },
    AppState,
};

use super::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses((status = 200, description = "All genres", body = Vec<Genre>))
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.services.catalog.list_genres().await?))
}

#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i64, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Genre>> {
    Ok(Json(state.services.catalog.get_genre(id).await?))
}

/// Create a genre; names are unique regardless of case
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = GenreForm,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 409, description = "Genre already exists")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<GenreForm>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    claims.require(Permission::AddGenre)?;

    let created = state.services.catalog.create_genre(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Genre ID")),
    request_body = GenreForm,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Genre already exists")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(form): Json<GenreForm>,
) -> AppResult<Json<Genre>> {
    claims.require(Permission::ChangeGenre)?;

    Ok(Json(state.services.catalog.update_genre(id, form).await?))
}

#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require(Permission::DeleteGenre)?;

    state.services.catalog.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
