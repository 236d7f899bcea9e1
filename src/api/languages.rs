//! Language endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        language::{Language, LanguageForm},
        user::Permission,
    },
    AppState,
};

use super::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/languages",
    tag = "languages",
    responses((status = 200, description = "All languages", body = Vec<Language>))
)]
pub async fn list_languages(State(state): State<AppState>) -> AppResult<Json<Vec<Language>>> {
    Ok(Json(state.services.catalog.list_languages().await?))
}

#[utoipa::path(
    get,
    path = "/languages/{id}",
    tag = "languages",
    params(("id" = i64, Path, description = "Language ID")),
    responses(
        (status = 200, description = "Language", body = Language),
        (status = 404, description = "Language not found")
    )
)]
pub async fn get_language(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Language>> {
    Ok(Json(state.services.catalog.get_language(id).await?))
}

#[utoipa::path(
    post,
    path = "/languages",
    tag = "languages",
    security(("bearer_auth" = [])),
    request_body = LanguageForm,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 409, description = "Language already exists")
    )
)]
pub async fn create_language(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(form): Json<LanguageForm>,
) -> AppResult<(StatusCode, Json<Language>)> {
    claims.require(Permission::AddLanguage)?;

    let created = state.services.catalog.create_language(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/languages/{id}",
    tag = "languages",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Language ID")),
    request_body = LanguageForm,
    responses(
        (status = 200, description = "Language updated", body = Language),
        (status = 404, description = "Language not found"),
        (status = 409, description = "Language already exists")
    )
)]
pub async fn update_language(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(form): Json<LanguageForm>,
) -> AppResult<Json<Language>> {
    claims.require(Permission::ChangeLanguage)?;

    Ok(Json(state.services.catalog.update_language(id, form).await?))
}

/// Delete a language; its books stay, without a language
#[utoipa::path(
    delete,
    path = "/languages/{id}",
    tag = "languages",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Language ID")),
    responses(
        (status = 204, description = "Language deleted"),
        (status = 404, description = "Language not found")
    )
)]
pub async fn delete_language(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require(Permission::DeleteLanguage)?;

    state.services.catalog.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
