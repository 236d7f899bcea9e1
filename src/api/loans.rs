//! Loan endpoints: borrower and librarian views, renewal and return

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceDetails, RenewBookForm, RenewalFormView},
        user::Permission,
    },
    services::loans::RenewalOutcome,
    AppState,
};

use super::AuthenticatedUser;

/// Where a successful renewal sends the librarian
pub const BORROWED_PATH: &str = "/api/v1/borrowed";

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's loans, earliest due first", body = Vec<BookInstanceDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookInstanceDetails>>> {
    Ok(Json(state.services.loans.borrowed_by(claims.user_id).await?))
}

/// Every copy on loan (librarian view)
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All loans, earliest due first", body = Vec<BookInstanceDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned")
    )
)]
pub async fn all_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookInstanceDetails>>> {
    claims.require(Permission::CanMarkReturned)?;

    Ok(Json(state.services.loans.all_on_loan().await?))
}

/// Renewal form with the proposed date
#[utoipa::path(
    get,
    path = "/bookinstances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Renewal form", body = RenewalFormView),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalFormView>> {
    claims.require(Permission::CanMarkReturned)?;

    Ok(Json(state.services.loans.renewal_form(id).await?))
}

/// Submit a renewal date.
///
/// The caller is checked first and the copy resolved second, so anonymous
/// callers cannot tell which ids exist. The body is only read once both
/// pass; whatever it contains becomes a form error, never a rejection.
#[utoipa::path(
    post,
    path = "/bookinstances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body = RenewBookForm,
    responses(
        (status = 303, description = "Renewed; redirect to the all-loans view"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Form rejected", body = RenewalFormView)
    )
)]
pub async fn renew_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> AppResult<Response> {
    claims.require(Permission::CanMarkReturned)?;

    let form = RenewBookForm::from_body(&body);
    match state.services.loans.renew(id, form).await? {
        RenewalOutcome::Renewed(instance) => {
            tracing::debug!(user = %claims.sub, "Renewed {}", instance);
            Ok(Redirect::to(BORROWED_PATH).into_response())
        }
        RenewalOutcome::Invalid(view) => {
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response())
        }
    }
}

/// Mark a copy on loan as returned
#[utoipa::path(
    post,
    path = "/bookinstances/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Copy returned", body = BookInstanceDetails),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 409, description = "Copy is not on loan")
    )
)]
pub async fn return_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require(Permission::CanMarkReturned)?;

    Ok(Json(state.services.loans.mark_returned(id).await?))
}
