//! Landing page: catalog counts and the per-session visit counter

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    services::stats::{CatalogCounts, SessionVisits},
    AppState,
};

pub const VISITS_COOKIE: &str = "num_visits";

#[derive(Serialize, ToSchema)]
pub struct IndexResponse {
    #[serde(flatten)]
    pub counts: CatalogCounts,
    /// Visits from this session before the current one
    pub num_visits: u64,
}

/// Landing page
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog counts", body = IndexResponse)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<IndexResponse>)> {
    let counts = state.services.stats.counts().await?;

    let visits = SessionVisits::parse(jar.get(VISITS_COOKIE).map(|c| c.value()));
    let (num_visits, next) = visits.record_visit();

    let mut cookie = Cookie::new(VISITS_COOKIE, next.0.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);

    Ok((jar.add(cookie), Json(IndexResponse { counts, num_visits })))
}
