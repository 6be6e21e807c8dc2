//! Quick search and listings page routes
//!
//! The home page quick search leaves its criteria in the session's hand-off
//! slot; the next listings page mount consumes them exactly once.

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::ensure_session;
use crate::search::listings::ListingsPage;
use crate::search::{CriteriaQuery, FilterCriteria, ListingsController, QuickSearch};

#[derive(Debug, Deserialize, Default)]
pub struct ViewQuery {
    pub view: Option<String>,
}

/// POST /search/quick
///
/// Returns the criteria the next listings page mount will start from.
pub async fn quick_search(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(search): Json<QuickSearch>,
) -> ApiResult<(CookieJar, DataResponse<FilterCriteria>)> {
    let (jar, session_id) = ensure_session(jar);

    state.handoff.offer(&session_id, &search).await?;

    Ok((jar, DataResponse::new(search.into_criteria())))
}

/// GET /listings
///
/// Mounts a listings controller for the session: pending quick search first,
/// then any criteria from the query string layered on top.
pub async fn get_listings(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<CriteriaQuery>,
    Query(view): Query<ViewQuery>,
) -> ApiResult<(CookieJar, DataResponse<ListingsPage>)> {
    let (jar, session_id) = ensure_session(jar);

    let controller = ListingsController::open(
        state.properties.as_ref(),
        &state.handoff,
        &session_id,
        query,
        view.view.as_deref(),
    )
    .await
    .map_err(ApiError::bad_request)?;

    Ok((jar, DataResponse::new(controller.snapshot())))
}
