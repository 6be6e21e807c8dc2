//! Page-view analytics routes

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::{extract::cookie::CookieJar, headers::UserAgent, TypedHeader};
use chrono::{NaiveTime, TimeZone, Utc};
use std::sync::Arc;

use crate::api::{DataResponse, NoContent};
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::domain::analytics::*;
use crate::error::ApiResult;
use crate::middleware::session::SESSION_COOKIE;

const TOP_PAGES_LIMIT: i64 = 10;

/// POST /analytics/page-views
///
/// Best effort: storage problems are logged and the visitor still gets 204.
pub async fn record_page_view(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(request): Json<PageViewRequest>,
) -> NoContent {
    let Some(path) = request.normalized_path() else {
        tracing::debug!(path = %request.path, "Ignoring page view with unusable path");
        return NoContent;
    };

    let session_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let user_agent = user_agent.map(|TypedHeader(ua)| ua.as_str().to_string());

    let result = sqlx::query(
        "INSERT INTO page_views (path, referrer, user_agent, session_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(&path)
    .bind(&request.referrer)
    .bind(&user_agent)
    .bind(&session_id)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        tracing::warn!(path = %path, error = %e, "Failed to record page view");
    }

    NoContent
}

/// GET /admin/analytics?days=N
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
    _admin: RequireAdmin,
) -> ApiResult<DataResponse<AnalyticsSummary>> {
    let days = query.days();
    let today = Utc::now().date_naive();
    let since = Utc.from_utc_datetime(&range_start(today, days).and_time(NaiveTime::MIN));

    let total_views: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM page_views")
        .fetch_one(&state.db)
        .await?;

    let (views_in_range, unique_sessions_in_range): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(DISTINCT session_id)
        FROM page_views
        WHERE created_at >= $1
        "#,
    )
    .bind(since)
    .fetch_one(&state.db)
    .await?;

    let top_pages = sqlx::query_as::<_, PathCount>(
        r#"
        SELECT path, COUNT(*) AS views
        FROM page_views
        WHERE created_at >= $1
        GROUP BY path
        ORDER BY views DESC, path
        LIMIT $2
        "#,
    )
    .bind(since)
    .bind(TOP_PAGES_LIMIT)
    .fetch_all(&state.db)
    .await?;

    let daily = sqlx::query_as::<_, DailyCount>(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS views
        FROM page_views
        WHERE created_at >= $1
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(since)
    .fetch_all(&state.db)
    .await?;

    Ok(DataResponse::new(AnalyticsSummary {
        range_days: days,
        total_views,
        views_in_range,
        unique_sessions_in_range,
        top_pages,
        daily: fill_missing_days(daily, today, days),
    }))
}
