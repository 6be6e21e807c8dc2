use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub database: String,
    pub redis: String,
}

fn overall_status(database_ok: bool, redis_ok: bool) -> (StatusCode, &'static str) {
    match (database_ok, redis_ok) {
        (true, true) => (StatusCode::OK, "healthy"),
        // Without Redis the site still serves listings, only uncached and
        // without quick-search hand-off
        (true, false) => (StatusCode::OK, "degraded"),
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    }
}

/// GET /health
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (database_ok, redis_result) =
        tokio::join!(db::health_check(&state.db), state.cache.health_check());
    let redis_ok = redis_result.is_ok();

    let (status_code, status) = overall_status(database_ok, redis_ok);
    let label = |ok: bool| if ok { "ok" } else { "error" }.to_string();

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                database: label(database_ok),
                redis: label(redis_ok),
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_is_critical_redis_is_not() {
        assert_eq!(overall_status(true, true), (StatusCode::OK, "healthy"));
        assert_eq!(overall_status(true, false), (StatusCode::OK, "degraded"));
        assert_eq!(
            overall_status(false, true),
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        );
    }
}
