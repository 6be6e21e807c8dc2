//! Property routes
//!
//! Public catalogue endpoints plus the admin console CRUD. Filtering runs in
//! process over the full property set, which the store caches in Redis.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{Created, DataResponse, NoContent, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::domain::properties::{PropertyInput, PropertyRecord, PropertyView};
use crate::error::{ApiError, ApiResult};
use crate::search::filter::filter_properties;
use crate::search::{CriteriaQuery, FilterCriteria};

/// Featured strip on the home page
const FEATURED_LIMIT: usize = 6;

async fn load_property(state: &AppState, id: Uuid) -> ApiResult<PropertyRecord> {
    state
        .properties
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))
}

// ============================================================================
// Public Endpoints
// ============================================================================

/// GET /properties
///
/// Stateless filtered catalogue; criteria come from the query string.
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CriteriaQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Paginated<PropertyView>> {
    let criteria = query.into_criteria().map_err(ApiError::bad_request)?;
    let all = state.properties.list_all().await?;

    let matching: Vec<PropertyView> = filter_properties(&all, &criteria)
        .into_iter()
        .map(PropertyView::from)
        .collect();

    tracing::debug!(total = all.len(), matching = matching.len(), "Properties filtered");
    Ok(Paginated::from_all(matching, &pagination))
}

/// GET /properties/featured
pub async fn list_featured(
    State(state): State<Arc<AppState>>,
) -> ApiResult<DataResponse<Vec<PropertyView>>> {
    let all = state.properties.list_all().await?;
    let criteria = FilterCriteria {
        featured_only: true,
        ..FilterCriteria::default()
    };

    let featured = filter_properties(&all, &criteria)
        .into_iter()
        .take(FEATURED_LIMIT)
        .map(PropertyView::from)
        .collect();

    Ok(DataResponse::new(featured))
}

/// GET /properties/:id
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<DataResponse<PropertyView>> {
    let property = load_property(&state, id).await?;
    Ok(DataResponse::new(PropertyView::from(&property)))
}

// ============================================================================
// Admin Endpoints
// ============================================================================

/// GET /admin/properties
pub async fn admin_list_properties(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    _admin: RequireAdmin,
) -> ApiResult<Paginated<PropertyRecord>> {
    let all = state.properties.list_all().await?;
    Ok(Paginated::from_all(all, &pagination))
}

/// GET /admin/properties/:id
pub async fn admin_get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: RequireAdmin,
) -> ApiResult<DataResponse<PropertyRecord>> {
    Ok(DataResponse::new(load_property(&state, id).await?))
}

/// POST /admin/properties
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(input): Json<PropertyInput>,
) -> ApiResult<Created<PropertyRecord>> {
    let input = input.validated().map_err(ApiError::bad_request)?;
    let created = state.properties.insert(&input).await?;
    Ok(Created(created))
}

/// PUT /admin/properties/:id
pub async fn update_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: RequireAdmin,
    Json(input): Json<PropertyInput>,
) -> ApiResult<DataResponse<PropertyRecord>> {
    let input = input.validated().map_err(ApiError::bad_request)?;
    let updated = state
        .properties
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    tracing::info!(property_id = %id, "Property updated");
    Ok(DataResponse::new(updated))
}

/// DELETE /admin/properties/:id
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: RequireAdmin,
) -> ApiResult<NoContent> {
    if !state.properties.delete(id).await? {
        return Err(ApiError::not_found("Property not found"));
    }

    tracing::info!(property_id = %id, "Property deleted");
    Ok(NoContent)
}
