//! FAQ routes

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{Created, DataResponse, NoContent};
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::domain::faqs::{group_by_category, Faq, FaqGroup, FaqInput};
use crate::error::{ApiError, ApiResult};

async fn all_faqs(state: &AppState) -> ApiResult<Vec<Faq>> {
    let faqs = sqlx::query_as::<_, Faq>(
        r#"
        SELECT id, question, answer, category, sort_order, created_at, updated_at
        FROM faqs
        ORDER BY sort_order, created_at
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(faqs)
}

/// GET /faqs
pub async fn list_faqs(
    State(state): State<Arc<AppState>>,
) -> ApiResult<DataResponse<Vec<FaqGroup>>> {
    let faqs = all_faqs(&state).await?;
    Ok(DataResponse::new(group_by_category(faqs)))
}

// ============================================================================
// Admin Endpoints
// ============================================================================

/// GET /admin/faqs
pub async fn admin_list_faqs(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> ApiResult<DataResponse<Vec<Faq>>> {
    Ok(DataResponse::new(all_faqs(&state).await?))
}

/// POST /admin/faqs
pub async fn create_faq(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(input): Json<FaqInput>,
) -> ApiResult<Created<Faq>> {
    let input = input.validated().map_err(ApiError::bad_request)?;

    let faq = sqlx::query_as::<_, Faq>(
        r#"
        INSERT INTO faqs (question, answer, category, sort_order)
        VALUES ($1, $2, $3, $4)
        RETURNING id, question, answer, category, sort_order, created_at, updated_at
        "#,
    )
    .bind(&input.question)
    .bind(&input.answer)
    .bind(&input.category)
    .bind(input.sort_order)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(faq_id = %faq.id, "FAQ created");
    Ok(Created(faq))
}

/// PUT /admin/faqs/:id
pub async fn update_faq(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: RequireAdmin,
    Json(input): Json<FaqInput>,
) -> ApiResult<DataResponse<Faq>> {
    let input = input.validated().map_err(ApiError::bad_request)?;

    let faq = sqlx::query_as::<_, Faq>(
        r#"
        UPDATE faqs SET question = $2, answer = $3, category = $4, sort_order = $5,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, question, answer, category, sort_order, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&input.question)
    .bind(&input.answer)
    .bind(&input.category)
    .bind(input.sort_order)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("FAQ not found"))?;

    Ok(DataResponse::new(faq))
}

/// DELETE /admin/faqs/:id
pub async fn delete_faq(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: RequireAdmin,
) -> ApiResult<NoContent> {
    let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("FAQ not found"));
    }

    Ok(NoContent)
}
