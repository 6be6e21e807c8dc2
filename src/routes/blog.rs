//! Blog routes
//!
//! Public readers only ever see published posts; the admin console manages
//! drafts too.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{Created, DataResponse, NoContent, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAdmin;
use crate::domain::blog::{BlogPost, BlogPostInput};
use crate::error::{ApiError, ApiResult};

const BLOG_COLUMNS: &str = "id, title, slug, excerpt, content, cover_image, author, published, \
     published_at, created_at, updated_at";

const SLUG_TAKEN: &str = "A post with this slug already exists";

async fn list_page(
    state: &AppState,
    pagination: &PaginationParams,
    published_only: bool,
) -> ApiResult<Paginated<BlogPost>> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM blog_posts WHERE ($1::bool = false OR published = true)",
    )
    .bind(published_only)
    .fetch_one(&state.db)
    .await?;

    let posts = sqlx::query_as::<_, BlogPost>(&format!(
        r#"
        SELECT {}
        FROM blog_posts
        WHERE ($1::bool = false OR published = true)
        ORDER BY COALESCE(published_at, created_at) DESC
        LIMIT $2 OFFSET $3
        "#,
        BLOG_COLUMNS
    ))
    .bind(published_only)
    .bind(i64::from(pagination.limit()))
    .bind(i64::from(pagination.offset()))
    .fetch_all(&state.db)
    .await?;

    Ok(Paginated::new(posts, pagination, total.max(0) as u64))
}

// ============================================================================
// Public Endpoints
// ============================================================================

/// GET /blog
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Paginated<BlogPost>> {
    list_page(&state, &pagination, true).await
}

/// GET /blog/:slug
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<DataResponse<BlogPost>> {
    let post = sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {} FROM blog_posts WHERE slug = $1 AND published = true",
        BLOG_COLUMNS
    ))
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(DataResponse::new(post))
}

// ============================================================================
// Admin Endpoints
// ============================================================================

/// GET /admin/blog
pub async fn admin_list_posts(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    _admin: RequireAdmin,
) -> ApiResult<Paginated<BlogPost>> {
    list_page(&state, &pagination, false).await
}

/// POST /admin/blog
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(input): Json<BlogPostInput>,
) -> ApiResult<Created<BlogPost>> {
    let input = input.validated().map_err(ApiError::bad_request)?;

    let post = sqlx::query_as::<_, BlogPost>(&format!(
        r#"
        INSERT INTO blog_posts (title, slug, excerpt, content, cover_image, author, published,
            published_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $7 THEN NOW() END)
        RETURNING {}
        "#,
        BLOG_COLUMNS
    ))
    .bind(&input.title)
    .bind(input.slug())
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(&input.cover_image)
    .bind(&input.author)
    .bind(input.published)
    .fetch_one(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, SLUG_TAKEN))?;

    tracing::info!(post_id = %post.id, slug = %post.slug, "Blog post created");
    Ok(Created(post))
}

/// PUT /admin/blog/:id
///
/// The first publication date is kept when a published post is edited.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: RequireAdmin,
    Json(input): Json<BlogPostInput>,
) -> ApiResult<DataResponse<BlogPost>> {
    let input = input.validated().map_err(ApiError::bad_request)?;

    let post = sqlx::query_as::<_, BlogPost>(&format!(
        r#"
        UPDATE blog_posts SET
            title = $2, slug = $3, excerpt = $4, content = $5, cover_image = $6, author = $7,
            published = $8,
            published_at = CASE WHEN $8 THEN COALESCE(published_at, NOW()) END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        BLOG_COLUMNS
    ))
    .bind(id)
    .bind(&input.title)
    .bind(input.slug())
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(&input.cover_image)
    .bind(&input.author)
    .bind(input.published)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, SLUG_TAKEN))?
    .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(DataResponse::new(post))
}

/// DELETE /admin/blog/:id
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: RequireAdmin,
) -> ApiResult<NoContent> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Post not found"));
    }

    tracing::info!(post_id = %id, "Blog post deleted");
    Ok(NoContent)
}
