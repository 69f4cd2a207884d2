/**
 * Blog Routes
 * Public listing/lookup plus admin-gated, author-owned mutations
 */
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{
    self,
    blogs::{self, BlogFilter, BlogLookup, BlogQuery, BlogUpdate, NewBlog, SortOrder, TagCount},
    models::{BlogDoc, BlogStatus},
};
use crate::routes::auth::require_admin;
use crate::slug::slugify;

const TITLE_MAX_CHARS: usize = 150;
const DESCRIPTION_MAX_CHARS: usize = 200;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for GET /api/blog (list)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<BlogStatus>,
    pub is_featured: Option<bool>,
    pub tag: Option<String>,
    pub author: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlogListResponse {
    pub success: bool,
    pub data: Vec<BlogDoc>,
    pub pagination: Pagination,
}

/// Envelope for single-document reads and all mutations.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlogResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BlogDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BlogResponse {
    fn ok(data: BlogDoc, message: Option<&str>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.map(str::to_string),
            error: None,
        }
    }

    fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Request body for POST /api/blog (create)
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<BlogStatus>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Request body for PATCH /api/blog/:id (partial update)
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<BlogStatus>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagsResponse {
    pub success: bool,
    pub tags: Vec<TagCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelatedResponse {
    pub success: bool,
    pub data: Vec<BlogDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Validation
// ============================================================================

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

/// The publish-timestamp rule: moving to draft clears it, being published
/// sets it once, archiving leaves it alone.
fn publish_timestamp(
    status: BlogStatus,
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match status {
        BlogStatus::Draft => None,
        BlogStatus::Published => current.or(Some(now)),
        BlogStatus::Archived => current,
    }
}

fn field_too_long(value: Option<&str>, max: usize) -> bool {
    value.is_some_and(|v| v.chars().count() > max)
}

/// Offset for a 1-based page. Saturates so an absurd page number walks off
/// the end of the data instead of overflowing `i64`.
fn page_skip(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit)
}

fn has_more(page: i64, limit: i64, total: i64) -> bool {
    page.saturating_mul(limit) < total
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/blog - Public listing with filtering, sorting, and pagination
pub async fn list_blogs(Query(query): Query<BlogListQuery>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(BlogResponse::err("Database not available")),
            )
                .into_response();
        }
    };

    // Clamp pagination the same way regardless of caller input
    let limit = query.limit.clamp(1, 100);
    let page = query.page.max(1);
    let skip = page_skip(page, limit);

    let filter = BlogFilter {
        status: query.status,
        is_featured: query.is_featured,
        tag: query.tag.clone(),
        tags: None,
        // A malformed author id imposes no constraint rather than erroring
        author: query.author.as_deref().and_then(|a| Uuid::parse_str(a).ok()),
        search: query.search.clone(),
    };

    let blog_query = BlogQuery {
        filter: filter.clone(),
        limit: Some(limit),
        skip: Some(skip),
        sort_by: query.sort_by.clone(),
        sort_order: query.sort_order,
    };

    let (data, total) = match tokio::try_join!(
        blogs::list_blogs(pool.as_ref(), &blog_query),
        blogs::count_blogs(pool.as_ref(), &filter),
    ) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Database error listing blogs: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BlogResponse::err("Failed to fetch blogs")),
            )
                .into_response();
        }
    };

    let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

    (
        StatusCode::OK,
        Json(BlogListResponse {
            success: true,
            data,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages,
                has_more: has_more(page, limit, total),
            },
        }),
    )
        .into_response()
}

/// GET /api/blog/:idOrSlug - Single post, by id when UUID-shaped, else by slug
pub async fn get_blog(Path(id_or_slug): Path<String>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(BlogResponse::err("Database not available")),
            );
        }
    };

    match blogs::get_blog(pool.as_ref(), &BlogLookup::parse(&id_or_slug)).await {
        Ok(Some(blog)) => (StatusCode::OK, Json(BlogResponse::ok(blog, None))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(BlogResponse::err("Blog not found")),
        ),
        Err(e) => {
            tracing::error!("Database error fetching blog: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BlogResponse::err("Failed to fetch blog")),
            )
        }
    }
}

/// GET /api/blog/:idOrSlug/related - Same-tag published posts excluding self
pub async fn related_blogs(
    Path(id_or_slug): Path<String>,
    Query(query): Query<RelatedQuery>,
) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(RelatedResponse {
                    success: false,
                    data: vec![],
                    error: Some("Database not available".to_string()),
                }),
            );
        }
    };

    let limit = query.limit.unwrap_or(3).clamp(1, 20);

    let current = match blogs::get_blog(pool.as_ref(), &BlogLookup::parse(&id_or_slug)).await {
        Ok(Some(blog)) => blog,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(RelatedResponse {
                    success: false,
                    data: vec![],
                    error: Some("Blog not found".to_string()),
                }),
            );
        }
        Err(e) => {
            tracing::error!("Database error fetching blog for related lookup: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RelatedResponse {
                    success: false,
                    data: vec![],
                    error: Some("Failed to fetch related blogs".to_string()),
                }),
            );
        }
    };

    match blogs::related_blogs(pool.as_ref(), current.id, limit).await {
        Ok(data) => (
            StatusCode::OK,
            Json(RelatedResponse {
                success: true,
                data,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!("Database error fetching related blogs: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RelatedResponse {
                    success: false,
                    data: vec![],
                    error: Some("Failed to fetch related blogs".to_string()),
                }),
            )
        }
    }
}

/// GET /api/blog/tags?userId=... - Tag/occurrence counts for one author
pub async fn blog_tags(Query(query): Query<TagsQuery>) -> impl IntoResponse {
    let user_id = match query.user_id.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(TagsResponse {
                    success: false,
                    tags: vec![],
                    error: Some("Valid user ID is required".to_string()),
                }),
            );
        }
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(TagsResponse {
                    success: false,
                    tags: vec![],
                    error: Some("Database not available".to_string()),
                }),
            );
        }
    };

    match blogs::tags_with_count(pool.as_ref(), user_id).await {
        Ok(tags) => (
            StatusCode::OK,
            Json(TagsResponse {
                success: true,
                tags,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!("Database error fetching tags: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TagsResponse {
                    success: false,
                    tags: vec![],
                    error: Some("Failed to fetch tags".to_string()),
                }),
            )
        }
    }
}

/// POST /api/blog - Create new post (admin, session user becomes the author)
pub async fn create_blog(
    headers: HeaderMap,
    Json(payload): Json<CreateBlogRequest>,
) -> impl IntoResponse {
    let session = match require_admin(&headers).await {
        Ok(s) => s,
        Err((status, Json(err))) => {
            return (status, Json(BlogResponse::err(err.error))).into_response();
        }
    };

    let title = payload.title.as_deref().map(str::trim).unwrap_or("");
    let description = payload.description.as_deref().map(str::trim).unwrap_or("");
    let cover_image = payload.cover_image.as_deref().unwrap_or("");

    if title.is_empty() || description.is_empty() || cover_image.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(BlogResponse::err("Required fields are missing")),
        )
            .into_response();
    }

    if title.chars().count() > TITLE_MAX_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            Json(BlogResponse::err("Title must be 150 characters or less")),
        )
            .into_response();
    }

    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            Json(BlogResponse::err("Description must be 200 characters or less")),
        )
            .into_response();
    }

    // Derive the slug from the title when the caller didn't supply one
    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => slugify(title),
    };

    if !is_valid_slug(&slug) {
        return (
            StatusCode::BAD_REQUEST,
            Json(BlogResponse::err(
                "Slug must contain only lowercase letters, numbers, and hyphens",
            )),
        )
            .into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(BlogResponse::err("Database not available")),
            )
                .into_response();
        }
    };

    match blogs::slug_exists(pool.as_ref(), &slug, None).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(BlogResponse::err("A blog with this slug already exists")),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!("Database error checking slug: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BlogResponse::err("Failed to create blog")),
            )
                .into_response();
        }
    }

    let status = payload.status.unwrap_or(BlogStatus::Draft);
    let new = NewBlog {
        title: title.to_string(),
        slug,
        description: description.to_string(),
        cover_image: cover_image.to_string(),
        tags: payload.tags,
        author_id: session.user_id,
        status,
        is_featured: payload.is_featured,
        published_at: publish_timestamp(status, None, Utc::now()),
    };

    match blogs::insert_blog(pool.as_ref(), &new).await {
        Ok(blog) => (
            StatusCode::CREATED,
            Json(BlogResponse::ok(blog, Some("Blog created successfully"))),
        )
            .into_response(),
        Err(e) => {
            // A concurrent create can still race past the pre-check
            if db::is_unique_violation(&e) {
                return (
                    StatusCode::CONFLICT,
                    Json(BlogResponse::err("A blog with this slug already exists")),
                )
                    .into_response();
            }
            tracing::error!("Database error creating blog: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BlogResponse::err("Failed to create blog")),
            )
                .into_response()
        }
    }
}

/// PATCH /api/blog/:id - Partial update (admin + author ownership)
pub async fn update_blog(
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBlogRequest>,
) -> impl IntoResponse {
    let session = match require_admin(&headers).await {
        Ok(s) => s,
        Err((status, Json(err))) => {
            return (status, Json(BlogResponse::err(err.error))).into_response();
        }
    };

    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(BlogResponse::err("Invalid blog ID")),
            )
                .into_response();
        }
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(BlogResponse::err("Database not available")),
            )
                .into_response();
        }
    };

    let existing = match blogs::get_blog(pool.as_ref(), &BlogLookup::ById(id)).await {
        Ok(Some(blog)) => blog,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(BlogResponse::err("Blog not found")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching blog: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BlogResponse::err("Failed to update blog")),
            )
                .into_response();
        }
    };

    // Ownership: only the author may edit their own posts
    if existing.author.id != session.user_id {
        return (
            StatusCode::FORBIDDEN,
            Json(BlogResponse::err("Forbidden: You can only edit your own blogs")),
        )
            .into_response();
    }

    if field_too_long(payload.title.as_deref(), TITLE_MAX_CHARS) {
        return (
            StatusCode::BAD_REQUEST,
            Json(BlogResponse::err("Title must be 150 characters or less")),
        )
            .into_response();
    }

    if field_too_long(payload.description.as_deref(), DESCRIPTION_MAX_CHARS) {
        return (
            StatusCode::BAD_REQUEST,
            Json(BlogResponse::err("Description must be 200 characters or less")),
        )
            .into_response();
    }

    // Slug changes re-check uniqueness against every other post
    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() && s != existing.slug => {
            let s = s.to_lowercase();
            if !is_valid_slug(&s) {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(BlogResponse::err(
                        "Slug must contain only lowercase letters, numbers, and hyphens",
                    )),
                )
                    .into_response();
            }
            match blogs::slug_exists(pool.as_ref(), &s, Some(id)).await {
                Ok(true) => {
                    return (
                        StatusCode::CONFLICT,
                        Json(BlogResponse::err("A blog with this slug already exists")),
                    )
                        .into_response();
                }
                Ok(false) => s,
                Err(e) => {
                    tracing::error!("Database error checking slug: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(BlogResponse::err("Failed to update blog")),
                    )
                        .into_response();
                }
            }
        }
        _ => existing.slug.clone(),
    };

    let status = payload.status.unwrap_or(existing.status);
    let update = BlogUpdate {
        title: payload
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or(existing.title),
        slug,
        description: payload
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or(existing.description),
        cover_image: payload.cover_image.unwrap_or(existing.cover_image),
        tags: payload.tags.unwrap_or(existing.tags),
        status,
        is_featured: payload.is_featured.unwrap_or(existing.is_featured),
        published_at: publish_timestamp(status, existing.published_at, Utc::now()),
    };

    match blogs::update_blog(pool.as_ref(), id, &update).await {
        Ok(Some(blog)) => (
            StatusCode::OK,
            Json(BlogResponse::ok(blog, Some("Blog updated successfully"))),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(BlogResponse::err("Blog not found")),
        )
            .into_response(),
        Err(e) => {
            if db::is_unique_violation(&e) {
                return (
                    StatusCode::CONFLICT,
                    Json(BlogResponse::err("A blog with this slug already exists")),
                )
                    .into_response();
            }
            tracing::error!("Database error updating blog: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BlogResponse::err("Failed to update blog")),
            )
                .into_response()
        }
    }
}

/// DELETE /api/blog/:id - Delete post (admin + author ownership)
pub async fn delete_blog(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    let session = match require_admin(&headers).await {
        Ok(s) => s,
        Err((status, Json(err))) => {
            return (status, Json(BlogResponse::err(err.error))).into_response();
        }
    };

    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(BlogResponse::err("Invalid blog ID")),
            )
                .into_response();
        }
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(BlogResponse::err("Database not available")),
            )
                .into_response();
        }
    };

    let existing = match blogs::get_blog(pool.as_ref(), &BlogLookup::ById(id)).await {
        Ok(Some(blog)) => blog,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(BlogResponse::err("Blog not found")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching blog: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BlogResponse::err("Failed to delete blog")),
            )
                .into_response();
        }
    };

    if existing.author.id != session.user_id {
        return (
            StatusCode::FORBIDDEN,
            Json(BlogResponse::err("Forbidden: You can only delete your own blogs")),
        )
            .into_response();
    }

    match blogs::delete_blog(pool.as_ref(), id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(BlogResponse {
                success: true,
                data: None,
                message: Some("Blog deleted successfully".to_string()),
                error: None,
            }),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(BlogResponse::err("Blog not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Database error deleting blog: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BlogResponse::err("Failed to delete blog")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, patch};
    use axum::Router;
    use chrono::TimeZone;
    use tower::ServiceExt;

    fn blog_router() -> Router {
        Router::new()
            .route("/api/blog", get(list_blogs).post(create_blog))
            .route("/api/blog/tags", get(blog_tags))
            .route(
                "/api/blog/{id}",
                patch(update_blog).delete(delete_blog).get(get_blog),
            )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_publish_timestamp_draft_clears() {
        assert_eq!(
            publish_timestamp(BlogStatus::Draft, Some(now()), now()),
            None
        );
    }

    #[test]
    fn test_publish_timestamp_publish_sets_once() {
        // draft -> published: stamped
        assert_eq!(
            publish_timestamp(BlogStatus::Published, None, now()),
            Some(now())
        );
        // already stamped: unchanged
        let earlier = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            publish_timestamp(BlogStatus::Published, Some(earlier), now()),
            Some(earlier)
        );
    }

    #[test]
    fn test_publish_timestamp_archive_keeps() {
        let earlier = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            publish_timestamp(BlogStatus::Archived, Some(earlier), now()),
            Some(earlier)
        );
        assert_eq!(publish_timestamp(BlogStatus::Archived, None, now()), None);
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("hello-world"));
        assert!(is_valid_slug("post-2"));
        assert!(!is_valid_slug("Hello-World"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_page_skip_saturates_on_huge_page_numbers() {
        assert_eq!(page_skip(1, 10), 0);
        assert_eq!(page_skip(3, 10), 20);
        // i64::MAX pages must not overflow; the offset just walks past the
        // end of the data and yields an empty page.
        assert_eq!(page_skip(i64::MAX, 10), i64::MAX);
        assert_eq!(page_skip(i64::MAX, 100), i64::MAX);
    }

    #[test]
    fn test_has_more_saturates_and_compares() {
        assert!(has_more(1, 10, 25));
        assert!(has_more(2, 10, 25));
        assert!(!has_more(3, 10, 25));
        assert!(!has_more(i64::MAX, 100, 25));
    }

    #[test]
    fn test_field_too_long() {
        assert!(!field_too_long(None, 5));
        assert!(!field_too_long(Some("abcde"), 5));
        assert!(field_too_long(Some("abcdef"), 5));
    }

    async fn send(
        app: Router,
        req: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_create_without_token_returns_unauthorized() {
        let body = serde_json::json!({
            "title": "Hello World",
            "description": "d",
            "coverImage": "img"
        });
        let req = Request::post("/api/blog")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, json) = send(blog_router(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_update_without_token_returns_unauthorized() {
        let req = Request::patch(format!("/api/blog/{}", Uuid::new_v4()))
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, _) = send(blog_router(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_without_token_returns_unauthorized() {
        let req = Request::delete(format!("/api/blog/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(blog_router(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tags_with_invalid_user_id_returns_bad_request() {
        let req = Request::get("/api/blog/tags?userId=not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(blog_router(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_tags_with_missing_user_id_returns_bad_request() {
        let req = Request::get("/api/blog/tags").body(Body::empty()).unwrap();
        let (status, _) = send(blog_router(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_without_database_returns_service_unavailable() {
        let req = Request::get("/api/blog?page=1&limit=10")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(blog_router(), req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
