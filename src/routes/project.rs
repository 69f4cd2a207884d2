/**
 * Project Routes
 * Admin-only CRUD for portfolio projects. Unlike blogs there is no ownership
 * check: any allow-listed admin can manage every project.
 */
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{
    self,
    models::{ProjectDoc, ProjectStatus, ProjectType, TechStackItem},
    projects::{self, NewProject, ProjectLookup, ProjectUpdate},
};
use crate::routes::auth::require_admin;
use crate::slug::slugify;

const SHORT_DESCRIPTION_MAX_CHARS: usize = 200;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub success: bool,
    pub data: Vec<ProjectDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ProjectDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProjectResponse {
    fn ok(data: ProjectDoc, message: Option<&str>) -> Self {
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

/// Request body for POST /api/project (create)
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub image: Option<String>,
    pub image_public_id: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub tech_stack: Vec<TechStackItem>,
    pub live_url: Option<String>,
    pub repo_url: Option<String>,
    #[serde(default)]
    pub is_freelance: bool,
    pub client_name: Option<String>,
    pub client_location: Option<String>,
    pub client_industry: Option<String>,
    #[serde(default)]
    pub is_client_public: bool,
}

/// Request body for PUT /api/project (partial update, id in the body)
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub image: Option<String>,
    pub image_public_id: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
    pub status: Option<ProjectStatus>,
    pub tech_stack: Option<Vec<TechStackItem>>,
    pub live_url: Option<String>,
    pub repo_url: Option<String>,
    pub is_freelance: Option<bool>,
    pub client_name: Option<String>,
    pub client_location: Option<String>,
    pub client_industry: Option<String>,
    pub is_client_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProjectQuery {
    pub id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/project - All projects, newest first (admin)
pub async fn list_projects(headers: HeaderMap) -> impl IntoResponse {
    if let Err((status, Json(err))) = require_admin(&headers).await {
        return (
            status,
            Json(ProjectListResponse {
                success: false,
                data: vec![],
                error: Some(err.error),
            }),
        )
            .into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ProjectListResponse {
                    success: false,
                    data: vec![],
                    error: Some("Database not available".to_string()),
                }),
            )
                .into_response();
        }
    };

    match projects::list_projects(pool.as_ref()).await {
        Ok(data) if data.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(ProjectListResponse {
                success: false,
                data: vec![],
                error: Some("Projects not found".to_string()),
            }),
        )
            .into_response(),
        Ok(data) => (
            StatusCode::OK,
            Json(ProjectListResponse {
                success: true,
                data,
                error: None,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Database error listing projects: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProjectListResponse {
                    success: false,
                    data: vec![],
                    error: Some("Failed to fetch projects".to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/project/:idOrSlug - Single project (admin)
pub async fn get_project(headers: HeaderMap, Path(id_or_slug): Path<String>) -> impl IntoResponse {
    if let Err((status, Json(err))) = require_admin(&headers).await {
        return (status, Json(ProjectResponse::err(err.error)));
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ProjectResponse::err("Database not available")),
            );
        }
    };

    match projects::get_project(pool.as_ref(), &ProjectLookup::parse(&id_or_slug)).await {
        Ok(Some(project)) => (StatusCode::OK, Json(ProjectResponse::ok(project, None))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ProjectResponse::err("Project not found")),
        ),
        Err(e) => {
            tracing::error!("Database error fetching project: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProjectResponse::err("Failed to fetch project")),
            )
        }
    }
}

/// POST /api/project - Create project (admin). The slug is always derived
/// from the title.
pub async fn create_project(
    headers: HeaderMap,
    Json(payload): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    if let Err((status, Json(err))) = require_admin(&headers).await {
        return (status, Json(ProjectResponse::err(err.error))).into_response();
    }

    let title = payload.title.as_deref().map(str::trim).unwrap_or("");
    let short_description = payload
        .short_description
        .as_deref()
        .map(str::trim)
        .unwrap_or("");
    let image = payload.image.as_deref().unwrap_or("");

    let project_type = match payload.project_type {
        Some(t) => t,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ProjectResponse::err("Required fields are missing")),
            )
                .into_response();
        }
    };

    if title.is_empty() || short_description.is_empty() || image.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ProjectResponse::err("Required fields are missing")),
        )
            .into_response();
    }

    if short_description.chars().count() > SHORT_DESCRIPTION_MAX_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            Json(ProjectResponse::err(
                "Short description must be 200 characters or less",
            )),
        )
            .into_response();
    }

    let slug = slugify(title);
    if slug.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ProjectResponse::err(
                "Title must contain at least one alphanumeric character",
            )),
        )
            .into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ProjectResponse::err("Database not available")),
            )
                .into_response();
        }
    };

    match projects::slug_exists(pool.as_ref(), &slug, None).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(ProjectResponse::err(
                    "A project with this title already exists",
                )),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!("Database error checking slug: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProjectResponse::err("Failed to create project")),
            )
                .into_response();
        }
    }

    let new = NewProject {
        title: title.to_string(),
        slug,
        short_description: short_description.to_string(),
        image: image.to_string(),
        image_public_id: payload.image_public_id,
        project_type,
        status: payload.status.unwrap_or(ProjectStatus::Building),
        tech_stack: payload.tech_stack,
        live_url: payload.live_url,
        repo_url: payload.repo_url,
        is_freelance: payload.is_freelance,
        client_name: payload.client_name,
        client_location: payload.client_location,
        client_industry: payload.client_industry,
        is_client_public: payload.is_client_public,
    };

    match projects::insert_project(pool.as_ref(), &new).await {
        Ok(project) => (
            StatusCode::CREATED,
            Json(ProjectResponse::ok(
                project,
                Some("Project created successfully"),
            )),
        )
            .into_response(),
        Err(e) => {
            if db::is_unique_violation(&e) {
                return (
                    StatusCode::CONFLICT,
                    Json(ProjectResponse::err(
                        "A project with this title already exists",
                    )),
                )
                    .into_response();
            }
            tracing::error!("Database error creating project: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProjectResponse::err("Failed to create project")),
            )
                .into_response()
        }
    }
}

/// PUT /api/project - Partial update; the target id rides in the body.
/// A new title re-derives the slug.
pub async fn update_project(
    headers: HeaderMap,
    Json(payload): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    if let Err((status, Json(err))) = require_admin(&headers).await {
        return (status, Json(ProjectResponse::err(err.error))).into_response();
    }

    let id = match payload.id.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ProjectResponse::err("Valid project ID is required")),
            )
                .into_response();
        }
    };

    if payload
        .short_description
        .as_deref()
        .is_some_and(|d| d.chars().count() > SHORT_DESCRIPTION_MAX_CHARS)
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(ProjectResponse::err(
                "Short description must be 200 characters or less",
            )),
        )
            .into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ProjectResponse::err("Database not available")),
            )
                .into_response();
        }
    };

    let existing = match projects::get_project(pool.as_ref(), &ProjectLookup::ById(id)).await {
        Ok(Some(project)) => project,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ProjectResponse::err("Project not found")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching project: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProjectResponse::err("Failed to update project")),
            )
                .into_response();
        }
    };

    // A title change carries the slug with it
    let (title, slug) = match payload.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() && t != existing.title => {
            let slug = slugify(t);
            if slug.is_empty() {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ProjectResponse::err(
                        "Title must contain at least one alphanumeric character",
                    )),
                )
                    .into_response();
            }
            if slug != existing.slug {
                match projects::slug_exists(pool.as_ref(), &slug, Some(id)).await {
                    Ok(true) => {
                        return (
                            StatusCode::CONFLICT,
                            Json(ProjectResponse::err(
                                "A project with this title already exists",
                            )),
                        )
                            .into_response();
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!("Database error checking slug: {}", e);
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(ProjectResponse::err("Failed to update project")),
                        )
                            .into_response();
                    }
                }
            }
            (t.to_string(), slug)
        }
        _ => (existing.title.clone(), existing.slug.clone()),
    };

    let update = ProjectUpdate {
        title,
        slug,
        short_description: payload
            .short_description
            .map(|d| d.trim().to_string())
            .unwrap_or(existing.short_description),
        image: payload.image.unwrap_or(existing.image),
        image_public_id: payload.image_public_id.or(existing.image_public_id),
        project_type: payload.project_type.unwrap_or(existing.project_type),
        status: payload.status.unwrap_or(existing.status),
        tech_stack: payload.tech_stack.unwrap_or(existing.tech_stack),
        live_url: payload.live_url.or(existing.live_url),
        repo_url: payload.repo_url.or(existing.repo_url),
        is_freelance: payload.is_freelance.unwrap_or(existing.is_freelance),
        client_name: payload.client_name.or(existing.client_name),
        client_location: payload.client_location.or(existing.client_location),
        client_industry: payload.client_industry.or(existing.client_industry),
        is_client_public: payload.is_client_public.unwrap_or(existing.is_client_public),
    };

    match projects::update_project(pool.as_ref(), id, &update).await {
        Ok(Some(project)) => (
            StatusCode::OK,
            Json(ProjectResponse::ok(
                project,
                Some("Project updated successfully"),
            )),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ProjectResponse::err("Project not found")),
        )
            .into_response(),
        Err(e) => {
            if db::is_unique_violation(&e) {
                return (
                    StatusCode::CONFLICT,
                    Json(ProjectResponse::err(
                        "A project with this title already exists",
                    )),
                )
                    .into_response();
            }
            tracing::error!("Database error updating project: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProjectResponse::err("Failed to update project")),
            )
                .into_response()
        }
    }
}

/// DELETE /api/project?id=... - Delete project (admin)
pub async fn delete_project(
    headers: HeaderMap,
    Query(query): Query<DeleteProjectQuery>,
) -> impl IntoResponse {
    if let Err((status, Json(err))) = require_admin(&headers).await {
        return (status, Json(ProjectResponse::err(err.error))).into_response();
    }

    let id = match query.id.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ProjectResponse::err("Valid project ID is required")),
            )
                .into_response();
        }
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ProjectResponse::err("Database not available")),
            )
                .into_response();
        }
    };

    match projects::delete_project(pool.as_ref(), id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ProjectResponse {
                success: true,
                data: None,
                message: Some("Project deleted successfully".to_string()),
                error: None,
            }),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ProjectResponse::err("Project not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Database error deleting project: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProjectResponse::err("Failed to delete project")),
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
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn project_router() -> Router {
        Router::new()
            .route(
                "/api/project",
                get(list_projects)
                    .post(create_project)
                    .put(update_project)
                    .delete(delete_project),
            )
            .route("/api/project/{id}", get(get_project))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_list_without_token_returns_unauthorized() {
        let req = Request::get("/api/project").body(Body::empty()).unwrap();
        let (status, json) = send(project_router(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_get_without_token_returns_unauthorized() {
        let req = Request::get("/api/project/some-slug")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(project_router(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_without_token_returns_unauthorized() {
        let body = serde_json::json!({
            "title": "My Project",
            "shortDescription": "d",
            "image": "img",
            "type": "backend"
        });
        let req = Request::post("/api/project")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _) = send(project_router(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_without_token_returns_unauthorized() {
        let req = Request::delete(format!("/api/project?id={}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(project_router(), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_create_request_accepts_full_stack_type() {
        let json = serde_json::json!({
            "title": "App",
            "shortDescription": "d",
            "image": "img",
            "type": "fullStack"
        });
        let req: CreateProjectRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.project_type, Some(ProjectType::FullStack));
    }

    #[test]
    fn test_update_request_is_fully_optional() {
        let req: UpdateProjectRequest = serde_json::from_str("{}").unwrap();
        assert!(req.id.is_none());
        assert!(req.title.is_none());
        assert!(req.tech_stack.is_none());
    }
}
