/**
 * Authorization gate
 * Session-token verification plus the admin email allow-list. The browser
 * flow (Google OAuth) lives in the frontend's session library; both sides
 * share SESSION_SECRET, so this service only has to verify the JWT it minted.
 */
use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{self, models::User};
use crate::routes::ErrorResponse;

lazy_static::lazy_static! {
    /// Shared secret for session tokens.
    pub static ref SESSION_SECRET: String = std::env::var("SESSION_SECRET")
        .unwrap_or_else(|_| "default-session-secret-change-in-production".to_string());

    /// Lowercased admin email allow-list from ADMIN_EMAILS (comma-separated).
    pub static ref ADMIN_EMAILS: Vec<String> =
        parse_admin_emails(&std::env::var("ADMIN_EMAILS").unwrap_or_default());
}

/// Session token claims. `name` and `picture` ride along from the OAuth
/// profile so the users row can be refreshed on sign-in.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Resolved admin identity: the users row matching the session email.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Session user info returned to the frontend.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub user: Option<SessionUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

pub fn is_admin_email(email: &str) -> bool {
    ADMIN_EMAILS.contains(&email.to_lowercase())
}

pub fn verify_session_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(SESSION_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

type AuthRejection = (StatusCode, Json<ErrorResponse>);

fn unauthorized(msg: &str) -> AuthRejection {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(msg)))
}

/// The single authorization predicate: a valid session token whose email is
/// on the allow-list. On success the users row is upserted (created on first
/// sign-in, name/image refreshed afterwards) and returned.
pub async fn require_admin(headers: &HeaderMap) -> Result<AdminSession, AuthRejection> {
    let token = match extract_bearer_token(headers) {
        Some(t) => t,
        None => return Err(unauthorized("Authorization required")),
    };

    let claims = match verify_session_token(&token) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("Session token verification failed: {}", e);
            return Err(unauthorized("Invalid or expired token"));
        }
    };

    if !is_admin_email(&claims.email) {
        tracing::warn!("Rejected non-admin session for: {}", claims.email);
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Forbidden: admin access required")),
        ));
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("Database not available")),
            ));
        }
    };

    let user: User = match sqlx::query_as(
        r#"
        INSERT INTO users (name, email, image)
        VALUES ($1, LOWER($2), $3)
        ON CONFLICT (email) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, users.name),
                image = COALESCE(EXCLUDED.image, users.image),
                updated_at = now()
        RETURNING id, name, email, image, role, created_at, updated_at
        "#,
    )
    .bind(&claims.name)
    .bind(&claims.email)
    .bind(&claims.picture)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Failed to upsert session user: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Database error")),
            ));
        }
    };

    Ok(AdminSession {
        user_id: user.id,
        email: user.email,
        name: user.name,
        image: user.image,
    })
}

/// GET /api/auth/session
/// Verifies the bearer session and returns the (upserted) admin user.
pub async fn get_session(headers: HeaderMap) -> impl IntoResponse {
    match require_admin(&headers).await {
        Ok(session) => (
            StatusCode::OK,
            Json(SessionResponse {
                success: true,
                user: Some(SessionUser {
                    id: session.user_id,
                    email: session.email,
                    name: session.name,
                    image: session.image,
                    role: "admin".to_string(),
                }),
                error: None,
            }),
        )
            .into_response(),
        Err((status, Json(err))) => (
            status,
            Json(SessionResponse {
                success: false,
                user: None,
                error: Some(err.error),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tower::ServiceExt;

    fn mint_token(email: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: "test-subject".to_string(),
            email: email.to_string(),
            name: Some("Test".to_string()),
            picture: None,
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn session_router() -> Router {
        Router::new().route("/api/auth/session", get(get_session))
    }

    #[test]
    fn test_parse_admin_emails_trims_and_lowercases() {
        let emails = parse_admin_emails(" Me@Example.com , other@example.com ,,");
        assert_eq!(emails, vec!["me@example.com", "other@example.com"]);
    }

    #[test]
    fn test_parse_admin_emails_empty_input() {
        assert!(parse_admin_emails("").is_empty());
    }

    #[test]
    fn test_verify_session_token_invalid_returns_err() {
        assert!(verify_session_token("invalid.jwt.token").is_err());
    }

    #[test]
    fn test_verify_session_token_roundtrip() {
        let token = mint_token("someone@example.com");
        let claims = verify_session_token(&token).unwrap();
        assert_eq!(claims.email, "someone@example.com");
    }

    #[tokio::test]
    async fn test_session_without_token_returns_unauthorized() {
        let req = Request::get("/api/auth/session").body(Body::empty()).unwrap();
        let res = session_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_with_garbage_token_returns_unauthorized() {
        let req = Request::get("/api/auth/session")
            .header("authorization", "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let res = session_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_with_non_allow_listed_email_returns_forbidden() {
        // ADMIN_EMAILS is unset in tests, so the allow-list is empty and
        // every authenticated email is rejected before any database access.
        let token = mint_token("stranger@example.com");
        let req = Request::get("/api/auth/session")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let res = session_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
