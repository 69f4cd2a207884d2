/**
 * Health Routes
 * Endpoints for checking backend health status
 */
use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Initialize the server start time
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Detailed health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub database: ServiceCheck,
}

/// Ready check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<ReadyChecks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyChecks {
    pub database: String,
}

/// Simple health response
#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

/// GET /health - Simple health ping
pub async fn health_ping() -> impl IntoResponse {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /health/detailed - Detailed health with all checks
pub async fn health_detailed() -> impl IntoResponse {
    let uptime = SERVER_START.elapsed().as_secs();

    let database_check = match crate::db::health_check().await {
        Ok(duration) => ServiceCheck {
            status: "healthy".to_string(),
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(e) => ServiceCheck {
            status: "unhealthy".to_string(),
            response_time: None,
            error: Some(e.to_string()),
        },
    };

    // Overall status is "ok" even without a database so the frontend can
    // tell the backend itself is running
    let response = DetailedHealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: Some(uptime),
        checks: HealthChecks {
            database: database_check,
        },
    };

    (StatusCode::OK, Json(response))
}

/// GET /health/database - Database health check
pub async fn health_database() -> impl IntoResponse {
    match crate::db::health_check().await {
        Ok(duration) => {
            let check = ServiceCheck {
                status: "healthy".to_string(),
                response_time: Some(duration.as_millis() as u64),
                error: None,
            };
            (StatusCode::OK, Json(check))
        }
        Err(e) => {
            let check = ServiceCheck {
                status: "unhealthy".to_string(),
                response_time: None,
                error: Some(e.to_string()),
            };
            (StatusCode::OK, Json(check))
        }
    }
}

/// GET /health/ready - Readiness check. Ready means the database answers;
/// every content route needs it.
pub async fn health_ready() -> impl IntoResponse {
    let uptime = SERVER_START.elapsed().as_secs();

    let is_ready = crate::db::health_check().await.is_ok();
    let database_status = if is_ready {
        "healthy".to_string()
    } else {
        "unhealthy".to_string()
    };

    let response = ReadyResponse {
        status: if is_ready {
            "ready".to_string()
        } else {
            "not ready".to_string()
        },
        timestamp: Utc::now(),
        uptime: Some(uptime),
        checks: Some(ReadyChecks {
            database: database_status,
        }),
        reason: if !is_ready {
            Some("Database is not healthy".to_string())
        } else {
            None
        },
    };

    let status = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/health", get(health_ping))
            .route("/health/detailed", get(health_detailed))
            .route("/health/database", get(health_database))
            .route("/health/ready", get(health_ready))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: T = serde_json::from_slice(&body).unwrap();
        (status, value)
    }

    #[test]
    fn test_service_check_skips_absent_fields() {
        let check = ServiceCheck {
            status: "healthy".to_string(),
            response_time: Some(10),
            error: None,
        };
        let json = serde_json::to_string(&check).unwrap();
        assert!(json.contains("healthy"));
        assert!(!json.contains("error"));
    }

    #[tokio::test]
    async fn test_health_ping_returns_ok() {
        let (status, body): (StatusCode, SimpleHealthResponse) =
            get_json(test_router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_health_detailed_reports_database_without_pool() {
        let (status, body): (StatusCode, DetailedHealthResponse) =
            get_json(test_router(), "/health/detailed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.database.status, "unhealthy");
    }

    #[tokio::test]
    async fn test_health_database_without_pool_is_unhealthy() {
        let (status, body): (StatusCode, ServiceCheck) =
            get_json(test_router(), "/health/database").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "unhealthy");
    }

    #[tokio::test]
    async fn test_health_ready_without_pool_is_not_ready() {
        let (status, body): (StatusCode, ReadyResponse) =
            get_json(test_router(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "not ready");
        assert_eq!(body.checks.unwrap().database, "unhealthy");
        assert!(body.reason.is_some());
    }
}
