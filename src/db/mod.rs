pub mod blogs;
pub mod models;
pub mod projects;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use tokio::sync::OnceCell;

static DB_POOL: OnceCell<Arc<PgPool>> = OnceCell::const_new();

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/portfolio".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}

pub async fn init_pool(config: Option<DbConfig>) -> Result<Arc<PgPool>, sqlx::Error> {
    let config = config.unwrap_or_default();

    tracing::info!("Initializing database connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");

    let pool = Arc::new(pool);
    let _ = DB_POOL.set(pool.clone());

    Ok(pool)
}

pub fn get_pool() -> Option<Arc<PgPool>> {
    DB_POOL.get().cloned()
}

/// True when an error is a unique-constraint violation, e.g. two concurrent
/// creates racing past a slug pre-check.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|d| d.is_unique_violation())
}

pub async fn health_check() -> Result<std::time::Duration, sqlx::Error> {
    let pool = get_pool()
        .ok_or_else(|| sqlx::Error::Configuration("Database pool not initialized".into()))?;

    let start = std::time::Instant::now();
    sqlx::query("SELECT 1").fetch_one(pool.as_ref()).await?;

    Ok(start.elapsed())
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        DO $$ BEGIN
            CREATE TYPE blog_status AS ENUM ('draft', 'published', 'archived');
        EXCEPTION WHEN duplicate_object THEN NULL; END $$
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        DO $$ BEGIN
            CREATE TYPE project_type AS ENUM
                ('frontend', 'backend', 'fullStack', 'mobile', 'other');
        EXCEPTION WHEN duplicate_object THEN NULL; END $$
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        DO $$ BEGIN
            CREATE TYPE project_status AS ENUM ('building', 'completed', 'paused');
        EXCEPTION WHEN duplicate_object THEN NULL; END $$
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT,
            email TEXT UNIQUE NOT NULL,
            image TEXT,
            role TEXT NOT NULL DEFAULT 'admin',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            short_description TEXT NOT NULL,
            image TEXT NOT NULL,
            image_public_id TEXT,
            project_type project_type NOT NULL,
            status project_status NOT NULL DEFAULT 'building',
            tech_stack JSONB NOT NULL DEFAULT '[]',
            live_url TEXT,
            repo_url TEXT,
            is_freelance BOOLEAN NOT NULL DEFAULT false,
            client_name TEXT,
            client_location TEXT,
            client_industry TEXT,
            is_client_public BOOLEAN NOT NULL DEFAULT false,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    // Batched statements go through raw_sql: the simple protocol accepts
    // multiple commands, prepared statements do not.
    sqlx::raw_sql(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_slug ON projects(slug);
        CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at DESC)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blog_posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            description TEXT NOT NULL,
            cover_image TEXT NOT NULL,
            tags TEXT[] NOT NULL DEFAULT '{}',
            author_id UUID NOT NULL REFERENCES users(id),
            status blog_status NOT NULL DEFAULT 'draft',
            is_featured BOOLEAN NOT NULL DEFAULT false,
            published_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_blog_posts_slug ON blog_posts(slug);
        CREATE INDEX IF NOT EXISTS idx_blog_posts_status ON blog_posts(status);
        CREATE INDEX IF NOT EXISTS idx_blog_posts_author ON blog_posts(author_id);
        CREATE INDEX IF NOT EXISTS idx_blog_posts_created_at ON blog_posts(created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_blog_posts_published_at
            ON blog_posts(published_at DESC NULLS LAST);
        CREATE INDEX IF NOT EXISTS idx_blog_posts_tags ON blog_posts USING GIN(tags)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_default_uses_env_or_fallback() {
        let config = DbConfig::default();
        assert!(config.max_connections >= 1);
        assert!(config.connect_timeout_secs >= 1);
        assert!(config.idle_timeout_secs >= 1);
        assert!(!config.url.is_empty());
    }

    #[test]
    fn test_get_pool_none_before_init() {
        let pool = get_pool();
        assert!(pool.is_none());
    }

    #[tokio::test]
    async fn test_health_check_fails_without_pool() {
        let result = health_check().await;
        assert!(result.is_err());
    }

    #[test]
    fn test_is_unique_violation_ignores_non_database_errors() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
    }
}
