//! Project data access. Simpler than the blog layer: no author ownership and
//! a single fixed sort (newest first).

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{ProjectDoc, ProjectRow, ProjectStatus, ProjectType, TechStackItem};

const PROJECT_COLS: &str = "id, title, slug, short_description, image, \
     image_public_id, project_type, status, tech_stack, live_url, repo_url, \
     is_freelance, client_name, client_location, client_industry, is_client_public, \
     created_at, updated_at";

const PROJECT_SELECT: &str = "SELECT id, title, slug, short_description, image, \
     image_public_id, project_type, status, tech_stack, live_url, repo_url, \
     is_freelance, client_name, client_location, client_industry, is_client_public, \
     created_at, updated_at FROM projects";

/// Lookup key for a single project, by the same format check the blog layer
/// uses: UUID-shaped strings go by id, everything else by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLookup {
    ById(Uuid),
    BySlug(String),
}

impl ProjectLookup {
    pub fn parse(id_or_slug: &str) -> Self {
        match Uuid::parse_str(id_or_slug) {
            Ok(id) => ProjectLookup::ById(id),
            Err(_) => ProjectLookup::BySlug(id_or_slug.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub image: String,
    pub image_public_id: Option<String>,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub tech_stack: Vec<TechStackItem>,
    pub live_url: Option<String>,
    pub repo_url: Option<String>,
    pub is_freelance: bool,
    pub client_name: Option<String>,
    pub client_location: Option<String>,
    pub client_industry: Option<String>,
    pub is_client_public: bool,
}

/// Merged field set for an update (partial payload merged over the existing
/// row at the route layer).
pub type ProjectUpdate = NewProject;

/// All projects, newest first.
pub async fn list_projects(pool: &PgPool) -> Result<Vec<ProjectDoc>, sqlx::Error> {
    let rows: Vec<ProjectRow> =
        sqlx::query_as(&format!("{PROJECT_SELECT} ORDER BY created_at DESC, id DESC"))
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(ProjectDoc::from).collect())
}

/// Fetch one project; unknown keys yield `None`.
pub async fn get_project(
    pool: &PgPool,
    lookup: &ProjectLookup,
) -> Result<Option<ProjectDoc>, sqlx::Error> {
    let row: Option<ProjectRow> = match lookup {
        ProjectLookup::ById(id) => {
            sqlx::query_as(&format!("{PROJECT_SELECT} WHERE id = $1"))
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        ProjectLookup::BySlug(slug) => {
            sqlx::query_as(&format!("{PROJECT_SELECT} WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(pool)
                .await?
        }
    };
    Ok(row.map(ProjectDoc::from))
}

/// Does any project (other than `exclude`) already claim this slug?
pub async fn slug_exists(
    pool: &PgPool,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = match exclude {
        Some(id) => {
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM projects WHERE slug = $1 AND id <> $2)")
                .bind(slug)
                .bind(id)
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM projects WHERE slug = $1)")
                .bind(slug)
                .fetch_one(pool)
                .await?
        }
    };
    Ok(exists)
}

pub async fn insert_project(pool: &PgPool, new: &NewProject) -> Result<ProjectDoc, sqlx::Error> {
    let row: ProjectRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO projects
            (title, slug, short_description, image, image_public_id, project_type,
             status, tech_stack, live_url, repo_url, is_freelance, client_name,
             client_location, client_industry, is_client_public)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {PROJECT_COLS}
        "#
    ))
    .bind(&new.title)
    .bind(&new.slug)
    .bind(&new.short_description)
    .bind(&new.image)
    .bind(&new.image_public_id)
    .bind(new.project_type)
    .bind(new.status)
    .bind(sqlx::types::Json(&new.tech_stack))
    .bind(&new.live_url)
    .bind(&new.repo_url)
    .bind(new.is_freelance)
    .bind(&new.client_name)
    .bind(&new.client_location)
    .bind(&new.client_industry)
    .bind(new.is_client_public)
    .fetch_one(pool)
    .await?;

    Ok(ProjectDoc::from(row))
}

pub async fn update_project(
    pool: &PgPool,
    id: Uuid,
    update: &ProjectUpdate,
) -> Result<Option<ProjectDoc>, sqlx::Error> {
    let row: Option<ProjectRow> = sqlx::query_as(&format!(
        r#"
        UPDATE projects
        SET title = $1, slug = $2, short_description = $3, image = $4,
            image_public_id = $5, project_type = $6, status = $7, tech_stack = $8,
            live_url = $9, repo_url = $10, is_freelance = $11, client_name = $12,
            client_location = $13, client_industry = $14, is_client_public = $15,
            updated_at = now()
        WHERE id = $16
        RETURNING {PROJECT_COLS}
        "#
    ))
    .bind(&update.title)
    .bind(&update.slug)
    .bind(&update.short_description)
    .bind(&update.image)
    .bind(&update.image_public_id)
    .bind(update.project_type)
    .bind(update.status)
    .bind(sqlx::types::Json(&update.tech_stack))
    .bind(&update.live_url)
    .bind(&update.repo_url)
    .bind(update.is_freelance)
    .bind(&update.client_name)
    .bind(&update.client_location)
    .bind(&update.client_industry)
    .bind(update.is_client_public)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ProjectDoc::from))
}

/// Delete a project; `true` when a row was removed.
pub async fn delete_project(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_lookup_parse_routes_by_shape() {
        let id = Uuid::new_v4();
        assert_eq!(ProjectLookup::parse(&id.to_string()), ProjectLookup::ById(id));
        assert_eq!(
            ProjectLookup::parse("portfolio-website"),
            ProjectLookup::BySlug("portfolio-website".to_string())
        );
    }

    #[test]
    fn test_project_doc_uses_type_field_name() {
        let doc = ProjectDoc {
            id: Uuid::nil(),
            title: "P".into(),
            slug: "p".into(),
            short_description: "d".into(),
            image: "i".into(),
            image_public_id: None,
            project_type: ProjectType::Backend,
            status: ProjectStatus::Building,
            tech_stack: vec![TechStackItem {
                label: "Rust".into(),
                icon: "rust".into(),
            }],
            live_url: None,
            repo_url: None,
            is_freelance: false,
            client_name: None,
            client_location: None,
            client_industry: None,
            is_client_public: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "backend");
        assert_eq!(json["status"], "building");
        assert_eq!(json["techStack"][0]["label"], "Rust");
    }
}
