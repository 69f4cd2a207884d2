//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Admin user, created on first allow-listed sign-in.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Blog post lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "blog_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Draft,
    Published,
    Archived,
}

/// Project category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "project_type")]
pub enum ProjectType {
    #[sqlx(rename = "frontend")]
    #[serde(rename = "frontend")]
    Frontend,
    #[sqlx(rename = "backend")]
    #[serde(rename = "backend")]
    Backend,
    #[sqlx(rename = "fullStack")]
    #[serde(rename = "fullStack")]
    FullStack,
    #[sqlx(rename = "mobile")]
    #[serde(rename = "mobile")]
    Mobile,
    #[sqlx(rename = "other")]
    #[serde(rename = "other")]
    Other,
}

/// Project build state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Building,
    Completed,
    Paused,
}

/// One entry of a project's ordered tech stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStackItem {
    pub label: String,
    pub icon: String,
}

/// Author summary expanded inline on blog reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
}

/// Flat row shape for blog queries joined with the author.
#[derive(Debug, Clone, FromRow)]
pub struct BlogRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    pub status: BlogStatus,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub author_email: String,
    pub author_image: Option<String>,
}

/// Blog post transport object: UUIDs as strings, timestamps as RFC 3339,
/// author expanded inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDoc {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    pub author: AuthorInfo,
    pub status: BlogStatus,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlogRow> for BlogDoc {
    fn from(row: BlogRow) -> Self {
        BlogDoc {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            cover_image: row.cover_image,
            tags: row.tags,
            author: AuthorInfo {
                id: row.author_id,
                name: row.author_name,
                email: row.author_email,
                image: row.author_image,
            },
            status: row.status,
            is_featured: row.is_featured,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Project row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub image: String,
    pub image_public_id: Option<String>,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub tech_stack: sqlx::types::Json<Vec<TechStackItem>>,
    pub live_url: Option<String>,
    pub repo_url: Option<String>,
    pub is_freelance: bool,
    pub client_name: Option<String>,
    pub client_location: Option<String>,
    pub client_industry: Option<String>,
    pub is_client_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project transport object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDoc {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub image: String,
    pub image_public_id: Option<String>,
    #[serde(rename = "type")]
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for ProjectDoc {
    fn from(row: ProjectRow) -> Self {
        ProjectDoc {
            id: row.id,
            title: row.title,
            slug: row.slug,
            short_description: row.short_description,
            image: row.image,
            image_public_id: row.image_public_id,
            project_type: row.project_type,
            status: row.status,
            tech_stack: row.tech_stack.0,
            live_url: row.live_url,
            repo_url: row.repo_url,
            is_freelance: row.is_freelance,
            client_name: row.client_name,
            client_location: row.client_location,
            client_industry: row.client_industry,
            is_client_public: row.is_client_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BlogStatus::Published).unwrap(),
            "\"published\""
        );
        assert_eq!(
            serde_json::to_string(&BlogStatus::Draft).unwrap(),
            "\"draft\""
        );
    }

    #[test]
    fn test_project_type_keeps_camel_case_variant() {
        assert_eq!(
            serde_json::to_string(&ProjectType::FullStack).unwrap(),
            "\"fullStack\""
        );
        let parsed: ProjectType = serde_json::from_str("\"fullStack\"").unwrap();
        assert_eq!(parsed, ProjectType::FullStack);
    }

    #[test]
    fn test_blog_doc_serializes_camel_case() {
        let row = BlogRow {
            id: Uuid::nil(),
            title: "t".into(),
            slug: "t".into(),
            description: "d".into(),
            cover_image: "img".into(),
            tags: vec!["rust".into()],
            status: BlogStatus::Draft,
            is_featured: false,
            published_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            author_id: Uuid::nil(),
            author_name: Some("A".into()),
            author_email: "a@example.com".into(),
            author_image: None,
        };
        let doc = BlogDoc::from(row);
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("coverImage").is_some());
        assert!(json.get("isFeatured").is_some());
        assert_eq!(json["author"]["email"], "a@example.com");
        assert!(json["publishedAt"].is_null());
    }
}
