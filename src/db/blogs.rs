//! Blog data access: translates structured filter requests into SQL and
//! serializes rows into transport objects with the author expanded inline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::models::{BlogDoc, BlogRow, BlogStatus};

/// Columns selected for every blog read, joined with the post's author.
const BLOG_SELECT: &str = "SELECT b.id, b.title, b.slug, b.description, b.cover_image, \
     b.tags, b.status, b.is_featured, b.published_at, b.created_at, b.updated_at, \
     u.id AS author_id, u.name AS author_name, u.email AS author_email, \
     u.image AS author_image \
     FROM blog_posts b JOIN users u ON u.id = b.author_id";

/// Optional constraints, AND-conjoined. Absent fields impose nothing.
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub status: Option<BlogStatus>,
    pub is_featured: Option<bool>,
    /// Exact-match single tag.
    pub tag: Option<String>,
    /// Any-of tag match (array overlap).
    pub tags: Option<Vec<String>>,
    pub author: Option<Uuid>,
    /// Case-insensitive substring against title OR description,
    /// taken literally (pattern metacharacters are escaped).
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A full listing request: filter plus sort and offset pagination.
#[derive(Debug, Clone, Default)]
pub struct BlogQuery {
    pub filter: BlogFilter,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    /// Caller-facing sort key; mapped through a column whitelist.
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

/// Lookup key chosen by a cheap format check: UUID-shaped strings go by id,
/// everything else by slug equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlogLookup {
    ById(Uuid),
    BySlug(String),
}

impl BlogLookup {
    pub fn parse(id_or_slug: &str) -> Self {
        match Uuid::parse_str(id_or_slug) {
            Ok(id) => BlogLookup::ById(id),
            Err(_) => BlogLookup::BySlug(id_or_slug.to_string()),
        }
    }
}

/// Fields for a new post; validation happens at the route layer.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    pub author_id: Uuid,
    pub status: BlogStatus,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}

/// Fully merged field set for an update; the route layer merges the caller's
/// partial payload over the existing row before calling `update_blog`.
#[derive(Debug, Clone)]
pub struct BlogUpdate {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    pub status: BlogStatus,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}

/// One tag with its occurrence count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// Escape `LIKE` pattern metacharacters so a search term is matched literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '\\' || c == '%' || c == '_' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Map a caller-facing sort key to a real column. Unknown keys fall back to
/// the creation timestamp rather than erroring; the raw value never reaches
/// the SQL text.
pub fn sort_column(sort_by: Option<&str>) -> &'static str {
    match sort_by {
        Some("publishedAt") | Some("published_at") => "b.published_at",
        Some("updatedAt") | Some("updated_at") => "b.updated_at",
        Some("title") => "b.title",
        _ => "b.created_at",
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BlogFilter) {
    let mut sep = " WHERE ";
    let mut and = |qb: &mut QueryBuilder<'_, Postgres>| {
        qb.push(sep);
        sep = " AND ";
    };

    if let Some(status) = filter.status {
        and(qb);
        qb.push("b.status = ").push_bind(status);
    }
    if let Some(is_featured) = filter.is_featured {
        and(qb);
        qb.push("b.is_featured = ").push_bind(is_featured);
    }
    if let Some(tag) = &filter.tag {
        and(qb);
        qb.push_bind(tag.clone()).push(" = ANY(b.tags)");
    }
    if let Some(tags) = &filter.tags {
        if !tags.is_empty() {
            and(qb);
            qb.push("b.tags && ").push_bind(tags.clone());
        }
    }
    if let Some(author) = filter.author {
        and(qb);
        qb.push("b.author_id = ").push_bind(author);
    }
    if let Some(search) = &filter.search {
        if !search.is_empty() {
            let pattern = format!("%{}%", escape_like(search));
            and(qb);
            qb.push("(b.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR b.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

fn build_list_query(query: &BlogQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(BLOG_SELECT);
    push_filters(&mut qb, &query.filter);

    let column = sort_column(query.sort_by.as_deref());
    qb.push(" ORDER BY ").push(column);
    qb.push(" ").push(query.sort_order.sql());
    if column == "b.published_at" {
        qb.push(" NULLS LAST");
    }
    // Secondary key keeps offset pagination stable across equal sort values.
    qb.push(", b.id DESC");

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if let Some(skip) = query.skip {
        qb.push(" OFFSET ").push_bind(skip);
    }
    qb
}

/// List posts matching every supplied filter. No match means an empty list.
pub async fn list_blogs(pool: &PgPool, query: &BlogQuery) -> Result<Vec<BlogDoc>, sqlx::Error> {
    let mut qb = build_list_query(query);
    let rows: Vec<BlogRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(BlogDoc::from).collect())
}

/// Count posts matching the filter (pagination totals).
pub async fn count_blogs(pool: &PgPool, filter: &BlogFilter) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::new(
        "SELECT COUNT(*) FROM blog_posts b JOIN users u ON u.id = b.author_id",
    );
    push_filters(&mut qb, filter);
    let (count,): (i64,) = qb.build_query_as().fetch_one(pool).await?;
    Ok(count)
}

/// Fetch one post by id or slug. An unknown key yields `None`, never an error.
pub async fn get_blog(pool: &PgPool, lookup: &BlogLookup) -> Result<Option<BlogDoc>, sqlx::Error> {
    let row: Option<BlogRow> = match lookup {
        BlogLookup::ById(id) => {
            sqlx::query_as(&format!("{BLOG_SELECT} WHERE b.id = $1"))
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        BlogLookup::BySlug(slug) => {
            sqlx::query_as(&format!("{BLOG_SELECT} WHERE b.slug = $1"))
                .bind(slug)
                .fetch_optional(pool)
                .await?
        }
    };
    Ok(row.map(BlogDoc::from))
}

fn published_query(limit: i64) -> BlogQuery {
    BlogQuery {
        filter: BlogFilter {
            status: Some(BlogStatus::Published),
            ..Default::default()
        },
        limit: Some(limit),
        sort_by: Some("publishedAt".to_string()),
        sort_order: SortOrder::Desc,
        ..Default::default()
    }
}

/// Featured published posts, newest publication first. Returns at most
/// `limit` posts and does not pad with non-featured ones.
pub async fn featured_blogs(pool: &PgPool, limit: i64) -> Result<Vec<BlogDoc>, sqlx::Error> {
    let mut query = published_query(limit);
    query.filter.is_featured = Some(true);
    list_blogs(pool, &query).await
}

/// Latest published posts.
pub async fn latest_blogs(pool: &PgPool, limit: i64) -> Result<Vec<BlogDoc>, sqlx::Error> {
    list_blogs(pool, &published_query(limit)).await
}

/// Published posts carrying the given tag.
pub async fn blogs_by_tag(
    pool: &PgPool,
    tag: &str,
    limit: i64,
) -> Result<Vec<BlogDoc>, sqlx::Error> {
    let mut query = published_query(limit);
    query.filter.tag = Some(tag.to_string());
    list_blogs(pool, &query).await
}

/// Published posts sharing a tag with the given post, excluding it. A post
/// without tags falls back to the latest published posts.
pub async fn related_blogs(
    pool: &PgPool,
    blog_id: Uuid,
    limit: i64,
) -> Result<Vec<BlogDoc>, sqlx::Error> {
    let tags: Option<(Vec<String>,)> = sqlx::query_as("SELECT tags FROM blog_posts WHERE id = $1")
        .bind(blog_id)
        .fetch_optional(pool)
        .await?;

    let tags = match tags {
        Some((tags,)) if !tags.is_empty() => tags,
        _ => return latest_blogs(pool, limit).await,
    };

    let rows: Vec<BlogRow> = sqlx::query_as(&format!(
        "{BLOG_SELECT} WHERE b.id <> $1 AND b.status = 'published' AND b.tags && $2 \
         ORDER BY b.published_at DESC NULLS LAST, b.id DESC LIMIT $3"
    ))
    .bind(blog_id)
    .bind(&tags)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(BlogDoc::from).collect())
}

/// Tags used by one author's posts with occurrence counts, most used first.
pub async fn tags_with_count(pool: &PgPool, author: Uuid) -> Result<Vec<TagCount>, sqlx::Error> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT t.tag, COUNT(*) AS count
        FROM blog_posts b
        CROSS JOIN LATERAL unnest(b.tags) AS t(tag)
        WHERE b.author_id = $1
        GROUP BY t.tag
        ORDER BY count DESC, t.tag ASC
        "#,
    )
    .bind(author)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect())
}

/// Does any post (other than `exclude`) already claim this slug?
pub async fn slug_exists(
    pool: &PgPool,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = match exclude {
        Some(id) => {
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM blog_posts WHERE slug = $1 AND id <> $2)")
                .bind(slug)
                .bind(id)
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM blog_posts WHERE slug = $1)")
                .bind(slug)
                .fetch_one(pool)
                .await?
        }
    };
    Ok(exists)
}

/// Insert a post and return it with the author expanded.
pub async fn insert_blog(pool: &PgPool, new: &NewBlog) -> Result<BlogDoc, sqlx::Error> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO blog_posts
            (title, slug, description, cover_image, tags, author_id,
             status, is_featured, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(&new.title)
    .bind(&new.slug)
    .bind(&new.description)
    .bind(&new.cover_image)
    .bind(&new.tags)
    .bind(new.author_id)
    .bind(new.status)
    .bind(new.is_featured)
    .bind(new.published_at)
    .fetch_one(pool)
    .await?;

    let doc = get_blog(pool, &BlogLookup::ById(id)).await?;
    doc.ok_or(sqlx::Error::RowNotFound)
}

/// Overwrite a post with the merged field set and return the updated document.
pub async fn update_blog(
    pool: &PgPool,
    id: Uuid,
    update: &BlogUpdate,
) -> Result<Option<BlogDoc>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = $1, slug = $2, description = $3, cover_image = $4, tags = $5,
            status = $6, is_featured = $7, published_at = $8, updated_at = now()
        WHERE id = $9
        "#,
    )
    .bind(&update.title)
    .bind(&update.slug)
    .bind(&update.description)
    .bind(&update.cover_image)
    .bind(&update.tags)
    .bind(update.status)
    .bind(update.is_featured)
    .bind(update.published_at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_blog(pool, &BlogLookup::ById(id)).await
}

/// Delete a post; `true` when a row was removed.
pub async fn delete_blog(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        // Regex metacharacters are not LIKE metacharacters; they pass through
        // and are matched literally by ILIKE.
        assert_eq!(escape_like("a.b*"), "a.b*");
    }

    #[test]
    fn test_sort_column_whitelist() {
        assert_eq!(sort_column(Some("publishedAt")), "b.published_at");
        assert_eq!(sort_column(Some("title")), "b.title");
        assert_eq!(sort_column(None), "b.created_at");
        // Arbitrary input never reaches the SQL text.
        assert_eq!(sort_column(Some("id; DROP TABLE blog_posts")), "b.created_at");
    }

    #[test]
    fn test_lookup_parse_routes_by_shape() {
        let id = Uuid::new_v4();
        assert_eq!(BlogLookup::parse(&id.to_string()), BlogLookup::ById(id));
        assert_eq!(
            BlogLookup::parse("not-a-valid-objectid"),
            BlogLookup::BySlug("not-a-valid-objectid".to_string())
        );
    }

    #[test]
    fn test_no_filters_means_no_where_clause() {
        let query = BlogQuery::default();
        let qb = build_list_query(&query);
        let sql = qb.sql();
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("ORDER BY b.created_at DESC, b.id DESC"));
    }

    #[test]
    fn test_filters_are_conjoined() {
        let query = BlogQuery {
            filter: BlogFilter {
                status: Some(BlogStatus::Published),
                is_featured: Some(true),
                tag: Some("rust".into()),
                search: Some("axum".into()),
                ..Default::default()
            },
            limit: Some(10),
            skip: Some(20),
            ..Default::default()
        };
        let qb = build_list_query(&query);
        let sql = qb.sql();
        assert!(sql.contains("b.status = $1"));
        assert!(sql.contains(" AND b.is_featured = $2"));
        assert!(sql.contains(" AND $3 = ANY(b.tags)"));
        assert!(sql.contains("(b.title ILIKE $4 OR b.description ILIKE $5)"));
        assert!(sql.contains("LIMIT $6"));
        assert!(sql.contains("OFFSET $7"));
    }

    #[test]
    fn test_published_at_sort_places_nulls_last() {
        let query = BlogQuery {
            sort_by: Some("publishedAt".into()),
            ..Default::default()
        };
        let qb = build_list_query(&query);
        assert!(qb.sql().contains("ORDER BY b.published_at DESC NULLS LAST, b.id DESC"));
    }

    #[test]
    fn test_empty_search_and_empty_tags_impose_nothing() {
        let query = BlogQuery {
            filter: BlogFilter {
                search: Some(String::new()),
                tags: Some(vec![]),
                ..Default::default()
            },
            ..Default::default()
        };
        let qb = build_list_query(&query);
        assert!(!qb.sql().contains("WHERE"));
    }

    #[test]
    fn test_published_query_filters_and_sorts_by_publication() {
        let mut query = published_query(5);
        query.filter.is_featured = Some(true);
        let qb = build_list_query(&query);
        let sql = qb.sql();
        assert!(sql.contains("b.status = $1"));
        assert!(sql.contains("b.is_featured = $2"));
        assert!(sql.contains("ORDER BY b.published_at DESC NULLS LAST, b.id DESC"));
        assert!(sql.contains("LIMIT $3"));
    }

    #[test]
    fn test_sort_order_default_is_desc() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        let parsed: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(parsed, SortOrder::Asc);
    }
}
