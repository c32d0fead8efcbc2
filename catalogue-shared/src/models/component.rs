/// Component catalogue model (read-only)
///
/// Components form a tree through a self-referencing `parent_id`; a component
/// without a parent is a navigation root. Every attachment table
/// (3D models, description paragraphs, technical details, documents, videos,
/// images) is a one-to-many child of `components`.
///
/// The catalogue is maintained by the administration module. Apart from the
/// `create*` helpers used for seeding and tests, everything here is a read.
///
/// File-backed attachments store a path relative to the media root; public
/// URLs are built with [`media_url`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Maximum number of rows returned by [`Component::search_by_name`]
pub const SEARCH_LIMIT: i64 = 10;

/// A node of the equipment tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Component {
    /// Component ID
    pub id: i64,

    /// Parent component, `None` for a root
    pub parent_id: Option<i64>,

    /// Display name, also the text side of image search
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Lightweight search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComponentSummary {
    pub id: i64,
    pub name: String,
}

/// A 3D model file attached to a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComponentModel3D {
    pub id: i64,
    pub component_id: i64,
    /// Path relative to the media root
    pub file_path: String,
}

/// One paragraph of a component's technical description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComponentDescriptionParagraph {
    pub id: i64,
    pub component_id: i64,
    pub content: String,
    /// Position of the paragraph in the sheet
    pub sequence: i32,
}

/// A label/value row of the technical details table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComponentDetail {
    pub id: i64,
    pub component_id: i64,
    pub label: String,
    pub value: String,
}

/// A document (manual, datasheet, ...) attached to a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComponentDocument {
    pub id: i64,
    pub component_id: i64,
    pub title: String,
    /// Path relative to the media root
    pub file_path: String,
}

/// A video linked to a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComponentVideo {
    pub id: i64,
    pub component_id: i64,
    pub title: String,
    pub video_url: String,
}

/// A reference image of a component, joined with the owning component's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComponentImage {
    pub id: i64,
    pub component_id: i64,
    /// Path relative to the media root
    pub image_path: String,
    pub component_name: String,
}

/// Everything shown on a component's technical sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSheet {
    pub component: Component,
    pub model3d: Option<ComponentModel3D>,
    /// Ordered by `sequence`, then `id`
    pub paragraphs: Vec<ComponentDescriptionParagraph>,
    pub details: Vec<ComponentDetail>,
    pub documents: Vec<ComponentDocument>,
    pub videos: Vec<ComponentVideo>,
}

/// Input for seeding a component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateComponent {
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: String,
}

/// Joins the public media prefix and a stored relative path.
///
/// ```
/// use catalogue_shared::models::component::media_url;
///
/// assert_eq!(media_url("/media/", "models/pump.glb"), "/media/models/pump.glb");
/// assert_eq!(media_url("/media", "/models/pump.glb"), "/media/models/pump.glb");
/// ```
pub fn media_url(media_prefix: &str, relative_path: &str) -> String {
    format!(
        "{}/{}",
        media_prefix.trim_end_matches('/'),
        relative_path.trim_start_matches('/')
    )
}

/// Escapes `\`, `%` and `_` so user input is matched literally by `ILIKE`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const COMPONENT_COLUMNS: &str = "id, parent_id, name, description, created_at";

impl Component {
    /// Inserts a component. Used for seeding and tests.
    pub async fn create(pool: &PgPool, data: CreateComponent) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Component>(&format!(
            "INSERT INTO components (parent_id, name, description) VALUES ($1, $2, $3) RETURNING {}",
            COMPONENT_COLUMNS
        ))
        .bind(data.parent_id)
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    /// Every component, in storage (ID) order. No pagination.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Component>(&format!(
            "SELECT {} FROM components ORDER BY id",
            COMPONENT_COLUMNS
        ))
        .fetch_all(pool)
        .await
    }

    /// The first parentless component by ID, if any.
    pub async fn find_root(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Component>(&format!(
            "SELECT {} FROM components WHERE parent_id IS NULL ORDER BY id LIMIT 1",
            COMPONENT_COLUMNS
        ))
        .fetch_optional(pool)
        .await
    }

    /// Finds a component by ID.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Component>(&format!(
            "SELECT {} FROM components WHERE id = $1",
            COMPONENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds the first component whose name is exactly `name`.
    ///
    /// Names are not unique in the catalogue; the lowest ID wins.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Component>(&format!(
            "SELECT {} FROM components WHERE name = $1 ORDER BY id LIMIT 1",
            COMPONENT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Case-insensitive substring search on the name, at most
    /// [`SEARCH_LIMIT`] rows. An empty query returns nothing without touching
    /// the database.
    pub async fn search_by_name(
        pool: &PgPool,
        query: &str,
    ) -> Result<Vec<ComponentSummary>, sqlx::Error> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(query));

        sqlx::query_as::<_, ComponentSummary>(
            r#"
            SELECT id, name
            FROM components
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await
    }

    /// First attached 3D model, if any.
    pub async fn first_model3d(
        pool: &PgPool,
        component_id: i64,
    ) -> Result<Option<ComponentModel3D>, sqlx::Error> {
        sqlx::query_as::<_, ComponentModel3D>(
            "SELECT id, component_id, file_path FROM component_models3d WHERE component_id = $1 ORDER BY id LIMIT 1",
        )
        .bind(component_id)
        .fetch_optional(pool)
        .await
    }

    /// Description paragraphs in sheet order.
    pub async fn paragraphs(
        pool: &PgPool,
        component_id: i64,
    ) -> Result<Vec<ComponentDescriptionParagraph>, sqlx::Error> {
        sqlx::query_as::<_, ComponentDescriptionParagraph>(
            r#"
            SELECT id, component_id, content, sequence
            FROM component_description_paragraphs
            WHERE component_id = $1
            ORDER BY sequence, id
            "#,
        )
        .bind(component_id)
        .fetch_all(pool)
        .await
    }

    pub async fn details(pool: &PgPool, component_id: i64) -> Result<Vec<ComponentDetail>, sqlx::Error> {
        sqlx::query_as::<_, ComponentDetail>(
            "SELECT id, component_id, label, value FROM component_details WHERE component_id = $1 ORDER BY id",
        )
        .bind(component_id)
        .fetch_all(pool)
        .await
    }

    pub async fn documents(
        pool: &PgPool,
        component_id: i64,
    ) -> Result<Vec<ComponentDocument>, sqlx::Error> {
        sqlx::query_as::<_, ComponentDocument>(
            "SELECT id, component_id, title, file_path FROM component_documents WHERE component_id = $1 ORDER BY id",
        )
        .bind(component_id)
        .fetch_all(pool)
        .await
    }

    pub async fn videos(pool: &PgPool, component_id: i64) -> Result<Vec<ComponentVideo>, sqlx::Error> {
        sqlx::query_as::<_, ComponentVideo>(
            "SELECT id, component_id, title, video_url FROM component_videos WHERE component_id = $1 ORDER BY id",
        )
        .bind(component_id)
        .fetch_all(pool)
        .await
    }

    /// Loads a component and all of its attachments.
    ///
    /// Returns `None` when the component does not exist.
    pub async fn technical_sheet(pool: &PgPool, id: i64) -> Result<Option<TechnicalSheet>, sqlx::Error> {
        let Some(component) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let model3d = Self::first_model3d(pool, id).await?;
        let paragraphs = Self::paragraphs(pool, id).await?;
        let details = Self::details(pool, id).await?;
        let documents = Self::documents(pool, id).await?;
        let videos = Self::videos(pool, id).await?;

        Ok(Some(TechnicalSheet {
            component,
            model3d,
            paragraphs,
            details,
            documents,
            videos,
        }))
    }

    /// Every reference image with its owning component's name. Not cached:
    /// image search reloads this on each request.
    pub async fn all_images(pool: &PgPool) -> Result<Vec<ComponentImage>, sqlx::Error> {
        sqlx::query_as::<_, ComponentImage>(
            r#"
            SELECT i.id, i.component_id, i.image_path, c.name AS component_name
            FROM component_images i
            JOIN components c ON c.id = i.component_id
            ORDER BY i.id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Deletes a component and its subtree of attachments (seeding/tests).
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM components WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ComponentModel3D {
    /// Attaches a 3D model file (seeding/tests).
    pub async fn create(pool: &PgPool, component_id: i64, file_path: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ComponentModel3D>(
            "INSERT INTO component_models3d (component_id, file_path) VALUES ($1, $2) RETURNING id, component_id, file_path",
        )
        .bind(component_id)
        .bind(file_path)
        .fetch_one(pool)
        .await
    }

    /// Public URL of the model file.
    pub fn url(&self, media_prefix: &str) -> String {
        media_url(media_prefix, &self.file_path)
    }
}

impl ComponentDescriptionParagraph {
    /// Adds a description paragraph (seeding/tests).
    pub async fn create(
        pool: &PgPool,
        component_id: i64,
        content: &str,
        sequence: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ComponentDescriptionParagraph>(
            r#"
            INSERT INTO component_description_paragraphs (component_id, content, sequence)
            VALUES ($1, $2, $3)
            RETURNING id, component_id, content, sequence
            "#,
        )
        .bind(component_id)
        .bind(content)
        .bind(sequence)
        .fetch_one(pool)
        .await
    }
}

impl ComponentDetail {
    pub async fn create(pool: &PgPool, component_id: i64, label: &str, value: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ComponentDetail>(
            "INSERT INTO component_details (component_id, label, value) VALUES ($1, $2, $3) RETURNING id, component_id, label, value",
        )
        .bind(component_id)
        .bind(label)
        .bind(value)
        .fetch_one(pool)
        .await
    }
}

impl ComponentDocument {
    pub async fn create(pool: &PgPool, component_id: i64, title: &str, file_path: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ComponentDocument>(
            "INSERT INTO component_documents (component_id, title, file_path) VALUES ($1, $2, $3) RETURNING id, component_id, title, file_path",
        )
        .bind(component_id)
        .bind(title)
        .bind(file_path)
        .fetch_one(pool)
        .await
    }

    /// Public URL of the document file.
    pub fn url(&self, media_prefix: &str) -> String {
        media_url(media_prefix, &self.file_path)
    }
}

impl ComponentVideo {
    pub async fn create(pool: &PgPool, component_id: i64, title: &str, video_url: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ComponentVideo>(
            "INSERT INTO component_videos (component_id, title, video_url) VALUES ($1, $2, $3) RETURNING id, component_id, title, video_url",
        )
        .bind(component_id)
        .bind(title)
        .bind(video_url)
        .fetch_one(pool)
        .await
    }
}

impl ComponentImage {
    /// Attaches a reference image (seeding/tests).
    pub async fn create(pool: &PgPool, component_id: i64, image_path: &str) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO component_images (component_id, image_path) VALUES ($1, $2) RETURNING id",
        )
        .bind(component_id)
        .bind(image_path)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }
}
