use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use campgrounds::*;

const CAMPGROUND_COLUMNS: &str = "id, title, description, location, geometry, price, rating, \
     tag, images, author_id, review_ids, created_at, updated_at";

/// Campground row as stored in the `campgrounds` table
#[derive(Debug, sqlx::FromRow)]
struct CampgroundRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    geometry: Json<Geometry>,
    price: f64,
    rating: f64,
    tag: Option<String>,
    images: Json<Vec<ImageRef>>,
    author_id: Uuid,
    review_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CampgroundRow> for Campground {
    fn from(row: CampgroundRow) -> Self {
        Campground {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            geometry: row.geometry.0,
            price: row.price,
            rating: row.rating,
            tag: row.tag,
            images: row.images.0,
            author_id: row.author_id,
            review_ids: row.review_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Campground store backed by PostgreSQL.
///
/// Text search uses the case-insensitive regex operator `~*`, images and geometry are
/// JSONB columns, and review references are an ordered `UUID[]`. Queries without a
/// sort return campgrounds in creation order.
#[derive(Clone)]
pub struct PgCampgroundStore {
    pool: PgPool,
}

impl PgCampgroundStore {
    /// Creates a new instance of `PgCampgroundStore` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Builds the SELECT statement for a query descriptor
fn select_query(query: &QueryDescriptor) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM campgrounds", CAMPGROUND_COLUMNS));

    match &query.filter {
        CampgroundFilter::All => {}
        CampgroundFilter::TextSearch { pattern } => {
            builder
                .push(" WHERE (title ~* ")
                .push_bind(pattern.clone())
                .push(" OR location ~* ")
                .push_bind(pattern.clone())
                .push(")");
        }
        CampgroundFilter::TagIn { tags } => {
            builder
                .push(" WHERE tag = ANY(")
                .push_bind(tags.clone())
                .push(")");
        }
    }

    match query.sort {
        Some(sort) => {
            let column = match sort.field {
                SortField::Rating => "rating",
                SortField::Price => "price",
            };
            let direction = match sort.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            builder
                .push(" ORDER BY ")
                .push(column)
                .push(" ")
                .push(direction)
                .push(", created_at");
        }
        None => {
            builder.push(" ORDER BY created_at");
        }
    }

    builder
}

/// Surfaces schema constraint violations as validation failures
fn map_write_error(error: sqlx::Error) -> CampgroundError {
    if let sqlx::Error::Database(db_error) = &error {
        if matches!(
            db_error.kind(),
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation
        ) {
            return CampgroundError::Validation(db_error.message().to_string());
        }
    }
    CampgroundError::Database(error)
}

#[async_trait]
impl CampgroundStore for PgCampgroundStore {
    async fn find(&self, query: &QueryDescriptor) -> Result<Vec<Campground>, CampgroundError> {
        let rows = select_query(query)
            .build_query_as::<CampgroundRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Campground::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campground>, CampgroundError> {
        let sql = format!("SELECT {} FROM campgrounds WHERE id = $1", CAMPGROUND_COLUMNS);
        let row = sqlx::query_as::<_, CampgroundRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Campground::from))
    }

    async fn insert(&self, campground: NewCampground) -> Result<Campground, CampgroundError> {
        let sql = format!(
            r#"
            INSERT INTO campgrounds (
                id, title, description, location, geometry, price, rating, tag, images, author_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CAMPGROUND_COLUMNS
        );

        let row = sqlx::query_as::<_, CampgroundRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&campground.title)
            .bind(&campground.description)
            .bind(&campground.location)
            .bind(Json(&campground.geometry))
            .bind(campground.price)
            .bind(campground.rating)
            .bind(campground.tag.as_deref())
            .bind(Json(&campground.images))
            .bind(campground.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(row.into())
    }

    async fn update_fields(
        &self,
        id: Uuid,
        patch: &CampgroundPatch,
    ) -> Result<Option<Campground>, CampgroundError> {
        let sql = format!(
            r#"
            UPDATE campgrounds
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                price = COALESCE($5, price),
                tag = COALESCE($6, tag),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CAMPGROUND_COLUMNS
        );

        let row = sqlx::query_as::<_, CampgroundRow>(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.description.as_deref())
            .bind(patch.location.as_deref())
            .bind(patch.price)
            .bind(patch.tag.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(row.map(Campground::from))
    }

    async fn push_images(&self, id: Uuid, images: &[ImageRef]) -> Result<(), CampgroundError> {
        let result = sqlx::query(
            "UPDATE campgrounds SET images = images || $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(Json(images))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CampgroundError::NotFound(id));
        }

        Ok(())
    }

    async fn pull_images(&self, id: Uuid, filenames: &[String]) -> Result<(), CampgroundError> {
        let result = sqlx::query(
            r#"
            UPDATE campgrounds
            SET images = COALESCE(
                    (
                        SELECT jsonb_agg(e.image ORDER BY e.idx)
                        FROM jsonb_array_elements(images) WITH ORDINALITY AS e(image, idx)
                        WHERE NOT (e.image->>'filename' = ANY($2))
                    ),
                    '[]'::jsonb
                ),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(filenames)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CampgroundError::NotFound(id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CampgroundError> {
        let result = sqlx::query("DELETE FROM campgrounds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_reviews(&self, ids: &[Uuid]) -> Result<Vec<Review>, CampgroundError> {
        let rows = sqlx::query("SELECT id, author_id, body, rating FROM reviews WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Review {
                id: row.get("id"),
                author_id: row.get("author_id"),
                body: row.get("body"),
                rating: row.get("rating"),
            })
            .collect())
    }

    async fn find_authors(&self, ids: &[Uuid]) -> Result<Vec<Author>, CampgroundError> {
        let rows = sqlx::query("SELECT id, username, email FROM authors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Author {
                id: row.get("id"),
                username: row.get("username"),
                email: row.get("email"),
            })
            .collect())
    }
}
