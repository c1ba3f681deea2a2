use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::entities::image::{Image, ImageRecord};
use crate::entities::resource::{Page, Resource, UpdateResult};
use crate::entities::thumbnail::{Thumbnail, ThumbnailRecord};
use crate::errors::{AppError, ValidationFailure, UNIQUE_VIOLATION};
use crate::repositories::resource::{already_exists, effective_page_size, not_found, ResourceRepository};
use crate::utils::valid_uuid::{valid_cursor, valid_uuid};

static SCHEMA_NAME: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$"));

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let max_retries = 5;
    let mut retry_count = 0;
    let mut wait_seconds = 2;

    loop {
        match PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                info!("Database connection established.");
                return Ok(pool);
            }
            Err(e) if retry_count < max_retries => {
                retry_count += 1;
                info!(
                    "Failed to connect to database (attempt {}/{}): {}. Retrying in {}s...",
                    retry_count, max_retries, e, wait_seconds);

                tokio::time::sleep(Duration::from_secs(wait_seconds)).await;

                wait_seconds *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

/// The schema name is spliced into SQL text, so it must be a bare identifier.
pub fn checked_schema(schema: &str) -> Result<&str, AppError> {
    let pattern = SCHEMA_NAME
        .as_ref()
        .map_err(|e| AppError::InternalError(format!("schema pattern: {e}")))?;

    if pattern.is_match(schema) {
        Ok(schema)
    } else {
        Err(AppError::BadRequest(format!("invalid database name '{schema}'")))
    }
}

/// Creates the schema and both tables when missing.
pub async fn ensure_schema(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    let schema = checked_schema(schema)?;

    let statements = [
        format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.images (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                extension TEXT NOT NULL,
                content_file TEXT NOT NULL,
                owner TEXT NOT NULL,
                size TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                UNIQUE (owner, name, extension)
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.thumbnails (
                id UUID PRIMARY KEY,
                image_id TEXT NOT NULL,
                name TEXT NOT NULL,
                extension TEXT NOT NULL,
                content_file TEXT NOT NULL,
                owner TEXT NOT NULL,
                size TEXT NOT NULL,
                image_size TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )"
        ),
        // Tables created before thumbnails were keyed on their image.
        format!("ALTER TABLE {schema}.thumbnails DROP CONSTRAINT IF EXISTS thumbnails_owner_name_extension_key"),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS thumbnails_owner_image_id_key ON {schema}.thumbnails (owner, image_id)"
        ),
        format!("CREATE INDEX IF NOT EXISTS images_owner_id_idx ON {schema}.images (owner, id)"),
        format!("CREATE INDEX IF NOT EXISTS thumbnails_owner_id_idx ON {schema}.thumbnails (owner, id)"),
    ];

    for statement in statements {
        sqlx::query(&statement).execute(pool).await?;
    }

    info!(schema, "Database schema ready");
    Ok(())
}

/// Row mapping for a resource stored in its own table.
pub trait PgResource: Resource + Unpin {
    type Row: for<'r> FromRow<'r, PgRow> + TryInto<Self, Error = ValidationFailure> + Send + Unpin;

    const COLUMNS: &'static str;

    /// Binds every column of `COLUMNS`, in order, with `id` first.
    fn bind_insert<'q>(
        &self,
        id: Uuid,
        query: QueryAs<'q, Postgres, Self::Row, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self::Row, PgArguments>;
}

#[derive(Debug, FromRow)]
pub struct ImageRow {
    pub id: Uuid,
    pub name: String,
    pub extension: String,
    pub content_file: String,
    pub owner: String,
    pub size: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ImageRow> for Image {
    type Error = ValidationFailure;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        Image::try_from(ImageRecord {
            id: Some(row.id.to_string()),
            name: Some(row.name),
            extension: Some(row.extension),
            content_file: Some(row.content_file),
            owner: Some(row.owner),
            size: Some(row.size),
            created_at: Some(row.created_at),
        })
    }
}

impl PgResource for Image {
    type Row = ImageRow;

    const COLUMNS: &'static str = "id, name, extension, content_file, owner, size, created_at";

    fn bind_insert<'q>(
        &self,
        id: Uuid,
        query: QueryAs<'q, Postgres, ImageRow, PgArguments>,
    ) -> QueryAs<'q, Postgres, ImageRow, PgArguments> {
        query
            .bind(id)
            .bind(self.name().to_owned())
            .bind(self.extension().to_owned())
            .bind(self.content_file().to_owned())
            .bind(self.owner().to_owned())
            .bind(self.size().to_owned())
            .bind(self.created_at())
    }
}

#[derive(Debug, FromRow)]
pub struct ThumbnailRow {
    pub id: Uuid,
    pub image_id: String,
    pub name: String,
    pub extension: String,
    pub content_file: String,
    pub owner: String,
    pub size: String,
    pub image_size: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ThumbnailRow> for Thumbnail {
    type Error = ValidationFailure;

    fn try_from(row: ThumbnailRow) -> Result<Self, Self::Error> {
        Thumbnail::try_from(ThumbnailRecord {
            id: Some(row.id.to_string()),
            image_id: Some(row.image_id),
            name: Some(row.name),
            extension: Some(row.extension),
            content_file: Some(row.content_file),
            owner: Some(row.owner),
            size: Some(row.size),
            image_size: Some(row.image_size),
            created_at: Some(row.created_at),
        })
    }
}

impl PgResource for Thumbnail {
    type Row = ThumbnailRow;

    const COLUMNS: &'static str =
        "id, image_id, name, extension, content_file, owner, size, image_size, created_at";

    fn bind_insert<'q>(
        &self,
        id: Uuid,
        query: QueryAs<'q, Postgres, ThumbnailRow, PgArguments>,
    ) -> QueryAs<'q, Postgres, ThumbnailRow, PgArguments> {
        query
            .bind(id)
            .bind(self.image_id().to_owned())
            .bind(self.name().to_owned())
            .bind(self.extension().to_owned())
            .bind(self.content_file().to_owned())
            .bind(self.owner().to_owned())
            .bind(self.size().to_owned())
            .bind(self.image_size().to_owned())
            .bind(self.created_at())
    }
}

#[derive(Clone)]
pub struct PostgresRepository<R: PgResource> {
    pool: PgPool,
    table: String,
    _kind: PhantomData<fn() -> R>,
}

impl<R: PgResource> PostgresRepository<R> {
    /// `schema` must already exist, see [`ensure_schema`].
    pub fn new(pool: PgPool, schema: &str) -> Result<Self, AppError> {
        let schema = checked_schema(schema)?;
        Ok(PostgresRepository {
            pool,
            table: format!("{schema}.{}", R::KIND),
            _kind: PhantomData,
        })
    }

    fn decode(row: R::Row) -> Result<R, AppError> {
        row.try_into().map_err(|e: ValidationFailure| {
            AppError::InternalError(format!("stored {} row is invalid: {e}", R::KIND))
        })
    }

    fn write_error(err: sqlx::Error) -> AppError {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                already_exists::<R>()
            }
            _ => AppError::from(err),
        }
    }
}

#[async_trait]
impl<R: PgResource> ResourceRepository<R> for PostgresRepository<R> {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn find(&self, id: &str, owner: &str) -> Result<R, AppError> {
        let id = valid_uuid(id)?;
        let sql = format!("SELECT {} FROM {} WHERE id = $1 AND owner = $2", R::COLUMNS, self.table);

        let row = sqlx::query_as::<_, R::Row>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found::<R>)?;

        Self::decode(row)
    }

    async fn insert(&self, draft: &R::Draft) -> Result<R, AppError> {
        let entity = R::build_new(draft)?;
        let key = entity.unique_key();

        let mut exists: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT EXISTS(SELECT 1 FROM {} WHERE owner = ", self.table));
        exists.push_bind(key.owner.to_owned());
        for (column, value) in R::UNIQUE_FIELDS.iter().zip(&key.values) {
            exists.push(format!(" AND {column} = "));
            exists.push_bind(value.to_string());
        }
        exists.push(")");

        let exists = exists
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await?;
        if exists {
            return Err(already_exists::<R>());
        }

        let id = Uuid::now_v7();

        let placeholders = (1..=R::COLUMNS.split(',').count())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            self.table, R::COLUMNS, placeholders, R::COLUMNS
        );

        // The unique constraint catches an insert that raced past the check.
        let row = entity
            .bind_insert(id, sqlx::query_as::<_, R::Row>(&insert_sql))
            .fetch_one(&self.pool)
            .await
            .map_err(Self::write_error)?;

        info!(kind = R::KIND, %id, "Row inserted");
        Self::decode(row)
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<R, AppError> {
        let id = valid_uuid(id)?;
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND owner = $2 RETURNING {}",
            self.table, R::COLUMNS
        );

        let row = sqlx::query_as::<_, R::Row>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found::<R>)?;

        Self::decode(row)
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE owner = $1", self.table);
        let result = sqlx::query(&sql).bind(owner).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, id: &str, owner: &str, changes: &R::Changes) -> Result<UpdateResult, AppError> {
        let set = R::update_set(changes);
        if set.is_empty() {
            return Err(AppError::NothingToUpdate);
        }
        let uuid = valid_uuid(id)?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE {} SET ", self.table));
        {
            let mut assignments = builder.separated(", ");
            for (column, value) in &set {
                assignments.push(format!("{column} = "));
                assignments.push_bind_unseparated(value.clone());
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(uuid);
        builder.push(" AND owner = ");
        builder.push_bind(owner.to_owned());

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(Self::write_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found::<R>());
        }

        Ok(UpdateResult::new(id, owner, &set))
    }

    async fn paginate(&self, owner: &str, cursor: Option<&str>, page_size: Option<i64>) -> Result<Page<R>, AppError> {
        let after = valid_cursor(cursor)?;
        let page_size = effective_page_size(page_size);

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM {} WHERE owner = ", R::COLUMNS, self.table));
        builder.push_bind(owner.to_owned());
        if let Some(after) = after {
            builder.push(" AND id > ");
            builder.push_bind(after);
        }
        builder.push(" ORDER BY id LIMIT ");
        builder.push_bind((page_size + 1) as i64);

        let rows = builder
            .build_query_as::<R::Row>()
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Self::decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(items, page_size))
    }
}
