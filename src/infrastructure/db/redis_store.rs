use std::marker::PhantomData;

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use once_cell::sync::Lazy;
use redis::{AsyncCommands, Script};
use uuid::Uuid;

use crate::db::redis_scripts;
use crate::entities::resource::{Page, Resource, UpdateResult};
use crate::errors::AppError;
use crate::repositories::resource::{already_exists, effective_page_size, not_found, ResourceRepository};
use crate::utils::valid_uuid::{valid_cursor, valid_uuid};

static INSERT: Lazy<Script> = Lazy::new(|| Script::new(redis_scripts::INSERT));
static DELETE: Lazy<Script> = Lazy::new(|| Script::new(redis_scripts::DELETE));
static DELETE_ALL: Lazy<Script> = Lazy::new(|| Script::new(redis_scripts::DELETE_ALL));
static UPDATE: Lazy<Script> = Lazy::new(|| Script::new(redis_scripts::UPDATE));

pub fn create_redis_pool(url: &str) -> Result<Pool, AppError> {
    Config::from_url(url)
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| AppError::InternalError(format!("Document store pool: {e}")))
}

/// JSON documents in Redis, one key per document.
///
/// Layout under `{database}:{kind}`:
/// - `doc:{id}` holds the serialized entity;
/// - `owner:{owner}:ids` is a sorted set of the owner's ids (all scored 0, so
///   lexicographic order, which for UUIDv7 text is creation order);
/// - `owner:{owner}:names` maps the kind's unique values, joined by `\0`,
///   to the id holding them.
pub struct RedisRepository<R: Resource> {
    pool: Pool,
    prefix: String,
    _kind: PhantomData<fn() -> R>,
}

impl<R: Resource> RedisRepository<R> {
    pub fn new(pool: Pool, database: &str) -> Self {
        RedisRepository {
            pool,
            prefix: format!("{database}:{}", R::KIND),
            _kind: PhantomData,
        }
    }

    fn doc_prefix(&self) -> String {
        format!("{}:doc:", self.prefix)
    }

    fn doc_key(&self, id: &Uuid) -> String {
        format!("{}{}", self.doc_prefix(), id)
    }

    fn owner_key(&self, owner: &str, suffix: &str) -> String {
        format!("{}:owner:{}:{}", self.prefix, urlencoding::encode(owner), suffix)
    }

    fn ids_key(&self, owner: &str) -> String {
        self.owner_key(owner, "ids")
    }

    fn names_key(&self, owner: &str) -> String {
        self.owner_key(owner, "names")
    }

    async fn conn(&self) -> Result<Connection, AppError> {
        Ok(self.pool.get().await?)
    }

    fn decode(raw: &str) -> Result<R, AppError> {
        serde_json::from_str(raw).map_err(|e| {
            AppError::InternalError(format!("stored {} document is invalid: {e}", R::KIND))
        })
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for RedisRepository<R> {
    async fn check_connection(&self) -> Result<(), AppError> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn find(&self, id: &str, owner: &str) -> Result<R, AppError> {
        let id = valid_uuid(id)?;
        let mut conn = self.conn().await?;

        let raw: Option<String> = conn.get(self.doc_key(&id)).await?;
        let doc = match raw {
            Some(raw) => Self::decode(&raw)?,
            None => return Err(not_found::<R>()),
        };

        if doc.owner() != owner {
            return Err(not_found::<R>());
        }
        Ok(doc)
    }

    async fn insert(&self, draft: &R::Draft) -> Result<R, AppError> {
        let entity = R::build_new(draft)?;
        let key = entity.unique_key();
        let names_key = self.names_key(key.owner);
        let field = key.index_field();
        let mut conn = self.conn().await?;

        let taken: bool = conn.hexists(&names_key, &field).await?;
        if taken {
            return Err(already_exists::<R>());
        }

        let id = Uuid::now_v7();
        let stored = entity.with_id(id.to_string())?;
        let document = serde_json::to_string(&stored)?;

        // HSETNX inside the script catches an insert that raced past the check.
        let claimed: i64 = INSERT
            .key(&names_key)
            .key(self.doc_key(&id))
            .key(self.ids_key(key.owner))
            .arg(&field)
            .arg(id.to_string())
            .arg(document)
            .invoke_async(&mut conn)
            .await?;

        if claimed == 0 {
            return Err(already_exists::<R>());
        }

        tracing::info!(kind = R::KIND, %id, "Document stored");
        Ok(stored)
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<R, AppError> {
        let uuid = valid_uuid(id)?;
        let mut conn = self.conn().await?;

        let mut invocation = DELETE.prepare_invoke();
        invocation
            .key(self.doc_key(&uuid))
            .key(self.ids_key(owner))
            .key(self.names_key(owner))
            .arg(owner)
            .arg(uuid.to_string());
        for field in R::UNIQUE_FIELDS {
            invocation.arg(*field);
        }

        let removed: Option<String> = invocation.invoke_async(&mut conn).await?;

        match removed {
            Some(raw) => Self::decode(&raw),
            None => Err(not_found::<R>()),
        }
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, AppError> {
        let mut conn = self.conn().await?;

        let count: u64 = DELETE_ALL
            .key(self.ids_key(owner))
            .key(self.names_key(owner))
            .arg(self.doc_prefix())
            .invoke_async(&mut conn)
            .await?;

        Ok(count)
    }

    async fn update(&self, id: &str, owner: &str, changes: &R::Changes) -> Result<UpdateResult, AppError> {
        let set = R::update_set(changes);
        if set.is_empty() {
            return Err(AppError::NothingToUpdate);
        }
        let uuid = valid_uuid(id)?;
        let mut conn = self.conn().await?;

        let mut invocation = UPDATE.prepare_invoke();
        invocation
            .key(self.doc_key(&uuid))
            .key(self.names_key(owner))
            .arg(owner)
            .arg(uuid.to_string())
            .arg(R::UNIQUE_FIELDS.len());
        for field in R::UNIQUE_FIELDS {
            invocation.arg(*field);
        }
        for (field, value) in &set {
            invocation.arg(*field).arg(value);
        }

        let outcome: i64 = invocation.invoke_async(&mut conn).await?;
        match outcome {
            1 => Ok(UpdateResult::new(id, owner, &set)),
            -1 => Err(already_exists::<R>()),
            _ => Err(not_found::<R>()),
        }
    }

    async fn paginate(&self, owner: &str, cursor: Option<&str>, page_size: Option<i64>) -> Result<Page<R>, AppError> {
        let after = valid_cursor(cursor)?;
        let page_size = effective_page_size(page_size);
        let mut conn = self.conn().await?;

        let min = match after {
            Some(after) => format!("({after}"),
            None => "-".to_string(),
        };

        let ids: Vec<String> = redis::cmd("ZRANGEBYLEX")
            .arg(self.ids_key(owner))
            .arg(min)
            .arg("+")
            .arg("LIMIT")
            .arg(0)
            .arg(page_size + 1)
            .query_async(&mut conn)
            .await?;

        if ids.is_empty() {
            return Ok(Page { items: Vec::new(), next_cursor: None });
        }

        let keys: Vec<String> = ids
            .iter()
            .map(|id| format!("{}{}", self.doc_prefix(), id))
            .collect();
        let raws: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        let items = raws
            .iter()
            .flatten()
            .map(|raw| Self::decode(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(items, page_size))
    }
}
