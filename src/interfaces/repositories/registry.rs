use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::db::memory::MemoryRepository;
use crate::db::postgres::{create_pool, ensure_schema, PostgresRepository};
use crate::db::redis_store::{create_redis_pool, RedisRepository};
use crate::entities::image::Image;
use crate::entities::thumbnail::Thumbnail;
use crate::errors::AppError;
use crate::repositories::resource::SharedRepository;
use crate::repositories::timed::TimedRepository;

/// Plain key/value construction parameters: `backend`, `url`, `database`.
#[derive(Debug, Clone, Default)]
pub struct RepositoryArgs(HashMap<String, String>);

impl RepositoryArgs {
    pub fn new(args: HashMap<String, String>) -> Self {
        RepositoryArgs(args)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, AppError> {
        self.get(key)
            .ok_or_else(|| AppError::InternalError(format!("repository argument '{key}' is missing")))
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_owned(), value.to_owned());
        self
    }
}

/// Both repositories, sharing whatever pool the backend opened.
#[derive(Clone)]
pub struct Repositories {
    pub images: SharedRepository<Image>,
    pub thumbnails: SharedRepository<Thumbnail>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Repositories {
            images: Arc::new(MemoryRepository::<Image>::new()),
            thumbnails: Arc::new(MemoryRepository::<Thumbnail>::new()),
        }
    }

    /// Wraps both repositories so every call fails after `deadline`.
    pub fn with_deadline(self, deadline: Duration) -> Self {
        Repositories {
            images: Arc::new(TimedRepository::new(self.images, deadline)),
            thumbnails: Arc::new(TimedRepository::new(self.thumbnails, deadline)),
        }
    }
}

pub type RepositoryFactory =
    Box<dyn Fn(RepositoryArgs) -> BoxFuture<'static, Result<Repositories, AppError>> + Send + Sync>;

/// Maps a backend key to the factory that opens it.
pub struct RepositoryRegistry {
    factories: HashMap<String, RepositoryFactory>,
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        let mut registry = RepositoryRegistry::empty();
        registry.register("memory", |_| Box::pin(async { Ok(Repositories::in_memory()) }));
        registry.register("postgres", |args| Box::pin(open_postgres(args)));
        registry.register("redis", |args| Box::pin(open_redis(args)));
        registry
    }
}

impl RepositoryRegistry {
    pub fn empty() -> Self {
        RepositoryRegistry { factories: HashMap::new() }
    }

    pub fn register<F>(&mut self, key: &str, factory: F)
    where
        F: Fn(RepositoryArgs) -> BoxFuture<'static, Result<Repositories, AppError>> + Send + Sync + 'static,
    {
        self.factories.insert(key.to_owned(), Box::new(factory));
    }

    pub fn backends(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Opens the backend named by the `backend` argument.
    pub async fn open(&self, args: RepositoryArgs) -> Result<Repositories, AppError> {
        let backend = args.require("backend")?.to_owned();

        let factory = self.factories.get(&backend).ok_or_else(|| {
            AppError::InternalError(format!(
                "unsupported repository backend: {backend} (known: {})",
                self.backends().join(", ")
            ))
        })?;

        let repositories = factory(args).await?;
        tracing::info!(backend = %backend, "Repository backend ready");
        Ok(repositories)
    }
}

async fn open_postgres(args: RepositoryArgs) -> Result<Repositories, AppError> {
    let url = args.require("url")?;
    let database = args.require("database")?;

    let pool = create_pool(url).await?;
    ensure_schema(&pool, database).await?;

    Ok(Repositories {
        images: Arc::new(PostgresRepository::<Image>::new(pool.clone(), database)?),
        thumbnails: Arc::new(PostgresRepository::<Thumbnail>::new(pool, database)?),
    })
}

async fn open_redis(args: RepositoryArgs) -> Result<Repositories, AppError> {
    let url = args.require("url")?;
    let database = args.require("database")?;

    let pool = create_redis_pool(url)?;

    Ok(Repositories {
        images: Arc::new(RedisRepository::<Image>::new(pool.clone(), database)),
        thumbnails: Arc::new(RedisRepository::<Thumbnail>::new(pool, database)),
    })
}
