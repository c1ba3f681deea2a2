use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::entities::resource::{Page, Resource, UpdateResult};
use crate::errors::AppError;
use crate::repositories::resource::{ResourceRepository, SharedRepository};

/// Bounds every call on the wrapped repository by `deadline`.
///
/// Dropping the inner future cancels in-memory and SQL work. A Redis script
/// that was already sent can still finish on the server after the timeout.
pub struct TimedRepository<R: Resource> {
    inner: SharedRepository<R>,
    deadline: Duration,
}

impl<R: Resource> TimedRepository<R> {
    pub fn new(inner: SharedRepository<R>, deadline: Duration) -> Self {
        TimedRepository { inner, deadline }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, AppError>> + Send,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(kind = R::KIND, operation, "Repository call exceeded {:?}", self.deadline);
                Err(AppError::InternalError("repository operation timed out".into()))
            }
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for TimedRepository<R> {
    async fn check_connection(&self) -> Result<(), AppError> {
        self.bounded("check_connection", self.inner.check_connection()).await
    }

    async fn find(&self, id: &str, owner: &str) -> Result<R, AppError> {
        self.bounded("find", self.inner.find(id, owner)).await
    }

    async fn insert(&self, draft: &R::Draft) -> Result<R, AppError> {
        self.bounded("insert", self.inner.insert(draft)).await
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<R, AppError> {
        self.bounded("delete", self.inner.delete(id, owner)).await
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, AppError> {
        self.bounded("delete_all", self.inner.delete_all(owner)).await
    }

    async fn update(&self, id: &str, owner: &str, changes: &R::Changes) -> Result<UpdateResult, AppError> {
        self.bounded("update", self.inner.update(id, owner, changes)).await
    }

    async fn paginate(&self, owner: &str, cursor: Option<&str>, page_size: Option<i64>) -> Result<Page<R>, AppError> {
        self.bounded("paginate", self.inner.paginate(owner, cursor, page_size)).await
    }
}
