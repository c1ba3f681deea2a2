use std::sync::Arc;

use async_trait::async_trait;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::entities::resource::{Page, Resource, UpdateResult};
use crate::errors::AppError;

/// Owner-scoped persistence for one resource kind.
///
/// Every backend honours the same contract:
/// - lookups match on id *and* owner, so a foreign id is `NotFound`;
/// - `insert` builds the draft first, so an invalid draft is a validation
///   failure even when its key is taken; a valid one whose owner and
///   `Resource::UNIQUE_FIELDS` are already held is `Conflict`;
/// - `update` with an empty change set is `NothingToUpdate` and touches nothing;
/// - `paginate` walks ids in ascending order and returns `next_cursor = None`
///   on the last page.
#[async_trait]
pub trait ResourceRepository<R: Resource>: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn find(&self, id: &str, owner: &str) -> Result<R, AppError>;
    async fn insert(&self, draft: &R::Draft) -> Result<R, AppError>;
    async fn delete(&self, id: &str, owner: &str) -> Result<R, AppError>;
    async fn delete_all(&self, owner: &str) -> Result<u64, AppError>;
    async fn update(&self, id: &str, owner: &str, changes: &R::Changes) -> Result<UpdateResult, AppError>;
    async fn paginate(&self, owner: &str, cursor: Option<&str>, page_size: Option<i64>) -> Result<Page<R>, AppError>;
}

#[async_trait]
impl<R, T> ResourceRepository<R> for Arc<T>
where
    R: Resource,
    T: ResourceRepository<R> + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn find(&self, id: &str, owner: &str) -> Result<R, AppError> {
        (**self).find(id, owner).await
    }

    async fn insert(&self, draft: &R::Draft) -> Result<R, AppError> {
        (**self).insert(draft).await
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<R, AppError> {
        (**self).delete(id, owner).await
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, AppError> {
        (**self).delete_all(owner).await
    }

    async fn update(&self, id: &str, owner: &str, changes: &R::Changes) -> Result<UpdateResult, AppError> {
        (**self).update(id, owner, changes).await
    }

    async fn paginate(&self, owner: &str, cursor: Option<&str>, page_size: Option<i64>) -> Result<Page<R>, AppError> {
        (**self).paginate(owner, cursor, page_size).await
    }
}

pub type SharedRepository<R> = Arc<dyn ResourceRepository<R>>;

/// Absent or non-positive sizes fall back to the default; large ones are capped.
pub fn effective_page_size(page_size: Option<i64>) -> usize {
    match page_size {
        Some(n) if n > 0 => n.min(MAX_PAGE_SIZE) as usize,
        _ => DEFAULT_PAGE_SIZE as usize,
    }
}

pub fn not_found<R: Resource>() -> AppError {
    let kind = R::KIND.trim_end_matches('s');
    AppError::NotFound(format!("{kind} not found"))
}

pub fn already_exists<R: Resource>() -> AppError {
    let kind = R::KIND.trim_end_matches('s');
    AppError::Conflict(format!("{kind} already exists"))
}
