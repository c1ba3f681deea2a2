
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gallery_backend::db::memory::MemoryRepository;
use gallery_backend::entities::image::{Image, NewImage, ImageChanges};
use gallery_backend::entities::resource::{Page, Resource, UpdateResult};
use gallery_backend::errors::AppError;
use gallery_backend::repositories::registry::Repositories;
use gallery_backend::repositories::resource::ResourceRepository;
use gallery_backend::repositories::timed::TimedRepository;
use test_fixtures::TestImage;

/// Stalls `find` for `delay`, otherwise behaves like the memory store.
struct Sluggish {
    inner: MemoryRepository<Image>,
    delay: Duration,
}

#[async_trait]
impl ResourceRepository<Image> for Sluggish {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find(&self, id: &str, owner: &str) -> Result<Image, AppError> {
        tokio::time::sleep(self.delay).await;
        self.inner.find(id, owner).await
    }

    async fn insert(&self, draft: &NewImage) -> Result<Image, AppError> {
        self.inner.insert(draft).await
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<Image, AppError> {
        self.inner.delete(id, owner).await
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, AppError> {
        self.inner.delete_all(owner).await
    }

    async fn update(&self, id: &str, owner: &str, changes: &ImageChanges) -> Result<UpdateResult, AppError> {
        self.inner.update(id, owner, changes).await
    }

    async fn paginate(&self, owner: &str, cursor: Option<&str>, page_size: Option<i64>) -> Result<Page<Image>, AppError> {
        self.inner.paginate(owner, cursor, page_size).await
    }
}

#[actix_rt::test]
async fn slow_calls_fail_after_the_deadline() {
    let slow = Arc::new(Sluggish { inner: MemoryRepository::new(), delay: Duration::from_secs(5) });
    let timed = TimedRepository::new(slow, Duration::from_millis(50));

    let stored = timed.insert(&TestImage::new("alice", "late").draft()).await.unwrap();
    let err = timed.find(stored.id().unwrap(), "alice").await.unwrap_err();

    assert!(matches!(err, AppError::InternalError(ref m) if m.contains("timed out")), "got {err:?}");
}

#[actix_rt::test]
async fn fast_calls_pass_through_unchanged() {
    let quick = Arc::new(Sluggish { inner: MemoryRepository::new(), delay: Duration::ZERO });
    let timed = TimedRepository::new(quick, Duration::from_secs(1));

    let stored = timed.insert(&TestImage::new("alice", "quick").draft()).await.unwrap();
    let found = timed.find(stored.id().unwrap(), "alice").await.unwrap();
    assert_eq!(found.name(), "quick");

    let err = timed.insert(&TestImage::new("alice", "quick").draft()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[actix_rt::test]
async fn deadline_wraps_both_repositories() {
    let repos = Repositories::in_memory().with_deadline(Duration::from_secs(1));

    let image = repos.images.insert(&TestImage::new("alice", "pic").draft()).await.unwrap();
    repos
        .thumbnails
        .insert(&TestImage::new("alice", "pic").thumbnail_for(image.id().unwrap()))
        .await
        .unwrap();

    assert_eq!(repos.images.delete_all("alice").await.unwrap(), 1);
    assert_eq!(repos.thumbnails.delete_all("alice").await.unwrap(), 1);
}
