use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::entities::resource::{Page, Resource, UpdateResult};
use crate::errors::AppError;
use crate::repositories::resource::{already_exists, effective_page_size, not_found, ResourceRepository};
use crate::utils::valid_uuid::{valid_cursor, valid_uuid};

type OwnedKey = (String, Vec<String>);

/// Process-local store, used in development and by the test suite.
///
/// `index` maps the owner and the kind's unique values to the id holding
/// them. Claiming a slot goes through the `entry` API, so two concurrent
/// inserts of the same key cannot both succeed.
pub struct MemoryRepository<R: Resource> {
    docs: DashMap<Uuid, R>,
    index: DashMap<OwnedKey, Uuid>,
}

impl<R: Resource> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> MemoryRepository<R> {
    pub fn new() -> Self {
        MemoryRepository {
            docs: DashMap::new(),
            index: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn release(&self, entity: &R, id: Uuid) {
        let key = entity.unique_key().to_owned_key();
        self.index.remove_if(&key, |_, holder| *holder == id);
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for MemoryRepository<R> {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find(&self, id: &str, owner: &str) -> Result<R, AppError> {
        let id = valid_uuid(id)?;

        self.docs
            .get(&id)
            .filter(|doc| doc.owner() == owner)
            .map(|doc| doc.value().clone())
            .ok_or_else(not_found::<R>)
    }

    async fn insert(&self, draft: &R::Draft) -> Result<R, AppError> {
        let entity = R::build_new(draft)?;
        let id = Uuid::now_v7();
        let stored = entity.with_id(id.to_string())?;

        match self.index.entry(stored.unique_key().to_owned_key()) {
            Entry::Occupied(_) => return Err(already_exists::<R>()),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        self.docs.insert(id, stored.clone());

        tracing::debug!(kind = R::KIND, %id, "Stored in memory");
        Ok(stored)
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<R, AppError> {
        let id = valid_uuid(id)?;

        let (_, removed) = self
            .docs
            .remove_if(&id, |_, doc| doc.owner() == owner)
            .ok_or_else(not_found::<R>)?;

        self.release(&removed, id);
        Ok(removed)
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, AppError> {
        let ids: Vec<Uuid> = self
            .docs
            .iter()
            .filter(|doc| doc.owner() == owner)
            .map(|doc| *doc.key())
            .collect();

        let mut count = 0;
        for id in ids {
            if let Some((_, removed)) = self.docs.remove_if(&id, |_, doc| doc.owner() == owner) {
                self.release(&removed, id);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn update(&self, id: &str, owner: &str, changes: &R::Changes) -> Result<UpdateResult, AppError> {
        let set = R::update_set(changes);
        if set.is_empty() {
            return Err(AppError::NothingToUpdate);
        }
        let uuid = valid_uuid(id)?;

        let mut doc = self
            .docs
            .get_mut(&uuid)
            .filter(|doc| doc.owner() == owner)
            .ok_or_else(not_found::<R>)?;

        let updated = doc.apply(&set)?;
        let old_key = doc.unique_key().to_owned_key();
        let new_key = updated.unique_key().to_owned_key();

        if old_key != new_key {
            match self.index.entry(new_key) {
                Entry::Occupied(_) => return Err(already_exists::<R>()),
                Entry::Vacant(slot) => {
                    slot.insert(uuid);
                }
            }
            self.index.remove_if(&old_key, |_, holder| *holder == uuid);
        }
        *doc = updated;

        Ok(UpdateResult::new(id, owner, &set))
    }

    async fn paginate(&self, owner: &str, cursor: Option<&str>, page_size: Option<i64>) -> Result<Page<R>, AppError> {
        let after = valid_cursor(cursor)?;
        let page_size = effective_page_size(page_size);

        let mut rows: Vec<(Uuid, R)> = self
            .docs
            .iter()
            .filter(|doc| doc.owner() == owner)
            .filter(|doc| after.is_none_or(|after| *doc.key() > after))
            .map(|doc| (*doc.key(), doc.value().clone()))
            .collect();

        rows.sort_by_key(|(id, _)| *id);
        rows.truncate(page_size + 1);

        Ok(Page::from_overfetch(
            rows.into_iter().map(|(_, doc)| doc).collect(),
            page_size,
        ))
    }
}
