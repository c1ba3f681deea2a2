use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;

/// Field name -> new value, only for fields that are actually changing.
pub type UpdateSet = BTreeMap<&'static str, String>;

/// An owner-scoped entity the repositories know how to persist.
///
/// Implemented by [`Image`](super::image::Image) and
/// [`Thumbnail`](super::thumbnail::Thumbnail). Serialization goes through
/// the entity's builder, so a decoded value is always a valid entity.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Candidate fields for the insert path.
    type Draft: Send + Sync;
    /// Partial update request.
    type Changes: Send + Sync;

    /// Collection / table / key-space name.
    const KIND: &'static str;

    fn id(&self) -> Option<&str>;
    fn owner(&self) -> &str;
    fn name(&self) -> &str;
    fn extension(&self) -> &str;

    /// Runs the draft through the builder's `build_new`.
    fn build_new(draft: &Self::Draft) -> Result<Self, AppError>;

    /// Only the fields that are present and non-empty in `changes`.
    fn update_set(changes: &Self::Changes) -> UpdateSet;

    /// Copy of `self` carrying the store-assigned identifier.
    fn with_id(&self, id: String) -> Result<Self, AppError>;

    /// Copy of `self` with `set` applied, re-validated through the builder.
    fn apply(&self, set: &UpdateSet) -> Result<Self, AppError>;

    /// Fields that, together with the owner, identify at most one stored
    /// entity. Column / document field names.
    const UNIQUE_FIELDS: &'static [&'static str];

    /// Values of `UNIQUE_FIELDS`, in the same order.
    fn unique_values(&self) -> Vec<&str>;

    fn unique_key(&self) -> UniqueKey<'_> {
        UniqueKey {
            owner: self.owner(),
            values: self.unique_values(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey<'a> {
    pub owner: &'a str,
    pub values: Vec<&'a str>,
}

impl UniqueKey<'_> {
    pub fn to_owned_key(&self) -> (String, Vec<String>) {
        (
            self.owner.to_owned(),
            self.values.iter().map(|v| v.to_string()).collect(),
        )
    }

    /// Index field used by the document store: the values joined by `\0`.
    pub fn index_field(&self) -> String {
        self.values.join("\u{0}")
    }
}

/// What a successful partial update touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateResult {
    pub id: String,
    pub owner: String,
    pub updated_fields: BTreeMap<String, String>,
}

impl UpdateResult {
    pub fn new(id: &str, owner: &str, set: &UpdateSet) -> Self {
        UpdateResult {
            id: id.to_owned(),
            owner: owner.to_owned(),
            updated_fields: set
                .iter()
                .map(|(field, value)| (field.to_string(), value.clone()))
                .collect(),
        }
    }
}

/// One forward page. `next_cursor` is `None` once the owner has no more items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub next_cursor: Option<String>,
}

impl<R: Resource> Page<R> {
    /// Builds a page from up to `page_size + 1` ordered rows; the extra row
    /// only signals that another page exists.
    pub fn from_overfetch(mut rows: Vec<R>, page_size: usize) -> Self {
        let has_more = rows.len() > page_size;
        rows.truncate(page_size);

        let next_cursor = if has_more {
            rows.last().and_then(|r| r.id()).map(str::to_owned)
        } else {
            None
        };

        Page { items: rows, next_cursor }
    }
}
