use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::builders::thumbnail::ThumbnailBuilder;
use crate::entities::resource::{Resource, UpdateSet};
use crate::errors::{AppError, ValidationFailure};

/// Downscaled copy of an [`Image`](super::image::Image).
///
/// `image_id` points back at the source image; ownership is carried by
/// `owner` alone, like every other resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThumbnailRecord")]
pub struct Thumbnail {
    id: Option<String>,
    image_id: String,
    name: String,
    extension: String,
    content_file: String,
    owner: String,
    size: String,
    image_size: String,
    created_at: DateTime<Utc>,
}

impl Thumbnail {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: Option<String>,
        image_id: String,
        name: String,
        extension: String,
        content_file: String,
        owner: String,
        size: String,
        image_size: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Thumbnail {
            id,
            image_id,
            name,
            extension,
            content_file,
            owner,
            size,
            image_size,
            created_at,
        }
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn content_file(&self) -> &str {
        &self.content_file
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn image_size(&self) -> &str {
        &self.image_size
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ThumbnailRecord {
    pub id: Option<String>,
    pub image_id: Option<String>,
    pub name: Option<String>,
    pub extension: Option<String>,
    pub content_file: Option<String>,
    pub owner: Option<String>,
    pub size: Option<String>,
    pub image_size: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<ThumbnailRecord> for Thumbnail {
    type Error = ValidationFailure;

    fn try_from(record: ThumbnailRecord) -> Result<Self, Self::Error> {
        ThumbnailBuilder::default().from_record(record).build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewThumbnail {
    pub image_id: String,
    pub name: String,
    pub extension: String,
    pub content_file: String,
    pub owner: String,
    pub size: String,
    pub image_size: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ThumbnailChanges {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
}

impl Resource for Thumbnail {
    type Draft = NewThumbnail;
    type Changes = ThumbnailChanges;

    const KIND: &'static str = "thumbnails";
    // One thumbnail per source image; names may repeat.
    const UNIQUE_FIELDS: &'static [&'static str] = &["image_id"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    fn unique_values(&self) -> Vec<&str> {
        vec![self.image_id.as_str()]
    }

    fn build_new(draft: &NewThumbnail) -> Result<Self, AppError> {
        Ok(ThumbnailBuilder::default().from_draft(draft).build_new()?)
    }

    fn update_set(changes: &ThumbnailChanges) -> UpdateSet {
        let mut set = UpdateSet::new();
        if let Some(name) = changes.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            set.insert("name", name.to_owned());
        }
        set
    }

    fn with_id(&self, id: String) -> Result<Self, AppError> {
        Ok(ThumbnailBuilder::default().from_thumbnail(self).id(id).build()?)
    }

    fn apply(&self, set: &UpdateSet) -> Result<Self, AppError> {
        let mut builder = ThumbnailBuilder::default().from_thumbnail(self);
        for (field, value) in set {
            builder = builder.set_field(field, value)?;
        }
        Ok(builder.build()?)
    }
}
