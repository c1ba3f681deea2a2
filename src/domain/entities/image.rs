use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::builders::image::ImageBuilder;
use crate::entities::resource::{Resource, UpdateSet};
use crate::errors::{AppError, ValidationFailure};

/// A stored upload. Only constructible through [`ImageBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ImageRecord")]
pub struct Image {
    id: Option<String>,
    name: String,
    extension: String,
    content_file: String,
    owner: String,
    size: String,
    created_at: DateTime<Utc>,
}

impl Image {
    /// Used by [`ImageBuilder`] after every field passed validation.
    pub(crate) fn from_parts(
        id: Option<String>,
        name: String,
        extension: String,
        content_file: String,
        owner: String,
        size: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Image { id, name, extension, content_file, owner, size, created_at }
    }

    pub fn content_file(&self) -> &str {
        &self.content_file
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }
}

/// Loose shape of a stored image document or row.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ImageRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub extension: Option<String>,
    pub content_file: Option<String>,
    pub owner: Option<String>,
    pub size: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<ImageRecord> for Image {
    type Error = ValidationFailure;

    fn try_from(record: ImageRecord) -> Result<Self, Self::Error> {
        ImageBuilder::default().from_record(record).build()
    }
}

/// Candidate fields for a new image, as handed over by upload extraction.
#[derive(Debug, Clone, Default)]
pub struct NewImage {
    pub name: String,
    pub extension: String,
    pub content_file: String,
    pub owner: String,
    pub size: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ImageChanges {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
}

impl Resource for Image {
    type Draft = NewImage;
    type Changes = ImageChanges;

    const KIND: &'static str = "images";
    const UNIQUE_FIELDS: &'static [&'static str] = &["name", "extension"];

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
        vec![self.name.as_str(), self.extension.as_str()]
    }

    fn build_new(draft: &NewImage) -> Result<Self, AppError> {
        Ok(ImageBuilder::default().from_draft(draft).build_new()?)
    }

    fn update_set(changes: &ImageChanges) -> UpdateSet {
        let mut set = UpdateSet::new();
        if let Some(name) = changes.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            set.insert("name", name.to_owned());
        }
        set
    }

    fn with_id(&self, id: String) -> Result<Self, AppError> {
        Ok(ImageBuilder::default().from_image(self).id(id).build()?)
    }

    fn apply(&self, set: &UpdateSet) -> Result<Self, AppError> {
        let mut builder = ImageBuilder::default().from_image(self);
        for (field, value) in set {
            builder = builder.set_field(field, value)?;
        }
        Ok(builder.build()?)
    }
}
