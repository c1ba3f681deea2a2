use chrono::{DateTime, Utc};

use crate::builders::validation::{extension, present, required};
use crate::entities::image::{Image, ImageRecord, NewImage};
use crate::errors::{AppError, ValidationFailure};

/// Accumulates image fields one at a time and validates them on build.
///
/// Validation stops at the first failure, in this order: `id` (only for
/// [`build`](Self::build)), `name`, `extension`, `content_file`, `size`,
/// `owner`.
#[derive(Debug, Default, Clone)]
pub struct ImageBuilder {
    id: Option<String>,
    name: Option<String>,
    extension: Option<String>,
    content_file: Option<String>,
    owner: Option<String>,
    size: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn content_file(mut self, content_file: impl Into<String>) -> Self {
        self.content_file = Some(content_file.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets a field by its stored name. Only `name` may change after creation.
    pub fn set_field(self, field: &str, value: &str) -> Result<Self, AppError> {
        match field {
            "name" => Ok(self.name(value)),
            other => Err(AppError::BadRequest(format!("Field '{other}' cannot be updated"))),
        }
    }

    pub fn from_draft(mut self, draft: &NewImage) -> Self {
        self.name = present(&draft.name);
        self.extension = present(&draft.extension);
        self.content_file = present(&draft.content_file);
        self.owner = present(&draft.owner);
        self.size = present(&draft.size);
        self
    }

    pub fn from_record(mut self, record: ImageRecord) -> Self {
        self.id = record.id;
        self.name = record.name;
        self.extension = record.extension;
        self.content_file = record.content_file;
        self.owner = record.owner;
        self.size = record.size;
        self.created_at = record.created_at;
        self
    }

    pub fn from_image(mut self, image: &Image) -> Self {
        use crate::entities::resource::Resource;

        self.id = image.id().map(str::to_owned);
        self.name = Some(image.name().to_owned());
        self.extension = Some(image.extension().to_owned());
        self.content_file = Some(image.content_file().to_owned());
        self.owner = Some(image.owner().to_owned());
        self.size = Some(image.size().to_owned());
        self.created_at = Some(image.created_at());
        self
    }

    /// Builds an image that has not been stored yet; any id is dropped.
    pub fn build_new(self) -> Result<Image, ValidationFailure> {
        self.assemble(None)
    }

    /// Builds an image that must already exist in a store.
    pub fn build(self) -> Result<Image, ValidationFailure> {
        let id = required("id", &self.id)?;
        self.assemble(Some(id))
    }

    fn assemble(self, id: Option<String>) -> Result<Image, ValidationFailure> {
        let name = required("name", &self.name)?;
        let extension = extension(&self.extension)?;
        let content_file = required("content_file", &self.content_file)?;
        let size = required("size", &self.size)?;
        let owner = required("owner", &self.owner)?;

        Ok(Image::from_parts(
            id,
            name,
            extension,
            content_file,
            owner,
            size,
            self.created_at.unwrap_or_else(Utc::now),
        ))
    }
}
