use chrono::{DateTime, Utc};

use crate::builders::validation::{extension, present, required};
use crate::entities::resource::Resource;
use crate::entities::thumbnail::{NewThumbnail, Thumbnail, ThumbnailRecord};
use crate::errors::{AppError, ValidationFailure};

/// Same contract as [`ImageBuilder`](super::image::ImageBuilder); the
/// back-reference fields `image_id` and `image_size` are checked last.
#[derive(Debug, Default, Clone)]
pub struct ThumbnailBuilder {
    id: Option<String>,
    image_id: Option<String>,
    name: Option<String>,
    extension: Option<String>,
    content_file: Option<String>,
    owner: Option<String>,
    size: Option<String>,
    image_size: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl ThumbnailBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = Some(image_id.into());
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

    pub fn image_size(mut self, image_size: impl Into<String>) -> Self {
        self.image_size = Some(image_size.into());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn set_field(self, field: &str, value: &str) -> Result<Self, AppError> {
        match field {
            "name" => Ok(self.name(value)),
            other => Err(AppError::BadRequest(format!("Field '{other}' cannot be updated"))),
        }
    }

    pub fn from_draft(mut self, draft: &NewThumbnail) -> Self {
        self.image_id = present(&draft.image_id);
        self.name = present(&draft.name);
        self.extension = present(&draft.extension);
        self.content_file = present(&draft.content_file);
        self.owner = present(&draft.owner);
        self.size = present(&draft.size);
        self.image_size = present(&draft.image_size);
        self
    }

    pub fn from_record(mut self, record: ThumbnailRecord) -> Self {
        self.id = record.id;
        self.image_id = record.image_id;
        self.name = record.name;
        self.extension = record.extension;
        self.content_file = record.content_file;
        self.owner = record.owner;
        self.size = record.size;
        self.image_size = record.image_size;
        self.created_at = record.created_at;
        self
    }

    pub fn from_thumbnail(mut self, thumbnail: &Thumbnail) -> Self {
        self.id = thumbnail.id().map(str::to_owned);
        self.image_id = Some(thumbnail.image_id().to_owned());
        self.name = Some(thumbnail.name().to_owned());
        self.extension = Some(thumbnail.extension().to_owned());
        self.content_file = Some(thumbnail.content_file().to_owned());
        self.owner = Some(thumbnail.owner().to_owned());
        self.size = Some(thumbnail.size().to_owned());
        self.image_size = Some(thumbnail.image_size().to_owned());
        self.created_at = Some(thumbnail.created_at());
        self
    }

    pub fn build_new(self) -> Result<Thumbnail, ValidationFailure> {
        self.assemble(None)
    }

    pub fn build(self) -> Result<Thumbnail, ValidationFailure> {
        let id = required("id", &self.id)?;
        self.assemble(Some(id))
    }

    fn assemble(self, id: Option<String>) -> Result<Thumbnail, ValidationFailure> {
        let name = required("name", &self.name)?;
        let extension = extension(&self.extension)?;
        let content_file = required("content_file", &self.content_file)?;
        let size = required("size", &self.size)?;
        let owner = required("owner", &self.owner)?;
        let image_id = required("image_id", &self.image_id)?;
        let image_size = required("image_size", &self.image_size)?;

        Ok(Thumbnail::from_parts(
            id,
            image_id,
            name,
            extension,
            content_file,
            owner,
            size,
            image_size,
            self.created_at.unwrap_or_else(Utc::now),
        ))
    }
}
