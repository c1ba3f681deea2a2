use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::image::Image;
use crate::entities::resource::{Page, UpdateResult};
use crate::entities::thumbnail::Thumbnail;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenameImageRequest {
    #[validate(length(min = 1, message = "Image id is required"))]
    pub id: String,

    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Thumbnail id is required"))]
    pub thumbnail_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeleteImageRequest {
    #[validate(length(min = 1, message = "Image id is required"))]
    pub id: String,

    #[validate(length(min = 1, message = "Thumbnail id is required"))]
    pub thumbnail_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailPageQuery {
    pub last_id: Option<String>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub image: Image,
    pub thumbnail: Thumbnail,
}

#[derive(Debug, Serialize)]
pub struct RenameResponse {
    pub image: UpdateResult,
    pub thumbnail: UpdateResult,
}

/// Result of the best-effort cascade: the image is gone even when the
/// thumbnail could not be removed.
#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub image: Image,
    pub thumbnail_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade_error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DeleteAllResponse {
    pub images: u64,
    pub thumbnails: u64,
}

pub type ThumbnailPage = Page<Thumbnail>;
