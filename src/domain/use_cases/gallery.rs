use base64::{engine::general_purpose::STANDARD, Engine as _};
use validator::Validate;

use crate::entities::gallery::{
    DeleteAllResponse, DeleteImageRequest, DeleteImageResponse, RenameImageRequest,
    RenameResponse, ThumbnailPage, ThumbnailPageQuery, UploadResponse,
};
use crate::entities::image::{Image, ImageChanges, NewImage};
use crate::entities::resource::Resource;
use crate::entities::thumbnail::{NewThumbnail, ThumbnailChanges, Thumbnail};
use crate::errors::AppError;
use crate::media::{size::format_size, thumbnail::render_thumbnail, upload::UploadedFile};
use crate::repositories::resource::ResourceRepository;

/// Image and thumbnail lifecycles for one owner at a time.
pub struct GalleryHandler<I, T>
where
    I: ResourceRepository<Image>,
    T: ResourceRepository<Thumbnail>,
{
    pub images: I,
    pub thumbnails: T,
}

impl<I, T> GalleryHandler<I, T>
where
    I: ResourceRepository<Image>,
    T: ResourceRepository<Thumbnail>,
{
    pub fn new(images: I, thumbnails: T) -> Self {
        GalleryHandler { images, thumbnails }
    }

    pub async fn check_connection(&self) -> Result<(), AppError> {
        self.images.check_connection().await?;
        self.thumbnails.check_connection().await
    }

    pub async fn get_image(&self, owner: &str, id: &str) -> Result<Image, AppError> {
        self.images.find(id, owner).await
    }

    /// Stores the image and its thumbnail. A thumbnail that cannot be stored
    /// takes the freshly inserted image down with it.
    pub async fn upload_image(&self, owner: &str, file: UploadedFile) -> Result<UploadResponse, AppError> {
        let rendered = render_thumbnail(&file.content, &file.extension)?;

        let image = self
            .images
            .insert(&NewImage {
                name: file.name.clone(),
                extension: file.extension.clone(),
                content_file: file.base64(),
                owner: owner.to_owned(),
                size: file.human_size(),
            })
            .await?;

        let image_id = image
            .id()
            .map(str::to_owned)
            .ok_or_else(|| AppError::InternalError("stored image has no id".into()))?;

        let draft = NewThumbnail {
            image_id: image_id.clone(),
            name: image.name().to_owned(),
            extension: image.extension().to_owned(),
            content_file: STANDARD.encode(&rendered),
            owner: owner.to_owned(),
            size: format_size(rendered.len()),
            image_size: image.size().to_owned(),
        };

        let thumbnail = match self.thumbnails.insert(&draft).await {
            Ok(thumbnail) => thumbnail,
            Err(e) => {
                tracing::warn!(%image_id, "Thumbnail insert failed, removing image: {}", e);
                if let Err(undo) = self.images.delete(&image_id, owner).await {
                    tracing::error!(%image_id, "Could not remove image after failed thumbnail insert: {}", undo);
                }
                return Err(e);
            }
        };

        tracing::info!(%image_id, file = %image.file_name(), "Image uploaded");
        Ok(UploadResponse { image, thumbnail })
    }

    /// Renames the image, then its thumbnail. Both must exist and be linked
    /// before anything is written; a failed thumbnail rename puts the old
    /// image name back.
    pub async fn rename_image(&self, owner: &str, request: RenameImageRequest) -> Result<RenameResponse, AppError> {
        request.validate()?;

        let image_changes = ImageChanges { name: request.name.clone() };
        if Image::update_set(&image_changes).is_empty() {
            return Err(AppError::NothingToUpdate);
        }

        let current = self.images.find(&request.id, owner).await?;
        let image_id = current.id().unwrap_or(request.id.as_str());
        self.linked_thumbnail(owner, image_id, &request.thumbnail_id).await?;

        let image = self.images.update(&request.id, owner, &image_changes).await?;

        let thumbnail_changes = ThumbnailChanges { name: request.name };
        let thumbnail = match self
            .thumbnails
            .update(&request.thumbnail_id, owner, &thumbnail_changes)
            .await
        {
            Ok(thumbnail) => thumbnail,
            Err(e) => {
                tracing::warn!(image_id = %request.id, "Thumbnail rename failed, restoring image name: {}", e);
                let restore = ImageChanges { name: Some(current.name().to_owned()) };
                if let Err(undo) = self.images.update(&request.id, owner, &restore).await {
                    tracing::error!(image_id = %request.id, "Could not restore image name: {}", undo);
                }
                return Err(e);
            }
        };

        Ok(RenameResponse { image, thumbnail })
    }

    /// Deletes the image, then its thumbnail. The thumbnail id must point at
    /// this image's thumbnail. The second step is best-effort: its failure
    /// is reported in the response and never rolls back the first.
    pub async fn delete_image(&self, owner: &str, request: DeleteImageRequest) -> Result<DeleteImageResponse, AppError> {
        request.validate()?;

        let target = self.images.find(&request.id, owner).await?;
        let image_id = target.id().unwrap_or(request.id.as_str());
        match self.linked_thumbnail(owner, image_id, &request.thumbnail_id).await {
            // Already gone; the cascade below reports it.
            Ok(_) | Err(AppError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let image = self.images.delete(&request.id, owner).await?;

        let (thumbnail_deleted, cascade_error) =
            match self.thumbnails.delete(&request.thumbnail_id, owner).await {
                Ok(_) => (true, None),
                Err(e) => {
                    tracing::warn!(
                        image_id = %request.id,
                        thumbnail_id = %request.thumbnail_id,
                        "Image deleted but thumbnail was not: {}", e
                    );
                    (false, Some(cascade_message(&e)))
                }
            };

        Ok(DeleteImageResponse { image, thumbnail_deleted, cascade_error })
    }

    pub async fn delete_all(&self, owner: &str) -> Result<DeleteAllResponse, AppError> {
        let images = self.images.delete_all(owner).await?;
        let thumbnails = self.thumbnails.delete_all(owner).await?;

        tracing::info!(images, thumbnails, "Removed every resource for owner");
        Ok(DeleteAllResponse { images, thumbnails })
    }

    /// The owner's thumbnail `thumbnail_id`, provided it was rendered from `image_id`.
    async fn linked_thumbnail(&self, owner: &str, image_id: &str, thumbnail_id: &str) -> Result<Thumbnail, AppError> {
        let thumbnail = self.thumbnails.find(thumbnail_id, owner).await?;
        if thumbnail.image_id() != image_id {
            return Err(AppError::BadRequest("Thumbnail does not belong to this image".into()));
        }
        Ok(thumbnail)
    }

    pub async fn list_thumbnails(&self, owner: &str, query: ThumbnailPageQuery) -> Result<ThumbnailPage, AppError> {
        self.thumbnails
            .paginate(owner, query.last_id.as_deref(), query.page_size)
            .await
    }
}

/// Internal details stay in the logs.
fn cascade_message(err: &AppError) -> String {
    match err {
        AppError::InternalError(_) => "thumbnail could not be deleted".to_string(),
        other => other.to_string(),
    }
}
