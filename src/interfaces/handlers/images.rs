use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::gallery::{DeleteImageRequest, RenameImageRequest},
    errors::AppError,
    media::upload::{ImageUploadForm, UploadedFile},
    use_cases::extractors::AuthIdentity,
    AppState,
};

#[instrument(skip(identity, state, image_id))]
pub async fn get_image(
    identity: AuthIdentity,
    state: web::Data<AppState>,
    image_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let image = state
        .gallery
        .get_image(identity.owner(), &image_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(image))
}

#[instrument(skip(identity, state, form))]
pub async fn upload_image(
    identity: AuthIdentity,
    state: web::Data<AppState>,
    form: MultipartForm<ImageUploadForm>,
) -> Result<impl Responder, AppError> {
    let file = UploadedFile::from_form(form.into_inner())?;

    let response = state.gallery.upload_image(identity.owner(), file).await?;

    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(identity, state, data))]
pub async fn rename_image(
    identity: AuthIdentity,
    state: web::Data<AppState>,
    data: web::Json<RenameImageRequest>,
) -> Result<impl Responder, AppError> {
    let response = state
        .gallery
        .rename_image(identity.owner(), data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(identity, state, data))]
pub async fn delete_image(
    identity: AuthIdentity,
    state: web::Data<AppState>,
    data: web::Json<DeleteImageRequest>,
) -> Result<impl Responder, AppError> {
    let response = state
        .gallery
        .delete_image(identity.owner(), data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(identity, state))]
pub async fn delete_all_images(
    identity: AuthIdentity,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state.gallery.delete_all(identity.owner()).await?;

    Ok(HttpResponse::Ok().json(response))
}
