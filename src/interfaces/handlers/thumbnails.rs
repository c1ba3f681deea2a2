use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::gallery::ThumbnailPageQuery, errors::AppError,
    use_cases::extractors::AuthIdentity, AppState,
};

#[instrument(skip(identity, state))]
pub async fn list_thumbnails(
    identity: AuthIdentity,
    state: web::Data<AppState>,
    query: web::Query<ThumbnailPageQuery>,
) -> Result<impl Responder, AppError> {
    let page = state
        .gallery
        .list_thumbnails(identity.owner(), query.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}
