use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod telemetry;

pub use domain::{builders, entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, media, utils};

use auth::jwt::SessionManager;
use entities::{image::Image, thumbnail::Thumbnail};
use middlewares::auth::AccessGate;
use repositories::{registry::Repositories, resource::SharedRepository};
use use_cases::gallery::GalleryHandler;

pub struct AppState {
    pub gallery: AppGalleryHandler,
    pub sessions: Arc<SessionManager>,
    pub secure_cookies: bool,
    pub repository_backend: String,
}

pub type AppGalleryHandler = GalleryHandler<SharedRepository<Image>, SharedRepository<Thumbnail>>;

impl AppState {
    pub fn new(config: &settings::AppConfig, repositories: Repositories) -> Self {
        AppState {
            gallery: GalleryHandler::new(repositories.images, repositories.thumbnails),
            sessions: Arc::new(SessionManager::new(config)),
            secure_cookies: config.secure_cookies,
            repository_backend: config.repository_backend.clone(),
        }
    }

    /// Gate sharing this state's session manager and cookie policy.
    pub fn access_gate(&self) -> AccessGate {
        AccessGate::new(self.sessions.clone(), self.secure_cookies)
    }
}
