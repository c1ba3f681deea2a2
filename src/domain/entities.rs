pub mod gallery;
pub mod image;
pub mod resource;
pub mod session;
pub mod thumbnail;
