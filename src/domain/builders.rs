pub mod image;
pub mod thumbnail;
pub mod validation;
