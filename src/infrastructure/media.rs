pub mod size;
pub mod thumbnail;
pub mod upload;
