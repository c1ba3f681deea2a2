pub mod registry;
pub mod resource;
pub mod session;
pub mod timed;
