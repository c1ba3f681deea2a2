pub mod memory;
pub mod postgres;
pub mod redis_scripts;
pub mod redis_store;
