pub mod collections;
pub mod manager;
pub mod models;
pub mod partial_update;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use partial_update::{compile_update, PartialUpdate};
