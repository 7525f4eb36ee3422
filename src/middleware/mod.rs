pub mod auth;
pub mod response;

pub use auth::identity_middleware;
pub use response::{ApiResponse, ApiResult};
