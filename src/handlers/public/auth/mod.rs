// handlers/public/auth/mod.rs - Token acquisition, no authentication required

pub mod register; // POST /auth/register - create a non-admin account
pub mod token; // POST /auth/token - exchange credentials for a JWT

pub use register::register_post;
pub use token::token_post;
