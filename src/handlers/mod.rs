// handlers/mod.rs - HTTP request handlers
//
// public/    - no token needed (/auth/*)
// protected/ - guarded by the caller's Identity (/users, /collections)

pub mod protected;
pub mod public;
pub mod validate;
