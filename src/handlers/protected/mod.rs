// handlers/protected/mod.rs - Handlers that check the caller's Identity
//
// The identity middleware never rejects; each handler runs its guard
// (LoggedIn, Admin, SelfOrAdmin, OwnerOrAdmin) before touching the body.

pub mod collections;
pub mod users;
