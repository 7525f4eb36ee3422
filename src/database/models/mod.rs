pub mod collection;
pub mod user;

pub use collection::{
    Collection, CollectionDetail, CollectionId, CollectionSummary, ColorMembership, Deleted,
};
pub use user::{NewUser, PublicUser, UserCredentials, UserDetail, UserUpdate};
