//! Request extractors.

pub mod query;
pub mod user;
pub use query::LenientQuery;
pub use user::{CurrentUser, MaybeUser, USER_ID_HEADER};
