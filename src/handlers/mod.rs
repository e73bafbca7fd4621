//! HTTP handlers, one per route.

pub mod book;
pub mod dashboard;
pub mod favorite;
pub mod review;
pub use book::*;
pub use dashboard::*;
pub use favorite::*;
pub use review::*;
