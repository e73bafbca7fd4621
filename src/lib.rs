//! Bookshelf: book shelf, review and favorites REST backend on PostgreSQL.

pub mod error;
pub mod extractors;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError};
pub use models::{Category, FavoriteState, Review, Shelf, ShelfSummary, UserId};
pub use routes::{app, book_routes, common_routes, common_routes_with_ready};
pub use service::{DashboardService, ReviewService, ShelfService};
pub use settings::Settings;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables};
