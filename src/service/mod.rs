//! Query and mutation services over the shelf, review and favorite tables.

mod dashboard;
mod review;
mod rows;
mod shelf;
pub use dashboard::{fill_category_counts, DashboardService, DASHBOARD_ITEMS};
pub use review::ReviewService;
pub use shelf::{authorize_owner, ListQuery, ShelfService, RANKING_SIZE, SIMILAR_SIZE};
