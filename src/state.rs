//! Shared application state for all routes.

use crate::settings::Settings;
use crate::sql::Tables;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tables: Arc<Tables>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(pool: PgPool, settings: Settings) -> Self {
        AppState {
            pool,
            tables: Arc::new(Tables::new(&settings.schema)),
            settings: Arc::new(settings),
        }
    }
}
