//! Bookshelf server: reads settings from env (and `.env`), bootstraps the database, serves the app.
//!
//! Run from repo root: `cargo run -p bookshelf-server`

use bookshelf::{app, ensure_database_exists, ensure_tables, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bookshelf=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    let bind_addr = settings.bind_addr.clone();
    let state = AppState::new(pool, settings);
    ensure_tables(&state.pool, &state.tables).await?;

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("bookshelf listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
