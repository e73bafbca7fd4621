//! Database bootstrap: create the database if missing, then the schema and its tables.
//! All tables live in the schema named by `BOOKSHELF_SCHEMA` (default `bookshelf`).

use crate::error::AppError;
use crate::sql::Tables;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Create the schema and the shelf, review and favorite tables if they do not exist.
/// Reviews and favorites reference shelves with ON DELETE CASCADE.
pub async fn ensure_tables(pool: &PgPool, tables: &Tables) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", tables.schema))
        .execute(pool)
        .await?;

    let shelf_ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(100) NOT NULL,
            text TEXT NOT NULL,
            thumbnail VARCHAR(255),
            category VARCHAR(100) NOT NULL
                CHECK (category IN ('business', 'life', 'hobby', 'other')),
            user_id BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        tables.shelf
    );
    sqlx::query(&shelf_ddl).execute(pool).await?;

    let review_ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            book_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
            title VARCHAR(100) NOT NULL,
            text TEXT NOT NULL,
            rate INTEGER NOT NULL CHECK (rate BETWEEN 0 AND {}),
            user_id BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        tables.review,
        tables.shelf,
        crate::models::MAX_RATE
    );
    sqlx::query(&review_ddl).execute(pool).await?;

    let favorites_ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            shelf_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
            user_id BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (shelf_id, user_id)
        )
        "#,
        tables.favorites,
        tables.shelf
    );
    sqlx::query(&favorites_ddl).execute(pool).await?;

    for (name, table, columns) in [
        ("shelf_user_id_idx", &tables.shelf, "user_id"),
        ("review_book_id_idx", &tables.review, "book_id, created_at"),
        ("review_user_id_idx", &tables.review, "user_id"),
        ("shelf_favorites_user_id_idx", &tables.favorites, "user_id"),
    ] {
        sqlx::query(&format!("CREATE INDEX IF NOT EXISTS {} ON {} ({})", name, table, columns))
            .execute(pool)
            .await?;
    }

    tracing::info!(schema = %tables.schema, "bookshelf tables ready");
    Ok(())
}

/// Connect to the server's `postgres` database and create the target database if it is missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split `postgres://host/db?opts` into the admin URL (same server, `postgres` db) and `db`.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let (base, rest) = url
        .rsplit_once('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?;
    if base.ends_with('/') || base.is_empty() {
        return Err(AppError::BadRequest("DATABASE_URL: no host".into()));
    }
    let (db_name, query) = match rest.split_once('?') {
        Some((db, q)) => (db.trim(), Some(q)),
        None => (rest.trim(), None),
    };
    let admin_url = match query {
        Some(q) => format!("{}/postgres?{}", base, q),
        None => format!("{}/postgres", base),
    };
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
