use once_cell::sync::OnceCell;
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::SqlitePool;
use std::path::Path;

use super::migration_runner::{build_sqlite_url, run_migrations};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Открыть файл БД (создаётся при отсутствии), применить миграции и
/// сохранить соединение для обработчиков
pub async fn initialize_database(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_path)
    };
    let db_url = build_sqlite_url(&absolute_path);
    tracing::info!("Connecting to database: {}", absolute_path.display());

    let pool = SqlitePool::connect(&db_url).await?;
    run_migrations(&pool).await?;

    DB_CONN
        .set(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Изолированная БД в памяти со всеми миграциями (для тестов)
#[cfg(test)]
pub async fn connect_in_memory() -> DatabaseConnection {
    // одно бессрочное соединение: у каждого соединения :memory: своя база
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should open");
    run_migrations(&pool)
        .await
        .expect("migrations should apply to an empty database");
    SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)
}

/// Глобальное соединение для тестов, которые идут через роутер
#[cfg(test)]
pub async fn init_test_connection() -> &'static DatabaseConnection {
    if let Some(conn) = DB_CONN.get() {
        return conn;
    }
    let _ = DB_CONN.set(connect_in_memory().await);
    get_connection()
}
