use sqlx::sqlite::SqlitePool;
use std::path::Path;

/// Миграции схемы, встроенные в бинарник из `crates/backend/migrations`
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub(crate) fn build_sqlite_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Применить миграции к пулу, который затем передаётся в sea-orm
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;

    tracing::info!("Database migrations applied successfully");
    Ok(())
}
