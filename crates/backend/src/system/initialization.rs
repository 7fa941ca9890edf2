use anyhow::{Context, Result};
use contracts::system::users::CreateUserDto;
use sea_orm::ConnectionTrait;

use crate::shared::config::AdminConfig;
use crate::system::users::{repository, service};

/// Ensure admin user exists (create if table is empty)
pub async fn ensure_admin_user_exists<C: ConnectionTrait>(conn: &C, admin: &AdminConfig) -> Result<()> {
    let count = repository::count_users(conn).await?;
    if count > 0 {
        return Ok(());
    }

    tracing::info!("No users found. Creating default admin user...");
    let admin_id = service::create(
        conn,
        CreateUserDto {
            username: admin.username.clone(),
            password: admin.password.clone(),
            full_name: Some("Administrator".to_string()),
            is_admin: true,
        },
    )
    .await
    .context("Failed to create default admin user")?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Default admin user created!");
    tracing::warn!("  Username: {}", admin.username);
    tracing::warn!("  User ID: {}", admin_id);
    tracing::warn!("  ⚠️  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
    tracing::warn!("═══════════════════════════════════════════════");

    Ok(())
}
