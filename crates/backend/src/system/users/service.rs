use anyhow::Result;
use chrono::Utc;
use contracts::system::users::{CreateUserDto, User};
use sea_orm::ConnectionTrait;

use super::repository;
use crate::system::auth::password;

/// Create a new user
pub async fn create<C: ConnectionTrait>(conn: &C, dto: CreateUserDto) -> Result<String> {
    let username = dto.username.trim().to_string();
    if username.is_empty() {
        return Err(anyhow::anyhow!("Username cannot be empty"));
    }

    if repository::get_by_username(conn, &username).await?.is_some() {
        return Err(anyhow::anyhow!("Username already exists"));
    }

    password::validate_password_strength(&dto.password)?;
    let password_hash = password::hash_password(&dto.password)?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let user = User {
        id: user_id.clone(),
        username,
        full_name: dto.full_name,
        is_active: true,
        is_admin: dto.is_admin,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
    };

    repository::create_with_password(conn, &user, &password_hash).await?;

    Ok(user_id)
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: &str) -> Result<Option<User>> {
    repository::get_by_id(conn, id).await
}

/// Verify user credentials (for login); inactive users never authenticate
pub async fn verify_credentials<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let user = match repository::get_by_username(conn, username.trim()).await? {
        Some(u) if u.is_active => u,
        Some(u) => {
            tracing::warn!("Login attempt for inactive user {}", u.username);
            return Ok(None);
        }
        None => return Ok(None),
    };

    let password_hash = repository::get_password_hash(conn, &user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Password hash not found"))?;

    if !password::verify_password(password, &password_hash)? {
        return Ok(None);
    }

    if let Err(e) = repository::update_last_login(conn, &user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", user.username, e);
    }

    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    fn dto(username: &str, password: &str) -> CreateUserDto {
        CreateUserDto {
            username: username.into(),
            password: password.into(),
            full_name: None,
            is_admin: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_verify_credentials() {
        let db = connect_in_memory().await;
        let id = create(&db, dto("admin", "admin")).await.unwrap();

        let user = verify_credentials(&db, "admin", "admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_admin);

        assert!(verify_credentials(&db, "admin", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(verify_credentials(&db, "nobody", "admin")
            .await
            .unwrap()
            .is_none());

        let reloaded = get_by_id(&db, &id).await.unwrap().unwrap();
        assert!(reloaded.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let db = connect_in_memory().await;
        create(&db, dto("editor", "secret")).await.unwrap();
        assert!(create(&db, dto(" editor ", "secret")).await.is_err());
        assert_eq!(repository::count_users(&db).await.unwrap(), 1);
    }
}
