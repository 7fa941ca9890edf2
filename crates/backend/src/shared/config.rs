use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

/// Учётные данные оператора, создаваемого при пустой таблице пользователей
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_admin")]
    pub username: String,
    #[serde(default = "default_admin")]
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin(),
            password: default_admin(),
        }
    }
}

fn default_admin() -> String {
    "admin".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    /// Ёмкость broadcast-канала; отстающие подписчики теряют старые события
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Сессии синхронизации старше этого срока удаляются
    #[serde(default = "default_session_max_age_hours")]
    pub session_max_age_hours: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            session_max_age_hours: default_session_max_age_hours(),
        }
    }
}

fn default_session_max_age_hours() -> i64 {
    24
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/cms.db"

[server]
port = 3000

[admin]
username = "admin"
password = "admin"

[realtime]
channel_capacity = 256

[sync]
session_max_age_hours = 24
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.realtime.channel_capacity == 0 {
        anyhow::bail!("realtime.channel_capacity must be greater than zero");
    }
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/cms.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.realtime.channel_capacity, 256);
        assert_eq!(config.sync.session_max_age_hours, 24);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[database]\npath = \"/tmp/site.db\"\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.admin.password, "admin");
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/tmp/site.db")
        );
    }

    #[test]
    fn test_zero_channel_capacity_is_rejected() {
        let err = parse_config("[database]\npath = \"a.db\"\n[realtime]\nchannel_capacity = 0\n");
        assert!(err.is_err());
    }
}
