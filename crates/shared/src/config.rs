//! Application configuration management.

use serde::Deserialize;

use crate::jwt::MAX_ACCESS_TOKEN_EXPIRY_SECS;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://spendwise.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    86400 // 24 hours
}

/// Expiry values above [`MAX_ACCESS_TOKEN_EXPIRY_SECS`] are clamped to it.
impl From<&JwtSettings> for crate::jwt::JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            access_token_expires_secs: i64::try_from(settings.access_token_expiry_secs)
                .map_or(MAX_ACCESS_TOKEN_EXPIRY_SECS, |secs| {
                    secs.min(MAX_ACCESS_TOKEN_EXPIRY_SECS)
                }),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SPENDWISE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("SPENDWISE__JWT__SECRET", Some("env-secret")),
                ("SPENDWISE__SERVER__PORT", Some("9001")),
                ("SPENDWISE__DATABASE__URL", Some("sqlite::memory:")),
                ("RUN_MODE", Some("config-test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.jwt.secret, "env-secret");
                assert_eq!(config.server.port, 9001);
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.jwt.access_token_expiry_secs, 86400);
            },
        );
    }

    #[test]
    fn test_cors_origins_from_environment() {
        temp_env::with_vars(
            [
                ("SPENDWISE__JWT__SECRET", Some("env-secret")),
                (
                    "SPENDWISE__CORS__ALLOWED_ORIGINS",
                    Some("https://a.example,https://b.example"),
                ),
                ("RUN_MODE", Some("config-test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(
                    config.cors.allowed_origins,
                    vec!["https://a.example", "https://b.example"]
                );
            },
        );
    }

    #[test]
    fn test_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8000);

        let db = DatabaseConfig::default();
        assert!(db.url.starts_with("sqlite://"));
        assert_eq!(db.max_connections, 10);

        assert_eq!(CorsConfig::default().allowed_origins.len(), 4);
    }

    #[test]
    fn test_jwt_settings_into_service_config() {
        let settings = JwtSettings {
            secret: "s3cret".to_string(),
            access_token_expiry_secs: 3600,
        };
        let jwt = crate::jwt::JwtConfig::from(&settings);
        assert_eq!(jwt.secret, "s3cret");
        assert_eq!(jwt.access_token_expires_secs, 3600);
    }

    #[test]
    fn test_huge_expiry_is_clamped() {
        for secs in [u64::MAX, u64::try_from(i64::MAX).unwrap()] {
            let settings = JwtSettings {
                secret: "s3cret".to_string(),
                access_token_expiry_secs: secs,
            };
            let jwt = crate::jwt::JwtConfig::from(&settings);
            assert_eq!(jwt.access_token_expires_secs, MAX_ACCESS_TOKEN_EXPIRY_SECS);

            let service = crate::jwt::JwtService::new(jwt);
            let token = service.generate_access_token(1, "Admin").unwrap();
            assert_eq!(service.validate_token(&token).unwrap().user_id(), 1);
        }
    }

    #[test]
    fn test_shipped_default_file_matches_builtin_defaults() {
        let path = std::path::Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../config/default.toml"
        ));
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            config.cors.allowed_origins,
            CorsConfig::default().allowed_origins
        );
        assert_eq!(config.database.url, DatabaseConfig::default().url);
        assert_eq!(config.server.port, ServerConfig::default().port);
        assert_eq!(
            config.jwt.access_token_expiry_secs,
            default_access_token_expiry()
        );
    }
}
